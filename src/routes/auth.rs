//! Auth routes for signup and login

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};

use crate::auth::models::{LoginRequest, SignupRequest, TokenResponse};
use crate::database::{StoreError, models::NewUser};
use crate::error::{AppError, AppResult};
use crate::routes::{MessageResponse, non_blank};
use crate::server::AppState;

const SIGNUP_FAILED: &str = "Signup failed, please try again later";
const LOGIN_FAILED: &str = "Login failed, please try again later";

/// Same message for an unknown email and a wrong password
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub async fn signup(
    State(app_state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let Json(payload) = payload?;
    let (Some(username), Some(email), Some(password)) = (
        non_blank(payload.username),
        non_blank(payload.email),
        non_blank(payload.password),
    ) else {
        return Err(AppError::Validation("All fields are required".to_string()));
    };

    let existing = app_state
        .stores
        .users
        .find_user_by_email(&email)
        .await
        .map_err(AppError::internal(SIGNUP_FAILED))?;
    if existing.is_some() {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let passwords = app_state.passwords.clone();
    let password_hash = tokio::task::spawn_blocking(move || passwords.hash(&password))
        .await
        .map_err(AppError::internal(SIGNUP_FAILED))?
        .map_err(AppError::internal(SIGNUP_FAILED))?;

    let user = match app_state
        .stores
        .users
        .create_user(NewUser {
            username,
            email,
            password_hash,
        })
        .await
    {
        Ok(user) => user,
        // Lost a race with a concurrent signup for the same email
        Err(StoreError::Conflict) => {
            return Err(AppError::Conflict("User already exists".to_string()));
        }
        Err(e) => return Err(AppError::internal(SIGNUP_FAILED)(e)),
    };

    tracing::info!(user_id = %user.id, username = %user.username, "User signed up");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created successfully")),
    ))
}

pub async fn login(
    State(app_state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<TokenResponse>> {
    let Json(LoginRequest { email, password }) = payload?;

    let user = app_state
        .stores
        .users
        .find_user_by_email(&email)
        .await
        .map_err(AppError::internal(LOGIN_FAILED))?;

    let passwords = app_state.passwords.clone();
    let verified = tokio::task::spawn_blocking(move || match user {
        Some(user) if passwords.verify(&password, &user.password_hash) => Some(user),
        Some(_) => None,
        None => {
            passwords.verify_dummy(&password);
            None
        }
    })
    .await
    .map_err(AppError::internal(LOGIN_FAILED))?;

    let Some(user) = verified else {
        tracing::info!("Login rejected");
        return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
    };

    let token = app_state
        .jwt_service
        .create_token(user.id, user.email)
        .map_err(AppError::internal(LOGIN_FAILED))?;

    tracing::info!(user_id = %user.id, member_since = %user.created_at, "User logged in");
    Ok(Json(TokenResponse { token }))
}

pub fn create_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}
