//! Authentication Middleware
//!
//! Axum middleware for JWT token validation and user authentication.
//! Every protected request is checked on its own; nothing is cached between
//! requests.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{jwt::JwtService, models::AuthUser};
use crate::error::AppError;

pub const TOKEN_REQUIRED: &str = "Token required";
pub const INVALID_TOKEN: &str = "Invalid or expired token";

/// Authentication middleware that validates JWT tokens and injects user info
pub struct AuthMiddleware;

impl AuthMiddleware {
    /// Middleware function for validating JWT tokens.
    ///
    /// No bearer token → 401. A token that fails verification → 403.
    /// Otherwise the decoded [`AuthUser`] goes into the request extensions.
    pub async fn validate_token(
        State(jwt_service): State<Arc<JwtService>>,
        mut req: Request,
        next: Next,
    ) -> Result<Response, AppError> {
        let Some(token) = bearer_token(req.headers()) else {
            tracing::warn!("[AuthMiddleware] Missing bearer token: {} {}", req.method(), req.uri());
            return Err(AppError::Authentication(TOKEN_REQUIRED.to_string()));
        };

        let claims = match jwt_service.decode_claims(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!("[AuthMiddleware] JWT validation failed for {} {}: {}", req.method(), req.uri(), e);
                return Err(AppError::Authorization(INVALID_TOKEN.to_string()));
            }
        };

        let auth_user = AuthUser::from(claims);
        tracing::debug!("[AuthMiddleware] Admitted id={}, email={}", auth_user.id, auth_user.email);

        req.extensions_mut().insert(auth_user);

        Ok(next.run(req).await)
    }
}

/// Token from an `Authorization: Bearer <token>` header. The scheme is
/// matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Handlers behind [`AuthMiddleware::validate_token`] take `AuthUser` as an
/// argument to get the caller's identity.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::Authentication(TOKEN_REQUIRED.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        body::Body,
        http::{HeaderValue, Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
    };
    use chrono::Duration;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    async fn whoami(user: AuthUser) -> Json<AuthUser> {
        Json(user)
    }

    fn app(jwt: Arc<JwtService>) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(jwt, AuthMiddleware::validate_token))
    }

    async fn call(jwt: Arc<JwtService>, auth: Option<&str>) -> (StatusCode, Value) {
        let mut builder = HttpRequest::builder().uri("/whoami");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let response = app(jwt)
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers_with("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers_with("Bearer   abc  ")), Some("abc"));
        assert_eq!(bearer_token(&headers_with("Bearer")), None);
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(bearer_token(&headers_with("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthenticated() {
        let jwt = Arc::new(JwtService::new("secret", Duration::hours(1)));

        let (status, body) = call(jwt.clone(), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": TOKEN_REQUIRED }));

        let (status, _) = call(jwt, Some("Basic dXNlcjpwYXNz")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_token_is_forbidden() {
        let jwt = Arc::new(JwtService::new("secret", Duration::hours(1)));

        let (status, body) = call(jwt.clone(), Some("Bearer not-a-token")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "error": INVALID_TOKEN }));

        let foreign = JwtService::new("other", Duration::hours(1))
            .create_token(Uuid::new_v4(), "x@example.com".into())
            .unwrap();
        let (status, _) = call(jwt.clone(), Some(&format!("Bearer {foreign}"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // Same secret, exp a minute in the past
        let expired = JwtService::new("secret", Duration::seconds(-60))
            .create_token(Uuid::new_v4(), "x@example.com".into())
            .unwrap();
        let (status, body) = call(jwt, Some(&format!("Bearer {expired}"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "error": INVALID_TOKEN }));
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler_with_identity() {
        let jwt = Arc::new(JwtService::new("secret", Duration::hours(1)));
        let user_id = Uuid::new_v4();
        let token = jwt.create_token(user_id, "x@example.com".into()).unwrap();

        let (status, body) = call(jwt, Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "id": user_id, "email": "x@example.com" }));
    }

    #[tokio::test]
    async fn test_extractor_without_middleware_rejects() {
        let app = Router::new().route("/whoami", get(whoami));
        let response = app
            .oneshot(HttpRequest::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
