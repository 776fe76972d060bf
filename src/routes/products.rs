//! Product catalog routes. Every route here sits behind
//! [`AuthMiddleware::validate_token`](crate::auth::middleware::AuthMiddleware::validate_token).

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    middleware,
    routing::get,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::auth::{jwt::JwtService, middleware::AuthMiddleware, models::AuthUser};
use crate::database::models::{NewProduct, Product, ProductPatch};
use crate::error::{AppError, AppResult};
use crate::routes::{MessageResponse, non_blank};
use crate::server::AppState;

const PRODUCT_NOT_FOUND: &str = "Product not found";

/// Prices are stored as `NUMERIC(12,2)`
const PRICE_SCALE: u32 = 2;
const PRICE_LIMIT: i64 = 10_000_000_000;

/// Body of `POST /products` and `PUT /products/:id`
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    #[serde(default, alias = "productName")]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: Option<i32>,
    #[serde(default)]
    pub price: Option<Decimal>,
}

impl ProductRequest {
    fn into_new_product(self) -> AppResult<NewProduct> {
        let (Some(name), Some(quantity), Some(price)) =
            (non_blank(self.name), self.quantity, self.price)
        else {
            return Err(AppError::Validation("Missing required fields".to_string()));
        };
        check_amounts(Some(quantity), Some(price))?;
        Ok(NewProduct {
            name,
            description: self.description,
            quantity,
            price,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductCreatedResponse {
    pub message: String,
    #[serde(rename = "productId")]
    pub product_id: i64,
}

fn check_amounts(quantity: Option<i32>, price: Option<Decimal>) -> AppResult<()> {
    if quantity.is_some_and(|q| q < 0) {
        return Err(AppError::Validation("quantity must not be negative".to_string()));
    }
    let Some(price) = price else {
        return Ok(());
    };
    if price.is_sign_negative() && !price.is_zero() {
        return Err(AppError::Validation("price must not be negative".to_string()));
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err(AppError::Validation(
            "price must have at most two decimal places".to_string(),
        ));
    }
    if price >= Decimal::from(PRICE_LIMIT) {
        return Err(AppError::Validation("price is too large".to_string()));
    }
    Ok(())
}

fn check_patch(patch: &ProductPatch) -> AppResult<()> {
    if patch.is_empty() {
        return Err(AppError::Validation("No fields to update".to_string()));
    }
    if patch.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }
    check_amounts(patch.quantity, patch.price)
}

pub async fn list_products(
    State(app_state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<Product>>> {
    let products = app_state
        .stores
        .products
        .list_products()
        .await
        .map_err(AppError::internal("Failed to fetch products"))?;

    tracing::debug!(user_id = %user.id, count = products.len(), "Listed products");
    Ok(Json(products))
}

pub async fn get_product(
    State(app_state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Product>> {
    let Path(id) = id?;
    app_state
        .stores
        .products
        .get_product(id)
        .await
        .map_err(AppError::internal("Failed to fetch product"))?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(PRODUCT_NOT_FOUND.to_string()))
}

pub async fn create_product(
    State(app_state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ProductCreatedResponse>)> {
    let Json(payload) = payload?;
    let new_product = payload.into_new_product()?;

    let product = app_state
        .stores
        .products
        .create_product(new_product)
        .await
        .map_err(AppError::internal("Failed to add product"))?;

    tracing::info!(user_id = %user.id, product_id = product.id, "Product created");
    Ok((
        StatusCode::CREATED,
        Json(ProductCreatedResponse {
            message: "Product added".to_string(),
            product_id: product.id,
        }),
    ))
}

pub async fn replace_product(
    State(app_state): State<AppState>,
    user: AuthUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let product = payload.into_new_product()?;

    let updated = app_state
        .stores
        .products
        .replace_product(id, product)
        .await
        .map_err(AppError::internal("Failed to update product"))?;
    if !updated {
        return Err(AppError::NotFound(PRODUCT_NOT_FOUND.to_string()));
    }

    tracing::info!(user_id = %user.id, product_id = id, "Product replaced");
    Ok(Json(MessageResponse::new("Product updated")))
}

pub async fn patch_product(
    State(app_state): State<AppState>,
    user: AuthUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProductPatch>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    check_patch(&patch)?;

    let updated = app_state
        .stores
        .products
        .patch_product(id, patch)
        .await
        .map_err(AppError::internal("Failed to update product"))?;
    if !updated {
        return Err(AppError::NotFound(PRODUCT_NOT_FOUND.to_string()));
    }

    tracing::info!(user_id = %user.id, product_id = id, "Product patched");
    Ok(Json(MessageResponse::new("Product updated successfully")))
}

pub async fn delete_product(
    State(app_state): State<AppState>,
    user: AuthUser,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Path(id) = id?;

    let deleted = app_state
        .stores
        .products
        .delete_product(id)
        .await
        .map_err(AppError::internal("Failed to delete product"))?;
    if !deleted {
        return Err(AppError::NotFound(PRODUCT_NOT_FOUND.to_string()));
    }

    tracing::info!(user_id = %user.id, product_id = id, "Product deleted");
    Ok(Json(MessageResponse::new("Product deleted")))
}

/// Product routes with the auth middleware applied
pub fn create_product_routes(jwt_service: Arc<JwtService>) -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product)
                .put(replace_product)
                .patch(patch_product)
                .delete(delete_product),
        )
        .layer(middleware::from_fn_with_state(
            jwt_service,
            AuthMiddleware::validate_token,
        ))
}
