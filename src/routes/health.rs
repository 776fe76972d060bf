use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::json;

use crate::server::AppState;

/// Liveness probe.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/ping`
/// - **Response**: `{"status": "pong"}`
pub async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "status": "pong" }))
}

/// Readiness probe. Checks the configured store.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/health`
///
/// # HTTP Status Codes
/// - **200 OK**: the store answered
/// - **503 Service Unavailable**: the store did not answer
pub async fn health(State(app_state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let store = &app_state.stores.health;
    let pool = store.pool_stats();

    match store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "store": store.backend(), "pool": pool })),
        ),
        Err(e) => {
            tracing::error!(error = ?e, "Store health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "store": store.backend(), "pool": pool })),
            )
        }
    }
}
