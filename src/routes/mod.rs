// # Routes Module
//
// - This module contains all HTTP route handlers for the server.
// - Routes are organized by functionality into separate submodules.
//
//  ## Available Route Modules
// - `health`: Liveness and readiness endpoints
// - `auth`: Signup and login
// - `products`: Product catalog CRUD, behind the auth middleware

use serde::{Deserialize, Serialize};

/// Health check and monitoring endpoints
pub mod health;

/// Signup and login endpoints
pub mod auth;

/// Product catalog endpoints
pub mod products;

/// `{"message": "..."}` body used by write endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `None` for an absent or blank string
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
