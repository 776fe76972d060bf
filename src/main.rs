//! # E-commerce Server
//!
//! Small e-commerce backend built with Rust, Axum, and Tokio: user signup and
//! login with Argon2 password hashing and JWT issuance, plus a product catalog
//! whose CRUD endpoints require a bearer token.
//!
//! ## Architecture
//! The server is organized into modules:
//! - `server`: Router assembly, middleware layers and serving
//! - `config`: Environment variable configuration management
//! - `auth`: Password hashing, JWT service and the auth middleware
//! - `database`: PostgreSQL pool, migrations and the in-memory store
//! - `routes`: HTTP route handlers organized by functionality
//!   - `health`: Liveness and readiness endpoints
//!   - `auth`: `/signup` and `/login`
//!   - `products`: `/products` CRUD
//! - `error`: Application error type and its HTTP mapping
//!
//! ## Environment Setup
//! Copy `.env.example` to `.env` and configure:
//! ```bash
//! cp .env.example .env
//! # Set JWT_SECRET and DATABASE_URL at minimum
//! ```
//!
//! ## Running the Server
//! ```bash
//! cargo run
//! ```
//!
//! ## Health Check
//! ```bash
//! curl http://localhost:3000/ping
//! ```

mod auth;
mod config;
mod database;
mod error;
mod routes;
mod server;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Application entry point.
///
/// Loads `.env`, initializes logging, reads configuration and runs the server.
/// Missing required configuration stops the process with a non-zero exit code
/// before anything binds.
#[tokio::main]
async fn main() {
    // A missing .env file is fine; the real environment may carry everything.
    let _ = dotenv::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false) // Don't show module targets for cleaner output
                .compact(),
        )
        .init();

    tracing::info!("🏁 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    tracing::info!("🏗️  Build profile: {}", if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    });

    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server::start(config).await {
        tracing::error!("❌ Server failed: {:#}", e);
        std::process::exit(1);
    }
}
