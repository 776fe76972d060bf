//! # Database Module
//!
//! Persistence for users and products. PostgreSQL through tokio-postgres and
//! deadpool, or an in-memory store for local runs and tests.

pub mod connection;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod products;
pub mod store;
pub mod users;

use std::sync::Arc;

use anyhow::Result;

use crate::config::StoreBackend;

pub use connection::DatabaseConnection;
pub use memory::MemoryStore;
pub use store::{ProductStore, StoreError, StoreHealth, UserStore};

/// Store handles shared by all handlers
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductStore>,
    pub health: Arc<dyn StoreHealth>,
}

impl Stores {
    /// Open the configured backend. PostgreSQL connections are checked and
    /// migrated before this returns.
    pub async fn connect(backend: &StoreBackend) -> Result<Self> {
        match backend {
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; data is lost on restart");
                Ok(Self::from_shared(Arc::new(MemoryStore::new())))
            }
            StoreBackend::Postgres(config) => {
                let db = DatabaseConnection::new(config.clone()).await?;
                migrations::run_migrations(db.pool()).await?;
                Ok(Self::from_shared(Arc::new(db)))
            }
        }
    }

    /// Use one backend for every concern
    pub fn from_shared<S>(store: Arc<S>) -> Self
    where
        S: UserStore + ProductStore + StoreHealth + 'static,
    {
        Self {
            users: store.clone(),
            products: store.clone(),
            health: store,
        }
    }
}
