//! Store traits
//!
//! Handlers talk to persistence only through these traits. PostgreSQL
//! implementations live in `users.rs` and `products.rs`, the in-memory one in
//! `memory.rs`.

use async_trait::async_trait;
use thiserror::Error;

use crate::database::connection::ConnectionStats;
use crate::database::models::{NewProduct, NewUser, Product, ProductPatch, User};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("record already exists")]
    Conflict,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Insert a user. Fails with [`StoreError::Conflict`] when the email is taken.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    async fn get_product(&self, id: i64) -> StoreResult<Option<Product>>;

    async fn create_product(&self, product: NewProduct) -> StoreResult<Product>;

    /// Overwrite every writable field. Returns `false` when no row matched.
    async fn replace_product(&self, id: i64, product: NewProduct) -> StoreResult<bool>;

    /// Change only the fields present in `patch`. Returns `false` when no row matched.
    async fn patch_product(&self, id: i64, patch: ProductPatch) -> StoreResult<bool>;

    /// Returns `false` when no row matched.
    async fn delete_product(&self, id: i64) -> StoreResult<bool>;
}

/// Readiness probe for whichever backend is configured
#[async_trait]
pub trait StoreHealth: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn health_check(&self) -> anyhow::Result<()>;

    /// Pool statistics, when the backend has a pool
    fn pool_stats(&self) -> Option<ConnectionStats> {
        None
    }
}
