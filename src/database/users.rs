// PostgreSQL user queries

use anyhow::Context;
use async_trait::async_trait;
use tokio_postgres::error::SqlState;
use uuid::Uuid;

use crate::database::connection::DatabaseConnection;
use crate::database::models::{FromRow, NewUser, User};
use crate::database::store::{StoreError, StoreResult, UserStore};

#[async_trait]
impl UserStore for DatabaseConnection {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let client = self.pool().get().await.context("Failed to get DB connection")?;
        let row = client
            .query_opt(
                "SELECT id, username, email, password_hash, created_at FROM users WHERE email = $1",
                &[&email],
            )
            .await
            .context("Failed to query user by email")?;

        let user = row
            .map(|r| User::from_row(&r))
            .transpose()
            .context("Failed to decode user row")?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let client = self.pool().get().await.context("Failed to get DB connection")?;
        let id = Uuid::new_v4();
        let row = client
            .query_one(
                "INSERT INTO users (id, username, email, password_hash) VALUES ($1, $2, $3, $4) \
                 RETURNING id, username, email, password_hash, created_at",
                &[&id, &user.username, &user.email, &user.password_hash],
            )
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    StoreError::Conflict
                } else {
                    StoreError::Other(anyhow::Error::new(e).context("Failed to insert user"))
                }
            })?;

        Ok(User::from_row(&row).context("Failed to decode user row")?)
    }
}
