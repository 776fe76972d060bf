//! In-memory store
//!
//! Selected with `DATABASE_URL=memory`. Data lives for the life of the process.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::database::models::{NewProduct, NewUser, Product, ProductPatch, User};
use crate::database::store::{ProductStore, StoreError, StoreHealth, StoreResult, UserStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Users keyed by email
    users: DashMap<String, User>,
    products: Mutex<ProductTable>,
}

#[derive(Debug, Default)]
struct ProductTable {
    next_id: i64,
    rows: BTreeMap<i64, Product>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.users.get(email).map(|entry| entry.value().clone()))
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        match self.users.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict),
            Entry::Vacant(slot) => {
                let created = User {
                    id: Uuid::new_v4(),
                    username: user.username,
                    email: user.email,
                    password_hash: user.password_hash,
                    created_at: Utc::now(),
                };
                slot.insert(created.clone());
                Ok(created)
            }
        }
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self.products.lock().rows.values().cloned().collect())
    }

    async fn get_product(&self, id: i64) -> StoreResult<Option<Product>> {
        Ok(self.products.lock().rows.get(&id).cloned())
    }

    async fn create_product(&self, product: NewProduct) -> StoreResult<Product> {
        let mut table = self.products.lock();
        table.next_id += 1;
        let now = Utc::now();
        let created = Product {
            id: table.next_id,
            name: product.name,
            description: product.description,
            quantity: product.quantity,
            price: product.price,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(created.id, created.clone());
        Ok(created)
    }

    async fn replace_product(&self, id: i64, product: NewProduct) -> StoreResult<bool> {
        let mut table = self.products.lock();
        let Some(existing) = table.rows.get_mut(&id) else {
            return Ok(false);
        };
        existing.name = product.name;
        existing.description = product.description;
        existing.quantity = product.quantity;
        existing.price = product.price;
        existing.updated_at = Utc::now();
        Ok(true)
    }

    async fn patch_product(&self, id: i64, patch: ProductPatch) -> StoreResult<bool> {
        let mut table = self.products.lock();
        let Some(existing) = table.rows.get_mut(&id) else {
            return Ok(false);
        };
        if !patch.is_empty() {
            patch.apply(existing);
            existing.updated_at = Utc::now();
        }
        Ok(true)
    }

    async fn delete_product(&self, id: i64) -> StoreResult<bool> {
        Ok(self.products.lock().rows.remove(&id).is_some())
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            username: "alice".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$fake".to_string(),
        }
    }

    fn new_product(name: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: None,
            quantity: 5,
            price: Decimal::new(1999, 2),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user(new_user("a@example.com")).await.unwrap();

        let err = store.create_user(new_user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
        assert_eq!(store.users.len(), 1);
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let store = MemoryStore::new();
        store.create_user(new_user("Bob@example.com")).await.unwrap();

        assert!(store.find_user_by_email("Bob@example.com").await.unwrap().is_some());
        assert!(store.find_user_by_email("bob@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_product_lifecycle() {
        let store = MemoryStore::new();
        let first = store.create_product(new_product("Mug")).await.unwrap();
        let second = store.create_product(new_product("Plate")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let patch = ProductPatch {
            price: Some(Decimal::new(500, 2)),
            ..Default::default()
        };
        assert!(store.patch_product(first.id, patch.clone()).await.unwrap());
        assert!(!store.patch_product(99, patch).await.unwrap());

        let mug = store.get_product(first.id).await.unwrap().unwrap();
        assert_eq!(mug.price, Decimal::new(500, 2));
        assert_eq!(mug.name, "Mug");

        assert!(store.replace_product(second.id, new_product("Bowl")).await.unwrap());
        assert!(!store.replace_product(99, new_product("Bowl")).await.unwrap());

        assert!(store.delete_product(first.id).await.unwrap());
        assert!(!store.delete_product(first.id).await.unwrap());

        let remaining = store.list_products().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Bowl");
    }
}
