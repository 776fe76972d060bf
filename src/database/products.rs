// PostgreSQL product queries

use anyhow::Context;
use async_trait::async_trait;
use tokio_postgres::types::ToSql;

use crate::database::connection::DatabaseConnection;
use crate::database::models::{FromRow, NewProduct, Product, ProductPatch};
use crate::database::store::{ProductStore, StoreResult};

const PRODUCT_COLUMNS: &str = "id, name, description, quantity, price, created_at, updated_at";

#[async_trait]
impl ProductStore for DatabaseConnection {
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let client = self.pool().get().await.context("Failed to get DB connection")?;
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id");
        let rows = client
            .query(sql.as_str(), &[])
            .await
            .context("Failed to query products")?;

        let products = rows
            .iter()
            .map(Product::from_row)
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to decode product row")?;
        Ok(products)
    }

    async fn get_product(&self, id: i64) -> StoreResult<Option<Product>> {
        let client = self.pool().get().await.context("Failed to get DB connection")?;
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = client
            .query_opt(sql.as_str(), &[&id])
            .await
            .context("Failed to query product")?;

        let product = row
            .map(|r| Product::from_row(&r))
            .transpose()
            .context("Failed to decode product row")?;
        Ok(product)
    }

    async fn create_product(&self, product: NewProduct) -> StoreResult<Product> {
        let client = self.pool().get().await.context("Failed to get DB connection")?;
        let sql = format!(
            "INSERT INTO products (name, description, quantity, price) \
             VALUES ($1, $2, $3, $4) RETURNING {PRODUCT_COLUMNS}"
        );
        let row = client
            .query_one(
                sql.as_str(),
                &[&product.name, &product.description, &product.quantity, &product.price],
            )
            .await
            .context("Failed to insert product")?;

        Ok(Product::from_row(&row).context("Failed to decode product row")?)
    }

    async fn replace_product(&self, id: i64, product: NewProduct) -> StoreResult<bool> {
        let client = self.pool().get().await.context("Failed to get DB connection")?;
        let n = client
            .execute(
                "UPDATE products SET name = $1, description = $2, quantity = $3, price = $4, \
                 updated_at = NOW() WHERE id = $5",
                &[&product.name, &product.description, &product.quantity, &product.price, &id],
            )
            .await
            .context("Failed to update product")?;
        Ok(n > 0)
    }

    async fn patch_product(&self, id: i64, patch: ProductPatch) -> StoreResult<bool> {
        if patch.is_empty() {
            return Ok(self.get_product(id).await?.is_some());
        }

        // Column names come only from this fixed list, never from the request.
        let mut assignments: Vec<String> = Vec::with_capacity(5);
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::with_capacity(5);
        if let Some(name) = &patch.name {
            params.push(name);
            assignments.push(format!("name = ${}", params.len()));
        }
        if let Some(description) = &patch.description {
            params.push(description);
            assignments.push(format!("description = ${}", params.len()));
        }
        if let Some(quantity) = &patch.quantity {
            params.push(quantity);
            assignments.push(format!("quantity = ${}", params.len()));
        }
        if let Some(price) = &patch.price {
            params.push(price);
            assignments.push(format!("price = ${}", params.len()));
        }
        assignments.push("updated_at = NOW()".to_string());
        params.push(&id);

        let sql = format!(
            "UPDATE products SET {} WHERE id = ${}",
            assignments.join(", "),
            params.len()
        );

        let client = self.pool().get().await.context("Failed to get DB connection")?;
        let n = client
            .execute(sql.as_str(), &params)
            .await
            .context("Failed to patch product")?;
        Ok(n > 0)
    }

    async fn delete_product(&self, id: i64) -> StoreResult<bool> {
        let client = self.pool().get().await.context("Failed to get DB connection")?;
        let n = client
            .execute("DELETE FROM products WHERE id = $1", &[&id])
            .await
            .context("Failed to delete product")?;
        Ok(n > 0)
    }
}
