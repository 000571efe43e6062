//! Product catalog repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

use brandshop_core::{Price, ProductId};

use super::RepositoryError;
use crate::models::{NewProduct, Product};

/// Maximum number of results returned by [`ProductRepository::search`].
pub const SEARCH_LIMIT: i64 = 5;

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    brand: String,
    price: Price,
    old_price: Option<Price>,
    category: String,
    description: String,
    image_path: Option<String>,
    sizes: Json<Vec<String>>,
    colors: Json<Vec<String>>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            brand: row.brand,
            price: row.price,
            old_price: row.old_price,
            category: row.category,
            description: row.description,
            image_path: row.image_path,
            sizes: row.sizes.0,
            colors: row.colors.0,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PriceRow {
    id: ProductId,
    price: Price,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products, newest first, optionally restricted to one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, brand, price, old_price, category, description, image_path,
                   sizes, colors, created_at
            FROM storefront.product
            WHERE $1::TEXT IS NULL OR category = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(category)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, brand, price, old_price, category, description, image_path,
                   sizes, colors, created_at
            FROM storefront.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Case-insensitive substring search over name, brand and description.
    ///
    /// Returns at most [`SEARCH_LIMIT`] products. A blank query matches nothing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, RepositoryError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let pattern = format!("%{}%", escape_like(query));
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, brand, price, old_price, category, description, image_path,
                   sizes, colors, created_at
            FROM storefront.product
            WHERE name ILIKE $1 OR brand ILIKE $1 OR description ILIKE $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        insert(self.pool, product).await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Count catalog products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM storefront.product")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

/// Insert a product using any executor.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    product: &NewProduct,
) -> Result<Product, RepositoryError> {
    let row = sqlx::query_as::<_, ProductRow>(
        r"
        INSERT INTO storefront.product
            (name, brand, price, old_price, category, description, image_path, sizes, colors)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, name, brand, price, old_price, category, description, image_path,
                  sizes, colors, created_at
        ",
    )
    .bind(product.name.trim())
    .bind(product.brand.trim())
    .bind(product.price)
    .bind(product.old_price)
    .bind(product.category())
    .bind(&product.description)
    .bind(product.image_path.as_deref())
    .bind(Json(&product.sizes))
    .bind(Json(&product.colors))
    .fetch_one(executor)
    .await?;

    Ok(row.into())
}

/// Current catalog prices for a set of products.
///
/// IDs with no matching product are absent from the result.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn prices<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[ProductId],
) -> Result<HashMap<ProductId, Price>, RepositoryError> {
    let raw_ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
    let rows = sqlx::query_as::<_, PriceRow>(
        "SELECT id, price FROM storefront.product WHERE id = ANY($1)",
    )
    .bind(raw_ids)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(|row| (row.id, row.price)).collect())
}

/// Escape `LIKE` wildcards in user input.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("silk"), "silk");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
