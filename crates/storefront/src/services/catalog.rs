//! Product catalog with an in-process listing cache.
//!
//! Listings are cached per category for 60 seconds via `moka`. Any catalog
//! write drops every cached listing and bumps a generation counter; a listing
//! read under an older generation is never stored.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use brandshop_core::ProductId;
use moka::future::Cache;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;

use crate::db::{ProductRepository, RepositoryError};
use crate::models::{NewProduct, Product};

const LISTING_TTL: Duration = Duration::from_secs(60);

/// Errors from catalog writes.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("product name is required")]
    MissingName,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Cached access to the product catalog.
#[derive(Clone)]
pub struct Catalog {
    listings: Cache<String, Arc<Vec<Product>>>,
    generation: Arc<AtomicU64>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        let listings = Cache::builder()
            .max_capacity(100)
            .time_to_live(LISTING_TTL)
            .build();
        Self {
            listings,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Products in `category` (or all products), newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        pool: &PgPool,
        category: Option<&str>,
    ) -> Result<Arc<Vec<Product>>, RepositoryError> {
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        let cache_key = listing_key(category);

        if let Some(products) = self.listings.get(&cache_key).await {
            debug!(cache_key = %cache_key, "Cache hit for product listing");
            return Ok(products);
        }

        let generation = self.generation.load(Ordering::Acquire);
        let products = Arc::new(ProductRepository::new(pool).list(category).await?);
        self.store_listing(cache_key, generation, Arc::clone(&products))
            .await;
        Ok(products)
    }

    /// A single product. Not cached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn get(&self, pool: &PgPool, id: ProductId) -> Result<Product, RepositoryError> {
        ProductRepository::new(pool)
            .get_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Case-insensitive search over name, brand and description.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, pool: &PgPool, query: &str) -> Result<Vec<Product>, RepositoryError> {
        ProductRepository::new(pool).search(query).await
    }

    /// Add a product and invalidate cached listings.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::MissingName` if the name is blank.
    pub async fn create(&self, pool: &PgPool, product: &NewProduct) -> Result<Product, CatalogError> {
        if product.name.trim().is_empty() {
            return Err(CatalogError::MissingName);
        }

        let product = ProductRepository::new(pool).create(product).await?;
        self.invalidate_all().await;
        tracing::info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Remove a product and invalidate cached listings.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn delete(&self, pool: &PgPool, id: ProductId) -> Result<(), RepositoryError> {
        ProductRepository::new(pool).delete(id).await?;
        self.invalidate_all().await;
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Drop every cached listing.
    pub async fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.listings.invalidate_all();
        self.listings.run_pending_tasks().await;
    }

    /// Cache a listing read under `generation`, unless a write has landed since.
    async fn store_listing(&self, key: String, generation: u64, products: Arc<Vec<Product>>) {
        if self.generation.load(Ordering::Acquire) != generation {
            debug!(cache_key = %key, "Skipping stale product listing");
            return;
        }
        self.listings.insert(key.clone(), products).await;
        // A write between the check and the insert must not leave this entry behind.
        if self.generation.load(Ordering::Acquire) != generation {
            self.listings.invalidate(&key).await;
        }
    }
}

fn listing_key(category: Option<&str>) -> String {
    category.map_or_else(|| "products:*".to_owned(), |c| format!("products:{c}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use brandshop_core::Price;
    use chrono::Utc;
    use sqlx::postgres::PgPoolOptions;

    use super::*;

    fn product(id: i32, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            brand: "Brandshop".to_string(),
            price: Price::from_cents(10_000).unwrap(),
            old_price: None,
            category: category.to_string(),
            description: String::new(),
            image_path: None,
            sizes: vec![],
            colors: vec![],
            created_at: Utc::now(),
        }
    }

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://localhost/brandshop_unreachable")
            .unwrap()
    }

    #[test]
    fn test_listing_key() {
        assert_eq!(listing_key(None), "products:*");
        assert_eq!(listing_key(Some("Dresses")), "products:Dresses");
    }

    #[tokio::test]
    async fn test_cached_listing_is_served_without_database() {
        let catalog = Catalog::new();
        let cached = Arc::new(vec![product(1, "Dresses")]);
        catalog
            .listings
            .insert(listing_key(Some("Dresses")), Arc::clone(&cached))
            .await;

        let products = catalog.list(&lazy_pool(), Some(" Dresses ")).await.unwrap();
        assert_eq!(products, cached);
    }

    #[tokio::test]
    async fn test_invalidate_all_drops_listings() {
        let catalog = Catalog::new();
        catalog
            .listings
            .insert(listing_key(None), Arc::new(vec![product(1, "Clothing")]))
            .await;

        catalog.invalidate_all().await;
        assert!(catalog.listings.get(&listing_key(None)).await.is_none());
    }

    #[tokio::test]
    async fn test_listing_read_before_a_write_is_not_cached() {
        let catalog = Catalog::new();
        let key = listing_key(None);
        let generation = catalog.generation.load(Ordering::Acquire);

        // A create lands while the listing query is still in flight.
        catalog.invalidate_all().await;
        catalog
            .store_listing(key.clone(), generation, Arc::new(vec![product(1, "Clothing")]))
            .await;
        assert!(catalog.listings.get(&key).await.is_none());

        let current = catalog.generation.load(Ordering::Acquire);
        let fresh = Arc::new(vec![product(2, "Clothing")]);
        catalog
            .store_listing(key.clone(), current, Arc::clone(&fresh))
            .await;
        assert_eq!(catalog.listings.get(&key).await, Some(fresh));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let catalog = Catalog::new();
        let new_product: NewProduct =
            serde_json::from_str(r#"{"name": "  ", "price": 10}"#).unwrap();

        assert!(matches!(
            catalog.create(&lazy_pool(), &new_product).await,
            Err(CatalogError::MissingName)
        ));
    }
}
