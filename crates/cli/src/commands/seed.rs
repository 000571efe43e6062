//! Seed the product catalog from YAML.
//!
//! The file is a list of products in the same shape as the
//! `POST /api/admin/products` body. Without a path the bundled
//! `data/products.yaml` is used.

use std::path::Path;

use brandshop_storefront::db::{self, ProductRepository};
use brandshop_storefront::models::NewProduct;
use tracing::{info, warn};

/// The catalog shipped with the CLI.
const BUNDLED_PRODUCTS: &str = include_str!("../../data/products.yaml");

/// Parse a YAML product list, rejecting entries without a name.
fn parse_products(content: &str) -> Result<Vec<NewProduct>, Box<dyn std::error::Error>> {
    let products: Vec<NewProduct> = serde_yaml::from_str(content)?;

    if let Some(position) = products.iter().position(|p| p.name.trim().is_empty()) {
        return Err(format!("product #{} has no name", position + 1).into());
    }
    Ok(products)
}

/// Insert products, skipping if the catalog is non-empty unless `force`.
///
/// All products are inserted in one transaction.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or a database
/// operation fails.
pub async fn products(file: Option<&Path>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let content = match file {
        Some(path) => {
            info!(path = %path.display(), "Loading products from file");
            tokio::fs::read_to_string(path).await?
        }
        None => BUNDLED_PRODUCTS.to_owned(),
    };
    let products = parse_products(&content)?;
    info!(products = products.len(), "Parsed catalog");

    let pool = super::connect().await?;

    let existing = ProductRepository::new(&pool).count().await?;
    if existing > 0 && !force {
        warn!(existing, "Catalog is not empty, skipping (use --force to insert anyway)");
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for product in &products {
        let created = db::products::insert(&mut *tx, product).await?;
        info!(product_id = %created.id, name = %created.name, price = %created.price, "Inserted");
    }
    tx.commit().await?;

    info!("Seeding complete! {} products inserted", products.len());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog_parses() {
        let products = parse_products(BUNDLED_PRODUCTS).unwrap();
        assert_eq!(products.len(), 7);

        let coat = products
            .iter()
            .find(|p| p.name == "Manhattan Wool Overcoat")
            .unwrap();
        assert_eq!(coat.price.to_string(), "$950.00");
        assert_eq!(coat.category(), "Clothing");

        let categories: Vec<&str> = products.iter().map(NewProduct::category).collect();
        assert!(categories.contains(&"New Arrivals"));
        assert!(categories.contains(&"Accessories"));
    }

    #[test]
    fn test_unnamed_product_is_rejected() {
        let yaml = "- name: Fallon Dress\n  price: 168\n- name: '  '\n  price: 10\n";
        let err = parse_products(yaml).unwrap_err();
        assert!(err.to_string().contains("#2"));
    }
}
