//! Catalog product types.

use brandshop_core::{Price, ProductId, ProductSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default category for products created without one.
pub const DEFAULT_CATEGORY: &str = "Clothing";

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub price: Price,
    pub old_price: Option<Price>,
    pub category: String,
    pub description: String,
    pub image_path: Option<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// The display data a cart line copies from this product.
    #[must_use]
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id,
            name: self.name.clone(),
            unit_price: self.price,
            image_path: self.image_path.clone(),
        }
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub brand: String,
    pub price: Price,
    #[serde(default)]
    pub old_price: Option<Price>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
}

impl NewProduct {
    /// The category to store, defaulting blank input to [`DEFAULT_CATEGORY`].
    #[must_use]
    pub fn category(&self) -> &str {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
    }
}
