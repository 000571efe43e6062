//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Customer and admin authentication, bearer tokens
//! - `cart` - Persisted cart snapshots with optional compare-and-swap
//! - `checkout` - Transactional order placement
//! - `messaging` - Customer/admin messages and notifications
//! - `catalog` - Cached product listing

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod messaging;

pub use auth::{AuthError, AuthService};
pub use cart::{CartService, CartServiceError};
pub use catalog::{Catalog, CatalogError};
pub use checkout::{CheckoutError, CheckoutRequest, CheckoutService};
pub use messaging::{MessagingService, MessagingServiceError};
