//! Domain models for storefront.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`]. Most of them serialize directly as API responses.

pub mod admin;
pub mod messaging;
pub mod order;
pub mod product;
pub mod user;

pub use admin::Admin;
pub use messaging::{MessageView, NotificationView};
pub use order::{AdminOrder, Buyer, Order};
pub use product::{NewProduct, Product};
pub use user::{CartState, PasswordRequest, User, UserSummary};
