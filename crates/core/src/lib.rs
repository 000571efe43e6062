//! Brandshop Core - Shared domain types and rules.
//!
//! This crate provides the types used across all Brandshop components:
//! - `storefront` - The REST backend (customer and admin API)
//! - `cli` - Command-line tools for migrations, admin accounts and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP. The storefront persists what these types produce.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, prices and status enums
//! - [`cart`] - Cart line items, slot keys and cart mutations
//! - [`order`] - Checkout validation and total settlement
//! - [`messaging`] - Direct messages and notification audiences

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod messaging;
pub mod order;
pub mod types;

pub use types::*;
pub use cart::{Cart, CartError, CartLineItem, ProductSnapshot, SlotKey};
pub use messaging::{
    Audience, Message, MessageContent, MessageDirection, MessagingError, Notification, Party,
};
pub use order::{OrderDraft, OrderError, SettledOrder, TotalPolicy};
