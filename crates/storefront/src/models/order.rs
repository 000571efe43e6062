//! Order ledger types.

use brandshop_core::{CartLineItem, Email, OrderId, OrderStatus, PaymentMethod, Price, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A placed order. Immutable once written.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub payment_method: PaymentMethod,
    pub address: String,
    /// The cart snapshot at purchase time.
    pub items: Vec<CartLineItem>,
    pub total: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// The customer an order belongs to, as shown to admins.
#[derive(Debug, Clone, Serialize)]
pub struct Buyer {
    pub name: String,
    pub email: Email,
    pub handle: String,
}

/// An order with its buyer attached.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOrder {
    #[serde(flatten)]
    pub order: Order,
    pub user: Buyer,
}
