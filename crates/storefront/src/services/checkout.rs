//! Order placement.
//!
//! Checkout locks the customer's row, settles the order against the
//! configured [`TotalPolicy`], appends it to the ledger and clears the
//! persisted cart, all in one transaction.

use brandshop_core::{
    Cart, CartError, CartLineItem, OrderDraft, OrderError, PaymentMethod, Price, TotalPolicy,
    UserId,
};
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use crate::db::{self, RepositoryError};
use crate::models::Order;

/// Errors from checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The payment method is not one of the accepted values.
    #[error("invalid payment method: {0}")]
    InvalidPaymentMethod(String),

    /// The cart snapshot is invalid.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// The order failed validation or settlement.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// The customer no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// Repository/database error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A checkout request body.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub payment_method: String,
    pub address: String,
    pub cart: Vec<CartLineItem>,
    pub total: Price,
}

impl CheckoutRequest {
    /// Validate the request into a draft.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidPaymentMethod`, `CheckoutError::Cart` or
    /// `CheckoutError::Order` for invalid input.
    pub fn into_draft(self) -> Result<OrderDraft, CheckoutError> {
        let payment_method: PaymentMethod = self
            .payment_method
            .parse()
            .map_err(CheckoutError::InvalidPaymentMethod)?;
        let cart = Cart::from_lines(self.cart)?;
        Ok(OrderDraft::new(payment_method, &self.address, cart, self.total)?)
    }
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
    policy: TotalPolicy,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, policy: TotalPolicy) -> Self {
        Self { pool, policy }
    }

    /// Place an order for `user_id` and empty their persisted cart.
    ///
    /// Nothing is written unless every step succeeds.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::UserNotFound` if the customer doesn't exist.
    /// Returns `CheckoutError::Order` for an empty address or cart, an unknown
    /// product, or a total outside the tolerance.
    #[tracing::instrument(skip_all, fields(user_id = %user_id))]
    pub async fn place_order(
        &self,
        user_id: UserId,
        request: CheckoutRequest,
    ) -> Result<Order, CheckoutError> {
        let draft = request.into_draft()?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        if !db::users::lock_for_update(&mut *tx, user_id).await? {
            return Err(CheckoutError::UserNotFound);
        }

        let prices = match self.policy {
            TotalPolicy::TrustClient => std::collections::HashMap::new(),
            TotalPolicy::Recompute { .. } => {
                db::products::prices(&mut *tx, &draft.items().product_ids()).await?
            }
        };
        let settled = draft.settle(self.policy, &prices)?;

        let order = db::orders::insert(&mut *tx, user_id, &settled).await?;
        let cart_version = db::users::clear_cart(&mut *tx, user_id).await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            order_id = %order.id,
            total = %order.total,
            payment_method = %order.payment_method,
            cart_version,
            "Order placed"
        );
        Ok(order)
    }
}
