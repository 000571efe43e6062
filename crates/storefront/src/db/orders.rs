//! Order ledger repository.
//!
//! Orders are append-only: there is an insert and there are reads, nothing
//! else.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

use brandshop_core::{CartLineItem, Email, OrderId, Price, SettledOrder, UserId};

use super::RepositoryError;
use crate::models::{AdminOrder, Buyer, Order};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    payment_method: String,
    address: String,
    items: Json<Vec<CartLineItem>>,
    total: Price,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let payment_method = row.payment_method.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("order {}: {e}", row.id))
        })?;
        let status = row
            .status
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("order {}: {e}", row.id)))?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            payment_method,
            address: row.address,
            items: row.items.0,
            total: row.total,
            status,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AdminOrderRow {
    #[sqlx(flatten)]
    order: OrderRow,
    buyer_name: String,
    buyer_email: String,
    buyer_handle: String,
}

impl TryFrom<AdminOrderRow> for AdminOrder {
    type Error = RepositoryError;

    fn try_from(row: AdminOrderRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.buyer_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            order: row.order.try_into()?,
            user: Buyer {
                name: row.buyer_name,
                email,
                handle: row.buyer_handle,
            },
        })
    }
}

/// Store-wide totals for the admin dashboard.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct OrderTotals {
    pub order_count: i64,
    pub revenue: Decimal,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored order is invalid.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, payment_method, address, items, total, status, created_at
            FROM storefront.order
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List every order with its buyer, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored order is invalid.
    pub async fn list_all(&self) -> Result<Vec<AdminOrder>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminOrderRow>(
            r"
            SELECT o.id, o.user_id, o.payment_method, o.address, o.items, o.total, o.status,
                   o.created_at,
                   u.name AS buyer_name, u.email AS buyer_email, u.handle AS buyer_handle
            FROM storefront.order o
            JOIN storefront.user u ON u.id = o.user_id
            ORDER BY o.created_at DESC, o.id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Order count and revenue across all orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn totals(&self) -> Result<OrderTotals, RepositoryError> {
        let totals = sqlx::query_as::<_, OrderTotals>(
            r"
            SELECT COUNT(*) AS order_count, COALESCE(SUM(total), 0) AS revenue
            FROM storefront.order
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(totals)
    }
}

/// Append an order to the ledger.
///
/// Callers run this inside the checkout transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    user_id: UserId,
    order: &SettledOrder,
) -> Result<Order, RepositoryError> {
    let row = sqlx::query_as::<_, OrderRow>(
        r"
        INSERT INTO storefront.order (user_id, payment_method, address, items, total)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, payment_method, address, items, total, status, created_at
        ",
    )
    .bind(user_id)
    .bind(order.payment_method.as_str())
    .bind(&order.address)
    .bind(Json(&order.items))
    .bind(order.total)
    .fetch_one(executor)
    .await?;

    row.try_into()
}
