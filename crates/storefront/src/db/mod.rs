//! Database operations for storefront `PostgreSQL`.
//!
//! # Schema: `storefront`
//!
//! ## Tables
//!
//! - `user` - Customer accounts, profile fields and the persisted cart
//! - `admin` - Store admins (created via the CLI only)
//! - `product` - Catalog
//! - `order` - Append-only order ledger
//! - `message` - Customer/admin conversations
//! - `notification` - Global and targeted notices
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p brandshop-cli -- migrate
//! ```
//!
//! Queries are checked at runtime; row types derive `sqlx::FromRow` and are
//! converted into domain types with `TryFrom`, so corrupted rows surface as
//! [`RepositoryError::DataCorruption`] instead of panics.

pub mod admins;
pub mod messages;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admins::AdminRepository;
pub use messages::MessageRepository;
pub use notifications::NotificationRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation, carrying the constraint name.
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A compare-and-swap write lost the race.
    #[error("version conflict (current version {current})")]
    VersionConflict { current: i64 },
}

/// Map unique violations to `RepositoryError::Conflict`.
pub(crate) fn map_unique_violation(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        let constraint = db_err.constraint().unwrap_or("unique").to_owned();
        return RepositoryError::Conflict(constraint);
    }
    RepositoryError::Database(err)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
