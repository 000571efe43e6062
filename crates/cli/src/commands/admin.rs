//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! bs-cli admin create -e admin@example.com -p 'a long password'
//! ```
//!
//! Admin accounts can only be created here; there is no HTTP signup for
//! admins.

use brandshop_storefront::services::auth::{self, AuthError};
use thiserror::Error;

use super::DatabaseError;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Admin already exists.
    #[error("Admin already exists with email: {0}")]
    AdminExists(String),

    #[error(transparent)]
    Auth(AuthError),
}

/// Create a new admin account.
///
/// # Errors
///
/// Returns `AdminError::AdminExists` if the email is taken, or
/// `AdminError::Auth` for an invalid email or weak password.
pub async fn create(email: &str, password: &str) -> Result<(), AdminError> {
    let pool = super::connect().await?;

    tracing::info!("Creating admin account: {email}");
    let admin = auth::create_admin(&pool, email, password)
        .await
        .map_err(|e| match e {
            AuthError::UserAlreadyExists => AdminError::AdminExists(email.to_owned()),
            other => AdminError::Auth(other),
        })?;

    tracing::info!(admin_id = %admin.id, "Admin account created");
    Ok(())
}
