//! Persisted cart operations.
//!
//! The stored cart is always a full snapshot. Writes without an expected
//! version are last-writer-wins; with one they are compare-and-swap against
//! `cart_version`.

use brandshop_core::{Cart, CartError, CartLineItem, UserId};
use sqlx::PgPool;
use thiserror::Error;

use crate::db::{RepositoryError, UserRepository};
use crate::models::CartState;

/// How many times a merge re-reads the cart after losing a race.
const MERGE_ATTEMPTS: u32 = 3;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartServiceError {
    /// The submitted snapshot is invalid.
    #[error(transparent)]
    Invalid(#[from] CartError),

    /// Repository/database error, including version conflicts.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Cart service.
pub struct CartService<'a> {
    users: UserRepository<'a>,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// The persisted cart and its version.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn get(&self, user_id: UserId) -> Result<CartState, CartServiceError> {
        Ok(self.users.get_cart(user_id).await?)
    }

    /// Validate and store a full cart snapshot.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::Invalid` for zero quantities.
    /// Returns `RepositoryError::VersionConflict` if `expected_version` is stale.
    #[tracing::instrument(skip_all, fields(user_id = %user_id, lines = lines.len()))]
    pub async fn replace(
        &self,
        user_id: UserId,
        lines: Vec<CartLineItem>,
        expected_version: Option<i64>,
    ) -> Result<CartState, CartServiceError> {
        let cart = Cart::from_lines(lines)?;
        let state = self
            .users
            .replace_cart(user_id, &cart, expected_version)
            .await?;
        tracing::debug!(version = state.version, "Cart persisted");
        Ok(state)
    }

    /// Fold a guest cart into the persisted one, summing shared slots.
    ///
    /// Each attempt is a compare-and-swap on the version just read, so a
    /// concurrent write causes a re-read instead of being overwritten.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::Invalid` for zero quantities in the guest cart.
    /// Returns `RepositoryError::VersionConflict` if every attempt lost a race.
    #[tracing::instrument(skip_all, fields(user_id = %user_id))]
    pub async fn merge(
        &self,
        user_id: UserId,
        guest: Vec<CartLineItem>,
    ) -> Result<CartState, CartServiceError> {
        let guest = Cart::from_lines(guest)?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let CartState { mut cart, version } = self.users.get_cart(user_id).await?;
            cart.merge(guest.clone());

            match self.users.replace_cart(user_id, &cart, Some(version)).await {
                Ok(state) => return Ok(state),
                Err(RepositoryError::VersionConflict { current }) if attempt < MERGE_ATTEMPTS => {
                    tracing::debug!(attempt, current, "Cart changed during merge, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
