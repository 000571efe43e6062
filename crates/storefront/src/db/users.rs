//! User repository for database operations.
//!
//! Covers customer accounts, profile fields and the persisted cart. The cart
//! lives on the user row as a JSON array next to a `cart_version` counter
//! that every cart write increments.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

use brandshop_core::{Cart, CartLineItem, Email, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::{CartState, PasswordRequest, User, UserSummary};

/// Unique constraint on `storefront.user.email`.
pub const EMAIL_CONSTRAINT: &str = "user_email_key";
/// Unique constraint on `storefront.user.handle`.
pub const HANDLE_CONSTRAINT: &str = "user_handle_key";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    name: String,
    handle: String,
    bio: Option<String>,
    address: Option<String>,
    is_verified: bool,
    password_request: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            email: parse_email(&row.email)?,
            name: row.name,
            handle: row.handle,
            bio: row.bio,
            address: row.address,
            is_verified: row.is_verified,
            password_request: row.password_request,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
    cart: Json<Vec<CartLineItem>>,
    cart_version: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: UserId,
    cart: Json<Vec<CartLineItem>>,
    cart_version: i64,
}

impl TryFrom<CartRow> for CartState {
    type Error = RepositoryError;

    fn try_from(row: CartRow) -> Result<Self, Self::Error> {
        Ok(Self {
            cart: parse_cart(row.id, row.cart.0)?,
            version: row.cart_version,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: UserId,
    name: String,
    email: String,
    handle: String,
}

impl TryFrom<SummaryRow> for UserSummary {
    type Error = RepositoryError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            email: parse_email(&row.email)?,
            name: row.name,
            handle: row.handle,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PasswordRequestRow {
    id: UserId,
    name: String,
    email: String,
    handle: String,
    password_requested_at: DateTime<Utc>,
}

impl TryFrom<PasswordRequestRow> for PasswordRequest {
    type Error = RepositoryError;

    fn try_from(row: PasswordRequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            email: parse_email(&row.email)?,
            name: row.name,
            handle: row.handle,
            requested_at: row.password_requested_at,
        })
    }
}

fn parse_email(raw: &str) -> Result<Email, RepositoryError> {
    Email::parse(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid email in database: {e}")))
}

fn parse_cart(user: UserId, lines: Vec<CartLineItem>) -> Result<Cart, RepositoryError> {
    Cart::from_lines(lines).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid cart for user {user}: {e}"))
    })
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, name, handle, bio, address, is_verified, password_request,
                   created_at, updated_at
            FROM storefront.user
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Check whether an account exists for an email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM storefront.user WHERE email = $1)",
        )
        .bind(email.as_str())
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Check whether a user ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: UserId) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM storefront.user WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    /// Get a user with their password hash and persisted cart, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String, CartState)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r"
            SELECT id, email, name, handle, bio, address, is_verified, password_request,
                   created_at, updated_at, password_hash, cart, cart_version
            FROM storefront.user
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let cart = CartState {
            cart: parse_cart(row.user.id, row.cart.0)?,
            version: row.cart_version,
        };
        let user = User::try_from(row.user)?;
        Ok(Some((user, row.password_hash, cart)))
    }

    /// Create a new verified user with an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` with the violated constraint name
    /// ([`EMAIL_CONSTRAINT`] or [`HANDLE_CONSTRAINT`]) on duplicates.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
        name: &str,
        handle: &str,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO storefront.user (email, password_hash, name, handle, is_verified)
            VALUES ($1, $2, $3, $4, TRUE)
            RETURNING id, email, name, handle, bio, address, is_verified, password_request,
                      created_at, updated_at
            ",
        )
        .bind(email.as_str())
        .bind(password_hash)
        .bind(name)
        .bind(handle)
        .fetch_one(self.pool)
        .await
        .map_err(map_unique_violation)?;

        row.try_into()
    }

    /// Update profile fields. `None` leaves a field unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_profile(
        &self,
        id: UserId,
        name: Option<&str>,
        bio: Option<&str>,
        address: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE storefront.user
            SET name = COALESCE($2, name),
                bio = COALESCE($3, bio),
                address = COALESCE($4, address)
            WHERE id = $1
            RETURNING id, email, name, handle, bio, address, is_verified, password_request,
                      created_at, updated_at
            ",
        )
        .bind(id)
        .bind(name)
        .bind(bio)
        .bind(address)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Get the persisted cart and its version.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::DataCorruption` if the stored cart is invalid.
    pub async fn get_cart(&self, id: UserId) -> Result<CartState, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, cart, cart_version FROM storefront.user WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Overwrite the persisted cart with a full snapshot.
    ///
    /// With `expected_version` the write only applies if the stored version
    /// still matches; otherwise the last writer wins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::VersionConflict` if `expected_version` is stale.
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn replace_cart(
        &self,
        id: UserId,
        cart: &Cart,
        expected_version: Option<i64>,
    ) -> Result<CartState, RepositoryError> {
        let version: Option<i64> = sqlx::query_scalar(
            r"
            UPDATE storefront.user
            SET cart = $2, cart_version = cart_version + 1
            WHERE id = $1 AND ($3::BIGINT IS NULL OR cart_version = $3)
            RETURNING cart_version
            ",
        )
        .bind(id)
        .bind(Json(cart))
        .bind(expected_version)
        .fetch_optional(self.pool)
        .await?;

        if let Some(version) = version {
            return Ok(CartState {
                cart: cart.clone(),
                version,
            });
        }

        let current: Option<i64> =
            sqlx::query_scalar("SELECT cart_version FROM storefront.user WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        match current {
            Some(current) => Err(RepositoryError::VersionConflict { current }),
            None => Err(RepositoryError::NotFound),
        }
    }

    // =========================================================================
    // Password requests
    // =========================================================================

    /// Flag a password reset request.
    ///
    /// Returns `false` if no account has this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_password_request(&self, email: &Email) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.user
            SET password_request = TRUE,
                password_requested_at = COALESCE(password_requested_at, NOW())
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List users with an open password request, oldest request first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_password_requests(&self) -> Result<Vec<PasswordRequest>, RepositoryError> {
        let rows = sqlx::query_as::<_, PasswordRequestRow>(
            r"
            SELECT id, name, email, handle, password_requested_at
            FROM storefront.user
            WHERE password_request AND password_requested_at IS NOT NULL
            ORDER BY password_requested_at, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Set a new password hash and clear the request flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn resolve_password_request(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.user
            SET password_hash = $2, password_request = FALSE, password_requested_at = NULL
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(password_hash)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    // Admin views
    // =========================================================================

    /// List all customers ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_summaries(&self) -> Result<Vec<UserSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r"
            SELECT id, name, email, handle
            FROM storefront.user
            ORDER BY name, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Count customer accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM storefront.user")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Transaction helpers
// =============================================================================

/// Lock a user's row for the rest of the transaction.
///
/// Returns `false` if the user doesn't exist.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_for_update<'e>(
    executor: impl PgExecutor<'e>,
    id: UserId,
) -> Result<bool, RepositoryError> {
    let locked: Option<UserId> =
        sqlx::query_scalar("SELECT id FROM storefront.user WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
    Ok(locked.is_some())
}

/// Empty a user's cart and bump its version, returning the new version.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the user doesn't exist.
pub async fn clear_cart<'e>(
    executor: impl PgExecutor<'e>,
    id: UserId,
) -> Result<i64, RepositoryError> {
    sqlx::query_scalar(
        r"
        UPDATE storefront.user
        SET cart = '[]'::jsonb, cart_version = cart_version + 1
        WHERE id = $1
        RETURNING cart_version
        ",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or(RepositoryError::NotFound)
}
