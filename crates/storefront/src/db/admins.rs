//! Admin repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use brandshop_core::{AdminId, Email};

use super::{RepositoryError, map_unique_violation};
use crate::models::Admin;

#[derive(Debug, sqlx::FromRow)]
struct AdminRow {
    id: AdminId,
    email: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdminRow> for Admin {
    type Error = RepositoryError;

    fn try_from(row: AdminRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            email,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AdminCredentialsRow {
    #[sqlx(flatten)]
    admin: AdminRow,
    password_hash: String,
}

/// Repository for admin database operations.
pub struct AdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminRepository<'a> {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an admin and their password hash by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(Admin, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminCredentialsRow>(
            r"
            SELECT id, email, created_at, password_hash
            FROM storefront.admin
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some((row.admin.try_into()?, row.password_hash))),
            None => Ok(None),
        }
    }

    /// Create a new admin.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, email: &Email, password_hash: &str) -> Result<Admin, RepositoryError> {
        let row = sqlx::query_as::<_, AdminRow>(
            r"
            INSERT INTO storefront.admin (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, created_at
            ",
        )
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(map_unique_violation)?;

        row.try_into()
    }
}
