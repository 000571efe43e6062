//! Authentication service.
//!
//! Password signup and login for customers and admins, password reset
//! requests, and bearer token issuing.

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, TokenError, TokenIssuer};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::Rng;
use serde::Serialize;
use sqlx::PgPool;

use brandshop_core::{Email, UserId};

use crate::db::users::{EMAIL_CONSTRAINT, HANDLE_CONSTRAINT};
use crate::db::{AdminRepository, RepositoryError, UserRepository};
use crate::models::{Admin, CartState, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// How many generated handles to try before giving up on signup.
pub const MAX_HANDLE_ATTEMPTS: u32 = 5;

/// A signed-in customer: token, profile and persisted cart.
#[derive(Debug, Serialize)]
pub struct UserSession {
    pub token: String,
    pub user: User,
    #[serde(flatten)]
    pub cart: CartState,
}

/// A signed-in admin.
#[derive(Debug, Serialize)]
pub struct AdminSession {
    pub token: String,
    pub admin: Admin,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    admins: AdminRepository<'a>,
    tokens: &'a TokenIssuer,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenIssuer) -> Self {
        Self {
            users: UserRepository::new(pool),
            admins: AdminRepository::new(pool),
            tokens,
        }
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Register a new customer and sign them in.
    ///
    /// The account starts verified with an empty cart and a generated
    /// `User_NNNN` handle.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    /// Returns `AuthError::HandleExhausted` if no free handle was found.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<UserSession, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        if self.users.email_exists(&email).await? {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(password)?;
        let name = name.map(str::trim).unwrap_or_default();

        let mut attempts = 0;
        let user = loop {
            attempts += 1;
            let handle = generate_handle();
            match self.users.create(&email, &password_hash, name, &handle).await {
                Ok(user) => break user,
                Err(RepositoryError::Conflict(constraint)) if constraint == HANDLE_CONSTRAINT => {
                    tracing::warn!(attempts, "Handle collision during signup, retrying");
                    if attempts >= MAX_HANDLE_ATTEMPTS {
                        return Err(AuthError::HandleExhausted(attempts));
                    }
                }
                Err(RepositoryError::Conflict(constraint)) if constraint == EMAIL_CONSTRAINT => {
                    return Err(AuthError::UserAlreadyExists);
                }
                Err(e) => return Err(e.into()),
            }
        };

        tracing::info!(user_id = %user.id, handle = %user.handle, "User created");

        let token = self.tokens.issue_user(user.id, &user.email)?;
        Ok(UserSession {
            token,
            user,
            cart: CartState::default(),
        })
    }

    /// Sign a customer in, returning their persisted cart.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserSession, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash, cart) = self
            .users
            .get_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let token = self.tokens.issue_user(user.id, &user.email)?;
        Ok(UserSession { token, user, cart })
    }

    /// Flag a password reset request for an admin to resolve.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account has this email.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        if !self.users.set_password_request(&email).await? {
            return Err(AuthError::UserNotFound);
        }
        tracing::info!("Password reset requested");
        Ok(())
    }

    /// Set a new password for a customer and clear their reset request.
    ///
    /// Delivery to the customer is simulated with a log line; the password
    /// itself is never logged.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn resolve_password_request(
        &self,
        user_id: UserId,
        password: &str,
    ) -> Result<(), AuthError> {
        validate_password(password)?;
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let password_hash = hash_password(password)?;
        self.users
            .resolve_password_request(user_id, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(
            user_id = %user.id,
            email_domain = user.email.domain(),
            "New password sent to user (simulated)"
        );
        Ok(())
    }

    // =========================================================================
    // Admins
    // =========================================================================

    /// Sign an admin in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn admin_login(&self, email: &str, password: &str) -> Result<AdminSession, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (admin, password_hash) = self
            .admins
            .get_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let token = self.tokens.issue_admin(admin.id, &admin.email)?;
        Ok(AdminSession { token, admin })
    }
}

/// Create an admin account.
///
/// Admins are provisioned from the CLI, never over HTTP.
///
/// # Errors
///
/// Returns `AuthError::InvalidEmail` if the email format is invalid.
/// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
/// Returns `AuthError::UserAlreadyExists` if the email is already registered.
pub async fn create_admin(pool: &PgPool, email: &str, password: &str) -> Result<Admin, AuthError> {
    let email = Email::parse(email)?;
    validate_password(password)?;
    let password_hash = hash_password(password)?;

    AdminRepository::new(pool)
        .create(&email, &password_hash)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })
}

/// Generate a public handle of the form `User_NNNN`.
fn generate_handle() -> String {
    let suffix: u16 = rand::rng().random_range(1000..=9999);
    format!("User_{suffix}")
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse battery", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("longenough").is_ok());
    }

    #[test]
    fn test_generated_handle_format() {
        for _ in 0..50 {
            let handle = generate_handle();
            let digits = handle.strip_prefix("User_").unwrap();
            let value: u16 = digits.parse().unwrap();
            assert!((1000..=9999).contains(&value));
        }
    }
}
