//! User domain types.

use brandshop_core::{Cart, Email, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A storefront customer.
///
/// Never carries the password hash; see [`crate::db::users`] for credential
/// lookups.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    /// Public handle, `User_NNNN`.
    pub handle: String,
    pub bio: Option<String>,
    pub address: Option<String>,
    pub is_verified: bool,
    pub password_request: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The persisted cart snapshot and its version.
///
/// `version` increases by one on every write, which lets clients opt into
/// compare-and-swap updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartState {
    pub cart: Cart,
    #[serde(rename = "cart_version")]
    pub version: i64,
}

/// Admin listing entry.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub handle: String,
}

/// A customer waiting on a password reset.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordRequest {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub handle: String,
    /// First time the customer asked, kept across repeated requests.
    pub requested_at: DateTime<Utc>,
}
