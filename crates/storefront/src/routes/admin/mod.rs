//! Admin API route handlers.
//!
//! Everything except `login` requires an admin token via [`RequireAdmin`].
//!
//! [`RequireAdmin`]: crate::middleware::RequireAdmin

pub mod accounts;
pub mod auth;
pub mod catalog;
pub mod messaging;
