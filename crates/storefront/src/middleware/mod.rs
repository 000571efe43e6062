//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS
//! 5. Rate limiting on auth routes (governor)
//!
//! Bearer authentication is done per handler via the [`RequireUser`] and
//! [`RequireAdmin`] extractors.

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{CurrentUser, RequireAdmin, RequireUser};
pub use rate_limit::{auth_rate_limiter, json_rate_limit_response};
pub use request_id::request_id_middleware;
