//! Admin account type.

use brandshop_core::{AdminId, Email};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A store administrator.
#[derive(Debug, Clone, Serialize)]
pub struct Admin {
    pub id: AdminId,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}
