use chrono::{DateTime, Utc};
use serde::Serialize;

/// A registered user. The stored bcrypt hash never leaves the db layer,
/// so this type is safe to serialize in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
