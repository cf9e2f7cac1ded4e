use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Registered tenant database row in the master `databases` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TenantDatabase {
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}
