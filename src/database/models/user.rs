use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::{DatabaseAccess, Role, TenantRole};

/// User row in the master database `users` table.
///
/// The configured master identity never appears here; it exists only in
/// process configuration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// bcrypt hash
    pub password: String,
    pub rol: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn base_role(&self) -> Role {
        match self.rol.as_str() {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

/// Grant row in the master database `user_databases` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserDatabaseRow {
    pub user_id: Uuid,
    pub db_name: String,
    pub rol: String,
}

impl From<UserDatabaseRow> for DatabaseAccess {
    fn from(row: UserDatabaseRow) -> Self {
        let rol = match row.rol.as_str() {
            "admin" => TenantRole::Admin,
            _ => TenantRole::User,
        };
        DatabaseAccess::new(row.db_name, rol)
    }
}
