use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::database::registry::TenantRegistry;
use crate::error::ApiError;

/// Fine-grained permission lookup for `user`-role callers.
///
/// Admin and master bypass this entirely; the check is scoped to the
/// tenant database the caller has selected.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    async fn is_granted(
        &self,
        user_id: Uuid,
        database: &str,
        resource: &str,
        action: &str,
    ) -> Result<bool, ApiError>;
}

/// Permission store reading the tenant database's `user_permissions` table.
pub struct PgPermissionStore {
    registry: Arc<TenantRegistry>,
}

impl PgPermissionStore {
    pub fn new(registry: Arc<TenantRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl PermissionStore for PgPermissionStore {
    async fn is_granted(
        &self,
        user_id: Uuid,
        database: &str,
        resource: &str,
        action: &str,
    ) -> Result<bool, ApiError> {
        let pool = self.registry.get(database).await?;
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_permissions \
             WHERE user_id = $1 AND resource = $2 AND action = $3",
        )
        .bind(user_id)
        .bind(resource)
        .bind(action)
        .fetch_one(&pool)
        .await?;
        Ok(count > 0)
    }
}

/// Fixed permission set, for tests and local development.
#[derive(Default)]
pub struct StaticPermissions {
    granted: HashSet<(Uuid, String, String, String)>,
}

impl StaticPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, user_id: Uuid, database: &str, resource: &str, action: &str) -> Self {
        self.granted
            .insert((user_id, database.to_string(), resource.to_string(), action.to_string()));
        self
    }
}

#[async_trait]
impl PermissionStore for StaticPermissions {
    async fn is_granted(
        &self,
        user_id: Uuid,
        database: &str,
        resource: &str,
        action: &str,
    ) -> Result<bool, ApiError> {
        Ok(self.granted.contains(&(
            user_id,
            database.to_string(),
            resource.to_string(),
            action.to_string(),
        )))
    }
}
