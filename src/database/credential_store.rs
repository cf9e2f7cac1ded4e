use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::DatabaseAccess;
use crate::database::models::{TenantDatabase, User, UserDatabaseRow};
use crate::database::registry::TenantRegistry;
use crate::error::ApiError;

/// Read-mostly interface over the master database's identity tables.
///
/// The core reads through this at login and database-switch time; its only
/// write is the last-login timestamp. User and grant mutation belongs to
/// the control plane.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;

    async fn list_database_access(&self, user_id: Uuid) -> Result<Vec<DatabaseAccess>, ApiError>;

    /// Active registered tenants, for synthesizing the master grant set.
    async fn list_tenant_databases(&self) -> Result<Vec<TenantDatabase>, ApiError>;

    /// Selection check: is this name a registered, active tenant?
    async fn find_tenant_database(&self, name: &str) -> Result<Option<TenantDatabase>, ApiError>;

    async fn record_login(&self, user_id: Uuid) -> Result<(), ApiError>;
}

/// Credential store backed by the master database.
pub struct PgCredentialStore {
    registry: Arc<TenantRegistry>,
}

impl PgCredentialStore {
    pub fn new(registry: Arc<TenantRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let pool = self.registry.master_pool().await?;
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, rol, last_login_at, created_at \
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&pool)
        .await?;
        Ok(user)
    }

    async fn list_database_access(&self, user_id: Uuid) -> Result<Vec<DatabaseAccess>, ApiError> {
        let pool = self.registry.master_pool().await?;
        let rows = sqlx::query_as::<_, UserDatabaseRow>(
            "SELECT user_id, db_name, rol FROM user_databases \
             WHERE user_id = $1 ORDER BY db_name",
        )
        .bind(user_id)
        .fetch_all(&pool)
        .await?;
        Ok(rows.into_iter().map(DatabaseAccess::from).collect())
    }

    async fn list_tenant_databases(&self) -> Result<Vec<TenantDatabase>, ApiError> {
        let pool = self.registry.master_pool().await?;
        let rows = sqlx::query_as::<_, TenantDatabase>(
            "SELECT name, active, created_at FROM databases WHERE active ORDER BY name",
        )
        .fetch_all(&pool)
        .await?;
        Ok(rows)
    }

    async fn find_tenant_database(&self, name: &str) -> Result<Option<TenantDatabase>, ApiError> {
        let pool = self.registry.master_pool().await?;
        let row = sqlx::query_as::<_, TenantDatabase>(
            "SELECT name, active, created_at FROM databases WHERE name = $1 AND active",
        )
        .bind(name)
        .fetch_optional(&pool)
        .await?;
        Ok(row)
    }

    async fn record_login(&self, user_id: Uuid) -> Result<(), ApiError> {
        let pool = self.registry.master_pool().await?;
        sqlx::query("UPDATE users SET last_login_at = now() WHERE id = $1")
            .bind(user_id)
            .execute(&pool)
            .await?;
        Ok(())
    }
}
