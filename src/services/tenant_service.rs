use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::TenantRole;
use crate::config;
use crate::database::models::TenantDatabase;
use crate::database::registry::{RegistryError, TenantRegistry};
use crate::error::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum TenantOpsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Tenant already exists: {0}")]
    AlreadyExists(String),

    #[error("Tenant not found: {0}")]
    NotFound(String),

    #[error("Invalid tenant name: {0}")]
    InvalidName(String),
}

impl From<TenantOpsError> for ApiError {
    fn from(err: TenantOpsError) -> Self {
        match err {
            TenantOpsError::AlreadyExists(name) => {
                ApiError::conflict(format!("Database '{}' already exists", name))
            }
            TenantOpsError::NotFound(name) => ApiError::TenantNotFound(name),
            TenantOpsError::InvalidName(msg) => ApiError::bad_request(msg),
            TenantOpsError::Database(e) => e.into(),
            TenantOpsError::Registry(e) => e.into(),
        }
    }
}

/// Per-tenant outcome of a cross-tenant schema sync
#[derive(Debug, Serialize)]
pub struct SyncOutcome {
    pub database: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Control-plane operations on tenant databases: provisioning, teardown,
/// grant assignment and cross-tenant schema sync. All callers are gated to
/// the master role before reaching this service.
pub struct TenantService {
    registry: Arc<TenantRegistry>,
}

impl TenantService {
    pub fn new(registry: Arc<TenantRegistry>) -> Self {
        Self { registry }
    }

    /// Provision a tenant database and register it.
    ///
    /// When a template database is configured the new database is cloned
    /// from it; otherwise it starts empty and a later schema sync fills it.
    pub async fn create_database(&self, name: &str) -> Result<TenantDatabase, TenantOpsError> {
        self.validate_name(name)?;

        let master = self.registry.master_pool().await?;
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM databases WHERE name = $1")
            .bind(name)
            .fetch_one(&master)
            .await?;
        if existing > 0 {
            return Err(TenantOpsError::AlreadyExists(name.to_string()));
        }

        let admin = self.registry.admin_pool().await?;
        let ddl = match &config::config().database.template_database {
            Some(template) => format!(
                "CREATE DATABASE {} WITH TEMPLATE {}",
                TenantRegistry::quote_identifier(name),
                TenantRegistry::quote_identifier(template)
            ),
            None => format!("CREATE DATABASE {}", TenantRegistry::quote_identifier(name)),
        };
        sqlx::query(&ddl).execute(&admin).await?;

        let row = sqlx::query_as::<_, TenantDatabase>(
            "INSERT INTO databases (name, active) VALUES ($1, true) \
             RETURNING name, active, created_at",
        )
        .bind(name)
        .fetch_one(&master)
        .await?;

        info!("Created tenant database: {}", name);
        Ok(row)
    }

    /// List every registered tenant database, active or not.
    pub async fn list_databases(&self) -> Result<Vec<TenantDatabase>, TenantOpsError> {
        let master = self.registry.master_pool().await?;
        let rows = sqlx::query_as::<_, TenantDatabase>(
            "SELECT name, active, created_at FROM databases ORDER BY name",
        )
        .fetch_all(&master)
        .await?;
        Ok(rows)
    }

    /// Tear a tenant down: deregister, drop its grants, evict the cached
    /// pool, then drop the physical database.
    pub async fn delete_database(&self, name: &str) -> Result<(), TenantOpsError> {
        self.validate_name(name)?;

        let master = self.registry.master_pool().await?;
        let deleted = sqlx::query("DELETE FROM databases WHERE name = $1")
            .bind(name)
            .execute(&master)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(TenantOpsError::NotFound(name.to_string()));
        }
        sqlx::query("DELETE FROM user_databases WHERE db_name = $1")
            .bind(name)
            .execute(&master)
            .await?;

        // Close our own connections before asking postgres to drop
        self.registry.evict(name).await;

        let admin = self.registry.admin_pool().await?;
        let ddl = format!(
            "DROP DATABASE IF EXISTS {} WITH (FORCE)",
            TenantRegistry::quote_identifier(name)
        );
        sqlx::query(&ddl).execute(&admin).await?;

        info!("Deleted tenant database: {}", name);
        Ok(())
    }

    /// Grant a user access to a tenant database, updating the role if the
    /// grant already exists.
    pub async fn assign_user(
        &self,
        name: &str,
        user_id: Uuid,
        rol: TenantRole,
    ) -> Result<(), TenantOpsError> {
        let master = self.registry.master_pool().await?;
        self.require_registered(&master, name).await?;

        sqlx::query(
            "INSERT INTO user_databases (user_id, db_name, rol) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, db_name) DO UPDATE SET rol = EXCLUDED.rol",
        )
        .bind(user_id)
        .bind(name)
        .bind(rol.as_str())
        .execute(&master)
        .await?;

        info!("Assigned user {} to database '{}' as {}", user_id, name, rol.as_str());
        Ok(())
    }

    /// Remove a user's grant on a tenant database. Idempotent.
    pub async fn revoke_user(&self, name: &str, user_id: Uuid) -> Result<(), TenantOpsError> {
        let master = self.registry.master_pool().await?;
        self.require_registered(&master, name).await?;

        sqlx::query("DELETE FROM user_databases WHERE user_id = $1 AND db_name = $2")
            .bind(user_id)
            .bind(name)
            .execute(&master)
            .await?;
        Ok(())
    }

    /// Run schema statements against every active tenant database.
    ///
    /// A failing tenant is recorded and skipped; the sync continues so one
    /// broken tenant cannot block the rest of the fleet.
    pub async fn sync_schemas(&self, statements: &[String]) -> Result<Vec<SyncOutcome>, TenantOpsError> {
        let master = self.registry.master_pool().await?;
        let tenants = sqlx::query_as::<_, TenantDatabase>(
            "SELECT name, active, created_at FROM databases WHERE active ORDER BY name",
        )
        .fetch_all(&master)
        .await?;

        let mut outcomes = Vec::with_capacity(tenants.len());
        for tenant in tenants {
            let outcome = self.apply_statements(&tenant.name, statements).await;
            match outcome {
                Ok(()) => outcomes.push(SyncOutcome { database: tenant.name, ok: true, error: None }),
                Err(e) => {
                    warn!("Schema sync failed for '{}': {}", tenant.name, e);
                    outcomes.push(SyncOutcome {
                        database: tenant.name,
                        ok: false,
                        error: Some(e.to_string()),
                    });
                }
            }
        }
        Ok(outcomes)
    }

    async fn apply_statements(&self, name: &str, statements: &[String]) -> Result<(), TenantOpsError> {
        let pool = self.registry.get(name).await?;
        for statement in statements {
            sqlx::query(statement).execute(&pool).await?;
        }
        Ok(())
    }

    async fn require_registered(&self, master: &sqlx::PgPool, name: &str) -> Result<(), TenantOpsError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM databases WHERE name = $1")
            .bind(name)
            .fetch_one(master)
            .await?;
        if count == 0 {
            return Err(TenantOpsError::NotFound(name.to_string()));
        }
        Ok(())
    }

    fn validate_name(&self, name: &str) -> Result<(), TenantOpsError> {
        if name == "postgres" || name == self.registry.master_database() {
            return Err(TenantOpsError::InvalidName(format!(
                "'{}' is reserved and cannot be a tenant database",
                name
            )));
        }
        if !TenantRegistry::is_valid_db_name(name) {
            return Err(TenantOpsError::InvalidName(format!(
                "Tenant names must match [a-z][a-z0-9_]*, got '{}'",
                name
            )));
        }
        Ok(())
    }
}
