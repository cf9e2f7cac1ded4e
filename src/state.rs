use std::sync::Arc;

use crate::auth::{InMemoryRevocations, TokenService};
use crate::config::AppConfig;
use crate::database::registry::RegistryError;
use crate::database::{
    CredentialStore, PgCredentialStore, PgPermissionStore, PermissionStore, TenantRegistry,
};

/// Shared application state: the owned, lifecycle-managed components.
///
/// Constructed once at process start; the registry inside is shut down once
/// at process exit.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<TenantRegistry>,
    pub tokens: Arc<TokenService>,
    pub credentials: Arc<dyn CredentialStore>,
    pub permissions: Arc<dyn PermissionStore>,
    pub revocations: Arc<InMemoryRevocations>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Result<Self, RegistryError> {
        let registry = Arc::new(TenantRegistry::new(&config.database)?);
        let revocations = Arc::new(InMemoryRevocations::new());
        let tokens = Arc::new(
            TokenService::from_config(&config.security).with_revocations(revocations.clone()),
        );
        let credentials: Arc<dyn CredentialStore> =
            Arc::new(PgCredentialStore::new(registry.clone()));
        let permissions: Arc<dyn PermissionStore> =
            Arc::new(PgPermissionStore::new(registry.clone()));

        Ok(Self { registry, tokens, credentials, permissions, revocations })
    }
}
