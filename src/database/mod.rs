pub mod credential_store;
pub mod models;
pub mod permission_store;
pub mod registry;

pub use credential_store::{CredentialStore, PgCredentialStore};
pub use permission_store::{PermissionStore, PgPermissionStore, StaticPermissions};
pub use registry::{RegistryError, TenantRegistry};
