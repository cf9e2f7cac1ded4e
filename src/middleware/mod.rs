pub mod auth;
pub mod authorize;
pub mod select_database;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use authorize::{
    require_auth_middleware, require_master_middleware, require_permission, require_role,
};
pub use select_database::{select_database_middleware, SelectedDatabase, TenantPool, DATABASE_HEADER};
