use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sqlx::PgPool;
use tracing::debug;

use crate::auth::Role;
use crate::error::ApiError;
use crate::state::AppState;

use super::auth::AuthUser;

/// Header carrying an explicit tenant override. The verified token's
/// embedded selection remains the authoritative default.
pub const DATABASE_HEADER: &str = "x-database";

/// Resolved tenant database pool, injected by middleware. Domain
/// controllers read this; they never construct their own connections.
#[derive(Clone)]
pub struct TenantPool(pub PgPool);

/// Name of the tenant database the request was resolved against
#[derive(Clone, Debug)]
pub struct SelectedDatabase(pub String);

/// Resolve the request's active tenant connection.
///
/// Runs after token verification. Anonymous requests get the default
/// tenant pool; authenticated requests resolve the selected database from
/// the verified claims (or the override header). This is purely a
/// resolution step; it never decides authorization.
pub async fn select_database_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request.extensions().get::<AuthUser>().cloned();

    match auth_user {
        None => {
            let pool = state.registry.default_pool().await?;
            request.extensions_mut().insert(TenantPool(pool));
        }
        Some(user) => {
            let override_header = request
                .headers()
                .get(DATABASE_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);

            let name = resolve_database_name(&user, override_header.as_deref())?;

            // The selection must name a registered, active tenant; a
            // transient connection failure is a different error
            state
                .credentials
                .find_tenant_database(&name)
                .await?
                .ok_or_else(|| ApiError::TenantNotFound(name.clone()))?;

            let pool = state.registry.get(&name).await?;
            debug!("Resolved tenant database '{}' for {}", name, user.username);

            request.extensions_mut().insert(SelectedDatabase(name));
            request.extensions_mut().insert(TenantPool(pool));
        }
    }

    Ok(next.run(request).await)
}

/// Pick the database name for an authenticated request: the override
/// header when present and authorized, otherwise the token's selection.
fn resolve_database_name(user: &AuthUser, override_header: Option<&str>) -> Result<String, ApiError> {
    if let Some(name) = override_header.filter(|s| !s.is_empty()) {
        let authorized =
            user.role == Role::Master || user.databases.iter().any(|g| g.db_name == name);
        if !authorized {
            return Err(ApiError::forbidden(format!(
                "Database '{}' is not among the caller's grants",
                name
            )));
        }
        return Ok(name.to_string());
    }

    user.current_database.clone().ok_or(ApiError::NoDatabaseSelected)
}
