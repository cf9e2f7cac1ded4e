use axum::{extract::Request, middleware::Next, response::Response};

use crate::auth::Role;
use crate::database::permission_store::PermissionStore;
use crate::error::ApiError;

use super::auth::AuthUser;

/// Reject requests that carry no verified identity.
pub async fn require_auth_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    if request.extensions().get::<AuthUser>().is_none() {
        return Err(ApiError::unauthorized("Authentication required"));
    }
    Ok(next.run(request).await)
}

/// Gate for cross-tenant control-plane endpoints.
pub async fn require_master_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
    require_role(user, Role::Master)?;
    Ok(next.run(request).await)
}

/// Check the caller's base role against a minimum.
pub fn require_role(user: &AuthUser, min: Role) -> Result<(), ApiError> {
    if user.role >= min {
        Ok(())
    } else {
        Err(ApiError::forbidden("Insufficient role for this operation"))
    }
}

/// Fine-grained permission check against the caller's selected database.
///
/// `admin` and `master` bypass the permission table unconditionally; only
/// `user`-role callers consult the store.
pub async fn require_permission(
    permissions: &dyn PermissionStore,
    user: &AuthUser,
    resource: &str,
    action: &str,
) -> Result<(), ApiError> {
    if user.role >= Role::Admin {
        return Ok(());
    }

    let Some(user_id) = user.identity.user_id() else {
        // The configured superuser never reaches here; its role is Master
        return Ok(());
    };

    let database = user
        .current_database
        .as_deref()
        .ok_or(ApiError::NoDatabaseSelected)?;

    if permissions.is_granted(user_id, database, resource, action).await? {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "Permission '{}:{}' not granted",
            resource, action
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{DatabaseAccess, Identity, TenantRole};
    use crate::database::StaticPermissions;
    use uuid::Uuid;

    fn user_with_role(role: Role, id: Uuid) -> AuthUser {
        AuthUser {
            identity: Identity::StoredUser(id),
            username: "alice".into(),
            role,
            databases: vec![DatabaseAccess::new("acme", TenantRole::User)],
            current_database: Some("acme".into()),
        }
    }

    #[test]
    fn role_ordering_gates_operations() {
        let id = Uuid::new_v4();
        assert!(require_role(&user_with_role(Role::User, id), Role::Admin).is_err());
        assert!(require_role(&user_with_role(Role::Admin, id), Role::Admin).is_ok());
        assert!(require_role(&user_with_role(Role::Admin, id), Role::Master).is_err());
        assert!(require_role(&user_with_role(Role::Master, id), Role::Master).is_ok());
    }

    #[tokio::test]
    async fn user_without_grant_is_forbidden() {
        let id = Uuid::new_v4();
        let permissions = StaticPermissions::new();
        let user = user_with_role(Role::User, id);

        let result = require_permission(&permissions, &user, "facturas", "delete").await;
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[tokio::test]
    async fn user_with_grant_passes() {
        let id = Uuid::new_v4();
        let permissions = StaticPermissions::new().grant(id, "acme", "facturas", "delete");
        let user = user_with_role(Role::User, id);

        assert!(require_permission(&permissions, &user, "facturas", "delete").await.is_ok());
    }

    #[tokio::test]
    async fn admin_bypasses_the_permission_table() {
        let id = Uuid::new_v4();
        // Empty table: an admin must still pass
        let permissions = StaticPermissions::new();
        let admin = user_with_role(Role::Admin, id);

        assert!(require_permission(&permissions, &admin, "facturas", "delete").await.is_ok());
    }

    #[tokio::test]
    async fn user_without_selected_database_cannot_be_checked() {
        let id = Uuid::new_v4();
        let permissions = StaticPermissions::new().grant(id, "acme", "facturas", "delete");
        let mut user = user_with_role(Role::User, id);
        user.current_database = None;

        let result = require_permission(&permissions, &user, "facturas", "delete").await;
        assert!(matches!(result, Err(ApiError::NoDatabaseSelected)));
    }
}
