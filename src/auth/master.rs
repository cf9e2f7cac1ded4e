use crate::auth::{Claims, DatabaseAccess, Identity, Role, TenantRole, TokenError, TokenService};
use crate::config::SecurityConfig;

/// Check a login attempt against the configured master credential pair.
///
/// The master identity is configuration, not data: it is never looked up in
/// the credential store. An unset pair means master login is disabled.
pub fn is_master_credentials(security: &SecurityConfig, username: &str, password: &str) -> bool {
    !security.master_username.is_empty()
        && !security.master_password.is_empty()
        && username == security.master_username
        && password == security.master_password
}

/// Coerce a grant list to `admin` on every database.
///
/// The master's access never derives from stored per-database roles; the
/// override happens here, at token-issuance time, and is never persisted.
pub fn master_grants<I>(databases: I) -> Vec<DatabaseAccess>
where
    I: IntoIterator<Item = DatabaseAccess>,
{
    databases
        .into_iter()
        .map(|grant| DatabaseAccess { rol: TenantRole::Admin, ..grant })
        .collect()
}

/// Issue a master session token covering every registered tenant database.
pub fn create_master_token(
    tokens: &TokenService,
    security: &SecurityConfig,
    databases: Vec<DatabaseAccess>,
    current_database: Option<String>,
) -> Result<(String, Claims), TokenError> {
    tokens.issue_claims(
        Identity::ConfiguredSuperuser,
        security.master_username.clone(),
        Role::Master,
        master_grants(databases),
        current_database,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security() -> SecurityConfig {
        SecurityConfig {
            enable_cors: false,
            cors_origins: vec![],
            jwt_secret: "test-secret".to_string(),
            jwt_expiry_hours: 24,
            master_username: "master".to_string(),
            master_password: "s3cret".to_string(),
        }
    }

    #[test]
    fn master_credentials_require_exact_pair() {
        let sec = security();
        assert!(is_master_credentials(&sec, "master", "s3cret"));
        assert!(!is_master_credentials(&sec, "master", "wrong"));
        assert!(!is_master_credentials(&sec, "Master", "s3cret"));
        assert!(!is_master_credentials(&sec, "", ""));
    }

    #[test]
    fn unset_pair_disables_master_login() {
        let mut sec = security();
        sec.master_username.clear();
        sec.master_password.clear();
        assert!(!is_master_credentials(&sec, "", ""));
    }

    #[test]
    fn master_token_coerces_every_grant_to_admin() {
        let sec = security();
        let tokens = TokenService::from_config(&sec);

        // Stored per-database roles differ; the master token must not care
        let registered = vec![
            DatabaseAccess::new("acme", TenantRole::User),
            DatabaseAccess::new("globex", TenantRole::Admin),
        ];
        let (_, claims) =
            create_master_token(&tokens, &sec, registered, Some("acme".into())).unwrap();

        assert_eq!(claims.user_id, Identity::ConfiguredSuperuser);
        assert_eq!(claims.role, Role::Master);
        assert_eq!(claims.databases.len(), 2);
        assert!(claims.databases.iter().all(|g| g.rol == TenantRole::Admin));
        assert_eq!(claims.current_database.as_deref(), Some("acme"));
    }
}
