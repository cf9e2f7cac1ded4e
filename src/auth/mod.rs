use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

pub mod identity;
pub mod master;
pub mod password;
pub mod token;

pub use identity::{DatabaseAccess, Identity, Role, TenantRole};
pub use master::{create_master_token, is_master_credentials, master_grants};
pub use token::{InMemoryRevocations, RevocationList, TokenError, TokenService};

/// Session token payload.
///
/// The token is the sole source of truth for role and grant data during
/// request handling; no per-request user lookup happens. Immutable once
/// issued: switching databases means issuing a new token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: Identity,
    pub username: String,
    pub role: Role,
    pub databases: Vec<DatabaseAccess>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_database: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(
        user_id: Identity,
        username: String,
        role: Role,
        databases: Vec<DatabaseAccess>,
        current_database: Option<String>,
        validity: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            username,
            role,
            databases,
            current_database,
            iat: now.timestamp(),
            exp: (now + validity).timestamp(),
        }
    }

    /// Whether this token's grant list covers the given database.
    /// The master identity implicitly covers every database.
    pub fn has_database(&self, db_name: &str) -> bool {
        self.role == Role::Master || self.databases.iter().any(|g| g.db_name == db_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn claims_serialize_with_camel_case_wire_shape() {
        let claims = Claims::new(
            Identity::StoredUser(Uuid::nil()),
            "alice".into(),
            Role::User,
            vec![DatabaseAccess::new("acme", TenantRole::User)],
            Some("acme".into()),
            Duration::hours(24),
        );
        let v = serde_json::to_value(&claims).unwrap();
        assert_eq!(v["username"], "alice");
        assert_eq!(v["role"], "user");
        assert_eq!(v["currentDatabase"], "acme");
        assert_eq!(v["databases"][0]["dbName"], "acme");
        assert_eq!(v["databases"][0]["rol"], "user");
        assert!(v["exp"].as_i64().unwrap() > v["iat"].as_i64().unwrap());
    }

    #[test]
    fn master_covers_any_database() {
        let claims = Claims::new(
            Identity::ConfiguredSuperuser,
            "master".into(),
            Role::Master,
            vec![],
            None,
            Duration::hours(1),
        );
        assert!(claims.has_database("anything"));

        let user = Claims::new(
            Identity::StoredUser(Uuid::nil()),
            "alice".into(),
            Role::User,
            vec![DatabaseAccess::new("acme", TenantRole::User)],
            Some("acme".into()),
            Duration::hours(1),
        );
        assert!(user.has_database("acme"));
        assert!(!user.has_database("globex"));
    }
}
