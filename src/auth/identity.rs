use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Base role carried by a session token, ordered by privilege.
///
/// `User` is tenant-scoped and permission-gated, `Admin` has full access
/// within its assigned tenants, `Master` is the configured superuser with
/// implicit admin access to every tenant and exclusive control-plane access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Master,
}

/// Role scoped to a single tenant database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantRole {
    User,
    Admin,
}

impl TenantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantRole::User => "user",
            TenantRole::Admin => "admin",
        }
    }
}

/// Grant binding a user to one tenant database with a role scoped to it.
///
/// Wire shape matches the token payload: `{"dbName": ..., "rol": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseAccess {
    #[serde(rename = "dbName")]
    pub db_name: String,
    pub rol: TenantRole,
}

impl DatabaseAccess {
    pub fn new(db_name: impl Into<String>, rol: TenantRole) -> Self {
        Self { db_name: db_name.into(), rol }
    }
}

/// Who a session token belongs to.
///
/// The configured superuser is a distinct variant rather than a stored row
/// with a sentinel id, so master-only logic (full-grant synthesis, control
/// plane access) cannot accidentally apply to a stored user whose id happens
/// to collide. Serializes as the string `"master"` or the user's UUID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Identity {
    ConfiguredSuperuser,
    StoredUser(Uuid),
}

impl Identity {
    pub fn is_master(&self) -> bool {
        matches!(self, Identity::ConfiguredSuperuser)
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Identity::ConfiguredSuperuser => None,
            Identity::StoredUser(id) => Some(*id),
        }
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        match identity {
            Identity::ConfiguredSuperuser => "master".to_string(),
            Identity::StoredUser(id) => id.to_string(),
        }
    }
}

impl TryFrom<String> for Identity {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == "master" {
            return Ok(Identity::ConfiguredSuperuser);
        }
        Uuid::parse_str(&value)
            .map(Identity::StoredUser)
            .map_err(|_| format!("invalid user id: {}", value))
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identity::ConfiguredSuperuser => write!(f, "master"),
            Identity::StoredUser(id) => write!(f, "{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ordering_matches_privilege() {
        assert!(Role::User < Role::Admin);
        assert!(Role::Admin < Role::Master);
    }

    #[test]
    fn identity_roundtrips_through_strings() {
        let id = Uuid::new_v4();
        let stored = Identity::StoredUser(id);
        let s: String = stored.clone().into();
        assert_eq!(Identity::try_from(s).unwrap(), stored);

        let master: String = Identity::ConfiguredSuperuser.into();
        assert_eq!(master, "master");
        assert_eq!(Identity::try_from(master).unwrap(), Identity::ConfiguredSuperuser);
    }

    #[test]
    fn grant_serializes_with_wire_field_names() {
        let grant = DatabaseAccess::new("acme", TenantRole::User);
        let v = serde_json::to_value(&grant).unwrap();
        assert_eq!(v, serde_json::json!({"dbName": "acme", "rol": "user"}));
    }

    #[test]
    fn rejects_garbage_user_ids() {
        assert!(Identity::try_from("not-a-uuid".to_string()).is_err());
    }
}
