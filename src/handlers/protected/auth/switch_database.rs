// handlers/protected/auth/switch_database.rs - POST /api/auth/database handler

use axum::{extract::State, response::Json, Extension};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::auth::{create_master_token, DatabaseAccess, Identity, TenantRole};
use crate::config;
use crate::error::ApiError;
use crate::handlers::public::auth::utils::session_response;
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SwitchDatabaseRequest {
    pub database: String,
}

/// Switch the session's selected tenant database.
///
/// Tokens are immutable, so this issues a brand-new one. Grants are
/// re-read from the store at switch time; a request for a database outside
/// them is rejected. Switching to the already-selected database is just a
/// fresh reissue.
pub async fn database_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<SwitchDatabaseRequest>,
) -> Result<Json<Value>, ApiError> {
    let (token, claims) = match &user.identity {
        Identity::ConfiguredSuperuser => {
            let tenants = state.credentials.list_tenant_databases().await?;
            if !tenants.iter().any(|t| t.name == payload.database) {
                return Err(ApiError::TenantNotFound(payload.database));
            }
            let grants: Vec<DatabaseAccess> = tenants
                .into_iter()
                .map(|t| DatabaseAccess::new(t.name, TenantRole::Admin))
                .collect();
            create_master_token(
                &state.tokens,
                &config::config().security,
                grants,
                Some(payload.database.clone()),
            )?
        }
        Identity::StoredUser(id) => {
            let grants = state.credentials.list_database_access(*id).await?;
            if !grants.iter().any(|g| g.db_name == payload.database) {
                return Err(ApiError::forbidden(format!(
                    "Database '{}' is not among your grants",
                    payload.database
                )));
            }
            state.tokens.issue_claims(
                user.identity.clone(),
                user.username.clone(),
                user.role,
                grants,
                Some(payload.database.clone()),
            )?
        }
    };

    info!("{} switched to database '{}'", claims.username, payload.database);
    Ok(Json(session_response(token, &claims, state.tokens.validity_secs())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{InMemoryRevocations, Role, TokenService};
    use crate::database::models::{TenantDatabase, User};
    use crate::database::registry::{Connector, RegistryError, TenantRegistry};
    use crate::database::{CredentialStore, StaticPermissions};
    use crate::error::ApiError;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request as HttpRequest, StatusCode};
    use axum::routing::post;
    use axum::{Extension, Router};
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    struct AliceStore {
        alice_id: Uuid,
    }

    #[async_trait]
    impl CredentialStore for AliceStore {
        async fn find_by_username(&self, _username: &str) -> Result<Option<User>, ApiError> {
            Ok(None)
        }

        async fn list_database_access(
            &self,
            user_id: Uuid,
        ) -> Result<Vec<DatabaseAccess>, ApiError> {
            if user_id == self.alice_id {
                Ok(vec![DatabaseAccess::new("acme", TenantRole::User)])
            } else {
                Ok(vec![])
            }
        }

        async fn list_tenant_databases(&self) -> Result<Vec<TenantDatabase>, ApiError> {
            Ok(vec![])
        }

        async fn find_tenant_database(
            &self,
            _name: &str,
        ) -> Result<Option<TenantDatabase>, ApiError> {
            Ok(None)
        }

        async fn record_login(&self, _user_id: Uuid) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn state_for(alice_id: Uuid) -> AppState {
        let connector: Connector = Arc::new(|database: String| {
            Box::pin(async move {
                PgPoolOptions::new()
                    .connect_lazy(&format!("postgres://u:p@localhost:5432/{}", database))
                    .map_err(|source| RegistryError::Unavailable { database, source })
            })
        });
        AppState {
            registry: Arc::new(TenantRegistry::with_connector(
                connector,
                "optica_master".into(),
                "optica_demo".into(),
            )),
            tokens: Arc::new(TokenService::new("test-secret", 24)),
            credentials: Arc::new(AliceStore { alice_id }),
            permissions: Arc::new(StaticPermissions::new()),
            revocations: Arc::new(InMemoryRevocations::new()),
        }
    }

    async fn switch(database: &str) -> StatusCode {
        let alice_id = Uuid::new_v4();
        let user = AuthUser {
            identity: Identity::StoredUser(alice_id),
            username: "alice".into(),
            role: Role::User,
            databases: vec![DatabaseAccess::new("acme", TenantRole::User)],
            current_database: Some("acme".into()),
        };

        let state = state_for(alice_id);
        let router = Router::new()
            .route("/api/auth/database", post(database_post))
            .layer(Extension(user))
            .with_state(state);

        let req = HttpRequest::builder()
            .method("POST")
            .uri("/api/auth/database")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(format!(r#"{{"database": "{}"}}"#, database)))
            .unwrap();

        router.oneshot(req).await.unwrap().status()
    }

    #[tokio::test]
    async fn switching_outside_grants_is_forbidden() {
        assert_eq!(switch("globex").await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn switching_to_a_granted_database_reissues_a_token() {
        assert_eq!(switch("acme").await, StatusCode::OK);
    }
}
