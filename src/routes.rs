use axum::{
    middleware::{from_fn, from_fn_with_state},
    response::Json,
    routing::{delete, get, post, put},
    Extension, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::handlers::{elevated::root::database, protected, public};
use crate::middleware::{
    jwt_auth_middleware, require_auth_middleware, require_master_middleware,
    select_database_middleware, SelectedDatabase, TenantPool,
};
use crate::state::AppState;

/// Build the full application router.
///
/// The token-verification layer wraps everything, so verification always
/// precedes authorization, which precedes database resolution.
pub fn app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/login", post(public::auth::login_post));

    // Tenant-scoped routes resolve a database pool: the token's selection
    // for authenticated callers, the default tenant for anonymous ones.
    // Domain controllers (invoicing, stock, appointments, ...) mount here.
    let tenant_routes = Router::new()
        .route("/api/ping", get(ping))
        .layer(from_fn_with_state(state.clone(), select_database_middleware));

    let session_routes = Router::new()
        .route("/api/auth/whoami", get(protected::auth::whoami_get))
        .route("/api/auth/database", post(protected::auth::database_post))
        .route("/api/auth/session", delete(protected::auth::session_delete))
        .layer(from_fn(require_auth_middleware));

    let root_routes = Router::new()
        .route(
            "/api/root/databases",
            get(database::database_list).post(database::database_create),
        )
        .route("/api/root/databases/sync", post(database::schemas_sync))
        .route("/api/root/databases/:name", delete(database::database_delete))
        .route("/api/root/databases/:name/users", put(database::user_assign))
        .route(
            "/api/root/databases/:name/users/:user_id",
            delete(database::user_revoke),
        )
        .layer(from_fn(require_master_middleware));

    Router::new()
        .merge(public_routes)
        .merge(tenant_routes)
        .merge(session_routes)
        .merge(root_routes)
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Optica API (Rust)",
            "version": version,
            "description": "Multi-tenant back-office API for optics retail management",
            "endpoints": {
                "home": "/ (public)",
                "login": "/auth/login (public - token acquisition)",
                "session": "/api/auth/* (protected - whoami, database switch, logout)",
                "ping": "/api/ping (tenant-scoped liveness)",
                "root": "/api/root/* (restricted, master role only)",
            }
        }
    }))
}

/// Liveness plus master-database connectivity.
async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    let ping = match state.registry.master_pool().await {
        Ok(pool) => sqlx::query("SELECT 1").execute(&pool).await.map(|_| ()).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };

    match ping {
        Ok(()) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": { "status": "degraded", "timestamp": now, "database_error": e }
            })),
        ),
    }
}

/// Tenant-scoped liveness: pings the resolved tenant pool.
async fn ping(
    Extension(TenantPool(pool)): Extension<TenantPool>,
    selected: Option<Extension<SelectedDatabase>>,
) -> Result<Json<Value>, ApiError> {
    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "database": selected.map(|Extension(SelectedDatabase(name))| name),
        }
    })))
}
