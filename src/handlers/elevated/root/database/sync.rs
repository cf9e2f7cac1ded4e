// handlers/elevated/root/database/sync.rs - POST /api/root/databases/sync handler

use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::TenantService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SyncSchemasRequest {
    pub statements: Vec<String>,
}

/// Apply schema statements across every active tenant database.
///
/// Per-tenant failures are reported, not fatal; the response carries one
/// outcome per tenant.
pub async fn schemas_sync(
    State(state): State<AppState>,
    Json(payload): Json<SyncSchemasRequest>,
) -> Result<Json<Value>, ApiError> {
    let outcomes = TenantService::new(state.registry.clone())
        .sync_schemas(&payload.statements)
        .await?;

    let failed = outcomes.iter().filter(|o| !o.ok).count();
    Ok(Json(json!({
        "success": failed == 0,
        "data": { "results": outcomes, "failed": failed }
    })))
}
