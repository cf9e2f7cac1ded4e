// handlers/protected/auth/logout.rs - DELETE /api/auth/session handler

use axum::{extract::State, response::Json, Extension};
use serde_json::{json, Value};
use tracing::info;

use crate::middleware::AuthUser;
use crate::state::AppState;

/// Revoke every session the calling identity holds.
///
/// Sessions are stateless, so this is the only revocation the product
/// offers: tokens issued before this instant stop verifying.
pub async fn session_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Json<Value> {
    state.revocations.revoke_all(&user.identity);
    info!("Revoked all sessions for {}", user.identity);

    Json(json!({
        "success": true,
        "data": { "revoked": true }
    }))
}
