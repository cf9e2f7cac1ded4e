// handlers/protected/auth/whoami.rs - GET /api/auth/whoami handler

use axum::{response::Json, Extension};
use serde_json::{json, Value};

use crate::middleware::AuthUser;

/// Current authenticated user, as seen by the verified token.
pub async fn whoami_get(Extension(user): Extension<AuthUser>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "userId": user.identity.to_string(),
            "username": user.username,
            "role": user.role,
            "databases": user.databases,
            "currentDatabase": user.current_database,
        }
    }))
}
