use serde_json::{json, Value};

use crate::auth::Claims;

/// Standard session payload returned by login and database-switch.
pub fn session_response(token: String, claims: &Claims, expires_in: i64) -> Value {
    json!({
        "success": true,
        "data": {
            "token": token,
            "user": {
                "userId": claims.user_id.to_string(),
                "username": claims.username,
                "role": claims.role,
                "databases": claims.databases,
                "currentDatabase": claims.current_database,
            },
            "expires_in": expires_in,
        }
    })
}
