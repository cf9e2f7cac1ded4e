use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{Claims, DatabaseAccess, Identity, Role};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context extracted from a verified session token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub identity: Identity,
    pub username: String,
    pub role: Role,
    pub databases: Vec<DatabaseAccess>,
    pub current_database: Option<String>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            identity: claims.user_id,
            username: claims.username,
            role: claims.role,
            databases: claims.databases,
            current_database: claims.current_database,
        }
    }
}

/// Token verification middleware.
///
/// A request without an Authorization header passes through anonymous so
/// public endpoints keep working; a present-but-invalid token is rejected
/// here, before any authorization or database resolution runs.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(token) = extract_bearer(request.headers())? {
        let claims = state.tokens.verify(&token)?;
        request.extensions_mut().insert(AuthUser::from(claims));
    }

    Ok(next.run(request).await)
}

/// Extract the bearer token from the Authorization header, if any
fn extract_bearer(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(auth_header) = headers.get("authorization") else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(ApiError::unauthorized("Authorization header must use Bearer token format"));
    };

    if token.trim().is_empty() {
        return Err(ApiError::unauthorized("Empty bearer token"));
    }

    Ok(Some(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_header_is_anonymous() {
        assert!(extract_bearer(&HeaderMap::new()).unwrap().is_none());
    }

    #[test]
    fn bearer_token_is_extracted() {
        let token = extract_bearer(&headers_with("Bearer abc.def.ghi")).unwrap();
        assert_eq!(token.as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn non_bearer_schemes_are_rejected() {
        assert!(extract_bearer(&headers_with("Basic dXNlcjpwYXNz")).is_err());
        assert!(extract_bearer(&headers_with("Bearer ")).is_err());
    }
}
