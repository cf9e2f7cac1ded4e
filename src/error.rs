// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    /// Authenticated request whose token carries no selected tenant database
    NoDatabaseSelected,

    // 401 Unauthorized
    Unauthorized(String),
    /// Login rejected. The message is deliberately identical whether the
    /// username or the password was wrong, to avoid user enumeration.
    InvalidCredentials,

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),
    /// Selected tenant name does not correspond to any registered/active tenant
    TenantNotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
    /// Tenant is registered but its connection pool could not be established.
    /// Transient; the registry does not cache the failure, so retrying is safe.
    TenantUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::NoDatabaseSelected => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::InvalidCredentials => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::TenantNotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
            ApiError::TenantUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::NoDatabaseSelected => "No database selected in session token".to_string(),
            ApiError::Unauthorized(msg) => msg.clone(),
            ApiError::InvalidCredentials => "Invalid username or password".to_string(),
            ApiError::Forbidden(msg) => msg.clone(),
            ApiError::NotFound(msg) => msg.clone(),
            ApiError::TenantNotFound(name) => format!("Database '{}' is not a registered tenant", name),
            ApiError::Conflict(msg) => msg.clone(),
            ApiError::InternalServerError(msg) => msg.clone(),
            ApiError::ServiceUnavailable(msg) => msg.clone(),
            ApiError::TenantUnavailable(name) if name.is_empty() => {
                "Tenant database is temporarily unavailable".to_string()
            }
            ApiError::TenantUnavailable(name) => format!("Database '{}' is temporarily unavailable", name),
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NoDatabaseSelected => "NO_DATABASE_SELECTED",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::TenantNotFound(_) => "TENANT_NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            ApiError::TenantUnavailable(_) => "TENANT_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert component error types to ApiError
impl From<crate::auth::token::TokenError> for ApiError {
    fn from(err: crate::auth::token::TokenError) -> Self {
        use crate::auth::token::TokenError;
        match err {
            TokenError::Expired => ApiError::unauthorized("Session token has expired"),
            TokenError::InvalidSignature => ApiError::unauthorized("Invalid session token signature"),
            TokenError::Malformed => ApiError::unauthorized("Malformed session token"),
            TokenError::Revoked => ApiError::unauthorized("Session token has been revoked"),
            TokenError::MissingSecret => {
                tracing::error!("JWT secret not configured");
                ApiError::internal_server_error("Authentication is not configured")
            }
            TokenError::Signing(msg) => {
                tracing::error!("JWT signing error: {}", msg);
                ApiError::internal_server_error("Failed to issue session token")
            }
        }
    }
}

impl From<crate::database::registry::RegistryError> for ApiError {
    fn from(err: crate::database::registry::RegistryError) -> Self {
        use crate::database::registry::RegistryError;
        match err {
            RegistryError::InvalidName(name) => ApiError::TenantNotFound(name),
            RegistryError::Unavailable { database, source } => {
                tracing::error!("Tenant database '{}' unavailable: {}", database, source);
                ApiError::TenantUnavailable(database)
            }
            RegistryError::ConfigMissing(what) => {
                tracing::error!("Missing configuration: {}", what);
                ApiError::internal_server_error("Database routing is not configured")
            }
            RegistryError::InvalidDatabaseUrl => {
                tracing::error!("Invalid DATABASE_URL");
                ApiError::internal_server_error("Database routing is not configured")
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolClosed => {
                // An evicted tenant pool surfaces here, not as a generic fault
                ApiError::TenantUnavailable(String::new())
            }
            other => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", other);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<bcrypt::BcryptError> for ApiError {
    fn from(err: bcrypt::BcryptError) -> Self {
        tracing::error!("bcrypt error: {}", err);
        ApiError::internal_server_error("Credential verification failed")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_expected_status_codes() {
        assert_eq!(ApiError::unauthorized("x").status_code(), 401);
        assert_eq!(ApiError::InvalidCredentials.status_code(), 401);
        assert_eq!(ApiError::forbidden("x").status_code(), 403);
        assert_eq!(ApiError::NoDatabaseSelected.status_code(), 400);
        assert_eq!(ApiError::TenantNotFound("acme".into()).status_code(), 404);
        assert_eq!(ApiError::TenantUnavailable("acme".into()).status_code(), 503);
    }

    #[test]
    fn invalid_credentials_message_is_generic() {
        // Must not reveal whether the username or the password was wrong
        let err = ApiError::InvalidCredentials;
        assert_eq!(err.message(), "Invalid username or password");
        assert_eq!(err.error_code(), "INVALID_CREDENTIALS");
    }
}
