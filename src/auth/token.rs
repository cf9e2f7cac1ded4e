use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::auth::{Claims, DatabaseAccess, Identity, Role};
use crate::config::SecurityConfig;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signature does not match")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token structure cannot be decoded")]
    Malformed,

    #[error("token has been revoked")]
    Revoked,

    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Deny-list hook consulted on every `verify`.
///
/// Sessions are stateless, so role/grant changes only take effect when a
/// token expires or its holder re-authenticates; this seam is the narrower
/// guarantee the product does ship: explicit logout / revoke-all-sessions.
pub trait RevocationList: Send + Sync {
    fn is_revoked(&self, claims: &Claims) -> bool;
}

/// In-process revocation list keyed by identity.
///
/// `revoke_all` invalidates every token the identity obtained strictly
/// before the revocation instant. State dies with the process, matching the
/// stateless-session tradeoff.
#[derive(Default)]
pub struct InMemoryRevocations {
    cutoffs: RwLock<HashMap<String, i64>>,
}

impl InMemoryRevocations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revoke_all(&self, identity: &Identity) {
        let mut cutoffs = self.cutoffs.write().expect("revocation lock poisoned");
        cutoffs.insert(identity.to_string(), Utc::now().timestamp());
    }
}

impl RevocationList for InMemoryRevocations {
    fn is_revoked(&self, claims: &Claims) -> bool {
        let cutoffs = self.cutoffs.read().expect("revocation lock poisoned");
        match cutoffs.get(&claims.user_id.to_string()) {
            Some(cutoff) => claims.iat < *cutoff,
            None => false,
        }
    }
}

/// Issues and verifies signed session tokens (HS256).
///
/// Stateless: nothing is persisted per issued token. Verification is pure
/// and in-memory apart from the optional revocation list.
pub struct TokenService {
    secret: String,
    validity: Duration,
    revocations: Option<Arc<dyn RevocationList>>,
}

impl TokenService {
    pub fn new(secret: impl Into<String>, expiry_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            validity: Duration::hours(expiry_hours as i64),
            revocations: None,
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(security.jwt_secret.clone(), security.jwt_expiry_hours)
    }

    pub fn with_revocations(mut self, revocations: Arc<dyn RevocationList>) -> Self {
        self.revocations = Some(revocations);
        self
    }

    /// Token lifetime in seconds, reported to clients as `expires_in`.
    pub fn validity_secs(&self) -> i64 {
        self.validity.num_seconds()
    }

    /// Sign the given claims into a bearer token.
    pub fn issue(&self, claims: &Claims) -> Result<String, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        let key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), claims, &key).map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Build claims with this service's validity window and sign them.
    pub fn issue_claims(
        &self,
        user_id: Identity,
        username: String,
        role: Role,
        databases: Vec<DatabaseAccess>,
        current_database: Option<String>,
    ) -> Result<(String, Claims), TokenError> {
        let claims = Claims::new(user_id, username, role, databases, current_database, self.validity);
        let token = self.issue(&claims)?;
        Ok((token, claims))
    }

    /// Verify signature and expiry, returning the embedded claims unchanged.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let key = DecodingKey::from_secret(self.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 5;

        let data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        })?;

        // Expiry is checked again on the decoded claims, not only by the
        // validation step above
        if data.claims.exp <= Utc::now().timestamp() - 5 {
            return Err(TokenError::Expired);
        }

        if let Some(revocations) = &self.revocations {
            if revocations.is_revoked(&data.claims) {
                return Err(TokenError::Revoked);
            }
        }

        Ok(data.claims)
    }

    /// Best-effort decode without signature verification.
    ///
    /// For inspecting expiry/metadata only. Never use the result for an
    /// authorization decision.
    pub fn decode_unverified(token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
            .ok()
            .map(|data| data.claims)
    }
}
