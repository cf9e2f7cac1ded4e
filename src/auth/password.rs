use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::ApiError;

/// Hash a password with bcrypt at the default cost.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    Ok(hash(password, DEFAULT_COST)?)
}

/// Verify a password against a stored bcrypt hash.
///
/// A hash that fails to parse counts as a mismatch rather than an error, so
/// a corrupt row cannot be told apart from a wrong password by the caller.
pub fn verify_password(password: &str, hashed: &str) -> bool {
    verify(password, hashed).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_matching_password() {
        let hashed = hash_password("cuatro-ojos").unwrap();
        assert!(verify_password("cuatro-ojos", &hashed));
        assert!(!verify_password("wrong", &hashed));
    }

    #[test]
    fn malformed_hash_is_a_mismatch() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }
}
