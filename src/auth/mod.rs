use thiserror::Error;
use tracing::warn;

/// Work factor for seeded demo accounts; real accounts use `bcrypt::DEFAULT_COST`
pub const DEMO_HASH_COST: u32 = 4;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Salted bcrypt hash for storage in `users.password_hash`
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash_password_with_cost(password, bcrypt::DEFAULT_COST)
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AuthError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Compare a submitted password with a stored hash. Malformed hashes never match.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match bcrypt::verify(password, stored_hash.trim()) {
        Ok(matches) => matches,
        Err(e) => {
            warn!("Stored password hash is unusable: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted() {
        let first = hash_password_with_cost("teacher", DEMO_HASH_COST).unwrap();
        let second = hash_password_with_cost("teacher", DEMO_HASH_COST).unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("$2"));
        assert!(!first.contains("teacher"));
    }

    #[test]
    fn verifies_matching_password_only() {
        let stored = hash_password_with_cost("secret", DEMO_HASH_COST).unwrap();
        assert!(verify_password("secret", &stored));
        assert!(!verify_password("Secret", &stored));
        assert!(!verify_password("secret", "not-a-hash"));
        // Unsalted digests from older installs are rejected
        assert!(!verify_password(
            "",
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        ));
    }

    #[test]
    fn rejects_invalid_cost() {
        assert!(hash_password_with_cost("x", 99).is_err());
    }
}
