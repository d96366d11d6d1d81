use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};
use log::warn;

const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    hash(password, DEFAULT_COST)
}

pub fn is_bcrypt_hash(stored: &str) -> bool {
    BCRYPT_PREFIXES
        .iter()
        .any(|prefix| stored.starts_with(prefix))
}

/// Checks a password supplied with PASS against the configured value, which is
/// either a bcrypt hash or cleartext.
pub fn verify_password(password: &str, stored: &str) -> bool {
    if is_bcrypt_hash(stored) {
        return verify(password, stored).unwrap_or_else(|e| {
            warn!("Unreadable bcrypt hash in configuration: {}", e);
            false
        });
    }

    // Cleartext comparison without an early exit on the first mismatch.
    let (a, b) = (password.as_bytes(), stored.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleartext_password() {
        assert!(verify_password("secret", "secret"));
        assert!(!verify_password("secret", "Secret"));
        assert!(!verify_password("secret", "secret2"));
        assert!(!verify_password("", "secret"));
    }

    #[test]
    fn test_bcrypt_password() {
        let hashed = bcrypt::hash("secret", 4).unwrap();
        assert!(is_bcrypt_hash(&hashed));
        assert!(verify_password("secret", &hashed));
        assert!(!verify_password("wrong", &hashed));
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        assert!(!verify_password("$2b$nothash", "$2b$nothash"));
    }
}
