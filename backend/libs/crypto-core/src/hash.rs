use sha2::{Digest, Sha256};

/// Compute SHA256 hash of input bytes
pub fn sha256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hasher.finalize().into()
}

/// Hex-encoded SHA-256 of a bearer token.
///
/// Denylist entries are keyed by this hash so raw tokens never reach
/// storage or logs.
pub fn hash_token(token: &str) -> String {
    hex::encode(sha256(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_deterministic() {
        let input = b"hello world";
        assert_eq!(sha256(input), sha256(input));
    }

    #[test]
    fn test_hash_token_length() {
        // SHA-256 produces 64 hex characters
        assert_eq!(hash_token("any_token").len(), 64);
    }

    #[test]
    fn test_hash_token_uniqueness() {
        assert_ne!(hash_token("token1"), hash_token("token2"));
    }

    #[test]
    fn test_hash_token_consistency() {
        let token = "test_token_12345";
        assert_eq!(hash_token(token), hash_token(token));
    }
}
