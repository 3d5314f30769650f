/// Bearer token codec shared by every service that mints or verifies tokens.
///
/// Tokens are compact signed JWTs (HS256) carrying only subject, issued-at
/// and expiry. The codec owns its key material: construct one at startup
/// from the configured secret and hand it to whatever needs it. There is no
/// process-global key state.
///
/// ## Security Design
///
/// - Symmetric HMAC-SHA256 with a base64-encoded secret; keys shorter than
///   256 bits are refused at construction
/// - Zero leeway on expiry, and a token whose `exp` equals the current
///   second is already expired
/// - Malformed input, bad signatures and wrong algorithms are
///   indistinguishable to callers
use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// HMAC-SHA256 keys below 256 bits are refused outright.
const MIN_KEY_BYTES: usize = 32;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims embedded in every issued token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Why a token failed verification.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Malformed token, bad signature, or wrong algorithm.
    #[error("invalid token")]
    Invalid,
    /// Well-formed and correctly signed, but past its expiry.
    #[error("token expired")]
    Expired,
}

/// Signs and verifies bearer tokens with a symmetric key loaded once at
/// process start. Cheap to share behind an `Arc`; read-only after
/// construction.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    /// Build a codec from a base64-encoded HMAC secret and a token lifetime
    /// in seconds.
    pub fn from_base64_secret(secret: &str, ttl_secs: i64) -> Result<Self> {
        let key_bytes = BASE64
            .decode(secret.trim())
            .context("JWT secret is not valid base64")?;

        if key_bytes.len() < MIN_KEY_BYTES {
            return Err(anyhow!(
                "JWT secret must be at least {} bytes, got {}",
                MIN_KEY_BYTES,
                key_bytes.len()
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&key_bytes),
            decoding_key: DecodingKey::from_secret(&key_bytes),
            ttl: Duration::seconds(ttl_secs),
        })
    }

    /// Configured token lifetime in seconds.
    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issue a signed token for `subject`, expiring after the configured TTL.
    pub fn mint(&self, subject: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| anyhow!("failed to encode token: {e}"))
    }

    /// Verify signature and expiry, returning the embedded claims.
    ///
    /// Every structural problem (garbage input, truncation, wrong key, wrong
    /// algorithm) collapses into [`TokenError::Invalid`]; callers never see
    /// a distinct "malformed" case.
    pub fn verify(&self, token: &str) -> std::result::Result<Claims, TokenError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        // An expiry equal to the current second counts as expired.
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }

    /// Extract claims without enforcing signature or expiry.
    ///
    /// Only meaningful on a token that `verify` has already accepted; used
    /// where the original expiry is needed from a token that is being
    /// retired.
    pub fn claims(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| anyhow!("failed to extract claims: {e}"))?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(ttl_secs: i64) -> TokenCodec {
        let secret = BASE64.encode([7u8; 32]);
        TokenCodec::from_base64_secret(&secret, ttl_secs).expect("failed to build codec")
    }

    #[test]
    fn test_mint_and_verify() {
        let codec = codec(3600);
        let token = codec.mint("alice").expect("failed to mint token");
        assert_eq!(token.matches('.').count(), 2); // JWT has 3 parts

        let claims = codec.verify(&token).expect("freshly minted token must verify");
        assert_eq!(claims.sub, "alice");
        assert!(claims.iat <= claims.exp);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_verify_rejects_tampered_token() {
        let codec = codec(3600);
        let token = codec.mint("alice").unwrap();

        // Flip the first character of the signature.
        let (head, sig) = token.rsplit_once('.').unwrap();
        let flipped = if sig.starts_with('A') { "B" } else { "A" };
        let tampered = format!("{}.{}{}", head, flipped, &sig[1..]);
        assert!(matches!(codec.verify(&tampered), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_verify_rejects_truncated_token() {
        let codec = codec(3600);
        let token = codec.mint("alice").unwrap();

        let truncated = &token[..token.len() - 1];
        assert!(matches!(codec.verify(truncated), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let codec = codec(3600);
        assert!(matches!(codec.verify("not.a.jwt"), Err(TokenError::Invalid)));
        assert!(matches!(codec.verify(""), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_verify_rejects_foreign_key() {
        let minter = codec(3600);
        let token = minter.mint("alice").unwrap();

        let other_secret = BASE64.encode([8u8; 32]);
        let verifier = TokenCodec::from_base64_secret(&other_secret, 3600).unwrap();
        assert!(matches!(verifier.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let codec = codec(-60);
        let token = codec.mint("alice").unwrap();
        assert!(matches!(codec.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_expiry_boundary_is_expired() {
        // A zero TTL puts `exp` at the current second; that must already
        // count as expired.
        let codec = codec(0);
        let token = codec.mint("alice").unwrap();
        assert!(matches!(codec.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_claims_extraction_ignores_expiry() {
        let codec = codec(-60);
        let token = codec.mint("alice").unwrap();

        let claims = codec.claims(&token).expect("claims extraction is pure");
        assert_eq!(claims.sub, "alice");
    }

    #[test]
    fn test_weak_key_rejected() {
        let short_secret = BASE64.encode([7u8; 16]);
        assert!(TokenCodec::from_base64_secret(&short_secret, 3600).is_err());
    }

    #[test]
    fn test_invalid_base64_secret_rejected() {
        assert!(TokenCodec::from_base64_secret("!!!not-base64!!!", 3600).is_err());
    }
}
