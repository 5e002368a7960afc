//! Signed session tokens
//!
//! A session token proves that a participant entered the survey through a
//! valid access code. It is issued by `/api/start` and presented back with
//! every vote.
//!
//! # Wire format
//!
//! `v1.<payload>.<signature>` where both parts are unpadded base64url: the
//! payload is the JSON-serialized [`SessionToken`], the signature is
//! HMAC-SHA256 over the encoded payload part. The signature is verified in
//! constant time before the payload is parsed, and oversized tokens are
//! rejected before any decoding.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const TOKEN_VERSION_V1: &str = "v1";
const MAX_TOKEN_LEN: usize = 1024;

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionToken {
    /// Participant this session belongs to
    pub participant: Uuid,
    /// Access code that admitted the participant
    pub code: String,
    /// Unix epoch seconds at issuance
    pub issued_at: i64,
    /// Unix epoch seconds after which the token is rejected
    pub expires_at: i64,
}

/// Token validation error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Token does not have the `v1.payload.sig` shape or exceeds limits
    InvalidFormat(String),

    /// Version part is present but not supported
    UnsupportedVersion(String),

    /// Signature does not match the payload
    InvalidSignature,

    /// Payload decoded but could not be parsed
    InvalidPayload(String),

    /// Token is past its expiry
    Expired { expires_at: i64, now: i64 },
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::InvalidFormat(reason) => write!(f, "Invalid token format: {}", reason),
            TokenError::UnsupportedVersion(version) => {
                write!(f, "Unsupported token version: {}", version)
            }
            TokenError::InvalidSignature => write!(f, "Invalid token signature"),
            TokenError::InvalidPayload(reason) => write!(f, "Invalid token payload: {}", reason),
            TokenError::Expired { .. } => write!(f, "Token expired"),
        }
    }
}

impl std::error::Error for TokenError {}

impl SessionToken {
    /// Build a token for a freshly admitted participant
    pub fn issue(participant: Uuid, code: &str, now: i64, ttl_seconds: i64) -> Self {
        Self {
            participant,
            code: code.to_string(),
            issued_at: now,
            expires_at: now + ttl_seconds,
        }
    }
}

/// Encode and sign a session token
pub fn encode_token(token: &SessionToken, secret: &[u8]) -> Result<String, TokenError> {
    let payload_bytes = serde_json::to_vec(token)
        .map_err(|e| TokenError::InvalidPayload(e.to_string()))?;
    let payload_part = URL_SAFE_NO_PAD.encode(payload_bytes);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| TokenError::InvalidPayload(e.to_string()))?;
    mac.update(payload_part.as_bytes());
    let sig_part = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}.{}", TOKEN_VERSION_V1, payload_part, sig_part))
}

/// Verify signature and expiry, returning the claims
///
/// `now` is Unix epoch seconds; callers pass [`crate::time::epoch_secs`] so
/// tests can pin the clock.
pub fn decode_token(raw: &str, secret: &[u8], now: i64) -> Result<SessionToken, TokenError> {
    if raw.len() > MAX_TOKEN_LEN {
        return Err(TokenError::InvalidFormat(
            "token exceeds max length".to_string(),
        ));
    }

    let parts: Vec<&str> = raw.split('.').collect();
    let (payload_part, sig_part) = match parts.as_slice() {
        [version, payload, sig] if *version == TOKEN_VERSION_V1 => (*payload, *sig),
        [version, _, _] => {
            return Err(TokenError::UnsupportedVersion(version.to_string()));
        }
        _ => {
            return Err(TokenError::InvalidFormat(
                "expected version.payload.signature".to_string(),
            ));
        }
    };

    // Signature first: nothing attacker-controlled is parsed until the MAC
    // checks out.
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| TokenError::InvalidPayload(e.to_string()))?;
    mac.update(payload_part.as_bytes());
    let provided = URL_SAFE_NO_PAD
        .decode(sig_part)
        .map_err(|e| TokenError::InvalidFormat(e.to_string()))?;
    mac.verify_slice(&provided)
        .map_err(|_| TokenError::InvalidSignature)?;

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload_part)
        .map_err(|e| TokenError::InvalidFormat(e.to_string()))?;
    let token: SessionToken = serde_json::from_slice(&payload_bytes)
        .map_err(|e| TokenError::InvalidPayload(e.to_string()))?;

    if now > token.expires_at {
        return Err(TokenError::Expired {
            expires_at: token.expires_at,
            now,
        });
    }

    Ok(token)
}

// ========================================
// Tests
// ========================================

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn sample(now: i64) -> SessionToken {
        SessionToken::issue(Uuid::new_v4(), "ABCD-1234", now, 3600)
    }

    #[test]
    fn round_trip_preserves_claims() {
        let token = sample(1_730_000_000);
        let encoded = encode_token(&token, SECRET).unwrap();

        let decoded = decode_token(&encoded, SECRET, 1_730_000_100).unwrap();
        assert_eq!(decoded, token);
    }

    #[test]
    fn expired_token_rejected() {
        let token = sample(1_730_000_000);
        let encoded = encode_token(&token, SECRET).unwrap();

        // One second past expiry
        let result = decode_token(&encoded, SECRET, token.expires_at + 1);
        assert!(matches!(result, Err(TokenError::Expired { .. })));

        // Exactly at expiry is still valid
        assert!(decode_token(&encoded, SECRET, token.expires_at).is_ok());
    }

    #[test]
    fn tampered_payload_rejected() {
        let token = sample(1_730_000_000);
        let encoded = encode_token(&token, SECRET).unwrap();

        let mut parts: Vec<String> = encoded.split('.').map(String::from).collect();
        let forged = SessionToken::issue(Uuid::new_v4(), "ZZZZ-9999", 1_730_000_000, 86_400);
        parts[1] = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());

        let result = decode_token(&parts.join("."), SECRET, 1_730_000_100);
        assert_eq!(result, Err(TokenError::InvalidSignature));
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = sample(1_730_000_000);
        let encoded = encode_token(&token, SECRET).unwrap();

        let result = decode_token(&encoded, b"another-secret-another-secret!!!", 1_730_000_100);
        assert_eq!(result, Err(TokenError::InvalidSignature));
    }

    #[test]
    fn malformed_tokens_rejected() {
        assert!(matches!(
            decode_token("not-a-token", SECRET, 0),
            Err(TokenError::InvalidFormat(_))
        ));
        assert!(matches!(
            decode_token("v1.only-two", SECRET, 0),
            Err(TokenError::InvalidFormat(_))
        ));
        assert!(matches!(
            decode_token("v9.payload.sig", SECRET, 0),
            Err(TokenError::UnsupportedVersion(_))
        ));

        let oversized = format!("v1.{}.sig", "a".repeat(2048));
        assert!(matches!(
            decode_token(&oversized, SECRET, 0),
            Err(TokenError::InvalidFormat(_))
        ));
    }
}
