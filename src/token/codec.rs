//! Token claim encoding, signing and verification.
//!
//! Tokens are compact three-segment strings `header.payload.signature`,
//! each segment base64url-encoded without padding:
//!
//! - header: `{"alg":"HS256","typ":"JWT"}`
//! - payload: the [`Claims`] set (subject, roles, issued-at, expiry)
//! - signature: HMAC-SHA256 over `header.payload` with the shared secret
//!
//! The codec is pure: no I/O and no system clock access. Issuance takes the
//! caller's `now`, decoding does not look at time at all (expiry belongs to
//! the validator).

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// The only signature algorithm this codec produces or accepts.
const ALG_HS256: &str = "HS256";

/// Token encode/decode failures.
///
/// `Malformed` (structural damage) and `InvalidSignature` (intact structure,
/// wrong key or tampered content) are deliberately separate variants: the
/// public API collapses both into one generic 401, but logs and tests need
/// to tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Subject is empty or blank; nothing sensible to issue.
    #[error("Token subject must not be empty")]
    EmptySubject,

    /// Wrong segment count, broken base64, or an unparsable JSON segment.
    #[error("Malformed token")]
    Malformed,

    /// Structurally valid header naming an algorithm we do not support.
    #[error("Unsupported token algorithm")]
    Unsupported,

    /// Signature does not verify against the key.
    #[error("Invalid token signature")]
    InvalidSignature,
}

/// Token header segment.
#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Claim set carried in the token payload.
///
/// Timestamps are unix seconds, matching what the original portal's tokens
/// carried on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated username
    pub sub: String,

    /// Role claims granted at login
    pub roles: Vec<String>,

    /// Issued-at, unix seconds
    pub iat: i64,

    /// Expiry, unix seconds. Valid strictly before this instant.
    pub exp: i64,
}

impl Claims {
    /// Expiry as a UTC timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Signs and verifies tokens with one symmetric key.
///
/// Key rotation lives a level up: the validator holds one codec per trusted
/// key and only the first one issues.
#[derive(Clone)]
pub struct TokenCodec {
    key: Vec<u8>,
}

impl TokenCodec {
    pub fn new(key: &[u8]) -> Self {
        Self { key: key.to_vec() }
    }

    /// Issue a signed token for `subject` valid for `ttl` starting at `now`.
    ///
    /// Deterministic given its inputs: `iat = now`, `exp = now + ttl`.
    ///
    /// # Errors
    ///
    /// `TokenError::EmptySubject` if the subject is empty or whitespace.
    pub fn issue(
        &self,
        subject: &str,
        roles: &[String],
        now: DateTime<Utc>,
        ttl: TimeDelta,
    ) -> Result<String, TokenError> {
        if subject.trim().is_empty() {
            return Err(TokenError::EmptySubject);
        }

        let header = Header {
            alg: ALG_HS256.to_string(),
            typ: "JWT".to_string(),
        };
        let claims = Claims {
            sub: subject.to_string(),
            roles: roles.to_vec(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        // Serialization of these plain structs cannot fail
        let header_b64 = URL_SAFE_NO_PAD
            .encode(serde_json::to_vec(&header).expect("header serializes to JSON"));
        let payload_b64 = URL_SAFE_NO_PAD
            .encode(serde_json::to_vec(&claims).expect("claims serialize to JSON"));

        let signature = self.sign(&header_b64, &payload_b64);
        Ok(format!("{header_b64}.{payload_b64}.{signature}"))
    }

    /// Decode a token and return its claims.
    ///
    /// The signature is verified before the payload is parsed, so no claim
    /// field is ever trusted from an unauthenticated token.
    ///
    /// # Errors
    ///
    /// - `Malformed`: wrong segment count, bad base64, unparsable JSON
    /// - `Unsupported`: header algorithm other than HS256
    /// - `InvalidSignature`: signature check failed
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let mut segments = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::Malformed);
        };

        // Structural header check happens first so an attacker cannot steer
        // us onto a different algorithm; only HS256 is ever accepted.
        let header_bytes = URL_SAFE_NO_PAD
            .decode(header_b64)
            .map_err(|_| TokenError::Malformed)?;
        let header: Header =
            serde_json::from_slice(&header_bytes).map_err(|_| TokenError::Malformed)?;
        if header.alg != ALG_HS256 {
            return Err(TokenError::Unsupported);
        }

        // Signature before claims
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC key length is valid");
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(payload_b64.as_bytes());
        // verify_slice is constant-time
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::Malformed)?;
        serde_json::from_slice(&payload_bytes).map_err(|_| TokenError::Malformed)
    }

    fn sign(&self, header_b64: &str, payload_b64: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC key length is valid");
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(payload_b64.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }
}
