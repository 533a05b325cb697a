//! Token validation against the trusted key set.
//!
//! The validator is a pure function of token bytes, the caller-supplied
//! clock, and the configured keys. It never touches storage: once issued, a
//! token cannot be revoked before its expiry.
//!
//! Key rotation: the validator accepts any key in the trusted set, while new
//! tokens are always signed with the first one. A deployment whose set has
//! drifted entirely out of sync rejects every token with `InvalidSignature`;
//! that is a configuration fault, not an attack, and is logged as such by the
//! middleware.

use chrono::{DateTime, Utc};

use crate::token::codec::{Claims, TokenCodec, TokenError};

/// Why a token was rejected.
///
/// Every reason collapses to the same generic 401 at the public boundary;
/// the distinction exists for logs, the gateway status header, and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No `Authorization: Bearer` token was presented
    MissingToken,
    /// Token structure could not be parsed
    Malformed,
    /// Token names an algorithm we do not accept
    Unsupported,
    /// Signature does not verify against any trusted key
    InvalidSignature,
    /// Signature fine, but the expiry instant has been reached
    Expired,
}

/// Outcome of validating a bearer token.
#[derive(Debug)]
pub enum Verdict {
    Valid { claims: Claims },
    Invalid { reason: RejectReason },
}

impl Verdict {
    pub fn reject(reason: RejectReason) -> Self {
        Verdict::Invalid { reason }
    }
}

/// Gateway vocabulary for the `X-Auth-Status` response header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Valid,
    MissingToken,
    Expired,
    Invalid,
    Error,
}

impl AuthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthStatus::Valid => "valid",
            AuthStatus::MissingToken => "missing_token",
            AuthStatus::Expired => "expired",
            AuthStatus::Invalid => "invalid",
            AuthStatus::Error => "error",
        }
    }
}

impl From<RejectReason> for AuthStatus {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::MissingToken => AuthStatus::MissingToken,
            RejectReason::Expired => AuthStatus::Expired,
            RejectReason::Malformed
            | RejectReason::Unsupported
            | RejectReason::InvalidSignature => AuthStatus::Invalid,
        }
    }
}

/// Validates tokens against an ordered set of trusted keys.
#[derive(Clone)]
pub struct TokenValidator {
    codecs: Vec<TokenCodec>,
}

impl TokenValidator {
    /// Build a validator over the trusted key set. The set must not be empty;
    /// the first key is the one the login flow issues with.
    pub fn new(keys: &[Vec<u8>]) -> Self {
        Self {
            codecs: keys.iter().map(|k| TokenCodec::new(k)).collect(),
        }
    }

    /// Codec for the active signing key.
    pub fn signing_codec(&self) -> &TokenCodec {
        &self.codecs[0]
    }

    /// Validate a bearer token at instant `now`.
    ///
    /// Expiry is a strict comparison: the token is valid iff `now < exp`, so
    /// a token expiring exactly at `now` is already expired.
    pub fn validate(&self, token: Option<&str>, now: DateTime<Utc>) -> Verdict {
        let Some(token) = token else {
            return Verdict::reject(RejectReason::MissingToken);
        };

        // Try each trusted key; a bad signature under one key may verify
        // under an older one during a rotation window. Structural errors are
        // key-independent, so they short-circuit.
        let mut last_error = TokenError::InvalidSignature;
        for codec in &self.codecs {
            match codec.decode(token) {
                Ok(claims) => {
                    if now.timestamp() < claims.exp {
                        return Verdict::Valid { claims };
                    }
                    return Verdict::reject(RejectReason::Expired);
                }
                Err(TokenError::InvalidSignature) => {
                    last_error = TokenError::InvalidSignature;
                }
                Err(other) => return Verdict::reject(reason_for(other)),
            }
        }
        Verdict::reject(reason_for(last_error))
    }
}

fn reason_for(err: TokenError) -> RejectReason {
    match err {
        TokenError::Malformed | TokenError::EmptySubject => RejectReason::Malformed,
        TokenError::Unsupported => RejectReason::Unsupported,
        TokenError::InvalidSignature => RejectReason::InvalidSignature,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn validator() -> TokenValidator {
        TokenValidator::new(&[b"primary-key".to_vec(), b"retired-key".to_vec()])
    }

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn issue_at(v: &TokenValidator, ttl: TimeDelta) -> String {
        v.signing_codec()
            .issue("alice", &["USER".to_string()], t0(), ttl)
            .unwrap()
    }

    #[test]
    fn valid_inside_lifetime_expired_at_boundary() {
        let v = validator();
        let ttl = TimeDelta::hours(24);
        let token = issue_at(&v, ttl);

        // One second before expiry: valid, subject preserved
        match v.validate(Some(&token), t0() + ttl - TimeDelta::seconds(1)) {
            Verdict::Valid { claims } => assert_eq!(claims.sub, "alice"),
            Verdict::Invalid { reason } => panic!("unexpected rejection: {reason:?}"),
        }

        // Exactly at expiry: already expired (strict comparison)
        match v.validate(Some(&token), t0() + ttl) {
            Verdict::Invalid { reason } => assert_eq!(reason, RejectReason::Expired),
            Verdict::Valid { .. } => panic!("token at exact expiry must be rejected"),
        }
    }

    #[test]
    fn missing_token_is_its_own_reason() {
        match validator().validate(None, t0()) {
            Verdict::Invalid { reason } => assert_eq!(reason, RejectReason::MissingToken),
            Verdict::Valid { .. } => panic!("no token must not validate"),
        }
    }

    #[test]
    fn accepts_tokens_signed_by_retired_key() {
        let v = validator();
        // Sign with the second (retired) key directly
        let old = TokenCodec::new(b"retired-key")
            .issue("alice", &[], t0(), TimeDelta::hours(1))
            .unwrap();

        assert!(matches!(
            v.validate(Some(&old), t0()),
            Verdict::Valid { .. }
        ));
    }

    #[test]
    fn drifted_key_set_rejects_everything_as_invalid_signature() {
        let issuer = TokenValidator::new(&[b"key-a".to_vec()]);
        let drifted = TokenValidator::new(&[b"key-b".to_vec()]);
        let token = issue_at(&issuer, TimeDelta::hours(1));

        match drifted.validate(Some(&token), t0()) {
            Verdict::Invalid { reason } => {
                assert_eq!(reason, RejectReason::InvalidSignature);
                assert_eq!(AuthStatus::from(reason), AuthStatus::Invalid);
            }
            Verdict::Valid { .. } => panic!("drifted keys must not validate"),
        }
    }

    #[test]
    fn status_header_vocabulary() {
        assert_eq!(AuthStatus::Valid.as_str(), "valid");
        assert_eq!(
            AuthStatus::from(RejectReason::MissingToken).as_str(),
            "missing_token"
        );
        assert_eq!(AuthStatus::from(RejectReason::Expired).as_str(), "expired");
        assert_eq!(
            AuthStatus::from(RejectReason::Malformed).as_str(),
            "invalid"
        );
    }
}
