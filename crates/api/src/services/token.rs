//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with the configured secret, carrying the
//! user ID as the subject. Issuance is a pure function of (user id, secret,
//! clock); verification is stateless - no store lookup happens here, the
//! middleware resolves the subject to an account afterwards.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use orchard_core::UserId;

/// Token issuer name baked into every credential.
const ISSUER: &str = "orchard-api";

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject - user ID, as a decimal string.
    pub sub: String,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID.
    pub jti: String,
}

/// Why a presented token was rejected.
///
/// Callers treat every variant the same way - the request proceeds as
/// anonymous - but the distinction is useful in debug logging.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The token's expiry is in the past.
    #[error("token expired")]
    Expired,
    /// Anything else: bad signature, malformed, wrong issuer.
    #[error("token invalid: {0}")]
    Invalid(String),
}

/// Issues and verifies bearer tokens. Cheap to clone; the keys are derived
/// once from the configured secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: u64,
}

impl TokenService {
    /// Build a token service from the shared signing secret.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_secs: u64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            ttl_secs,
        }
    }

    /// Issue a signed, time-bounded token for a user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if encoding fails (never expected with
    /// an HMAC key).
    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        #[allow(clippy::cast_possible_wrap)] // ttl is far below i64::MAX
        let claims = TokenClaims {
            sub: user_id.to_string(),
            iss: ISSUER.to_owned(),
            iat: now,
            exp: now + self.ttl_secs as i64,
            jti: Uuid::new_v4().to_string(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }

    /// Verify signature, expiry and issuer, returning the subject user ID.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` for an out-of-date token and
    /// `TokenError::Invalid` for everything else. Never panics: a garbage
    /// token is an expected input at this boundary.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

        let claims = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })?;

        claims
            .sub
            .parse::<UserId>()
            .map_err(|e| TokenError::Invalid(format!("bad subject: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&SecretString::from("k9#mQ2$vX7!pL4&nR8*wZ3^tB6@cF1%d"), 900)
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let svc = service();
        let token = svc.issue(UserId::new(42)).unwrap();
        assert_eq!(svc.verify(&token).unwrap(), UserId::new(42));
    }

    #[test]
    fn test_jti_is_unique() {
        let svc = service();
        let t1 = svc.issue(UserId::new(1)).unwrap();
        let t2 = svc.issue(UserId::new(1)).unwrap();
        assert_ne!(t1, t2);
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let svc = service();
        assert!(matches!(
            svc.verify("not-a-token"),
            Err(TokenError::Invalid(_))
        ));
        assert!(matches!(svc.verify(""), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issued_by = service();
        let verified_by = TokenService::new(
            &SecretString::from("a1!bC2@dE3#fG4$hI5%jK6^lM7&nO8*p"),
            900,
        );
        let token = issued_by.issue(UserId::new(7)).unwrap();
        assert!(matches!(
            verified_by.verify(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Hand-encode claims that expired an hour ago, well past the
        // library's default leeway.
        let secret = "k9#mQ2$vX7!pL4&nR8*wZ3^tB6@cF1%d";
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: "1".to_owned(),
            iss: ISSUER.to_owned(),
            iat: now - 7200,
            exp: now - 3600,
            jti: Uuid::new_v4().to_string(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let svc = TokenService::new(&SecretString::from(secret), 900);
        assert!(matches!(svc.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let svc = service();
        let token = svc.issue(UserId::new(42)).unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('A') { 'B' } else { 'A' });
        assert!(svc.verify(&tampered).is_err());
    }
}
