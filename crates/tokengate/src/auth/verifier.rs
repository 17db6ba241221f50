//! Stateless access token verification.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use jsonwebtoken::Header;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::{Claims, Identity, SigningKey};

/// Reasons a bearer token is rejected.
///
/// All of these surface as 401; the distinction exists for logs and for the
/// `error_code` field of the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("unexpected token issuer")]
    InvalidIssuer,
}

impl TokenError {
    pub fn code(self) -> &'static str {
        match self {
            Self::Malformed => "malformed_token",
            Self::InvalidSignature => "invalid_signature",
            Self::Expired => "token_expired",
            Self::InvalidIssuer => "invalid_issuer",
        }
    }
}

/// Verifies bearer tokens against the process signing key.
///
/// Verification is a pure function of the token, the key and the clock, so
/// one verifier is shared by every request without locking.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    key: Arc<SigningKey>,
    issuer: String,
    leeway_secs: i64,
}

impl TokenVerifier {
    pub fn new(key: Arc<SigningKey>, issuer: impl Into<String>) -> Self {
        Self {
            key,
            issuer: issuer.into(),
            leeway_secs: 0,
        }
    }

    /// Accept tokens up to `leeway_secs` past their `exp`.
    pub fn with_leeway(mut self, leeway_secs: i64) -> Self {
        self.leeway_secs = leeway_secs.max(0);
        self
    }

    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify `token` as if the current time were `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
        // Everything after the second dot is the signature, stray dots included.
        let mut segments = token.splitn(3, '.');
        let (Some(header), Some(payload), Some(signature)) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(TokenError::Malformed);
        };
        let signed = &token[..header.len() + 1 + payload.len()];

        let header: Header = decode_segment(header).ok_or(TokenError::Malformed)?;

        let expected = self.key.algorithm().as_jwt();
        if header.alg != expected {
            return Err(TokenError::InvalidSignature);
        }

        // An undecodable signature segment is an Err from the crypto layer;
        // it counts as a bad signature, not a malformed token.
        let valid = jsonwebtoken::crypto::verify(
            signature,
            signed.as_bytes(),
            self.key.decoding_key(),
            expected,
        )
        .unwrap_or(false);
        if !valid {
            return Err(TokenError::InvalidSignature);
        }

        let claims: Claims = decode_segment(payload).ok_or(TokenError::Malformed)?;

        if claims.iss != self.issuer {
            return Err(TokenError::InvalidIssuer);
        }
        if claims.is_expired_at(now, self.leeway_secs) {
            return Err(TokenError::Expired);
        }

        Ok(claims.into_identity())
    }
}

/// Base64url-decode a token segment and parse it as JSON.
fn decode_segment<T: DeserializeOwned>(segment: &str) -> Option<T> {
    let bytes = URL_SAFE_NO_PAD.decode(segment).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{SigningAlgorithm, TokenIssuer};
    use chrono::TimeDelta;

    fn hmac_key(byte: u8) -> Arc<SigningKey> {
        Arc::new(SigningKey::hmac(SigningAlgorithm::Hs256, &[byte; 32]).unwrap())
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn token_for(key: Arc<SigningKey>, identity: &Identity) -> String {
        TokenIssuer::new(key, "tokengate", TimeDelta::minutes(15))
            .issue_at(identity, now())
            .unwrap()
    }

    #[test]
    fn test_round_trip() {
        let key = hmac_key(1);
        let identity = Identity::new("admin", ["ADMIN", "USER"]);
        let token = token_for(key.clone(), &identity);

        let verified = TokenVerifier::new(key, "tokengate")
            .verify_at(&token, now())
            .unwrap();
        assert_eq!(verified, identity);
    }

    #[test]
    fn test_empty_roles_round_trip() {
        let key = hmac_key(1);
        let identity = Identity::new("nobody", Vec::<String>::new());
        let token = token_for(key.clone(), &identity);

        let verified = TokenVerifier::new(key, "tokengate")
            .verify_at(&token, now())
            .unwrap();
        assert!(verified.roles().is_empty());
    }

    #[test]
    fn test_malformed_tokens() {
        let verifier = TokenVerifier::new(hmac_key(1), "tokengate");
        for token in ["", "abc", "a.b", "a.b.c.d", "!!!.???.sig", "....."] {
            assert_eq!(
                verifier.verify_at(token, now()),
                Err(TokenError::Malformed),
                "{token:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_dot_in_signature_is_bad_signature() {
        let key = hmac_key(1);
        let token = token_for(key.clone(), &Identity::new("user", ["USER"]));
        let verifier = TokenVerifier::new(key, "tokengate");

        let sig_start = token.rfind('.').unwrap() + 1;
        for offset in [0, 5, token.len() - sig_start - 1] {
            let mut bytes = token.clone().into_bytes();
            bytes[sig_start + offset] = b'.';
            let forged = String::from_utf8(bytes).unwrap();
            assert_eq!(
                verifier.verify_at(&forged, now()),
                Err(TokenError::InvalidSignature),
                "dot at signature offset {offset}"
            );
        }

        // A trailing fourth segment is part of the signature too.
        assert_eq!(
            verifier.verify_at(&format!("{token}.extra"), now()),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_different_secret_rejected() {
        let token = token_for(hmac_key(1), &Identity::new("user", ["USER"]));
        let verifier = TokenVerifier::new(hmac_key(2), "tokengate");
        assert_eq!(
            verifier.verify_at(&token, now()),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_algorithm_mismatch_rejected() {
        let hs512 = Arc::new(SigningKey::hmac(SigningAlgorithm::Hs512, &[1; 32]).unwrap());
        let token = token_for(hs512, &Identity::new("user", ["USER"]));

        // Same secret bytes, different configured algorithm.
        let verifier = TokenVerifier::new(hmac_key(1), "tokengate");
        assert_eq!(
            verifier.verify_at(&token, now()),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let key = hmac_key(1);
        let token = TokenIssuer::new(key.clone(), "someone-else", TimeDelta::minutes(15))
            .issue_at(&Identity::new("user", ["USER"]), now())
            .unwrap();

        let verifier = TokenVerifier::new(key, "tokengate");
        assert_eq!(
            verifier.verify_at(&token, now()),
            Err(TokenError::InvalidIssuer)
        );
    }

    #[test]
    fn test_expiry_and_leeway() {
        let key = hmac_key(1);
        let token = token_for(key.clone(), &Identity::new("user", ["USER"]));
        let verifier = TokenVerifier::new(key, "tokengate");
        let exp = now() + TimeDelta::minutes(15);

        assert!(verifier.verify_at(&token, exp - TimeDelta::seconds(1)).is_ok());
        assert_eq!(verifier.verify_at(&token, exp), Err(TokenError::Expired));

        let lenient = verifier.with_leeway(30);
        assert!(lenient.verify_at(&token, exp + TimeDelta::seconds(29)).is_ok());
        assert_eq!(
            lenient.verify_at(&token, exp + TimeDelta::seconds(30)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let key = hmac_key(1);
        let token = token_for(key.clone(), &Identity::new("user", ["USER"]));

        let forged_claims = serde_json::json!({
            "iss": "tokengate",
            "sub": "user",
            "iat": 1_700_000_000,
            "exp": 1_700_000_900,
            "roles": ["ADMIN", "USER"],
        });
        let forged_payload = URL_SAFE_NO_PAD.encode(forged_claims.to_string());
        let parts: Vec<&str> = token.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        let verifier = TokenVerifier::new(key, "tokengate");
        assert_eq!(
            verifier.verify_at(&forged, now()),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_unsigned_token_rejected() {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            r#"{"iss":"tokengate","sub":"root","iat":1700000000,"exp":1700000900,"roles":["ADMIN"]}"#,
        );
        let token = format!("{header}.{payload}.");

        let verifier = TokenVerifier::new(hmac_key(1), "tokengate");
        assert_eq!(
            verifier.verify_at(&token, now()),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(TokenError::Malformed.code(), "malformed_token");
        assert_eq!(TokenError::Expired.code(), "token_expired");
        assert_eq!(TokenError::InvalidSignature.to_string(), "invalid token signature");
    }
}
