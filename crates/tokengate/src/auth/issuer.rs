//! Access token issuance.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Header, encode};

use super::{AuthError, Claims, Identity, SigningKey};

/// Mints signed access tokens for authenticated identities.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    key: Arc<SigningKey>,
    issuer: String,
    ttl: TimeDelta,
}

impl TokenIssuer {
    pub fn new(key: Arc<SigningKey>, issuer: impl Into<String>, ttl: TimeDelta) -> Self {
        Self {
            key,
            issuer: issuer.into(),
            ttl,
        }
    }

    /// Issue a token for `identity`, valid from now for the configured TTL.
    pub fn issue(&self, identity: &Identity) -> Result<String, AuthError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims::for_identity(identity, &self.issuer, now, self.ttl);
        let header = Header::new(self.key.algorithm().as_jwt());

        // Key material is checked at startup, so a failure here is a bug.
        encode(&header, &claims, self.key.encoding_key())
            .map_err(|e| AuthError::Internal(format!("failed to encode token: {e}")))
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }
}
