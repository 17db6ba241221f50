//! Access token claims.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::Identity;

/// Claim set carried by every access token.
///
/// Role names travel as a JSON array under the `roles` key, sorted
/// lexicographically. Issuer and verifier both go through this struct, so
/// the claim names cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer.
    pub iss: String,

    /// Subject (username).
    pub sub: String,

    /// Issued at (as Unix timestamp).
    pub iat: i64,

    /// Expiration time (as Unix timestamp).
    pub exp: i64,

    /// Role names held by the subject.
    pub roles: Vec<String>,
}

impl Claims {
    /// Build the claim set for `identity`, valid from `issued_at` for `ttl`.
    pub fn for_identity(
        identity: &Identity,
        issuer: &str,
        issued_at: DateTime<Utc>,
        ttl: TimeDelta,
    ) -> Self {
        Self {
            iss: issuer.to_string(),
            sub: identity.username().to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            roles: identity.role_list(),
        }
    }

    /// A token is live while `exp > now - leeway`.
    pub fn is_expired_at(&self, now: DateTime<Utc>, leeway_secs: i64) -> bool {
        self.exp <= now.timestamp() - leeway_secs
    }

    pub fn into_identity(self) -> Identity {
        Identity::new(self.sub, self.roles)
    }
}
