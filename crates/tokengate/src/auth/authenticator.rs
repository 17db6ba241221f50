//! Username/password authentication.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

use super::Identity;
use crate::store::CredentialStore;

/// bcrypt hash (cost 12) compared against when the username is unknown, so
/// that path costs as much as a wrong password.
pub const DEFAULT_DUMMY_HASH: &str =
    "$2b$12$R5WKx72PSJTtypjfHLO5luwOe3HQZQ4pRdw2NjZ7TjIoOV531f20e";

const DUMMY_PASSWORD: &str = "tokengate-unknown-user";

/// Dummy hash at `cost`. The default cost reuses [`DEFAULT_DUMMY_HASH`].
pub(super) fn dummy_hash_for_cost(cost: u32) -> Result<String, bcrypt::BcryptError> {
    if cost == bcrypt::DEFAULT_COST {
        return Ok(DEFAULT_DUMMY_HASH.to_string());
    }
    bcrypt::hash(DUMMY_PASSWORD, cost)
}

/// Checks a plaintext password against a stored hash.
pub trait PasswordVerifier: Send + Sync + 'static {
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// bcrypt verification. A hash that fails to parse never matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptVerifier;

impl PasswordVerifier for BcryptVerifier {
    fn verify(&self, password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }
}

/// Authentication failures.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// Unknown user, wrong password or empty input.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("credential store error: {0:#}")]
    Store(anyhow::Error),

    #[error("password verification failed: {0}")]
    Hashing(String),
}

/// Resolves a username/password pair to an [`Identity`].
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordVerifier>,
    permits: Arc<Semaphore>,
    dummy_hash: Arc<str>,
}

impl Authenticator {
    /// `hash_workers` bounds how many password checks run at once on the
    /// blocking pool.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordVerifier>,
        hash_workers: usize,
    ) -> Self {
        Self {
            store,
            hasher,
            permits: Arc::new(Semaphore::new(hash_workers.max(1))),
            dummy_hash: Arc::from(DEFAULT_DUMMY_HASH),
        }
    }

    /// Replace the hash used for unknown usernames. It should use the same
    /// cost as the stored hashes.
    pub fn with_dummy_hash(mut self, hash: impl Into<Arc<str>>) -> Self {
        self.dummy_hash = hash.into();
        self
    }

    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Identity, AuthenticationError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let record = self
            .store
            .find_by_username(username)
            .await
            .map_err(AuthenticationError::Store)?;

        let hash = match &record {
            Some(record) => record.password_hash.clone(),
            None => self.dummy_hash.to_string(),
        };
        let matched = self.verify_password(password, hash).await?;

        match record {
            Some(record) if matched => {
                debug!(roles = record.roles.len(), "credentials accepted");
                Ok(Identity::new(record.username, record.roles))
            }
            _ => {
                debug!("credentials rejected");
                Err(AuthenticationError::InvalidCredentials)
            }
        }
    }

    async fn verify_password(
        &self,
        password: &str,
        hash: String,
    ) -> Result<bool, AuthenticationError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| AuthenticationError::Hashing(e.to_string()))?;

        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthenticationError::Hashing(e.to_string()))
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("available_permits", &self.permits.available_permits())
            .finish_non_exhaustive()
    }
}
