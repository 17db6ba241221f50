//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::{
    AuthConfig, AuthState, Authenticator, BcryptVerifier, ConfigValidationError, RequireRole,
    SigningKey, TokenIssuer, TokenVerifier,
};
use crate::store::CredentialStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Token verification for the auth middleware.
    pub auth: AuthState,
    /// Password login.
    pub authenticator: Authenticator,
    /// Token minting for successful logins.
    pub issuer: Arc<TokenIssuer>,
    /// Credential store (also backs the admin user listing).
    pub store: Arc<dyn CredentialStore>,
    /// Role gate for `/admin` routes.
    pub admin_gate: RequireRole,
}

impl AppState {
    /// Wire up the state around one signing key.
    pub fn new(
        config: &AuthConfig,
        key: Arc<SigningKey>,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, ConfigValidationError> {
        let verifier = TokenVerifier::new(Arc::clone(&key), config.issuer.clone())
            .with_leeway(config.leeway());
        let issuer = TokenIssuer::new(key, config.issuer.clone(), config.token_ttl());
        let authenticator = Authenticator::new(
            Arc::clone(&store),
            Arc::new(BcryptVerifier),
            config.hash_workers,
        )
        .with_dummy_hash(config.dummy_password_hash()?);

        Ok(Self {
            auth: AuthState::new(Arc::new(verifier)),
            authenticator,
            issuer: Arc::new(issuer),
            store,
            admin_gate: RequireRole::new(config.admin_role.as_str()),
        })
    }

    /// Validate `config`, load its key and wire up the state.
    pub fn from_config(
        config: &AuthConfig,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, ConfigValidationError> {
        let key = Arc::new(config.signing_key()?);
        Self::new(config, key, store)
    }
}
