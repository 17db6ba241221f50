//! Authentication module.
//!
//! Password login backed by a credential store, and stateless JWT access
//! tokens:
//! - `Authenticator` turns a username/password into an `Identity`
//! - `TokenIssuer` signs an `Identity` into a token
//! - `TokenVerifier` turns a bearer token back into an `Identity`
//! - axum middleware gates routes on authentication and role membership

mod authenticator;
mod claims;
mod config;
mod error;
mod identity;
mod issuer;
mod keys;
mod middleware;
mod verifier;

pub use authenticator::{
    AuthenticationError, Authenticator, BcryptVerifier, DEFAULT_DUMMY_HASH, PasswordVerifier,
};
pub use claims::Claims;
pub use config::{AuthConfig, ConfigValidationError};
pub use error::{AuthError, AuthErrorResponse};
pub use identity::Identity;
pub use issuer::TokenIssuer;
pub use keys::{KeyError, MIN_SECRET_LEN, SigningAlgorithm, SigningKey};
pub use middleware::{
    AuthState, CurrentUser, RequireRole, auth_middleware, bearer_token_from_header, require_role,
};
pub use verifier::{TokenError, TokenVerifier};
