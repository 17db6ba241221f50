//! Authentication configuration.

use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use super::authenticator::dummy_hash_for_cost;
use super::keys::{KeyError, MIN_SECRET_LEN, SigningAlgorithm, SigningKey};

/// Secret shipped in old sample configs; refused at startup.
pub const INSECURE_PLACEHOLDER_SECRET: &str = "change-me-to-a-long-random-secret-value";

/// Upper bound on `token_ttl_secs`. Access tokens are meant to be short-lived.
pub const MAX_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

/// Upper bound on `leeway_secs`.
pub const MAX_LEEWAY_SECS: u64 = 300;

/// Cost range bcrypt accepts.
pub const MIN_PASSWORD_HASH_COST: u32 = 4;
pub const MAX_PASSWORD_HASH_COST: u32 = 31;

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Signing algorithm. HS* uses `jwt_secret`, RS* uses the PEM key pair.
    pub algorithm: SigningAlgorithm,

    /// HMAC secret. Accepts a literal, `env:VAR_NAME` or `base64:<data>`.
    pub jwt_secret: Option<String>,

    /// PEM private key for RS* algorithms.
    pub private_key_path: Option<PathBuf>,

    /// PEM public key for RS* algorithms.
    pub public_key_path: Option<PathBuf>,

    /// Value written to and required in the `iss` claim.
    pub issuer: String,

    /// Access token lifetime in seconds.
    pub token_ttl_secs: u64,

    /// Clock skew tolerated when checking `exp`.
    pub leeway_secs: u64,

    /// Role required for `/api/v1/admin/**`.
    pub admin_role: String,

    /// Maximum concurrent bcrypt verifications.
    pub hash_workers: usize,

    /// bcrypt cost for new hashes and for the hash checked when a username is
    /// unknown. Stored hashes must use this cost, otherwise unknown users and
    /// wrong passwords take measurably different time.
    pub password_hash_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            algorithm: SigningAlgorithm::Hs256,
            // No default JWT secret - must be explicitly configured
            jwt_secret: None,
            private_key_path: None,
            public_key_path: None,
            issuer: "tokengate".to_string(),
            token_ttl_secs: 15 * 60,
            leeway_secs: 0,
            admin_role: "ADMIN".to_string(),
            hash_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            password_hash_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl AuthConfig {
    /// Resolve the JWT secret, expanding `env:VAR_NAME` and `base64:` syntax.
    /// Returns the resolved secret bytes or None if not configured.
    pub fn resolve_jwt_secret(&self) -> Result<Option<Vec<u8>>, ConfigValidationError> {
        let Some(value) = &self.jwt_secret else {
            return Ok(None);
        };

        if let Some(var_name) = value.strip_prefix("env:") {
            return match std::env::var(var_name) {
                Ok(secret) if !secret.is_empty() => Ok(Some(secret.into_bytes())),
                Ok(_) => Err(ConfigValidationError::EnvVarEmpty(var_name.to_string())),
                Err(_) => Err(ConfigValidationError::EnvVarNotFound(var_name.to_string())),
            };
        }

        if let Some(encoded) = value.strip_prefix("base64:") {
            return STANDARD
                .decode(encoded.trim())
                .map(Some)
                .map_err(|_| ConfigValidationError::InvalidBase64Secret);
        }

        Ok(Some(value.clone().into_bytes()))
    }

    /// Validate the configuration without touching key files.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.issuer.trim().is_empty() {
            return Err(ConfigValidationError::EmptyIssuer);
        }
        if self.admin_role.trim().is_empty() {
            return Err(ConfigValidationError::EmptyAdminRole);
        }
        if self.token_ttl_secs == 0 || self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigValidationError::InvalidTokenTtl(self.token_ttl_secs));
        }
        if self.leeway_secs > MAX_LEEWAY_SECS {
            return Err(ConfigValidationError::InvalidLeeway(self.leeway_secs));
        }
        if self.hash_workers == 0 {
            return Err(ConfigValidationError::InvalidHashWorkers);
        }
        if !(MIN_PASSWORD_HASH_COST..=MAX_PASSWORD_HASH_COST).contains(&self.password_hash_cost) {
            return Err(ConfigValidationError::InvalidPasswordHashCost(
                self.password_hash_cost,
            ));
        }

        if self.algorithm.is_symmetric() {
            let secret = self
                .resolve_jwt_secret()?
                .ok_or(ConfigValidationError::MissingJwtSecret)?;

            if secret == INSECURE_PLACEHOLDER_SECRET.as_bytes() {
                return Err(ConfigValidationError::InsecureJwtSecret);
            }
            if secret.len() < MIN_SECRET_LEN {
                return Err(ConfigValidationError::JwtSecretTooShort);
            }
        } else if self.private_key_path.is_none() || self.public_key_path.is_none() {
            return Err(ConfigValidationError::MissingKeyPair(self.algorithm));
        }

        Ok(())
    }

    /// Validate, then load the key material for the configured algorithm.
    pub fn signing_key(&self) -> Result<SigningKey, ConfigValidationError> {
        self.validate()?;

        if self.algorithm.is_symmetric() {
            let secret = self
                .resolve_jwt_secret()?
                .ok_or(ConfigValidationError::MissingJwtSecret)?;
            return Ok(SigningKey::hmac(self.algorithm, &secret)?);
        }

        let (Some(private), Some(public)) = (&self.private_key_path, &self.public_key_path) else {
            return Err(ConfigValidationError::MissingKeyPair(self.algorithm));
        };
        Ok(SigningKey::rsa_pem_files(
            self.algorithm,
            &expand_path(private),
            &expand_path(public),
        )?)
    }

    /// Hash compared against for unknown usernames, at `password_hash_cost`.
    pub fn dummy_password_hash(&self) -> Result<String, ConfigValidationError> {
        dummy_hash_for_cost(self.password_hash_cost)
            .map_err(|_| ConfigValidationError::InvalidPasswordHashCost(self.password_hash_cost))
    }

    pub fn token_ttl(&self) -> TimeDelta {
        TimeDelta::seconds(self.token_ttl_secs.min(MAX_TOKEN_TTL_SECS) as i64)
    }

    pub fn leeway(&self) -> i64 {
        self.leeway_secs.min(MAX_LEEWAY_SECS) as i64
    }

    /// Generate a random 64-character alphanumeric secret from the OS RNG.
    pub fn generate_jwt_secret() -> String {
        use rand::Rng;

        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        const SECRET_LENGTH: usize = 64;

        let mut rng = rand::rng();
        (0..SECRET_LENGTH)
            .map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }
}

fn expand_path(path: &std::path::Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

/// Configuration validation errors.
#[derive(Debug)]
pub enum ConfigValidationError {
    /// HMAC algorithm selected without a secret.
    MissingJwtSecret,
    /// JWT secret is the sample placeholder.
    InsecureJwtSecret,
    /// JWT secret is shorter than `MIN_SECRET_LEN` bytes.
    JwtSecretTooShort,
    /// `base64:` secret does not decode.
    InvalidBase64Secret,
    /// Environment variable not found (for `env:VAR_NAME` syntax).
    EnvVarNotFound(String),
    /// Environment variable is empty (for `env:VAR_NAME` syntax).
    EnvVarEmpty(String),
    /// RSA algorithm selected without both key paths.
    MissingKeyPair(SigningAlgorithm),
    EmptyIssuer,
    EmptyAdminRole,
    InvalidTokenTtl(u64),
    InvalidLeeway(u64),
    InvalidHashWorkers,
    InvalidPasswordHashCost(u32),
    /// Key material could not be loaded.
    Key(KeyError),
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingJwtSecret => write!(
                f,
                "JWT secret is required for HMAC algorithms. Set auth.jwt_secret (literal, env:VAR or base64:...) in config."
            ),
            Self::InsecureJwtSecret => write!(
                f,
                "JWT secret cannot be the sample placeholder value. Run `tokengate generate-secret`."
            ),
            Self::JwtSecretTooShort => write!(
                f,
                "JWT secret must be at least {MIN_SECRET_LEN} bytes long."
            ),
            Self::InvalidBase64Secret => write!(f, "JWT secret after 'base64:' is not valid base64."),
            Self::EnvVarNotFound(var) => write!(
                f,
                "Environment variable '{var}' not found (referenced via env:{var} in config)."
            ),
            Self::EnvVarEmpty(var) => write!(
                f,
                "Environment variable '{var}' is empty (referenced via env:{var} in config)."
            ),
            Self::MissingKeyPair(alg) => write!(
                f,
                "{alg} requires auth.private_key_path and auth.public_key_path."
            ),
            Self::EmptyIssuer => write!(f, "auth.issuer must not be empty."),
            Self::EmptyAdminRole => write!(f, "auth.admin_role must not be empty."),
            Self::InvalidTokenTtl(ttl) => write!(
                f,
                "auth.token_ttl_secs must be between 1 and {MAX_TOKEN_TTL_SECS}, got {ttl}."
            ),
            Self::InvalidLeeway(leeway) => write!(
                f,
                "auth.leeway_secs must be at most {MAX_LEEWAY_SECS}, got {leeway}."
            ),
            Self::InvalidHashWorkers => write!(f, "auth.hash_workers must be at least 1."),
            Self::InvalidPasswordHashCost(cost) => write!(
                f,
                "auth.password_hash_cost must be between {MIN_PASSWORD_HASH_COST} and {MAX_PASSWORD_HASH_COST}, got {cost}."
            ),
            Self::Key(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ConfigValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Key(err) => Some(err),
            _ => None,
        }
    }
}

impl From<KeyError> for ConfigValidationError {
    fn from(err: KeyError) -> Self {
        Self::Key(err)
    }
}
