//! Signing key material.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum length in bytes of an HMAC secret.
pub const MIN_SECRET_LEN: usize = 32;

const PAIR_CHECK_MESSAGE: &[u8] = b"tokengate.key-pair-check";

/// Signing algorithms a deployment can choose from.
///
/// The HMAC family signs and verifies with one shared secret; the RSA family
/// signs with a private key and verifies with the matching public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SigningAlgorithm {
    #[default]
    Hs256,
    Hs384,
    Hs512,
    Rs256,
    Rs384,
    Rs512,
}

impl SigningAlgorithm {
    pub fn is_symmetric(self) -> bool {
        matches!(self, Self::Hs256 | Self::Hs384 | Self::Hs512)
    }

    pub fn as_jwt(self) -> Algorithm {
        match self {
            Self::Hs256 => Algorithm::HS256,
            Self::Hs384 => Algorithm::HS384,
            Self::Hs512 => Algorithm::HS512,
            Self::Rs256 => Algorithm::RS256,
            Self::Rs384 => Algorithm::RS384,
            Self::Rs512 => Algorithm::RS512,
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
            Self::Rs256 => "RS256",
            Self::Rs384 => "RS384",
            Self::Rs512 => "RS512",
        };
        f.write_str(name)
    }
}

impl FromStr for SigningAlgorithm {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HS256" => Ok(Self::Hs256),
            "HS384" => Ok(Self::Hs384),
            "HS512" => Ok(Self::Hs512),
            "RS256" => Ok(Self::Rs256),
            "RS384" => Ok(Self::Rs384),
            "RS512" => Ok(Self::Rs512),
            _ => Err(KeyError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// Errors building signing key material.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("{0} needs an HMAC secret")]
    MissingSecret(SigningAlgorithm),

    #[error("{0} needs both private_key_path and public_key_path")]
    MissingKeyPair(SigningAlgorithm),

    #[error("HMAC secret must be at least {min} bytes, got {0}", min = MIN_SECRET_LEN)]
    SecretTooShort(usize),

    #[error("{algorithm} cannot be used with {kind} key material")]
    WrongFamily {
        algorithm: SigningAlgorithm,
        kind: &'static str,
    },

    #[error("failed to read key file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {which} key PEM: {source}")]
    InvalidPem {
        which: &'static str,
        #[source]
        source: jsonwebtoken::errors::Error,
    },

    #[error("public key does not match the private key")]
    MismatchedPair,
}

/// The process-wide key: algorithm plus the encoding and decoding halves.
///
/// Built once at startup and shared by `Arc` between the issuer and the
/// verifier. The two halves always belong to the same algorithm family.
#[derive(Clone)]
pub struct SigningKey {
    algorithm: SigningAlgorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    /// Build an HMAC key from a shared secret.
    pub fn hmac(algorithm: SigningAlgorithm, secret: &[u8]) -> Result<Self, KeyError> {
        if !algorithm.is_symmetric() {
            return Err(KeyError::WrongFamily {
                algorithm,
                kind: "HMAC secret",
            });
        }
        if secret.len() < MIN_SECRET_LEN {
            return Err(KeyError::SecretTooShort(secret.len()));
        }

        Ok(Self {
            algorithm,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        })
    }

    /// Build an RSA key from PEM-encoded private and public keys.
    ///
    /// The private key may be PKCS#1 or PKCS#8, the public key PKCS#1 or
    /// SubjectPublicKeyInfo. The pair is checked by signing and verifying a
    /// fixed message.
    pub fn rsa_pem(
        algorithm: SigningAlgorithm,
        private_pem: &[u8],
        public_pem: &[u8],
    ) -> Result<Self, KeyError> {
        if algorithm.is_symmetric() {
            return Err(KeyError::WrongFamily {
                algorithm,
                kind: "RSA",
            });
        }

        let encoding = EncodingKey::from_rsa_pem(private_pem).map_err(|source| {
            KeyError::InvalidPem {
                which: "private",
                source,
            }
        })?;
        let decoding = DecodingKey::from_rsa_pem(public_pem).map_err(|source| {
            KeyError::InvalidPem {
                which: "public",
                source,
            }
        })?;

        let key = Self {
            algorithm,
            encoding,
            decoding,
        };
        key.check_pair()?;
        Ok(key)
    }

    /// Read the PEM files at `private_path` and `public_path`.
    pub fn rsa_pem_files(
        algorithm: SigningAlgorithm,
        private_path: &Path,
        public_path: &Path,
    ) -> Result<Self, KeyError> {
        let read = |path: &Path| {
            std::fs::read(path).map_err(|source| KeyError::Read {
                path: path.to_path_buf(),
                source,
            })
        };
        Self::rsa_pem(algorithm, &read(private_path)?, &read(public_path)?)
    }

    fn check_pair(&self) -> Result<(), KeyError> {
        let alg = self.algorithm.as_jwt();
        let signature = jsonwebtoken::crypto::sign(PAIR_CHECK_MESSAGE, &self.encoding, alg).map_err(
            |source| KeyError::InvalidPem {
                which: "private",
                source,
            },
        )?;
        match jsonwebtoken::crypto::verify(&signature, PAIR_CHECK_MESSAGE, &self.decoding, alg) {
            Ok(true) => Ok(()),
            _ => Err(KeyError::MismatchedPair),
        }
    }

    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVATE_PEM: &str = include_str!("../../tests/fixtures/rsa_private.pem");
    const PUBLIC_PEM: &str = include_str!("../../tests/fixtures/rsa_public.pem");
    const OTHER_PUBLIC_PEM: &str = include_str!("../../tests/fixtures/other_rsa_public.pem");

    #[test]
    fn test_algorithm_parse_and_display() {
        assert_eq!("hs256".parse::<SigningAlgorithm>().unwrap(), SigningAlgorithm::Hs256);
        assert_eq!("RS512".parse::<SigningAlgorithm>().unwrap(), SigningAlgorithm::Rs512);
        assert_eq!(SigningAlgorithm::Rs256.to_string(), "RS256");
        assert!(matches!(
            "none".parse::<SigningAlgorithm>(),
            Err(KeyError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_algorithm_serde_uses_jwt_names() {
        let alg: SigningAlgorithm = serde_json::from_str("\"RS384\"").unwrap();
        assert_eq!(alg, SigningAlgorithm::Rs384);
        assert_eq!(serde_json::to_string(&SigningAlgorithm::Hs512).unwrap(), "\"HS512\"");
    }

    #[test]
    fn test_hmac_rejects_short_secret() {
        let err = SigningKey::hmac(SigningAlgorithm::Hs256, b"short").unwrap_err();
        assert!(matches!(err, KeyError::SecretTooShort(5)));
    }

    #[test]
    fn test_hmac_rejects_rsa_algorithm() {
        let err = SigningKey::hmac(SigningAlgorithm::Rs256, &[7u8; 32]).unwrap_err();
        assert!(matches!(err, KeyError::WrongFamily { .. }));
    }

    #[test]
    fn test_rsa_pair_accepted() {
        let key = SigningKey::rsa_pem(
            SigningAlgorithm::Rs256,
            PRIVATE_PEM.as_bytes(),
            PUBLIC_PEM.as_bytes(),
        )
        .unwrap();
        assert_eq!(key.algorithm(), SigningAlgorithm::Rs256);
    }

    #[test]
    fn test_rsa_mismatched_pair_rejected() {
        let err = SigningKey::rsa_pem(
            SigningAlgorithm::Rs256,
            PRIVATE_PEM.as_bytes(),
            OTHER_PUBLIC_PEM.as_bytes(),
        )
        .unwrap_err();
        assert!(matches!(err, KeyError::MismatchedPair));
    }

    #[test]
    fn test_rsa_invalid_pem_rejected() {
        let err = SigningKey::rsa_pem(
            SigningAlgorithm::Rs256,
            b"not a pem",
            PUBLIC_PEM.as_bytes(),
        )
        .unwrap_err();
        assert!(matches!(err, KeyError::InvalidPem { which: "private", .. }));
    }

    #[test]
    fn test_rsa_missing_file() {
        let err = SigningKey::rsa_pem_files(
            SigningAlgorithm::Rs256,
            Path::new("/nonexistent/private.pem"),
            Path::new("/nonexistent/public.pem"),
        )
        .unwrap_err();
        assert!(matches!(err, KeyError::Read { .. }));
    }

    #[test]
    fn test_debug_redacts_key_material() {
        let key = SigningKey::hmac(SigningAlgorithm::Hs256, &[b'k'; 40]).unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains("Hs256"));
        assert!(!debug.contains("kkkk"));
    }
}
