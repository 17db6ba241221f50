//! Credential storage.
//!
//! The authenticator only sees the [`CredentialStore`] trait. Two backends
//! exist: a fixed in-memory set loaded from config, and SQLite.

mod memory;
mod sqlite;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::db::Database;

pub use memory::InMemoryCredentialStore;
pub use sqlite::SqliteCredentialStore;

/// Stored credential plus the user's role names.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    /// bcrypt hash.
    pub password_hash: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl UserRecord {
    pub fn new<I, S>(username: impl Into<String>, password_hash: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("roles", &self.roles)
            .finish()
    }
}

/// A user as listed to administrators. Carries no credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub username: String,
    pub roles: Vec<String>,
}

impl From<&UserRecord> for UserSummary {
    fn from(record: &UserRecord) -> Self {
        Self {
            username: record.username.clone(),
            roles: record.roles.iter().cloned().collect(),
        }
    }
}

/// Read access to credentials and role membership.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a user. `Ok(None)` means no such user; `Err` means the store
    /// itself failed.
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>>;

    /// All users, ordered by username.
    async fn list_users(&self) -> Result<Vec<UserSummary>>;
}

/// Which credential store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Users listed in `store.users`.
    #[default]
    Memory,
    /// SQLite database at `store.database_path`.
    Sqlite,
}

/// Credential store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// SQLite database file. Defaults to `tokengate.db` in the data dir.
    pub database_path: Option<PathBuf>,

    /// Users for the memory backend.
    pub users: Vec<UserRecord>,
}

impl StoreConfig {
    /// Database path, falling back to `default_path`, with `~` expanded.
    pub fn database_path(&self, default_path: &Path) -> PathBuf {
        match &self.database_path {
            Some(path) => {
                let raw = path.to_string_lossy();
                PathBuf::from(shellexpand::tilde(&raw).into_owned())
            }
            None => default_path.to_path_buf(),
        }
    }

    /// Open the configured backend.
    pub async fn open(&self, default_db_path: &Path) -> Result<Arc<dyn CredentialStore>> {
        match self.backend {
            StoreBackend::Memory => Ok(Arc::new(InMemoryCredentialStore::new(
                self.users.clone(),
            )?)),
            StoreBackend::Sqlite => {
                let db = Database::new(&self.database_path(default_db_path)).await?;
                Ok(Arc::new(SqliteCredentialStore::new(db.pool().clone())))
            }
        }
    }
}
