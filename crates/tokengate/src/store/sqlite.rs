//! SQLite-backed credential store.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::{CredentialStore, UserRecord, UserSummary};

/// Credential store over the `users`, `roles` and `user_roles` tables.
#[derive(Debug, Clone)]
pub struct SqliteCredentialStore {
    pool: SqlitePool,
}

impl SqliteCredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a user with its roles. Fails if the username exists.
    #[instrument(skip(self, password_hash, roles))]
    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        roles: &BTreeSet<String>,
    ) -> Result<()> {
        if username.is_empty() {
            bail!("username must not be empty");
        }

        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let existing: Option<String> =
            sqlx::query_scalar("SELECT username FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&mut *tx)
                .await
                .context("Failed to check for existing user")?;
        if existing.is_some() {
            bail!("user '{}' already exists", username);
        }

        sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&mut *tx)
            .await
            .context("Failed to insert user")?;

        for role in roles {
            sqlx::query("INSERT OR IGNORE INTO roles (name) VALUES (?)")
                .bind(role)
                .execute(&mut *tx)
                .await
                .context("Failed to insert role")?;

            sqlx::query("INSERT INTO user_roles (username, role_name) VALUES (?, ?)")
                .bind(username)
                .bind(role)
                .execute(&mut *tx)
                .await
                .context("Failed to grant role")?;
        }

        tx.commit().await.context("Failed to commit user")?;
        debug!("Created user {} with {} role(s)", username, roles.len());
        Ok(())
    }

    async fn roles_for(&self, username: &str) -> Result<BTreeSet<String>> {
        let roles: Vec<String> = sqlx::query_scalar(
            "SELECT role_name FROM user_roles WHERE username = ? ORDER BY role_name",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch user roles")?;

        Ok(roles.into_iter().collect())
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT username, password_hash FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to fetch user by username")?;

        let Some((username, password_hash)) = row else {
            return Ok(None);
        };

        let roles = self.roles_for(&username).await?;
        Ok(Some(UserRecord {
            username,
            password_hash,
            roles,
        }))
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<UserSummary>> {
        let usernames: Vec<String> =
            sqlx::query_scalar("SELECT username FROM users ORDER BY username")
                .fetch_all(&self.pool)
                .await
                .context("Failed to list users")?;

        let grants: Vec<(String, String)> =
            sqlx::query_as("SELECT username, role_name FROM user_roles ORDER BY role_name")
                .fetch_all(&self.pool)
                .await
                .context("Failed to list user roles")?;

        let mut roles: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (username, role) in grants {
            roles.entry(username).or_default().push(role);
        }

        Ok(usernames
            .into_iter()
            .map(|username| {
                let roles = roles.remove(&username).unwrap_or_default();
                UserSummary { username, roles }
            })
            .collect())
    }
}
