//! Fixed in-memory credential store.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Result, bail};
use async_trait::async_trait;

use super::{CredentialStore, UserRecord, UserSummary};

/// Read-only store over a user list fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    users: Arc<BTreeMap<String, UserRecord>>,
}

impl InMemoryCredentialStore {
    /// Fails on an empty or duplicate username.
    pub fn new(users: impl IntoIterator<Item = UserRecord>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for user in users {
            if user.username.is_empty() {
                bail!("user with empty username in store config");
            }
            if map.contains_key(&user.username) {
                bail!("duplicate user '{}' in store config", user.username);
            }
            map.insert(user.username.clone(), user);
        }
        Ok(Self {
            users: Arc::new(map),
        })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        Ok(self.users.get(username).cloned())
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>> {
        Ok(self.users.values().map(UserSummary::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_is_exact() {
        let store =
            InMemoryCredentialStore::new(vec![UserRecord::new("admin", "hash", ["ADMIN"])])
                .unwrap();

        assert!(store.find_by_username("admin").await.unwrap().is_some());
        assert!(store.find_by_username("Admin").await.unwrap().is_none());
        assert!(store.find_by_username("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_users_sorted() {
        let store = InMemoryCredentialStore::new(vec![
            UserRecord::new("zoe", "hash", ["USER"]),
            UserRecord::new("admin", "hash", ["USER", "ADMIN"]),
        ])
        .unwrap();

        let users = store.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "admin");
        assert_eq!(users[0].roles, vec!["ADMIN", "USER"]);
        assert_eq!(users[1].username, "zoe");
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let err = InMemoryCredentialStore::new(vec![
            UserRecord::new("admin", "a", ["ADMIN"]),
            UserRecord::new("admin", "b", ["USER"]),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate user 'admin'"));
    }

    #[test]
    fn test_empty_store() {
        let store = InMemoryCredentialStore::new(Vec::new()).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }
}
