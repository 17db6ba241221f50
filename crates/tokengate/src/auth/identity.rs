//! Authenticated identity.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Who a request acts as: a username and the names of the roles it holds.
///
/// Roles live in a `BTreeSet`, so two identities holding the same roles are
/// equal regardless of the order the roles arrived in, and iteration is
/// always lexicographic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    username: String,
    roles: BTreeSet<String>,
}

impl Identity {
    /// Create an identity from a username and any collection of role names.
    pub fn new<I, S>(username: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            username: username.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// Check whether the identity holds `role` (exact, case-sensitive match).
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Roles in the order they are written into the `roles` claim.
    pub fn role_list(&self) -> Vec<String> {
        self.roles.iter().cloned().collect()
    }
}
