//! Policy and binding types
//!
//! [`Policy`] and [`RemoteBinding`] mirror what the remote authority stores.
//! [`DeclaredBinding`] is what an operator asks for. The two differ in one
//! important way: remote members are an ordered list that may contain
//! anything another actor put there, declared members are a set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Opaque compare-and-swap token identifying one version of a policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Etag(String);

impl Etag {
    /// Wrap a token returned by the remote authority
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the raw token
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Etag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Etag {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

/// One role and the principals it is granted to, as stored remotely
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteBinding {
    /// Role name, e.g. `roles/viewer`
    pub role: String,
    /// Principals such as `user:alice@example.com`
    #[serde(default)]
    pub members: Vec<String>,
}

impl RemoteBinding {
    /// Create a binding for `role` granted to `members`
    pub fn new<I, S>(role: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            role: role.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Members as a set, dropping duplicates and ordering
    pub fn member_set(&self) -> BTreeSet<String> {
        self.members.iter().cloned().collect()
    }
}

/// An access-control policy together with the etag it was read at
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Version token; must be sent back unchanged on commit
    #[serde(default)]
    pub etag: Etag,
    /// Bindings in the order the authority returned them
    #[serde(default)]
    pub bindings: Vec<RemoteBinding>,
}

impl Policy {
    /// Create a policy at `etag` with the given bindings
    pub fn new(etag: impl Into<Etag>, bindings: Vec<RemoteBinding>) -> Self {
        Self {
            etag: etag.into(),
            bindings,
        }
    }

    /// First binding for `role`, compared case-sensitively
    pub fn binding(&self, role: &str) -> Option<&RemoteBinding> {
        self.bindings.iter().find(|b| b.role == role)
    }

    /// Number of entries carrying `role`
    pub fn role_count(&self, role: &str) -> usize {
        self.bindings.iter().filter(|b| b.role == role).count()
    }

    /// Whether every role appears at most once
    pub fn has_unique_roles(&self) -> bool {
        let mut seen = BTreeSet::new();
        self.bindings.iter().all(|b| seen.insert(b.role.as_str()))
    }
}

/// The binding an operator declared: a role and a set of members
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeclaredBinding {
    /// Role name; immutable once the binding exists
    pub role: String,
    /// Principals that should hold the role
    pub members: BTreeSet<String>,
}

impl DeclaredBinding {
    /// Create a declared binding, collapsing duplicate members
    pub fn new<I, S>(role: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            role: role.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Convert into the shape the remote authority stores
    pub fn to_remote(&self) -> RemoteBinding {
        RemoteBinding {
            role: self.role.clone(),
            members: self.members.iter().cloned().collect(),
        }
    }
}
