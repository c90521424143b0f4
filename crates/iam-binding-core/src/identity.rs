//! Binding identity: `<resource_id>/<role>`

use crate::errors::{BindingError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of one declared binding: the resource it lives on and its role
///
/// Roles contain slashes themselves (`roles/viewer`,
/// `projects/p/roles/custom`), so parsing looks for the split point whose
/// suffix has the shape of a role rather than splitting on the last slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BindingId {
    resource_id: String,
    role: String,
}

impl BindingId {
    /// Create an identity for `role` on `resource_id`
    pub fn new(resource_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            role: role.into(),
        }
    }

    /// Identifier of the resource holding the policy
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Role the binding grants
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Parse an identity previously produced by `Display`
    pub fn parse(id: &str) -> Result<Self> {
        id.char_indices()
            .filter(|&(_, c)| c == '/')
            .map(|(pos, _)| (&id[..pos], &id[pos + 1..]))
            .find(|(resource, role)| !resource.is_empty() && is_role(role))
            .map(|(resource, role)| Self::new(resource, role))
            .ok_or_else(|| {
                BindingError::invalid_binding(format!(
                    "cannot split {id:?} into <resource_id>/<role>"
                ))
            })
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_id, self.role)
    }
}

impl FromStr for BindingId {
    type Err = BindingError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// `roles/<name>`, `projects/<p>/roles/<name>` or `organizations/<o>/roles/<name>`
fn is_role(candidate: &str) -> bool {
    let parts: Vec<&str> = candidate.split('/').collect();
    match parts.as_slice() {
        ["roles", name] => !name.is_empty(),
        [parent, id, "roles", name] => {
            matches!(*parent, "projects" | "organizations") && !id.is_empty() && !name.is_empty()
        }
        _ => false,
    }
}
