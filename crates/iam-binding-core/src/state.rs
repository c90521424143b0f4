//! Declared/observed state of one binding resource
//!
//! This is the accessor surface the hosting framework sees: `role` and
//! `members` are inputs, `etag` is computed, and the identity is set on
//! successful create/update and cleared when a read finds the role gone.

use crate::errors::{BindingError, Result};
use crate::identity::BindingId;
use crate::types::{DeclaredBinding, Etag, RemoteBinding};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// State tracked for one declared binding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingState {
    id: Option<BindingId>,
    role: String,
    members: BTreeSet<String>,
    etag: Option<Etag>,
}

impl BindingState {
    /// Fresh state for a binding that does not exist yet
    pub fn new<I, S>(role: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: None,
            role: role.into(),
            members: members.into_iter().map(Into::into).collect(),
            etag: None,
        }
    }

    /// State for an existing binding, e.g. when importing by id
    ///
    /// Members are unknown until the first read.
    pub fn from_id(id: BindingId) -> Self {
        Self {
            role: id.role().to_string(),
            id: Some(id),
            members: BTreeSet::new(),
            etag: None,
        }
    }

    /// Current identity, `None` when the binding is not tracked
    pub fn id(&self) -> Option<&BindingId> {
        self.id.as_ref()
    }

    /// Declared role
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Declared (or last observed) members
    pub fn members(&self) -> &BTreeSet<String> {
        &self.members
    }

    /// Etag of the policy the binding was last observed in
    pub fn etag(&self) -> Option<&Etag> {
        self.etag.as_ref()
    }

    /// Replace the declared member set
    pub fn set_members<I, S>(&mut self, members: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.members = members.into_iter().map(Into::into).collect();
    }

    /// Build the declared binding the lifecycle operations write
    pub fn declared(&self) -> Result<DeclaredBinding> {
        if self.role.is_empty() {
            return Err(BindingError::invalid_binding("role must not be empty"));
        }
        Ok(DeclaredBinding {
            role: self.role.clone(),
            members: self.members.clone(),
        })
    }

    /// Record the identity assigned after a successful create or update
    pub fn set_id(&mut self, id: BindingId) {
        self.id = Some(id);
    }

    /// Drop the identity: the binding no longer exists remotely
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// Overwrite the observable fields from the remote binding
    pub fn observe(&mut self, binding: &RemoteBinding, etag: &Etag) {
        self.role.clone_from(&binding.role);
        self.members = binding.member_set();
        self.etag = Some(etag.clone());
    }
}
