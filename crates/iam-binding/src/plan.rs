//! Drift between observed state and a declared binding
//!
//! After a create the role may still hold members that were granted out of
//! band (create only adds). [`plan`] is how that shows up: as an `Update`
//! that would remove them.

use iam_binding_core::{BindingState, DeclaredBinding};
use std::collections::BTreeSet;

/// What it takes to move observed state to the declared binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingPlan {
    /// Nothing to do
    NoChange,

    /// The binding is not tracked and must be created
    Create,

    /// The role changed; roles are immutable so the binding is replaced
    Replace {
        /// Role currently tracked
        from: String,
        /// Role now declared
        to: String,
    },

    /// Same role, different members
    Update {
        /// Declared members the role does not grant yet
        added: BTreeSet<String>,
        /// Granted members the declaration does not list
        removed: BTreeSet<String>,
    },
}

impl BindingPlan {
    /// Whether applying the plan would touch the remote policy
    pub fn has_changes(&self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Compare observed `state` against `declared`
pub fn plan(state: &BindingState, declared: &DeclaredBinding) -> BindingPlan {
    if state.id().is_none() {
        return BindingPlan::Create;
    }
    if state.role() != declared.role {
        return BindingPlan::Replace {
            from: state.role().to_string(),
            to: declared.role.clone(),
        };
    }

    let added: BTreeSet<String> = declared
        .members
        .difference(state.members())
        .cloned()
        .collect();
    let removed: BTreeSet<String> = state
        .members()
        .difference(&declared.members)
        .cloned()
        .collect();

    if added.is_empty() && removed.is_empty() {
        BindingPlan::NoChange
    } else {
        BindingPlan::Update { added, removed }
    }
}
