//! Binding merge engine
//!
//! Pure functions computing the next binding list of a policy for each
//! lifecycle operation. Create and update differ on purpose: create merges
//! the declared members into whatever the role already grants, update
//! replaces the role's members exactly. Create therefore never silently
//! revokes access someone else granted; the difference shows up afterwards
//! as drift (see [`crate::plan`]) and the next update removes it.
//!
//! Every mutation ends by checking that its role occurs at most once. The
//! lookups below stop at the first match, which is only sound under that
//! invariant.

use iam_binding_core::{BindingError, DeclaredBinding, Policy, RemoteBinding, Result};
use std::collections::{HashMap, HashSet};

/// Collapse entries sharing a role into one entry carrying the union of their members
///
/// Roles keep the position of their first appearance and members keep the
/// order in which they were first seen; duplicates are dropped.
pub fn merge_bindings(bindings: Vec<RemoteBinding>) -> Vec<RemoteBinding> {
    let mut merged: Vec<RemoteBinding> = Vec::with_capacity(bindings.len());
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut seen: Vec<HashSet<String>> = Vec::with_capacity(bindings.len());

    for binding in bindings {
        let pos = match index.get(&binding.role) {
            Some(&pos) => pos,
            None => {
                index.insert(binding.role.clone(), merged.len());
                merged.push(RemoteBinding {
                    role: binding.role,
                    members: Vec::new(),
                });
                seen.push(HashSet::new());
                merged.len() - 1
            }
        };

        for member in binding.members {
            if seen[pos].insert(member.clone()) {
                merged[pos].members.push(member);
            }
        }
    }

    merged
}

/// Add the declared members to the role, keeping every member already granted
pub fn apply_create(policy: &mut Policy, declared: &DeclaredBinding) -> Result<()> {
    let mut bindings = std::mem::take(&mut policy.bindings);
    bindings.push(declared.to_remote());
    policy.bindings = merge_bindings(bindings);
    ensure_single_entry(policy, &declared.role)
}

/// Make the role grant exactly the declared members
///
/// Any further entries for the same role are dropped so the replacement is
/// exact even if an outside writer left duplicates behind.
pub fn apply_update(policy: &mut Policy, declared: &DeclaredBinding) -> Result<()> {
    match position(policy, &declared.role) {
        Some(pos) => {
            policy.bindings[pos] = declared.to_remote();
            let mut idx = 0;
            policy.bindings.retain(|b| {
                let keep = idx <= pos || b.role != declared.role;
                idx += 1;
                keep
            });
        }
        None => policy.bindings.push(declared.to_remote()),
    }
    ensure_single_entry(policy, &declared.role)
}

/// Remove the role from the policy, returning how many entries were dropped
///
/// Zero means the role was already absent, which is not an error.
pub fn apply_delete(policy: &mut Policy, role: &str) -> Result<usize> {
    let before = policy.bindings.len();
    policy.bindings.retain(|b| b.role != role);
    let removed = before - policy.bindings.len();
    ensure_single_entry(policy, role)?;
    Ok(removed)
}

/// Fail if `role` occurs more than once
pub fn ensure_single_entry(policy: &Policy, role: &str) -> Result<()> {
    match policy.role_count(role) {
        0 | 1 => Ok(()),
        n => Err(BindingError::mutation(format!(
            "policy holds {n} bindings for role {role:?} after merge"
        ))),
    }
}

fn position(policy: &Policy, role: &str) -> Option<usize> {
    policy.bindings.iter().position(|b| b.role == role)
}
