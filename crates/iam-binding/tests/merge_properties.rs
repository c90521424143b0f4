//! Property-Based Tests for the Binding Merge Engine
//!
//! ## Properties Verified
//!
//! - Create never shrinks membership: post ⊇ existing ∪ declared
//! - Update replaces exactly: post = declared
//! - Delete is idempotent and never errors on an absent role
//! - Every role occurs at most once after any mutation
//! - Roles other than the declared one are untouched

use iam_binding::merge::{apply_create, apply_delete, apply_update, merge_bindings};
use iam_binding::{DeclaredBinding, Policy, RemoteBinding};
use proptest::prelude::*;
use std::collections::BTreeSet;

const ROLES: &[&str] = &[
    "roles/viewer",
    "roles/editor",
    "roles/owner",
    "roles/Viewer",
    "projects/p/roles/custom",
];

fn arb_role() -> impl Strategy<Value = String> {
    prop::sample::select(ROLES).prop_map(str::to_string)
}

fn arb_members() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::sample::select(vec!["user:a", "user:b", "user:c", "group:g", "serviceAccount:s"])
            .prop_map(str::to_string),
        0..6,
    )
}

fn arb_binding() -> impl Strategy<Value = RemoteBinding> {
    (arb_role(), arb_members()).prop_map(|(role, members)| RemoteBinding { role, members })
}

/// Bindings as the authority might return them, duplicates included
fn arb_raw_bindings() -> impl Strategy<Value = Vec<RemoteBinding>> {
    prop::collection::vec(arb_binding(), 0..8)
}

/// A committed policy: at most one entry per role
fn arb_policy() -> impl Strategy<Value = Policy> {
    arb_raw_bindings().prop_map(|bindings| Policy::new("BwE1", merge_bindings(bindings)))
}

fn arb_declared() -> impl Strategy<Value = DeclaredBinding> {
    (arb_role(), arb_members()).prop_map(|(role, members)| DeclaredBinding::new(role, members))
}

fn members(policy: &Policy, role: &str) -> BTreeSet<String> {
    policy
        .binding(role)
        .map(RemoteBinding::member_set)
        .unwrap_or_default()
}

fn others(policy: &Policy, role: &str) -> Vec<RemoteBinding> {
    policy
        .bindings
        .iter()
        .filter(|b| b.role != role)
        .cloned()
        .collect()
}

proptest! {
    /// Property: merge leaves each role once, with the union of its members
    #[test]
    fn prop_merge_unions_per_role(bindings in arb_raw_bindings()) {
        let merged = Policy::new("BwE1", merge_bindings(bindings.clone()));

        prop_assert!(merged.has_unique_roles());
        for binding in &merged.bindings {
            let expected: BTreeSet<String> = bindings
                .iter()
                .filter(|b| b.role == binding.role)
                .flat_map(|b| b.members.iter().cloned())
                .collect();
            prop_assert_eq!(binding.member_set(), expected);
            prop_assert_eq!(binding.members.len(), binding.member_set().len());
        }
        let roles: BTreeSet<&str> = bindings.iter().map(|b| b.role.as_str()).collect();
        prop_assert_eq!(roles.len(), merged.bindings.len());
    }

    /// Property: create never removes a member
    #[test]
    fn prop_create_never_shrinks(policy in arb_policy(), declared in arb_declared()) {
        let existing = members(&policy, &declared.role);
        let mut next = policy.clone();
        apply_create(&mut next, &declared).unwrap();

        let post = members(&next, &declared.role);
        prop_assert!(post.is_superset(&existing));
        prop_assert!(post.is_superset(&declared.members));
        prop_assert!(next.has_unique_roles());
        prop_assert_eq!(others(&next, &declared.role), others(&policy, &declared.role));
        prop_assert_eq!(&next.etag, &policy.etag);
    }

    /// Property: update makes membership exactly the declared set
    #[test]
    fn prop_update_replaces_exactly(policy in arb_policy(), declared in arb_declared()) {
        let mut next = policy.clone();
        apply_update(&mut next, &declared).unwrap();

        prop_assert_eq!(members(&next, &declared.role), declared.members.clone());
        prop_assert_eq!(next.role_count(&declared.role), 1);
        prop_assert!(next.has_unique_roles());
        prop_assert_eq!(others(&next, &declared.role), others(&policy, &declared.role));
    }

    /// Property: update tolerates duplicate entries left by outside writers
    #[test]
    fn prop_update_collapses_outside_duplicates(
        bindings in arb_raw_bindings(),
        declared in arb_declared(),
    ) {
        let mut policy = Policy::new("BwE1", bindings);
        apply_update(&mut policy, &declared).unwrap();
        prop_assert_eq!(policy.role_count(&declared.role), 1);
        prop_assert_eq!(members(&policy, &declared.role), declared.members.clone());
    }

    /// Property: delete removes the role and is idempotent
    #[test]
    fn prop_delete_idempotent(policy in arb_policy(), role in arb_role()) {
        let mut once = policy.clone();
        let removed = apply_delete(&mut once, &role).unwrap();
        prop_assert_eq!(removed, policy.role_count(&role));
        prop_assert!(once.binding(&role).is_none());

        let mut twice = once.clone();
        prop_assert_eq!(apply_delete(&mut twice, &role).unwrap(), 0);
        prop_assert_eq!(&twice, &once);
        prop_assert_eq!(others(&once, &role), others(&policy, &role));
    }
}

#[test]
fn viewer_scenarios() {
    let start = Policy::new(
        "BwE1",
        vec![RemoteBinding::new("roles/viewer", ["user:x", "user:y"])],
    );
    let declared = DeclaredBinding::new("roles/viewer", ["user:y", "user:z"]);

    let mut created = start.clone();
    apply_create(&mut created, &declared).unwrap();
    assert_eq!(
        members(&created, "roles/viewer"),
        BTreeSet::from(["user:x", "user:y", "user:z"].map(String::from))
    );

    let mut updated = start.clone();
    apply_update(&mut updated, &declared).unwrap();
    assert_eq!(
        members(&updated, "roles/viewer"),
        BTreeSet::from(["user:y", "user:z"].map(String::from))
    );

    let mut deleted = start.clone();
    assert_eq!(apply_delete(&mut deleted, "roles/editor").unwrap(), 0);
    assert_eq!(deleted, start);
}
