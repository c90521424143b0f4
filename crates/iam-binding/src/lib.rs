//! # IAM Binding
//!
//! Reconciles a declared role binding (one role, a set of members) against a
//! remotely managed access-control policy that other actors modify
//! concurrently.
//!
//! ## Core Concepts
//!
//! - **Merge engine** ([`merge`]): pure create / update / delete semantics
//!   over a policy's binding list. Create unions, update replaces, delete
//!   removes; every role ends up at most once.
//! - **Read-modify-write** ([`rmw`]): `fetch → mutate → commit` once, with
//!   the fetched etag as compare-and-swap token.
//! - **Controller** ([`controller`]): the four lifecycle operations over a
//!   [`BindingState`](iam_binding_core::BindingState).
//! - **Plan** ([`plan`]): drift between observed state and a declaration.
//! - **Retry** ([`retry`]): caller-level re-invocation after conflicts.
//!
//! The remote authority is reached only through the
//! [`PolicyUpdater`](iam_binding_core::PolicyUpdater) capability.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Lifecycle operations
pub mod controller;

/// Binding merge engine
pub mod merge;

/// Drift planning
pub mod plan;

/// Conflict retry helper
pub mod retry;

/// Read-modify-write orchestrator
pub mod rmw;

pub use controller::{BindingController, DeleteOutcome, ReadOutcome};
pub use merge::merge_bindings;
pub use plan::{plan, BindingPlan};
pub use retry::retry_on_conflict;
pub use rmw::{fetch_policy, read_modify_write};

pub use iam_binding_core::{
    BindingError, BindingId, BindingState, ConflictRetryConfig, DeclaredBinding, Etag, Policy,
    PolicyUpdater, ReconcileConfig, RemoteBinding, Result, UpdaterError, UpdaterFactory,
};
