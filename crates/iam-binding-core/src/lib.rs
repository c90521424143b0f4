//! # IAM Binding Core
//!
//! **Purpose**: Define the data model and capability seams for reconciling a
//! declared role binding against a remotely managed access-control policy.
//!
//! - YES Policy / binding / etag types
//! - YES The `PolicyUpdater` capability and its factory
//! - YES Error and configuration types
//! - NO merge logic or lifecycle operations (that's `iam-binding`)
//! - NO transport to any concrete authority

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Reconciliation configuration
pub mod config;

/// Policy updater capability traits
pub mod effects;

/// Unified error types
pub mod errors;

/// Binding identity
pub mod identity;

/// Declared/observed state of one binding
pub mod state;

/// Policy and binding types
pub mod types;

pub use config::{ConfigError, ConflictRetryConfig, ReconcileConfig};
pub use effects::{PolicyUpdater, UpdaterFactory};
pub use errors::{BindingError, Result, UpdaterError};
pub use identity::BindingId;
pub use state::BindingState;
pub use types::{DeclaredBinding, Etag, Policy, RemoteBinding};
