//! Policy updater capability
//!
//! The reconciliation core never talks to a remote authority directly. It is
//! parameterized by a [`PolicyUpdater`] that knows how to fetch and commit
//! the policy of one resource, and an [`UpdaterFactory`] that builds such an
//! updater from declared state. Each target resource kind (project, folder,
//! organization, ...) supplies its own pair.

use crate::errors::UpdaterError;
use crate::state::BindingState;
use crate::types::Policy;
use async_trait::async_trait;

/// Read/write access to the policy of a single resource
#[async_trait]
pub trait PolicyUpdater: Send + Sync {
    /// Fetch the current policy, including its etag
    async fn fetch_policy(&self) -> Result<Policy, UpdaterError>;

    /// Commit `policy`; the authority must reject it if `policy.etag` is stale
    async fn commit_policy(&self, policy: &Policy) -> Result<(), UpdaterError>;

    /// Identifier of the resource, used as the prefix of binding identities
    fn resource_id(&self) -> String;

    /// Human readable description for diagnostics
    fn describe_resource(&self) -> String;
}

/// Builds a [`PolicyUpdater`] for the resource a declared binding targets
pub trait UpdaterFactory: Send + Sync {
    /// Updater type produced for this resource kind
    type Updater: PolicyUpdater;

    /// Build an updater; no remote call may happen before this succeeds
    fn new_updater(&self, state: &BindingState) -> Result<Self::Updater, UpdaterError>;
}
