//! In-memory policy authority
//!
//! Stores one policy per resource id and enforces the etag contract the
//! real authorities enforce: a commit is accepted only if it carries the
//! etag currently stored, and every accepted commit gets a fresh etag.
//!
//! # Blocking Lock Usage
//!
//! Uses `std::sync::Mutex`: the lock is never held across an await point and
//! contention is not a concern in tests.

use async_trait::async_trait;
use iam_binding_core::{
    BindingState, Etag, Policy, PolicyUpdater, RemoteBinding, UpdaterError, UpdaterFactory,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared in-memory authority; clones share state
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuthority {
    state: Arc<Mutex<AuthorityState>>,
}

#[derive(Debug, Default)]
struct AuthorityState {
    policies: HashMap<String, StoredPolicy>,
    fetches: usize,
    commits: usize,
    fail_next_fetch: Option<UpdaterError>,
    fail_next_commit: Option<UpdaterError>,
    fail_construction: Option<UpdaterError>,
}

#[derive(Debug, Clone, Default)]
struct StoredPolicy {
    version: u64,
    bindings: Vec<RemoteBinding>,
}

impl StoredPolicy {
    fn etag(&self) -> Etag {
        Etag::new(hex::encode(self.version.to_be_bytes()))
    }

    fn snapshot(&self) -> Policy {
        Policy::new(self.etag(), self.bindings.clone())
    }

    fn bump(&mut self, bindings: Vec<RemoteBinding>) {
        self.version += 1;
        self.bindings = bindings;
    }
}

impl InMemoryAuthority {
    /// Empty authority; unknown resources read as an empty policy
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, AuthorityState> {
        // A panicking test poisons the lock; the data is still usable.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Seed `resource` with `bindings`, replacing whatever was stored
    pub fn with_policy(self, resource: &str, bindings: Vec<RemoteBinding>) -> Self {
        self.lock()
            .policies
            .entry(resource.to_string())
            .or_default()
            .bump(bindings);
        self
    }

    /// Current stored policy of `resource`
    pub fn policy(&self, resource: &str) -> Policy {
        self.lock()
            .policies
            .get(resource)
            .cloned()
            .unwrap_or_default()
            .snapshot()
    }

    /// Modify `resource` out of band, as another actor would; bumps the etag
    pub fn apply_external<F>(&self, resource: &str, change: F)
    where
        F: FnOnce(&mut Vec<RemoteBinding>),
    {
        let mut state = self.lock();
        let stored = state.policies.entry(resource.to_string()).or_default();
        let mut bindings = stored.bindings.clone();
        change(&mut bindings);
        stored.bump(bindings);
    }

    /// Make the next fetch fail with `error`
    pub fn fail_next_fetch(&self, error: UpdaterError) {
        self.lock().fail_next_fetch = Some(error);
    }

    /// Make the next commit fail with `error`
    pub fn fail_next_commit(&self, error: UpdaterError) {
        self.lock().fail_next_commit = Some(error);
    }

    /// Make every factory construction fail with `error` until cleared
    pub fn fail_construction(&self, error: Option<UpdaterError>) {
        self.lock().fail_construction = error;
    }

    /// Number of fetches served, including failed ones
    pub fn fetch_count(&self) -> usize {
        self.lock().fetches
    }

    /// Number of commits attempted, including rejected ones
    pub fn commit_count(&self) -> usize {
        self.lock().commits
    }

    /// Updater bound to `resource`
    pub fn updater(&self, resource: &str) -> InMemoryUpdater {
        InMemoryUpdater {
            authority: self.clone(),
            resource: resource.to_string(),
        }
    }

    /// Factory whose updaters all target `resource`
    pub fn factory(&self, resource: &str) -> InMemoryFactory {
        InMemoryFactory {
            authority: self.clone(),
            resource: resource.to_string(),
        }
    }

    fn fetch(&self, resource: &str) -> Result<Policy, UpdaterError> {
        let mut state = self.lock();
        state.fetches += 1;
        if let Some(error) = state.fail_next_fetch.take() {
            return Err(error);
        }
        Ok(state
            .policies
            .get(resource)
            .cloned()
            .unwrap_or_default()
            .snapshot())
    }

    fn commit(&self, resource: &str, policy: &Policy) -> Result<(), UpdaterError> {
        let mut state = self.lock();
        state.commits += 1;
        if let Some(error) = state.fail_next_commit.take() {
            return Err(error);
        }

        let stored = state.policies.entry(resource.to_string()).or_default();
        let current = stored.etag();
        if policy.etag != current {
            return Err(UpdaterError::conflict(format!(
                "etag {} is stale, current is {current}",
                policy.etag
            )));
        }
        stored.bump(policy.bindings.clone());
        tracing::trace!(resource = %resource, etag = %stored.etag(), "Stored policy");
        Ok(())
    }
}

/// [`PolicyUpdater`] over one resource of an [`InMemoryAuthority`]
#[derive(Debug, Clone)]
pub struct InMemoryUpdater {
    authority: InMemoryAuthority,
    resource: String,
}

#[async_trait]
impl PolicyUpdater for InMemoryUpdater {
    async fn fetch_policy(&self) -> Result<Policy, UpdaterError> {
        self.authority.fetch(&self.resource)
    }

    async fn commit_policy(&self, policy: &Policy) -> Result<(), UpdaterError> {
        self.authority.commit(&self.resource, policy)
    }

    fn resource_id(&self) -> String {
        self.resource.clone()
    }

    fn describe_resource(&self) -> String {
        format!("in-memory resource {:?}", self.resource)
    }
}

/// [`UpdaterFactory`] producing [`InMemoryUpdater`]s for a fixed resource
#[derive(Debug, Clone)]
pub struct InMemoryFactory {
    authority: InMemoryAuthority,
    resource: String,
}

impl UpdaterFactory for InMemoryFactory {
    type Updater = InMemoryUpdater;

    fn new_updater(&self, state: &BindingState) -> Result<InMemoryUpdater, UpdaterError> {
        if let Some(error) = self.authority.lock().fail_construction.clone() {
            return Err(error);
        }
        // An imported identity names its resource; it has to be ours.
        if let Some(id) = state.id() {
            if id.resource_id() != self.resource {
                return Err(UpdaterError::invalid(format!(
                    "binding {id} does not belong to {}",
                    self.resource
                )));
            }
        }
        Ok(self.authority.updater(&self.resource))
    }
}
