//! Binding resource lifecycle
//!
//! [`BindingController`] runs create, read, update and delete for one
//! declared binding. Each operation builds a fresh updater through the
//! factory, performs at most one read-modify-write cycle, and finishes by
//! reading the policy back into the state.

use crate::merge;
use crate::rmw::{fetch_policy, read_modify_write};
use iam_binding_core::{
    BindingError, BindingId, BindingState, PolicyUpdater, ReconcileConfig, Result, UpdaterFactory,
};

/// Result of projecting the remote policy into a binding state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The role is in the policy; members and etag were refreshed
    Present,
    /// The role is gone; the identity was cleared
    Absent,
}

/// Result of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The role was removed from the policy
    Removed,
    /// The policy had no binding for the role; nothing was changed
    AlreadyAbsent,
}

/// Lifecycle operations for declared bindings on one kind of resource
#[derive(Debug, Clone)]
pub struct BindingController<F> {
    factory: F,
    config: ReconcileConfig,
}

impl<F: UpdaterFactory> BindingController<F> {
    /// Controller with default configuration
    pub fn new(factory: F) -> Self {
        Self::with_config(factory, ReconcileConfig::default())
    }

    /// Controller with explicit configuration
    pub fn with_config(factory: F, config: ReconcileConfig) -> Self {
        Self { factory, config }
    }

    fn updater(&self, state: &BindingState) -> Result<F::Updater> {
        self.factory
            .new_updater(state)
            .map_err(BindingError::construction)
    }

    /// Merge the declared members into the role and start tracking it
    ///
    /// Members already granted for the role are kept. If there were any,
    /// the following [`plan`](crate::plan::plan) reports them as drift.
    pub async fn create(&self, state: &mut BindingState) -> Result<ReadOutcome> {
        let updater = self.updater(state)?;
        let declared = state.declared()?;

        read_modify_write(&updater, &self.config, |policy| {
            merge::apply_create(policy, &declared)
        })
        .await?;

        state.set_id(BindingId::new(updater.resource_id(), &declared.role));
        self.read(state).await
    }

    /// Refresh the state from the remote policy
    ///
    /// A missing role is not an error: the identity is cleared so the
    /// caller stops tracking the binding.
    pub async fn read(&self, state: &mut BindingState) -> Result<ReadOutcome> {
        let updater = self.updater(state)?;
        let role = state.declared()?.role;

        let policy = fetch_policy(&updater, &self.config).await?;
        match policy.binding(&role) {
            Some(binding) => {
                state.observe(binding, &policy.etag);
                Ok(ReadOutcome::Present)
            }
            None => {
                tracing::debug!(
                    resource = %updater.describe_resource(),
                    role = %role,
                    "Binding not found in policy, removing from tracked state"
                );
                state.clear_id();
                Ok(ReadOutcome::Absent)
            }
        }
    }

    /// Make the role grant exactly the declared members and track it
    pub async fn update(&self, state: &mut BindingState) -> Result<ReadOutcome> {
        let updater = self.updater(state)?;
        let declared = state.declared()?;

        read_modify_write(&updater, &self.config, |policy| {
            merge::apply_update(policy, &declared)
        })
        .await?;

        state.set_id(BindingId::new(updater.resource_id(), &declared.role));
        self.read(state).await
    }

    /// Remove the role from the policy
    ///
    /// Deleting a role that is already gone succeeds without committing
    /// anything different.
    pub async fn delete(&self, state: &mut BindingState) -> Result<DeleteOutcome> {
        let updater = self.updater(state)?;
        let declared = state.declared()?;

        let removed = read_modify_write(&updater, &self.config, |policy| {
            merge::apply_delete(policy, &declared.role)
        })
        .await?;

        let outcome = if removed == 0 {
            tracing::debug!(
                resource = %updater.describe_resource(),
                role = %declared.role,
                "Policy bindings did not include the role; nothing to delete"
            );
            DeleteOutcome::AlreadyAbsent
        } else {
            DeleteOutcome::Removed
        };

        self.read(state).await?;
        Ok(outcome)
    }

    /// Start tracking an existing binding from its `<resource_id>/<role>` identity
    pub async fn import(&self, id: &str) -> Result<BindingState> {
        let id = BindingId::parse(id)?;
        let mut state = BindingState::from_id(id.clone());
        match self.read(&mut state).await? {
            ReadOutcome::Present => Ok(state),
            ReadOutcome::Absent => Err(BindingError::invalid_binding(format!(
                "no binding for role {:?} on {}",
                id.role(),
                id.resource_id()
            ))),
        }
    }
}
