//! Read-modify-write over a policy updater
//!
//! One cycle is `fetch → mutate → commit`, run exactly once. The commit
//! carries the etag that was fetched, so a concurrent writer makes it fail
//! at the authority. This module does not retry; callers that want to
//! re-run a cycle after a conflict use [`crate::retry::retry_on_conflict`],
//! which always starts from a fresh fetch.

use iam_binding_core::{BindingError, Policy, PolicyUpdater, ReconcileConfig, Result};

/// Fetch the current policy of the updater's resource
pub async fn fetch_policy<U>(updater: &U, config: &ReconcileConfig) -> Result<Policy>
where
    U: PolicyUpdater + ?Sized,
{
    let resource = updater.describe_resource();
    let policy = updater
        .fetch_policy()
        .await
        .map_err(|source| BindingError::fetch(&resource, source))?;

    tracing::debug!(
        resource = %resource,
        etag = %policy.etag,
        bindings = policy.bindings.len(),
        "Retrieved IAM policy"
    );
    if config.log_policy_contents {
        trace_policy(&resource, &policy);
    }
    Ok(policy)
}

/// Fetch, apply `mutate`, then commit with the fetched etag
///
/// Commit is attempted only if both fetch and mutation succeed. Errors from
/// `mutate` are returned as-is.
pub async fn read_modify_write<U, F, T>(
    updater: &U,
    config: &ReconcileConfig,
    mutate: F,
) -> Result<T>
where
    U: PolicyUpdater + ?Sized,
    F: FnOnce(&mut Policy) -> Result<T>,
{
    let mut policy = fetch_policy(updater, config).await?;
    let read_etag = policy.etag.clone();

    let output = mutate(&mut policy)?;
    // The etag is the compare-and-swap token; a mutation must not move it.
    policy.etag = read_etag;

    let resource = updater.describe_resource();
    match updater.commit_policy(&policy).await {
        Ok(()) => {
            tracing::info!(
                resource = %resource,
                etag = %policy.etag,
                bindings = policy.bindings.len(),
                "Committed IAM policy"
            );
            Ok(output)
        }
        Err(source) => {
            if source.is_conflict() {
                tracing::warn!(
                    resource = %resource,
                    etag = %policy.etag,
                    error = %source,
                    "IAM policy changed concurrently; commit rejected"
                );
            }
            Err(BindingError::commit(resource, source))
        }
    }
}

fn trace_policy(resource: &str, policy: &Policy) {
    match serde_json::to_string(policy) {
        Ok(json) => tracing::trace!(resource = %resource, policy = %json, "IAM policy contents"),
        Err(_) => tracing::trace!(resource = %resource, ?policy, "IAM policy contents"),
    }
}
