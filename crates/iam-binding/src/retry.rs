//! Caller-level retry after etag conflicts
//!
//! A conflict means another writer committed between our fetch and our
//! commit. The only correct recovery is to run the whole cycle again from a
//! fresh fetch, which is what this helper does. Anything other than a commit
//! conflict is returned immediately.

use iam_binding_core::{ConflictRetryConfig, Result};
use std::future::Future;

/// Run `operation` until it succeeds, fails with a non-conflict error, or
/// `config.max_attempts` attempts have been made
pub async fn retry_on_conflict<T, F, Fut>(
    config: &ConflictRetryConfig,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation().await {
            Err(err) if err.is_conflict() && attempt < max_attempts => {
                let delay = config.delay_for(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "Retrying IAM policy update after conflict"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iam_binding_core::{BindingError, UpdaterError};
    use std::cell::Cell;
    use std::time::Duration;

    fn fast() -> ConflictRetryConfig {
        ConflictRetryConfig::default()
            .with_max_attempts(3)
            .with_initial_delay(Duration::ZERO)
            .with_max_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_retries_conflicts_until_success() {
        let calls = Cell::new(0);
        let result = retry_on_conflict(&fast(), || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 3 {
                    Err(BindingError::commit("demo", UpdaterError::conflict("stale")))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = Cell::new(0);
        let result: Result<()> = retry_on_conflict(&fast(), || {
            calls.set(calls.get() + 1);
            async { Err(BindingError::commit("demo", UpdaterError::conflict("stale"))) }
        })
        .await;

        assert!(result.unwrap_err().is_conflict());
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let calls = Cell::new(0);
        let result: Result<()> = retry_on_conflict(&fast(), || {
            calls.set(calls.get() + 1);
            async { Err(BindingError::fetch("demo", UpdaterError::transport("down"))) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_disabled_runs_once() {
        let calls = Cell::new(0);
        let result: Result<()> = retry_on_conflict(&ConflictRetryConfig::disabled(), || {
            calls.set(calls.get() + 1);
            async { Err(BindingError::commit("demo", UpdaterError::conflict("stale"))) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }
}
