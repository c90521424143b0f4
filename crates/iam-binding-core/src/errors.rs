//! Error types for binding reconciliation
//!
//! Two layers: [`UpdaterError`] is what a policy updater reports about the
//! remote authority, [`BindingError`] is what a lifecycle operation reports to
//! the hosting framework. Every updater failure is wrapped with the phase it
//! happened in, so callers can tell a failed fetch from a rejected commit.

use thiserror::Error;

/// Failure reported by a [`PolicyUpdater`](crate::PolicyUpdater) or its factory
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdaterError {
    /// The submitted etag no longer matches the stored policy
    #[error("Etag conflict: {message}")]
    Conflict {
        /// Error message describing the conflicting write
        message: String,
    },

    /// The target resource does not exist
    #[error("Not found: {message}")]
    NotFound {
        /// Error message describing what was not found
        message: String,
    },

    /// The caller may not read or write the policy
    #[error("Permission denied: {message}")]
    PermissionDenied {
        /// Error message describing the permission issue
        message: String,
    },

    /// Transport or remote service failure
    #[error("Transport error: {message}")]
    Transport {
        /// Error message describing the transport failure
        message: String,
    },

    /// The declared state or configuration cannot address a resource
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },
}

impl UpdaterError {
    /// Create an etag conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Whether the remote authority rejected a stale etag
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Failure of a binding lifecycle operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// No updater could be built for the declared state
    #[error("Cannot build policy updater: {source}")]
    UpdaterConstruction {
        /// Underlying factory failure
        #[source]
        source: UpdaterError,
    },

    /// Fetching the current policy failed
    #[error("Error retrieving IAM policy for {resource}: {source}")]
    RemoteFetch {
        /// Human readable description of the target resource
        resource: String,
        /// Underlying updater failure
        #[source]
        source: UpdaterError,
    },

    /// Committing the modified policy failed
    #[error("Error setting IAM policy for {resource}: {source}")]
    RemoteCommit {
        /// Human readable description of the target resource
        resource: String,
        /// Underlying updater failure
        #[source]
        source: UpdaterError,
    },

    /// The policy mutation refused to produce a policy
    #[error("Policy mutation failed: {message}")]
    Mutation {
        /// Error message describing the rejected mutation
        message: String,
    },

    /// The declared binding is unusable
    #[error("Invalid binding: {message}")]
    InvalidBinding {
        /// Error message describing the invalid binding
        message: String,
    },
}

impl BindingError {
    /// Wrap a factory failure
    pub fn construction(source: UpdaterError) -> Self {
        Self::UpdaterConstruction { source }
    }

    /// Wrap a fetch failure for the described resource
    pub fn fetch(resource: impl Into<String>, source: UpdaterError) -> Self {
        Self::RemoteFetch {
            resource: resource.into(),
            source,
        }
    }

    /// Wrap a commit failure for the described resource
    pub fn commit(resource: impl Into<String>, source: UpdaterError) -> Self {
        Self::RemoteCommit {
            resource: resource.into(),
            source,
        }
    }

    /// Create a mutation error
    pub fn mutation(message: impl Into<String>) -> Self {
        Self::Mutation {
            message: message.into(),
        }
    }

    /// Create an invalid binding error
    pub fn invalid_binding(message: impl Into<String>) -> Self {
        Self::InvalidBinding {
            message: message.into(),
        }
    }

    /// Whether this is a commit rejected because another writer got there first
    ///
    /// Only commit conflicts are worth re-running a whole cycle for; a fetch
    /// never carries an etag.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::RemoteCommit { source, .. } if source.is_conflict())
    }
}

/// Standard Result type for binding operations
pub type Result<T> = std::result::Result<T, BindingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BindingError::fetch("project \"demo\"", UpdaterError::transport("timed out"));
        assert_eq!(
            err.to_string(),
            "Error retrieving IAM policy for project \"demo\": Transport error: timed out"
        );
    }

    #[test]
    fn test_conflict_only_on_commit() {
        let commit = BindingError::commit("demo", UpdaterError::conflict("stale etag"));
        assert!(commit.is_conflict());

        let fetch = BindingError::fetch("demo", UpdaterError::conflict("stale etag"));
        assert!(!fetch.is_conflict());

        let denied = BindingError::commit("demo", UpdaterError::permission_denied("no"));
        assert!(!denied.is_conflict());
    }

    #[test]
    fn test_missing_resource_on_fetch() {
        let err = BindingError::fetch("demo", UpdaterError::not_found("project demo"));
        assert_eq!(
            err.to_string(),
            "Error retrieving IAM policy for demo: Not found: project demo"
        );
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error as _;

        let err = BindingError::construction(UpdaterError::invalid("missing project"));
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("Invalid: missing project"));
    }
}
