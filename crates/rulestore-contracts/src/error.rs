//! Error types shared by every rulestore crate.
//!
//! All fallible operations return `RuleStoreResult<T>`. Storage backends
//! produce the transport-level variants; the adapter passes them through
//! without reclassifying them, so callers can match on the original kind.

use thiserror::Error;

/// The unified error type for rulestore.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleStoreError {
    /// The backend could not be reached, or the connection was already closed.
    #[error("storage unavailable: {reason}")]
    Unavailable { reason: String },

    /// The backend aborted a transaction, typically on contention.
    ///
    /// The adapter never retries; the caller decides whether to.
    #[error("transaction aborted: {reason}")]
    Aborted { reason: String },

    /// The caller's context cancelled the operation.
    #[error("operation cancelled: {reason}")]
    Cancelled { reason: String },

    /// The caller's deadline expired before the backend answered.
    #[error("deadline exceeded: {reason}")]
    DeadlineExceeded { reason: String },

    /// The backend refused the operation for this principal.
    #[error("permission denied: {reason}")]
    PermissionDenied { reason: String },

    /// A single document addressed by path does not exist.
    #[error("document not found: {path}")]
    NotFound { path: String },

    /// A create targeted a document id that is already taken.
    #[error("document already exists: {path}")]
    AlreadyExists { path: String },

    /// A stored document could not be mapped back into a record.
    #[error("failed to decode document: {reason}")]
    Decode { reason: String },

    /// A model definition failed validation and was not persisted.
    #[error("invalid model definition: {reason}")]
    InvalidModel { reason: String },

    /// A configuration value is missing, unreadable, or malformed.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

impl RuleStoreError {
    /// True for the variants that originate in the storage backend.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. }
                | Self::Aborted { .. }
                | Self::Cancelled { .. }
                | Self::DeadlineExceeded { .. }
                | Self::PermissionDenied { .. }
                | Self::NotFound { .. }
                | Self::AlreadyExists { .. }
        )
    }
}

/// Convenience alias used throughout the rulestore crates.
pub type RuleStoreResult<T> = Result<T, RuleStoreError>;
