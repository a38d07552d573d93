//! Error types for the cashbook ledger.

use crate::models::MovementId;

/// All errors that can occur when recording or persisting movements.
///
/// Read-side aggregation never produces these: every view is total over
/// well-typed input. Errors only arise at the creation/edit boundary and
/// in storage backends.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A movement was rejected at creation or edit time.
    #[error("invalid movement: {field} {reason}")]
    InvalidRecord {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable explanation.
        reason: String,
    },

    /// The amount given at an entry point is NaN or infinite.
    #[error("amount must be a finite number, got {0}")]
    NonFiniteAmount(f64),

    /// No movement with the given identifier exists.
    #[error("movement not found: {0}")]
    NotFound(MovementId),

    /// A textual value could not be parsed into one of the closed enums.
    #[error("unknown {kind}: {value:?}")]
    UnknownValue {
        /// What was being parsed (e.g. "currency").
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage backend failed.
    #[error("storage error: {0}")]
    Storage(Box<dyn core::error::Error + Send + Sync>),
}

impl LedgerError {
    /// Shorthand for an [`LedgerError::InvalidRecord`] rejection.
    #[inline]
    pub(crate) fn invalid<R: Into<String>>(field: &'static str, reason: R) -> Self {
        Self::InvalidRecord {
            field,
            reason: reason.into(),
        }
    }

    /// Wraps a backend failure into [`LedgerError::Storage`].
    #[inline]
    pub(crate) fn storage<E: Into<Box<dyn core::error::Error + Send + Sync>>>(err: E) -> Self {
        Self::Storage(err.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, LedgerError>;
