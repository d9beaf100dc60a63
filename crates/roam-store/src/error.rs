//! Error types for the settings store

use thiserror::Error;

/// Errors raised while resolving or accessing settings.
///
/// A missing container or value is not an error: resolution yields `None`
/// and typed reads fall back to the type's default.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Invalid setting path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Type mismatch for {key:?}: stored value is not a {expected} ({reason})")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        reason: String,
    },

    #[error("Store rejected write to {key:?}: {reason}")]
    StoreWriteFailed { key: String, reason: String },

    #[error("Serialization error for {key:?}: {reason}")]
    Serialization { key: String, reason: String },

    #[error("Invalid store limits: {0}")]
    InvalidLimits(String),
}

impl StoreError {
    pub(crate) fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn write_failed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StoreWriteFailed {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
