//! Error types for change propagation
//!
//! Accessors on [`crate::PropertyOwner`] return [`roam_store::StoreError`]
//! directly; this enum only covers delivery to captured contexts.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The captured execution context no longer accepts work.
    #[error("Execution context {context} is gone")]
    ContextGone { context: String },
}
