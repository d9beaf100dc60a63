//! Store limits and validation
//!
//! Defaults mirror the platform roaming-settings store the core was modelled
//! on: 8 KiB per value, 32 levels of container nesting and a 100 KiB roaming
//! quota.
//!
//! # Example
//!
//! ```ignore
//! use roam_store::StoreLimitsBuilder;
//!
//! let limits = StoreLimitsBuilder::new()
//!     .max_value_bytes(1024)
//!     .roaming_quota_bytes(Some(16 * 1024))
//!     .build()?;
//! ```

use crate::domain::Scope;
use crate::error::StoreError;
use serde::{Deserialize, Serialize};

/// Limits enforced by a settings store on writes and container creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreLimits {
    /// Largest serialized value accepted for a single key
    pub max_value_bytes: usize,
    /// Deepest container nesting below a scope root
    pub max_container_depth: usize,
    /// Total serialized bytes allowed under the roaming root (`None` = unlimited)
    pub roaming_quota_bytes: Option<usize>,
    /// Buffered change signals per subscriber before it lags
    pub change_channel_capacity: usize,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_value_bytes: 8 * 1024,
            max_container_depth: 32,
            roaming_quota_bytes: Some(100 * 1024),
            change_channel_capacity: 64,
        }
    }
}

impl StoreLimits {
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.max_value_bytes == 0 {
            return Err(StoreError::InvalidLimits(
                "max_value_bytes cannot be 0".to_string(),
            ));
        }
        if self.max_container_depth == 0 {
            return Err(StoreError::InvalidLimits(
                "max_container_depth cannot be 0".to_string(),
            ));
        }
        if self.change_channel_capacity == 0 {
            return Err(StoreError::InvalidLimits(
                "change_channel_capacity cannot be 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Quota for the given scope, if any. Local storage is never capped.
    pub fn quota_for(&self, scope: Scope) -> Option<usize> {
        match scope {
            Scope::Local => None,
            Scope::Roaming => self.roaming_quota_bytes,
        }
    }
}

/// Builder for [`StoreLimits`] with validation.
#[derive(Default)]
pub struct StoreLimitsBuilder {
    max_value_bytes: Option<usize>,
    max_container_depth: Option<usize>,
    roaming_quota_bytes: Option<Option<usize>>,
    change_channel_capacity: Option<usize>,
}

impl StoreLimitsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_value_bytes(mut self, bytes: usize) -> Self {
        self.max_value_bytes = Some(bytes);
        self
    }

    pub fn max_container_depth(mut self, depth: usize) -> Self {
        self.max_container_depth = Some(depth);
        self
    }

    /// Set the roaming quota; `None` removes it.
    pub fn roaming_quota_bytes(mut self, bytes: Option<usize>) -> Self {
        self.roaming_quota_bytes = Some(bytes);
        self
    }

    pub fn change_channel_capacity(mut self, capacity: usize) -> Self {
        self.change_channel_capacity = Some(capacity);
        self
    }

    pub fn build(self) -> Result<StoreLimits, StoreError> {
        let defaults = StoreLimits::default();

        let limits = StoreLimits {
            max_value_bytes: self.max_value_bytes.unwrap_or(defaults.max_value_bytes),
            max_container_depth: self
                .max_container_depth
                .unwrap_or(defaults.max_container_depth),
            roaming_quota_bytes: self
                .roaming_quota_bytes
                .unwrap_or(defaults.roaming_quota_bytes),
            change_channel_capacity: self
                .change_channel_capacity
                .unwrap_or(defaults.change_channel_capacity),
        };

        limits.validate()?;
        Ok(limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let limits = StoreLimits::default();
        assert!(limits.validate().is_ok());
        assert_eq!(limits.max_value_bytes, 8192);
        assert_eq!(limits.roaming_quota_bytes, Some(102_400));
    }

    #[test]
    fn test_builder_overrides() {
        let limits = StoreLimitsBuilder::new()
            .max_value_bytes(16)
            .roaming_quota_bytes(None)
            .build()
            .unwrap();
        assert_eq!(limits.max_value_bytes, 16);
        assert_eq!(limits.roaming_quota_bytes, None);
        assert_eq!(limits.max_container_depth, 32);
    }

    #[test]
    fn test_builder_rejects_zero_sizes() {
        let result = StoreLimitsBuilder::new().max_value_bytes(0).build();
        assert!(matches!(result, Err(StoreError::InvalidLimits(_))));

        let result = StoreLimitsBuilder::new().change_channel_capacity(0).build();
        assert!(matches!(result, Err(StoreError::InvalidLimits(_))));
    }

    #[test]
    fn test_quota_only_applies_to_roaming() {
        let limits = StoreLimits::default();
        assert_eq!(limits.quota_for(Scope::Local), None);
        assert_eq!(limits.quota_for(Scope::Roaming), Some(102_400));
    }
}
