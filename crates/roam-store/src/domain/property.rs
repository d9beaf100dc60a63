//! Typed property access at a resolved location
//!
//! ## Read Policy
//!
//! | Stored state                 | `get::<T>` returns | Reported as      |
//! |------------------------------|--------------------|------------------|
//! | container or key missing     | `T::default()`     | soft miss        |
//! | value decodes as `T`         | the value          | -                |
//! | value does not decode as `T` | `T::default()`     | `warn!` + metric |
//!
//! Another writer sharing the store may have written an incompatible shape,
//! so a mismatch never reaches the caller as an error.

use crate::domain::ResolvedSetting;
use crate::error::StoreError;
use crate::metrics::{StoreMetrics, StoreMetricsSnapshot};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::type_name;
use std::sync::Arc;
use tracing::{debug, warn};

/// Typed get/set over resolved settings.
#[derive(Clone, Default)]
pub struct PropertyStore {
    metrics: Arc<StoreMetrics>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(metrics: Arc<StoreMetrics>) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> StoreMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Read a value, degrading every failure to `T::default()`.
    ///
    /// `resolved` is `None` when resolution found no container.
    pub fn get<T>(&self, resolved: Option<&ResolvedSetting>) -> T
    where
        T: DeserializeOwned + Default,
    {
        match self.try_get(resolved) {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                warn!(error = %e, "Stored value has unexpected shape, using default");
                T::default()
            }
        }
    }

    /// Read a value, reporting a type mismatch instead of hiding it.
    ///
    /// `Ok(None)` is a soft miss.
    pub fn try_get<T>(&self, resolved: Option<&ResolvedSetting>) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        self.metrics.record_read();

        let Some(resolved) = resolved else {
            self.metrics.record_soft_miss();
            return Ok(None);
        };

        let Some(raw) = resolved.container().value(resolved.leaf_key()) else {
            self.metrics.record_soft_miss();
            return Ok(None);
        };

        match serde_json::from_value::<T>(raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                self.metrics.record_type_mismatch();
                Err(StoreError::TypeMismatch {
                    key: resolved.leaf_key().to_string(),
                    expected: type_name::<T>(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Write a value. Store rejections are returned as-is and not retried.
    pub fn set<T>(&self, resolved: &ResolvedSetting, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + ?Sized,
    {
        let key = resolved.leaf_key();

        let raw = serde_json::to_value(value).map_err(|e| {
            self.metrics.record_write_failure();
            StoreError::Serialization {
                key: key.to_string(),
                reason: e.to_string(),
            }
        })?;

        match resolved.container().set_value(key, raw) {
            Ok(()) => {
                self.metrics.record_write();
                debug!(container = %resolved.location(), key = key, "Setting written");
                Ok(())
            }
            Err(e) => {
                self.metrics.record_write_failure();
                warn!(container = %resolved.location(), key = key, error = %e, "Store rejected write");
                Err(e)
            }
        }
    }
}
