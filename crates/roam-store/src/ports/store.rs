//! Settings store port (Driven Port)
//!
//! The store is an opaque hierarchy of containers rooted per [`Scope`]. Each
//! container holds leaf values and named child containers. An external sync
//! agent may rewrite the roaming hierarchy at any time and then fires the
//! payload-less change signal; consumers re-read to see what changed.

use crate::domain::Scope;
use crate::error::StoreError;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Opaque stored value. Typed access goes through serde.
pub type SettingValue = serde_json::Value;

/// Shared handle to a container node.
pub type ContainerRef = Arc<dyn SettingsContainer>;

/// Out-of-band "the store changed" signal. Carries no payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreChanged;

/// Position of a container: its scope and the names walked from the root.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContainerLocation {
    pub scope: Scope,
    pub segments: Vec<String>,
}

impl ContainerLocation {
    pub fn root(scope: Scope) -> Self {
        Self {
            scope,
            segments: Vec::new(),
        }
    }

    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self {
            scope: self.scope,
            segments,
        }
    }

    /// Nesting depth below the scope root (the root is 0).
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for ContainerLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:/{}", self.scope, self.segments.join("/"))
    }
}

/// One node of the settings hierarchy.
///
/// Implementations need per-container consistency only; nothing here is
/// atomic across keys or containers.
pub trait SettingsContainer: Send + Sync {
    fn location(&self) -> &ContainerLocation;

    /// Existing child container, if any. Never creates.
    fn child(&self, name: &str) -> Option<ContainerRef>;

    /// Existing child, or a newly created empty one.
    fn create_child(&self, name: &str) -> Result<ContainerRef, StoreError>;

    /// Remove a child container and everything below it.
    ///
    /// Handles to the removed containers stay readable, but writes through
    /// them fail with `StoreWriteFailed`.
    fn delete_child(&self, name: &str) -> bool;

    fn child_names(&self) -> Vec<String>;

    fn value(&self, key: &str) -> Option<SettingValue>;

    fn set_value(&self, key: &str, value: SettingValue) -> Result<(), StoreError>;

    fn remove_value(&self, key: &str) -> Option<SettingValue>;

    fn value_keys(&self) -> Vec<String>;
}

/// The settings store as seen by the core.
pub trait SettingsStore: Send + Sync {
    /// Root container of a scope. Roots always exist.
    fn root(&self, scope: Scope) -> ContainerRef;

    /// Subscribe to the external change signal.
    fn subscribe_changes(&self) -> broadcast::Receiver<StoreChanged>;
}
