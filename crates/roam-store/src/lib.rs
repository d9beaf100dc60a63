//! # roam-store
//!
//! Scope-rooted hierarchical settings store for the roamed-property core.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `Scope`, `SettingPath`, `StoreLimits`
//!   - `ScopedContainerResolver`: dotted path + scope -> (container, leaf key)
//!   - `PropertyStore`: typed get/set with default-on-miss
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `SettingsStore`: scope roots plus the out-of-band change channel
//!   - `SettingsContainer`: one node of the hierarchy
//!
//! - **Adapters Layer** (`adapters/`): Store implementations
//!   - `InMemorySettingsStore`: reference store with limits and a simulated
//!     remote sync
//!
//! ## Path Resolution
//!
//! ```text
//! "Group.Sub.UsersImage"  (Roaming)
//!
//!   roaming:/ ──► Group ──► Sub        leaf key: UsersImage
//!   (root)        (child)   (child)
//! ```
//!
//! Reads never create containers. Writes create every missing container on
//! the walk.
//!
//! ## Usage Example
//!
//! ```ignore
//! use roam_store::{InMemorySettingsStore, PropertyStore, ResolveMode, Scope,
//!     ScopedContainerResolver, SettingPath};
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemorySettingsStore::new());
//! let resolver = ScopedContainerResolver::new(store.clone());
//! let properties = PropertyStore::new();
//!
//! let path = SettingPath::parse("Group.Sub.Volume")?;
//! let slot = resolver.resolve_for_write(&path, Scope::Roaming)?;
//! properties.set(&slot, &11)?;
//!
//! let found = resolver.resolve(&path, Scope::Roaming, ResolveMode::Open)?;
//! let volume: i32 = properties.get(found.as_ref());
//! assert_eq!(volume, 11);
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;

// Re-export main types
pub use adapters::InMemorySettingsStore;
pub use domain::{
    PropertyStore, ResolveMode, ResolvedSetting, Scope, ScopedContainerResolver, SettingPath,
    StoreLimits, StoreLimitsBuilder,
};
pub use error::StoreError;
pub use metrics::{StoreMetrics, StoreMetricsSnapshot};
pub use ports::{
    ContainerLocation, ContainerRef, SettingValue, SettingsContainer, SettingsStore, StoreChanged,
};
