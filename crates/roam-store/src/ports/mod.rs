//! Ports Layer
//!
//! Driven ports: the settings store this crate resolves paths against. The
//! store itself (persistence, sync transport) lives outside the core.

pub mod store;

pub use store::{
    ContainerLocation, ContainerRef, SettingValue, SettingsContainer, SettingsStore, StoreChanged,
};
