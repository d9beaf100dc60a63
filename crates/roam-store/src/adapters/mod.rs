//! Adapters Layer
//!
//! Implementations of the settings store port.

pub mod memory;

pub use memory::InMemorySettingsStore;
