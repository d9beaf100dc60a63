//! # roam-sync
//!
//! Keeps in-memory objects bound to roamed settings in step with changes that
//! arrive from another device.
//!
//! ## Architecture
//!
//! - `owner`: [`PropertyOwner`], the per-object accessor for roamed and local
//!   properties
//! - `registry`: [`RoamedObjectRegistry`], weak handles to every owner that has
//!   touched a roamed property
//! - `scheduler`: execution-context capture ([`Dispatcher`], tokio runtime,
//!   inline fallback)
//! - `propagator`: [`ChangePropagator`], reacts to the store's change signal
//! - `service`: [`RoamingService`], wires the pieces to one store
//!
//! ## Data Flow
//!
//! ```text
//! owner.get_roamed_property("Prefs.Theme")
//!     │
//!     ├─► resolver + property store ──► value or default
//!     └─► registry.track_if_needed(owner)   (first time only, captures context)
//!
//! store fires StoreChanged (remote sync)
//!     │
//!     └─► propagator sweeps registry ──► post to each owner's context
//!                                          └─► notify "Theme", ...
//! ```
//!
//! ## Usage Example
//!
//! ```ignore
//! use roam_store::InMemorySettingsStore;
//! use roam_sync::{PropertyFilter, RoamingService};
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemorySettingsStore::new());
//! let service = RoamingService::new(store.clone());
//! let _propagation = service.spawn_propagation();
//!
//! let owner = service.owner();
//! owner.subscribe(PropertyFilter::named("Theme"), |e| println!("{} changed", e.property));
//! owner.set_roamed_property("Prefs.Theme", "dark")?;
//! let theme: String = owner.get_roamed_property("Prefs.Theme")?;
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod error;
pub mod notify;
pub mod owner;
pub mod propagator;
pub mod registry;
pub mod scheduler;
pub mod service;

// Re-export main types
pub use error::SyncError;
pub use notify::{PropertyCallback, PropertyChanged, PropertyFilter, PropertyNotifier, SubscriptionId};
pub use owner::PropertyOwner;
pub use propagator::{ChangePropagator, PropagationConfig, PropagationReport};
pub use registry::{
    LiveTrackedObject, RegistryHandle, RoamedObjectRegistry, RoamingParticipant, SweepOutcome,
    TrackedObject,
};
pub use scheduler::{
    current_context, ContextGuard, ContextHandle, CurrentContextScheduler, Dispatcher, Scheduler,
    Task,
};
pub use service::{RoamingService, RoamingServiceBuilder};
