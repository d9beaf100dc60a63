//! # Property Owner
//!
//! The per-instance unit: embed a [`PropertyOwner`] in a view model (or any
//! object) to give it store-backed properties and change notifications.
//!
//! ## Accessors
//!
//! | Accessor               | Resolve mode      | Registry          | Local notify |
//! |------------------------|-------------------|-------------------|--------------|
//! | `get_roamed_property`  | open              | track + record    | no           |
//! | `set_roamed_property`  | create if missing | track + record    | yes          |
//! | `get_local_property`   | open              | untouched         | no           |
//! | `set_local_property`   | create if missing | untouched         | yes          |
//!
//! The property name used for notifications is the setting path's leaf key:
//! `"Group.Sub.UsersImage"` notifies `UsersImage`.
//!
//! Dropping the owner is all it takes to leave the registry; the next sweep
//! discards its entry.

use crate::notify::{PropertyChanged, PropertyFilter, PropertyNotifier, SubscriptionId};
use crate::registry::RoamingParticipant;
use crate::service::RoamingService;
use indexmap::IndexSet;
use parking_lot::Mutex;
use roam_store::{ResolveMode, Scope, SettingPath, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::trace;
use uuid::Uuid;

/// State shared between an owner and its weak registry entry.
struct OwnerState {
    id: Uuid,
    tracked: AtomicBool,
    accessed: Mutex<IndexSet<String>>,
    notifier: PropertyNotifier,
}

impl OwnerState {
    fn record_access(&self, property: &str) {
        let mut accessed = self.accessed.lock();
        if !accessed.contains(property) {
            accessed.insert(property.to_string());
        }
    }
}

impl RoamingParticipant for OwnerState {
    fn participant_id(&self) -> Uuid {
        self.id
    }

    fn tracking_flag(&self) -> &AtomicBool {
        &self.tracked
    }

    fn accessed_properties(&self) -> Vec<String> {
        self.accessed.lock().iter().cloned().collect()
    }

    fn raise_property_changed(&self, property: &str) {
        self.notifier.notify(property);
    }
}

/// Store-backed properties plus change notifications for one object.
pub struct PropertyOwner {
    state: Arc<OwnerState>,
    service: RoamingService,
}

impl PropertyOwner {
    pub(crate) fn new(service: RoamingService) -> Self {
        let id = Uuid::new_v4();
        Self {
            state: Arc::new(OwnerState {
                id,
                tracked: AtomicBool::new(false),
                accessed: Mutex::new(IndexSet::new()),
                notifier: PropertyNotifier::new(id),
            }),
            service,
        }
    }

    pub fn id(&self) -> Uuid {
        self.state.id
    }

    /// Read a roamed property, or its type's default if it was never set or
    /// holds an incompatible value.
    ///
    /// Any valid path registers this owner for remote-change notifications,
    /// including paths that resolve to nothing yet.
    pub fn get_roamed_property<T>(&self, path: &str) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Default,
    {
        self.read(path, Scope::Roaming)
    }

    /// Write a roamed property and notify local subscribers immediately.
    pub fn set_roamed_property<T>(&self, path: &str, value: T) -> Result<(), StoreError>
    where
        T: Serialize,
    {
        self.write(path, Scope::Roaming, &value)
    }

    /// Read a local-scope property. Never touches the registry.
    pub fn get_local_property<T>(&self, path: &str) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Default,
    {
        self.read(path, Scope::Local)
    }

    /// Write a local-scope property and notify local subscribers. Never
    /// touches the registry.
    pub fn set_local_property<T>(&self, path: &str, value: T) -> Result<(), StoreError>
    where
        T: Serialize,
    {
        self.write(path, Scope::Local, &value)
    }

    /// Assign a plain backing field, notifying only if the value changed.
    ///
    /// Returns whether the field was updated.
    pub fn set_field<T>(&self, storage: &mut T, value: T, property: &str) -> bool
    where
        T: PartialEq,
    {
        if *storage == value {
            return false;
        }
        *storage = value;
        self.notify(property);
        true
    }

    pub fn subscribe<F>(&self, filter: PropertyFilter, callback: F) -> SubscriptionId
    where
        F: Fn(&PropertyChanged) + Send + Sync + 'static,
    {
        self.state.notifier.subscribe(filter, callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.state.notifier.unsubscribe(id)
    }

    /// Raise a property-changed notification on the calling thread.
    pub fn notify(&self, property: &str) -> usize {
        self.state.notifier.notify(property)
    }

    /// Whether this owner has entered the registry.
    pub fn is_tracked(&self) -> bool {
        self.state.tracked.load(Ordering::Acquire)
    }

    /// Roamed property names accessed so far, in first-access order.
    pub fn accessed_properties(&self) -> Vec<String> {
        self.state.accessed_properties()
    }

    fn read<T>(&self, raw: &str, scope: Scope) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Default,
    {
        let path = SettingPath::parse(raw)?;
        let resolved = self
            .service
            .resolver()
            .resolve(&path, scope, ResolveMode::Open)?;
        let value = self.service.properties().get(resolved.as_ref());

        if scope.is_roaming() {
            self.track(path.leaf_key());
        }
        trace!(owner_id = %self.state.id, path = %path, scope = %scope, "Property read");
        Ok(value)
    }

    fn write<T>(&self, raw: &str, scope: Scope, value: &T) -> Result<(), StoreError>
    where
        T: Serialize,
    {
        let path = SettingPath::parse(raw)?;
        let resolved = self.service.resolver().resolve_for_write(&path, scope)?;
        self.service.properties().set(&resolved, value)?;

        if scope.is_roaming() {
            self.track(path.leaf_key());
        }
        self.notify(path.leaf_key());
        Ok(())
    }

    fn track(&self, property: &str) {
        // Record before registering so the first sweep already sees the name
        self.state.record_access(property);
        self.service.registry().track_if_needed(&self.state);
    }
}

impl fmt::Debug for PropertyOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyOwner")
            .field("id", &self.state.id)
            .field("tracked", &self.is_tracked())
            .field("accessed", &self.accessed_properties())
            .finish()
    }
}
