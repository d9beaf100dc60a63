//! In-memory settings store
//!
//! Reference implementation of [`SettingsStore`]. Each container guards its
//! own values and children with separate `parking_lot` locks, so writers of
//! unrelated containers never contend. Byte usage is tracked per scope so the
//! roaming quota can be enforced.
//!
//! Local writes never fire the change signal. Only [`InMemorySettingsStore::apply_remote`]
//! and [`InMemorySettingsStore::notify_changed`] do, standing in for the
//! external sync agent.

use crate::domain::{Scope, StoreLimits};
use crate::error::StoreError;
use crate::ports::{
    ContainerLocation, ContainerRef, SettingValue, SettingsContainer, SettingsStore, StoreChanged,
};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Serialized bytes charged against a scope for one entry.
fn entry_size(key: &str, value: &SettingValue) -> usize {
    key.len() + value.to_string().len()
}

/// Byte accounting for one scope.
#[derive(Debug)]
struct ScopeUsage {
    quota: Option<usize>,
    used: AtomicUsize,
}

impl ScopeUsage {
    fn new(quota: Option<usize>) -> Self {
        Self {
            quota,
            used: AtomicUsize::new(0),
        }
    }

    /// Swap `released` bytes for `added` bytes. Fails with the current usage
    /// when growth would cross the quota; shrinking always succeeds.
    fn replace(&self, released: usize, added: usize) -> Result<(), usize> {
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                let next = used.saturating_sub(released) + added;
                match self.quota {
                    Some(quota) if next > quota && added > released => None,
                    _ => Some(next),
                }
            })
            .map(|_| ())
    }

    fn release(&self, bytes: usize) {
        let _ = self.replace(bytes, 0);
    }

    fn used(&self) -> usize {
        self.used.load(Ordering::Acquire)
    }
}

struct MemoryContainer {
    location: ContainerLocation,
    limits: Arc<StoreLimits>,
    usage: Arc<ScopeUsage>,
    values: RwLock<BTreeMap<String, SettingValue>>,
    children: RwLock<BTreeMap<String, Arc<MemoryContainer>>>,
    /// Set once the container is deleted from its parent. Handles resolved
    /// earlier can still read, but writes are refused.
    detached: AtomicBool,
}

impl MemoryContainer {
    fn new(location: ContainerLocation, limits: Arc<StoreLimits>, usage: Arc<ScopeUsage>) -> Self {
        Self {
            location,
            limits,
            usage,
            values: RwLock::new(BTreeMap::new()),
            children: RwLock::new(BTreeMap::new()),
            detached: AtomicBool::new(false),
        }
    }

    /// Mark this container and everything below it as deleted. Returns the
    /// bytes they were charged.
    ///
    /// The flag is set under each lock that writers check it under, so no
    /// write can be charged after its bytes were counted here.
    fn detach(&self) -> usize {
        let own: usize = {
            let values = self.values.write();
            self.detached.store(true, Ordering::Release);
            values
                .iter()
                .map(|(key, value)| entry_size(key, value))
                .sum()
        };
        let children = self.children.write();
        let below: usize = children.values().map(|child| child.detach()).sum();
        own + below
    }

    fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    fn deleted_error(&self, key: &str) -> StoreError {
        StoreError::write_failed(key, format!("container {} was deleted", self.location))
    }
}

impl SettingsContainer for MemoryContainer {
    fn location(&self) -> &ContainerLocation {
        &self.location
    }

    fn child(&self, name: &str) -> Option<ContainerRef> {
        self.children
            .read()
            .get(name)
            .map(|child| child.clone() as ContainerRef)
    }

    fn create_child(&self, name: &str) -> Result<ContainerRef, StoreError> {
        let mut children = self.children.write();
        if self.is_detached() {
            return Err(self.deleted_error(name));
        }
        if let Some(existing) = children.get(name) {
            return Ok(existing.clone());
        }

        let location = self.location.child(name);
        if location.depth() > self.limits.max_container_depth {
            return Err(StoreError::invalid_path(
                location.to_string(),
                format!(
                    "container nesting exceeds {} levels",
                    self.limits.max_container_depth
                ),
            ));
        }

        let child = Arc::new(MemoryContainer::new(
            location,
            self.limits.clone(),
            self.usage.clone(),
        ));
        children.insert(name.to_string(), child.clone());
        Ok(child)
    }

    fn delete_child(&self, name: &str) -> bool {
        let removed = self.children.write().remove(name);
        match removed {
            Some(child) => {
                self.usage.release(child.detach());
                true
            }
            None => false,
        }
    }

    fn child_names(&self) -> Vec<String> {
        self.children.read().keys().cloned().collect()
    }

    fn value(&self, key: &str) -> Option<SettingValue> {
        self.values.read().get(key).cloned()
    }

    fn set_value(&self, key: &str, value: SettingValue) -> Result<(), StoreError> {
        let value_bytes = value.to_string().len();
        if value_bytes > self.limits.max_value_bytes {
            return Err(StoreError::write_failed(
                key,
                format!(
                    "value is {value_bytes} bytes, limit is {}",
                    self.limits.max_value_bytes
                ),
            ));
        }

        let added = key.len() + value_bytes;
        let mut values = self.values.write();
        if self.is_detached() {
            return Err(self.deleted_error(key));
        }
        let released = values
            .get(key)
            .map(|old| entry_size(key, old))
            .unwrap_or(0);

        self.usage.replace(released, added).map_err(|used| {
            StoreError::write_failed(
                key,
                format!(
                    "{} quota of {} bytes exceeded ({used} bytes in use)",
                    self.location.scope,
                    self.usage.quota.unwrap_or_default()
                ),
            )
        })?;

        values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove_value(&self, key: &str) -> Option<SettingValue> {
        let mut values = self.values.write();
        let removed = values.remove(key);
        // A detached container's bytes were already released with it
        if let Some(old) = removed.as_ref().filter(|_| !self.is_detached()) {
            self.usage.release(entry_size(key, old));
        }
        removed
    }

    fn value_keys(&self) -> Vec<String> {
        self.values.read().keys().cloned().collect()
    }
}

/// In-memory [`SettingsStore`] with enforced [`StoreLimits`].
pub struct InMemorySettingsStore {
    local: Arc<MemoryContainer>,
    roaming: Arc<MemoryContainer>,
    changes: broadcast::Sender<StoreChanged>,
    limits: Arc<StoreLimits>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::with_limits(StoreLimits::default())
    }

    pub fn with_limits(limits: StoreLimits) -> Self {
        let limits = Arc::new(limits);
        let (changes, _) = broadcast::channel(limits.change_channel_capacity.max(1));

        let root = |scope: Scope| {
            Arc::new(MemoryContainer::new(
                ContainerLocation::root(scope),
                limits.clone(),
                Arc::new(ScopeUsage::new(limits.quota_for(scope))),
            ))
        };

        let local = root(Scope::Local);
        let roaming = root(Scope::Roaming);

        Self {
            local,
            roaming,
            changes,
            limits,
        }
    }

    pub fn limits(&self) -> &StoreLimits {
        &self.limits
    }

    /// Bytes currently charged against `scope`.
    pub fn usage(&self, scope: Scope) -> usize {
        self.scope_root(scope).usage.used()
    }

    /// Fire the change signal. Returns how many subscribers received it.
    pub fn notify_changed(&self) -> usize {
        match self.changes.send(StoreChanged) {
            Ok(receivers) => {
                debug!(receivers, "Store change signalled");
                receivers
            }
            Err(_) => {
                debug!("Store change signalled with no subscribers");
                0
            }
        }
    }

    /// Apply an incoming sync to `scope`, then fire the change signal.
    ///
    /// The signal is only fired when `apply` succeeds.
    pub fn apply_remote<F>(&self, scope: Scope, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&ContainerRef) -> Result<(), StoreError>,
    {
        let root = self.root(scope);
        apply(&root)?;
        self.notify_changed();
        Ok(())
    }

    fn scope_root(&self, scope: Scope) -> &Arc<MemoryContainer> {
        match scope {
            Scope::Local => &self.local,
            Scope::Roaming => &self.roaming,
        }
    }
}

impl Default for InMemorySettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn root(&self, scope: Scope) -> ContainerRef {
        self.scope_root(scope).clone()
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<StoreChanged> {
        self.changes.subscribe()
    }
}
