//! Scoped container resolution
//!
//! Maps a [`SettingPath`] under a [`Scope`] to the container that holds its
//! leaf value. Read paths use [`ResolveMode::Open`] and never create
//! anything; write paths use [`ResolveMode::CreateIfMissing`].

use crate::domain::{Scope, SettingPath};
use crate::error::StoreError;
use crate::ports::{ContainerLocation, ContainerRef, SettingsStore};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// How to treat a missing container on the walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveMode {
    /// Stop and report "not found".
    Open,
    /// Create it and keep walking.
    CreateIfMissing,
}

/// A resolved setting: the innermost container and the leaf key inside it.
#[derive(Clone)]
pub struct ResolvedSetting {
    container: ContainerRef,
    leaf_key: String,
}

impl ResolvedSetting {
    pub fn new(container: ContainerRef, leaf_key: impl Into<String>) -> Self {
        Self {
            container,
            leaf_key: leaf_key.into(),
        }
    }

    pub fn container(&self) -> &ContainerRef {
        &self.container
    }

    pub fn leaf_key(&self) -> &str {
        &self.leaf_key
    }

    pub fn location(&self) -> &ContainerLocation {
        self.container.location()
    }
}

impl PartialEq for ResolvedSetting {
    fn eq(&self, other: &Self) -> bool {
        self.leaf_key == other.leaf_key && self.location() == other.location()
    }
}

impl Eq for ResolvedSetting {}

impl fmt::Debug for ResolvedSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedSetting")
            .field("container", self.location())
            .field("leaf_key", &self.leaf_key)
            .finish()
    }
}

/// Resolves dotted paths against a settings store.
#[derive(Clone)]
pub struct ScopedContainerResolver {
    store: Arc<dyn SettingsStore>,
}

impl ScopedContainerResolver {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn SettingsStore> {
        &self.store
    }

    /// Walk `path`'s containers from the scope root.
    ///
    /// Returns `Ok(None)` when a container is missing in [`ResolveMode::Open`].
    /// Errors only come from the store refusing to create a container.
    pub fn resolve(
        &self,
        path: &SettingPath,
        scope: Scope,
        mode: ResolveMode,
    ) -> Result<Option<ResolvedSetting>, StoreError> {
        if mode == ResolveMode::CreateIfMissing {
            return self.resolve_for_write(path, scope).map(Some);
        }

        let mut container = self.store.root(scope);
        for name in path.containers() {
            container = match container.child(name) {
                Some(child) => child,
                None => {
                    trace!(path = %path, scope = %scope, missing = %name, "Container not found");
                    return Ok(None);
                }
            };
        }

        Ok(Some(ResolvedSetting::new(container, path.leaf_key())))
    }

    /// Walk `path`'s containers, creating any that are missing.
    pub fn resolve_for_write(
        &self,
        path: &SettingPath,
        scope: Scope,
    ) -> Result<ResolvedSetting, StoreError> {
        let mut container = self.store.root(scope);
        for name in path.containers() {
            container = match container.child(name) {
                Some(child) => child,
                None => {
                    trace!(path = %path, scope = %scope, container = %name, "Creating container");
                    container.create_child(name)?
                }
            };
        }

        Ok(ResolvedSetting::new(container, path.leaf_key()))
    }

    /// Parse `raw` and resolve it. Malformed paths fail with `InvalidPath`.
    pub fn resolve_str(
        &self,
        raw: &str,
        scope: Scope,
        mode: ResolveMode,
    ) -> Result<Option<ResolvedSetting>, StoreError> {
        let path = SettingPath::parse(raw)?;
        self.resolve(&path, scope, mode)
    }
}
