//! # Roaming Service
//!
//! Wires one store to one registry and one propagator. Every
//! [`PropertyOwner`] created from the same service shares them.

use crate::owner::PropertyOwner;
use crate::propagator::{ChangePropagator, PropagationConfig, PropagationReport};
use crate::registry::{RegistryHandle, RoamedObjectRegistry};
use crate::scheduler::{CurrentContextScheduler, Scheduler};
use roam_store::{
    PropertyStore, ScopedContainerResolver, SettingsStore, StoreMetrics, StoreMetricsSnapshot,
};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

struct ServiceInner {
    store: Arc<dyn SettingsStore>,
    resolver: ScopedContainerResolver,
    properties: PropertyStore,
    registry: RegistryHandle,
    propagator: Arc<ChangePropagator>,
}

/// Shared entry point for roamed properties. Cheap to clone.
#[derive(Clone)]
pub struct RoamingService {
    inner: Arc<ServiceInner>,
}

impl RoamingService {
    /// Service with the default scheduler and propagation settings.
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self::builder(store).build()
    }

    pub fn builder(store: Arc<dyn SettingsStore>) -> RoamingServiceBuilder {
        RoamingServiceBuilder {
            store,
            scheduler: None,
            propagation: PropagationConfig::default(),
            metrics: None,
        }
    }

    /// A fresh owner bound to this service.
    pub fn owner(&self) -> PropertyOwner {
        PropertyOwner::new(self.clone())
    }

    pub fn store(&self) -> &Arc<dyn SettingsStore> {
        &self.inner.store
    }

    pub fn resolver(&self) -> &ScopedContainerResolver {
        &self.inner.resolver
    }

    pub fn properties(&self) -> &PropertyStore {
        &self.inner.properties
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.inner.registry
    }

    pub fn propagator(&self) -> &Arc<ChangePropagator> {
        &self.inner.propagator
    }

    pub fn store_metrics(&self) -> StoreMetricsSnapshot {
        self.inner.properties.metrics()
    }

    /// Run one propagation pass now, from the calling thread.
    pub fn on_external_store_changed(&self) -> PropagationReport {
        self.inner.propagator.on_external_store_changed()
    }

    /// Spawn the propagation loop on the current tokio runtime.
    ///
    /// Must be called from within a runtime. The task ends when the store
    /// drops its change channel; abort the handle to stop it earlier.
    pub fn spawn_propagation(&self) -> JoinHandle<()> {
        let changes = self.inner.store.subscribe_changes();
        info!("Spawning roamed-property propagation task");
        tokio::spawn(self.inner.propagator.clone().run(changes))
    }
}

impl fmt::Debug for RoamingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoamingService")
            .field("registry", &self.inner.registry)
            .field("sweeps", &self.inner.propagator.sweeps())
            .finish()
    }
}

/// Builder for [`RoamingService`].
pub struct RoamingServiceBuilder {
    store: Arc<dyn SettingsStore>,
    scheduler: Option<Arc<dyn Scheduler>>,
    propagation: PropagationConfig,
    metrics: Option<Arc<StoreMetrics>>,
}

impl RoamingServiceBuilder {
    /// Replace the context-capturing scheduler.
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn propagation(mut self, config: PropagationConfig) -> Self {
        self.propagation = config;
        self
    }

    /// Share a metrics sink with other property stores.
    pub fn metrics(mut self, metrics: Arc<StoreMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> RoamingService {
        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Arc::new(CurrentContextScheduler));
        let registry = RoamedObjectRegistry::new(scheduler).into_handle();
        let propagator = Arc::new(ChangePropagator::with_config(
            registry.clone(),
            self.propagation,
        ));
        let properties = match self.metrics {
            Some(metrics) => PropertyStore::with_metrics(metrics),
            None => PropertyStore::new(),
        };

        RoamingService {
            inner: Arc::new(ServiceInner {
                resolver: ScopedContainerResolver::new(self.store.clone()),
                store: self.store,
                properties,
                registry,
                propagator,
            }),
        }
    }
}
