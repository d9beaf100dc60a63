//! # Change Propagator
//!
//! Turns the store's payload-less change signal into property-changed
//! notifications on each live owner's captured context.
//!
//! ## Flow
//!
//! ```text
//! [sync agent] ──StoreChanged──► ChangePropagator::on_external_store_changed
//!                                   │
//!                                   ├─ registry.sweep_live_objects()
//!                                   │
//!                                   └─ for each live owner:
//!                                        post(context, notify X, Y, ...)
//!                                                 │
//!                                                 ▼
//!                                     owner's dispatcher / runtime
//! ```
//!
//! All of one owner's names go out in a single posted task, in first-access
//! order. The task holds only a weak handle, so an owner dropped between the
//! sweep and delivery is not kept alive and simply gets nothing.

use crate::registry::RegistryHandle;
use roam_store::StoreChanged;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Propagation settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationConfig {
    /// Log a warning when a single sweep finds more live owners than this
    pub large_sweep_warning: usize,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            large_sweep_warning: 10_000,
        }
    }
}

/// Summary of one propagation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropagationReport {
    /// Owners still reachable
    pub live: usize,
    /// Registry entries whose owner was gone
    pub collected: usize,
    /// Property notifications handed to contexts
    pub notifications: usize,
    /// Owners whose context refused the post
    pub contexts_gone: usize,
}

/// Reacts to store-changed signals by redelivering notifications.
pub struct ChangePropagator {
    registry: RegistryHandle,
    config: PropagationConfig,
    sweeps: AtomicU64,
}

impl ChangePropagator {
    pub fn new(registry: RegistryHandle) -> Self {
        Self::with_config(registry, PropagationConfig::default())
    }

    pub fn with_config(registry: RegistryHandle, config: PropagationConfig) -> Self {
        Self {
            registry,
            config,
            sweeps: AtomicU64::new(0),
        }
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    /// Number of propagation passes run so far.
    pub fn sweeps(&self) -> u64 {
        self.sweeps.load(Ordering::Relaxed)
    }

    /// Sweep the registry and post notifications to every live owner.
    ///
    /// Safe to call from any thread. A context that refuses work only costs
    /// that owner its notifications.
    pub fn on_external_store_changed(&self) -> PropagationReport {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        let scheduler = self.registry.scheduler().clone();
        let outcome = self.registry.sweep_live_objects();

        let mut report = PropagationReport {
            live: outcome.live.len(),
            collected: outcome.collected,
            ..Default::default()
        };

        if report.live > self.config.large_sweep_warning {
            warn!(live = report.live, "Unusually many live roamed-property owners");
        }

        for live in outcome.live {
            let names = live.participant.accessed_properties();
            if names.is_empty() {
                continue;
            }

            let owner = Arc::downgrade(&live.participant);
            let count = names.len();
            let task = Box::new(move || {
                if let Some(owner) = owner.upgrade() {
                    for name in &names {
                        owner.raise_property_changed(name);
                    }
                }
            });

            match scheduler.post(live.entry.context(), task) {
                Ok(()) => report.notifications += count,
                Err(e) => {
                    debug!(owner_id = %live.entry.id(), error = %e, "Dropping notifications for owner");
                    report.contexts_gone += 1;
                }
            }
        }

        debug!(
            live = report.live,
            collected = report.collected,
            notifications = report.notifications,
            contexts_gone = report.contexts_gone,
            "Store change propagated"
        );
        report
    }

    /// Propagate every signal from `changes` until the channel closes.
    ///
    /// This should be spawned as a background task. A lagged receiver means
    /// signals were coalesced; one sweep covers all of them.
    pub async fn run(self: Arc<Self>, mut changes: broadcast::Receiver<StoreChanged>) {
        info!("[ChangePropagator] Started listening for store changes");

        loop {
            match changes.recv().await {
                Ok(StoreChanged) => {
                    self.on_external_store_changed();
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Change signals coalesced");
                    self.on_external_store_changed();
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("[ChangePropagator] Change channel closed, shutting down");
                    break;
                }
            }
        }
    }
}
