//! # Roamed Object Registry
//!
//! Holds weak handles to every owner that has touched a roamed property, so a
//! store-change signal can reach them without owners ever registering or
//! unregistering explicitly.
//!
//! ## Lifecycle
//!
//! ```text
//!   Untracked ──first roamed access──► Tracked
//!                                         │
//!                          owner dropped  │  (weak handle stops resolving)
//!                                         ▼
//!                                 discarded by next sweep
//! ```
//!
//! There is no `Tracked -> Untracked` transition. The "already tracked" flag
//! lives on the owner, so registration never scans the queue.
//!
//! ## Sweep
//!
//! `sweep_live_objects` drains the queue under its lock, resolves the handles
//! with the lock released, then puts the live ones back. Registrations that
//! land while a sweep is resolving go into the fresh queue and are seen by the
//! next sweep. Sweeps are serialized by a separate gate.

use crate::scheduler::{ContextHandle, Scheduler};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;
use uuid::Uuid;

/// Something the registry can track and the propagator can notify.
pub trait RoamingParticipant: Send + Sync {
    fn participant_id(&self) -> Uuid;

    /// Set once the participant has been enqueued. Never cleared.
    fn tracking_flag(&self) -> &AtomicBool;

    /// Roamed property names accessed so far, in first-access order.
    fn accessed_properties(&self) -> Vec<String>;

    fn raise_property_changed(&self, property: &str);
}

/// A registry entry: weak handle plus the context captured at registration.
#[derive(Clone)]
pub struct TrackedObject {
    id: Uuid,
    participant: Weak<dyn RoamingParticipant>,
    context: ContextHandle,
}

impl TrackedObject {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn context(&self) -> &ContextHandle {
        &self.context
    }

    pub fn upgrade(&self) -> Option<Arc<dyn RoamingParticipant>> {
        self.participant.upgrade()
    }

    pub fn is_alive(&self) -> bool {
        self.participant.strong_count() > 0
    }
}

impl fmt::Debug for TrackedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedObject")
            .field("id", &self.id)
            .field("context", &self.context)
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// A tracked object whose owner was still reachable during a sweep.
pub struct LiveTrackedObject {
    pub entry: TrackedObject,
    pub participant: Arc<dyn RoamingParticipant>,
}

/// Result of one drain-and-requeue pass.
pub struct SweepOutcome {
    pub live: Vec<LiveTrackedObject>,
    pub collected: usize,
}

/// Process-wide registry of roamed-property owners.
pub struct RoamedObjectRegistry {
    scheduler: Arc<dyn Scheduler>,
    entries: Mutex<Vec<TrackedObject>>,
    sweep_gate: Mutex<()>,
}

/// Shared handle to the registry, created once and passed to every owner.
pub type RegistryHandle = Arc<RoamedObjectRegistry>;

impl RoamedObjectRegistry {
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            entries: Mutex::new(Vec::new()),
            sweep_gate: Mutex::new(()),
        }
    }

    pub fn into_handle(self) -> RegistryHandle {
        Arc::new(self)
    }

    pub fn scheduler(&self) -> &Arc<dyn Scheduler> {
        &self.scheduler
    }

    /// Enqueue `participant` unless it is already tracked.
    ///
    /// Captures the calling thread's context on the first call only. Returns
    /// whether this call did the registration.
    pub fn track_if_needed<P>(&self, participant: &Arc<P>) -> bool
    where
        P: RoamingParticipant + 'static,
    {
        if participant
            .tracking_flag()
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let context = self.scheduler.capture_current();
        let as_dyn: Arc<dyn RoamingParticipant> = participant.clone();
        let entry = TrackedObject {
            id: participant.participant_id(),
            participant: Arc::downgrade(&as_dyn),
            context,
        };

        debug!(owner_id = %entry.id, context = %entry.context, "Tracking roamed-property owner");
        self.entries.lock().push(entry);
        true
    }

    /// Drain, drop dead handles, requeue live ones, and return the live ones.
    pub fn sweep_live_objects(&self) -> SweepOutcome {
        let _sweeping = self.sweep_gate.lock();

        let drained = std::mem::take(&mut *self.entries.lock());
        let total = drained.len();

        let mut keep = Vec::with_capacity(total);
        let mut live = Vec::with_capacity(total);
        for entry in drained {
            if let Some(participant) = entry.upgrade() {
                keep.push(entry.clone());
                live.push(LiveTrackedObject { entry, participant });
            }
        }

        let collected = total - live.len();
        self.entries.lock().extend(keep);

        debug!(live = live.len(), collected, "Registry sweep complete");
        SweepOutcome { live, collected }
    }

    /// Entries currently queued, live or not.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl fmt::Debug for RoamedObjectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoamedObjectRegistry")
            .field("entries", &self.len())
            .finish()
    }
}
