//! # Property-Changed Notifications
//!
//! Per-owner subscription list. Subscribers pick a single property or all of
//! them; [`PropertyNotifier::notify`] invokes every matching callback on the
//! calling thread. Propagation only ever calls `notify`; it never looks at
//! who is subscribed.

use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// A property on an owner changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyChanged {
    /// Owner whose property changed
    pub owner_id: Uuid,
    /// Property name (the setting path's leaf key for roamed properties)
    pub property: String,
}

/// Which notifications a subscriber receives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyFilter {
    All,
    Named(String),
}

impl PropertyFilter {
    pub fn named(property: impl Into<String>) -> Self {
        Self::Named(property.into())
    }

    pub fn matches(&self, property: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => name == property,
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

pub type PropertyCallback = Arc<dyn Fn(&PropertyChanged) + Send + Sync>;

struct Subscriber {
    id: SubscriptionId,
    filter: PropertyFilter,
    callback: PropertyCallback,
}

/// Subscription list for one owner.
pub struct PropertyNotifier {
    owner_id: Uuid,
    next_id: AtomicU64,
    subscribers: RwLock<Vec<Subscriber>>,
}

impl PropertyNotifier {
    pub fn new(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            next_id: AtomicU64::new(1),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    pub fn subscribe<F>(&self, filter: PropertyFilter, callback: F) -> SubscriptionId
    where
        F: Fn(&PropertyChanged) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push(Subscriber {
            id,
            filter,
            callback: Arc::new(callback),
        });
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        subscribers.len() != before
    }

    /// Invoke matching callbacks. Returns how many ran.
    ///
    /// Callbacks run without the subscriber lock held, so they may subscribe,
    /// unsubscribe or notify again.
    pub fn notify(&self, property: &str) -> usize {
        let callbacks: Vec<PropertyCallback> = self
            .subscribers
            .read()
            .iter()
            .filter(|s| s.filter.matches(property))
            .map(|s| s.callback.clone())
            .collect();

        if callbacks.is_empty() {
            return 0;
        }

        let event = PropertyChanged {
            owner_id: self.owner_id,
            property: property.to_string(),
        };
        for callback in &callbacks {
            callback(&event);
        }
        callbacks.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl fmt::Debug for PropertyNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyNotifier")
            .field("owner_id", &self.owner_id)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
