//! Observer registry for status changes.
//!
//! Listeners are kept in subscription order. Notification works on a
//! snapshot of the registry, so a listener may unsubscribe itself (or
//! others) mid-notification without affecting the current pass.

use super::NetworkStatus;
use crate::log;
use parking_lot::Mutex;
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Weak},
};

/// Status change callback.
pub type Listener = Arc<dyn Fn(&NetworkStatus) + Send + Sync>;

/// Stable token identifying one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub(crate) struct Registry {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

impl Registry {
    /// Register a listener. Registering the same callback twice returns the
    /// existing token.
    pub fn insert(&mut self, listener: Listener) -> SubscriptionId {
        if let Some((id, _)) = self
            .entries
            .iter()
            .find(|(_, existing)| Arc::ptr_eq(existing, &listener))
        {
            return *id;
        }

        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn snapshot(&self) -> Vec<Listener> {
        self.entries.iter().map(|(_, l)| Arc::clone(l)).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Call every listener in order. A panicking listener is logged and skipped.
pub(crate) fn notify_all(listeners: &[Listener], status: &NetworkStatus) {
    for listener in listeners {
        let result = panic::catch_unwind(AssertUnwindSafe(|| listener(status)));
        if let Err(payload) = result {
            log!("net"; "error in network status listener: {}", panic_message(&*payload));
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("listener panicked")
}

/// Handle returned by `subscribe`.
///
/// Dropping the handle does not unsubscribe; call [`Subscription::unsubscribe`].
#[must_use = "keep the handle to be able to unsubscribe later"]
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, registry: &Arc<Mutex<Registry>>) -> Self {
        Self {
            id,
            registry: Arc::downgrade(registry),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove the listener. Safe to call any number of times.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().remove(self.id);
        }
    }
}
