use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::broker::queue::SubscriberQueue;

/// Stable handle for a registered subscriber.
///
/// Entries are looked up by this handle only, never by comparing queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscriber-{}", self.0)
    }
}

/// The set of subscriber queues that currently receive published messages.
///
/// One mutex guards the whole map: `register`, `unregister` and a full
/// `for_each` pass exclude each other.
#[derive(Debug, Default)]
pub struct Registry {
    subscribers: Mutex<HashMap<SubscriberId, Arc<SubscriberQueue>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `queue` and returns the handle used to remove it later.
    pub fn register(&self, queue: Arc<SubscriberQueue>) -> SubscriberId {
        let id = SubscriberId::new();
        self.lock().insert(id, queue);
        id
    }

    /// Removes the entry for `id`. Returns `false` if it was already gone.
    pub fn unregister(&self, id: &SubscriberId) -> bool {
        self.lock().remove(id).is_some()
    }

    /// Calls `f` for every registered queue while holding the lock.
    ///
    /// `f` must not block: every register and unregister waits for it.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&SubscriberId, &SubscriberQueue),
    {
        let subscribers = self.lock();
        for (id, queue) in subscribers.iter() {
            f(id, queue);
        }
    }

    pub fn contains(&self, id: &SubscriberId) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Critical sections only touch in-memory state, so a poisoned map is
    // still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<SubscriberId, Arc<SubscriberQueue>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
