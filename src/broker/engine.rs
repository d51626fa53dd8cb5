//! Broker engine
//!
//! Fans each message read from the device out to every connected
//! subscriber. Responsibilities:
//! - own the subscriber registry and the per-subscriber queue capacity
//! - hand out `Subscription`s, which unregister themselves when dropped
//! - push a published message into every registered queue without waiting
//!
//! Publishing holds the registry lock for one pass over the subscribers.
//! Each step of that pass is an in-memory push, so a slow or stalled
//! subscriber costs nothing but the messages it loses to eviction.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::broker::message::Message;
use crate::broker::queue::SubscriberQueue;
use crate::broker::registry::{Registry, SubscriberId};

#[derive(Debug)]
pub struct Broker {
    registry: Arc<Registry>,
    queue_capacity: usize,
}

impl Default for Broker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_QUEUE_CAPACITY)
    }
}

impl Broker {
    pub const DEFAULT_QUEUE_CAPACITY: usize = 5;

    /// # Panics
    ///
    /// Panics if `queue_capacity` is zero.
    pub fn new(queue_capacity: usize) -> Self {
        assert!(queue_capacity > 0, "queue capacity must be at least 1");
        Self {
            registry: Arc::new(Registry::new()),
            queue_capacity,
        }
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    /// Allocates a queue, registers it and returns the guard that owns the
    /// membership. Messages published after this returns are delivered to it.
    pub fn subscribe(&self) -> Subscription {
        let queue = Arc::new(SubscriberQueue::new(self.queue_capacity));
        let id = self.registry.register(queue.clone());
        debug!("Registered {id}");
        Subscription {
            id,
            queue,
            registry: self.registry.clone(),
        }
    }

    /// Pushes `msg` into every registered queue and returns how many
    /// subscribers it reached. Never blocks on a subscriber and never fails.
    pub fn publish(&self, msg: &Message) -> usize {
        let mut reached = 0;
        self.registry.for_each(|_, queue| {
            queue.push(msg.clone());
            reached += 1;
        });
        trace!(subscribers = reached, "Published {}", msg.text());
        reached
    }
}

/// Registry membership plus the queue it refers to.
///
/// Dropping the subscription unregisters it, on every exit path of the
/// session that owns it.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    queue: Arc<SubscriberQueue>,
    registry: Arc<Registry>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn queue(&self) -> &SubscriberQueue {
        &self.queue
    }

    /// Next message for this subscriber, waiting if none is buffered.
    pub async fn recv(&self) -> Message {
        self.queue.pop().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.registry.unregister(&self.id) {
            debug!("Unregistered {}", self.id);
        }
    }
}
