//! Bounded per-subscriber buffering with a drop-oldest overflow policy.
//!
//! `RingBuffer` is the plain data structure and knows nothing about tasks.
//! `SubscriberQueue` puts it behind a mutex and a `Notify` so the publisher
//! can push without ever waiting while the session task awaits the next
//! message.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

use crate::broker::message::Message;

/// Fixed-capacity FIFO. Pushing into a full buffer evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be at least 1");
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `item`, first removing the oldest entry if the buffer is full.
    /// Returns the evicted entry.
    pub fn push_evicting(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

/// The buffer between the broadcaster and one subscriber session.
///
/// Single producer (publish) and single consumer (the session task).
#[derive(Debug)]
pub struct SubscriberQueue {
    buffer: Mutex<RingBuffer<Message>>,
    ready: Notify,
    dropped: AtomicU64,
}

impl SubscriberQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Mutex::new(RingBuffer::new(capacity)),
            ready: Notify::new(),
            dropped: AtomicU64::new(0),
        }
    }

    /// Never blocks on the consumer and never fails.
    pub fn push(&self, msg: Message) {
        let evicted = self.lock().push_evicting(msg);
        if evicted.is_some() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        // Stores a permit when the consumer is not parked yet.
        self.ready.notify_one();
    }

    /// Waits until a message is buffered and takes the oldest one.
    pub async fn pop(&self) -> Message {
        loop {
            if let Some(msg) = self.try_pop() {
                return msg;
            }
            self.ready.notified().await;
        }
    }

    pub fn try_pop(&self) -> Option<Message> {
        self.lock().pop()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    /// Messages lost to eviction since the queue was created.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Copy of the buffered messages, oldest first.
    pub fn snapshot(&self) -> Vec<Message> {
        self.lock().iter().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, RingBuffer<Message>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
