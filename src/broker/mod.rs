//! The `broker` module fans device messages out to subscribers.
//!
//! - `message`: the unit relayed from the device to every subscriber.
//! - `queue`: bounded per-subscriber buffer with drop-oldest overflow.
//! - `registry`: the set of live subscriber queues, keyed by handle.
//! - `engine`: the `Broker` that publishes and hands out subscriptions.

pub mod engine;
pub mod message;
pub mod queue;
pub mod registry;

pub use engine::{Broker, Subscription};
pub use message::Message;
pub use registry::SubscriberId;
