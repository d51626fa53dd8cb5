//! The `transport` module is responsible for the subscriber side of the
//! relay: accepting TCP connections and delivering queued messages to each
//! of them.

pub mod session;
pub mod tcp;

pub use session::{Session, SessionState, SessionSummary};
pub use tcp::{ACCEPT_BACKOFF, bind, incoming, serve, serve_connections};
