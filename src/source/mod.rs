//! The `source` module reads line-delimited sentences from the navigation
//! device and feeds them to the broker.
//!
//! Any failure here ends the relay. There is no reconnection to the device.

pub mod reader;

pub use reader::{MAX_LINE_LEN, messages, open_device, pump};

#[cfg(test)]
mod tests;
