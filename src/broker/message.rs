use std::sync::Arc;

use chrono::{DateTime, Utc};

/// One line read from the navigation device.
///
/// The text is shared behind an `Arc` because the same message is pushed
/// into every subscriber queue on publish.
///
/// # Example
///
/// ```rust
/// use navrelay::broker::message::Message;
///
/// let msg = Message::new("$GPGGA,123519,4807.038,N,01131.000,E");
/// assert_eq!(msg.wire_bytes(), b"$GPGGA,123519,4807.038,N,01131.000,E\r\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    wire: Arc<str>,
    received_at: DateTime<Utc>,
}

impl Message {
    /// Appended to every line before it goes out on a subscriber connection.
    pub const TERMINATOR: &'static str = "\r\n";

    pub fn new(text: impl AsRef<str>) -> Self {
        Self::with_timestamp(text, Utc::now())
    }

    pub fn with_timestamp(text: impl AsRef<str>, received_at: DateTime<Utc>) -> Self {
        let mut wire = String::with_capacity(text.as_ref().len() + Self::TERMINATOR.len());
        wire.push_str(text.as_ref());
        wire.push_str(Self::TERMINATOR);
        Self {
            wire: wire.into(),
            received_at,
        }
    }

    /// The line without its terminator.
    pub fn text(&self) -> &str {
        &self.wire[..self.wire.len() - Self::TERMINATOR.len()]
    }

    /// Exactly what is written to a subscriber: text followed by CRLF.
    pub fn wire_bytes(&self) -> &[u8] {
        self.wire.as_bytes()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.received_at
    }
}
