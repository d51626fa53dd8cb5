//! # navrelay
//!
//! `navrelay` relays the line-delimited sentences of a serial navigation
//! device (NMEA over `/dev/ttyACM0`, for instance) to any number of TCP
//! subscribers. Every subscriber receives the messages published after it
//! connects, in order, each terminated by CRLF. A subscriber that cannot
//! keep up loses its oldest buffered messages rather than slowing anybody
//! else down.
//!
//! ## Core Modules
//!
//! - `broker`: bounded subscriber queues, the subscriber registry and the broadcaster.
//! - `config`: loads settings from defaults, an optional file and the environment.
//! - `server`: runs the source pump and the acceptor together.
//! - `source`: reads messages from the device.
//! - `transport`: accepts TCP subscribers and runs one session per connection.
//! - `utils`: the error type and logging set-up.

pub mod broker;
pub mod config;
pub mod server;
pub mod source;
pub mod transport;
pub mod utils;
