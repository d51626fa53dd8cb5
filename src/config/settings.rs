use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration settings for the relay.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub source: SourceSettings,
    pub server: ServerSettings,
    pub broker: BrokerSettings,
    pub log: LogSettings,
}

/// Where the line-delimited sentences are read from.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SourceSettings {
    pub device_path: PathBuf,
}

/// Configuration settings for the server.
///
/// Defines the host and port subscribers connect to.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Configuration settings for the broker.
///
/// `queue_capacity` is how many undelivered messages a subscriber may hold
/// before the oldest are dropped.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BrokerSettings {
    pub queue_capacity: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize, Default)]
pub struct PartialSettings {
    pub source: Option<PartialSourceSettings>,
    pub server: Option<PartialServerSettings>,
    pub broker: Option<PartialBrokerSettings>,
    pub log: Option<PartialLogSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialSourceSettings {
    pub device_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub queue_capacity: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: SourceSettings {
                device_path: PathBuf::from("/dev/ttyACM0"),
            },
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 2000,
            },
            broker: BrokerSettings { queue_capacity: 5 },
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl Settings {
    /// Fills every value missing from `partial` with the default.
    pub fn merged(partial: PartialSettings) -> Self {
        let default = Settings::default();

        Self {
            source: SourceSettings {
                device_path: partial
                    .source
                    .and_then(|s| s.device_path)
                    .unwrap_or(default.source.device_path),
            },
            server: ServerSettings {
                host: partial
                    .server
                    .as_ref()
                    .and_then(|s| s.host.clone())
                    .unwrap_or(default.server.host),
                port: partial
                    .server
                    .as_ref()
                    .and_then(|s| s.port)
                    .unwrap_or(default.server.port),
            },
            broker: BrokerSettings {
                queue_capacity: partial
                    .broker
                    .and_then(|b| b.queue_capacity)
                    .unwrap_or(default.broker.queue_capacity),
            },
            log: LogSettings {
                level: partial
                    .log
                    .and_then(|l| l.level)
                    .unwrap_or(default.log.level),
            },
        }
    }

    /// `host:port` the acceptor binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
