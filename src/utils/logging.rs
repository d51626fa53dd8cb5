//! Logging set-up for the relay binary.
//!
//! `main` calls `init` once the settings are known, with `log.level` from
//! the config file, `NAVRELAY_LOG__LEVEL` or the `--log-level` flag.

/// Installs a `tracing` fmt subscriber capped at `level`.
///
/// Calling it again is a no-op, which keeps tests that initialise logging
/// independent of each other.
pub fn init(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(parse_level(level))
        .with_target(false)
        .try_init();
}

/// Maps a level name from settings to a `tracing::Level`, case-insensitively.
/// Unknown names fall back to `INFO`.
pub fn parse_level(name: &str) -> tracing::Level {
    match name.trim().to_lowercase().as_str() {
        "error" => tracing::Level::ERROR,
        "warn" | "warning" => tracing::Level::WARN,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => tracing::Level::INFO,
    }
}
