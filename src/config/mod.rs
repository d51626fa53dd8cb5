mod settings;

use std::path::Path;

use config::{Config, Environment, File};

use crate::utils::error::{RelayError, Result};
use settings::PartialSettings;

pub use settings::{BrokerSettings, LogSettings, ServerSettings, Settings, SourceSettings};

/// Prefix of environment overrides, e.g. `NAVRELAY_BROKER__QUEUE_CAPACITY=10`.
pub const ENV_PREFIX: &str = "NAVRELAY";

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
pub fn load_config() -> Result<Settings> {
    load_config_from(None)
}

/// Like `load_config`, but reads `path` instead of `config/default`.
/// An explicit file must exist.
pub fn load_config_from(path: Option<&Path>) -> Result<Settings> {
    let settings = read_settings(path)?;
    validate(&settings)?;
    Ok(settings)
}

/// Merges file and environment over the defaults without validating, so
/// callers can apply their own overrides first.
pub fn read_settings(path: Option<&Path>) -> Result<Settings> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name("config/default").required(false),
    };

    let builder = Config::builder().add_source(file).add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(Settings::merged(partial))
}

/// Rejects settings the relay cannot run with.
pub fn validate(settings: &Settings) -> Result<()> {
    if settings.broker.queue_capacity == 0 {
        return Err(RelayError::InvalidConfig(
            "broker.queue_capacity must be at least 1".to_string(),
        ));
    }
    if settings.source.device_path.as_os_str().is_empty() {
        return Err(RelayError::InvalidConfig(
            "source.device_path must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
