//! CLI for navrelay
//!
//! Relays sentences from a serial navigation device to TCP subscribers.
//! Flags override values loaded from the config file and environment.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use navrelay::config::{Settings, read_settings, validate};
use navrelay::server;
use navrelay::utils::{Result, logging};
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "navrelay", version, about)]
struct Cli {
    /// Config file to read instead of `config/default`
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serial device the sentences are read from
    #[arg(long)]
    device: Option<PathBuf>,

    /// Address to accept subscribers on
    #[arg(long)]
    host: Option<String>,

    /// TCP port to accept subscribers on
    #[arg(long)]
    port: Option<u16>,

    /// Messages buffered per subscriber before the oldest are dropped
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// error, warn, info, debug or trace
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply(self, settings: &mut Settings) {
        if let Some(device) = self.device {
            settings.source.device_path = device;
        }
        if let Some(host) = self.host {
            settings.server.host = host;
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(capacity) = self.queue_capacity {
            settings.broker.queue_capacity = capacity;
        }
        if let Some(level) = self.log_level {
            settings.log.level = level;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = match load_settings(cli) {
        Ok(settings) => settings,
        Err(e) => {
            logging::init("error");
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(&settings.log.level);

    match server::run(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Relay failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_settings(cli: Cli) -> Result<Settings> {
    let mut settings = read_settings(cli.config.as_deref())?;
    cli.apply(&mut settings);
    validate(&settings)?;
    Ok(settings)
}
