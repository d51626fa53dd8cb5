//! Wires the relay together: one task pumps the device into the broker
//! while the acceptor serves subscribers. The relay runs until the source
//! fails. Everything else is contained per subscriber.

use std::sync::Arc;

use tracing::{error, info};

use crate::broker::Broker;
use crate::config::Settings;
use crate::source;
use crate::transport;
use crate::utils::error::Result;

/// Runs the relay with `settings`.
///
/// Returns only on a fatal error: the listener cannot bind, or the device
/// cannot be opened or read.
pub async fn run(settings: Settings) -> Result<()> {
    let broker = Arc::new(Broker::new(settings.broker.queue_capacity));
    info!(
        queue_capacity = broker.queue_capacity(),
        "Starting relay from {} to {}",
        settings.source.device_path.display(),
        settings.listen_addr()
    );

    let listener = transport::bind(&settings.listen_addr()).await?;
    let device = source::open_device(&settings.source.device_path).await?;

    tokio::select! {
        res = source::pump(source::messages(device), &broker) => {
            if let Err(e) = &res {
                error!("Source stopped: {e}");
            }
            res
        }
        () = transport::serve(listener, broker.clone()) => {
            error!("Acceptor exited unexpectedly.");
            Ok(())
        }
    }
}
