//! TCP transport
//!
//! Accepts subscriber connections and runs one session task per connection.
//! Subscribers never send anything. They receive every message published
//! after they connect, each one terminated by CRLF.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, Stream, StreamExt};
use tokio::io::AsyncWrite;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

use crate::broker::Broker;
use crate::transport::session::Session;
use crate::utils::error::{RelayError, Result};

/// Binds the subscriber listener. Failure here is fatal to the relay.
pub async fn bind(addr: &str) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| RelayError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    match listener.local_addr() {
        Ok(local) => info!("Relay listening on tcp://{local}"),
        Err(_) => info!("Relay listening on tcp://{addr}"),
    }
    Ok(listener)
}

/// Pause after a failed accept before accepting again.
pub const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Endless stream of accepted connections, with Nagle disabled. Individual
/// accept errors are yielded as items and do not end the stream.
pub fn incoming(
    listener: TcpListener,
) -> impl Stream<Item = io::Result<(TcpStream, SocketAddr)>> {
    stream::unfold(listener, |listener| async move {
        let accepted = listener.accept().await;
        if let Ok((stream, peer)) = &accepted {
            if let Err(e) = stream.set_nodelay(true) {
                debug!("Could not disable Nagle for {peer}: {e}");
            }
        }
        Some((accepted, listener))
    })
}

/// Accepts connections forever, starting one session per connection.
pub async fn serve(listener: TcpListener, broker: Arc<Broker>) {
    serve_connections(incoming(listener), broker).await
}

/// Starts one session task per connection yielded by `connections`.
/// Returns only if the stream ends.
pub async fn serve_connections<C, S>(connections: C, broker: Arc<Broker>)
where
    C: Stream<Item = io::Result<(S, SocketAddr)>>,
    S: AsyncWrite + Unpin + Send + 'static,
{
    let mut connections = std::pin::pin!(connections);

    while let Some(accepted) = connections.next().await {
        let (stream, peer) = match accepted {
            Ok(conn) => conn,
            Err(e) => {
                error!("Failed to accept incoming tcp connection: {e}");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };

        info!("Serving {peer}");
        let session = Session::open(&broker, stream, peer.to_string());
        tokio::spawn(async move {
            let summary = session.run().await;
            info!(
                delivered = summary.delivered,
                dropped = summary.dropped,
                "Send loop closed for {}",
                summary.peer
            );
        });
    }
}
