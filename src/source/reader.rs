use std::io;
use std::path::Path;

use futures_util::stream::{self, Stream, StreamExt};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{debug, info};

use crate::broker::{Broker, Message};
use crate::utils::error::{RelayError, Result};

/// Longest accepted line, terminator included.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Opens the device read-only.
pub async fn open_device(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path)
        .await
        .map_err(|source| RelayError::SourceOpen {
            path: path.to_path_buf(),
            source,
        })?;
    info!("Reading sentences from {}", path.display());
    Ok(BufReader::new(file))
}

/// Turns `reader` into a lazy stream of messages, one per line.
///
/// Lines end at `\n` and a trailing `\r` is dropped. Bytes that are not
/// UTF-8 are replaced rather than failing the stream. The stream ends at
/// EOF, or after yielding an `InvalidData` error for a line longer than
/// `MAX_LINE_LEN`.
pub fn messages<R>(reader: R) -> impl Stream<Item = io::Result<Message>>
where
    R: AsyncBufRead + Unpin,
{
    stream::try_unfold((reader, Vec::new()), |(mut reader, mut buf)| async move {
        buf.clear();
        let mut limited = AsyncReadExt::take(&mut reader, MAX_LINE_LEN as u64);
        let n = limited.read_until(b'\n', &mut buf).await?;
        if n == 0 {
            return Ok::<_, io::Error>(None);
        }
        if n == MAX_LINE_LEN && !buf.ends_with(b"\n") {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("line longer than {MAX_LINE_LEN} bytes"),
            ));
        }
        let msg = Message::new(String::from_utf8_lossy(trim_line_ending(&buf)));
        Ok::<_, io::Error>(Some((msg, (reader, buf))))
    })
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Publishes every message from `source` in arrival order.
///
/// Only returns on failure: a read error, or the end of the stream.
pub async fn pump<S>(source: S, broker: &Broker) -> Result<()>
where
    S: Stream<Item = io::Result<Message>>,
{
    let mut source = std::pin::pin!(source);
    while let Some(msg) = source.next().await {
        let msg = msg.map_err(RelayError::SourceRead)?;
        let reached = broker.publish(&msg);
        debug!(subscribers = reached, "{}", msg.text());
    }
    Err(RelayError::SourceClosed)
}
