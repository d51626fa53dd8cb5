use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::StreamExt;
use tokio::io::{AsyncRead, BufReader, ReadBuf};

use super::{MAX_LINE_LEN, messages, open_device, pump};
use crate::broker::Broker;
use crate::utils::error::RelayError;

async fn collect_lines(input: &[u8]) -> Vec<String> {
    messages(input)
        .map(|m| m.unwrap().text().to_string())
        .collect()
        .await
}

#[tokio::test]
async fn test_splits_on_newlines_and_strips_cr() {
    let lines = collect_lines(b"$GPGGA,1\r\n$GPRMC,2\n$GPGSV,3").await;
    assert_eq!(lines, vec!["$GPGGA,1", "$GPRMC,2", "$GPGSV,3"]);
}

#[tokio::test]
async fn test_keeps_empty_lines() {
    let lines = collect_lines(b"a\r\n\r\nb\r\n").await;
    assert_eq!(lines, vec!["a", "", "b"]);
}

#[tokio::test]
async fn test_invalid_utf8_is_replaced() {
    let lines = collect_lines(b"\xff\xfe$GPGLL\r\n").await;
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("$GPGLL"));
}

#[tokio::test]
async fn test_pump_publishes_in_order_then_reports_closed() {
    let broker = Broker::new(10);
    let sub = broker.subscribe();

    let res = pump(messages(&b"one\r\ntwo\r\nthree\r\n"[..]), &broker).await;
    assert!(matches!(res, Err(RelayError::SourceClosed)));

    let received: Vec<_> = sub
        .queue()
        .snapshot()
        .iter()
        .map(|m| m.wire_bytes().to_vec())
        .collect();
    assert_eq!(
        received,
        vec![b"one\r\n".to_vec(), b"two\r\n".to_vec(), b"three\r\n".to_vec()]
    );
}

/// Yields one line, then fails.
struct FailingDevice {
    sent: bool,
}

impl AsyncRead for FailingDevice {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if self.sent {
            return Poll::Ready(Err(io::Error::other("device unplugged")));
        }
        self.sent = true;
        buf.put_slice(b"$GPVTG\r\n");
        Poll::Ready(Ok(()))
    }
}

#[tokio::test]
async fn test_pump_stops_on_read_error() {
    let broker = Broker::default();
    let sub = broker.subscribe();

    let device = BufReader::new(FailingDevice { sent: false });
    let res = pump(messages(device), &broker).await;

    assert!(matches!(res, Err(RelayError::SourceRead(_))));
    assert_eq!(sub.recv().await.text(), "$GPVTG");
}

#[tokio::test]
async fn test_open_missing_device_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ttyACM0");
    let res = open_device(&path).await;
    assert!(matches!(res, Err(RelayError::SourceOpen { .. })));
}

#[tokio::test]
async fn test_open_regular_file_as_device() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.nmea");
    std::fs::write(&path, "$GPGGA,a\r\n$GPGGA,b\r\n").unwrap();

    let reader = open_device(&path).await.unwrap();
    let lines: Vec<_> = messages(reader)
        .map(|m| m.unwrap().text().to_string())
        .collect()
        .await;
    assert_eq!(lines, vec!["$GPGGA,a", "$GPGGA,b"]);
}

#[tokio::test]
async fn test_line_at_limit_is_accepted() {
    let mut input = vec![b'A'; MAX_LINE_LEN - 2];
    input.extend_from_slice(b"\r\n$GPGGA\r\n");
    let lines = collect_lines(&input).await;
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].len(), MAX_LINE_LEN - 2);
    assert_eq!(lines[1], "$GPGGA");
}

#[tokio::test]
async fn test_overlong_line_ends_stream_with_error() {
    let input = vec![b'A'; 8 * 1024 * 1024];
    let items: Vec<_> = messages(&input[..]).collect().await;
    assert_eq!(items.len(), 1);
    let err = items.into_iter().next().unwrap().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

#[tokio::test]
async fn test_pump_reports_overlong_line_as_read_error() {
    let broker = Broker::default();
    let sub = broker.subscribe();

    let mut input = b"$GPGSA\r\n".to_vec();
    input.extend(std::iter::repeat_n(b'~', MAX_LINE_LEN + 1));
    let res = pump(messages(&input[..]), &broker).await;

    assert!(matches!(res, Err(RelayError::SourceRead(_))));
    assert_eq!(sub.recv().await.text(), "$GPGSA");
    assert!(sub.queue().is_empty());
}
