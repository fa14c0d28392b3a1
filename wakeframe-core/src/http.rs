//! HTTP request building and response head parsing
//!
//! Requests are written into a fixed buffer; responses are read line by
//! line through a [`ChunkedReader`] so the head can never block the
//! watchdog.

use core::fmt::Write;

use embedded_hal_async::delay::DelayNs;
use heapless::String;
use wakeframe_protocol::{parse_content_length, parse_status_line};

use crate::traits::{ByteStream, Liveness};
use crate::transport::{ChunkedReader, LineRead};

/// Largest request the device sends
pub const MAX_REQUEST_LEN: usize = 512;

/// Largest request target (path plus query)
pub const MAX_TARGET_LEN: usize = 320;

/// Header lines longer than this are truncated before parsing
pub const MAX_HEADER_LINE: usize = 128;

/// Bytes of one header line scanned before the head is considered malformed
pub const MAX_HEADER_LINE_SCAN: usize = 2048;

/// Header lines accepted before the head is considered malformed
pub const MAX_HEADER_LINES: usize = 32;

/// `User-Agent` sent with every request
pub const USER_AGENT: &str = concat!("wakeframe/", env!("CARGO_PKG_VERSION"));

/// Errors while building a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    /// Request does not fit the buffer
    TooLong,
}

/// Errors while reading a response head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeadError {
    /// Connection closed or stalled inside the head
    Incomplete,
    /// First line is not an HTTP status line
    BadStatusLine,
    /// More header lines than [`MAX_HEADER_LINES`]
    TooManyHeaders,
}

/// Status and the headers the device cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResponseHead {
    /// Status code
    pub status: u16,
    /// Declared body length, if sent
    pub content_length: Option<usize>,
}

/// Write a `GET` request for `target` on `host`
pub fn build_get(host: &str, target: &str) -> Result<String<MAX_REQUEST_LEN>, RequestError> {
    let mut request = String::new();
    write!(
        request,
        "GET {} HTTP/1.1\r\nHost: {}\r\nUser-Agent: {}\r\nConnection: close\r\n\r\n",
        target, host, USER_AGENT
    )
    .map_err(|_| RequestError::TooLong)?;
    Ok(request)
}

/// Read the status line and headers up to the blank line
pub async fn read_response_head<S, L, D>(
    reader: &mut ChunkedReader<'_, S, L, D>,
) -> Result<ResponseHead, HeadError>
where
    S: ByteStream,
    L: Liveness,
    D: DelayNs,
{
    let status_line = read_header_line(reader).await;
    if !status_line.terminated {
        return Err(HeadError::Incomplete);
    }
    let status = parse_status_line(&status_line.bytes).ok_or(HeadError::BadStatusLine)?;

    let mut content_length = None;
    for _ in 0..MAX_HEADER_LINES {
        let line = read_header_line(reader).await;
        if !line.terminated {
            return Err(HeadError::Incomplete);
        }
        if line.bytes.is_empty() {
            return Ok(ResponseHead {
                status,
                content_length,
            });
        }
        if let Some(len) = parse_content_length(&line.bytes) {
            content_length = Some(len);
        }
    }

    Err(HeadError::TooManyHeaders)
}

/// One header line; the tail past [`MAX_HEADER_LINE`] is skipped
async fn read_header_line<S, L, D>(
    reader: &mut ChunkedReader<'_, S, L, D>,
) -> LineRead<MAX_HEADER_LINE>
where
    S: ByteStream,
    L: Liveness,
    D: DelayNs,
{
    let mut line = reader.read_line_until::<MAX_HEADER_LINE>(b'\n').await;
    while line.capped && line.consumed < MAX_HEADER_LINE_SCAN {
        let rest = reader.read_line_until::<0>(b'\n').await;
        line.consumed += rest.consumed;
        line.terminated = rest.terminated;
        line.capped = rest.capped;
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{response, CountingLiveness, RecordingDelay, ScriptedStream};
    use crate::transport::ReadTimeouts;
    use embassy_futures::block_on;

    fn read_head(data: &[u8]) -> (Result<ResponseHead, HeadError>, usize) {
        let mut aborts = 0;
        let stream = ScriptedStream::new(data, 5, &mut aborts);
        let mut liveness = CountingLiveness::default();
        let mut delay = RecordingDelay::default();
        let mut reader =
            ChunkedReader::new(stream, &mut liveness, &mut delay, ReadTimeouts::new(50, 10));
        let head = block_on(read_response_head(&mut reader));
        (head, reader.consumed())
    }

    #[test]
    fn test_build_get() {
        let request = build_get("frames.local", "/bitmap?mac=AA").unwrap();
        assert!(request.starts_with("GET /bitmap?mac=AA HTTP/1.1\r\n"));
        assert!(request.contains("\r\nHost: frames.local\r\n"));
        assert!(request.contains("\r\nUser-Agent: wakeframe/"));
        assert!(request.ends_with("Connection: close\r\n\r\n"));
    }

    #[test]
    fn test_build_get_too_long() {
        let target = [b'a'; MAX_REQUEST_LEN];
        let target = core::str::from_utf8(&target).unwrap();
        assert_eq!(build_get("h", target), Err(RequestError::TooLong));
    }

    #[test]
    fn test_head_with_length() {
        let data = response(200, Some(4), b"MM\nx");
        let (head, consumed) = read_head(&data);
        assert_eq!(
            head,
            Ok(ResponseHead {
                status: 200,
                content_length: Some(4)
            })
        );
        assert_eq!(consumed, data.len() - 4);
    }

    #[test]
    fn test_head_without_length() {
        let (head, _) = read_head(&response(304, None, b""));
        assert_eq!(
            head,
            Ok(ResponseHead {
                status: 304,
                content_length: None
            })
        );
    }

    #[test]
    fn test_head_with_long_header_line() {
        let mut data = std::vec::Vec::from(&b"HTTP/1.1 200 OK\r\nX-Trace: "[..]);
        data.extend(core::iter::repeat(b'z').take(600));
        data.extend_from_slice(b"\r\nContent-Length: 2\r\n\r\nMM");
        let (head, consumed) = read_head(&data);
        assert_eq!(
            head,
            Ok(ResponseHead {
                status: 200,
                content_length: Some(2)
            })
        );
        assert_eq!(consumed, data.len() - 2);
    }

    #[test]
    fn test_head_garbage_status() {
        let (head, _) = read_head(b"MM\nabc\n");
        assert_eq!(head, Err(HeadError::BadStatusLine));
    }

    #[test]
    fn test_head_cut_short() {
        let (head, _) = read_head(b"HTTP/1.1 200 OK\r\nContent-Le");
        assert_eq!(head, Err(HeadError::Incomplete));
    }
}
