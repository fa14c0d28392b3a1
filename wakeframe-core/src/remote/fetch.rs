//! Remote configuration request with retries

use core::fmt;

use embedded_hal_async::delay::DelayNs;
use wakeframe_protocol::{status_text, STATUS_OK};

use super::config::{JsonError, RemoteConfig};
use crate::http;
use crate::sync::RetryPolicy;
use crate::traits::{Connector, Liveness};
use crate::transport::{self, ChunkedReader, ReadTimeouts};

/// Largest configuration body accepted
pub const MAX_BODY_LEN: usize = 512;

/// Errors fetching the remote configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RemoteError {
    /// Connect failed or the head was unreadable
    Connection,
    /// Server answered with a non-200 status
    Status(u16),
    /// Body ended before `Content-Length` bytes
    ShortRead,
    /// Body larger than [`MAX_BODY_LEN`]
    TooLarge,
    /// Request does not fit the request buffer
    RequestTooLong,
    /// Body is not a usable configuration object
    Parse(JsonError),
}

impl RemoteError {
    /// Whether another attempt may succeed
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            RemoteError::Connection | RemoteError::Status(_) | RemoteError::ShortRead
        )
    }
}

impl From<JsonError> for RemoteError {
    fn from(e: JsonError) -> Self {
        RemoteError::Parse(e)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Connection => f.write_str("Failed to load config"),
            RemoteError::Status(code) => {
                write!(f, "Failed to load config\nHTTP: {} {}", code, status_text(*code))
            }
            RemoteError::ShortRead | RemoteError::TooLarge | RemoteError::Parse(_) => {
                f.write_str("Can't parse response")
            }
            RemoteError::RequestTooLong => f.write_str("Config request too long"),
        }
    }
}

/// Fetch and parse the remote configuration
///
/// `target` is the request path with its query (see
/// [`ConfigQuery`](super::ConfigQuery)). Transient failures are retried
/// under `policy`; parse errors are returned immediately.
pub async fn fetch_remote_config<C, L, D>(
    connector: &mut C,
    liveness: &mut L,
    delay: &mut D,
    timeouts: ReadTimeouts,
    policy: &RetryPolicy,
    target: &str,
) -> Result<RemoteConfig, RemoteError>
where
    C: Connector,
    L: Liveness,
    D: DelayNs,
{
    let get =
        http::build_get(connector.host(), target).map_err(|_| RemoteError::RequestTooLong)?;

    let mut last = RemoteError::Connection;
    for attempt in 1..=policy.attempts() {
        if attempt > 1 {
            transport::pause(liveness, delay, policy.retry_delay_ms).await;
        }

        match fetch_once(connector, liveness, delay, timeouts, get.as_bytes()).await {
            Ok(config) => return Ok(config),
            Err(e) if e.is_retryable() => last = e,
            Err(e) => return Err(e),
        }
    }

    Err(last)
}

async fn fetch_once<C, L, D>(
    connector: &mut C,
    liveness: &mut L,
    delay: &mut D,
    timeouts: ReadTimeouts,
    get: &[u8],
) -> Result<RemoteConfig, RemoteError>
where
    C: Connector,
    L: Liveness,
    D: DelayNs,
{
    liveness.tick().await;
    let stream = connector
        .open(get)
        .await
        .map_err(|_| RemoteError::Connection)?;
    let mut reader = ChunkedReader::new(stream, liveness, delay, timeouts);

    let head = match http::read_response_head(&mut reader).await {
        Ok(head) => head,
        Err(_) => {
            reader.abort();
            return Err(RemoteError::Connection);
        }
    };
    if head.status != STATUS_OK {
        reader.abort();
        return Err(RemoteError::Status(head.status));
    }

    let mut body = [0u8; MAX_BODY_LEN];
    let len = match head.content_length {
        Some(len) if len > MAX_BODY_LEN => {
            reader.abort();
            return Err(RemoteError::TooLarge);
        }
        Some(len) => {
            if reader.read_exact(&mut body[..len]).await < len {
                reader.abort();
                return Err(RemoteError::ShortRead);
            }
            len
        }
        None => reader.read_to_end(&mut body).await,
    };

    Ok(RemoteConfig::parse(&body[..len])?)
}
