//! Connector trait: opens a connection and sends a request

use core::future::Future;

use super::stream::ByteStream;

/// Errors that can occur while opening a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectError {
    /// Host name did not resolve
    Dns,
    /// TCP connect refused or timed out
    Refused,
    /// Request could not be written
    Write,
    /// Network link is down
    NoLink,
}

/// Opens connections to the configured server
///
/// Each call to [`open`](Self::open) is one attempt: connect, write the
/// request, and hand back the stream positioned at the status line.
pub trait Connector {
    /// Stream type returned for an open connection
    type Stream<'a>: ByteStream
    where
        Self: 'a;

    /// Server host name, used for the `Host` header
    fn host(&self) -> &str;

    /// Connect and send `request` verbatim
    fn open(
        &mut self,
        request: &[u8],
    ) -> impl Future<Output = Result<Self::Stream<'_>, ConnectError>>;
}
