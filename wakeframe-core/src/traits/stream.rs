//! Byte stream trait for an open HTTP connection

use core::future::Future;

/// Errors from the underlying socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamError {
    /// Connection reset by the peer
    Reset,
    /// Any other transport failure
    Io,
}

/// A readable, already requested connection
///
/// Data arrives in bursts of arbitrary size. Callers poll
/// [`available`](Self::available) and only call [`read`](Self::read) when
/// something is buffered, so `read` never has to wait for the network.
pub trait ByteStream {
    /// Bytes that can be read right now
    fn available(&self) -> usize;

    /// Whether the peer may still send data
    ///
    /// A closed stream can still have buffered bytes left to read.
    fn is_open(&self) -> bool;

    /// Read buffered bytes into `buf`
    ///
    /// Returns the number of bytes copied. `Ok(0)` means the stream is
    /// exhausted.
    fn read(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<usize, StreamError>>;

    /// Drop the connection without draining it
    fn abort(&mut self);
}
