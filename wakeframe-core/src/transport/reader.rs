//! Bounded reader over a bursty byte stream

use embedded_hal_async::delay::DelayNs;
use heapless::Vec;

use crate::traits::{ByteStream, Liveness};

/// Timing for stream reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReadTimeouts {
    /// Maximum time to wait for more data before giving up (ms)
    pub read_timeout_ms: u32,
    /// Sleep between availability checks (ms)
    pub poll_interval_ms: u32,
}

impl ReadTimeouts {
    /// Create read timeouts
    pub const fn new(read_timeout_ms: u32, poll_interval_ms: u32) -> Self {
        Self {
            read_timeout_ms,
            poll_interval_ms,
        }
    }
}

impl Default for ReadTimeouts {
    fn default() -> Self {
        Self::new(1000, 10)
    }
}

/// Bytes past a line's capacity that are still scanned for the terminator
pub const MAX_LINE_OVERFLOW: usize = 64;

/// Result of a line read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRead<const N: usize> {
    /// Line content without terminator or `\r`, truncated to `N`
    pub bytes: Vec<u8, N>,
    /// Bytes taken from the stream, terminator included
    pub consumed: usize,
    /// Whether the terminator was seen
    pub terminated: bool,
    /// Scan gave up after `N + MAX_LINE_OVERFLOW` bytes without a terminator
    pub capped: bool,
}

impl<const N: usize> LineRead<N> {
    fn new() -> Self {
        Self {
            bytes: Vec::new(),
            consumed: 0,
            terminated: false,
            capped: false,
        }
    }
}

/// Reader that turns a bursty stream into lines and fixed-size blocks
pub struct ChunkedReader<'a, S, L, D> {
    stream: S,
    liveness: &'a mut L,
    delay: &'a mut D,
    timeouts: ReadTimeouts,
    consumed: usize,
}

impl<'a, S, L, D> ChunkedReader<'a, S, L, D>
where
    S: ByteStream,
    L: Liveness,
    D: DelayNs,
{
    /// Wrap an open stream
    pub fn new(stream: S, liveness: &'a mut L, delay: &'a mut D, timeouts: ReadTimeouts) -> Self {
        Self {
            stream,
            liveness,
            delay,
            timeouts,
            consumed: 0,
        }
    }

    /// Total bytes taken from the stream so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Run the liveness hook once
    pub async fn tick(&mut self) {
        self.liveness.tick().await;
    }

    /// Abort the underlying connection
    pub fn abort(&mut self) {
        self.stream.abort();
    }

    /// Read up to and including `terminator`
    ///
    /// `\r` bytes are dropped and anything past `N` bytes is discarded
    /// while the scan continues, for at most [`MAX_LINE_OVERFLOW`] more
    /// bytes. Stops early when the stream closes, no data arrives within
    /// the read timeout or the scan limit is hit; `terminated` and
    /// `capped` tell which.
    pub async fn read_line_until<const N: usize>(&mut self, terminator: u8) -> LineRead<N> {
        let mut line = LineRead::new();
        let mut waited = 0u32;

        loop {
            self.liveness.tick().await;

            if self.stream.available() > 0 {
                let mut byte = [0u8; 1];
                match self.stream.read(&mut byte).await {
                    Ok(1) => {}
                    _ => break,
                }
                line.consumed += 1;

                match byte[0] {
                    b if b == terminator => {
                        line.terminated = true;
                        break;
                    }
                    b'\r' => {}
                    b => {
                        // Overflow is dropped, the line still ends at the terminator
                        let _ = line.bytes.push(b);
                    }
                }

                if line.consumed >= N + MAX_LINE_OVERFLOW {
                    line.capped = true;
                    break;
                }
            } else if !self.stream.is_open() || waited >= self.timeouts.read_timeout_ms {
                break;
            } else {
                waited = waited.saturating_add(self.idle().await);
            }
        }

        self.consumed += line.consumed;
        line
    }

    /// Fill `buf` completely
    ///
    /// Returns the number of bytes read. A count below `buf.len()` means
    /// the stream closed or stalled past the read timeout.
    pub async fn read_exact(&mut self, buf: &mut [u8]) -> usize {
        self.fill(buf).await
    }

    /// Read until the stream closes, stalls or `buf` is full
    ///
    /// Used for bodies without a `Content-Length`, where a short count is
    /// the normal outcome.
    pub async fn read_to_end(&mut self, buf: &mut [u8]) -> usize {
        self.fill(buf).await
    }

    async fn fill(&mut self, buf: &mut [u8]) -> usize {
        let mut filled = 0;
        let mut waited = 0u32;

        while filled < buf.len() {
            let available = self.stream.available();
            if available > 0 {
                let end = filled + (buf.len() - filled).min(available);
                match self.stream.read(&mut buf[filled..end]).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        filled += n;
                        waited = 0;
                    }
                }
            } else if !self.stream.is_open() || waited >= self.timeouts.read_timeout_ms {
                break;
            } else {
                waited = waited.saturating_add(self.idle().await);
            }
        }

        self.consumed += filled;
        filled
    }

    /// One idle wait: tick, then sleep one poll interval
    async fn idle(&mut self) -> u32 {
        let interval = self.timeouts.poll_interval_ms.max(1);
        self.liveness.tick().await;
        self.delay.delay_ms(interval).await;
        interval
    }
}
