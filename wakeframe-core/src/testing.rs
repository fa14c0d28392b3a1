//! Test doubles for the collaborator traits

use std::format;
use std::string::String;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;
use wakeframe_hal::{AdcError, BatterySensor, RetainedError, RetainedStore};

use crate::traits::{
    ByteStream, ConnectError, Connector, DisplayError, DisplaySink, Liveness, StreamError,
};

/// Stream that hands out a fixed script in bursts of at most `chunk` bytes
pub struct ScriptedStream<'a> {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
    stall_at: Option<usize>,
    aborted: bool,
    aborts: &'a mut u32,
}

impl<'a> ScriptedStream<'a> {
    pub fn new(data: &[u8], chunk: usize, aborts: &'a mut u32) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
            chunk: chunk.max(1),
            stall_at: None,
            aborted: false,
            aborts,
        }
    }

    /// Stop delivering data at `pos` while keeping the connection open
    pub fn stall_at(mut self, pos: usize) -> Self {
        self.stall_at = Some(pos);
        self
    }

    fn limit(&self) -> usize {
        match self.stall_at {
            Some(at) => at.min(self.data.len()),
            None => self.data.len(),
        }
    }
}

impl ByteStream for ScriptedStream<'_> {
    fn available(&self) -> usize {
        if self.aborted {
            return 0;
        }
        self.limit().saturating_sub(self.pos).min(self.chunk)
    }

    fn is_open(&self) -> bool {
        !self.aborted && self.pos < self.data.len()
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        let n = buf.len().min(self.available());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn abort(&mut self) {
        if !self.aborted {
            self.aborted = true;
            *self.aborts += 1;
        }
    }
}

/// One scripted reply per connection attempt
#[derive(Clone)]
pub enum Reply {
    /// Connection refused
    Refuse,
    /// Full response, then close
    Respond(Vec<u8>),
    /// Response that goes silent after the given number of bytes
    Stall(Vec<u8>, usize),
}

/// Connector replaying [`Reply`] scripts; the last reply repeats
pub struct ScriptedConnector {
    replies: Vec<Reply>,
    chunk: usize,
    pub opened: usize,
    pub aborts: u32,
    pub requests: Vec<String>,
}

impl ScriptedConnector {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies,
            chunk: 7,
            opened: 0,
            aborts: 0,
            requests: Vec::new(),
        }
    }

    pub fn with_chunk(mut self, chunk: usize) -> Self {
        self.chunk = chunk;
        self
    }
}

impl Connector for ScriptedConnector {
    type Stream<'a> = ScriptedStream<'a>;

    fn host(&self) -> &str {
        "frames.local"
    }

    async fn open(&mut self, request: &[u8]) -> Result<ScriptedStream<'_>, ConnectError> {
        self.requests
            .push(String::from_utf8_lossy(request).into_owned());
        let index = self.opened.min(self.replies.len().saturating_sub(1));
        self.opened += 1;

        match self.replies.get(index) {
            None | Some(Reply::Refuse) => Err(ConnectError::Refused),
            Some(Reply::Respond(data)) => {
                Ok(ScriptedStream::new(data, self.chunk, &mut self.aborts))
            }
            Some(Reply::Stall(data, at)) => {
                Ok(ScriptedStream::new(data, self.chunk, &mut self.aborts).stall_at(*at))
            }
        }
    }
}

/// Build a raw HTTP response
pub fn response(status: u16, content_length: Option<usize>, body: &[u8]) -> Vec<u8> {
    let mut out = format!("HTTP/1.1 {} X\r\nContent-Type: application/octet-stream\r\n", status)
        .into_bytes();
    if let Some(len) = content_length {
        out.extend_from_slice(format!("Content-Length: {}\r\n", len).as_bytes());
    }
    out.extend_from_slice(b"Connection: close\r\n\r\n");
    out.extend_from_slice(body);
    out
}

/// Build an image body: magic line, checksum line, rows
pub fn frame_body(checksum: &str, rows: &[u8]) -> Vec<u8> {
    let mut body = format!("MM\n{}\n", checksum).into_bytes();
    body.extend_from_slice(rows);
    body
}

/// A 200 response carrying an image body with a correct `Content-Length`
pub fn frame_response(checksum: &str, rows: &[u8]) -> Vec<u8> {
    let body = frame_body(checksum, rows);
    response(200, Some(body.len()), &body)
}

/// Row data with a recognisable pattern: byte value is the row index
pub fn patterned_rows(row_bytes: usize, height: usize, planes: usize) -> Vec<u8> {
    let mut rows = Vec::new();
    for row in 0..height {
        for plane in 0..planes {
            rows.extend(core::iter::repeat((row * planes + plane) as u8).take(row_bytes));
        }
    }
    rows
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaintedRow {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub planes: Vec<Vec<u8>>,
}

/// Sink that records every row and commit
#[derive(Default)]
pub struct RecordingSink {
    pub rows: Vec<PaintedRow>,
    pub commits: u32,
    /// Fail the paint call with this index once
    pub fail_paint_at: Option<usize>,
    pub fail_commit: bool,
    paint_calls: usize,
}

impl DisplaySink for RecordingSink {
    async fn paint_row(
        &mut self,
        planes: &[&[u8]],
        x: u16,
        y: u16,
        width: u16,
    ) -> Result<(), DisplayError> {
        let call = self.paint_calls;
        self.paint_calls += 1;
        if self.fail_paint_at == Some(call) {
            self.fail_paint_at = None;
            return Err(DisplayError::Bus);
        }

        self.rows.push(PaintedRow {
            x,
            y,
            width,
            planes: planes.iter().map(|p| p.to_vec()).collect(),
        });
        Ok(())
    }

    async fn commit_frame(&mut self) -> Result<(), DisplayError> {
        if self.fail_commit {
            return Err(DisplayError::BusyTimeout);
        }
        self.commits += 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct CountingLiveness {
    pub ticks: u32,
}

impl Liveness for CountingLiveness {
    async fn tick(&mut self) {
        self.ticks += 1;
    }
}

/// Delay that returns immediately and adds up the requested time
#[derive(Default)]
pub struct RecordingDelay {
    pub total_ms: u64,
    pub calls: u32,
}

impl DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ms += u64::from(ns) / 1_000_000;
        self.calls += 1;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.total_ms += u64::from(ms);
        self.calls += 1;
    }
}

/// In-memory retained region
pub struct MemoryStore {
    pub data: Option<Vec<u8>>,
    capacity: usize,
}

impl MemoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: None,
            capacity,
        }
    }
}

impl RetainedStore for MemoryStore {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, RetainedError> {
        let data = self.data.as_ref().ok_or(RetainedError::Empty)?;
        if data.len() > buffer.len() {
            return Err(RetainedError::BufferTooSmall);
        }
        buffer[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), RetainedError> {
        if data.len() > self.capacity {
            return Err(RetainedError::TooLarge);
        }
        self.data = Some(data.to_vec());
        Ok(())
    }

    fn invalidate(&mut self) {
        self.data = None;
    }
}

/// Sensor returning a fixed pin voltage, or an error
pub struct FixedSensor {
    pub pin_mv: Result<u32, AdcError>,
    pub raw: u16,
}

impl BatterySensor for FixedSensor {
    fn read_raw(&mut self) -> Result<u16, AdcError> {
        self.pin_mv.map(|_| self.raw)
    }

    fn read_pin_millivolts(&mut self) -> Result<u32, AdcError> {
        self.pin_mv
    }
}
