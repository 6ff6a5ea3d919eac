//! Shared test helpers
//!
//! A scripted in-memory transport plus builders for server traffic.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use boltwire::chunk::{chunk_message, Dechunker, MAX_CHUNK_SIZE};
use boltwire::error::ServerError;
use boltwire::protocol::{
    decode_request, encode_response, MessageFormat, ProtocolVersion, Request, Response,
};
use boltwire::{Value, ValueMap};
use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

// =============================================================================
// Scripted Transport
// =============================================================================

/// In-memory `Read + Write` that replays scripted server bytes
///
/// Reads return at most `read_limit` bytes each and end of stream once
/// the script runs out. Everything written is captured in a shared
/// buffer so the test can inspect it after the stream is moved into a
/// connection.
pub struct ScriptedStream {
    input: VecDeque<u8>,
    read_limit: usize,
    written: Arc<Mutex<Vec<u8>>>,
}

impl ScriptedStream {
    pub fn new(input: Vec<u8>) -> (Self, Arc<Mutex<Vec<u8>>>) {
        Self::with_read_limit(input, usize::MAX)
    }

    pub fn with_read_limit(input: Vec<u8>, read_limit: usize) -> (Self, Arc<Mutex<Vec<u8>>>) {
        let written = Arc::new(Mutex::new(Vec::new()));
        let stream = Self {
            input: input.into(),
            read_limit,
            written: written.clone(),
        };
        (stream, written)
    }
}

impl Read for ScriptedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.read_limit).min(self.input.len());
        for (slot, byte) in buf.iter_mut().zip(self.input.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for ScriptedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Transport whose reads block until the test sends server bytes
///
/// Reads end the stream once every sender is dropped and the sent bytes
/// are drained.
pub struct GatedStream {
    input: Receiver<Vec<u8>>,
    pending: VecDeque<u8>,
    written: Arc<Mutex<Vec<u8>>>,
}

impl GatedStream {
    pub fn new() -> (Self, Sender<Vec<u8>>, Arc<Mutex<Vec<u8>>>) {
        let (sender, input) = unbounded();
        let written = Arc::new(Mutex::new(Vec::new()));
        let stream = Self {
            input,
            pending: VecDeque::new(),
            written: written.clone(),
        };
        (stream, sender, written)
    }
}

impl Read for GatedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pending.is_empty() {
            match self.input.recv() {
                Ok(bytes) => self.pending.extend(bytes),
                Err(_) => return Ok(0),
            }
        }
        let n = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for GatedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Wraps a transport and raises a flag when it is dropped
pub struct Tracked<S> {
    inner: S,
    dropped: Arc<AtomicBool>,
}

impl<S> Tracked<S> {
    pub fn new(inner: S) -> (Self, Arc<AtomicBool>) {
        let dropped = Arc::new(AtomicBool::new(false));
        let tracked = Self {
            inner,
            dropped: dropped.clone(),
        };
        (tracked, dropped)
    }
}

impl<S> Drop for Tracked<S> {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

impl<S: Read> Read for Tracked<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<S: Write> Write for Tracked<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Transport whose writes always fail
pub struct BrokenPipe;

impl Read for BrokenPipe {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }
}

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// =============================================================================
// Server Traffic Builders
// =============================================================================

pub fn map(entries: Vec<(&str, Value)>) -> ValueMap {
    entries.into_iter().collect()
}

pub fn fields(names: &[&str]) -> Value {
    Value::List(names.iter().map(|name| Value::from(*name)).collect())
}

/// SUCCESS acknowledging a RUN
pub fn run_success(names: &[&str]) -> Response {
    Response::Success(map(vec![("fields", fields(names))]))
}

pub fn record(values: Vec<Value>) -> Response {
    Response::Record(values)
}

pub fn success(entries: Vec<(&str, Value)>) -> Response {
    Response::Success(map(entries))
}

pub fn has_more() -> Response {
    success(vec![("has_more", Value::from(true))])
}

pub fn failure(code: &str, message: &str) -> Response {
    Response::Failure(ServerError::new(code, message))
}

/// Encode and chunk responses the way a server would send them
pub fn server_bytes(version: ProtocolVersion, responses: &[Response]) -> Vec<u8> {
    let format = MessageFormat::new(version).unwrap();
    let mut out = Vec::new();
    for response in responses {
        let payload = encode_response(&format, response).unwrap();
        out.extend_from_slice(&chunk_message(&payload, MAX_CHUNK_SIZE));
    }
    out
}

/// Decode every request the client wrote
pub fn sent_requests(version: ProtocolVersion, written: &[u8]) -> Vec<Request> {
    let format = MessageFormat::new(version).unwrap();
    let mut dechunker = Dechunker::new();
    let messages = dechunker.push(written);
    assert!(!dechunker.is_mid_message(), "client wrote a partial message");
    messages
        .into_iter()
        .map(|message| decode_request(&format, message).unwrap())
        .collect()
}
