//! Chunk Reader
//!
//! Reassembles logical messages from chunks.
//!
//! [`Dechunker`] is a push-based state machine that accepts bytes in
//! whatever pieces the transport delivers them:
//! - `WaitingForHeader`: need 2 bytes of length
//! - `WaitingForChunk`: length parsed, need N more payload bytes
//!
//! [`ChunkReader`] drives a `Dechunker` from any blocking `Read`.

use std::collections::VecDeque;
use std::io::Read;

use bytes::{Buf, Bytes, BytesMut};

use super::CHUNK_HEADER_SIZE;
use crate::error::{BoltError, Result};

/// State machine for chunk parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Waiting for a complete 2 byte chunk header
    WaitingForHeader,

    /// Header parsed, waiting for this many payload bytes
    WaitingForChunk { remaining: usize },
}

/// Incremental chunk decoder
pub struct Dechunker {
    /// Raw bytes received but not yet parsed
    input: BytesMut,

    /// Payload of the message currently being reassembled
    message: BytesMut,

    /// Current parsing state
    state: State,
}

impl Dechunker {
    /// Create a dechunker with a default 8 KB input buffer
    pub fn new() -> Self {
        Self::with_capacity(8 * 1024)
    }

    /// Create a dechunker with a custom input buffer capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            input: BytesMut::with_capacity(capacity),
            message: BytesMut::new(),
            state: State::WaitingForHeader,
        }
    }

    /// Push raw bytes and extract every message they complete
    pub fn push(&mut self, data: &[u8]) -> Vec<Bytes> {
        self.input.extend_from_slice(data);

        let mut messages = Vec::new();
        while let Some(message) = self.try_extract_one() {
            messages.push(message);
        }
        messages
    }

    /// Whether a message is partially assembled or input is pending
    pub fn is_mid_message(&self) -> bool {
        !self.message.is_empty()
            || !self.input.is_empty()
            || self.state != State::WaitingForHeader
    }

    /// Try to complete a single message from buffered input
    fn try_extract_one(&mut self) -> Option<Bytes> {
        loop {
            match self.state {
                State::WaitingForHeader => {
                    if self.input.len() < CHUNK_HEADER_SIZE {
                        return None;
                    }

                    let size = self.input.get_u16() as usize;
                    if size > 0 {
                        self.state = State::WaitingForChunk { remaining: size };
                        continue;
                    }

                    if self.message.is_empty() {
                        // NOOP chunk between messages
                        tracing::trace!("S: <NOOP>");
                        continue;
                    }

                    return Some(self.message.split().freeze());
                }
                State::WaitingForChunk { remaining } => {
                    if self.input.is_empty() {
                        return None;
                    }

                    let take = remaining.min(self.input.len());
                    self.message.extend_from_slice(&self.input[..take]);
                    self.input.advance(take);

                    self.state = if take == remaining {
                        State::WaitingForHeader
                    } else {
                        State::WaitingForChunk {
                            remaining: remaining - take,
                        }
                    };
                }
            }
        }
    }
}

impl Default for Dechunker {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads whole logical messages from a blocking byte source
pub struct ChunkReader<R: Read> {
    /// Underlying transport
    inner: R,

    /// Reassembly state
    dechunker: Dechunker,

    /// Messages completed by earlier reads but not yet handed out
    ready: VecDeque<Bytes>,

    /// Scratch buffer for transport reads
    read_buf: Vec<u8>,
}

impl<R: Read> ChunkReader<R> {
    /// Create a chunk reader with an 8 KB read buffer
    pub fn new(inner: R) -> Self {
        Self::with_capacity(inner, 8 * 1024)
    }

    /// Create a chunk reader with a custom read buffer size
    pub fn with_capacity(inner: R, capacity: usize) -> Self {
        Self {
            inner,
            dechunker: Dechunker::with_capacity(capacity),
            ready: VecDeque::new(),
            read_buf: vec![0u8; capacity.max(CHUNK_HEADER_SIZE)],
        }
    }

    /// Read the next complete message
    ///
    /// Blocks until a whole message has arrived. Running out of input
    /// before that is a fatal transport error.
    pub fn read_message(&mut self) -> Result<Bytes> {
        loop {
            if let Some(message) = self.ready.pop_front() {
                tracing::trace!("S: {}", hex::encode(&message));
                return Ok(message);
            }

            let n = match self.inner.read(&mut self.read_buf) {
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            if n == 0 {
                return Err(BoltError::ConnectionClosed(if self.dechunker.is_mid_message() {
                    "unexpected end of stream in the middle of a message".to_string()
                } else {
                    "unexpected end of stream while waiting for a message".to_string()
                }));
            }

            let messages = self.dechunker.push(&self.read_buf[..n]);
            self.ready.extend(messages);
        }
    }

    /// Whether a complete message is already buffered, so the next
    /// `read_message` will not block
    pub fn has_buffered_message(&self) -> bool {
        !self.ready.is_empty()
    }

    /// Get a reference to the underlying transport
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Get a mutable reference to the underlying transport
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }
}
