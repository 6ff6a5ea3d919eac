//! Chunk Writer
//!
//! Splits serialized messages into length-prefixed chunks and buffers
//! them until the connection flushes.

use std::io::Write;

use bytes::{BufMut, Bytes, BytesMut};

use super::{CHUNK_HEADER_SIZE, END_OF_MESSAGE, MAX_CHUNK_SIZE, MIN_CHUNK_SIZE};
use crate::config::Config;
use crate::error::{BoltError, Result};

/// Chunk a single message into a standalone buffer
///
/// Format: (len (2) + payload)* + 0x0000
pub fn chunk_message(payload: &[u8], max_chunk_size: usize) -> Bytes {
    let mut out = BytesMut::with_capacity(chunked_len(payload.len(), max_chunk_size));
    put_chunks(&mut out, payload, max_chunk_size);
    out.freeze()
}

/// Exact encoded size of a payload once chunked
fn chunked_len(payload_len: usize, max_chunk_size: usize) -> usize {
    let chunks = payload_len.div_ceil(max_chunk_size);
    payload_len + chunks * CHUNK_HEADER_SIZE + END_OF_MESSAGE.len()
}

fn put_chunks(out: &mut BytesMut, payload: &[u8], max_chunk_size: usize) {
    for chunk in payload.chunks(max_chunk_size) {
        out.put_u16(chunk.len() as u16);
        out.put_slice(chunk);
    }
    out.put_slice(&END_OF_MESSAGE);
}

/// Buffers chunked messages for a single atomic flush
///
/// Several messages may be written before a flush; this is how requests
/// are pipelined (e.g. RUN immediately followed by PULL).
pub struct ChunkWriter {
    /// Max payload bytes per chunk
    max_chunk_size: usize,

    /// Chunked bytes waiting for the next flush
    buffer: BytesMut,

    /// Capacity the buffer starts with and is shrunk back to
    default_capacity: usize,

    /// Capacity above which the buffer is shrunk after a flush
    max_capacity: usize,

    /// Number of times the buffer has been shrunk (diagnostics)
    shrink_count: usize,
}

impl ChunkWriter {
    /// Create a chunk writer with the given max chunk size and default buffers
    pub fn new(max_chunk_size: usize) -> Result<Self> {
        let defaults = Config::default();
        Self::with_buffer_sizes(
            max_chunk_size,
            defaults.default_write_buffer_size,
            defaults.max_write_buffer_size,
        )
    }

    /// Create a chunk writer from a connection config
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_buffer_sizes(
            config.max_chunk_size,
            config.default_write_buffer_size,
            config.max_write_buffer_size,
        )
    }

    /// Create a chunk writer with explicit buffer sizing
    pub fn with_buffer_sizes(
        max_chunk_size: usize,
        default_capacity: usize,
        max_capacity: usize,
    ) -> Result<Self> {
        if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&max_chunk_size) {
            return Err(BoltError::Config(format!(
                "chunk size must be between {} and {}, got {}",
                MIN_CHUNK_SIZE, MAX_CHUNK_SIZE, max_chunk_size
            )));
        }

        Ok(Self {
            max_chunk_size,
            buffer: BytesMut::with_capacity(default_capacity),
            default_capacity,
            max_capacity: max_capacity.max(default_capacity),
            shrink_count: 0,
        })
    }

    /// Append one complete message (chunks + terminator) to the buffer
    ///
    /// The payload must be non-empty: an empty message would be
    /// indistinguishable from a NOOP on the wire.
    pub fn write_message(&mut self, payload: &[u8]) {
        debug_assert!(!payload.is_empty(), "empty messages cannot be framed");
        self.buffer
            .reserve(chunked_len(payload.len(), self.max_chunk_size));
        put_chunks(&mut self.buffer, payload, self.max_chunk_size);
    }

    /// Bytes written but not yet flushed
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Whether there is anything to flush
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Max payload bytes per chunk
    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Number of times the buffer was shrunk after growing too large
    pub fn shrink_count(&self) -> usize {
        self.shrink_count
    }

    /// Hand every buffered message to the transport in one write
    ///
    /// The buffer is emptied even if the write fails; a failed flush
    /// leaves the connection unusable either way.
    pub fn flush<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let out = self.buffer.split();
        tracing::trace!("C: {}", hex::encode(&out));

        let result = writer.write_all(&out).and_then(|_| writer.flush());
        self.release(out);
        result.map_err(BoltError::from)
    }

    fn release(&mut self, mut spent: BytesMut) {
        if spent.capacity() + self.buffer.capacity() > self.max_capacity {
            tracing::info!(
                "Shrinking write buffer to {} bytes after it reached {} bytes ({} times so far)",
                self.default_capacity,
                spent.capacity(),
                self.shrink_count
            );
            self.shrink_count += 1;
            self.buffer = BytesMut::with_capacity(self.default_capacity);
            return;
        }

        // The buffer is empty here, so this hands the spent allocation back to it
        spent.clear();
        self.buffer.unsplit(spent);
    }
}
