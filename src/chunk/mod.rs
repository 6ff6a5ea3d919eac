//! Chunk Module
//!
//! Frames logical messages inside the raw byte stream.
//!
//! ## Wire Format
//! ```text
//! ┌──────────┬──────────────┬──────────┬──────────────┬──────────┐
//! │ Len (2)  │   Payload    │ Len (2)  │   Payload    │  0x0000  │
//! └──────────┴──────────────┴──────────┴──────────────┴──────────┘
//!   chunk 1                   chunk 2                   end of message
//! ```
//!
//! - Lengths are big-endian `u16`
//! - A zero length terminates the current message
//! - A zero length with no preceding data is a NOOP (keep-alive) and is skipped
//! - The codec never looks inside payloads

mod reader;
mod writer;

pub use reader::{ChunkReader, Dechunker};
pub use writer::{chunk_message, ChunkWriter};

/// Chunk header size: 2 byte big-endian length
pub const CHUNK_HEADER_SIZE: usize = 2;

/// Largest payload a single chunk can carry
pub const MAX_CHUNK_SIZE: usize = u16::MAX as usize;

/// Smallest configurable outbound chunk payload
pub const MIN_CHUNK_SIZE: usize = 8;

/// End-of-message marker
pub const END_OF_MESSAGE: [u8; CHUNK_HEADER_SIZE] = [0x00, 0x00];
