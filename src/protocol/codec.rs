//! Protocol codec
//!
//! Encoding and decoding functions for Bolt messages.
//!
//! ## Wire Format
//!
//! Every message is one PackStream struct, carried in chunks:
//! ```text
//! ┌────────────┬───────────┬──────────────────────────────┐
//! │ B0|fields  │ Sig (1)   │ field 0 .. field n-1         │
//! └────────────┴───────────┴──────────────────────────────┘
//! ```
//!
//! ### Requests
//! - 0x10: RUN     - Fields: query, parameters, extra {db}
//! - 0x3F: PULL    - Fields: {n, qid}
//! - 0x2F: DISCARD - Fields: {n, qid}
//!
//! ### Responses
//! - 0x70: SUCCESS - Fields: metadata
//! - 0x71: RECORD  - Fields: values
//! - 0x7E: IGNORED - Fields: none
//! - 0x7F: FAILURE - Fields: {code, message}

use std::io::Read;

use bytes::{Bytes, BytesMut};

use super::{MessageFormat, Request, Response};
use crate::chunk::ChunkReader;
use crate::error::{BoltError, Result};
use crate::packstream::{Packer, StructRegistry, Unpacker, Value};

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request to an unchunked message payload
pub fn encode_request(format: &MessageFormat, request: &Request) -> Result<Bytes> {
    encode_struct(format, request.request_type() as u8, &request.fields())
}

/// Decode a request from one complete message payload
pub fn decode_request(format: &MessageFormat, bytes: Bytes) -> Result<Request> {
    decode_struct(format, format.request_registry(), bytes)
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to an unchunked message payload
pub fn encode_response(format: &MessageFormat, response: &Response) -> Result<Bytes> {
    encode_struct(format, response.response_type() as u8, &response.fields())
}

/// Decode a response from one complete message payload
pub fn decode_response(format: &MessageFormat, bytes: Bytes) -> Result<Response> {
    decode_struct(format, format.response_registry(), bytes)
}

fn encode_struct(format: &MessageFormat, signature: u8, fields: &[Value]) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(64);
    let mut packer = Packer::new(&mut buf, format.version());
    packer.pack_struct_header(fields.len(), signature)?;
    for field in fields {
        packer.pack(field)?;
    }
    Ok(buf.freeze())
}

/// A message is exactly one struct; trailing bytes mean the codec is out of sync
fn decode_struct<T>(
    format: &MessageFormat,
    registry: &StructRegistry<T>,
    bytes: Bytes,
) -> Result<T> {
    let mut unpacker = Unpacker::new(bytes, format.value_registry());
    let message = unpacker.unpack_struct(registry)?;

    if unpacker.remaining() != 0 {
        return Err(BoltError::protocol(format!(
            "{} unexpected bytes after message",
            unpacker.remaining()
        )));
    }
    Ok(message)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete response from a stream
///
/// Blocks until a complete message is received or an error occurs
pub fn read_response<R: Read>(
    reader: &mut ChunkReader<R>,
    format: &MessageFormat,
) -> Result<Response> {
    let message = reader.read_message()?;
    let response = decode_response(format, message)?;
    tracing::debug!("S: {:?}", response);
    Ok(response)
}
