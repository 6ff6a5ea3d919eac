//! Protocol Module
//!
//! Bolt messages on top of PackStream.
//!
//! ## Message Flow (one query)
//! ```text
//!   client                         server
//!     │── RUN  {query, params} ──────▶│
//!     │── PULL {n: 1000} ────────────▶│   (pipelined, one flush)
//!     │◀──────────── SUCCESS {fields} │
//!     │◀──────────── RECORD [..] x N  │
//!     │◀──────── SUCCESS {has_more}   │
//!     │── PULL / DISCARD ────────────▶│   (repeat while has_more)
//! ```
//!
//! ### Request Types
//! - 0x10: RUN
//! - 0x3F: PULL
//! - 0x2F: DISCARD
//!
//! ### Response Types
//! - 0x70: SUCCESS
//! - 0x71: RECORD
//! - 0x7E: IGNORED
//! - 0x7F: FAILURE

mod codec;
mod message_format;
mod request;
mod response;
mod version;

pub use codec::{decode_request, decode_response, encode_request, encode_response, read_response};
pub use message_format::MessageFormat;
pub use request::{Request, RequestType, LAST_QUERY_ID};
pub use response::{Response, ResponseType};
pub use version::ProtocolVersion;
