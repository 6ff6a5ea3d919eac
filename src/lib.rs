//! # boltwire
//!
//! Transport, codec and result streaming core of a graph database driver:
//! - Chunked framing of logical messages
//! - PackStream value encoding with per-version struct layouts
//! - Flow-controlled result streaming with auto-pull watermarks
//! - Pipelined request/response plumbing over any `Read + Write`
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       ResultCursor                          │
//! │            (next / peek / keys / consume / cancel)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       ResultStream                          │
//! │         (state machine, record buffer, watermarks)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ StreamIo
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Connection                           │
//! │              (request pipeline, handler FIFO)               │
//! └──────────┬─────────────────────────────────┬────────────────┘
//!            │                                 │
//!            ▼                                 ▼
//!   ┌─────────────────┐               ┌─────────────────┐
//!   │    Protocol     │               │      Chunk      │
//!   │ (RUN/PULL/...)  │               │ (frame codec)   │
//!   └────────┬────────┘               └─────────────────┘
//!            ▼
//!   ┌─────────────────┐
//!   │   PackStream    │
//!   │ (value codec)   │
//!   └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod chunk;
pub mod connection;
pub mod packstream;
pub mod protocol;
pub mod stream;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{Config, FetchSize};
pub use connection::Connection;
pub use error::{BoltError, ErrorKind, Result};
pub use packstream::{Value, ValueMap};
pub use protocol::ProtocolVersion;
pub use stream::{Record, ResultCursor, ResultSummary};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of boltwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
