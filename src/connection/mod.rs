//! Connection Module
//!
//! Round-trip plumbing between result streams and the transport.
//!
//! ## Architecture
//! - One `Connection` per open byte stream, shared through an `Arc`
//! - Requests are pipelined; responses are matched to requests by a
//!   FIFO of per-request response handlers
//! - The connection is the `StreamIo` every stream it creates drives

mod connection;
mod handler;

pub use connection::Connection;
pub use handler::{PullResponseHandler, ResponseHandler, RunResponseHandler};
