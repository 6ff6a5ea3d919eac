//! Stream Module
//!
//! Flow-controlled result streaming.
//!
//! ## Architecture
//! ```text
//! ┌──────────────┐  next / peek / keys / consume / cancel
//! │ ResultCursor │◀──────────────────────────────── consumer
//! └──────┬───────┘
//!        ▼
//! ┌──────────────┐  pull / discard / receive   ┌────────────┐
//! │ ResultStream │ ──────────────────────────▶ │  StreamIo  │
//! │  SegQueue    │ ◀────────────────────────── │ (handlers) │
//! └──────────────┘  run_completed / push_record└────────────┘
//!                   pull_completed / fail
//! ```
//!
//! The record buffer is bounded by the auto-pull watermarks: no PULL is
//! sent ahead of need while more than 70% of a batch is still buffered.

mod autopull;
mod cursor;
mod notification;
mod plan;
mod record;
mod result_stream;
mod state;
mod summary;

pub use autopull::AutoPull;
pub use cursor::ResultCursor;
pub use notification::{InputPosition, Notification};
pub use plan::{Plan, ProfiledPlan};
pub use record::Record;
pub use result_stream::{ResultStream, StreamIo};
pub use state::StreamState;
pub use summary::{Counters, QueryType, ResultSummary, ServerInfo};
