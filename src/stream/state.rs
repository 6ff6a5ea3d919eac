//! Stream state
//!
//! ```text
//!  AwaitingRunAck ──▶ AwaitingPullAck ◀──▶ Streaming
//!                          ▲                   │ has_more
//!                          │                   ▼
//!                          └────────────── ReadyToPull
//!
//!  any state ──(failure / has_more = false)──▶ Exhausted
//! ```
//!
//! The state is written by whichever thread is processing responses and
//! read by the consumer, so it lives in an atomic.

use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum StreamState {
    /// RUN sent, field names not known yet
    AwaitingRunAck = 0,

    /// Batch finished with more to come, no request outstanding
    ReadyToPull = 1,

    /// PULL or DISCARD sent, nothing received for it yet
    AwaitingPullAck = 2,

    /// Records of the current batch are arriving
    Streaming = 3,

    /// No more records will arrive
    Exhausted = 4,
}

impl StreamState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => StreamState::AwaitingRunAck,
            1 => StreamState::ReadyToPull,
            2 => StreamState::AwaitingPullAck,
            3 => StreamState::Streaming,
            _ => StreamState::Exhausted,
        }
    }
}

/// `StreamState` stored in an `AtomicU8`
pub(crate) struct AtomicState(AtomicU8);

impl AtomicState {
    pub(crate) fn new(state: StreamState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub(crate) fn load(&self) -> StreamState {
        StreamState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn store(&self, state: StreamState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Move from `current` to `next`; false if another thread got there first
    pub(crate) fn transition(&self, current: StreamState, next: StreamState) -> bool {
        self.0
            .compare_exchange(
                current as u8,
                next as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}
