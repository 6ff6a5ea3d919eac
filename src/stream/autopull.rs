//! Auto-pull watermarks
//!
//! Bounds how many records may sit in a stream's buffer. Once more than
//! `high` records are buffered no further PULL is sent ahead of need;
//! once the consumer drains the buffer to `low` or fewer, pulling ahead
//! resumes.
//!
//! ```text
//!   fetch = 1000:   0 ───── 300 (low) ───── 700 (high) ───── 1000
//!                   ◀── enable ──┘            └── disable ──▶
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::FetchSize;

const LOW_WATERMARK_RATIO: f64 = 0.3;
const HIGH_WATERMARK_RATIO: f64 = 0.7;

#[derive(Debug)]
pub struct AutoPull {
    low: usize,
    high: usize,
    enabled: AtomicBool,
}

impl AutoPull {
    pub fn new(fetch_size: FetchSize) -> Self {
        let (low, high) = match fetch_size {
            FetchSize::Limited(n) => (
                (f64::from(n) * LOW_WATERMARK_RATIO) as usize,
                (f64::from(n) * HIGH_WATERMARK_RATIO) as usize,
            ),
            // Everything arrives in one batch; never stop pulling
            FetchSize::All => (usize::MAX, usize::MAX),
        };

        Self {
            low,
            high,
            enabled: AtomicBool::new(true),
        }
    }

    pub fn low_watermark(&self) -> usize {
        self.low
    }

    pub fn high_watermark(&self) -> usize {
        self.high
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Called after a record is buffered; true if this call turned auto-pull off
    pub fn try_disable(&self, buffered: usize) -> bool {
        buffered > self.high
            && self
                .enabled
                .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
    }

    /// Called after a record is consumed; true if this call turned auto-pull on
    pub fn try_enable(&self, buffered: usize) -> bool {
        buffered <= self.low
            && self
                .enabled
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
    }
}
