//! Result Cursor
//!
//! Consumer-facing handle over one query's [`ResultStream`].

use std::sync::Arc;

use super::record::Record;
use super::result_stream::ResultStream;
use super::summary::ResultSummary;
use crate::error::{BoltError, Result};

/// Pull-style reader over a query result
///
/// Also an `Iterator<Item = Result<Record>>` that stops after the first
/// error.
pub struct ResultCursor {
    stream: Arc<ResultStream>,

    /// Record taken from the stream by `peek` but not yet returned by `next`
    peeked: Option<Record>,

    /// Set once the iterator has yielded an error
    failed: bool,
}

impl ResultCursor {
    pub fn new(stream: Arc<ResultStream>) -> Self {
        Self {
            stream,
            peeked: None,
            failed: false,
        }
    }

    /// Next record, or `None` at the end of the result
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<Record>> {
        self.ensure_not_consumed()?;
        if let Some(record) = self.peeked.take() {
            return Ok(Some(record));
        }
        self.stream.next_record()
    }

    /// Look at the next record without consuming it
    pub fn peek(&mut self) -> Result<Option<&Record>> {
        self.ensure_not_consumed()?;
        if self.peeked.is_none() {
            self.peeked = self.stream.next_record()?;
        }
        Ok(self.peeked.as_ref())
    }

    /// Field names of the result
    pub fn keys(&self) -> Result<Arc<[String]>> {
        self.stream.keys()
    }

    /// Discard the remaining records and return the summary
    pub fn consume(&mut self) -> Result<ResultSummary> {
        self.peeked = None;
        self.stream.consume()
    }

    /// Ask the server to drop the rest of the result
    pub fn cancel(&self) {
        self.stream.cancel();
    }

    pub fn is_consumed(&self) -> bool {
        self.stream.is_consumed()
    }

    pub fn stream(&self) -> &Arc<ResultStream> {
        &self.stream
    }

    fn ensure_not_consumed(&self) -> Result<()> {
        if self.stream.is_consumed() {
            return Err(BoltError::ResultConsumed);
        }
        Ok(())
    }
}

impl Iterator for ResultCursor {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = ResultCursor::next(self).transpose();
        if matches!(item, Some(Err(_))) {
            self.failed = true;
        }
        item
    }
}
