//! Response Handlers
//!
//! One handler per request sent, queued in request order. The handler at
//! the front of the queue receives every response until one of them
//! completes its request (SUCCESS, FAILURE or IGNORED).

use std::sync::Arc;

use crate::error::{BoltError, Result, ServerError};
use crate::packstream::{Value, ValueMap};
use crate::stream::ResultStream;

/// Routes the responses of one request to whatever is waiting for them
pub trait ResponseHandler: Send {
    /// Request name, for logs and errors
    fn name(&self) -> &'static str;

    /// Request completed successfully
    fn on_success(&mut self, metadata: ValueMap) -> Result<()>;

    /// One record of the request's result
    fn on_record(&mut self, _values: Vec<Value>) -> Result<()> {
        Err(BoltError::protocol(format!(
            "unexpected RECORD in response to {}",
            self.name()
        )))
    }

    /// Request failed on the server
    fn on_failure(&mut self, error: ServerError);

    /// Request skipped by the server after an earlier failure
    fn on_ignored(&mut self);

    /// The connection broke before the request completed
    fn on_error(&mut self, error: &BoltError);
}

// =============================================================================
// RUN
// =============================================================================

pub struct RunResponseHandler {
    stream: Arc<ResultStream>,
}

impl RunResponseHandler {
    pub fn new(stream: Arc<ResultStream>) -> Self {
        Self { stream }
    }
}

impl ResponseHandler for RunResponseHandler {
    fn name(&self) -> &'static str {
        "RUN"
    }

    fn on_success(&mut self, metadata: ValueMap) -> Result<()> {
        self.stream.run_completed(&metadata)
    }

    fn on_failure(&mut self, error: ServerError) {
        self.stream.fail(BoltError::Server(error));
    }

    fn on_ignored(&mut self) {
        self.stream.ignored();
    }

    fn on_error(&mut self, error: &BoltError) {
        self.stream.fail(error.clone());
    }
}

// =============================================================================
// PULL / DISCARD
// =============================================================================

pub struct PullResponseHandler {
    stream: Arc<ResultStream>,
    name: &'static str,
}

impl PullResponseHandler {
    pub fn pull(stream: Arc<ResultStream>) -> Self {
        Self {
            stream,
            name: "PULL",
        }
    }

    /// A DISCARD completes like a PULL that carries no records
    pub fn discard(stream: Arc<ResultStream>) -> Self {
        Self {
            stream,
            name: "DISCARD",
        }
    }
}

impl ResponseHandler for PullResponseHandler {
    fn name(&self) -> &'static str {
        self.name
    }

    fn on_success(&mut self, metadata: ValueMap) -> Result<()> {
        self.stream.pull_completed(&metadata)
    }

    fn on_record(&mut self, values: Vec<Value>) -> Result<()> {
        if self.name == "DISCARD" {
            return Err(BoltError::protocol("unexpected RECORD in response to DISCARD"));
        }
        self.stream.push_record(values)
    }

    fn on_failure(&mut self, error: ServerError) {
        self.stream.fail(BoltError::Server(error));
    }

    fn on_ignored(&mut self) {
        self.stream.ignored();
    }

    fn on_error(&mut self, error: &BoltError) {
        self.stream.fail(error.clone());
    }
}
