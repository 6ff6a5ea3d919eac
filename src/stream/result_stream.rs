//! Result Stream
//!
//! The per-query engine behind a cursor.
//!
//! ## Roles
//! - **Producer**: response handlers on the connection call the event
//!   methods (`run_completed`, `push_record`, `pull_completed`, `fail`,
//!   `ignored`). They run on whichever thread is reading responses,
//!   which may be another cursor's consumer.
//! - **Consumer**: the owning cursor calls `next_record`, `keys`,
//!   `consume` and `cancel`. When it needs data that has not arrived it
//!   asks the [`StreamIo`] for one more round trip.
//!
//! ## Concurrency Model
//! - Record buffer: lock-free `SegQueue`
//! - State and flags: atomics, transitions by compare-and-set
//! - Keys, pending error, summary: short `parking_lot` critical sections
//!   that never span a call into the `StreamIo`
//!
//! The stream holds its `StreamIo` weakly. The connection owns the
//! handlers that point at the stream, so a strong link back would keep
//! both alive after every user handle is gone.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Weak};

use crossbeam::queue::SegQueue;
use parking_lot::Mutex;

use super::autopull::AutoPull;
use super::record::Record;
use super::state::{AtomicState, StreamState};
use super::summary::{ResultSummary, ServerInfo, SummaryCollector};
use crate::config::FetchSize;
use crate::error::{BoltError, Result};
use crate::packstream::{Value, ValueMap};
use crate::protocol::LAST_QUERY_ID;

/// Network round trips a stream needs from its connection
pub trait StreamIo: Send + Sync {
    /// Send a PULL for `n` more records (`-1` = all) and register the
    /// stream to receive its responses
    fn pull(&self, stream: &Arc<ResultStream>, qid: i64, n: i64) -> Result<()>;

    /// Send a DISCARD for `n` more records (`-1` = all)
    fn discard(&self, stream: &Arc<ResultStream>, qid: i64, n: i64) -> Result<()>;

    /// Block until at least one outstanding response has been processed
    ///
    /// Returns immediately when nothing is outstanding; another thread may
    /// already have processed the caller's responses.
    fn receive(&self) -> Result<()>;

    /// Server the responses come from, if known
    fn server_info(&self) -> Option<ServerInfo> {
        None
    }
}

pub struct ResultStream {
    // -------------------------------------------------------------------------
    // Query
    // -------------------------------------------------------------------------
    query: String,
    parameters: ValueMap,
    fetch_size: FetchSize,
    io: Weak<dyn StreamIo>,
    server: Option<ServerInfo>,

    // -------------------------------------------------------------------------
    // Flow control
    // -------------------------------------------------------------------------
    state: AtomicState,
    auto_pull: AutoPull,
    cancelled: AtomicBool,
    qid: AtomicI64,

    // -------------------------------------------------------------------------
    // Results
    // -------------------------------------------------------------------------
    records: SegQueue<Record>,
    keys: Mutex<Option<Arc<[String]>>>,
    summary: Mutex<SummaryCollector>,
    pending_error: Mutex<Option<BoltError>>,

    /// Outcome of the first `consume`, replayed by later calls
    consumed: Mutex<Option<Result<ResultSummary>>>,
}

impl ResultStream {
    /// Create the stream for a query whose RUN and first PULL are already sent
    pub fn new(
        query: impl Into<String>,
        parameters: ValueMap,
        fetch_size: FetchSize,
        io: Weak<dyn StreamIo>,
    ) -> Arc<Self> {
        let server = io.upgrade().and_then(|io| io.server_info());
        Arc::new(Self {
            query: query.into(),
            parameters,
            fetch_size,
            io,
            server,
            state: AtomicState::new(StreamState::AwaitingRunAck),
            auto_pull: AutoPull::new(fetch_size),
            cancelled: AtomicBool::new(false),
            qid: AtomicI64::new(LAST_QUERY_ID),
            records: SegQueue::new(),
            keys: Mutex::new(None),
            summary: Mutex::new(SummaryCollector::default()),
            pending_error: Mutex::new(None),
            consumed: Mutex::new(None),
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn state(&self) -> StreamState {
        self.state.load()
    }

    /// Records received but not yet consumed
    pub fn buffered(&self) -> usize {
        self.records.len()
    }

    pub fn is_auto_pull_enabled(&self) -> bool {
        self.auto_pull.is_enabled()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed.lock().is_some()
    }

    // =========================================================================
    // Producer Events
    // =========================================================================

    /// RUN acknowledged: capture field names and query id
    pub fn run_completed(&self, metadata: &ValueMap) -> Result<()> {
        let fields = match metadata.get("fields") {
            Some(Value::List(fields)) => fields
                .iter()
                .map(|field| {
                    field.as_str().map(str::to_string).ok_or_else(|| {
                        BoltError::protocol(format!(
                            "field name must be a String, got {}",
                            field.type_name()
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(BoltError::protocol(format!(
                    "RUN metadata 'fields' must be a List, got {}",
                    other.type_name()
                )))
            }
            None => Vec::new(),
        };

        if let Some(qid) = metadata.get("qid").and_then(Value::as_int) {
            self.qid.store(qid, Ordering::Release);
        }
        self.summary.lock().collect_run(metadata);
        *self.keys.lock() = Some(fields.into());

        // The first PULL always travels with the RUN
        if self
            .state
            .transition(StreamState::AwaitingRunAck, StreamState::AwaitingPullAck)
        {
            tracing::debug!("Run acknowledged for query {:?}", self.query);
        }
        Ok(())
    }

    /// Buffer one record of the current batch
    ///
    /// A record whose width differs from the field list means the codec is
    /// out of sync with the server.
    pub fn push_record(&self, values: Vec<Value>) -> Result<()> {
        let keys = self
            .keys
            .lock()
            .clone()
            .ok_or_else(|| BoltError::protocol("RECORD received before the RUN was acknowledged"))?;

        if keys.len() != values.len() {
            return Err(BoltError::protocol(format!(
                "RECORD has {} values but the result has {} fields",
                values.len(),
                keys.len()
            )));
        }

        self.records.push(Record::new(keys, values));
        self.state
            .transition(StreamState::AwaitingPullAck, StreamState::Streaming);

        if self.auto_pull.try_disable(self.records.len()) {
            tracing::debug!(
                "Auto-pull disabled with {} records buffered",
                self.records.len()
            );
        }
        Ok(())
    }

    /// PULL or DISCARD acknowledged
    ///
    /// Fails when the final metadata carries a malformed plan or
    /// notification list.
    pub fn pull_completed(&self, metadata: &ValueMap) -> Result<()> {
        let has_more = metadata
            .get("has_more")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if has_more {
            self.state.store(StreamState::ReadyToPull);
        } else {
            self.summary.lock().collect_final(metadata)?;
            self.state.store(StreamState::Exhausted);
            tracing::debug!("Result exhausted for query {:?}", self.query);
        }
        Ok(())
    }

    /// Request failed; keep the error until the buffer is drained
    pub fn fail(&self, error: BoltError) {
        {
            let mut pending = self.pending_error.lock();
            if pending.is_none() {
                tracing::debug!("Query {:?} failed: {}", self.query, error);
                *pending = Some(error);
            }
        }
        self.state.store(StreamState::Exhausted);
    }

    /// Request ignored after an earlier failure on the connection
    pub fn ignored(&self) {
        if self.state() != StreamState::Exhausted {
            self.fail(BoltError::Ignored);
        }
    }

    // =========================================================================
    // Consumer Operations
    // =========================================================================

    /// Next record in server order, or `None` once the result is exhausted
    ///
    /// Taking a record may send the next PULL ahead of need when the
    /// buffer has drained to the low watermark.
    pub fn next_record(self: &Arc<Self>) -> Result<Option<Record>> {
        self.ensure_not_consumed()?;

        while self.records.is_empty() && self.state() != StreamState::Exhausted {
            self.advance()?;
        }

        let Some(record) = self.records.pop() else {
            return match self.pending_error.lock().clone() {
                Some(error) => Err(error),
                None => Ok(None),
            };
        };

        self.auto_pull.try_enable(self.records.len());
        if self.auto_pull.is_enabled() {
            // A failed request is kept as pending; this record is still delivered
            if let Err(error) = self.request_more() {
                tracing::debug!("Prefetch for query {:?} failed: {}", self.query, error);
            }
        }
        Ok(Some(record))
    }

    /// Field names; blocks until the RUN is acknowledged
    pub fn keys(self: &Arc<Self>) -> Result<Arc<[String]>> {
        self.ensure_not_consumed()?;

        loop {
            if let Some(keys) = self.keys.lock().clone() {
                return Ok(keys);
            }
            if self.state() == StreamState::Exhausted {
                return match self.pending_error.lock().clone() {
                    Some(error) => Err(error),
                    None => Ok(Arc::from(Vec::new())),
                };
            }
            self.advance()?;
        }
    }

    /// Turn the next PULL into a DISCARD; buffered records stay readable
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            tracing::debug!("Cancelling query {:?}", self.query);
        }
    }

    /// Discard the rest of the result and return its summary
    ///
    /// Only the first call touches the network; later calls return the
    /// same outcome.
    pub fn consume(self: &Arc<Self>) -> Result<ResultSummary> {
        if let Some(outcome) = self.consumed.lock().clone() {
            return outcome;
        }

        self.cancel();
        let outcome = self.drain().and_then(|_| {
            match self.pending_error.lock().clone() {
                Some(error) => Err(error),
                None => Ok(self
                    .summary
                    .lock()
                    .build(&self.query, &self.parameters, self.server.clone())),
            }
        });

        *self.consumed.lock() = Some(outcome.clone());
        outcome
    }

    fn drain(self: &Arc<Self>) -> Result<()> {
        loop {
            while self.records.pop().is_some() {}
            if self.state() == StreamState::Exhausted {
                return Ok(());
            }
            self.advance()?;
        }
    }

    fn ensure_not_consumed(&self) -> Result<()> {
        if self.is_consumed() {
            return Err(BoltError::ResultConsumed);
        }
        Ok(())
    }

    // =========================================================================
    // Round Trips
    // =========================================================================

    /// Make progress: request the next batch if due, then process responses
    fn advance(self: &Arc<Self>) -> Result<()> {
        self.request_more()?;

        if self.state() != StreamState::Exhausted {
            if let Err(error) = self.io().and_then(|io| io.receive()) {
                return Err(self.fail_fatal(error));
            }
        }
        Ok(())
    }

    /// Send PULL (or DISCARD once cancelled) if the previous batch is done
    fn request_more(self: &Arc<Self>) -> Result<()> {
        if !self
            .state
            .transition(StreamState::ReadyToPull, StreamState::AwaitingPullAck)
        {
            return Ok(());
        }

        let qid = self.qid.load(Ordering::Acquire);
        let sent = self.io().and_then(|io| {
            if self.is_cancelled() {
                io.discard(self, qid, -1)
            } else {
                io.pull(self, qid, self.fetch_size.as_wire())
            }
        });

        sent.map_err(|error| self.fail_fatal(error))
    }

    fn io(&self) -> Result<Arc<dyn StreamIo>> {
        self.io.upgrade().ok_or_else(|| {
            BoltError::ConnectionClosed("the connection behind this result is gone".to_string())
        })
    }

    fn fail_fatal(&self, error: BoltError) -> BoltError {
        self.fail(error.clone());
        error
    }
}
