//! Connection
//!
//! Client side of one Bolt connection over an already-open, already
//! negotiated byte stream.
//!
//! ## Request Pipeline
//! ```text
//!   run()  ──▶ RUN + PULL ──▶ ChunkWriter ──flush──▶ stream
//!              │
//!              ▼
//!   handlers: [Run(q1), Pull(q1), Run(q2), Pull(q2), ...]
//!              ▲
//!   receive() ─┴── ChunkReader ◀── stream
//! ```
//!
//! Responses arrive strictly in request order, so the handler at the
//! front of the queue always owns the next response.
//!
//! Cursors only hold the connection weakly. Dropping the last
//! `Arc<Connection>`, or calling [`Connection::close`], releases the
//! transport even while results are still open.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::handler::{PullResponseHandler, ResponseHandler, RunResponseHandler};
use crate::chunk::{ChunkReader, ChunkWriter};
use crate::config::Config;
use crate::error::{BoltError, Classification, Result};
use crate::packstream::ValueMap;
use crate::protocol::{
    encode_request, read_response, MessageFormat, ProtocolVersion, Request, Response,
    LAST_QUERY_ID,
};
use crate::stream::{ResultCursor, ResultStream, ServerInfo, StreamIo};

/// A client connection shared by every cursor it created
pub struct Connection<S: Read + Write> {
    /// Reader, writer and handler queue; one round trip at a time
    inner: Mutex<Inner<S>>,

    /// Registries for the negotiated version
    format: MessageFormat,

    config: Config,

    /// Product and version reported by the server, recorded by the owner
    server_agent: Mutex<Option<String>>,

    /// Set once the connection must not be reused
    defunct: AtomicBool,
}

struct Inner<S: Read + Write> {
    /// None once closed
    channel: Option<Channel<S>>,

    /// One handler per request awaiting its final response
    handlers: VecDeque<Box<dyn ResponseHandler>>,
}

struct Channel<S: Read + Write> {
    /// Owns the transport; writes go through `get_mut`
    reader: ChunkReader<S>,

    writer: ChunkWriter,
}

impl<S: Read + Write + Send + 'static> Connection<S> {
    /// Wrap an open stream that has already negotiated `version`
    pub fn new(stream: S, version: ProtocolVersion, config: &Config) -> Result<Arc<Self>> {
        config.validate()?;
        let format = MessageFormat::new(version)?;
        let writer = ChunkWriter::from_config(config)?;
        let reader = ChunkReader::with_capacity(stream, config.default_read_buffer_size);

        tracing::debug!("Connection created for protocol {}", version);

        Ok(Arc::new(Self {
            inner: Mutex::new(Inner {
                channel: Some(Channel { reader, writer }),
                handlers: VecDeque::new(),
            }),
            format,
            config: config.clone(),
            server_agent: Mutex::new(None),
            defunct: AtomicBool::new(false),
        }))
    }

    pub fn version(&self) -> ProtocolVersion {
        self.format.version()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether the owner must discard this connection
    pub fn is_defunct(&self) -> bool {
        self.defunct.load(Ordering::Acquire)
    }

    /// Requests still waiting for their final response
    pub fn pending_responses(&self) -> usize {
        self.inner.lock().handlers.len()
    }

    /// Record the server agent from the handshake; carried into summaries
    /// of results started afterwards
    pub fn set_server_agent(&self, agent: impl Into<String>) {
        *self.server_agent.lock() = Some(agent.into());
    }

    pub fn server_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: self.version(),
            agent: self.server_agent.lock().clone(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().channel.is_none()
    }

    /// Fail every outstanding request and drop the transport
    ///
    /// Results already buffered stay readable; anything that still needs
    /// the network fails with `ConnectionClosed`. Closing twice is a no-op.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        if inner.channel.is_none() {
            return;
        }

        tracing::debug!(
            "Closing connection with {} requests outstanding",
            inner.handlers.len()
        );
        let error = BoltError::ConnectionClosed("connection was closed".to_string());
        self.break_connection(&mut inner, error);
        inner.channel = None;
    }

    /// Run a query; the RUN and its first PULL go out in one flush
    pub fn run(self: &Arc<Self>, query: &str, parameters: ValueMap) -> Result<ResultCursor> {
        if self.is_defunct() {
            return Err(BoltError::ConnectionClosed(
                "connection is defunct and cannot run queries".to_string(),
            ));
        }

        let io: Arc<dyn StreamIo> = self.clone();
        let stream = ResultStream::new(
            query,
            parameters.clone(),
            self.config.fetch_size,
            Arc::downgrade(&io),
        );

        let run = Request::run(query, parameters, self.config.database.clone());
        let pull = Request::Pull {
            n: self.config.fetch_size.as_wire(),
            qid: LAST_QUERY_ID,
        };

        let mut inner = self.inner.lock();
        let sent = self.send(
            &mut inner,
            &[run, pull],
            vec![
                Box::new(RunResponseHandler::new(stream.clone())) as Box<dyn ResponseHandler>,
                Box::new(PullResponseHandler::pull(stream.clone())),
            ],
        );
        drop(inner);

        sent.map(|_| ResultCursor::new(stream))
    }

    /// Process responses until every request sent so far has completed
    pub fn sync(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        while !inner.handlers.is_empty() {
            self.receive_one(&mut inner)?;
        }
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Buffer requests, queue their handlers, flush once
    ///
    /// Requests are encoded before anything is buffered, so a value that
    /// cannot be encoded fails the call without touching the connection.
    fn send(
        &self,
        inner: &mut Inner<S>,
        requests: &[Request],
        handlers: Vec<Box<dyn ResponseHandler>>,
    ) -> Result<()> {
        let payloads = requests
            .iter()
            .map(|request| encode_request(&self.format, request))
            .collect::<Result<Vec<_>>>()?;

        let Some(Channel { reader, writer }) = inner.channel.as_mut() else {
            return Err(closed());
        };

        for (request, payload) in requests.iter().zip(&payloads) {
            tracing::debug!("C: {:?}", request);
            writer.write_message(payload);
        }
        let flushed = writer.flush(reader.get_mut());
        inner.handlers.extend(handlers);

        if let Err(error) = flushed {
            return Err(self.break_connection(inner, error));
        }
        Ok(())
    }

    /// Read one response and hand it to the front handler
    fn receive_one(&self, inner: &mut Inner<S>) -> Result<()> {
        if inner.handlers.is_empty() {
            return Err(BoltError::protocol(
                "waiting for a response with no request outstanding",
            ));
        }

        let Some(channel) = inner.channel.as_mut() else {
            return Err(closed());
        };
        let response = match read_response(&mut channel.reader, &self.format) {
            Ok(response) => response,
            Err(error) => return Err(self.break_connection(inner, error)),
        };

        if let Err(error) = self.dispatch(inner, response) {
            return Err(self.break_connection(inner, error));
        }
        Ok(())
    }

    fn dispatch(&self, inner: &mut Inner<S>, response: Response) -> Result<()> {
        let Some(handler) = inner.handlers.front_mut() else {
            return Err(BoltError::protocol(format!(
                "{} with no request outstanding",
                response.name()
            )));
        };

        match response {
            // Records never complete a request; the handler stays in front
            Response::Record(values) => return handler.on_record(values),
            Response::Success(metadata) => handler.on_success(metadata)?,
            Response::Failure(error) => {
                if error.classification == Classification::DatabaseError {
                    tracing::warn!("Database error, connection marked defunct: {}", error);
                    self.defunct.store(true, Ordering::Release);
                }
                handler.on_failure(error);
            }
            Response::Ignored => handler.on_ignored(),
        }

        inner.handlers.pop_front();
        Ok(())
    }

    /// Fail every outstanding request and mark the connection defunct
    fn break_connection(&self, inner: &mut Inner<S>, error: BoltError) -> BoltError {
        tracing::warn!("Connection marked defunct: {}", error);
        self.defunct.store(true, Ordering::Release);

        for mut handler in inner.handlers.drain(..) {
            handler.on_error(&error);
        }
        error
    }
}

impl<S: Read + Write + Send + 'static> StreamIo for Connection<S> {
    fn pull(&self, stream: &Arc<ResultStream>, qid: i64, n: i64) -> Result<()> {
        let mut inner = self.inner.lock();
        self.send(
            &mut inner,
            &[Request::Pull { n, qid }],
            vec![Box::new(PullResponseHandler::pull(stream.clone())) as Box<dyn ResponseHandler>],
        )
    }

    fn discard(&self, stream: &Arc<ResultStream>, qid: i64, n: i64) -> Result<()> {
        let mut inner = self.inner.lock();
        self.send(
            &mut inner,
            &[Request::Discard { n, qid }],
            vec![Box::new(PullResponseHandler::discard(stream.clone())) as Box<dyn ResponseHandler>],
        )
    }

    /// Blocks for one response, then also handles any already buffered
    ///
    /// Whoever held the lock before may have drained the queue, including
    /// the caller's own responses; that counts as progress.
    fn receive(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.handlers.is_empty() {
            return Ok(());
        }

        self.receive_one(&mut inner)?;
        while !inner.handlers.is_empty() && has_buffered_message(&inner) {
            self.receive_one(&mut inner)?;
        }
        Ok(())
    }

    fn server_info(&self) -> Option<ServerInfo> {
        Some(Connection::server_info(self))
    }
}

fn has_buffered_message<S: Read + Write>(inner: &Inner<S>) -> bool {
    inner
        .channel
        .as_ref()
        .is_some_and(|channel| channel.reader.has_buffered_message())
}

fn closed() -> BoltError {
    BoltError::ConnectionClosed("connection is closed".to_string())
}
