//! Error types for boltwire
//!
//! Provides a unified error type for all operations, plus the
//! classification used by connection owners to decide whether a
//! connection can be reused after an error.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Result type alias using BoltError
pub type Result<T> = std::result::Result<T, BoltError>;

/// Unified error type for boltwire operations
///
/// Errors are `Clone` because a failed result stream re-raises the same
/// pending error on every read attempt after its buffered records drain.
#[derive(Debug, Clone, Error)]
pub enum BoltError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Server Errors
    // -------------------------------------------------------------------------
    #[error("{0}")]
    Server(ServerError),

    #[error("Request ignored by server after an earlier failure")]
    Ignored,

    // -------------------------------------------------------------------------
    // Result Errors
    // -------------------------------------------------------------------------
    #[error("Result has already been consumed")]
    ResultConsumed,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for BoltError {
    fn from(err: std::io::Error) -> Self {
        BoltError::Io(Arc::new(err))
    }
}

/// Coarse error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The byte stream broke; the connection must be discarded
    Transport,
    /// The codec is out of sync with the peer; the connection must be discarded
    Protocol,
    /// The request was wrong (bad query, consumed result, bad config)
    Client,
    /// The request may succeed if retried
    Transient,
    /// The server failed; the connection must be discarded
    Database,
}

impl BoltError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            BoltError::Io(_) | BoltError::ConnectionClosed(_) => ErrorKind::Transport,
            BoltError::Protocol(_) => ErrorKind::Protocol,
            BoltError::Server(err) => match err.classification {
                Classification::ClientError => ErrorKind::Client,
                Classification::TransientError => ErrorKind::Transient,
                Classification::DatabaseError => ErrorKind::Database,
            },
            BoltError::Ignored | BoltError::ResultConsumed | BoltError::Config(_) => {
                ErrorKind::Client
            }
        }
    }

    /// Whether the connection that produced this error must be discarded
    pub fn is_connection_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Transport | ErrorKind::Protocol | ErrorKind::Database
        )
    }

    /// Shorthand for a protocol error
    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        BoltError::Protocol(message.into())
    }
}

// =============================================================================
// Server Failures
// =============================================================================

/// Classification namespace of a server failure code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    ClientError,
    TransientError,
    DatabaseError,
}

impl Classification {
    /// Parse the classification from a code like `Neo.ClientError.Statement.SyntaxError`
    ///
    /// Anything that is not a client or transient error is treated as a
    /// database error.
    pub fn from_code(code: &str) -> Self {
        match code.split('.').nth(1) {
            Some(part) if part.eq_ignore_ascii_case("ClientError") => Classification::ClientError,
            Some(part) if part.eq_ignore_ascii_case("TransientError") => {
                Classification::TransientError
            }
            _ => Classification::DatabaseError,
        }
    }
}

/// A failure reported by the server for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerError {
    /// Full status code, kept verbatim for diagnostics
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Parsed classification
    pub classification: Classification,
}

impl ServerError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        let classification = Classification::from_code(&code);
        Self {
            code,
            message: message.into(),
            classification,
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}
