//! Request definitions
//!
//! The client messages needed to run a query and stream its result.

use crate::error::Result;
use crate::packstream::{Fields, Value, ValueMap};

/// Request signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RequestType {
    Run = 0x10,
    Discard = 0x2F,
    Pull = 0x3F,
}

/// Query id meaning "the most recent query on this connection"
pub const LAST_QUERY_ID: i64 = -1;

/// A client request
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Start a query
    Run {
        query: String,
        parameters: ValueMap,
        database: Option<String>,
    },

    /// Fetch up to `n` more records (`-1` = all)
    Pull { n: i64, qid: i64 },

    /// Throw away up to `n` more records (`-1` = all)
    Discard { n: i64, qid: i64 },
}

impl Request {
    pub fn run(query: impl Into<String>, parameters: ValueMap, database: Option<String>) -> Self {
        Request::Run {
            query: query.into(),
            parameters,
            database,
        }
    }

    /// Get the request type
    pub fn request_type(&self) -> RequestType {
        match self {
            Request::Run { .. } => RequestType::Run,
            Request::Pull { .. } => RequestType::Pull,
            Request::Discard { .. } => RequestType::Discard,
        }
    }

    /// Message name, for logs
    pub fn name(&self) -> &'static str {
        match self {
            Request::Run { .. } => "RUN",
            Request::Pull { .. } => "PULL",
            Request::Discard { .. } => "DISCARD",
        }
    }

    /// Struct fields in wire order
    pub(crate) fn fields(&self) -> Vec<Value> {
        match self {
            Request::Run {
                query,
                parameters,
                database,
            } => {
                let mut extra = ValueMap::new();
                if let Some(db) = database {
                    extra.insert("db", db.as_str());
                }
                vec![
                    Value::from(query.as_str()),
                    Value::Map(parameters.clone()),
                    Value::Map(extra),
                ]
            }
            Request::Pull { n, qid } | Request::Discard { n, qid } => {
                let mut extra = ValueMap::new();
                extra.insert("n", *n);
                if *qid != LAST_QUERY_ID {
                    extra.insert("qid", *qid);
                }
                vec![Value::Map(extra)]
            }
        }
    }

    // =========================================================================
    // Decoders
    // =========================================================================

    pub(crate) fn decode_run(fields: &mut Fields) -> Result<Self> {
        let query = fields.next_string()?;
        let parameters = fields.next_map()?;
        let extra = fields.next_map()?;
        let database = extra.get("db").and_then(Value::as_str).map(str::to_string);
        Ok(Request::Run {
            query,
            parameters,
            database,
        })
    }

    pub(crate) fn decode_pull(fields: &mut Fields) -> Result<Self> {
        let (n, qid) = Self::decode_batch(fields)?;
        Ok(Request::Pull { n, qid })
    }

    pub(crate) fn decode_discard(fields: &mut Fields) -> Result<Self> {
        let (n, qid) = Self::decode_batch(fields)?;
        Ok(Request::Discard { n, qid })
    }

    fn decode_batch(fields: &mut Fields) -> Result<(i64, i64)> {
        let extra = fields.next_map()?;
        let n = extra.get("n").and_then(Value::as_int).unwrap_or(-1);
        let qid = extra
            .get("qid")
            .and_then(Value::as_int)
            .unwrap_or(LAST_QUERY_ID);
        Ok((n, qid))
    }
}
