//! Response definitions
//!
//! The server messages a query round trip can produce.

use crate::error::{BoltError, Result, ServerError};
use crate::packstream::{Fields, Value, ValueMap};

/// Response signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResponseType {
    Success = 0x70,
    Record = 0x71,
    Ignored = 0x7E,
    Failure = 0x7F,
}

/// A server response
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Request completed, with metadata
    Success(ValueMap),

    /// One row of a result
    Record(Vec<Value>),

    /// Request skipped because an earlier one failed
    Ignored,

    /// Request failed
    Failure(ServerError),
}

impl Response {
    /// Get the response type
    pub fn response_type(&self) -> ResponseType {
        match self {
            Response::Success(_) => ResponseType::Success,
            Response::Record(_) => ResponseType::Record,
            Response::Ignored => ResponseType::Ignored,
            Response::Failure(_) => ResponseType::Failure,
        }
    }

    /// Message name, for logs
    pub fn name(&self) -> &'static str {
        match self {
            Response::Success(_) => "SUCCESS",
            Response::Record(_) => "RECORD",
            Response::Ignored => "IGNORED",
            Response::Failure(_) => "FAILURE",
        }
    }

    /// Struct fields in wire order
    pub(crate) fn fields(&self) -> Vec<Value> {
        match self {
            Response::Success(metadata) => vec![Value::Map(metadata.clone())],
            Response::Record(values) => vec![Value::List(values.clone())],
            Response::Ignored => Vec::new(),
            Response::Failure(err) => {
                let mut map = ValueMap::new();
                map.insert("code", err.code.as_str());
                map.insert("message", err.message.as_str());
                vec![Value::Map(map)]
            }
        }
    }

    // =========================================================================
    // Decoders
    // =========================================================================

    pub(crate) fn decode_success(fields: &mut Fields) -> Result<Self> {
        Ok(Response::Success(fields.next_map()?))
    }

    pub(crate) fn decode_record(fields: &mut Fields) -> Result<Self> {
        Ok(Response::Record(fields.next_list()?))
    }

    pub(crate) fn decode_ignored(_fields: &mut Fields) -> Result<Self> {
        Ok(Response::Ignored)
    }

    pub(crate) fn decode_failure(fields: &mut Fields) -> Result<Self> {
        let metadata = fields.next_map()?;
        let text = |key: &str| -> Result<String> {
            metadata
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| BoltError::protocol(format!("FAILURE without a {} field", key)))
        };
        Ok(Response::Failure(ServerError::new(text("code")?, text("message")?)))
    }
}
