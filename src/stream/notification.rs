//! Notifications
//!
//! Warnings and hints the server attaches to a result, such as a
//! deprecated function or a cartesian product in the plan.

use crate::error::{BoltError, Result};
use crate::packstream::{Value, ValueMap};

/// Where in the query text a notification points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputPosition {
    /// Character offset, starting at 0
    pub offset: i64,
    /// Line, starting at 1
    pub line: i64,
    /// Column, starting at 1
    pub column: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub code: String,
    pub title: String,
    pub description: String,
    pub severity: Option<String>,
    pub category: Option<String>,
    pub position: Option<InputPosition>,
}

impl Notification {
    /// Parse the `notifications` list; absent or null means none
    pub(crate) fn collect(metadata: &ValueMap) -> Result<Vec<Self>> {
        match metadata.get("notifications") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::List(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Map(map) => Self::parse(map),
                    other => Err(BoltError::protocol(format!(
                        "notification must be a Map, got {}",
                        other.type_name()
                    ))),
                })
                .collect(),
            Some(other) => Err(BoltError::protocol(format!(
                "'notifications' metadata must be a List, got {}",
                other.type_name()
            ))),
        }
    }

    fn parse(map: &ValueMap) -> Result<Self> {
        let required = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    BoltError::protocol(format!("notification needs a String '{}'", key))
                })
        };
        let optional = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);

        Ok(Self {
            code: required("code")?,
            title: required("title")?,
            description: required("description")?,
            severity: optional("severity"),
            category: optional("category"),
            position: map
                .get("position")
                .and_then(Value::as_map)
                .map(InputPosition::parse)
                .transpose()?,
        })
    }
}

impl InputPosition {
    fn parse(map: &ValueMap) -> Result<Self> {
        let coordinate = |key: &str| {
            map.get(key).and_then(Value::as_int).ok_or_else(|| {
                BoltError::protocol(format!("notification position needs an Integer '{}'", key))
            })
        };

        Ok(Self {
            offset: coordinate("offset")?,
            line: coordinate("line")?,
            column: coordinate("column")?,
        })
    }
}
