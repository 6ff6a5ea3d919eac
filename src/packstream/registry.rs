//! Struct Registry
//!
//! Maps `(signature, field count)` to a decoder. One registry is built
//! per protocol version when the connection is created and never changes
//! afterwards, so lookups need no locking.
//!
//! ```text
//!   ('N', 3) ──▶ legacy node        (4.x)
//!   ('N', 4) ──▶ node + element id  (5.x)
//!   ('X', 3) ──▶ 2-D point
//!   ('Y', 4) ──▶ 3-D point
//! ```

use std::collections::HashMap;

use super::graph::{Node, Path, Relationship, UnboundRelationship};
use super::spatial::Point;
use super::temporal::{Date, DateTime, DateTimeZoneId, Duration, LocalDateTime, LocalTime, Time};
use super::value::{Value, ValueMap};
use super::{
    DATE, DATE_TIME_LEGACY, DATE_TIME_UTC, DATE_TIME_ZONE_ID_LEGACY, DATE_TIME_ZONE_ID_UTC,
    DURATION, LOCAL_DATE_TIME, LOCAL_TIME, NODE, PATH, POINT_2D, POINT_3D, RELATIONSHIP, TIME,
    UNBOUND_RELATIONSHIP,
};
use crate::error::{BoltError, Result};
use crate::protocol::ProtocolVersion;

/// Builds a `T` from the already-decoded fields of one struct
pub type StructDecoder<T> = fn(&mut Fields) -> Result<T>;

/// Decoder table keyed by `(signature, field count)`
pub struct StructRegistry<T> {
    decoders: HashMap<(u8, usize), StructDecoder<T>>,
}

impl<T> StructRegistry<T> {
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Register a decoder, replacing any previous one for the same key
    pub fn register(&mut self, signature: u8, field_count: usize, decoder: StructDecoder<T>) {
        self.decoders.insert((signature, field_count), decoder);
    }

    /// Look up the decoder for a struct header
    pub fn resolve(&self, signature: u8, field_count: usize) -> Result<StructDecoder<T>> {
        self.decoders
            .get(&(signature, field_count))
            .copied()
            .ok_or_else(|| {
                BoltError::protocol(format!(
                    "no struct registered for signature 0x{:02X} ({:?}) with {} fields",
                    signature,
                    char::from(signature),
                    field_count
                ))
            })
    }

    pub fn contains(&self, signature: u8, field_count: usize) -> bool {
        self.decoders.contains_key(&(signature, field_count))
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl<T> Default for StructRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Fields
// =============================================================================

/// Decoded fields of one struct, consumed in order by its decoder
pub struct Fields {
    signature: u8,
    values: std::vec::IntoIter<Value>,
}

impl Fields {
    pub fn new(signature: u8, values: Vec<Value>) -> Self {
        Self {
            signature,
            values: values.into_iter(),
        }
    }

    pub fn signature(&self) -> u8 {
        self.signature
    }

    /// Fields not yet taken
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    pub fn next_value(&mut self) -> Result<Value> {
        self.values.next().ok_or_else(|| {
            BoltError::protocol(format!(
                "struct {:?} has fewer fields than its decoder expects",
                char::from(self.signature)
            ))
        })
    }

    pub fn next_int(&mut self) -> Result<i64> {
        match self.next_value()? {
            Value::Integer(i) => Ok(i),
            other => Err(self.mismatch("Integer", &other)),
        }
    }

    pub fn next_float(&mut self) -> Result<f64> {
        match self.next_value()? {
            Value::Float(f) => Ok(f),
            other => Err(self.mismatch("Float", &other)),
        }
    }

    pub fn next_string(&mut self) -> Result<String> {
        match self.next_value()? {
            Value::String(s) => Ok(s),
            other => Err(self.mismatch("String", &other)),
        }
    }

    pub fn next_list(&mut self) -> Result<Vec<Value>> {
        match self.next_value()? {
            Value::List(items) => Ok(items),
            other => Err(self.mismatch("List", &other)),
        }
    }

    pub fn next_map(&mut self) -> Result<ValueMap> {
        match self.next_value()? {
            Value::Map(map) => Ok(map),
            other => Err(self.mismatch("Map", &other)),
        }
    }

    pub fn next_string_list(&mut self) -> Result<Vec<String>> {
        self.next_list()?
            .into_iter()
            .map(|value| match value {
                Value::String(s) => Ok(s),
                other => Err(self.mismatch("String", &other)),
            })
            .collect()
    }

    fn mismatch(&self, expected: &str, got: &Value) -> BoltError {
        BoltError::protocol(format!(
            "struct {:?}: expected {}, got {}",
            char::from(self.signature),
            expected,
            got.type_name()
        ))
    }
}

// =============================================================================
// Value Registry
// =============================================================================

/// Build the value decoders for one protocol version
///
/// Entity arities are exclusive per version: a 4.x registry knows only
/// the legacy layouts, a 5.x registry only the element-id layouts.
pub fn value_registry(version: ProtocolVersion) -> StructRegistry<Value> {
    let mut registry: StructRegistry<Value> = StructRegistry::new();

    if version.supports_element_ids() {
        registry.register(NODE, 4, |f| Node::from_fields(f, true).map(Value::Node));
        registry.register(RELATIONSHIP, 8, |f| {
            Relationship::from_fields(f, true).map(Value::Relationship)
        });
        registry.register(UNBOUND_RELATIONSHIP, 4, |f| {
            UnboundRelationship::from_fields(f, true).map(Value::UnboundRelationship)
        });
    } else {
        registry.register(NODE, 3, |f| Node::from_fields(f, false).map(Value::Node));
        registry.register(RELATIONSHIP, 5, |f| {
            Relationship::from_fields(f, false).map(Value::Relationship)
        });
        registry.register(UNBOUND_RELATIONSHIP, 3, |f| {
            UnboundRelationship::from_fields(f, false).map(Value::UnboundRelationship)
        });
    }
    registry.register(PATH, 3, |f| Path::from_fields(f).map(Value::Path));

    // Spatial
    registry.register(POINT_2D, 3, |f| Point::from_fields_2d(f).map(Value::Point));
    registry.register(POINT_3D, 4, |f| Point::from_fields_3d(f).map(Value::Point));

    // Temporal
    registry.register(DATE, 1, |f| Date::from_fields(f).map(Value::Date));
    registry.register(TIME, 2, |f| Time::from_fields(f).map(Value::Time));
    registry.register(LOCAL_TIME, 1, |f| LocalTime::from_fields(f).map(Value::LocalTime));
    registry.register(LOCAL_DATE_TIME, 2, |f| {
        LocalDateTime::from_fields(f).map(Value::LocalDateTime)
    });
    registry.register(DURATION, 4, |f| Duration::from_fields(f).map(Value::Duration));

    if version.utc_date_time() {
        registry.register(DATE_TIME_UTC, 3, |f| {
            DateTime::from_fields_utc(f).map(Value::DateTime)
        });
        registry.register(DATE_TIME_ZONE_ID_UTC, 3, |f| {
            DateTimeZoneId::from_fields(f, true).map(Value::DateTimeZoneId)
        });
    } else {
        registry.register(DATE_TIME_LEGACY, 3, |f| {
            DateTime::from_fields_legacy(f).map(Value::DateTime)
        });
        registry.register(DATE_TIME_ZONE_ID_LEGACY, 3, |f| {
            DateTimeZoneId::from_fields(f, false).map(Value::DateTimeZoneId)
        });
    }

    registry
}
