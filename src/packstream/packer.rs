//! PackStream encoder
//!
//! Appends values to a `BytesMut`, always choosing the smallest marker
//! that fits. Typed struct values are laid out the way the target
//! protocol version expects.

use bytes::{BufMut, BytesMut};

use super::graph::{Node, Path, Relationship, UnboundRelationship};
use super::spatial::Point;
use super::temporal::{DateTime, DateTimeZoneId};
use super::value::{Value, ValueMap};
use super::*;
use crate::error::{BoltError, Result};
use crate::protocol::ProtocolVersion;

/// Streaming encoder over a caller-owned buffer
pub struct Packer<'a> {
    buf: &'a mut BytesMut,
    version: ProtocolVersion,
    depth: usize,
}

impl<'a> Packer<'a> {
    pub fn new(buf: &'a mut BytesMut, version: ProtocolVersion) -> Self {
        Self {
            buf,
            version,
            depth: 0,
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Encode one value, recursing into containers
    pub fn pack(&mut self, value: &Value) -> Result<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(BoltError::protocol(format!(
                "values nested deeper than {} levels cannot be sent",
                MAX_NESTING_DEPTH
            )));
        }

        self.depth += 1;
        let packed = self.pack_value(value);
        self.depth -= 1;
        packed
    }

    fn pack_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.pack_null(),
            Value::Boolean(b) => self.pack_bool(*b),
            Value::Integer(i) => self.pack_int(*i),
            Value::Float(f) => self.pack_float(*f),
            Value::Bytes(bytes) => self.pack_bytes(bytes)?,
            Value::String(s) => self.pack_string(s)?,
            Value::List(items) => self.pack_list(items)?,
            Value::Map(map) => self.pack_map(map)?,
            Value::Struct(s) => {
                self.pack_struct_header(s.fields.len(), s.signature)?;
                for field in &s.fields {
                    self.pack(field)?;
                }
            }
            Value::Node(node) => self.pack_node(node)?,
            Value::Relationship(rel) => self.pack_relationship(rel)?,
            Value::UnboundRelationship(rel) => self.pack_unbound_relationship(rel)?,
            Value::Path(path) => self.pack_path(path)?,
            Value::Point(point) => self.pack_point(point)?,
            Value::Date(date) => {
                self.pack_struct_header(1, DATE)?;
                self.pack_int(date.epoch_days);
            }
            Value::Time(time) => {
                self.pack_struct_header(2, TIME)?;
                self.pack_int(time.nanos_of_day);
                self.pack_int(time.offset_seconds);
            }
            Value::LocalTime(time) => {
                self.pack_struct_header(1, LOCAL_TIME)?;
                self.pack_int(time.nanos_of_day);
            }
            Value::LocalDateTime(dt) => {
                self.pack_struct_header(2, LOCAL_DATE_TIME)?;
                self.pack_int(dt.epoch_seconds);
                self.pack_int(dt.nanos);
            }
            Value::DateTime(dt) => self.pack_date_time(dt)?,
            Value::DateTimeZoneId(dt) => self.pack_date_time_zone_id(dt)?,
            Value::Duration(d) => {
                self.pack_struct_header(4, DURATION)?;
                self.pack_int(d.months);
                self.pack_int(d.days);
                self.pack_int(d.seconds);
                self.pack_int(d.nanos);
            }
        }
        Ok(())
    }

    // =========================================================================
    // Scalars
    // =========================================================================

    pub fn pack_null(&mut self) {
        self.buf.put_u8(NULL);
    }

    pub fn pack_bool(&mut self, value: bool) {
        self.buf.put_u8(if value { TRUE } else { FALSE });
    }

    pub fn pack_int(&mut self, value: i64) {
        if (TINY_INT_MIN..=TINY_INT_MAX).contains(&value) {
            self.buf.put_i8(value as i8);
        } else if let Ok(v) = i8::try_from(value) {
            self.buf.put_u8(INT_8);
            self.buf.put_i8(v);
        } else if let Ok(v) = i16::try_from(value) {
            self.buf.put_u8(INT_16);
            self.buf.put_i16(v);
        } else if let Ok(v) = i32::try_from(value) {
            self.buf.put_u8(INT_32);
            self.buf.put_i32(v);
        } else {
            self.buf.put_u8(INT_64);
            self.buf.put_i64(value);
        }
    }

    pub fn pack_float(&mut self, value: f64) {
        self.buf.put_u8(FLOAT_64);
        self.buf.put_f64(value);
    }

    pub fn pack_bytes(&mut self, value: &[u8]) -> Result<()> {
        self.pack_sized_header(value.len(), None, [BYTES_8, BYTES_16, BYTES_32])?;
        self.buf.put_slice(value);
        Ok(())
    }

    pub fn pack_string(&mut self, value: &str) -> Result<()> {
        self.pack_sized_header(
            value.len(),
            Some(TINY_STRING),
            [STRING_8, STRING_16, STRING_32],
        )?;
        self.buf.put_slice(value.as_bytes());
        Ok(())
    }

    // =========================================================================
    // Containers
    // =========================================================================

    pub fn pack_list_header(&mut self, len: usize) -> Result<()> {
        self.pack_sized_header(len, Some(TINY_LIST), [LIST_8, LIST_16, LIST_32])
    }

    pub fn pack_map_header(&mut self, len: usize) -> Result<()> {
        self.pack_sized_header(len, Some(TINY_MAP), [MAP_8, MAP_16, MAP_32])
    }

    pub fn pack_list(&mut self, items: &[Value]) -> Result<()> {
        self.pack_list_header(items.len())?;
        for item in items {
            self.pack(item)?;
        }
        Ok(())
    }

    pub fn pack_map(&mut self, map: &ValueMap) -> Result<()> {
        self.pack_map_header(map.len())?;
        for (key, value) in map.iter() {
            self.pack_string(key)?;
            self.pack(value)?;
        }
        Ok(())
    }

    /// Struct header: tiny marker with the field count, then the signature
    pub fn pack_struct_header(&mut self, field_count: usize, signature: u8) -> Result<()> {
        if field_count > TINY_SIZE_LIMIT {
            return Err(BoltError::protocol(format!(
                "struct {:?} has {} fields, at most {} are supported",
                char::from(signature),
                field_count,
                TINY_SIZE_LIMIT
            )));
        }
        self.buf.put_u8(TINY_STRUCT | field_count as u8);
        self.buf.put_u8(signature);
        Ok(())
    }

    /// Tiny marker when allowed, else the narrowest of 8/16/32-bit lengths
    fn pack_sized_header(&mut self, len: usize, tiny: Option<u8>, markers: [u8; 3]) -> Result<()> {
        match tiny {
            Some(tiny) if len <= TINY_SIZE_LIMIT => self.buf.put_u8(tiny | len as u8),
            _ if len <= u8::MAX as usize => {
                self.buf.put_u8(markers[0]);
                self.buf.put_u8(len as u8);
            }
            _ if len <= u16::MAX as usize => {
                self.buf.put_u8(markers[1]);
                self.buf.put_u16(len as u16);
            }
            _ if len <= u32::MAX as usize => {
                self.buf.put_u8(markers[2]);
                self.buf.put_u32(len as u32);
            }
            _ => {
                return Err(BoltError::protocol(format!(
                    "size {} exceeds the 32-bit PackStream limit",
                    len
                )))
            }
        }
        Ok(())
    }

    // =========================================================================
    // Graph
    // =========================================================================

    fn pack_node(&mut self, node: &Node) -> Result<()> {
        let element_ids = self.version.supports_element_ids();
        self.pack_struct_header(if element_ids { 4 } else { 3 }, NODE)?;
        self.pack_int(node.id);
        self.pack_list_header(node.labels.len())?;
        for label in &node.labels {
            self.pack_string(label)?;
        }
        self.pack_map(&node.properties)?;
        if element_ids {
            self.pack_string(&node.element_id_or_id())?;
        }
        Ok(())
    }

    fn pack_relationship(&mut self, rel: &Relationship) -> Result<()> {
        let element_ids = self.version.supports_element_ids();
        self.pack_struct_header(if element_ids { 8 } else { 5 }, RELATIONSHIP)?;
        self.pack_int(rel.id);
        self.pack_int(rel.start_node_id);
        self.pack_int(rel.end_node_id);
        self.pack_string(&rel.rel_type)?;
        self.pack_map(&rel.properties)?;
        if element_ids {
            self.pack_string(&rel.element_id_or_id())?;
            let start = rel
                .start_element_id
                .clone()
                .unwrap_or_else(|| rel.start_node_id.to_string());
            let end = rel
                .end_element_id
                .clone()
                .unwrap_or_else(|| rel.end_node_id.to_string());
            self.pack_string(&start)?;
            self.pack_string(&end)?;
        }
        Ok(())
    }

    fn pack_unbound_relationship(&mut self, rel: &UnboundRelationship) -> Result<()> {
        let element_ids = self.version.supports_element_ids();
        self.pack_struct_header(if element_ids { 4 } else { 3 }, UNBOUND_RELATIONSHIP)?;
        self.pack_int(rel.id);
        self.pack_string(&rel.rel_type)?;
        self.pack_map(&rel.properties)?;
        if element_ids {
            self.pack_string(&rel.element_id_or_id())?;
        }
        Ok(())
    }

    fn pack_path(&mut self, path: &Path) -> Result<()> {
        self.pack_struct_header(3, PATH)?;

        self.pack_list_header(path.unique_nodes().len())?;
        for node in path.unique_nodes() {
            self.pack_node(node)?;
        }

        self.pack_list_header(path.unique_relationships().len())?;
        for rel in path.unique_relationships() {
            self.pack_unbound_relationship(rel)?;
        }

        self.pack_list_header(path.indices().len())?;
        for index in path.indices() {
            self.pack_int(*index);
        }
        Ok(())
    }

    // =========================================================================
    // Spatial / Temporal
    // =========================================================================

    fn pack_point(&mut self, point: &Point) -> Result<()> {
        if point.is_3d() {
            self.pack_struct_header(4, POINT_3D)?;
        } else {
            self.pack_struct_header(3, POINT_2D)?;
        }
        self.pack_int(point.srid);
        self.pack_float(point.x);
        self.pack_float(point.y);
        if point.is_3d() {
            self.pack_float(point.z);
        }
        Ok(())
    }

    fn pack_date_time(&mut self, dt: &DateTime) -> Result<()> {
        if self.version.utc_date_time() {
            self.pack_struct_header(3, DATE_TIME_UTC)?;
            self.pack_int(dt.epoch_seconds);
        } else {
            let local_seconds = dt.local_seconds().ok_or_else(|| {
                BoltError::protocol(format!(
                    "date time {}s with offset {}s overflows local seconds",
                    dt.epoch_seconds, dt.offset_seconds
                ))
            })?;
            self.pack_struct_header(3, DATE_TIME_LEGACY)?;
            self.pack_int(local_seconds);
        }
        self.pack_int(dt.nanos);
        self.pack_int(dt.offset_seconds);
        Ok(())
    }

    fn pack_date_time_zone_id(&mut self, dt: &DateTimeZoneId) -> Result<()> {
        let utc = self.version.utc_date_time();
        if dt.utc != utc {
            return Err(BoltError::protocol(format!(
                "zoned date time with {} seconds cannot be sent on protocol {}",
                if dt.utc { "UTC" } else { "local" },
                self.version
            )));
        }

        let signature = if utc {
            DATE_TIME_ZONE_ID_UTC
        } else {
            DATE_TIME_ZONE_ID_LEGACY
        };
        self.pack_struct_header(3, signature)?;
        self.pack_int(dt.seconds);
        self.pack_int(dt.nanos);
        self.pack_string(&dt.zone_id)?;
        Ok(())
    }
}
