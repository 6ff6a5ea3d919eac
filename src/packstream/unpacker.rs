//! PackStream decoder
//!
//! Reads values out of one complete message. Every length is checked
//! against the bytes that are actually left before anything is
//! allocated, so a corrupt count fails fast instead of reading garbage.

use bytes::{Buf, Bytes};

use super::registry::{Fields, StructRegistry};
use super::value::{Value, ValueMap};
use super::*;
use crate::error::{BoltError, Result};

/// Decoder over one message payload
pub struct Unpacker<'r> {
    buf: Bytes,
    registry: &'r StructRegistry<Value>,

    /// Values currently being decoded, innermost included
    depth: usize,
}

impl<'r> Unpacker<'r> {
    /// `registry` resolves every struct found inside values
    pub fn new(buf: Bytes, registry: &'r StructRegistry<Value>) -> Self {
        Self {
            buf,
            registry,
            depth: 0,
        }
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Decode the next value
    ///
    /// Containers nested deeper than [`MAX_NESTING_DEPTH`] are rejected
    /// as a protocol error.
    pub fn unpack(&mut self) -> Result<Value> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(BoltError::protocol(format!(
                "values nested deeper than {} levels",
                MAX_NESTING_DEPTH
            )));
        }

        self.depth += 1;
        let value = self.unpack_value();
        self.depth -= 1;
        value
    }

    fn unpack_value(&mut self) -> Result<Value> {
        let marker = self.read_u8()?;

        match marker {
            0x00..=0x7F | 0xF0..=0xFF => Ok(Value::Integer(i64::from(marker as i8))),
            0x80..=0x8F => self.unpack_string_body(usize::from(marker & 0x0F)),
            0x90..=0x9F => self.unpack_list_body(usize::from(marker & 0x0F)),
            0xA0..=0xAF => self.unpack_map_body(usize::from(marker & 0x0F)),
            0xB0..=0xBF => {
                let signature = self.read_u8()?;
                let registry = self.registry;
                self.unpack_struct_body(registry, signature, usize::from(marker & 0x0F))
            }

            NULL => Ok(Value::Null),
            FLOAT_64 => {
                self.ensure(8)?;
                Ok(Value::Float(self.buf.get_f64()))
            }
            FALSE => Ok(Value::Boolean(false)),
            TRUE => Ok(Value::Boolean(true)),

            INT_8 => {
                self.ensure(1)?;
                Ok(Value::Integer(i64::from(self.buf.get_i8())))
            }
            INT_16 => {
                self.ensure(2)?;
                Ok(Value::Integer(i64::from(self.buf.get_i16())))
            }
            INT_32 => {
                self.ensure(4)?;
                Ok(Value::Integer(i64::from(self.buf.get_i32())))
            }
            INT_64 => {
                self.ensure(8)?;
                Ok(Value::Integer(self.buf.get_i64()))
            }

            BYTES_8 | BYTES_16 | BYTES_32 => {
                let len = self.read_size(marker - BYTES_8)?;
                let bytes = self.take(len)?;
                Ok(Value::Bytes(bytes.to_vec()))
            }
            STRING_8 | STRING_16 | STRING_32 => {
                let len = self.read_size(marker - STRING_8)?;
                self.unpack_string_body(len)
            }
            LIST_8 | LIST_16 | LIST_32 => {
                let len = self.read_size(marker - LIST_8)?;
                self.unpack_list_body(len)
            }
            MAP_8 | MAP_16 | MAP_32 => {
                let len = self.read_size(marker - MAP_8)?;
                self.unpack_map_body(len)
            }

            _ => Err(BoltError::protocol(format!(
                "unknown marker 0x{:02X}",
                marker
            ))),
        }
    }

    /// Decode a top-level struct through a registry of another output type
    ///
    /// Used for messages: the envelope resolves through the message
    /// registry while its fields resolve through the value registry.
    pub fn unpack_struct<T>(&mut self, registry: &StructRegistry<T>) -> Result<T> {
        let marker = self.read_u8()?;
        if marker & 0xF0 != TINY_STRUCT {
            return Err(BoltError::protocol(format!(
                "expected a struct marker, got 0x{:02X}",
                marker
            )));
        }
        let signature = self.read_u8()?;
        self.unpack_struct_body(registry, signature, usize::from(marker & 0x0F))
    }

    // =========================================================================
    // Bodies
    // =========================================================================

    fn unpack_string_body(&mut self, len: usize) -> Result<Value> {
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map(Value::String)
            .map_err(|e| BoltError::protocol(format!("invalid UTF-8 in string: {}", e)))
    }

    fn unpack_list_body(&mut self, len: usize) -> Result<Value> {
        // Every element needs at least its marker byte
        self.ensure_count(len, 1, "list")?;

        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(self.unpack()?);
        }
        Ok(Value::List(items))
    }

    fn unpack_map_body(&mut self, len: usize) -> Result<Value> {
        // Every entry needs at least a key marker and a value marker
        self.ensure_count(len, 2, "map")?;

        let mut map = ValueMap::with_capacity(len);
        for _ in 0..len {
            let key = match self.unpack()? {
                Value::String(key) => key,
                other => {
                    return Err(BoltError::protocol(format!(
                        "map key must be a String, got {}",
                        other.type_name()
                    )))
                }
            };
            let value = self.unpack()?;
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }

    fn unpack_struct_body<T>(
        &mut self,
        registry: &StructRegistry<T>,
        signature: u8,
        field_count: usize,
    ) -> Result<T> {
        let decoder = registry.resolve(signature, field_count)?;
        self.ensure_count(field_count, 1, "struct")?;

        let mut values = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            values.push(self.unpack()?);
        }

        let mut fields = Fields::new(signature, values);
        let decoded = decoder(&mut fields)?;
        if fields.remaining() != 0 {
            return Err(BoltError::protocol(format!(
                "struct {:?} left {} fields undecoded",
                char::from(signature),
                fields.remaining()
            )));
        }
        Ok(decoded)
    }

    // =========================================================================
    // Primitive reads
    // =========================================================================

    fn ensure(&self, n: usize) -> Result<()> {
        if self.buf.remaining() < n {
            return Err(BoltError::protocol(format!(
                "truncated message: need {} more bytes, {} left",
                n,
                self.buf.remaining()
            )));
        }
        Ok(())
    }

    fn ensure_count(&self, count: usize, min_bytes_each: usize, what: &str) -> Result<()> {
        let needed = count.saturating_mul(min_bytes_each);
        if needed > self.buf.remaining() {
            return Err(BoltError::protocol(format!(
                "{} declares {} elements but only {} bytes remain",
                what,
                count,
                self.buf.remaining()
            )));
        }
        Ok(())
    }

    fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    /// Read an explicit size: width 0 = u8, 1 = u16, 2 = u32
    fn read_size(&mut self, width: u8) -> Result<usize> {
        match width {
            0 => Ok(usize::from(self.read_u8()?)),
            1 => {
                self.ensure(2)?;
                Ok(usize::from(self.buf.get_u16()))
            }
            _ => {
                self.ensure(4)?;
                Ok(self.buf.get_u32() as usize)
            }
        }
    }

    fn take(&mut self, len: usize) -> Result<Bytes> {
        self.ensure(len)?;
        Ok(self.buf.split_to(len))
    }
}
