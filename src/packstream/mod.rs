//! PackStream Module
//!
//! Self-describing binary encoding for every request and response payload.
//!
//! ## Marker Layout
//! ```text
//! ┌───────────┬──────────────────────────────────────────────┐
//! │ 00 .. 7F  │ tiny int 0..=127                             │
//! │ 80 .. 8F  │ tiny string, low nibble = byte length        │
//! │ 90 .. 9F  │ tiny list, low nibble = element count        │
//! │ A0 .. AF  │ tiny map, low nibble = entry count           │
//! │ B0 .. BF  │ struct, low nibble = field count, + sig byte │
//! │ C0        │ null                                         │
//! │ C1        │ float64 (8 bytes BE)                         │
//! │ C2 / C3   │ false / true                                 │
//! │ C8 .. CB  │ int8 / int16 / int32 / int64                 │
//! │ CC .. CE  │ bytes with u8 / u16 / u32 length            │
//! │ D0 .. D2  │ string with u8 / u16 / u32 length           │
//! │ D4 .. D6  │ list with u8 / u16 / u32 length             │
//! │ D8 .. DA  │ map with u8 / u16 / u32 length              │
//! │ F0 .. FF  │ tiny int -16..=-1                            │
//! └───────────┴──────────────────────────────────────────────┘
//! ```
//!
//! Structs are decoded through a [`StructRegistry`] keyed by
//! `(signature, field count)`. The registry is built once per protocol
//! version, which is how the same signature can mean different layouts
//! on different versions.

mod graph;
mod packer;
mod registry;
mod spatial;
mod temporal;
mod unpacker;
mod value;

pub use graph::{Node, Path, Relationship, Segment, UnboundRelationship};
pub use packer::Packer;
pub use registry::{value_registry, Fields, StructDecoder, StructRegistry};
pub use spatial::{Dimension, Point};
pub use temporal::{Date, DateTime, DateTimeZoneId, Duration, LocalDateTime, LocalTime, Time};
pub use unpacker::Unpacker;
pub use value::{Structure, Value, ValueMap};

// =============================================================================
// Markers
// =============================================================================

pub const TINY_STRING: u8 = 0x80;
pub const TINY_LIST: u8 = 0x90;
pub const TINY_MAP: u8 = 0xA0;
pub const TINY_STRUCT: u8 = 0xB0;
pub const NULL: u8 = 0xC0;
pub const FLOAT_64: u8 = 0xC1;
pub const FALSE: u8 = 0xC2;
pub const TRUE: u8 = 0xC3;
pub const INT_8: u8 = 0xC8;
pub const INT_16: u8 = 0xC9;
pub const INT_32: u8 = 0xCA;
pub const INT_64: u8 = 0xCB;
pub const BYTES_8: u8 = 0xCC;
pub const BYTES_16: u8 = 0xCD;
pub const BYTES_32: u8 = 0xCE;
pub const STRING_8: u8 = 0xD0;
pub const STRING_16: u8 = 0xD1;
pub const STRING_32: u8 = 0xD2;
pub const LIST_8: u8 = 0xD4;
pub const LIST_16: u8 = 0xD5;
pub const LIST_32: u8 = 0xD6;
pub const MAP_8: u8 = 0xD8;
pub const MAP_16: u8 = 0xD9;
pub const MAP_32: u8 = 0xDA;

/// Largest size that fits in a marker's low nibble
pub const TINY_SIZE_LIMIT: usize = 0x0F;

/// Smallest integer encoded inline
pub const TINY_INT_MIN: i64 = -16;

/// Largest integer encoded inline
pub const TINY_INT_MAX: i64 = 127;

/// Deepest value tree the codec accepts; a top-level scalar has depth 1
pub const MAX_NESTING_DEPTH: usize = 256;

// =============================================================================
// Struct Signatures
// =============================================================================

pub const NODE: u8 = b'N';
pub const RELATIONSHIP: u8 = b'R';
pub const UNBOUND_RELATIONSHIP: u8 = b'r';
pub const PATH: u8 = b'P';
pub const POINT_2D: u8 = b'X';
pub const POINT_3D: u8 = b'Y';
pub const DATE: u8 = b'D';
pub const TIME: u8 = b'T';
pub const LOCAL_TIME: u8 = b't';
pub const LOCAL_DATE_TIME: u8 = b'd';
pub const DATE_TIME_LEGACY: u8 = b'F';
pub const DATE_TIME_ZONE_ID_LEGACY: u8 = b'f';
pub const DATE_TIME_UTC: u8 = b'I';
pub const DATE_TIME_ZONE_ID_UTC: u8 = b'i';
pub const DURATION: u8 = b'E';
