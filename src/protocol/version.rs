//! Protocol versions
//!
//! The version is negotiated by the caller before a connection is built.
//! It decides struct layouts (element ids, UTC date times) and therefore
//! which decoders go into the registries.

use std::fmt;

use crate::error::{BoltError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProtocolVersion {
    pub major: u8,
    pub minor: u8,
}

impl ProtocolVersion {
    pub const V4_0: ProtocolVersion = ProtocolVersion::new(4, 0);
    pub const V4_1: ProtocolVersion = ProtocolVersion::new(4, 1);
    pub const V4_2: ProtocolVersion = ProtocolVersion::new(4, 2);
    pub const V4_3: ProtocolVersion = ProtocolVersion::new(4, 3);
    pub const V4_4: ProtocolVersion = ProtocolVersion::new(4, 4);
    pub const V5_0: ProtocolVersion = ProtocolVersion::new(5, 0);

    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Whether this crate can speak the version (4.0 to 4.4, any 5.x)
    pub fn is_supported(&self) -> bool {
        match self.major {
            4 => self.minor <= 4,
            5 => true,
            _ => false,
        }
    }

    pub fn ensure_supported(&self) -> Result<()> {
        if !self.is_supported() {
            return Err(BoltError::Config(format!(
                "unsupported protocol version {}",
                self
            )));
        }
        Ok(())
    }

    /// Entity structs carry string element ids
    pub fn supports_element_ids(&self) -> bool {
        self.major >= 5
    }

    /// Date times with an offset or zone carry UTC seconds
    pub fn utc_date_time(&self) -> bool {
        self.major >= 5
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
