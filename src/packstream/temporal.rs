//! Temporal values
//!
//! Kept in the raw units the wire uses (epoch days, epoch seconds,
//! nanoseconds). No calendar arithmetic happens here.

use super::registry::Fields;
use crate::error::{BoltError, Result};

/// Calendar date as days since 1970-01-01
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Date {
    pub epoch_days: i64,
}

impl Date {
    pub fn new(epoch_days: i64) -> Self {
        Self { epoch_days }
    }

    pub(crate) fn from_fields(fields: &mut Fields) -> Result<Self> {
        Ok(Self::new(fields.next_int()?))
    }
}

/// Time of day with a UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    pub nanos_of_day: i64,
    pub offset_seconds: i64,
}

impl Time {
    pub fn new(nanos_of_day: i64, offset_seconds: i64) -> Self {
        Self {
            nanos_of_day,
            offset_seconds,
        }
    }

    pub(crate) fn from_fields(fields: &mut Fields) -> Result<Self> {
        let nanos_of_day = fields.next_int()?;
        let offset_seconds = fields.next_int()?;
        Ok(Self::new(nanos_of_day, offset_seconds))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocalTime {
    pub nanos_of_day: i64,
}

impl LocalTime {
    pub fn new(nanos_of_day: i64) -> Self {
        Self { nanos_of_day }
    }

    pub(crate) fn from_fields(fields: &mut Fields) -> Result<Self> {
        Ok(Self::new(fields.next_int()?))
    }
}

/// Date and time without a zone, as seconds since the local epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocalDateTime {
    pub epoch_seconds: i64,
    pub nanos: i64,
}

impl LocalDateTime {
    pub fn new(epoch_seconds: i64, nanos: i64) -> Self {
        Self {
            epoch_seconds,
            nanos,
        }
    }

    pub(crate) fn from_fields(fields: &mut Fields) -> Result<Self> {
        let epoch_seconds = fields.next_int()?;
        let nanos = fields.next_int()?;
        Ok(Self::new(epoch_seconds, nanos))
    }
}

/// Instant with a fixed UTC offset
///
/// `epoch_seconds` is always UTC. Legacy encodings carry local seconds
/// on the wire; those are converted with the offset in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    pub epoch_seconds: i64,
    pub nanos: i64,
    pub offset_seconds: i64,
}

impl DateTime {
    pub fn new(epoch_seconds: i64, nanos: i64, offset_seconds: i64) -> Self {
        Self {
            epoch_seconds,
            nanos,
            offset_seconds,
        }
    }

    /// Seconds since the epoch as seen on the local wall clock; `None`
    /// when the sum does not fit in an `i64`
    pub fn local_seconds(&self) -> Option<i64> {
        self.epoch_seconds.checked_add(self.offset_seconds)
    }

    pub(crate) fn from_fields_utc(fields: &mut Fields) -> Result<Self> {
        let epoch_seconds = fields.next_int()?;
        let nanos = fields.next_int()?;
        let offset_seconds = fields.next_int()?;
        Ok(Self::new(epoch_seconds, nanos, offset_seconds))
    }

    pub(crate) fn from_fields_legacy(fields: &mut Fields) -> Result<Self> {
        let local_seconds = fields.next_int()?;
        let nanos = fields.next_int()?;
        let offset_seconds = fields.next_int()?;
        let epoch_seconds = local_seconds.checked_sub(offset_seconds).ok_or_else(|| {
            BoltError::protocol(format!(
                "local seconds {} with offset {} overflow UTC seconds",
                local_seconds, offset_seconds
            ))
        })?;
        Ok(Self::new(epoch_seconds, nanos, offset_seconds))
    }
}

/// Instant in a named time zone
///
/// Converting between local and UTC seconds needs a zone database, so
/// the value keeps whichever the server sent and remembers which one it is.
/// It can only be sent back on a protocol version that uses the same form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeZoneId {
    pub seconds: i64,
    pub nanos: i64,
    pub zone_id: String,

    /// `seconds` are UTC seconds (true) or local wall-clock seconds (false)
    pub utc: bool,
}

impl DateTimeZoneId {
    pub fn utc(seconds: i64, nanos: i64, zone_id: impl Into<String>) -> Self {
        Self {
            seconds,
            nanos,
            zone_id: zone_id.into(),
            utc: true,
        }
    }

    pub fn local(seconds: i64, nanos: i64, zone_id: impl Into<String>) -> Self {
        Self {
            seconds,
            nanos,
            zone_id: zone_id.into(),
            utc: false,
        }
    }

    pub(crate) fn from_fields(fields: &mut Fields, utc: bool) -> Result<Self> {
        let seconds = fields.next_int()?;
        let nanos = fields.next_int()?;
        let zone_id = fields.next_string()?;
        Ok(Self {
            seconds,
            nanos,
            zone_id,
            utc,
        })
    }
}

/// Temporal amount; components are not normalised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    pub months: i64,
    pub days: i64,
    pub seconds: i64,
    pub nanos: i64,
}

impl Duration {
    pub fn new(months: i64, days: i64, seconds: i64, nanos: i64) -> Self {
        Self {
            months,
            days,
            seconds,
            nanos,
        }
    }

    pub(crate) fn from_fields(fields: &mut Fields) -> Result<Self> {
        let months = fields.next_int()?;
        let days = fields.next_int()?;
        let seconds = fields.next_int()?;
        let nanos = fields.next_int()?;
        Ok(Self::new(months, days, seconds, nanos))
    }
}
