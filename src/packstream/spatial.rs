//! Spatial values

use super::registry::Fields;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Two,
    Three,
}

/// A 2-D or 3-D point in a coordinate reference system
///
/// A 2-D point has `z = NaN`. The dimension is stored on its own, so a
/// 3-D point whose z is NaN stays 3-D. Equality treats two NaN `z` values
/// as equal so decoded 2-D points compare equal to each other.
#[derive(Debug, Clone, Copy)]
pub struct Point {
    pub srid: i64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub dimension: Dimension,
}

impl Point {
    pub fn new_2d(srid: i64, x: f64, y: f64) -> Self {
        Self {
            srid,
            x,
            y,
            z: f64::NAN,
            dimension: Dimension::Two,
        }
    }

    pub fn new_3d(srid: i64, x: f64, y: f64, z: f64) -> Self {
        Self {
            srid,
            x,
            y,
            z,
            dimension: Dimension::Three,
        }
    }

    pub fn is_3d(&self) -> bool {
        self.dimension == Dimension::Three
    }

    pub(crate) fn from_fields_2d(fields: &mut Fields) -> Result<Self> {
        let srid = fields.next_int()?;
        let x = fields.next_float()?;
        let y = fields.next_float()?;
        Ok(Self::new_2d(srid, x, y))
    }

    pub(crate) fn from_fields_3d(fields: &mut Fields) -> Result<Self> {
        let srid = fields.next_int()?;
        let x = fields.next_float()?;
        let y = fields.next_float()?;
        let z = fields.next_float()?;
        Ok(Self::new_3d(srid, x, y, z))
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.srid == other.srid
            && self.dimension == other.dimension
            && self.x == other.x
            && self.y == other.y
            && (self.z == other.z || (self.z.is_nan() && other.z.is_nan()))
    }
}
