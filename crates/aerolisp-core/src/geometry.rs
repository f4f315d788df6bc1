//! Vectors and unit handling for panel geometry.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Feet per meter.
pub const FEET_PER_METER: f64 = 1.0 / 0.3048;

/// Errors raised while validating panel or fuselage geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("{owner}: {vector} direction vector has zero length")]
    DegenerateVector {
        owner: String,
        vector: &'static str,
    },

    #[error("{owner}: {field} must be finite, got {value}")]
    NonFinite {
        owner: String,
        field: &'static str,
        value: f64,
    },

    #[error("{owner}: {field} must be positive, got {value}")]
    NonPositive {
        owner: String,
        field: &'static str,
        value: f64,
    },
}

/// The unit system a geometric description is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum UnitSystem {
    /// Feet and square feet.
    #[default]
    #[serde(rename = "FT", alias = "ft", alias = "feet")]
    Feet,
    /// Meters and square meters.
    #[serde(rename = "M", alias = "m", alias = "meters")]
    Meters,
}

impl UnitSystem {
    /// Convert a length to feet.
    pub fn length_to_feet(self, length: f64) -> f64 {
        match self {
            UnitSystem::Feet => length,
            UnitSystem::Meters => length * FEET_PER_METER,
        }
    }

    /// Convert an area to square feet.
    pub fn area_to_square_feet(self, area: f64) -> f64 {
        match self {
            UnitSystem::Feet => area,
            UnitSystem::Meters => area * FEET_PER_METER * FEET_PER_METER,
        }
    }
}

/// A three-component vector in body axes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(from = "[f64; 3]")]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// The unit vector with the same direction, or `None` for a zero or
    /// non-finite vector.
    pub fn normalized(&self) -> Option<Self> {
        let length = self.length();
        (length.is_finite() && length > 0.0).then(|| self.scale(1.0 / length))
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
