//! Integer scaling helpers for raw sensor data.

use crate::config::common::GRange;

/// Ratio representing a scale factor without floating-point math.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScaleFactor {
    /// Scale numerator.
    pub numerator: i32,
    /// Scale denominator.
    pub denominator: i32,
}

impl ScaleFactor {
    /// Creates a new scale ratio.
    pub const fn new(numerator: i32, denominator: i32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }
}

/// Returns the accelerometer sensitivity in LSB/g for 12-bit samples.
pub const fn accel_lsb_per_g(range: GRange) -> i32 {
    match range {
        GRange::G2 => 1_024,
        GRange::G4 => 512,
        GRange::G8 => 256,
        GRange::G16 => 128,
    }
}

/// Returns the accelerometer scale in milli-g per LSB as a ratio.
pub const fn accel_mg_per_lsb(range: GRange) -> ScaleFactor {
    ScaleFactor::new(1000, accel_lsb_per_g(range))
}

/// Converts a raw 12-bit count to milli-g at the given range.
pub const fn counts_to_mg(counts: i16, range: GRange) -> i32 {
    (counts as i32) * 1000 / accel_lsb_per_g(range)
}

/// Offset compensation register resolution in micro-g per LSB.
pub const OFFSET_UG_PER_LSB: i32 = 7_810;

/// Converts an offset compensation register value to milli-g.
pub const fn offset_to_mg(value: i8) -> i32 {
    (value as i32) * OFFSET_UG_PER_LSB / 1000
}
