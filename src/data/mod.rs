//! Sensor data readout helpers.

pub(crate) mod fifo;
pub mod scale;

pub use fifo::{
    DataSelect, FifoConfig, FifoFrameIterator, FifoMode, FifoStatus, MAX_FIFO_DEPTH,
};

use crate::config::common::GRange;
use crate::register::{Register, accd_lsb};

pub(crate) const DATA_BLOCK_START: Register = Register::AccdXLsb;
pub(crate) const DATA_BLOCK_LEN: usize = 6;

/// Raw accelerometer sample in 12-bit signed counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelRaw {
    /// X-axis raw count.
    pub x: i16,
    /// Y-axis raw count.
    pub y: i16,
    /// Z-axis raw count.
    pub z: i16,
}

/// Decodes a 12-bit left-justified axis pair (LSB then MSB).
///
/// The arithmetic shift preserves the sign of the 12-bit value.
pub(crate) const fn decode_axis(lsb: u8, msb: u8) -> i16 {
    i16::from_le_bytes([lsb, msb]) >> 4
}

impl AccelRaw {
    pub(crate) const fn from_data_block(bytes: &[u8; DATA_BLOCK_LEN]) -> Self {
        Self {
            x: decode_axis(bytes[0], bytes[1]),
            y: decode_axis(bytes[2], bytes[3]),
            z: decode_axis(bytes[4], bytes[5]),
        }
    }

    /// Converts the raw counts to a milli-g sample at the given range.
    pub const fn to_mg(self, range: GRange) -> AccelMg {
        AccelMg {
            x: scale::counts_to_mg(self.x, range),
            y: scale::counts_to_mg(self.y, range),
            z: scale::counts_to_mg(self.z, range),
        }
    }
}

/// Returns true when the data block carries a fresh X-axis sample.
pub(crate) const fn has_new_data(bytes: &[u8; DATA_BLOCK_LEN]) -> bool {
    (bytes[0] & accd_lsb::NEW_DATA) != 0
}

/// Accelerometer sample in milli-g.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelMg {
    /// X-axis acceleration in milli-g.
    pub x: i32,
    /// Y-axis acceleration in milli-g.
    pub y: i32,
    /// Z-axis acceleration in milli-g.
    pub z: i32,
}

/// Raw temperature sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemperatureRaw {
    /// Raw temperature count (0.5 degC/LSB, offset from 23 degC).
    pub value: i8,
}

impl TemperatureRaw {
    /// Converts the raw count to milli-degrees Celsius.
    pub const fn milli_celsius(self) -> i32 {
        (self.value as i32) * 500 + 23_000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_decode_is_sign_extended() {
        // 0x7FF is the positive full-scale 12-bit value.
        assert_eq!(decode_axis(0xF0, 0x7F), 2_047);
        // 0x800 is the negative full-scale 12-bit value.
        assert_eq!(decode_axis(0x00, 0x80), -2_048);
        assert_eq!(decode_axis(0x00, 0x00), 0);
        assert_eq!(decode_axis(0x10, 0x00), 1);
        assert_eq!(decode_axis(0xF0, 0xFF), -1);
    }

    #[test]
    fn data_block_decode() {
        let bytes = [0x11, 0x00, 0x00, 0x80, 0xF0, 0x7F];
        let raw = AccelRaw::from_data_block(&bytes);
        assert_eq!(raw.x, 1);
        assert_eq!(raw.y, -2_048);
        assert_eq!(raw.z, 2_047);
        assert!(has_new_data(&bytes));
        assert!(!has_new_data(&[0; DATA_BLOCK_LEN]));
    }

    #[test]
    fn raw_to_mg_per_range() {
        let raw = AccelRaw { x: 512, y: -256, z: 0 };
        let mg = raw.to_mg(GRange::G2);
        assert_eq!(mg, AccelMg { x: 500, y: -250, z: 0 });
        let mg = raw.to_mg(GRange::G8);
        assert_eq!(mg, AccelMg { x: 2_000, y: -1_000, z: 0 });
    }

    #[test]
    fn temperature_conversion() {
        assert_eq!(TemperatureRaw { value: 0 }.milli_celsius(), 23_000);
        assert_eq!(TemperatureRaw { value: 2 }.milli_celsius(), 24_000);
        assert_eq!(TemperatureRaw { value: -46 }.milli_celsius(), 0);
    }
}
