//! I2C address definitions for the BMA253.

/// BMA253 I2C addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bma253Address {
    /// Primary address: 0x18 (SDO = low).
    Primary,
    /// Secondary address: 0x19 (SDO = high).
    Secondary,
}

impl Bma253Address {
    /// Returns the 7-bit I2C address.
    pub const fn addr(self) -> u8 {
        match self {
            Self::Primary => 0x18,
            Self::Secondary => 0x19,
        }
    }
}
