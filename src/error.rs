//! Error type for the BMA253 driver.

/// Error type for BMA253 operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Bus communication error (I2C, SPI, etc.).
    Bus,
    /// Interrupt pin read error.
    Pin,
    /// Invalid chip ID or wrong device.
    WrongDevice,
    /// Hardware condition not reached within the bounded poll.
    NotReady,
    /// Invalid configuration value.
    InvalidConfig,
    /// The requested exclusive resource is already owned.
    Busy,
}
