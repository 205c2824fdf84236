//! Configuration helpers for the BMA253.

pub(crate) mod common;
pub(crate) mod power;

pub use common::{Bandwidth, GRange, PowerMode, SleepDuration};
pub(crate) use power::{PowerPlan, plan_transition};

use crate::error::Error;
use crate::events::{
    HighGConfig, LowGConfig, OrientConfig, SlopeConfig, SlowNoMotConfig, TapConfig,
};
use crate::interrupt::{IntLatch, IntPin, PinConfig};

/// Bandwidth floor used while the double-tap engine is armed; the tap
/// timing windows need at least this sample rate.
pub(crate) const TAP_BANDWIDTH_FLOOR: Bandwidth = Bandwidth::Hz125;

/// Hardware state the streaming loop and the event subsystem arbitrate
/// over: the power mode and filter bandwidth currently wanted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HwConfig {
    /// Target power mode.
    pub power: PowerMode,
    /// Target filter bandwidth.
    pub bandwidth: Bandwidth,
}

/// BMA253 configuration settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Full-scale range.
    pub range: GRange,
    /// Filter bandwidth during acquisition.
    pub bandwidth: Bandwidth,
    /// Sleep phase duration for the duty-cycled low-power modes.
    pub sleep: SleepDuration,
    /// Bypass the output filter (high-bandwidth data path).
    pub unfiltered_data: bool,
    /// Interrupt pin wired to the host.
    pub int_pin: IntPin,
    /// Electrical behavior of that pin.
    pub pin_config: PinConfig,
    /// Interrupt latch mode used outside temporary overrides.
    pub latch: IntLatch,
    /// Low-g (free fall) detection parameters.
    pub low_g: LowGConfig,
    /// High-g detection parameters.
    pub high_g: HighGConfig,
    /// Tap detection parameters.
    pub tap: TapConfig,
    /// Slope (wakeup) detection parameters.
    pub slope: SlopeConfig,
    /// Slow/no-motion (sleep) detection parameters.
    pub slow_no_mot: SlowNoMotConfig,
    /// Orientation detection parameters.
    pub orient: OrientConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Creates a default configuration.
    pub const fn new() -> Self {
        Self {
            range: GRange::G2,
            bandwidth: Bandwidth::Hz125,
            sleep: SleepDuration::Ms0_5,
            unfiltered_data: false,
            int_pin: IntPin::Int1,
            pin_config: PinConfig::DEFAULT,
            latch: IntLatch::NonLatched,
            low_g: LowGConfig::DEFAULT,
            high_g: HighGConfig::DEFAULT,
            tap: TapConfig::DEFAULT,
            slope: SlopeConfig::DEFAULT,
            slow_no_mot: SlowNoMotConfig::DEFAULT,
            orient: OrientConfig::DEFAULT,
        }
    }

    /// Sets the full-scale range.
    #[must_use]
    pub const fn with_range(mut self, range: GRange) -> Self {
        self.range = range;
        self
    }

    /// Sets the acquisition filter bandwidth.
    #[must_use]
    pub const fn with_bandwidth(mut self, bandwidth: Bandwidth) -> Self {
        self.bandwidth = bandwidth;
        self
    }

    /// Sets the low-power sleep phase duration.
    #[must_use]
    pub const fn with_sleep(mut self, sleep: SleepDuration) -> Self {
        self.sleep = sleep;
        self
    }

    /// Enables or disables the unfiltered data path.
    #[must_use]
    pub const fn with_unfiltered_data(mut self, enable: bool) -> Self {
        self.unfiltered_data = enable;
        self
    }

    /// Sets the interrupt pin wired to the host.
    #[must_use]
    pub const fn with_int_pin(mut self, pin: IntPin) -> Self {
        self.int_pin = pin;
        self
    }

    /// Sets the interrupt pin electrical behavior.
    #[must_use]
    pub const fn with_pin_config(mut self, pin_config: PinConfig) -> Self {
        self.pin_config = pin_config;
        self
    }

    /// Sets the interrupt latch mode.
    #[must_use]
    pub const fn with_latch(mut self, latch: IntLatch) -> Self {
        self.latch = latch;
        self
    }

    /// Sets the low-g detection parameters.
    #[must_use]
    pub const fn with_low_g(mut self, low_g: LowGConfig) -> Self {
        self.low_g = low_g;
        self
    }

    /// Sets the high-g detection parameters.
    #[must_use]
    pub const fn with_high_g(mut self, high_g: HighGConfig) -> Self {
        self.high_g = high_g;
        self
    }

    /// Sets the tap detection parameters.
    #[must_use]
    pub const fn with_tap(mut self, tap: TapConfig) -> Self {
        self.tap = tap;
        self
    }

    /// Sets the slope detection parameters.
    #[must_use]
    pub const fn with_slope(mut self, slope: SlopeConfig) -> Self {
        self.slope = slope;
        self
    }

    /// Sets the slow/no-motion detection parameters.
    #[must_use]
    pub const fn with_slow_no_mot(mut self, slow_no_mot: SlowNoMotConfig) -> Self {
        self.slow_no_mot = slow_no_mot;
        self
    }

    /// Sets the orientation detection parameters.
    #[must_use]
    pub const fn with_orient(mut self, orient: OrientConfig) -> Self {
        self.orient = orient;
        self
    }

    /// Validates all event parameter encodings against the configured
    /// range.
    pub(crate) fn validate(self) -> Result<(), Error> {
        self.low_g.encode()?;
        self.high_g.encode(self.range)?;
        self.tap.encode(self.range)?;
        self.slope.encode(self.range)?;
        self.slow_no_mot.encode(self.range)?;
        self.orient.encode()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(Config::new().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_bad_event_params() {
        let config = Config::new().with_low_g(LowGConfig {
            delay_ms: 1,
            ..LowGConfig::DEFAULT
        });
        assert_eq!(config.validate(), Err(Error::InvalidConfig));

        // High-g threshold valid at 16g but not at 2g.
        let high_g = HighGConfig {
            delay_ms: 32,
            thresh_mg: 4_000,
            hyst_mg: 0,
        };
        let config = Config::new().with_high_g(high_g).with_range(GRange::G16);
        assert_eq!(config.validate(), Ok(()));
        let config = Config::new().with_high_g(high_g).with_range(GRange::G2);
        assert_eq!(config.validate(), Err(Error::InvalidConfig));
    }
}
