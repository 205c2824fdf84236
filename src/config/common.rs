use crate::register::{pmu_low_power, pmu_range};

/// Accelerometer full-scale range selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GRange {
    /// +/-2 g range.
    G2,
    /// +/-4 g range.
    G4,
    /// +/-8 g range.
    G8,
    /// +/-16 g range.
    G16,
}

impl GRange {
    /// Returns the full-scale range in g.
    pub const fn g(self) -> u16 {
        match self {
            Self::G2 => 2,
            Self::G4 => 4,
            Self::G8 => 8,
            Self::G16 => 16,
        }
    }

    /// Returns the PMU_RANGE register value.
    pub(crate) const fn bits(self) -> u8 {
        match self {
            Self::G2 => pmu_range::RANGE_2G,
            Self::G4 => pmu_range::RANGE_4G,
            Self::G8 => pmu_range::RANGE_8G,
            Self::G16 => pmu_range::RANGE_16G,
        }
    }

    pub(crate) const fn from_reg(value: u8) -> Option<Self> {
        match value {
            pmu_range::RANGE_2G => Some(Self::G2),
            pmu_range::RANGE_4G => Some(Self::G4),
            pmu_range::RANGE_8G => Some(Self::G8),
            pmu_range::RANGE_16G => Some(Self::G16),
            _ => None,
        }
    }
}

/// Output filter bandwidth selection.
///
/// The output data rate is twice the filter bandwidth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bandwidth {
    /// 7.81 Hz filter bandwidth.
    Hz7_81,
    /// 15.63 Hz filter bandwidth.
    Hz15_63,
    /// 31.25 Hz filter bandwidth.
    Hz31_25,
    /// 62.5 Hz filter bandwidth.
    Hz62_5,
    /// 125 Hz filter bandwidth.
    Hz125,
    /// 250 Hz filter bandwidth.
    Hz250,
    /// 500 Hz filter bandwidth.
    Hz500,
    /// 1000 Hz filter bandwidth.
    Hz1000,
}

impl Bandwidth {
    const STEP_OF_HZ1000: u8 = 7;

    /// Returns the PMU_BW register value.
    pub(crate) const fn bits(self) -> u8 {
        0x08 + self.step()
    }

    /// Decodes a PMU_BW register value.
    ///
    /// The hardware treats out-of-range values as the nearest supported
    /// setting; the inclusive clamp boundaries are chip-specific and kept
    /// exactly as documented.
    pub(crate) const fn from_reg(value: u8) -> Self {
        match value {
            0x00..=0x08 => Self::Hz7_81,
            0x09 => Self::Hz15_63,
            0x0A => Self::Hz31_25,
            0x0B => Self::Hz62_5,
            0x0C => Self::Hz125,
            0x0D => Self::Hz250,
            0x0E => Self::Hz500,
            _ => Self::Hz1000,
        }
    }

    const fn step(self) -> u8 {
        match self {
            Self::Hz7_81 => 0,
            Self::Hz15_63 => 1,
            Self::Hz31_25 => 2,
            Self::Hz62_5 => 3,
            Self::Hz125 => 4,
            Self::Hz250 => 5,
            Self::Hz500 => 6,
            Self::Hz1000 => 7,
        }
    }

    /// Returns the bandwidth in milli-hertz.
    pub const fn hz_milli(self) -> u32 {
        match self {
            Self::Hz7_81 => 7_810,
            Self::Hz15_63 => 15_630,
            Self::Hz31_25 => 31_250,
            Self::Hz62_5 => 62_500,
            Self::Hz125 => 125_000,
            Self::Hz250 => 250_000,
            Self::Hz500 => 500_000,
            Self::Hz1000 => 1_000_000,
        }
    }

    /// Returns the output sample interval in microseconds.
    ///
    /// The output data rate is 2x the filter bandwidth, so the interval
    /// doubles with every step down from the 1000 Hz setting (500 us).
    pub const fn sample_interval_us(self) -> u32 {
        500u32 << (Self::STEP_OF_HZ1000 - self.step())
    }

    /// Returns the polling fallback delay in milliseconds used when no
    /// interrupt line is available: 1 ms at 1000 Hz, doubling per step down.
    pub(crate) const fn fallback_delay_ms(self) -> u32 {
        1u32 << (Self::STEP_OF_HZ1000 - self.step())
    }
}

/// Chip power mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerMode {
    /// Full-speed sampling.
    Normal,
    /// Everything off; all configuration registers are lost.
    DeepSuspend,
    /// Sampling stopped, registers retained.
    Suspend,
    /// Sampling stopped, registers retained, faster wake-up.
    Standby,
    /// Duty-cycled sampling, event-driven sleep.
    Lpm1,
    /// Duty-cycled sampling, equidistant sleep.
    Lpm2,
}

impl PowerMode {
    /// Returns the 3-bit PMU_LPW power field (bits 7:5).
    pub(crate) const fn lpw_bits(self) -> u8 {
        match self {
            Self::Normal => 0b000,
            Self::DeepSuspend => 0b001,
            Self::Lpm1 | Self::Lpm2 => 0b010,
            Self::Suspend | Self::Standby => 0b100,
        }
    }

    /// Returns the PMU_LOW_POWER register value selecting the mode variant.
    pub(crate) const fn low_power_bits(self) -> u8 {
        match self {
            Self::Standby | Self::Lpm2 => pmu_low_power::LPM2_SELECT,
            _ => 0,
        }
    }

    /// Returns true for modes that stop the sampling clock.
    pub(crate) const fn is_suspend_class(self) -> bool {
        !matches!(self, Self::Normal)
    }
}

/// Sleep phase duration for the duty-cycled low-power modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SleepDuration {
    /// 0.5 ms sleep phase.
    Ms0_5,
    /// 1 ms sleep phase.
    Ms1,
    /// 2 ms sleep phase.
    Ms2,
    /// 4 ms sleep phase.
    Ms4,
    /// 6 ms sleep phase.
    Ms6,
    /// 10 ms sleep phase.
    Ms10,
    /// 25 ms sleep phase.
    Ms25,
    /// 50 ms sleep phase.
    Ms50,
    /// 100 ms sleep phase.
    Ms100,
    /// 500 ms sleep phase.
    Ms500,
    /// 1 s sleep phase.
    Ms1000,
}

impl SleepDuration {
    /// Returns the 4-bit PMU_LPW sleep duration field (bits 4:1).
    pub(crate) const fn bits(self) -> u8 {
        match self {
            Self::Ms0_5 => 0x05,
            Self::Ms1 => 0x06,
            Self::Ms2 => 0x07,
            Self::Ms4 => 0x08,
            Self::Ms6 => 0x09,
            Self::Ms10 => 0x0A,
            Self::Ms25 => 0x0B,
            Self::Ms50 => 0x0C,
            Self::Ms100 => 0x0D,
            Self::Ms500 => 0x0E,
            Self::Ms1000 => 0x0F,
        }
    }
}
