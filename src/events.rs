//! Logical sensor events and their hardware parameter encodings.
//!
//! Each event maps to a group of interrupt-status bits plus, for the
//! threshold-based events, a block of parameter registers (INT_0..INT_D)
//! that must be written before the event is armed.

use crate::config::GRange;
use crate::error::Error;
use crate::register::{int_status_0, int_status_3};

/// Logical sensor event that can be subscribed via the notification slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorEvent {
    /// Single tap.
    SingleTap,
    /// Double tap.
    DoubleTap,
    /// Free fall (low-g on all axes).
    FreeFall,
    /// Orientation change.
    OrientChange,
    /// Sleep (no motion for the configured duration).
    Sleep,
    /// Wakeup (slope / any motion).
    Wakeup,
    /// High-g on X, positive direction.
    HighGPositiveX,
    /// High-g on X, negative direction.
    HighGNegativeX,
    /// High-g on Y, positive direction.
    HighGPositiveY,
    /// High-g on Y, negative direction.
    HighGNegativeY,
    /// High-g on Z, positive direction.
    HighGPositiveZ,
    /// High-g on Z, negative direction.
    HighGNegativeZ,
}

impl SensorEvent {
    /// Returns true for the directional high-g variants, which share one
    /// hardware interrupt source and routing group.
    pub(crate) const fn is_high_g(self) -> bool {
        matches!(
            self,
            Self::HighGPositiveX
                | Self::HighGNegativeX
                | Self::HighGPositiveY
                | Self::HighGNegativeY
                | Self::HighGPositiveZ
                | Self::HighGNegativeZ
        )
    }

    /// INT_STATUS_0 bit announcing this event.
    pub(crate) const fn status_mask(self) -> u8 {
        match self {
            Self::SingleTap => int_status_0::S_TAP,
            Self::DoubleTap => int_status_0::D_TAP,
            Self::FreeFall => int_status_0::LOW_G,
            Self::OrientChange => int_status_0::ORIENT,
            Self::Sleep => int_status_0::SLO_NO_MOT,
            Self::Wakeup => int_status_0::SLOPE,
            _ => int_status_0::HIGH_G,
        }
    }

    /// Checks the INT_STATUS_3 direction bits for a high-g variant.
    ///
    /// HIGH_SIGN set means the acceleration was in the negative direction.
    pub(crate) const fn matches_high_g_direction(self, status3: u8) -> bool {
        let negative = (status3 & int_status_3::HIGH_SIGN) != 0;
        match self {
            Self::HighGPositiveX => !negative && (status3 & int_status_3::HIGH_FIRST_X) != 0,
            Self::HighGNegativeX => negative && (status3 & int_status_3::HIGH_FIRST_X) != 0,
            Self::HighGPositiveY => !negative && (status3 & int_status_3::HIGH_FIRST_Y) != 0,
            Self::HighGNegativeY => negative && (status3 & int_status_3::HIGH_FIRST_Y) != 0,
            Self::HighGPositiveZ => !negative && (status3 & int_status_3::HIGH_FIRST_Z) != 0,
            Self::HighGNegativeZ => negative && (status3 & int_status_3::HIGH_FIRST_Z) != 0,
            _ => true,
        }
    }
}

const fn scaled_counts(value_mg: u16, scale_ug: u32) -> u8 {
    let counts = (value_mg as u32).saturating_mul(1000) / scale_ug;
    if counts > 0xFF { 0xFF } else { counts as u8 }
}

/// Low-g (free fall) detection parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LowGConfig {
    /// Trigger delay in milliseconds (2..=512, 2 ms steps).
    pub delay_ms: u16,
    /// Threshold in milli-g (0..=1992).
    pub thresh_mg: u16,
    /// Hysteresis in milli-g (0..=375, 125 mg steps).
    pub hyst_mg: u16,
    /// Require the summed absolute value of all axes below threshold.
    pub axis_summing: bool,
}

impl LowGConfig {
    /// Default free-fall parameters.
    pub const DEFAULT: Self = Self {
        delay_ms: 20,
        thresh_mg: 375,
        hyst_mg: 125,
        axis_summing: false,
    };

    /// Encodes the INT_0/INT_1/INT_2 register values.
    pub(crate) fn encode(self) -> Result<[u8; 3], Error> {
        if self.delay_ms < 2 || self.delay_ms > 512 {
            return Err(Error::InvalidConfig);
        }
        if self.thresh_mg > 1992 || self.hyst_mg > 375 {
            return Err(Error::InvalidConfig);
        }
        let delay = ((self.delay_ms >> 1) - 1) as u8;
        let thresh = scaled_counts(self.thresh_mg, 7_810);
        let hyst = ((self.axis_summing as u8) << 2)
            | (scaled_counts(self.hyst_mg, 125_000) & 0x03);
        Ok([delay, thresh, hyst])
    }
}

impl Default for LowGConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// High-g detection parameters.
///
/// Threshold and hysteresis resolution scale with the configured range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HighGConfig {
    /// Trigger delay in milliseconds (2..=512, 2 ms steps).
    pub delay_ms: u16,
    /// Threshold in milli-g.
    pub thresh_mg: u16,
    /// Hysteresis in milli-g.
    pub hyst_mg: u16,
}

impl HighGConfig {
    /// Default high-g parameters.
    pub const DEFAULT: Self = Self {
        delay_ms: 32,
        thresh_mg: 1500,
        hyst_mg: 250,
    };

    const fn thresh_scale_ug(range: GRange) -> u32 {
        match range {
            GRange::G2 => 7_810,
            GRange::G4 => 15_630,
            GRange::G8 => 31_250,
            GRange::G16 => 62_500,
        }
    }

    const fn hyst_scale_ug(range: GRange) -> u32 {
        match range {
            GRange::G2 => 125_000,
            GRange::G4 => 250_000,
            GRange::G8 => 500_000,
            GRange::G16 => 1_000_000,
        }
    }

    /// Encodes the INT_2 (hysteresis bits)/INT_3/INT_4 register values.
    pub(crate) fn encode(self, range: GRange) -> Result<[u8; 3], Error> {
        let thresh_scale = Self::thresh_scale_ug(range);
        let hyst_scale = Self::hyst_scale_ug(range);
        if self.delay_ms < 2 || self.delay_ms > 512 {
            return Err(Error::InvalidConfig);
        }
        if u32::from(self.thresh_mg) * 1000 > thresh_scale * 255 {
            return Err(Error::InvalidConfig);
        }
        if u32::from(self.hyst_mg) * 1000 > hyst_scale * 3 {
            return Err(Error::InvalidConfig);
        }
        let hyst = (scaled_counts(self.hyst_mg, hyst_scale) & 0x03) << 6;
        let delay = ((self.delay_ms >> 1) - 1) as u8;
        let thresh = scaled_counts(self.thresh_mg, thresh_scale);
        Ok([hyst, delay, thresh])
    }
}

impl Default for HighGConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Slope (any motion / wakeup) detection parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlopeConfig {
    /// Consecutive samples above threshold required to trigger (1..=4).
    pub duration_samples: u8,
    /// Threshold in milli-g.
    pub thresh_mg: u16,
}

impl SlopeConfig {
    /// Default slope parameters.
    pub const DEFAULT: Self = Self {
        duration_samples: 2,
        thresh_mg: 100,
    };

    const fn thresh_scale_ug(range: GRange) -> u32 {
        match range {
            GRange::G2 => 3_910,
            GRange::G4 => 7_810,
            GRange::G8 => 15_630,
            GRange::G16 => 31_250,
        }
    }

    /// Encodes the INT_5 (duration bits)/INT_6 register values.
    pub(crate) fn encode(self, range: GRange) -> Result<[u8; 2], Error> {
        let scale = Self::thresh_scale_ug(range);
        if self.duration_samples < 1 || self.duration_samples > 4 {
            return Err(Error::InvalidConfig);
        }
        if u32::from(self.thresh_mg) * 1000 > scale * 255 {
            return Err(Error::InvalidConfig);
        }
        let duration = (self.duration_samples - 1) & 0x03;
        let thresh = scaled_counts(self.thresh_mg, scale);
        Ok([duration, thresh])
    }
}

impl Default for SlopeConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Slow/no-motion (sleep) detection parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlowNoMotConfig {
    /// Still duration in seconds before sleep triggers (1..=336).
    pub duration_s: u16,
    /// Threshold in milli-g.
    pub thresh_mg: u16,
}

impl SlowNoMotConfig {
    /// Default sleep parameters.
    pub const DEFAULT: Self = Self {
        duration_s: 2,
        thresh_mg: 100,
    };

    /// Encodes the INT_5 (duration bits)/INT_7 register values for the
    /// no-motion timer. The duration field changes resolution in three
    /// bands (1 s, 4 s, 8 s steps) with band-select flags in bits 7:6.
    pub(crate) fn encode(self, range: GRange) -> Result<[u8; 2], Error> {
        let scale = SlopeConfig::thresh_scale_ug(range);
        if self.duration_s < 1 || self.duration_s > 336 {
            return Err(Error::InvalidConfig);
        }
        if u32::from(self.thresh_mg) * 1000 > scale * 255 {
            return Err(Error::InvalidConfig);
        }
        let mut duration = self.duration_s;
        let encoded = if duration > 80 {
            if duration < 88 {
                duration = 88;
            }
            ((((duration - 88) >> 3) as u8) << 2) | 0x80
        } else if duration > 16 {
            if duration < 20 {
                duration = 20;
            }
            ((((duration - 20) >> 2) as u8) << 2) | 0x40
        } else {
            ((duration - 1) as u8) << 2
        };
        let thresh = scaled_counts(self.thresh_mg, scale);
        Ok([encoded, thresh])
    }
}

impl Default for SlowNoMotConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Quiet window after a tap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapQuiet {
    /// 30 ms quiet window.
    Ms30,
    /// 20 ms quiet window.
    Ms20,
}

/// Shock window for a tap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapShock {
    /// 50 ms shock window.
    Ms50,
    /// 75 ms shock window.
    Ms75,
}

/// Double-tap window between the two taps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DoubleTapWindow {
    /// 50 ms.
    Ms50,
    /// 100 ms.
    Ms100,
    /// 150 ms.
    Ms150,
    /// 200 ms.
    Ms200,
    /// 250 ms.
    Ms250,
    /// 375 ms.
    Ms375,
    /// 500 ms.
    Ms500,
    /// 700 ms.
    Ms700,
}

impl DoubleTapWindow {
    const fn bits(self) -> u8 {
        match self {
            Self::Ms50 => 0x00,
            Self::Ms100 => 0x01,
            Self::Ms150 => 0x02,
            Self::Ms200 => 0x03,
            Self::Ms250 => 0x04,
            Self::Ms375 => 0x05,
            Self::Ms500 => 0x06,
            Self::Ms700 => 0x07,
        }
    }
}

/// Wake-up sample count after a tap in low-power mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapWakeSamples {
    /// 2 samples.
    Samples2,
    /// 4 samples.
    Samples4,
    /// 8 samples.
    Samples8,
    /// 16 samples.
    Samples16,
}

impl TapWakeSamples {
    const fn bits(self) -> u8 {
        match self {
            Self::Samples2 => 0b00,
            Self::Samples4 => 0b01,
            Self::Samples8 => 0b10,
            Self::Samples16 => 0b11,
        }
    }
}

/// Tap detection parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TapConfig {
    /// Quiet window.
    pub quiet: TapQuiet,
    /// Shock window.
    pub shock: TapShock,
    /// Double-tap window.
    pub double_window: DoubleTapWindow,
    /// Wake-up sample count.
    pub wake_samples: TapWakeSamples,
    /// Threshold in milli-g.
    pub thresh_mg: u16,
}

impl TapConfig {
    /// Default tap parameters.
    pub const DEFAULT: Self = Self {
        quiet: TapQuiet::Ms30,
        shock: TapShock::Ms50,
        double_window: DoubleTapWindow::Ms250,
        wake_samples: TapWakeSamples::Samples2,
        thresh_mg: 250,
    };

    const fn thresh_scale_ug(range: GRange) -> u32 {
        match range {
            GRange::G2 => 62_500,
            GRange::G4 => 125_000,
            GRange::G8 => 250_000,
            GRange::G16 => 500_000,
        }
    }

    /// Encodes the INT_8/INT_9 register values.
    pub(crate) fn encode(self, range: GRange) -> Result<[u8; 2], Error> {
        let scale = Self::thresh_scale_ug(range);
        if u32::from(self.thresh_mg) * 1000 > scale * 31 {
            return Err(Error::InvalidConfig);
        }
        let mut timing = self.double_window.bits();
        if matches!(self.quiet, TapQuiet::Ms20) {
            timing |= 0x80;
        }
        if matches!(self.shock, TapShock::Ms75) {
            timing |= 0x40;
        }
        let samples_thresh =
            (self.wake_samples.bits() << 6) | (scaled_counts(self.thresh_mg, scale) & 0x1F);
        Ok([timing, samples_thresh])
    }
}

impl Default for TapConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Orientation blocking condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OrientBlocking {
    /// No blocking.
    None,
    /// Block on acceleration only.
    AccelOnly,
    /// Block on acceleration and slope.
    AccelAndSlope,
    /// Block on acceleration, slope, and stability.
    AccelSlopeStable,
}

impl OrientBlocking {
    const fn bits(self) -> u8 {
        match self {
            Self::None => 0b00,
            Self::AccelOnly => 0b01,
            Self::AccelAndSlope => 0b10,
            Self::AccelSlopeStable => 0b11,
        }
    }
}

/// Orientation detection symmetry mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OrientMode {
    /// Symmetrical thresholds.
    Symmetrical,
    /// High-asymmetrical thresholds.
    HighAsymmetrical,
    /// Low-asymmetrical thresholds.
    LowAsymmetrical,
}

impl OrientMode {
    const fn bits(self) -> u8 {
        match self {
            Self::Symmetrical => 0b00,
            Self::HighAsymmetrical => 0b01,
            Self::LowAsymmetrical => 0b10,
        }
    }
}

/// Orientation change detection parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OrientConfig {
    /// Hysteresis in milli-g (62.5 mg steps, 0..=437).
    pub hyst_mg: u16,
    /// Blocking condition.
    pub blocking: OrientBlocking,
    /// Symmetry mode.
    pub mode: OrientMode,
    /// Signal up/down changes on the Z axis.
    pub signal_up_down: bool,
    /// Blocking angle (0..=0x3F).
    pub blocking_angle: u8,
}

impl OrientConfig {
    /// Default orientation parameters.
    pub const DEFAULT: Self = Self {
        hyst_mg: 125,
        blocking: OrientBlocking::AccelAndSlope,
        mode: OrientMode::Symmetrical,
        signal_up_down: false,
        blocking_angle: 0x08,
    };

    /// Encodes the INT_A/INT_B register values.
    pub(crate) fn encode(self) -> Result<[u8; 2], Error> {
        if self.hyst_mg > 437 || self.blocking_angle > 0x3F {
            return Err(Error::InvalidConfig);
        }
        let first = (scaled_counts(self.hyst_mg, 62_500) << 4)
            | (self.blocking.bits() << 2)
            | self.mode.bits();
        let second = ((self.signal_up_down as u8) << 6) | (self.blocking_angle & 0x3F);
        Ok([first, second])
    }
}

impl Default for OrientConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
