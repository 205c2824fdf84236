//! Interrupt routing, latching, and status decoding.

use crate::register::{int_out_ctrl, int_rst_latch, int_status_0, int_status_1, int_status_3};

/// Interrupt pin selection (device pins).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntPin {
    /// Interrupt pin 1.
    Int1,
    /// Interrupt pin 2.
    Int2,
}

/// Electrical behavior of an interrupt pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    /// Open-drain output instead of push-pull.
    pub open_drain: bool,
    /// Active-high level instead of active-low.
    pub active_high: bool,
}

impl PinConfig {
    /// Default pin behavior: push-pull, active-high.
    pub const DEFAULT: Self = Self {
        open_drain: false,
        active_high: true,
    };

    /// Sets open-drain output.
    #[must_use]
    pub const fn with_open_drain(mut self, enable: bool) -> Self {
        self.open_drain = enable;
        self
    }

    /// Sets active-high level.
    #[must_use]
    pub const fn with_active_high(mut self, enable: bool) -> Self {
        self.active_high = enable;
        self
    }

    /// Returns this pin's INT_OUT_CTRL bits and the mask they occupy.
    pub(crate) const fn out_ctrl_bits(self, pin: IntPin) -> (u8, u8) {
        let (od, lvl) = match pin {
            IntPin::Int1 => (int_out_ctrl::INT1_OD, int_out_ctrl::INT1_LVL),
            IntPin::Int2 => (int_out_ctrl::INT2_OD, int_out_ctrl::INT2_LVL),
        };
        let mut bits = 0;
        if self.open_drain {
            bits |= od;
        }
        if self.active_high {
            bits |= lvl;
        }
        (bits, od | lvl)
    }
}

impl Default for PinConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Interrupt latch mode (INT_RST_LATCH bits 3:0).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntLatch {
    /// Interrupt line follows the condition.
    NonLatched,
    /// Latched for 250 ms.
    Temporary250Ms,
    /// Latched for 500 ms.
    Temporary500Ms,
    /// Latched for 1 s.
    Temporary1S,
    /// Latched for 2 s.
    Temporary2S,
    /// Latched for 4 s.
    Temporary4S,
    /// Latched for 8 s.
    Temporary8S,
    /// Latched for 250 us.
    Temporary250Us,
    /// Latched for 500 us.
    Temporary500Us,
    /// Latched for 1 ms.
    Temporary1Ms,
    /// Latched for 12.5 ms.
    Temporary12_5Ms,
    /// Latched for 25 ms.
    Temporary25Ms,
    /// Latched for 50 ms.
    Temporary50Ms,
    /// Latched until cleared by software.
    Latched,
}

impl IntLatch {
    pub(crate) const fn bits(self) -> u8 {
        match self {
            Self::NonLatched => 0x00,
            Self::Temporary250Ms => 0x01,
            Self::Temporary500Ms => 0x02,
            Self::Temporary1S => 0x03,
            Self::Temporary2S => 0x04,
            Self::Temporary4S => 0x05,
            Self::Temporary8S => 0x06,
            Self::Temporary250Us => 0x09,
            Self::Temporary500Us => 0x0A,
            Self::Temporary1Ms => 0x0B,
            Self::Temporary12_5Ms => 0x0C,
            Self::Temporary25Ms => 0x0D,
            Self::Temporary50Ms => 0x0E,
            Self::Latched => 0x0F,
        }
    }

    pub(crate) const fn from_reg(value: u8) -> Self {
        match value & int_rst_latch::LATCH_MODE_MASK {
            0x01 => Self::Temporary250Ms,
            0x02 => Self::Temporary500Ms,
            0x03 => Self::Temporary1S,
            0x04 => Self::Temporary2S,
            0x05 => Self::Temporary4S,
            0x06 => Self::Temporary8S,
            0x07 | 0x0F => Self::Latched,
            0x09 => Self::Temporary250Us,
            0x0A => Self::Temporary500Us,
            0x0B => Self::Temporary1Ms,
            0x0C => Self::Temporary12_5Ms,
            0x0D => Self::Temporary25Ms,
            0x0E => Self::Temporary50Ms,
            _ => Self::NonLatched,
        }
    }
}

/// Saved contents of the three interrupt enable registers.
///
/// The streaming loop masks all sources while it reconfigures and
/// restores this snapshot on exit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct IntEnableSnapshot {
    /// INT_EN_0, INT_EN_1, INT_EN_2 in register order.
    pub regs: [u8; 3],
}

/// Decoded interrupt status flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntStatus {
    /// Flat position detected.
    pub flat: bool,
    /// Orientation changed.
    pub orient: bool,
    /// Single tap detected.
    pub single_tap: bool,
    /// Double tap detected.
    pub double_tap: bool,
    /// Slow/no-motion condition met.
    pub slo_no_mot: bool,
    /// Slope (any motion) detected.
    pub slope: bool,
    /// High-g condition met.
    pub high_g: bool,
    /// Low-g condition met.
    pub low_g: bool,
    /// New data sample available.
    pub data_ready: bool,
    /// FIFO full.
    pub fifo_full: bool,
    /// FIFO watermark reached.
    pub fifo_watermark: bool,
    /// Raw INT_STATUS_2 (slope/tap direction bits).
    pub status2: u8,
    /// Raw INT_STATUS_3 (high-g direction, orientation bits).
    pub status3: u8,
}

impl IntStatus {
    pub(crate) const fn from_regs(s0: u8, s1: u8, s2: u8, s3: u8) -> Self {
        Self {
            flat: (s0 & int_status_0::FLAT) != 0,
            orient: (s0 & int_status_0::ORIENT) != 0,
            single_tap: (s0 & int_status_0::S_TAP) != 0,
            double_tap: (s0 & int_status_0::D_TAP) != 0,
            slo_no_mot: (s0 & int_status_0::SLO_NO_MOT) != 0,
            slope: (s0 & int_status_0::SLOPE) != 0,
            high_g: (s0 & int_status_0::HIGH_G) != 0,
            low_g: (s0 & int_status_0::LOW_G) != 0,
            data_ready: (s1 & int_status_1::DATA) != 0,
            fifo_full: (s1 & int_status_1::FFULL) != 0,
            fifo_watermark: (s1 & int_status_1::FWM) != 0,
            status2: s2,
            status3: s3,
        }
    }

    /// Returns the 3-bit orientation value from INT_STATUS_3.
    pub const fn orientation(self) -> u8 {
        (self.status3 & int_status_3::ORIENT_MASK) >> int_status_3::ORIENT_SHIFT
    }

    /// Returns true if any event flag is set.
    pub const fn any(self) -> bool {
        self.flat
            || self.orient
            || self.single_tap
            || self.double_tap
            || self.slo_no_mot
            || self.slope
            || self.high_g
            || self.low_g
            || self.data_ready
            || self.fifo_full
            || self.fifo_watermark
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_status_flags() {
        let status = IntStatus::from_regs(
            int_status_0::S_TAP | int_status_0::HIGH_G,
            int_status_1::FWM,
            0x00,
            int_status_3::HIGH_SIGN | int_status_3::HIGH_FIRST_Z | (0x05 << 4),
        );
        assert!(status.single_tap);
        assert!(status.high_g);
        assert!(status.fifo_watermark);
        assert!(!status.double_tap);
        assert!(!status.data_ready);
        assert_eq!(status.orientation(), 0x05);
        assert!(status.any());
        assert!(!IntStatus::default().any());
    }

    #[test]
    fn latch_mode_round_trip() {
        for mode in [
            IntLatch::NonLatched,
            IntLatch::Temporary250Ms,
            IntLatch::Temporary500Ms,
            IntLatch::Temporary50Ms,
            IntLatch::Latched,
        ] {
            assert_eq!(IntLatch::from_reg(mode.bits()), mode);
        }
        // 0x07 is the alternate latched encoding.
        assert_eq!(IntLatch::from_reg(0x07), IntLatch::Latched);
        assert_eq!(IntLatch::from_reg(0x08), IntLatch::NonLatched);
    }

    #[test]
    fn pin_electrical_bits() {
        let cfg = PinConfig::DEFAULT.with_open_drain(true);
        let (bits, mask) = cfg.out_ctrl_bits(IntPin::Int2);
        assert_eq!(bits, int_out_ctrl::INT2_OD | int_out_ctrl::INT2_LVL);
        assert_eq!(mask, int_out_ctrl::INT2_OD | int_out_ctrl::INT2_LVL);

        let cfg = PinConfig::DEFAULT.with_active_high(false);
        let (bits, _) = cfg.out_ctrl_bits(IntPin::Int1);
        assert_eq!(bits, 0);
    }
}
