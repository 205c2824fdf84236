//! BMA253 register definitions.
//!
//! This module contains the register map from the datasheet, plus the bit
//! masks used by the driver.

#![allow(dead_code)] // Full register map is intentional; many entries are not wired yet.

/// BMA253 register addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    /// Chip identification register.
    BgwChipId = 0x00,
    /// Accelerometer X-axis low byte (new-data flag in bit 0).
    AccdXLsb = 0x02,
    /// Accelerometer X-axis high byte.
    AccdXMsb = 0x03,
    /// Accelerometer Y-axis low byte.
    AccdYLsb = 0x04,
    /// Accelerometer Y-axis high byte.
    AccdYMsb = 0x05,
    /// Accelerometer Z-axis low byte.
    AccdZLsb = 0x06,
    /// Accelerometer Z-axis high byte.
    AccdZMsb = 0x07,
    /// Temperature register.
    AccdTemp = 0x08,
    /// Interrupt status 0 (event flags).
    IntStatus0 = 0x09,
    /// Interrupt status 1 (data/FIFO flags).
    IntStatus1 = 0x0A,
    /// Interrupt status 2 (slope/tap direction).
    IntStatus2 = 0x0B,
    /// Interrupt status 3 (high-g direction, orientation).
    IntStatus3 = 0x0C,
    /// FIFO status (overrun flag + frame counter).
    FifoStatus = 0x0E,
    /// Full-scale range selection.
    PmuRange = 0x0F,
    /// Filter bandwidth selection.
    PmuBw = 0x10,
    /// Power mode and sleep duration.
    PmuLpw = 0x11,
    /// Low-power mode variant and sleep-timer mode.
    PmuLowPower = 0x12,
    /// Data high-bandwidth (unfiltered) selection.
    AccdHbw = 0x13,
    /// Soft-reset register.
    BgwSoftReset = 0x14,
    /// Interrupt enable 0 (slope/tap/orient/flat).
    IntEn0 = 0x16,
    /// Interrupt enable 1 (data/FIFO/low-g/high-g).
    IntEn1 = 0x17,
    /// Interrupt enable 2 (slow/no-motion).
    IntEn2 = 0x18,
    /// INT1 pin routing for event interrupts.
    IntMap0 = 0x19,
    /// INT1/INT2 pin routing for data and FIFO interrupts.
    IntMap1 = 0x1A,
    /// INT2 pin routing for event interrupts.
    IntMap2 = 0x1B,
    /// Interrupt source (filtered vs unfiltered) selection.
    IntSrc = 0x1E,
    /// Interrupt pin electrical behavior.
    IntOutCtrl = 0x20,
    /// Interrupt latch mode and reset.
    IntRstLatch = 0x21,
    /// Low-g delay.
    Int0 = 0x22,
    /// Low-g threshold.
    Int1 = 0x23,
    /// Low-g hysteresis and axis summing.
    Int2 = 0x24,
    /// High-g delay.
    Int3 = 0x25,
    /// High-g threshold.
    Int4 = 0x26,
    /// Slope duration / slow-no-motion duration.
    Int5 = 0x27,
    /// Slope threshold.
    Int6 = 0x28,
    /// Slow/no-motion threshold.
    Int7 = 0x29,
    /// Tap timing.
    Int8 = 0x2A,
    /// Tap samples and threshold.
    Int9 = 0x2B,
    /// Orientation hysteresis/blocking/mode.
    IntA = 0x2C,
    /// Orientation up/down and blocking angle.
    IntB = 0x2D,
    /// Flat angle.
    IntC = 0x2E,
    /// Flat hold time and hysteresis.
    IntD = 0x2F,
    /// FIFO watermark level.
    FifoConfig0 = 0x30,
    /// Self-test control.
    PmuSelfTest = 0x32,
    /// Offset compensation control and ready flag.
    OfcCtrl = 0x36,
    /// Offset compensation settings (targets, cut-off).
    OfcSetting = 0x37,
    /// X-axis offset.
    OfcOffsetX = 0x38,
    /// Y-axis offset.
    OfcOffsetY = 0x39,
    /// Z-axis offset.
    OfcOffsetZ = 0x3A,
    /// General-purpose trim register 0.
    TrimGp0 = 0x3B,
    /// General-purpose trim register 1.
    TrimGp1 = 0x3C,
    /// FIFO mode and data selection.
    FifoConfig1 = 0x3E,
    /// FIFO data readout register.
    FifoData = 0x3F,
}

impl Register {
    /// Returns the register address.
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

/// Expected values for BGW_CHIPID.
pub mod chip_id {
    /// Expected chip identification value.
    pub const EXPECTED: u8 = 0xFA;
}

/// ACCD LSB register bits (shared by X/Y/Z low bytes).
pub mod accd_lsb {
    /// New-data flag.
    pub const NEW_DATA: u8 = 0b0000_0001;
    /// Low nibble of the 12-bit sample.
    pub const ACCD_MASK: u8 = 0b1111_0000;
}

/// INT_STATUS_0 register bits.
pub mod int_status_0 {
    /// Flat condition detected.
    pub const FLAT: u8 = 0b1000_0000;
    /// Orientation change detected.
    pub const ORIENT: u8 = 0b0100_0000;
    /// Single tap detected.
    pub const S_TAP: u8 = 0b0010_0000;
    /// Double tap detected.
    pub const D_TAP: u8 = 0b0001_0000;
    /// Slow/no-motion detected.
    pub const SLO_NO_MOT: u8 = 0b0000_1000;
    /// Slope (any-motion) detected.
    pub const SLOPE: u8 = 0b0000_0100;
    /// High-g detected.
    pub const HIGH_G: u8 = 0b0000_0010;
    /// Low-g detected.
    pub const LOW_G: u8 = 0b0000_0001;
}

/// INT_STATUS_1 register bits.
pub mod int_status_1 {
    /// New data available.
    pub const DATA: u8 = 0b1000_0000;
    /// FIFO full.
    pub const FFULL: u8 = 0b0100_0000;
    /// FIFO watermark reached.
    pub const FWM: u8 = 0b0010_0000;
}

/// INT_STATUS_2 register bits.
pub mod int_status_2 {
    /// Slope sign (1 = negative).
    pub const SLOPE_SIGN: u8 = 0b0000_1000;
    /// Slope first triggered on Z.
    pub const SLOPE_FIRST_Z: u8 = 0b0000_0100;
    /// Slope first triggered on Y.
    pub const SLOPE_FIRST_Y: u8 = 0b0000_0010;
    /// Slope first triggered on X.
    pub const SLOPE_FIRST_X: u8 = 0b0000_0001;
    /// Tap sign (1 = negative).
    pub const TAP_SIGN: u8 = 0b1000_0000;
    /// Tap first triggered on Z.
    pub const TAP_FIRST_Z: u8 = 0b0100_0000;
    /// Tap first triggered on Y.
    pub const TAP_FIRST_Y: u8 = 0b0010_0000;
    /// Tap first triggered on X.
    pub const TAP_FIRST_X: u8 = 0b0001_0000;
}

/// INT_STATUS_3 register bits.
pub mod int_status_3 {
    /// Flat condition value.
    pub const FLAT: u8 = 0b1000_0000;
    /// Orientation value mask.
    pub const ORIENT_MASK: u8 = 0b0111_0000;
    /// Orientation value shift.
    pub const ORIENT_SHIFT: u8 = 4;
    /// High-g sign (1 = negative direction).
    pub const HIGH_SIGN: u8 = 0b0000_1000;
    /// High-g first triggered on Z.
    pub const HIGH_FIRST_Z: u8 = 0b0000_0100;
    /// High-g first triggered on Y.
    pub const HIGH_FIRST_Y: u8 = 0b0000_0010;
    /// High-g first triggered on X.
    pub const HIGH_FIRST_X: u8 = 0b0000_0001;
}

/// FIFO_STATUS register bits.
pub mod fifo_status {
    /// FIFO overrun flag.
    pub const OVERRUN: u8 = 0b1000_0000;
    /// Frame counter mask.
    pub const FRAME_COUNTER_MASK: u8 = 0b0111_1111;
}

/// PMU_RANGE register values.
pub mod pmu_range {
    /// +/-2 g.
    pub const RANGE_2G: u8 = 0x03;
    /// +/-4 g.
    pub const RANGE_4G: u8 = 0x05;
    /// +/-8 g.
    pub const RANGE_8G: u8 = 0x08;
    /// +/-16 g.
    pub const RANGE_16G: u8 = 0x0C;
}

/// PMU_LPW register bits.
pub mod pmu_lpw {
    /// Power mode mask (bits 7:5).
    pub const POWER_MODE_MASK: u8 = 0b1110_0000;
    /// Power mode shift.
    pub const POWER_MODE_SHIFT: u8 = 5;
    /// Sleep duration mask (bits 4:1).
    pub const SLEEP_DUR_MASK: u8 = 0b0001_1110;
    /// Sleep duration shift.
    pub const SLEEP_DUR_SHIFT: u8 = 1;
}

/// PMU_LOW_POWER register bits.
pub mod pmu_low_power {
    /// Low-power mode select (0 = LPM1, 1 = LPM2).
    pub const LPM2_SELECT: u8 = 0b0100_0000;
    /// Sleep-timer mode select.
    pub const SLEEPTIMER_MODE: u8 = 0b0010_0000;
}

/// ACCD_HBW register bits.
pub mod accd_hbw {
    /// Unfiltered data output enable.
    pub const DATA_HIGH_BW: u8 = 0b1000_0000;
    /// Shadowing disable.
    pub const SHADOW_DIS: u8 = 0b0100_0000;
}

/// BGW_SOFTRESET register values.
pub mod soft_reset {
    /// Soft-reset command value.
    pub const RESET: u8 = 0xB6;
}

/// INT_EN_0 register bits.
pub mod int_en_0 {
    /// Flat interrupt enable.
    pub const FLAT: u8 = 0b1000_0000;
    /// Orientation interrupt enable.
    pub const ORIENT: u8 = 0b0100_0000;
    /// Single-tap interrupt enable.
    pub const S_TAP: u8 = 0b0010_0000;
    /// Double-tap interrupt enable.
    pub const D_TAP: u8 = 0b0001_0000;
    /// Slope Z interrupt enable.
    pub const SLOPE_Z: u8 = 0b0000_0100;
    /// Slope Y interrupt enable.
    pub const SLOPE_Y: u8 = 0b0000_0010;
    /// Slope X interrupt enable.
    pub const SLOPE_X: u8 = 0b0000_0001;
}

/// INT_EN_1 register bits.
pub mod int_en_1 {
    /// FIFO-full interrupt enable.
    pub const FFULL: u8 = 0b0100_0000;
    /// FIFO watermark interrupt enable.
    pub const FWM: u8 = 0b0010_0000;
    /// New-data interrupt enable.
    pub const DATA: u8 = 0b0001_0000;
    /// Low-g interrupt enable.
    pub const LOW_G: u8 = 0b0000_1000;
    /// High-g Z interrupt enable.
    pub const HIGH_G_Z: u8 = 0b0000_0100;
    /// High-g Y interrupt enable.
    pub const HIGH_G_Y: u8 = 0b0000_0010;
    /// High-g X interrupt enable.
    pub const HIGH_G_X: u8 = 0b0000_0001;
    /// All high-g axes.
    pub const HIGH_G_ALL: u8 = HIGH_G_X | HIGH_G_Y | HIGH_G_Z;
}

/// INT_EN_2 register bits.
pub mod int_en_2 {
    /// No-motion select (1 = no-motion, 0 = slow-motion).
    pub const NO_MOTION_SELECT: u8 = 0b0000_1000;
    /// Slow/no-motion Z enable.
    pub const SLO_NO_MOT_Z: u8 = 0b0000_0100;
    /// Slow/no-motion Y enable.
    pub const SLO_NO_MOT_Y: u8 = 0b0000_0010;
    /// Slow/no-motion X enable.
    pub const SLO_NO_MOT_X: u8 = 0b0000_0001;
}

/// INT_MAP_0 register bits (INT1 event routing).
pub mod int_map_0 {
    /// Flat to INT1.
    pub const FLAT: u8 = 0b1000_0000;
    /// Orientation to INT1.
    pub const ORIENT: u8 = 0b0100_0000;
    /// Single tap to INT1.
    pub const S_TAP: u8 = 0b0010_0000;
    /// Double tap to INT1.
    pub const D_TAP: u8 = 0b0001_0000;
    /// Slow/no-motion to INT1.
    pub const SLO_NO_MOT: u8 = 0b0000_1000;
    /// Slope to INT1.
    pub const SLOPE: u8 = 0b0000_0100;
    /// High-g to INT1.
    pub const HIGH_G: u8 = 0b0000_0010;
    /// Low-g to INT1.
    pub const LOW_G: u8 = 0b0000_0001;
}

/// INT_MAP_1 register bits (data/FIFO routing, both pins).
pub mod int_map_1 {
    /// New data to INT2.
    pub const INT2_DATA: u8 = 0b1000_0000;
    /// FIFO watermark to INT2.
    pub const INT2_FWM: u8 = 0b0100_0000;
    /// FIFO full to INT2.
    pub const INT2_FFULL: u8 = 0b0010_0000;
    /// FIFO full to INT1.
    pub const INT1_FFULL: u8 = 0b0000_0100;
    /// FIFO watermark to INT1.
    pub const INT1_FWM: u8 = 0b0000_0010;
    /// New data to INT1.
    pub const INT1_DATA: u8 = 0b0000_0001;
}

/// INT_OUT_CTRL register bits.
pub mod int_out_ctrl {
    /// INT2 open-drain (0 = push-pull).
    pub const INT2_OD: u8 = 0b0000_1000;
    /// INT2 active level (1 = active high).
    pub const INT2_LVL: u8 = 0b0000_0100;
    /// INT1 open-drain (0 = push-pull).
    pub const INT1_OD: u8 = 0b0000_0010;
    /// INT1 active level (1 = active high).
    pub const INT1_LVL: u8 = 0b0000_0001;
}

/// INT_RST_LATCH register bits.
pub mod int_rst_latch {
    /// Reset any latched interrupts.
    pub const RESET_INT: u8 = 0b1000_0000;
    /// Latch mode mask.
    pub const LATCH_MODE_MASK: u8 = 0b0000_1111;
}

/// PMU_SELF_TEST register bits.
pub mod pmu_self_test {
    /// Self-test amplitude (1 = high).
    pub const AMP_HIGH: u8 = 0b0001_0000;
    /// Self-test sign (1 = positive).
    pub const SIGN_POSITIVE: u8 = 0b0000_0100;
    /// Axis select mask.
    pub const AXIS_MASK: u8 = 0b0000_0011;
    /// X-axis select.
    pub const AXIS_X: u8 = 0b0000_0001;
    /// Y-axis select.
    pub const AXIS_Y: u8 = 0b0000_0010;
    /// Z-axis select.
    pub const AXIS_Z: u8 = 0b0000_0011;
    /// Disable self-test.
    pub const DISABLE: u8 = 0b0000_0000;
}

/// OFC_CTRL register bits.
pub mod ofc_ctrl {
    /// Offset reset.
    pub const OFFSET_RESET: u8 = 0b1000_0000;
    /// Compensation trigger mask.
    pub const CAL_TRIGGER_MASK: u8 = 0b0110_0000;
    /// Compensation trigger shift.
    pub const CAL_TRIGGER_SHIFT: u8 = 5;
    /// Compensation ready flag.
    pub const CAL_RDY: u8 = 0b0001_0000;
}

/// OFC_SETTING register bits.
pub mod ofc_setting {
    /// Z-axis target shift.
    pub const TARGET_Z_SHIFT: u8 = 5;
    /// Y-axis target shift.
    pub const TARGET_Y_SHIFT: u8 = 3;
    /// X-axis target shift.
    pub const TARGET_X_SHIFT: u8 = 1;
    /// Per-axis target mask (before shifting).
    pub const TARGET_MASK: u8 = 0b11;
}

/// FIFO_CONFIG_0 register bits.
pub mod fifo_config_0 {
    /// Watermark level mask.
    pub const WATER_MARK_MASK: u8 = 0b0011_1111;
}

/// FIFO_CONFIG_1 register bits.
pub mod fifo_config_1 {
    /// FIFO mode mask (bits 7:6).
    pub const MODE_MASK: u8 = 0b1100_0000;
    /// FIFO mode shift.
    pub const MODE_SHIFT: u8 = 6;
    /// FIFO data selection mask (bits 1:0).
    pub const DATA_SELECT_MASK: u8 = 0b0000_0011;
}
