//! FIFO configuration and status helpers.

use super::{AccelRaw, decode_axis};
use crate::register::{fifo_config_1, fifo_status};

/// Maximum number of frames the hardware FIFO can hold.
pub const MAX_FIFO_DEPTH: u8 = 32;

/// FIFO operating mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FifoMode {
    /// FIFO disabled (pass-through).
    Bypass,
    /// FIFO mode (stop collecting when full, set overrun).
    Fifo,
    /// Streaming mode (overwrite oldest when full).
    Stream,
}

impl FifoMode {
    pub(crate) const fn bits(self) -> u8 {
        match self {
            Self::Bypass => 0b00,
            Self::Fifo => 0b01,
            Self::Stream => 0b10,
        }
    }
}

/// FIFO frame content selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataSelect {
    /// All three axes per frame.
    Xyz,
    /// X axis only.
    X,
    /// Y axis only.
    Y,
    /// Z axis only.
    Z,
}

impl DataSelect {
    pub(crate) const fn bits(self) -> u8 {
        match self {
            Self::Xyz => 0b00,
            Self::X => 0b01,
            Self::Y => 0b10,
            Self::Z => 0b11,
        }
    }

    /// Returns the frame size in bytes for this selection.
    pub(crate) const fn frame_bytes(self) -> usize {
        match self {
            Self::Xyz => 6,
            _ => 2,
        }
    }
}

/// FIFO configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoConfig {
    /// Operating mode.
    pub mode: FifoMode,
    /// Frame content selection.
    pub data_select: DataSelect,
    /// Watermark level in frames (0..=63 accepted, depth is 32).
    pub watermark: u8,
}

impl FifoConfig {
    /// Creates a streaming configuration with all axes and no watermark.
    pub const fn new() -> Self {
        Self {
            mode: FifoMode::Stream,
            data_select: DataSelect::Xyz,
            watermark: 0,
        }
    }

    /// Sets the operating mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: FifoMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the frame content selection.
    #[must_use]
    pub const fn with_data_select(mut self, data_select: DataSelect) -> Self {
        self.data_select = data_select;
        self
    }

    /// Sets the watermark level in frames.
    #[must_use]
    pub const fn with_watermark(mut self, watermark: u8) -> Self {
        self.watermark = watermark;
        self
    }

    /// Encodes the FIFO_CONFIG_1 register value.
    pub(crate) const fn config_1_bits(self) -> u8 {
        (self.mode.bits() << fifo_config_1::MODE_SHIFT)
            | (self.data_select.bits() & fifo_config_1::DATA_SELECT_MASK)
    }
}

impl Default for FifoConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Decoded FIFO_STATUS register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoStatus {
    /// Number of unread frames reported by the counter.
    pub frame_count: u8,
    /// Overrun flag; the counter is unreliable once set.
    pub overrun: bool,
}

impl FifoStatus {
    pub(crate) const fn from_reg(value: u8) -> Self {
        Self {
            frame_count: value & fifo_status::FRAME_COUNTER_MASK,
            overrun: (value & fifo_status::OVERRUN) != 0,
        }
    }

    /// Number of frames to drain. On overrun the counter cannot be
    /// trusted, so the full FIFO depth is assumed.
    pub(crate) const fn drain_count(self) -> u8 {
        if self.overrun {
            MAX_FIFO_DEPTH
        } else if self.frame_count > MAX_FIFO_DEPTH {
            MAX_FIFO_DEPTH
        } else {
            self.frame_count
        }
    }
}

/// Iterator decoding raw FIFO bytes into accelerometer frames.
pub struct FifoFrameIterator<'a> {
    buffer: &'a [u8],
    data_select: DataSelect,
    offset: usize,
}

impl<'a> FifoFrameIterator<'a> {
    /// Creates an iterator over a raw FIFO readout.
    pub const fn new(buffer: &'a [u8], data_select: DataSelect) -> Self {
        Self {
            buffer,
            data_select,
            offset: 0,
        }
    }
}

impl Iterator for FifoFrameIterator<'_> {
    type Item = AccelRaw;

    fn next(&mut self) -> Option<AccelRaw> {
        let frame_bytes = self.data_select.frame_bytes();
        if self.offset + frame_bytes > self.buffer.len() {
            return None;
        }
        let frame = &self.buffer[self.offset..self.offset + frame_bytes];
        self.offset += frame_bytes;

        let sample = match self.data_select {
            DataSelect::Xyz => AccelRaw {
                x: decode_axis(frame[0], frame[1]),
                y: decode_axis(frame[2], frame[3]),
                z: decode_axis(frame[4], frame[5]),
            },
            DataSelect::X => AccelRaw {
                x: decode_axis(frame[0], frame[1]),
                ..AccelRaw::default()
            },
            DataSelect::Y => AccelRaw {
                y: decode_axis(frame[0], frame[1]),
                ..AccelRaw::default()
            },
            DataSelect::Z => AccelRaw {
                z: decode_axis(frame[0], frame[1]),
                ..AccelRaw::default()
            },
        };
        Some(sample)
    }
}
