//! Async `#![no_std]` driver for the
//! [BMA253](https://www.bosch-sensortec.com/products/motion-sensors/accelerometers/bma253/)
//! triaxial accelerometer from Bosch Sensortec.
//!
//! This crate provides a lightweight, `embedded-hal-async` based driver for
//! the BMA253. It intentionally avoids any core-ports dependencies so it can
//! be reused in adapter or BSP layers.
//!
//! # Quick start (I2C)
//!
//! ```rust,no_run
//! use bma253::{Bma253Address, Bma253I2c, Config, EdgeLatch, I2cConfig};
//! # use embedded_hal_async::delay::DelayNs;
//! # use embedded_hal_async::i2c::I2c;
//! #
//! # async fn example<I2C: I2c, D: DelayNs>(i2c: I2C, delay: &mut D) -> Result<(), bma253::Error> {
//! static LATCH: EdgeLatch = EdgeLatch::new();
//!
//! let config = Config::new();
//! let i2c_config = I2cConfig::new(Bma253Address::Primary.addr());
//! let mut accel: Bma253I2c<I2C> =
//!     Bma253I2c::with_i2c_config(i2c, &LATCH, None, config, i2c_config);
//! accel.init(delay).await?;
//! let sample = accel.poll_read(delay).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Interrupt handling
//!
//! The driver never owns an interrupt handler. Signal the [`EdgeLatch`] from
//! the application's GPIO interrupt routine; streaming, threshold waits, and
//! event dispatch all wake from it. Without an interrupt line the driver
//! falls back to timed polling derived from the configured bandwidth.
//!
//! # Streaming
//!
//! [`Bma253::stream_read`] arms the FIFO, drains it on every interrupt edge,
//! and forwards each decoded sample to a caller-supplied sink. At most one
//! streaming session can be active at a time.
//!
//! # Event notifications
//!
//! Subscribe a single [`SensorEvent`] with [`Bma253::set_notification`] and
//! dispatch interrupt status against it with [`Bma253::handle_interrupt`].
//! The driver keeps the chip in a duty-cycled low-power mode while only
//! event detection is active, and suspends it entirely when idle.
//!
//! # Not yet supported
//!
//! - Flat detection and the interrupt-source (filtered/unfiltered) mux.
//! - The NVM backup of offset and trim registers.
//!
//! # Scaling helpers
//!
//! Use [`accel_lsb_per_g`] (or the milli-unit ratio [`accel_mg_per_lsb`])
//! and [`counts_to_mg`] to convert raw counts to physical units without
//! floating-point math.

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; thresholds and config are in clippy.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements,
    clippy::let_underscore_future
)]

#[cfg(test)]
extern crate std;

mod config;
mod data;
mod device;
mod driver;
mod error;
mod events;
mod interface;
mod interrupt;
mod macros;
mod register;
mod self_test;
mod sync;

#[cfg(test)]
mod testing;

// Interface layer
pub use interface::Bma253Address;
pub use interface::Interface;
pub use interface::{I2cConfig, I2cInterface};
pub use interface::{SpiConfig, SpiInterface};

// Configuration
pub use config::{Bandwidth, Config, GRange, PowerMode, SleepDuration};

// Driver
pub use driver::{Bma253, Bma253I2c, Bma253Spi, NoPin, StreamItem, ThresholdTrigger};

// Data types
pub use data::scale::{
    ScaleFactor, accel_lsb_per_g, accel_mg_per_lsb, counts_to_mg, offset_to_mg,
};
pub use data::{
    AccelMg, AccelRaw, DataSelect, FifoConfig, FifoFrameIterator, FifoMode, FifoStatus,
    MAX_FIFO_DEPTH, TemperatureRaw,
};

// Events
pub use events::{
    DoubleTapWindow, HighGConfig, LowGConfig, OrientBlocking, OrientConfig, OrientMode,
    SensorEvent, SlopeConfig, SlowNoMotConfig, TapConfig, TapQuiet, TapShock, TapWakeSamples,
};

// Features
pub use device::OffsetTarget;
pub use error::Error;
pub use interrupt::{IntLatch, IntPin, IntStatus, PinConfig};
pub use self_test::{SelfTestAxis, SelfTestReport};
pub use sync::EdgeLatch;
