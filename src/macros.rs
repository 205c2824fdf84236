//! Convenience macros for common driver sequences.

/// Initialize a BMA253 instance with a common configuration sequence.
///
/// This macro runs the typical initialization flow:
/// 1. `init_with_addresses`
/// 2. `set_config`
/// 3. Optional FIFO configuration
///
/// The macro expands to a `Result<u8, Error>` expression, returning the
/// detected I2C address on success. It must be invoked from an async context.
///
/// Example without FIFO:
/// ```rust,no_run
/// # use bma253::{Bma253Address, Config, EdgeLatch, bma253_init_sequence};
/// # async fn example(accel: &mut bma253::Bma253I2c<'_, impl embedded_hal_async::i2c::I2c>, delay: &mut impl embedded_hal_async::delay::DelayNs)
/// # -> Result<(), bma253::Error> {
/// let config = Config::new();
/// let address = bma253_init_sequence!(
///     accel: accel,
///     delay: delay,
///     addresses: &[Bma253Address::Primary.addr(), Bma253Address::Secondary.addr()],
///     config: config,
/// )?;
/// # Ok(())
/// # }
/// ```
///
/// Example with FIFO:
/// ```rust,no_run
/// # use bma253::{Bma253Address, Config, EdgeLatch, FifoConfig, FifoMode, bma253_init_sequence};
/// # async fn example(accel: &mut bma253::Bma253I2c<'_, impl embedded_hal_async::i2c::I2c>, delay: &mut impl embedded_hal_async::delay::DelayNs)
/// # -> Result<(), bma253::Error> {
/// let config = Config::new();
/// let fifo = FifoConfig::new().with_mode(FifoMode::Stream).with_watermark(16);
/// let address = bma253_init_sequence!(
///     accel: accel,
///     delay: delay,
///     addresses: &[Bma253Address::Primary.addr(), Bma253Address::Secondary.addr()],
///     config: config,
///     fifo: fifo,
/// )?;
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! bma253_init_sequence {
    (
        accel: $accel:expr,
        delay: $delay:expr,
        addresses: $addresses:expr,
        config: $config:expr,
        fifo: $fifo:expr $(,)?
    ) => {{
        let address = $accel.init_with_addresses($delay, $addresses).await?;
        $accel.set_config($delay, $config).await?;
        $accel.apply_fifo_config($fifo).await?;
        Ok::<u8, $crate::Error>(address)
    }};
    (
        accel: $accel:expr,
        delay: $delay:expr,
        addresses: $addresses:expr,
        config: $config:expr $(,)?
    ) => {{
        let address = $accel.init_with_addresses($delay, $addresses).await?;
        $accel.set_config($delay, $config).await?;
        Ok::<u8, $crate::Error>(address)
    }};
}
