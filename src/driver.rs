//! BMA253 driver implementation.
//!
//! The facade arbitrates one hardware power/bandwidth state between three
//! consumers: one-shot polled reads, the FIFO streaming session, and the
//! event notification slot. Interrupt edges reach the driver through an
//! [`EdgeLatch`] signaled from the application's interrupt handler.

use core::ops::ControlFlow;

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use embedded_hal_async::spi::SpiDevice;

use crate::config::{Bandwidth, Config, GRange, HwConfig, PowerMode, TAP_BANDWIDTH_FLOOR};
use crate::data::fifo::{FifoConfig, FifoStatus};
use crate::data::{AccelMg, AccelRaw, TemperatureRaw, scale};
use crate::device::{DeviceCore, OffsetTarget};
use crate::error::Error;
use crate::events::SensorEvent;
use crate::interface::{I2cConfig, I2cInterface, Interface, SpiConfig, SpiInterface};
use crate::interrupt::{IntLatch, IntStatus};
use crate::register::{Register, int_en_0, int_en_1, int_en_2, int_map_0, pmu_self_test};
use crate::self_test::SelfTestReport;
use crate::sync::EdgeLatch;

/// Stale samples discarded after a power or bandwidth change.
const SAMPLES_TO_INVALIDATE: u32 = 4;
/// Settle time for the electrostatic deflection during self-test.
const SELF_TEST_SETTLE_US: u32 = 50_000;
/// Poll attempts for a fresh sample in `poll_read`.
const POLL_READ_RETRIES: u16 = 16;

/// Item delivered to the streaming sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamItem {
    /// A decoded acceleration sample.
    Sample(AccelMg),
    /// The subscribed event fired during this streaming edge.
    Event(SensorEvent),
}

/// Outcome of a threshold wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ThresholdTrigger {
    /// The low threshold condition fired.
    Low,
    /// The high threshold condition fired.
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AcqState {
    /// No acquisition consumer.
    Idle,
    /// A streaming session owns the interrupt line.
    Requested,
    /// A FIFO drain is in flight; hardware config changes must defer.
    Draining,
}

/// Placeholder pin type for drivers wired without an interrupt line.
///
/// Reads as never asserted, so every wait takes the timed-polling path.
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl InputPin for NoPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// BMA253 triaxial accelerometer driver.
pub struct Bma253<'a, I, P = NoPin> {
    core: DeviceCore<I>,
    latch: &'a EdgeLatch,
    int_pin: Option<P>,
    acq: AcqState,
    pending: Option<HwConfig>,
    subscribed: Option<SensorEvent>,
    trigger_armed: bool,
    applied_bandwidth: Bandwidth,
}

/// I2C type alias for the BMA253 driver.
pub type Bma253I2c<'a, I2C, P = NoPin> = Bma253<'a, I2cInterface<I2C>, P>;
/// SPI type alias for the BMA253 driver (experimental).
pub type Bma253Spi<'a, SPI, P = NoPin> = Bma253<'a, SpiInterface<SPI>, P>;

impl<'a, I2C, P> Bma253<'a, I2cInterface<I2C>, P>
where
    I2C: I2c,
{
    /// Creates a new I2C-based driver with default settings.
    pub fn new_i2c(i2c: I2C, latch: &'a EdgeLatch, int_pin: Option<P>) -> Self {
        Self::with_i2c_config(i2c, latch, int_pin, Config::default(), I2cConfig::default())
    }

    /// Creates a new I2C-based driver with a custom configuration.
    pub fn with_i2c_config(
        i2c: I2C,
        latch: &'a EdgeLatch,
        int_pin: Option<P>,
        config: Config,
        i2c_config: I2cConfig,
    ) -> Self {
        let interface = I2cInterface::new(i2c, i2c_config.address);
        Self::from_core(DeviceCore::new(interface, config), latch, int_pin)
    }

    /// Updates the I2C address used by the interface.
    pub fn set_i2c_address(&mut self, address: u8) {
        self.core.set_i2c_address(address);
    }

    /// Attempts initialization for one or more I2C addresses.
    pub async fn init_with_addresses<D: DelayNs>(
        &mut self,
        delay: &mut D,
        addresses: &[u8],
    ) -> Result<u8, Error> {
        let mut last_err = None;
        for &address in addresses {
            self.set_i2c_address(address);
            match self.init(delay).await {
                Ok(()) => return Ok(address),
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or(Error::WrongDevice))
    }

    /// Releases the I2C bus, consuming the driver.
    pub fn release(self) -> I2C {
        self.core.release().release()
    }

    /// Releases the I2C bus and interrupt pin, consuming the driver.
    pub fn release_with_int(self) -> (I2C, Option<P>) {
        (self.core.release().release(), self.int_pin)
    }
}

impl<'a, SPI, P> Bma253<'a, SpiInterface<SPI>, P>
where
    SPI: SpiDevice,
{
    /// Creates a new SPI-based driver (experimental).
    pub fn new_spi(spi: SPI, latch: &'a EdgeLatch, int_pin: Option<P>) -> Self {
        Self::with_spi_config(spi, latch, int_pin, Config::default(), SpiConfig::default())
    }

    /// Creates a new SPI-based driver with a custom configuration (experimental).
    pub fn with_spi_config(
        spi: SPI,
        latch: &'a EdgeLatch,
        int_pin: Option<P>,
        config: Config,
        _spi_config: SpiConfig,
    ) -> Self {
        let interface = SpiInterface::new(spi);
        Self::from_core(DeviceCore::new(interface, config), latch, int_pin)
    }

    /// Releases the SPI bus, consuming the driver.
    pub fn release(self) -> SPI {
        self.core.release().release()
    }

    /// Releases the SPI bus and interrupt pin, consuming the driver.
    pub fn release_with_int(self) -> (SPI, Option<P>) {
        (self.core.release().release(), self.int_pin)
    }
}

impl<'a, I, P> Bma253<'a, I, P>
where
    I: Interface,
{
    fn from_core(core: DeviceCore<I>, latch: &'a EdgeLatch, int_pin: Option<P>) -> Self {
        let applied_bandwidth = core.config().bandwidth;
        Self {
            core,
            latch,
            int_pin,
            acq: AcqState::Idle,
            pending: None,
            subscribed: None,
            trigger_armed: false,
            applied_bandwidth,
        }
    }

    /// Returns the current sensor configuration.
    pub const fn config(&self) -> Config {
        self.core.config()
    }

    /// Validates and applies a new configuration, then re-arbitrates the
    /// hardware state.
    pub async fn set_config<D: DelayNs>(
        &mut self,
        delay: &mut D,
        config: Config,
    ) -> Result<(), Error> {
        config.validate()?;
        self.core.set_config(config);
        self.core.apply_config().await?;
        self.applied_bandwidth = config.bandwidth;
        self.arbitrate(delay).await
    }

    /// Returns the power mode the chip was last driven to.
    pub const fn power(&self) -> PowerMode {
        self.core.power()
    }

    /// Returns the edge latch this driver waits on. The application's
    /// interrupt handler signals it.
    pub const fn edge_latch(&self) -> &'a EdgeLatch {
        self.latch
    }

    /// Returns the currently subscribed event, if any.
    pub const fn subscribed_event(&self) -> Option<SensorEvent> {
        self.subscribed
    }

    /// Initializes the device (verify chip id, soft reset, apply config)
    /// and settles into the idle power state.
    pub async fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error> {
        self.core.init(delay).await?;
        self.applied_bandwidth = self.core.config().bandwidth;
        self.arbitrate(delay).await
    }

    /// Verifies the chip identification register.
    pub async fn verify_device(&mut self) -> Result<(), Error> {
        self.core.verify_device().await
    }

    /// Performs a soft reset followed by a full reconfiguration.
    pub async fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error> {
        self.core.soft_reset(delay).await?;
        self.core.apply_config().await?;
        self.applied_bandwidth = self.core.config().bandwidth;
        self.arbitrate(delay).await
    }

    /// Applies a FIFO configuration.
    pub async fn apply_fifo_config(&mut self, config: FifoConfig) -> Result<(), Error> {
        self.core.apply_fifo_config(config).await
    }

    /// Returns the current FIFO status.
    pub async fn fifo_status(&mut self) -> Result<FifoStatus, Error> {
        self.core.fifo_status().await
    }

    /// Reads one fresh sample, waking the chip if needed and returning it
    /// to the arbitrated steady state afterwards.
    pub async fn poll_read<D: DelayNs>(&mut self, delay: &mut D) -> Result<AccelMg, Error> {
        if !matches!(self.acq, AcqState::Idle) {
            return Err(Error::Busy);
        }
        self.core
            .interim_power(delay, &[PowerMode::Normal, PowerMode::Lpm1, PowerMode::Lpm2])
            .await?;

        let raw = self.wait_fresh_sample(delay).await;
        let result = raw.map(|raw| raw.to_mg(self.core.config().range));
        let restore = self.arbitrate(delay).await;
        restore?;
        result
    }

    async fn wait_fresh_sample<D: DelayNs>(&mut self, delay: &mut D) -> Result<AccelRaw, Error> {
        let interval_us = self.core.config().bandwidth.sample_interval_us();
        for _ in 0..POLL_READ_RETRIES {
            let (raw, fresh) = self.core.read_accel_raw().await?;
            if fresh {
                return Ok(raw);
            }
            delay.delay_us(interval_us).await;
        }
        Err(Error::NotReady)
    }

    /// Reads the die temperature in milli-degrees Celsius.
    pub async fn read_temperature<D: DelayNs>(&mut self, delay: &mut D) -> Result<i32, Error> {
        self.core
            .interim_power(delay, &[PowerMode::Normal, PowerMode::Lpm1, PowerMode::Lpm2])
            .await?;
        let raw: Result<TemperatureRaw, Error> = self.core.read_temperature_raw().await;
        let restore = self.arbitrate(delay).await;
        restore?;
        Ok(raw?.milli_celsius())
    }

    /// Runs a streaming session: repeatedly wait for an interrupt edge (or
    /// a bandwidth-derived fallback delay when no interrupt line is wired),
    /// drain the FIFO, and forward every sample to the sink.
    ///
    /// Returns the total number of samples delivered. The optional timeout
    /// is checked between drains only, so the session can overshoot it by
    /// up to one wait. Fails with [`Error::Busy`] if a session is already
    /// active.
    pub async fn stream_read<D, F>(
        &mut self,
        delay: &mut D,
        timeout_us: Option<u32>,
        sink: &mut F,
    ) -> Result<u32, Error>
    where
        D: DelayNs,
        F: FnMut(StreamItem) -> ControlFlow<()>,
        P: InputPin,
    {
        if !matches!(self.acq, AcqState::Idle) {
            return Err(Error::Busy);
        }
        self.acq = AcqState::Requested;
        if let Err(err) = self.arbitrate(delay).await {
            self.acq = AcqState::Idle;
            return Err(err);
        }

        let snapshot = match self.core.int_enable_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                self.acq = AcqState::Idle;
                let _ = self.arbitrate(delay).await;
                return Err(err);
            }
        };

        let armed = self.arm_stream().await;
        let result = match armed {
            Ok(()) => self.stream_loop(delay, timeout_us, sink).await,
            Err(err) => Err(err),
        };

        // Teardown runs on both paths; the first error wins.
        let restore = self.core.restore_int_enable(snapshot).await;
        let unroute = self.disarm_stream().await;
        self.acq = AcqState::Idle;
        let settle = self.arbitrate(delay).await;

        let total = result?;
        restore?;
        unroute?;
        settle?;
        Ok(total)
    }

    async fn arm_stream(&mut self) -> Result<(), Error> {
        // Stale edges must be gone before interrupts can produce new ones.
        self.latch.reset();
        self.core.clear_fifo().await?;
        if self.int_pin.is_some() {
            let pin = self.core.config().int_pin;
            self.core.route_data_interrupts(pin, true).await?;
            self.core
                .update_int_enable(Register::IntEn1, int_en_1::FWM, true)
                .await?;
        }
        Ok(())
    }

    async fn disarm_stream(&mut self) -> Result<(), Error> {
        if self.int_pin.is_some() {
            let pin = self.core.config().int_pin;
            self.core
                .update_int_enable(Register::IntEn1, int_en_1::FWM, false)
                .await?;
            self.core.route_data_interrupts(pin, false).await?;
        }
        Ok(())
    }

    async fn stream_loop<D, F>(
        &mut self,
        delay: &mut D,
        timeout_us: Option<u32>,
        sink: &mut F,
    ) -> Result<u32, Error>
    where
        D: DelayNs,
        F: FnMut(StreamItem) -> ControlFlow<()>,
        P: InputPin,
    {
        let bandwidth = self.desired_hw().bandwidth;
        let interval_us = u64::from(bandwidth.sample_interval_us());
        let fallback_us = u64::from(bandwidth.fallback_delay_ms()) * 1_000;
        let interrupt_driven = self.int_pin.is_some();

        let mut elapsed_us = 0u64;
        let mut total = 0u32;

        loop {
            if interrupt_driven {
                // A level-triggered line asserted before we park would never
                // produce another edge; consume it by pin level instead.
                if self.interrupt_asserted()? {
                    let _ = self.latch.try_consume();
                } else {
                    self.latch.wait().await;
                }
            } else {
                delay.delay_us(fallback_us as u32).await;
                elapsed_us += fallback_us;
            }

            self.acq = AcqState::Draining;
            let mut stopped = false;
            let drained = self
                .core
                .drain_fifo(&mut |sample| match sink(StreamItem::Sample(sample)) {
                    ControlFlow::Continue(()) => ControlFlow::Continue(()),
                    ControlFlow::Break(()) => {
                        stopped = true;
                        ControlFlow::Break(())
                    }
                })
                .await;
            self.acq = AcqState::Requested;
            let drained = drained?;
            total += drained;
            elapsed_us += u64::from(drained) * interval_us;

            self.apply_pending(delay).await?;

            if !stopped {
                if let Some(event) = self.subscribed {
                    let status = self.core.read_int_status().await?;
                    if event_matches(event, status)
                        && matches!(sink(StreamItem::Event(event)), ControlFlow::Break(()))
                    {
                        stopped = true;
                    }
                }
            }

            if stopped {
                return Ok(total);
            }
            if let Some(timeout) = timeout_us {
                if elapsed_us >= u64::from(timeout) {
                    return Ok(total);
                }
            }
        }
    }

    /// Subscribes the single notification slot to a logical event.
    ///
    /// Writes the event's auxiliary parameter registers under a temporary
    /// time-limited latch so the chip cannot re-arm mid-configuration,
    /// routes the event to the configured pin, and enables it. Fails with
    /// [`Error::Busy`] if a subscription is already active.
    pub async fn set_notification<D: DelayNs>(
        &mut self,
        delay: &mut D,
        event: SensorEvent,
    ) -> Result<(), Error> {
        if self.subscribed.is_some() {
            return Err(Error::Busy);
        }

        self.core
            .set_latch(IntLatch::Temporary500Ms, true)
            .await?;
        let configured = self.configure_event(event).await;
        let restored = self
            .core
            .set_latch(self.core.config().latch, true)
            .await;
        configured?;
        restored?;

        self.subscribed = Some(event);
        self.arbitrate(delay).await
    }

    async fn configure_event(&mut self, event: SensorEvent) -> Result<(), Error> {
        let config = self.core.config();
        match event {
            SensorEvent::SingleTap | SensorEvent::DoubleTap => {
                self.core.apply_tap(config.tap).await?;
            }
            SensorEvent::FreeFall => {
                self.core.apply_low_g(config.low_g).await?;
            }
            SensorEvent::OrientChange => {
                self.core.apply_orient(config.orient).await?;
            }
            SensorEvent::Sleep => {
                self.core.apply_slow_no_mot(config.slow_no_mot).await?;
            }
            SensorEvent::Wakeup => {
                self.core.apply_slope(config.slope).await?;
            }
            _ => {
                self.core.apply_high_g(config.high_g).await?;
            }
        }

        let (map_mask, enable_reg, enable_mask) = event_routing(event);
        self.core
            .route_event_interrupt(config.int_pin, map_mask, true)
            .await?;
        if matches!(event, SensorEvent::Sleep) {
            // Select the no-motion timer rather than slow-motion counting.
            self.core
                .update_int_enable(Register::IntEn2, int_en_2::NO_MOTION_SELECT, true)
                .await?;
        }
        self.core
            .update_int_enable(enable_reg, enable_mask, true)
            .await
    }

    /// Removes the active event subscription.
    ///
    /// The directional high-g variants share one hardware interrupt group;
    /// disabling any of them tears down that whole group's routing and
    /// enable bits. Auxiliary parameter registers are left as written.
    pub async fn unset_notification<D: DelayNs>(
        &mut self,
        delay: &mut D,
        event: SensorEvent,
    ) -> Result<(), Error> {
        if self.subscribed != Some(event) {
            return Err(Error::InvalidConfig);
        }

        let (map_mask, enable_reg, enable_mask) = event_routing(event);
        let enable_mask = if event.is_high_g() {
            int_en_1::HIGH_G_ALL
        } else {
            enable_mask
        };
        self.core
            .update_int_enable(enable_reg, enable_mask, false)
            .await?;
        if matches!(event, SensorEvent::Sleep) {
            self.core
                .update_int_enable(Register::IntEn2, int_en_2::NO_MOTION_SELECT, false)
                .await?;
        }
        self.core
            .route_event_interrupt(self.core.config().int_pin, map_mask, false)
            .await?;

        self.subscribed = None;
        self.arbitrate(delay).await
    }

    /// Reads the interrupt status once and dispatches it against the
    /// active subscription. Call this from task context after the edge
    /// latch fires.
    pub async fn handle_interrupt(&mut self) -> Result<Option<SensorEvent>, Error> {
        let status = self.core.read_int_status().await?;
        Ok(self.dispatch(status))
    }

    fn dispatch(&self, status: IntStatus) -> Option<SensorEvent> {
        let event = self.subscribed?;
        event_matches(event, status).then_some(event)
    }

    /// Arms the threshold trigger: low-g fires [`ThresholdTrigger::Low`]
    /// when all axes fall below `low_mg`, high-g fires
    /// [`ThresholdTrigger::High`] above `high_mg`. Fails with
    /// [`Error::Busy`] while armed.
    pub async fn set_trigger_threshold<D: DelayNs>(
        &mut self,
        delay: &mut D,
        low_mg: Option<u16>,
        high_mg: Option<u16>,
    ) -> Result<(), Error> {
        if self.trigger_armed {
            return Err(Error::Busy);
        }
        if low_mg.is_none() && high_mg.is_none() {
            return Err(Error::InvalidConfig);
        }

        self.core
            .set_latch(IntLatch::Temporary500Ms, true)
            .await?;
        let armed = self.arm_trigger(low_mg, high_mg).await;
        // The latch override must come off even when arming fails.
        let restored = self
            .core
            .set_latch(self.core.config().latch, true)
            .await;
        armed?;
        restored?;

        self.trigger_armed = true;
        self.latch.reset();
        self.arbitrate(delay).await
    }

    async fn arm_trigger(
        &mut self,
        low_mg: Option<u16>,
        high_mg: Option<u16>,
    ) -> Result<(), Error> {
        let config = self.core.config();
        if let Some(low_mg) = low_mg {
            let mut low_g = config.low_g;
            low_g.thresh_mg = low_mg;
            self.core.apply_low_g(low_g).await?;
            self.core
                .route_event_interrupt(config.int_pin, int_map_0::LOW_G, true)
                .await?;
            self.core
                .update_int_enable(Register::IntEn1, int_en_1::LOW_G, true)
                .await?;
        }
        if let Some(high_mg) = high_mg {
            let mut high_g = config.high_g;
            high_g.thresh_mg = high_mg;
            self.core.apply_high_g(high_g).await?;
            self.core
                .route_event_interrupt(config.int_pin, int_map_0::HIGH_G, true)
                .await?;
            self.core
                .update_int_enable(Register::IntEn1, int_en_1::HIGH_G_ALL, true)
                .await?;
        }
        Ok(())
    }

    /// Waits for the armed threshold trigger to fire. The timeout is
    /// checked between status polls and accrues only on the timed-polling
    /// path; with an interrupt line wired the wait runs until an edge
    /// produces a matching status.
    pub async fn wait_for_trigger<D: DelayNs>(
        &mut self,
        delay: &mut D,
        timeout_us: Option<u32>,
    ) -> Result<ThresholdTrigger, Error>
    where
        P: InputPin,
    {
        if !self.trigger_armed {
            return Err(Error::InvalidConfig);
        }

        let fallback_us = self.desired_hw().bandwidth.fallback_delay_ms() * 1_000;
        let mut elapsed_us = 0u64;
        loop {
            // Status first: a condition that fired before this call must not
            // leave the caller parked on an edge that already passed.
            let status = self.core.read_int_status().await?;
            if status.low_g {
                return Ok(ThresholdTrigger::Low);
            }
            if status.high_g {
                return Ok(ThresholdTrigger::High);
            }

            if let Some(timeout) = timeout_us {
                if elapsed_us >= u64::from(timeout) {
                    return Err(Error::NotReady);
                }
            }

            if self.int_pin.is_some() {
                if !self.interrupt_asserted()? {
                    self.latch.wait().await;
                }
            } else {
                delay.delay_us(fallback_us).await;
                elapsed_us += u64::from(fallback_us);
            }
        }
    }

    /// Disarms the threshold trigger and releases its interrupt routing.
    pub async fn unset_trigger_threshold<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Result<(), Error> {
        if !self.trigger_armed {
            return Ok(());
        }
        let pin = self.core.config().int_pin;
        self.core
            .update_int_enable(Register::IntEn1, int_en_1::LOW_G | int_en_1::HIGH_G_ALL, false)
            .await?;
        self.core
            .route_event_interrupt(pin, int_map_0::LOW_G | int_map_0::HIGH_G, false)
            .await?;
        self.trigger_armed = false;
        self.arbitrate(delay).await
    }

    /// Runs the electrostatic self-test on all three axes.
    ///
    /// The chip is driven to 8 g range in normal mode, each axis is
    /// deflected positive then negative, and the per-axis difference is
    /// checked against the datasheet limits. The device is soft-reset and
    /// reconfigured afterwards regardless of the outcome.
    pub async fn self_test<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Result<SelfTestReport, Error> {
        if !matches!(self.acq, AcqState::Idle) {
            return Err(Error::Busy);
        }
        self.core.change_power(delay, PowerMode::Normal).await?;
        self.core.set_range(GRange::G8).await?;

        let result = self.deflect_axes(delay).await;

        // The deflection leaves the sensor element disturbed; a reset and
        // full reconfigure is the only reliable way back.
        let _ = self.core.set_self_test(pmu_self_test::DISABLE).await;
        let reset = self.core.soft_reset(delay).await;
        let reconfig = self.core.apply_config().await;
        self.applied_bandwidth = self.core.config().bandwidth;
        let settle = self.arbitrate(delay).await;

        let report = result?;
        reset?;
        reconfig?;
        settle?;
        Ok(report)
    }

    async fn deflect_axes<D: DelayNs>(&mut self, delay: &mut D) -> Result<SelfTestReport, Error> {
        let mut diffs_mg = [0i32; 3];
        for (index, axis_bits) in [
            pmu_self_test::AXIS_X,
            pmu_self_test::AXIS_Y,
            pmu_self_test::AXIS_Z,
        ]
        .into_iter()
        .enumerate()
        {
            let positive =
                axis_bits | pmu_self_test::SIGN_POSITIVE | pmu_self_test::AMP_HIGH;
            self.core.set_self_test(positive).await?;
            delay.delay_us(SELF_TEST_SETTLE_US).await;
            let (pos, _) = self.core.read_accel_raw().await?;

            self.core
                .set_self_test(axis_bits | pmu_self_test::AMP_HIGH)
                .await?;
            delay.delay_us(SELF_TEST_SETTLE_US).await;
            let (neg, _) = self.core.read_accel_raw().await?;

            let (pos_axis, neg_axis) = match index {
                0 => (pos.x, neg.x),
                1 => (pos.y, neg.y),
                _ => (pos.z, neg.z),
            };
            diffs_mg[index] =
                scale::counts_to_mg(pos_axis.saturating_sub(neg_axis), GRange::G8);
        }
        Ok(SelfTestReport::from_diffs(diffs_mg))
    }

    /// Runs fast offset compensation towards the given per-axis targets.
    /// The chip must be at rest in the target orientation.
    pub async fn offset_compensation<D: DelayNs>(
        &mut self,
        delay: &mut D,
        targets: [OffsetTarget; 3],
    ) -> Result<(), Error> {
        if !matches!(self.acq, AcqState::Idle) {
            return Err(Error::Busy);
        }
        // Compensation is specified at 2 g in normal mode.
        self.core.change_power(delay, PowerMode::Normal).await?;
        self.core.set_range(GRange::G2).await?;

        let result = self.core.offset_compensation(delay, targets).await;

        let restore_range = self.core.set_range(self.core.config().range).await;
        let settle = self.arbitrate(delay).await;
        result?;
        restore_range?;
        settle?;
        Ok(())
    }

    /// Reads the stored per-axis offsets in milli-g.
    pub async fn query_offsets(&mut self) -> Result<[i32; 3], Error> {
        let raw = self.core.read_offsets().await?;
        Ok([
            scale::offset_to_mg(raw[0]),
            scale::offset_to_mg(raw[1]),
            scale::offset_to_mg(raw[2]),
        ])
    }

    /// Writes per-axis offsets in milli-g, saturating to the register range.
    pub async fn write_offsets(&mut self, offsets_mg: [i32; 3]) -> Result<(), Error> {
        let mut raw = [0i8; 3];
        for (slot, mg) in raw.iter_mut().zip(offsets_mg) {
            let counts = mg * 1000 / scale::OFFSET_UG_PER_LSB;
            *slot = counts.clamp(i32::from(i8::MIN), i32::from(i8::MAX)) as i8;
        }
        self.core.write_offsets(raw).await
    }

    /// Clears all stored offsets.
    pub async fn reset_offsets(&mut self) -> Result<(), Error> {
        self.core.reset_offsets().await
    }

    /// Reads back the full-scale range currently programmed into the chip.
    pub async fn read_range(&mut self) -> Result<GRange, Error> {
        self.core.read_range().await
    }

    /// Reads back the filter bandwidth currently programmed into the chip.
    pub async fn read_bandwidth(&mut self) -> Result<Bandwidth, Error> {
        self.core.read_bandwidth().await
    }

    /// Reads back the interrupt latch mode currently programmed into the
    /// chip.
    pub async fn read_latch_mode(&mut self) -> Result<IntLatch, Error> {
        self.core.latch_mode().await
    }

    /// Reads the two general-purpose trim registers.
    pub async fn read_trim(&mut self) -> Result<[u8; 2], Error> {
        self.core.read_trim().await
    }

    /// Writes the two general-purpose trim registers.
    pub async fn write_trim(&mut self, values: [u8; 2]) -> Result<(), Error> {
        self.core.write_trim(values).await
    }

    /// Returns a mutable reference to the interrupt pin, if provided.
    pub fn int_pin_mut(&mut self) -> Option<&mut P> {
        self.int_pin.as_mut()
    }

    /// Takes the interrupt pin out of the driver, leaving None. The driver
    /// falls back to timed polling afterwards.
    pub fn take_int_pin(&mut self) -> Option<P> {
        self.int_pin.take()
    }

    fn desired_hw(&self) -> HwConfig {
        let acquiring = !matches!(self.acq, AcqState::Idle);
        let power = if acquiring {
            PowerMode::Normal
        } else if self.subscribed.is_some() || self.trigger_armed {
            PowerMode::Lpm1
        } else {
            PowerMode::Suspend
        };
        // Outside acquisition the event engines run at full bandwidth so
        // they respond promptly; during acquisition the configured rate
        // wins, floored when double-tap timing needs it.
        let mut bandwidth = if acquiring {
            self.core.config().bandwidth
        } else {
            Bandwidth::Hz1000
        };
        if matches!(self.subscribed, Some(SensorEvent::DoubleTap)) && bandwidth < TAP_BANDWIDTH_FLOOR
        {
            bandwidth = TAP_BANDWIDTH_FLOOR;
        }
        HwConfig { power, bandwidth }
    }

    /// Recomputes the target hardware state and applies it, unless a drain
    /// is in flight, in which case the target is stashed for
    /// `apply_pending`.
    async fn arbitrate<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error> {
        let target = self.desired_hw();
        if matches!(self.acq, AcqState::Draining) {
            self.pending = Some(target);
            return Ok(());
        }
        self.apply_hw(delay, target).await
    }

    async fn apply_pending<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error> {
        if let Some(target) = self.pending.take() {
            self.apply_hw(delay, target).await?;
        }
        Ok(())
    }

    async fn apply_hw<D: DelayNs>(&mut self, delay: &mut D, target: HwConfig) -> Result<(), Error> {
        let bandwidth_changed = target.bandwidth != self.applied_bandwidth;
        let power_changed = target.power != self.core.power();
        if !bandwidth_changed && !power_changed {
            return Ok(());
        }

        if bandwidth_changed {
            self.core.set_bandwidth(target.bandwidth).await?;
            self.applied_bandwidth = target.bandwidth;
        }
        if power_changed {
            self.core.change_power(delay, target.power).await?;
        }

        // Samples captured under the old regime are stale; let them cycle
        // out, then discard whatever reached the FIFO.
        let settle_us = target
            .bandwidth
            .sample_interval_us()
            .saturating_mul(SAMPLES_TO_INVALIDATE);
        delay.delay_us(settle_us).await;
        self.core.clear_fifo().await
    }
}

impl<'a, I, P> Bma253<'a, I, P>
where
    I: Interface,
    P: InputPin,
{
    /// Samples the interrupt pin level, honoring the configured polarity.
    /// Returns false when no pin was provided.
    pub fn interrupt_asserted(&mut self) -> Result<bool, Error> {
        let active_high = self.core.config().pin_config.active_high;
        match self.int_pin.as_mut() {
            Some(pin) => {
                let high = pin.is_high().map_err(|_| Error::Pin)?;
                Ok(high == active_high)
            }
            None => Ok(false),
        }
    }
}

const fn event_routing(event: SensorEvent) -> (u8, Register, u8) {
    match event {
        SensorEvent::SingleTap => (int_map_0::S_TAP, Register::IntEn0, int_en_0::S_TAP),
        SensorEvent::DoubleTap => (int_map_0::D_TAP, Register::IntEn0, int_en_0::D_TAP),
        SensorEvent::FreeFall => (int_map_0::LOW_G, Register::IntEn1, int_en_1::LOW_G),
        SensorEvent::OrientChange => (int_map_0::ORIENT, Register::IntEn0, int_en_0::ORIENT),
        SensorEvent::Sleep => (
            int_map_0::SLO_NO_MOT,
            Register::IntEn2,
            int_en_2::SLO_NO_MOT_X | int_en_2::SLO_NO_MOT_Y | int_en_2::SLO_NO_MOT_Z,
        ),
        SensorEvent::Wakeup => (
            int_map_0::SLOPE,
            Register::IntEn0,
            int_en_0::SLOPE_X | int_en_0::SLOPE_Y | int_en_0::SLOPE_Z,
        ),
        SensorEvent::HighGPositiveX | SensorEvent::HighGNegativeX => {
            (int_map_0::HIGH_G, Register::IntEn1, int_en_1::HIGH_G_X)
        }
        SensorEvent::HighGPositiveY | SensorEvent::HighGNegativeY => {
            (int_map_0::HIGH_G, Register::IntEn1, int_en_1::HIGH_G_Y)
        }
        SensorEvent::HighGPositiveZ | SensorEvent::HighGNegativeZ => {
            (int_map_0::HIGH_G, Register::IntEn1, int_en_1::HIGH_G_Z)
        }
    }
}

fn event_matches(event: SensorEvent, status: IntStatus) -> bool {
    let flag_set = match event {
        SensorEvent::SingleTap => status.single_tap,
        SensorEvent::DoubleTap => status.double_tap,
        SensorEvent::FreeFall => status.low_g,
        SensorEvent::OrientChange => status.orient,
        SensorEvent::Sleep => status.slo_no_mot,
        SensorEvent::Wakeup => status.slope,
        _ => status.high_g,
    };
    flag_set && event.matches_high_g_direction(status.status3)
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use super::*;
    use crate::interrupt::IntLatch;
    use crate::register::{
        chip_id, int_rst_latch, int_status_0, int_status_3, ofc_ctrl, pmu_lpw, soft_reset,
    };
    use crate::testing::{MockDelay, MockInterface};
    use futures::executor::block_on;

    fn new_driver(
        latch: &EdgeLatch,
        interface: MockInterface,
    ) -> Bma253<'_, MockInterface, NoPin> {
        Bma253::from_core(DeviceCore::new(interface, Config::new()), latch, None)
    }

    fn ready_interface() -> MockInterface {
        MockInterface::default().with_reg(Register::BgwChipId.addr(), chip_id::EXPECTED)
    }

    fn init_driver<'a>(latch: &'a EdgeLatch) -> Bma253<'a, MockInterface, NoPin> {
        let mut driver = new_driver(latch, ready_interface());
        let mut delay = MockDelay::default();
        block_on(driver.init(&mut delay)).expect("init");
        driver
    }

    fn last_power_mode(driver: &Bma253<'_, MockInterface, NoPin>) -> PowerMode {
        driver.core.power()
    }

    #[test]
    fn init_settles_into_suspend_at_full_bandwidth() {
        let latch = EdgeLatch::new();
        let driver = init_driver(&latch);
        assert_eq!(last_power_mode(&driver), PowerMode::Suspend);
        assert_eq!(driver.applied_bandwidth, Bandwidth::Hz1000);
    }

    #[test]
    fn notification_slot_is_exclusive() {
        let latch = EdgeLatch::new();
        let mut driver = init_driver(&latch);
        let mut delay = MockDelay::default();

        block_on(driver.set_notification(&mut delay, SensorEvent::Wakeup)).expect("subscribe");
        assert_eq!(
            block_on(driver.set_notification(&mut delay, SensorEvent::SingleTap)),
            Err(Error::Busy)
        );
        assert_eq!(driver.subscribed_event(), Some(SensorEvent::Wakeup));
    }

    #[test]
    fn subscription_drives_lpm1_and_release_returns_to_suspend() {
        let latch = EdgeLatch::new();
        let mut driver = init_driver(&latch);
        let mut delay = MockDelay::default();

        block_on(driver.set_notification(&mut delay, SensorEvent::FreeFall)).expect("subscribe");
        assert_eq!(last_power_mode(&driver), PowerMode::Lpm1);

        block_on(driver.unset_notification(&mut delay, SensorEvent::FreeFall)).expect("release");
        assert_eq!(last_power_mode(&driver), PowerMode::Suspend);
        assert_eq!(driver.subscribed_event(), None);
    }

    #[test]
    fn event_params_written_under_temporary_latch() {
        let latch = EdgeLatch::new();
        let mut driver = init_driver(&latch);
        let mut delay = MockDelay::default();
        driver.core.test_clear_writes();

        block_on(driver.set_notification(&mut delay, SensorEvent::FreeFall)).expect("subscribe");

        let writes: Vec<(u8, u8)> = driver.core.test_writes();
        let latch_writes: Vec<u8> = writes
            .iter()
            .filter(|(reg, _)| *reg == Register::IntRstLatch.addr())
            .map(|(_, value)| *value)
            .collect();
        assert_eq!(
            latch_writes.first(),
            Some(&(IntLatch::Temporary500Ms.bits() | int_rst_latch::RESET_INT))
        );
        assert_eq!(
            latch_writes.last(),
            Some(&(IntLatch::NonLatched.bits() | int_rst_latch::RESET_INT))
        );

        // Low-g parameter registers written between the two latch writes.
        let int0_pos = writes
            .iter()
            .position(|(reg, _)| *reg == Register::Int0.addr())
            .expect("low-g delay written");
        let first_latch_pos = writes
            .iter()
            .position(|(reg, _)| *reg == Register::IntRstLatch.addr())
            .expect("latch written");
        assert!(int0_pos > first_latch_pos);
    }

    #[test]
    fn high_g_disable_clears_shared_group() {
        let latch = EdgeLatch::new();
        let mut driver = init_driver(&latch);
        let mut delay = MockDelay::default();

        block_on(driver.set_notification(&mut delay, SensorEvent::HighGNegativeY))
            .expect("subscribe");
        block_on(driver.unset_notification(&mut delay, SensorEvent::HighGNegativeY))
            .expect("release");

        assert_eq!(driver.core.test_reg(Register::IntEn1.addr()) & int_en_1::HIGH_G_ALL, 0);
        assert_eq!(driver.core.test_reg(Register::IntMap0.addr()) & int_map_0::HIGH_G, 0);
    }

    #[test]
    fn handle_interrupt_matches_high_g_direction() {
        let latch = EdgeLatch::new();
        let mut driver = init_driver(&latch);
        let mut delay = MockDelay::default();
        block_on(driver.set_notification(&mut delay, SensorEvent::HighGNegativeY))
            .expect("subscribe");

        driver
            .core
            .test_set_reg(Register::IntStatus0.addr(), int_status_0::HIGH_G);
        driver.core.test_set_reg(
            Register::IntStatus3.addr(),
            int_status_3::HIGH_SIGN | int_status_3::HIGH_FIRST_Y,
        );
        assert_eq!(
            block_on(driver.handle_interrupt()),
            Ok(Some(SensorEvent::HighGNegativeY))
        );

        // Positive deflection on the same axis must not match.
        driver
            .core
            .test_set_reg(Register::IntStatus3.addr(), int_status_3::HIGH_FIRST_Y);
        assert_eq!(block_on(driver.handle_interrupt()), Ok(None));
    }

    #[test]
    fn stream_read_rejects_second_session() {
        let latch = EdgeLatch::new();
        let mut driver = init_driver(&latch);
        let mut delay = MockDelay::default();
        driver.acq = AcqState::Requested;

        let result = block_on(driver.stream_read(&mut delay, Some(1), &mut |_| {
            ControlFlow::Continue(())
        }));
        assert_eq!(result, Err(Error::Busy));
    }

    #[test]
    fn stream_read_delivers_frames_and_restores_int_enables() {
        let latch = EdgeLatch::new();
        let mut driver = init_driver(&latch);
        let mut delay = MockDelay::default();

        driver.core.test_set_reg(Register::IntEn0.addr(), 0x55);
        driver.core.test_set_reg(Register::FifoStatus.addr(), 4);

        let mut samples = 0u32;
        let total = block_on(driver.stream_read(&mut delay, Some(1), &mut |item| {
            if matches!(item, StreamItem::Sample(_)) {
                samples += 1;
            }
            ControlFlow::Continue(())
        }))
        .expect("stream");

        assert_eq!(total, 4);
        assert_eq!(samples, 4);
        assert_eq!(driver.core.test_reg(Register::IntEn0.addr()), 0x55);
        // Session over: back at the idle arbitrated state.
        assert_eq!(last_power_mode(&driver), PowerMode::Suspend);
    }

    #[test]
    fn stream_sink_can_stop_session_early() {
        let latch = EdgeLatch::new();
        let mut driver = init_driver(&latch);
        let mut delay = MockDelay::default();
        driver.core.test_set_reg(Register::FifoStatus.addr(), 8);

        let total = block_on(driver.stream_read(&mut delay, None, &mut |_| {
            ControlFlow::Break(())
        }))
        .expect("stream");
        assert_eq!(total, 1);
    }

    #[test]
    fn deferred_config_applied_only_by_apply_pending() {
        let latch = EdgeLatch::new();
        let mut driver = init_driver(&latch);
        let mut delay = MockDelay::default();

        driver.acq = AcqState::Draining;
        block_on(driver.arbitrate(&mut delay)).expect("arbitrate");
        // Draining: nothing applied, target stashed.
        assert_eq!(last_power_mode(&driver), PowerMode::Suspend);
        assert!(driver.pending.is_some());

        driver.acq = AcqState::Requested;
        block_on(driver.apply_pending(&mut delay)).expect("apply pending");
        assert_eq!(last_power_mode(&driver), PowerMode::Normal);
        assert!(driver.pending.is_none());
    }

    #[test]
    fn double_tap_floors_bandwidth() {
        let latch = EdgeLatch::new();
        let mut driver = init_driver(&latch);
        let mut delay = MockDelay::default();

        let config = Config::new().with_bandwidth(Bandwidth::Hz7_81);
        block_on(driver.set_config(&mut delay, config)).expect("config");
        block_on(driver.set_notification(&mut delay, SensorEvent::DoubleTap)).expect("subscribe");

        driver.acq = AcqState::Requested;
        assert_eq!(driver.desired_hw().bandwidth, TAP_BANDWIDTH_FLOOR);
        driver.acq = AcqState::Idle;
        assert_eq!(driver.desired_hw().bandwidth, Bandwidth::Hz1000);
    }

    #[test]
    fn poll_read_returns_scaled_sample_and_restores_power() {
        let latch = EdgeLatch::new();
        let mut driver = init_driver(&latch);
        let mut delay = MockDelay::default();

        // +512 counts on X at 2 g with the new-data flag set.
        driver.core.test_set_reg(Register::AccdXLsb.addr(), 0x01);
        driver.core.test_set_reg(Register::AccdXMsb.addr(), 0x20);

        let sample = block_on(driver.poll_read(&mut delay)).expect("poll read");
        assert_eq!(sample.x, 500);
        assert_eq!(sample.y, 0);
        assert_eq!(last_power_mode(&driver), PowerMode::Suspend);
    }

    #[test]
    fn trigger_slot_is_exclusive_and_waits_for_status() {
        let latch = EdgeLatch::new();
        let mut driver = init_driver(&latch);
        let mut delay = MockDelay::default();

        block_on(driver.set_trigger_threshold(&mut delay, Some(300), Some(1500)))
            .expect("arm trigger");
        assert_eq!(
            block_on(driver.set_trigger_threshold(&mut delay, Some(300), None)),
            Err(Error::Busy)
        );

        driver
            .core
            .test_set_reg(Register::IntStatus0.addr(), int_status_0::HIGH_G);
        let trigger = block_on(driver.wait_for_trigger(&mut delay, Some(1_000_000)))
            .expect("trigger");
        assert_eq!(trigger, ThresholdTrigger::High);

        block_on(driver.unset_trigger_threshold(&mut delay)).expect("disarm");
        assert_eq!(last_power_mode(&driver), PowerMode::Suspend);
    }

    #[test]
    fn failed_trigger_arm_restores_latch_mode() {
        let latch = EdgeLatch::new();
        let interface = ready_interface().fail_writes_to(Register::Int3.addr());
        let mut driver = new_driver(&latch, interface);
        let mut delay = MockDelay::default();
        block_on(driver.init(&mut delay)).expect("init");

        assert_eq!(
            block_on(driver.set_trigger_threshold(&mut delay, None, Some(1_500))),
            Err(Error::Bus)
        );
        assert!(!driver.trigger_armed);
        assert_eq!(
            driver.core.test_reg(Register::IntRstLatch.addr()) & int_rst_latch::LATCH_MODE_MASK,
            IntLatch::NonLatched.bits()
        );
    }

    #[test]
    fn wait_for_trigger_times_out() {
        let latch = EdgeLatch::new();
        let mut driver = init_driver(&latch);
        let mut delay = MockDelay::default();
        block_on(driver.set_trigger_threshold(&mut delay, Some(300), None)).expect("arm");

        assert_eq!(
            block_on(driver.wait_for_trigger(&mut delay, Some(1_000))),
            Err(Error::NotReady)
        );
    }

    #[test]
    fn self_test_resets_and_reconfigures() {
        let latch = EdgeLatch::new();
        let mut driver = init_driver(&latch);
        let mut delay = MockDelay::default();

        // Static mock readings produce zero deflection on every axis.
        let report = block_on(driver.self_test(&mut delay)).expect("self test");
        assert!(!report.pass());

        let writes: Vec<(u8, u8)> = driver.core.test_writes();
        assert!(writes.contains(&(Register::BgwSoftReset.addr(), soft_reset::RESET)));
        assert!(writes.contains(&(Register::PmuSelfTest.addr(), pmu_self_test::DISABLE)));
        // Back at the idle arbitrated state with the configured range.
        assert_eq!(last_power_mode(&driver), PowerMode::Suspend);
        assert_eq!(
            driver.core.test_reg(Register::PmuRange.addr()),
            GRange::G2.bits()
        );
        let lpw = driver.core.test_reg(Register::PmuLpw.addr());
        assert_eq!(lpw >> pmu_lpw::POWER_MODE_SHIFT, 0b100);
    }

    #[test]
    fn offset_compensation_restores_configured_range() {
        let latch = EdgeLatch::new();
        let interface = ready_interface()
            .with_reg(Register::OfcCtrl.addr(), ofc_ctrl::CAL_RDY)
            .with_sticky_bits(Register::OfcCtrl.addr(), ofc_ctrl::CAL_RDY);
        let mut driver = new_driver(&latch, interface);
        let mut delay = MockDelay::default();
        block_on(driver.init(&mut delay)).expect("init");

        let config = Config::new().with_range(GRange::G16);
        block_on(driver.set_config(&mut delay, config)).expect("config");
        block_on(driver.offset_compensation(
            &mut delay,
            [OffsetTarget::Zero, OffsetTarget::Zero, OffsetTarget::MinusG],
        ))
        .expect("compensation");

        assert_eq!(
            driver.core.test_reg(Register::PmuRange.addr()),
            GRange::G16.bits()
        );
        assert_eq!(last_power_mode(&driver), PowerMode::Suspend);
    }

    #[test]
    fn register_read_back_reflects_programmed_state() {
        let latch = EdgeLatch::new();
        let mut driver = init_driver(&latch);

        assert_eq!(block_on(driver.read_range()), Ok(GRange::G2));
        assert_eq!(block_on(driver.read_bandwidth()), Ok(Bandwidth::Hz1000));
        assert_eq!(block_on(driver.read_latch_mode()), Ok(IntLatch::NonLatched));
    }

    #[test]
    fn offsets_round_trip_in_milli_g() {
        let latch = EdgeLatch::new();
        let mut driver = init_driver(&latch);

        block_on(driver.write_offsets([500, -500, 0])).expect("write offsets");
        let offsets = block_on(driver.query_offsets()).expect("query offsets");
        // 7.81 mg per LSB quantization.
        assert!((offsets[0] - 500).abs() <= 8);
        assert!((offsets[1] + 500).abs() <= 8);
        assert_eq!(offsets[2], 0);
    }
}
