//! Device core operations for the BMA253.

use core::ops::ControlFlow;

use embedded_hal_async::delay::DelayNs;

use crate::config::{Bandwidth, Config, GRange, PowerMode, PowerPlan, plan_transition};
use crate::data::fifo::{FifoConfig, FifoFrameIterator, FifoStatus, MAX_FIFO_DEPTH};
use crate::data::{AccelMg, AccelRaw, DATA_BLOCK_LEN, DATA_BLOCK_START, TemperatureRaw};
use crate::error::Error;
use crate::events::{HighGConfig, LowGConfig, SlopeConfig, SlowNoMotConfig};
use crate::interface::{I2cInterface, Interface};
use crate::interrupt::{IntEnableSnapshot, IntLatch, IntPin, IntStatus};
use crate::register::{
    Register, accd_hbw, chip_id, fifo_config_0, int_map_1, int_rst_latch, ofc_ctrl, ofc_setting,
    pmu_lpw, soft_reset,
};

/// Settle time after a power register write while entering normal mode.
const POWER_SETTLE_NORMAL_US: u32 = 500;
/// Settle time after a power register write entering a low-power mode.
const POWER_SETTLE_SUSPEND_US: u32 = 1_000;
/// Startup time after a soft reset.
const RESET_SETTLE_US: u32 = 2_000;

/// Offset compensation target for one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OffsetTarget {
    /// Compensate towards 0 g.
    Zero,
    /// Compensate towards +1 g.
    PlusG,
    /// Compensate towards -1 g.
    MinusG,
}

impl OffsetTarget {
    const fn bits(self) -> u8 {
        match self {
            Self::Zero => 0b00,
            Self::PlusG => 0b01,
            Self::MinusG => 0b10,
        }
    }
}

pub(crate) struct DeviceCore<I> {
    interface: I,
    config: Config,
    fifo: FifoConfig,
    power: PowerMode,
}

impl<I> DeviceCore<I>
where
    I: Interface,
{
    pub(crate) fn new(interface: I, config: Config) -> Self {
        Self {
            interface,
            config,
            fifo: FifoConfig::new(),
            power: PowerMode::Normal,
        }
    }

    pub(crate) const fn config(&self) -> Config {
        self.config
    }

    pub(crate) fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    pub(crate) const fn power(&self) -> PowerMode {
        self.power
    }

    pub(crate) const fn fifo_config(&self) -> FifoConfig {
        self.fifo
    }

    pub(crate) async fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error> {
        self.verify_device().await?;
        self.soft_reset(delay).await?;
        self.apply_config().await
    }

    pub(crate) async fn soft_reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error> {
        self.write_reg(Register::BgwSoftReset, soft_reset::RESET)
            .await?;
        delay.delay_us(RESET_SETTLE_US).await;
        // The chip wakes up sampling in normal mode.
        self.power = PowerMode::Normal;
        Ok(())
    }

    pub(crate) async fn verify_device(&mut self) -> Result<(), Error> {
        let id = self.read_reg(Register::BgwChipId).await?;
        if id != chip_id::EXPECTED {
            return Err(Error::WrongDevice);
        }
        Ok(())
    }

    /// Writes range, bandwidth, data path, pin electrical behavior, latch
    /// mode, and FIFO configuration. Does not touch the power mode.
    pub(crate) async fn apply_config(&mut self) -> Result<(), Error> {
        self.config.validate()?;
        self.set_range(self.config.range).await?;
        self.set_bandwidth(self.config.bandwidth).await?;
        let hbw = if self.config.unfiltered_data {
            accd_hbw::DATA_HIGH_BW
        } else {
            0
        };
        self.write_reg(Register::AccdHbw, hbw).await?;
        let (bits, mask) = self.config.pin_config.out_ctrl_bits(self.config.int_pin);
        self.update_reg(Register::IntOutCtrl, mask, bits).await?;
        self.set_latch(self.config.latch, false).await?;
        self.apply_fifo_config(self.fifo).await
    }

    /// Writes the range register without touching `config.range`, so a
    /// temporary range for self-test or calibration can be undone by
    /// writing the configured value back.
    pub(crate) async fn set_range(&mut self, range: GRange) -> Result<(), Error> {
        self.write_reg(Register::PmuRange, range.bits()).await
    }

    pub(crate) async fn set_bandwidth(&mut self, bandwidth: Bandwidth) -> Result<(), Error> {
        self.write_reg(Register::PmuBw, bandwidth.bits()).await
    }

    pub(crate) async fn read_range(&mut self) -> Result<GRange, Error> {
        let value = self.read_reg(Register::PmuRange).await?;
        GRange::from_reg(value).ok_or(Error::InvalidConfig)
    }

    pub(crate) async fn read_bandwidth(&mut self) -> Result<Bandwidth, Error> {
        let value = self.read_reg(Register::PmuBw).await?;
        Ok(Bandwidth::from_reg(value))
    }

    /// Moves the chip to the target power mode, staging the transition as
    /// required. The tracked mode is only updated once every write of the
    /// plan has succeeded, so a bus failure leaves the bookkeeping on the
    /// mode the chip was last known to be in.
    pub(crate) async fn change_power<D: DelayNs>(
        &mut self,
        delay: &mut D,
        target: PowerMode,
    ) -> Result<(), Error> {
        match plan_transition(self.power, target) {
            PowerPlan::NoOp => Ok(()),
            PowerPlan::Direct => {
                self.write_power(delay, target).await?;
                self.power = target;
                Ok(())
            }
            PowerPlan::ViaNormal => {
                self.write_power(delay, PowerMode::Normal).await?;
                self.power = PowerMode::Normal;
                self.write_power(delay, target).await?;
                self.power = target;
                Ok(())
            }
            PowerPlan::ResetAndReconfigure => {
                self.soft_reset(delay).await?;
                self.apply_config().await?;
                // The reset leaves the chip sampling in normal mode; any
                // remaining target is a single direct write from there.
                if !matches!(target, PowerMode::Normal) {
                    self.write_power(delay, target).await?;
                    self.power = target;
                }
                Ok(())
            }
        }
    }

    /// Moves to the first candidate unless the chip is already in one of
    /// them. Used to reach an acceptable mode for a one-off operation.
    pub(crate) async fn interim_power<D: DelayNs>(
        &mut self,
        delay: &mut D,
        candidates: &[PowerMode],
    ) -> Result<(), Error> {
        if candidates.iter().any(|mode| *mode == self.power) {
            return Ok(());
        }
        let target = *candidates.first().ok_or(Error::InvalidConfig)?;
        self.change_power(delay, target).await
    }

    async fn write_power<D: DelayNs>(
        &mut self,
        delay: &mut D,
        target: PowerMode,
    ) -> Result<(), Error> {
        // The mode variant select must be in place before the power field
        // changes, otherwise the chip can enter the wrong low-power flavor.
        self.write_reg(Register::PmuLowPower, target.low_power_bits())
            .await?;
        let lpw = (target.lpw_bits() << pmu_lpw::POWER_MODE_SHIFT)
            | ((self.config.sleep.bits() << pmu_lpw::SLEEP_DUR_SHIFT) & pmu_lpw::SLEEP_DUR_MASK);
        self.write_reg(Register::PmuLpw, lpw).await?;
        let settle = if matches!(target, PowerMode::Normal) {
            POWER_SETTLE_NORMAL_US
        } else {
            POWER_SETTLE_SUSPEND_US
        };
        delay.delay_us(settle).await;
        Ok(())
    }

    pub(crate) async fn apply_fifo_config(&mut self, config: FifoConfig) -> Result<(), Error> {
        self.write_reg(
            Register::FifoConfig0,
            config.watermark & fifo_config_0::WATER_MARK_MASK,
        )
        .await?;
        self.write_reg(Register::FifoConfig1, config.config_1_bits())
            .await?;
        self.fifo = config;
        Ok(())
    }

    /// Discards all buffered frames. Writing FIFO_CONFIG_1 resets the FIFO.
    pub(crate) async fn clear_fifo(&mut self) -> Result<(), Error> {
        self.write_reg(Register::FifoConfig1, self.fifo.config_1_bits())
            .await
    }

    pub(crate) async fn fifo_status(&mut self) -> Result<FifoStatus, Error> {
        let value = self.read_reg(Register::FifoStatus).await?;
        Ok(FifoStatus::from_reg(value))
    }

    /// Drains every buffered frame in one burst read, decoding and scaling
    /// each sample before handing it to the sink. Returns the number of
    /// frames delivered. The sink can stop the drain early; remaining
    /// frames stay consumed from the hardware either way.
    pub(crate) async fn drain_fifo<F>(&mut self, sink: &mut F) -> Result<u32, Error>
    where
        F: FnMut(AccelMg) -> ControlFlow<()>,
    {
        let status = self.fifo_status().await?;
        let frames = status.drain_count();
        if frames == 0 {
            return Ok(0);
        }

        let frame_bytes = self.fifo.data_select.frame_bytes();
        let mut buffer = [0u8; MAX_FIFO_DEPTH as usize * 6];
        let read_len = usize::from(frames) * frame_bytes;
        self.read_regs(Register::FifoData, &mut buffer[..read_len])
            .await?;

        let range = self.config.range;
        let mut delivered = 0u32;
        for raw in FifoFrameIterator::new(&buffer[..read_len], self.fifo.data_select) {
            delivered += 1;
            if let ControlFlow::Break(()) = sink(raw.to_mg(range)) {
                break;
            }
        }

        if status.overrun {
            self.clear_fifo().await?;
        }
        Ok(delivered)
    }

    pub(crate) async fn read_accel_raw(&mut self) -> Result<(AccelRaw, bool), Error> {
        let mut buffer = [0u8; DATA_BLOCK_LEN];
        self.read_regs(DATA_BLOCK_START, &mut buffer).await?;
        Ok((
            AccelRaw::from_data_block(&buffer),
            crate::data::has_new_data(&buffer),
        ))
    }

    pub(crate) async fn read_temperature_raw(&mut self) -> Result<TemperatureRaw, Error> {
        let value = self.read_reg(Register::AccdTemp).await?;
        Ok(TemperatureRaw { value: value as i8 })
    }

    /// Reads and decodes all four interrupt status registers in one burst.
    pub(crate) async fn read_int_status(&mut self) -> Result<IntStatus, Error> {
        let mut buffer = [0u8; 4];
        self.read_regs(Register::IntStatus0, &mut buffer).await?;
        Ok(IntStatus::from_regs(
            buffer[0], buffer[1], buffer[2], buffer[3],
        ))
    }

    pub(crate) async fn int_enable_snapshot(&mut self) -> Result<IntEnableSnapshot, Error> {
        let mut regs = [0u8; 3];
        self.read_regs(Register::IntEn0, &mut regs).await?;
        Ok(IntEnableSnapshot { regs })
    }

    pub(crate) async fn restore_int_enable(
        &mut self,
        snapshot: IntEnableSnapshot,
    ) -> Result<(), Error> {
        self.write_reg(Register::IntEn0, snapshot.regs[0]).await?;
        self.write_reg(Register::IntEn1, snapshot.regs[1]).await?;
        self.write_reg(Register::IntEn2, snapshot.regs[2]).await
    }

    pub(crate) async fn update_int_enable(
        &mut self,
        reg: Register,
        mask: u8,
        enable: bool,
    ) -> Result<(), Error> {
        let bits = if enable { mask } else { 0 };
        self.update_reg(reg, mask, bits).await
    }

    /// Routes the data-ready and FIFO interrupts to the given pin.
    pub(crate) async fn route_data_interrupts(
        &mut self,
        pin: IntPin,
        enable: bool,
    ) -> Result<(), Error> {
        let mask = match pin {
            IntPin::Int1 => int_map_1::INT1_DATA | int_map_1::INT1_FWM | int_map_1::INT1_FFULL,
            IntPin::Int2 => int_map_1::INT2_DATA | int_map_1::INT2_FWM | int_map_1::INT2_FFULL,
        };
        let bits = if enable { mask } else { 0 };
        self.update_reg(Register::IntMap1, mask, bits).await
    }

    /// Routes an event interrupt group to the given pin. The mask uses the
    /// INT_MAP_0 bit layout, which INT_MAP_2 mirrors for pin 2.
    pub(crate) async fn route_event_interrupt(
        &mut self,
        pin: IntPin,
        mask: u8,
        enable: bool,
    ) -> Result<(), Error> {
        let reg = match pin {
            IntPin::Int1 => Register::IntMap0,
            IntPin::Int2 => Register::IntMap2,
        };
        let bits = if enable { mask } else { 0 };
        self.update_reg(reg, mask, bits).await
    }

    /// Sets the latch mode, optionally clearing any latched interrupt.
    pub(crate) async fn set_latch(&mut self, latch: IntLatch, clear: bool) -> Result<(), Error> {
        let mut value = latch.bits();
        if clear {
            value |= int_rst_latch::RESET_INT;
        }
        self.write_reg(Register::IntRstLatch, value).await
    }

    pub(crate) async fn latch_mode(&mut self) -> Result<IntLatch, Error> {
        let value = self.read_reg(Register::IntRstLatch).await?;
        Ok(IntLatch::from_reg(value))
    }

    pub(crate) async fn apply_low_g(&mut self, cfg: LowGConfig) -> Result<(), Error> {
        let [delay, thresh, hyst] = cfg.encode()?;
        self.write_reg(Register::Int0, delay).await?;
        self.write_reg(Register::Int1, thresh).await?;
        // Bits 7:6 of INT_2 belong to the high-g hysteresis.
        self.update_reg(Register::Int2, 0b0011_1111, hyst).await
    }

    pub(crate) async fn apply_high_g(&mut self, cfg: HighGConfig) -> Result<(), Error> {
        let [hyst, delay, thresh] = cfg.encode(self.config.range)?;
        self.update_reg(Register::Int2, 0b1100_0000, hyst).await?;
        self.write_reg(Register::Int3, delay).await?;
        self.write_reg(Register::Int4, thresh).await
    }

    pub(crate) async fn apply_slope(&mut self, cfg: SlopeConfig) -> Result<(), Error> {
        let [duration, thresh] = cfg.encode(self.config.range)?;
        // Bits 7:2 of INT_5 hold the slow/no-motion duration.
        self.update_reg(Register::Int5, 0b0000_0011, duration)
            .await?;
        self.write_reg(Register::Int6, thresh).await
    }

    pub(crate) async fn apply_slow_no_mot(&mut self, cfg: SlowNoMotConfig) -> Result<(), Error> {
        let [duration, thresh] = cfg.encode(self.config.range)?;
        self.update_reg(Register::Int5, 0b1111_1100, duration)
            .await?;
        self.write_reg(Register::Int7, thresh).await
    }

    pub(crate) async fn apply_tap(&mut self, cfg: crate::events::TapConfig) -> Result<(), Error> {
        let [timing, samples_thresh] = cfg.encode(self.config.range)?;
        self.write_reg(Register::Int8, timing).await?;
        self.write_reg(Register::Int9, samples_thresh).await
    }

    pub(crate) async fn apply_orient(
        &mut self,
        cfg: crate::events::OrientConfig,
    ) -> Result<(), Error> {
        let [first, second] = cfg.encode()?;
        self.write_reg(Register::IntA, first).await?;
        self.write_reg(Register::IntB, second).await
    }

    pub(crate) async fn read_offsets(&mut self) -> Result<[i8; 3], Error> {
        let mut buffer = [0u8; 3];
        self.read_regs(Register::OfcOffsetX, &mut buffer).await?;
        Ok([buffer[0] as i8, buffer[1] as i8, buffer[2] as i8])
    }

    pub(crate) async fn write_offsets(&mut self, offsets: [i8; 3]) -> Result<(), Error> {
        self.write_reg(Register::OfcOffsetX, offsets[0] as u8)
            .await?;
        self.write_reg(Register::OfcOffsetY, offsets[1] as u8)
            .await?;
        self.write_reg(Register::OfcOffsetZ, offsets[2] as u8).await
    }

    pub(crate) async fn reset_offsets(&mut self) -> Result<(), Error> {
        self.write_reg(Register::OfcCtrl, ofc_ctrl::OFFSET_RESET)
            .await
    }

    /// Runs fast offset compensation on all three axes towards the given
    /// targets. The chip must be sampling in normal mode at 2 g.
    pub(crate) async fn offset_compensation<D: DelayNs>(
        &mut self,
        delay: &mut D,
        targets: [OffsetTarget; 3],
    ) -> Result<(), Error> {
        let setting = (targets[0].bits() << ofc_setting::TARGET_X_SHIFT)
            | (targets[1].bits() << ofc_setting::TARGET_Y_SHIFT)
            | (targets[2].bits() << ofc_setting::TARGET_Z_SHIFT);
        self.write_reg(Register::OfcSetting, setting).await?;

        for axis in 1u8..=3 {
            self.wait_cal_ready(delay).await?;
            self.write_reg(Register::OfcCtrl, axis << ofc_ctrl::CAL_TRIGGER_SHIFT)
                .await?;
            self.wait_cal_ready(delay).await?;
        }
        Ok(())
    }

    async fn wait_cal_ready<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error> {
        const POLL_RETRIES: u16 = 1_000;
        const POLL_DELAY_US: u32 = 1_000;

        for _ in 0..POLL_RETRIES {
            let ctrl = self.read_reg(Register::OfcCtrl).await?;
            if (ctrl & ofc_ctrl::CAL_RDY) != 0 {
                return Ok(());
            }
            delay.delay_us(POLL_DELAY_US).await;
        }
        Err(Error::NotReady)
    }

    pub(crate) async fn read_trim(&mut self) -> Result<[u8; 2], Error> {
        let mut buffer = [0u8; 2];
        self.read_regs(Register::TrimGp0, &mut buffer).await?;
        Ok(buffer)
    }

    pub(crate) async fn write_trim(&mut self, values: [u8; 2]) -> Result<(), Error> {
        self.write_reg(Register::TrimGp0, values[0]).await?;
        self.write_reg(Register::TrimGp1, values[1]).await
    }

    pub(crate) async fn set_self_test(&mut self, value: u8) -> Result<(), Error> {
        self.write_reg(Register::PmuSelfTest, value).await
    }

    async fn update_reg(&mut self, reg: Register, mask: u8, bits: u8) -> Result<(), Error> {
        let current = self.read_reg(reg).await?;
        let updated = (current & !mask) | (bits & mask);
        if updated != current {
            self.write_reg(reg, updated).await?;
        }
        Ok(())
    }

    pub(crate) fn release(self) -> I {
        self.interface
    }

    pub(crate) async fn read_reg(&mut self, reg: Register) -> Result<u8, Error> {
        self.interface.read_reg(reg.addr()).await
    }

    pub(crate) async fn read_regs(
        &mut self,
        reg: Register,
        buffer: &mut [u8],
    ) -> Result<(), Error> {
        self.interface.read_regs(reg.addr(), buffer).await
    }

    pub(crate) async fn write_reg(&mut self, reg: Register, value: u8) -> Result<(), Error> {
        self.interface.write_reg(reg.addr(), value).await
    }
}

impl<I2C> DeviceCore<I2cInterface<I2C>> {
    pub(crate) fn set_i2c_address(&mut self, address: u8) {
        self.interface.set_address(address);
    }
}

#[cfg(test)]
impl DeviceCore<crate::testing::MockInterface> {
    pub(crate) fn test_writes(&self) -> std::vec::Vec<(u8, u8)> {
        self.interface.writes().to_vec()
    }

    pub(crate) fn test_clear_writes(&mut self) {
        self.interface.clear_writes();
    }

    pub(crate) fn test_reg(&self, reg: u8) -> u8 {
        self.interface.reg(reg)
    }

    pub(crate) fn test_set_reg(&mut self, reg: u8, value: u8) {
        self.interface.set_reg(reg, value);
    }
}

#[cfg(test)]
mod tests {
    use std::vec::Vec;

    use super::*;
    use crate::testing::{MockDelay, MockInterface};
    use futures::executor::block_on;

    fn core_with(interface: MockInterface) -> DeviceCore<MockInterface> {
        DeviceCore::new(interface, Config::new())
    }

    #[test]
    fn init_checks_chip_id() {
        let interface = MockInterface::default().with_reg(Register::BgwChipId.addr(), 0x00);
        let mut core = core_with(interface);
        let mut delay = MockDelay::default();
        assert_eq!(block_on(core.init(&mut delay)), Err(Error::WrongDevice));

        let interface =
            MockInterface::default().with_reg(Register::BgwChipId.addr(), chip_id::EXPECTED);
        let mut core = core_with(interface);
        block_on(core.init(&mut delay)).expect("init");
        assert!(
            core.interface
                .writes()
                .contains(&(Register::BgwSoftReset.addr(), soft_reset::RESET))
        );
    }

    #[test]
    fn direct_power_change_writes_variant_select_first() {
        let mut core = core_with(MockInterface::default());
        let mut delay = MockDelay::default();

        block_on(core.change_power(&mut delay, PowerMode::Suspend)).expect("suspend");
        assert_eq!(core.power(), PowerMode::Suspend);

        let writes = core.interface.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0], (Register::PmuLowPower.addr(), 0));
        assert_eq!(writes[1].0, Register::PmuLpw.addr());
        assert_eq!(writes[1].1 >> pmu_lpw::POWER_MODE_SHIFT, 0b100);
        assert!(delay.calls >= 1);
    }

    #[test]
    fn cross_family_transition_stages_through_normal() {
        let mut core = core_with(MockInterface::default());
        let mut delay = MockDelay::default();
        block_on(core.change_power(&mut delay, PowerMode::Suspend)).expect("suspend");
        core.interface.clear_writes();

        block_on(core.change_power(&mut delay, PowerMode::Standby)).expect("standby");
        assert_eq!(core.power(), PowerMode::Standby);

        let lpw_writes: Vec<u8> = core
            .interface
            .writes()
            .iter()
            .filter(|(reg, _)| *reg == Register::PmuLpw.addr())
            .map(|(_, value)| *value >> pmu_lpw::POWER_MODE_SHIFT)
            .collect();
        assert_eq!(lpw_writes, [0b000, 0b100]);
    }

    #[test]
    fn failed_power_write_leaves_mode_unchanged() {
        let interface = MockInterface::default().fail_writes_to(Register::PmuLpw.addr());
        let mut core = core_with(interface);
        let mut delay = MockDelay::default();

        assert_eq!(
            block_on(core.change_power(&mut delay, PowerMode::Suspend)),
            Err(Error::Bus)
        );
        assert_eq!(core.power(), PowerMode::Normal);
    }

    #[test]
    fn deep_suspend_exit_resets_and_reconfigures() {
        let interface =
            MockInterface::default().with_reg(Register::BgwChipId.addr(), chip_id::EXPECTED);
        let mut core = core_with(interface);
        let mut delay = MockDelay::default();
        block_on(core.change_power(&mut delay, PowerMode::DeepSuspend)).expect("deep suspend");
        core.interface.clear_writes();

        block_on(core.change_power(&mut delay, PowerMode::Lpm1)).expect("lpm1");
        assert_eq!(core.power(), PowerMode::Lpm1);

        let writes = core.interface.writes();
        assert_eq!(writes[0], (Register::BgwSoftReset.addr(), soft_reset::RESET));
        assert!(
            writes
                .iter()
                .any(|(reg, value)| *reg == Register::PmuRange.addr()
                    && *value == GRange::G2.bits())
        );
        // The final power write takes the chip from normal to the target.
        let last_lpw = writes
            .iter()
            .rev()
            .find(|(reg, _)| *reg == Register::PmuLpw.addr())
            .map(|(_, value)| *value >> pmu_lpw::POWER_MODE_SHIFT);
        assert_eq!(last_lpw, Some(0b010));
    }

    #[test]
    fn deep_suspend_exit_to_normal_needs_no_power_write() {
        let interface =
            MockInterface::default().with_reg(Register::BgwChipId.addr(), chip_id::EXPECTED);
        let mut core = core_with(interface);
        let mut delay = MockDelay::default();
        block_on(core.change_power(&mut delay, PowerMode::DeepSuspend)).expect("deep suspend");
        core.interface.clear_writes();

        block_on(core.change_power(&mut delay, PowerMode::Normal)).expect("normal");
        assert_eq!(core.power(), PowerMode::Normal);
        assert!(
            !core
                .interface
                .writes()
                .iter()
                .any(|(reg, _)| *reg == Register::PmuLpw.addr())
        );
    }

    #[test]
    fn set_range_leaves_configured_range_untouched() {
        let mut core = core_with(MockInterface::default());
        block_on(core.set_range(GRange::G8)).expect("range");
        assert_eq!(core.config().range, GRange::G2);
        assert_eq!(
            core.interface.reg(Register::PmuRange.addr()),
            GRange::G8.bits()
        );
    }

    #[test]
    fn drain_fifo_empty_is_clean_noop() {
        let mut core = core_with(MockInterface::default());
        let frames = block_on(core.drain_fifo(&mut |_| ControlFlow::Continue(())))
            .expect("drain");
        assert_eq!(frames, 0);
        assert!(core.interface.writes().is_empty());
    }

    #[test]
    fn drain_fifo_overrun_reads_full_depth_and_clears() {
        let interface = MockInterface::default().with_reg(Register::FifoStatus.addr(), 0x80 | 3);
        let mut core = core_with(interface);

        let mut count = 0u32;
        let frames = block_on(core.drain_fifo(&mut |_| {
            count += 1;
            ControlFlow::Continue(())
        }))
        .expect("drain");

        assert_eq!(frames, u32::from(MAX_FIFO_DEPTH));
        assert_eq!(count, frames);
        // Overrun forces a FIFO clear by rewriting FIFO_CONFIG_1.
        let expected = core.fifo_config().config_1_bits();
        assert_eq!(
            core.interface.writes().last(),
            Some(&(Register::FifoConfig1.addr(), expected))
        );
        let bursts = core.interface.read_bursts();
        assert!(
            bursts
                .iter()
                .any(|(reg, len)| *reg == Register::FifoData.addr()
                    && *len == usize::from(MAX_FIFO_DEPTH) * 6)
        );
    }

    #[test]
    fn drain_fifo_sink_can_stop_early() {
        let interface = MockInterface::default().with_reg(Register::FifoStatus.addr(), 8);
        let mut core = core_with(interface);

        let mut count = 0u32;
        let frames = block_on(core.drain_fifo(&mut |_| {
            count += 1;
            if count == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        }))
        .expect("drain");

        assert_eq!(frames, 3);
    }

    #[test]
    fn offset_compensation_triggers_each_axis() {
        let interface = MockInterface::default()
            .with_reg(Register::OfcCtrl.addr(), ofc_ctrl::CAL_RDY)
            .with_sticky_bits(Register::OfcCtrl.addr(), ofc_ctrl::CAL_RDY);
        let mut core = core_with(interface);
        let mut delay = MockDelay::default();

        block_on(core.offset_compensation(
            &mut delay,
            [OffsetTarget::Zero, OffsetTarget::Zero, OffsetTarget::PlusG],
        ))
        .expect("compensation");

        let writes = core.interface.writes();
        assert_eq!(
            writes[0],
            (
                Register::OfcSetting.addr(),
                OffsetTarget::PlusG.bits() << ofc_setting::TARGET_Z_SHIFT
            )
        );
        let triggers: Vec<u8> = writes
            .iter()
            .filter(|(reg, _)| *reg == Register::OfcCtrl.addr())
            .map(|(_, value)| (*value & ofc_ctrl::CAL_TRIGGER_MASK) >> ofc_ctrl::CAL_TRIGGER_SHIFT)
            .collect();
        assert_eq!(triggers, [1, 2, 3]);
    }

    #[test]
    fn interim_power_skips_acceptable_modes() {
        let mut core = core_with(MockInterface::default());
        let mut delay = MockDelay::default();

        block_on(core.interim_power(&mut delay, &[PowerMode::Normal, PowerMode::Lpm1]))
            .expect("interim");
        assert!(core.interface.writes().is_empty());

        block_on(core.change_power(&mut delay, PowerMode::Suspend)).expect("suspend");
        core.interface.clear_writes();
        block_on(core.interim_power(&mut delay, &[PowerMode::Normal, PowerMode::Lpm1]))
            .expect("interim");
        assert_eq!(core.power(), PowerMode::Normal);
    }
}
