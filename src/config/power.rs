//! Power transition planning for the BMA253.
//!
//! Not every pair of power modes is reachable with one register write.
//! Deep suspend wipes all configuration, so leaving it requires a full
//! reset and reconfigure. The two low-power families (suspend/LPM1 vs
//! standby/LPM2) differ in the PMU_LOW_POWER variant bit, which the chip
//! only accepts while sampling, so crossing between families is staged
//! through normal mode.

use super::common::PowerMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PowerPlan {
    /// Already in the target mode.
    NoOp,
    /// One power-register write.
    Direct,
    /// Two writes: normal mode first, then the target.
    ViaNormal,
    /// Leaving deep suspend: soft reset plus full reconfigure.
    ResetAndReconfigure,
}

pub(crate) const fn plan_transition(from: PowerMode, to: PowerMode) -> PowerPlan {
    if from as u8 == to as u8 {
        return PowerPlan::NoOp;
    }
    if matches!(from, PowerMode::DeepSuspend) {
        return PowerPlan::ResetAndReconfigure;
    }
    if from.is_suspend_class()
        && to.is_suspend_class()
        && from.low_power_bits() != to.low_power_bits()
    {
        return PowerPlan::ViaNormal;
    }
    PowerPlan::Direct
}
