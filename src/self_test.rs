//! Self-test evaluation.
//!
//! The electrostatic self-test deflects each axis positive then negative;
//! the difference between the two readings must exceed a per-axis minimum
//! from the datasheet, measured at 8 g range.

/// Minimum X-axis deflection difference in milli-g.
const THRESHOLD_X_MG: i32 = 800;
/// Minimum Y-axis deflection difference in milli-g.
const THRESHOLD_Y_MG: i32 = 800;
/// Minimum Z-axis deflection difference in milli-g.
const THRESHOLD_Z_MG: i32 = 400;

/// Self-test result for one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SelfTestAxis {
    /// Measured positive-minus-negative deflection in milli-g.
    pub diff_mg: i32,
    /// Minimum acceptable deflection in milli-g.
    pub threshold_mg: i32,
}

impl SelfTestAxis {
    /// Returns true if this axis met its minimum deflection.
    pub const fn pass(self) -> bool {
        self.diff_mg.unsigned_abs() as i32 >= self.threshold_mg
    }
}

/// Self-test report for all three axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SelfTestReport {
    /// X-axis result.
    pub x: SelfTestAxis,
    /// Y-axis result.
    pub y: SelfTestAxis,
    /// Z-axis result.
    pub z: SelfTestAxis,
}

impl SelfTestReport {
    pub(crate) const fn from_diffs(diffs_mg: [i32; 3]) -> Self {
        Self {
            x: SelfTestAxis {
                diff_mg: diffs_mg[0],
                threshold_mg: THRESHOLD_X_MG,
            },
            y: SelfTestAxis {
                diff_mg: diffs_mg[1],
                threshold_mg: THRESHOLD_Y_MG,
            },
            z: SelfTestAxis {
                diff_mg: diffs_mg[2],
                threshold_mg: THRESHOLD_Z_MG,
            },
        }
    }

    /// Returns true if every axis met its minimum deflection.
    pub const fn pass(self) -> bool {
        self.x.pass() && self.y.pass() && self.z.pass()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_passes_when_all_axes_deflect() {
        let report = SelfTestReport::from_diffs([900, -850, 500]);
        assert!(report.x.pass());
        assert!(report.y.pass());
        assert!(report.z.pass());
        assert!(report.pass());
    }

    #[test]
    fn z_axis_has_lower_threshold() {
        let report = SelfTestReport::from_diffs([500, 500, 500]);
        assert!(!report.x.pass());
        assert!(!report.y.pass());
        assert!(report.z.pass());
        assert!(!report.pass());
    }

    #[test]
    fn exact_threshold_passes() {
        let report = SelfTestReport::from_diffs([800, 800, 400]);
        assert!(report.pass());
    }
}
