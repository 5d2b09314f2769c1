//! Overdrive: capability query, OverdriveN tuning and PMLog sensors

pub mod odn;
pub mod pmlog;

pub use odn::{
    FanControl, LevelsBuffer, OdnCapabilities, OdnRange, PerformanceLevel, PerformanceLevels,
    PerformanceStatus, PowerLimit, TemperatureKind, ZeroRpm,
};
pub use pmlog::{PmLogSnapshot, SensorReading};

use std::os::raw::c_int;

use serde::{Deserialize, Serialize};

use crate::context::{adl_call, Adl};
use crate::error::AdlResult;

/// Which Overdrive generation the adapter implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdriveCaps {
    /// Overdrive is available
    pub supported: bool,
    /// Overdrive is turned on
    pub enabled: bool,
    /// Overdrive version (5, 6, 7 for OverdriveN, 8)
    pub version: i32,
}

impl OverdriveCaps {
    /// Whether the OverdriveN entry points apply
    pub fn is_overdrive_n(&self) -> bool {
        self.supported && self.version == 7
    }
}

impl Adl {
    /// Overdrive support, state and version
    pub fn overdrive_caps(&self, adapter: i32) -> AdlResult<OverdriveCaps> {
        let (mut supported, mut enabled, mut version): (c_int, c_int, c_int) = (0, 0, 0);
        adl_call!(
            self,
            ADL2_Overdrive_Caps(adapter, &mut supported, &mut enabled, &mut version)
        )?;
        Ok(OverdriveCaps {
            supported: supported != 0,
            enabled: enabled != 0,
            version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::{AdlFunctions, ADL_CONTEXT_HANDLE};
    use crate::testing::fake_adl;

    unsafe extern "C" fn caps(
        _: ADL_CONTEXT_HANDLE,
        _: c_int,
        supported: *mut c_int,
        enabled: *mut c_int,
        version: *mut c_int,
    ) -> c_int {
        *supported = 1;
        *enabled = 1;
        *version = 7;
        0
    }

    #[test]
    fn reports_overdrive_n() {
        let adl = fake_adl(AdlFunctions {
            ADL2_Overdrive_Caps: Some(caps),
            ..Default::default()
        });
        let caps = adl.overdrive_caps(0).unwrap();
        assert!(caps.is_overdrive_n());
        assert_eq!(caps.version, 7);
    }
}
