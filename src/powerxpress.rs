//! PowerXpress switchable graphics

use std::os::raw::c_int;

use serde::{Deserialize, Serialize};

use crate::context::{adl_call, Adl};
use crate::error::{AdlError, AdlResult};
use crate::ffi::*;
use crate::mappings::parse_packed_version;

/// GPU driving the displays on a switchable-graphics system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PxGpu {
    /// Integrated GPU
    Integrated,
    /// Discrete GPU
    Discrete,
}

impl PxGpu {
    fn raw(self) -> c_int {
        match self {
            PxGpu::Integrated => ADL_DL_POWERXPRESS_GPU_INTEGRATED,
            PxGpu::Discrete => ADL_DL_POWERXPRESS_GPU_DISCRETE,
        }
    }

    fn from_raw(raw: c_int) -> Option<Self> {
        match raw {
            ADL_DL_POWERXPRESS_GPU_INTEGRATED => Some(PxGpu::Integrated),
            ADL_DL_POWERXPRESS_GPU_DISCRETE => Some(PxGpu::Discrete),
            _ => None,
        }
    }
}

impl std::fmt::Display for PxGpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PxGpu::Integrated => write!(f, "integrated"),
            PxGpu::Discrete => write!(f, "discrete"),
        }
    }
}

impl std::str::FromStr for PxGpu {
    type Err = AdlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "integrated" | "igpu" => Ok(PxGpu::Integrated),
            "discrete" | "dgpu" => Ok(PxGpu::Discrete),
            other => Err(AdlError::InvalidParameter(format!("unknown GPU '{other}'"))),
        }
    }
}

/// Outcome of a switch request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchResult {
    /// The switch is in progress
    Started,
    /// The driver refused the switch, usually because an application holds the GPU
    Declined,
    /// The requested GPU was already active
    AlreadyActive,
}

/// Packed PowerXpress version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PxVersion {
    /// Major version
    pub major: u16,
    /// Minor version
    pub minor: u16,
}

impl std::fmt::Display for PxVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Automatic switching on power source changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AutoSwitchConfig {
    /// Switch when moving from AC to battery
    pub on_ac_to_dc: bool,
    /// Switch when moving from battery to AC
    pub on_dc_to_ac: bool,
}

impl Adl {
    /// PowerXpress version
    pub fn powerxpress_version(&self, adapter: i32) -> AdlResult<PxVersion> {
        let mut raw: c_int = 0;
        adl_call!(self, ADL2_Display_PowerXpressVersion_Get(adapter, &mut raw))?;
        let (major, minor) = parse_packed_version(raw);
        Ok(PxVersion { major, minor })
    }

    /// GPU currently active
    pub fn active_gpu(&self, adapter: i32) -> AdlResult<PxGpu> {
        let mut raw: c_int = 0;
        adl_call!(self, ADL2_Display_PowerXpressActiveGPU_Get(adapter, &mut raw))?;
        PxGpu::from_raw(raw)
            .ok_or_else(|| AdlError::InvalidParameter(format!("driver reported GPU {raw}")))
    }

    /// Ask the driver to switch GPUs
    pub fn set_active_gpu(&self, adapter: i32, gpu: PxGpu) -> AdlResult<SwitchResult> {
        let mut result: c_int = 0;
        adl_call!(
            self,
            ADL2_Display_PowerXpressActiveGPU_Set(adapter, gpu.raw(), &mut result)
        )?;
        let result = match result {
            ADL_DL_POWERXPRESS_SWITCH_RESULT_STARTED => SwitchResult::Started,
            ADL_DL_POWERXPRESS_SWITCH_RESULT_ALREADY => SwitchResult::AlreadyActive,
            _ => SwitchResult::Declined,
        };
        log::info!("Switch to {} GPU: {:?}", gpu, result);
        Ok(result)
    }

    /// Automatic switching on power events
    pub fn auto_switch_config(&self, adapter: i32) -> AdlResult<AutoSwitchConfig> {
        let (mut ac_dc, mut dc_ac): (c_int, c_int) = (0, 0);
        adl_call!(
            self,
            ADL2_Display_PowerXpress_AutoSwitchConfig_Get(adapter, &mut ac_dc, &mut dc_ac)
        )?;
        Ok(AutoSwitchConfig {
            on_ac_to_dc: ac_dc != 0,
            on_dc_to_ac: dc_ac != 0,
        })
    }

    /// Change automatic switching
    pub fn set_auto_switch_config(&self, adapter: i32, config: AutoSwitchConfig) -> AdlResult<()> {
        adl_call!(
            self,
            ADL2_Display_PowerXpress_AutoSwitchConfig_Set(
                adapter,
                config.on_ac_to_dc as c_int,
                config.on_dc_to_ac as c_int
            )
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fake_adl;
    use rstest::rstest;
    use std::cell::Cell;

    thread_local! {
        static REQUESTED: Cell<c_int> = const { Cell::new(0) };
    }

    unsafe extern "C" fn version(_: ADL_CONTEXT_HANDLE, _: c_int, v: *mut c_int) -> c_int {
        *v = (5 << 16) | 2;
        0
    }

    unsafe extern "C" fn discrete(_: ADL_CONTEXT_HANDLE, _: c_int, gpu: *mut c_int) -> c_int {
        *gpu = ADL_DL_POWERXPRESS_GPU_DISCRETE;
        0
    }

    unsafe extern "C" fn switch(_: ADL_CONTEXT_HANDLE, _: c_int, gpu: c_int, result: *mut c_int) -> c_int {
        REQUESTED.with(|r| r.set(gpu));
        *result = if gpu == ADL_DL_POWERXPRESS_GPU_DISCRETE {
            ADL_DL_POWERXPRESS_SWITCH_RESULT_ALREADY
        } else {
            ADL_DL_POWERXPRESS_SWITCH_RESULT_DECLINED
        };
        0
    }

    fn adl() -> Adl {
        fake_adl(AdlFunctions {
            ADL2_Display_PowerXpressVersion_Get: Some(version),
            ADL2_Display_PowerXpressActiveGPU_Get: Some(discrete),
            ADL2_Display_PowerXpressActiveGPU_Set: Some(switch),
            ..Default::default()
        })
    }

    #[test]
    fn version_is_unpacked() {
        assert_eq!(adl().powerxpress_version(0).unwrap().to_string(), "5.2");
    }

    #[test]
    fn switch_results() {
        let adl = adl();
        assert_eq!(adl.active_gpu(0).unwrap(), PxGpu::Discrete);
        assert_eq!(adl.set_active_gpu(0, PxGpu::Discrete).unwrap(), SwitchResult::AlreadyActive);
        assert_eq!(adl.set_active_gpu(0, PxGpu::Integrated).unwrap(), SwitchResult::Declined);
        assert_eq!(REQUESTED.with(Cell::get), ADL_DL_POWERXPRESS_GPU_INTEGRATED);
    }

    #[rstest]
    #[case("integrated", PxGpu::Integrated)]
    #[case("dGPU", PxGpu::Discrete)]
    fn parses_gpu_names(#[case] input: &str, #[case] gpu: PxGpu) {
        assert_eq!(input.parse::<PxGpu>().unwrap(), gpu);
    }

    #[test]
    fn rejects_unknown_gpu_names() {
        assert!("external".parse::<PxGpu>().is_err());
    }
}
