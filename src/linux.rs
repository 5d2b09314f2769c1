//! Linux-specific screen, memory and display queries
//!
//! The entry points are resolved on every platform; drivers that lack them
//! report [`crate::AdlError::SymbolNotFound`].

use std::os::raw::{c_char, c_int};

use serde::{Deserialize, Serialize};

use crate::adapter::MemoryInfo;
use crate::context::{adl_call, c_buf_to_string, Adl};
use crate::controller::{Gamma, GammaRange};
use crate::error::AdlResult;
use crate::ffi::*;
use crate::mappings::desktop_config_name;

/// X desktop layout of an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DesktopConfig {
    /// One display
    Single,
    /// Every display shows the same desktop
    Clone,
    /// One desktop spanning displays left to right
    BigDesktopHorizontal,
    /// One desktop spanning displays top to bottom
    BigDesktopVertical,
    /// Horizontal span, reversed
    BigDesktopHorizontalReversed,
    /// Vertical span, reversed
    BigDesktopVerticalReversed,
    /// Independent screens managed through RandR 1.2
    Independent,
    /// Value not known to this crate
    Unknown(i32),
}

impl DesktopConfig {
    /// Raw `ADL_DESKTOPCONFIG_*` value
    pub fn raw(self) -> i32 {
        match self {
            DesktopConfig::Single => ADL_DESKTOPCONFIG_SINGLE,
            DesktopConfig::Clone => ADL_DESKTOPCONFIG_CLONE,
            DesktopConfig::BigDesktopHorizontal => ADL_DESKTOPCONFIG_BIGDESK_H,
            DesktopConfig::BigDesktopVertical => ADL_DESKTOPCONFIG_BIGDESK_V,
            DesktopConfig::BigDesktopHorizontalReversed => ADL_DESKTOPCONFIG_BIGDESK_HR,
            DesktopConfig::BigDesktopVerticalReversed => ADL_DESKTOPCONFIG_BIGDESK_VR,
            DesktopConfig::Independent => ADL_DESKTOPCONFIG_RANDR12,
            DesktopConfig::Unknown(raw) => raw,
        }
    }
}

impl From<c_int> for DesktopConfig {
    fn from(raw: c_int) -> Self {
        match raw {
            ADL_DESKTOPCONFIG_SINGLE => DesktopConfig::Single,
            ADL_DESKTOPCONFIG_CLONE => DesktopConfig::Clone,
            ADL_DESKTOPCONFIG_BIGDESK_H => DesktopConfig::BigDesktopHorizontal,
            ADL_DESKTOPCONFIG_BIGDESK_V => DesktopConfig::BigDesktopVertical,
            ADL_DESKTOPCONFIG_BIGDESK_HR => DesktopConfig::BigDesktopHorizontalReversed,
            ADL_DESKTOPCONFIG_BIGDESK_VR => DesktopConfig::BigDesktopVerticalReversed,
            ADL_DESKTOPCONFIG_RANDR12 => DesktopConfig::Independent,
            other => DesktopConfig::Unknown(other),
        }
    }
}

impl std::fmt::Display for DesktopConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(desktop_config_name(self.raw()))
    }
}

/// Tear-free desktop state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TearFree {
    /// Driver default
    pub default: bool,
    /// Last requested value
    pub requested: bool,
    /// Driver status code for the current state
    pub status: i32,
}

impl Adl {
    /// Size, type and bandwidth of adapter memory
    pub fn basic_memory_info(&self, adapter: i32) -> AdlResult<MemoryInfo> {
        let mut info = ADLMemoryInfo::default();
        adl_call!(self, ADL2_Adapter_MemoryInfo_Get(adapter, &mut info))?;
        Ok(MemoryInfo {
            size_bytes: info.iMemorySize,
            memory_type: c_buf_to_string(&info.strMemoryType),
            bandwidth_mbps: info.iMemoryBandwidth,
            hyper_memory_bytes: None,
            invisible_bytes: None,
            visible_bytes: None,
        })
    }

    /// XRandR output name of a display, e.g. `DisplayPort-0`
    pub fn xrandr_display_name(&self, adapter: i32, display: i32) -> AdlResult<String> {
        let mut buf = [0 as c_char; ADL_MAX_PATH];
        adl_call!(
            self,
            ADL2_Display_XrandrDisplayName_Get(adapter, display, buf.as_mut_ptr(), buf.len() as c_int)
        )?;
        Ok(c_buf_to_string(&buf))
    }

    /// Number of enabled displays on an adapter
    pub fn enabled_display_count(&self, adapter: i32) -> AdlResult<i32> {
        let mut count: c_int = 0;
        adl_call!(self, ADL2_NumberOfDisplayEnable_Get(adapter, &mut count))?;
        Ok(count)
    }

    /// Current X desktop layout
    pub fn desktop_config(&self, adapter: i32) -> AdlResult<DesktopConfig> {
        let mut raw: c_int = ADL_DESKTOPCONFIG_UNKNOWN;
        adl_call!(self, ADL2_DesktopConfig_Get(adapter, &mut raw))?;
        Ok(raw.into())
    }

    /// Change the desktop layout; takes effect after the X server restarts
    pub fn set_desktop_config(&self, adapter: i32, config: DesktopConfig) -> AdlResult<()> {
        let status = adl_call!(self, ADL2_DesktopConfig_Set(adapter, config.raw()))?;
        if status.needs_attention() {
            log::warn!("Desktop configuration change pending: {}", status);
        }
        Ok(())
    }

    /// Tear-free default, request and status
    pub fn tear_free(&self, adapter: i32) -> AdlResult<TearFree> {
        let (mut default, mut requested, mut status): (c_int, c_int, c_int) = (0, 0, 0);
        adl_call!(
            self,
            ADL2_Adapter_Tear_Free_Get(adapter, &mut default, &mut requested, &mut status)
        )?;
        Ok(TearFree {
            default: default != 0,
            requested: requested != 0,
            status,
        })
    }

    /// Request tear-free on or off; returns the driver's status for the request
    pub fn set_tear_free(&self, adapter: i32, enabled: bool) -> AdlResult<i32> {
        let mut status: c_int = 0;
        adl_call!(
            self,
            ADL2_Adapter_Tear_Free_Set(adapter, enabled as c_int, &mut status)
        )?;
        Ok(status)
    }

    /// Gamma lookup table of a display
    pub fn lut_color(&self, adapter: i32, display: i32) -> AdlResult<GammaRange> {
        let mut current = ADLGamma::default();
        let mut default = ADLGamma::default();
        let mut min = ADLGamma::default();
        let mut max = ADLGamma::default();
        adl_call!(
            self,
            ADL2_Display_LUTColor_Get(adapter, display, &mut current, &mut default, &mut min, &mut max)
        )?;
        Ok(GammaRange {
            current: current.into(),
            default: default.into(),
            min: min.into(),
            max: max.into(),
        })
    }

    /// Set a display's gamma lookup table, checked against the driver's limits
    pub fn set_lut_color(&self, adapter: i32, display: i32, gamma: Gamma) -> AdlResult<()> {
        self.lut_color(adapter, display)?.validate(&gamma)?;
        adl_call!(self, ADL2_Display_LUTColor_Set(adapter, display, gamma.into()))?;
        Ok(())
    }
}
