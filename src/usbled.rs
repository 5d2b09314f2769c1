//! Radeon USB LED bar

use std::os::raw::c_int;

use serde::{Deserialize, Serialize};

use crate::context::{adl_call, Adl};
use crate::error::{AdlError, AdlResult};
use crate::ffi::*;
use crate::mappings::led_control_name;

/// Bitmask of LED bar controls, bit `n` for control `n`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedControls(pub u32);

impl LedControls {
    /// Whether a `RadeonLEDBarControl_*` value is supported
    pub fn contains(&self, control: i32) -> bool {
        (0..RadeonLEDBarControl_MAX).contains(&control) && self.0 & (1 << control) != 0
    }

    /// Supported controls
    pub fn controls(&self) -> Vec<i32> {
        (0..RadeonLEDBarControl_MAX).filter(|&c| self.contains(c)).collect()
    }

    /// Names of the supported controls
    pub fn names(&self) -> Vec<&'static str> {
        self.controls().into_iter().map(led_control_name).collect()
    }
}

/// Configuration options a pattern accepts, as reported by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedPatternConfig {
    /// Control the options apply to
    pub control: i32,
    /// Raw option bits
    pub bits: u32,
}

impl Adl {
    /// Whether the adapter has a USB LED bar
    pub fn usb_led_supported(&self, adapter: i32) -> AdlResult<bool> {
        let mut supported = false;
        adl_call!(self, ADL2_Adapter_Radeon_USB_LED_Support_Get(adapter, &mut supported))?;
        Ok(supported)
    }

    /// Controls the LED bar supports
    pub fn usb_led_controls(&self, adapter: i32) -> AdlResult<LedControls> {
        let mut raw = RadeonLEDBARSupportedControl::default();
        adl_call!(
            self,
            ADL2_Adapter_Radeon_USB_LED_Supported_Controls_Get(adapter, &mut raw)
        )?;
        Ok(LedControls(raw.u32All))
    }

    /// Configuration options of one control
    pub fn usb_led_pattern_config(&self, adapter: i32, control: i32) -> AdlResult<LedPatternConfig> {
        if !(0..RadeonLEDBarControl_MAX).contains(&control) {
            return Err(AdlError::InvalidParameter(format!("LED control {control}")));
        }
        let mut raw = RadeonLEDBARSupportedConfig::default();
        adl_call!(
            self,
            ADL2_Adapter_Radeon_USB_LED_Pattern_Supported_Controls_Get(
                adapter,
                control as c_int,
                &mut raw
            )
        )?;
        Ok(LedPatternConfig {
            control,
            bits: raw.u32All,
        })
    }

    /// Persist the current LED configuration to the bar's flash
    pub fn save_usb_led(&self, adapter: i32) -> AdlResult<()> {
        adl_call!(self, ADL2_Adapter_Radeon_Usb_Led_Flash_Save(adapter))?;
        log::info!("Saved LED configuration of adapter {}", adapter);
        Ok(())
    }
}
