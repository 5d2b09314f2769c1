//! Workstation features: ECC, SDI, stereo and GL-Sync / Genlock

use std::os::raw::c_int;

use serde::{Deserialize, Serialize};

use crate::context::{adl_call, Adl};
use crate::error::{AdlError, AdlResult};
use crate::ffi::*;
use crate::mappings::ecc_mode_name;

/// Workstation capability bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkstationCaps {
    /// Bits the driver filled in
    pub valid: i32,
    /// Capability bits
    pub caps: i32,
}

impl WorkstationCaps {
    /// Whether a valid capability bit is set
    pub fn has(&self, bit: i32) -> bool {
        self.valid & self.caps & bit != 0
    }
}

/// ECC memory mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EccMode {
    /// ECC disabled
    Off,
    /// ECC enabled
    On,
    /// ECC enabled on HBM
    HbmOn,
    /// Value not known to this crate
    Unknown(i32),
}

impl EccMode {
    /// Raw `ECC_MODE_*` value
    pub fn raw(self) -> i32 {
        match self {
            EccMode::Off => ECC_MODE_OFF,
            EccMode::On => ECC_MODE_ON,
            EccMode::HbmOn => ECC_MODE_HBM_ON,
            EccMode::Unknown(raw) => raw,
        }
    }
}

impl From<c_int> for EccMode {
    fn from(raw: c_int) -> Self {
        match raw {
            ECC_MODE_OFF => EccMode::Off,
            ECC_MODE_ON => EccMode::On,
            ECC_MODE_HBM_ON => EccMode::HbmOn,
            other => EccMode::Unknown(other),
        }
    }
}

impl std::fmt::Display for EccMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(ecc_mode_name(self.raw()))
    }
}

/// ECC default, current and pending modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EccState {
    /// Driver default
    pub default: EccMode,
    /// Mode in effect
    pub current: EccMode,
    /// Mode applied after the next reboot
    pub desired: EccMode,
}

impl EccState {
    /// A mode change is waiting for a reboot
    pub fn is_pending(&self) -> bool {
        self.current != self.desired
    }
}

/// ECC error counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EccData {
    /// Corrected single-bit errors
    pub single_bit_errors: i32,
    /// Detected double-bit errors
    pub double_bit_errors: i32,
}

/// Stereo 3D default and current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StereoState {
    /// Driver default
    pub default: i32,
    /// Current state
    pub current: i32,
}

/// GL-Sync module attached to a connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlSyncModule {
    /// Module id, zero when nothing is attached
    pub module_id: i32,
    /// GPU port the module is connected to
    pub gpu_port: i32,
    /// Boot sector firmware version
    pub firmware_boot_version: i32,
    /// User sector firmware version
    pub firmware_user_version: i32,
}

impl GlSyncModule {
    /// A module answered on the connector
    pub fn is_present(&self) -> bool {
        self.module_id != 0
    }
}

impl From<ADLGLSyncModuleID> for GlSyncModule {
    fn from(raw: ADLGLSyncModuleID) -> Self {
        Self {
            module_id: raw.iModuleID,
            gpu_port: raw.iGlSyncGPUPort,
            firmware_boot_version: raw.iFWBootSectorVersion,
            firmware_user_version: raw.iFWUserSectorVersion,
        }
    }
}

/// GL-Sync mode of a display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlSyncMode {
    /// Requested sync controls
    pub control: i32,
    /// Sync status bits
    pub status: i32,
    /// GL-Sync connector the display follows
    pub connector: i32,
}

/// Genlock configuration of a GL-Sync connector
///
/// Only the fields selected by `valid_mask` (`ADL_GLSYNC_CONFIGMASK_*`) are
/// read from or written to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenlockConfig {
    /// Fields that carry values
    pub valid_mask: i32,
    /// Sync delay
    pub sync_delay: i32,
    /// Framelock control vector
    pub framelock_control: i32,
    /// Signal source
    pub signal_source: i32,
    /// Sample rate
    pub sample_rate: i32,
    /// Sync field
    pub sync_field: i32,
    /// Trigger edge
    pub trigger_edge: i32,
    /// Scan rate coefficient
    pub scan_rate_coeff: i32,
}

impl From<ADLGLSyncGenlockConfig> for GenlockConfig {
    fn from(raw: ADLGLSyncGenlockConfig) -> Self {
        Self {
            valid_mask: raw.iValidMask,
            sync_delay: raw.iSyncDelay,
            framelock_control: raw.iFramelockCntlVector,
            signal_source: raw.iSignalSource,
            sample_rate: raw.iSampleRate,
            sync_field: raw.iSyncField,
            trigger_edge: raw.iTriggerEdge,
            scan_rate_coeff: raw.iScanRateCoeff,
        }
    }
}

impl From<GenlockConfig> for ADLGLSyncGenlockConfig {
    fn from(config: GenlockConfig) -> Self {
        Self {
            iValidMask: config.valid_mask,
            iSyncDelay: config.sync_delay,
            iFramelockCntlVector: config.framelock_control,
            iSignalSource: config.signal_source,
            iSampleRate: config.sample_rate,
            iSyncField: config.sync_field,
            iTriggerEdge: config.trigger_edge,
            iScanRateCoeff: config.scan_rate_coeff,
        }
    }
}

const GENLOCK_ALL_FIELDS: i32 = ADL_GLSYNC_CONFIGMASK_SIGNALSOURCE
    | ADL_GLSYNC_CONFIGMASK_SYNCFIELD
    | ADL_GLSYNC_CONFIGMASK_SAMPLERATE
    | ADL_GLSYNC_CONFIGMASK_SYNCDELAY
    | ADL_GLSYNC_CONFIGMASK_TRIGGEREDGE
    | ADL_GLSYNC_CONFIGMASK_SCANRATECOEFF
    | ADL_GLSYNC_CONFIGMASK_FRAMELOCKCNTL;

fn check_genlock_mask(mask: i32) -> AdlResult<()> {
    if mask == ADL_GLSYNC_CONFIGMASK_NONE || mask & !GENLOCK_ALL_FIELDS != 0 {
        return Err(AdlError::InvalidParameter(format!("genlock mask {mask:#x}")));
    }
    Ok(())
}

impl Adl {
    /// Workstation capability bits
    pub fn workstation_caps(&self, adapter: i32) -> AdlResult<WorkstationCaps> {
        let (mut valid, mut caps): (c_int, c_int) = (0, 0);
        adl_call!(self, ADL2_Workstation_Caps(adapter, &mut valid, &mut caps))?;
        Ok(WorkstationCaps { valid, caps })
    }

    /// Whether the adapter has ECC memory
    pub fn ecc_supported(&self, adapter: i32) -> AdlResult<bool> {
        let mut supported: c_int = 0;
        adl_call!(self, ADL2_Workstation_ECC_Caps(adapter, &mut supported))?;
        Ok(supported != 0)
    }

    /// ECC modes
    pub fn ecc_state(&self, adapter: i32) -> AdlResult<EccState> {
        let (mut default, mut current, mut desired): (c_int, c_int, c_int) = (0, 0, 0);
        adl_call!(
            self,
            ADL2_Workstation_ECC_Get(adapter, &mut default, &mut current, &mut desired)
        )?;
        Ok(EccState {
            default: default.into(),
            current: current.into(),
            desired: desired.into(),
        })
    }

    /// Request an ECC mode; applied after a reboot
    pub fn set_ecc_mode(&self, adapter: i32, mode: EccMode) -> AdlResult<()> {
        adl_call!(self, ADL2_Workstation_ECC_Set(adapter, mode.raw()))?;
        log::info!("Adapter {} ECC set to {} (reboot required)", adapter, mode);
        Ok(())
    }

    /// ECC error counters
    pub fn ecc_data(&self, adapter: i32) -> AdlResult<EccData> {
        let mut raw = ADLECCData::default();
        adl_call!(self, ADL2_Workstation_ECCData_Get(adapter, &mut raw))?;
        Ok(EccData {
            single_bit_errors: raw.iSec,
            double_bit_errors: raw.iDed,
        })
    }

    /// Whether the adapter supports SDI
    pub fn sdi_supported(&self, adapter: i32) -> AdlResult<bool> {
        let mut supported: c_int = 0;
        adl_call!(self, ADL2_Workstation_SDI_Caps(adapter, &mut supported))?;
        Ok(supported != 0)
    }

    /// Stereo 3D state
    pub fn stereo(&self, adapter: i32) -> AdlResult<StereoState> {
        let (mut default, mut current): (c_int, c_int) = (0, 0);
        adl_call!(self, ADL2_Workstation_Stereo_Get(adapter, &mut default, &mut current))?;
        Ok(StereoState { default, current })
    }

    /// Set the stereo 3D state
    pub fn set_stereo(&self, adapter: i32, state: i32) -> AdlResult<()> {
        adl_call!(self, ADL2_Workstation_Stereo_Set(adapter, state))?;
        Ok(())
    }

    /// Number of GL-Sync connectors on the adapter
    pub fn glsync_connector_count(&self, adapter: i32) -> AdlResult<i32> {
        let mut count: c_int = 0;
        adl_call!(
            self,
            ADL2_Workstation_AdapterNumOfGLSyncConnectors_Get(adapter, &mut count)
        )?;
        Ok(count)
    }

    /// Module attached to a GL-Sync connector
    pub fn glsync_module(&self, adapter: i32, connector: i32) -> AdlResult<GlSyncModule> {
        let mut raw = ADLGLSyncModuleID::default();
        adl_call!(
            self,
            ADL2_Workstation_GLSyncModuleDetect_Get(adapter, connector, &mut raw)
        )?;
        Ok(raw.into())
    }

    /// Whether a display can be genlocked
    pub fn display_genlock_capable(&self, adapter: i32, display: i32) -> AdlResult<bool> {
        let mut capable: c_int = 0;
        adl_call!(
            self,
            ADL2_Workstation_DisplayGenlockCapable_Get(adapter, display, &mut capable)
        )?;
        Ok(capable != 0)
    }

    /// GL-Sync mode of a display
    pub fn display_glsync_mode(&self, adapter: i32, display: i32) -> AdlResult<GlSyncMode> {
        let mut raw = ADLGlSyncMode::default();
        adl_call!(self, ADL2_Workstation_DisplayGLSyncMode_Get(adapter, display, &mut raw))?;
        Ok(GlSyncMode {
            control: raw.iControlVector,
            status: raw.iStatusVector,
            connector: raw.iGLSyncConnectorIndex,
        })
    }

    /// Genlock configuration fields selected by `mask`
    pub fn genlock_config(&self, adapter: i32, connector: i32, mask: i32) -> AdlResult<GenlockConfig> {
        check_genlock_mask(mask)?;
        let mut raw = ADLGLSyncGenlockConfig {
            iValidMask: mask,
            ..Default::default()
        };
        adl_call!(
            self,
            ADL2_Workstation_GLSyncGenlockConfiguration_Get(adapter, connector, mask, &mut raw)
        )?;
        Ok(raw.into())
    }

    /// Write the genlock fields selected by `config.valid_mask`
    pub fn set_genlock_config(&self, adapter: i32, connector: i32, config: GenlockConfig) -> AdlResult<()> {
        check_genlock_mask(config.valid_mask)?;
        adl_call!(
            self,
            ADL2_Workstation_GLSyncGenlockConfiguration_Set(adapter, connector, config.into())
        )?;
        Ok(())
    }
}
