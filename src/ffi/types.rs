//! `#[repr(C)]` mirrors of the vendor structures used by the bound entry points
//!
//! Field order and widths follow `adl_structures.h`. Field names keep the
//! vendor spelling so they can be matched against the SDK documentation.

#![allow(non_snake_case)]
#![allow(non_camel_case_types)]

use std::os::raw::{c_char, c_int, c_longlong, c_void};

/// `ADL_MAX_PATH`, the size of every fixed string buffer in ADL structures
pub const ADL_MAX_PATH: usize = 256;

/// `ADL_PMLOG_MAX_SENSORS`
pub const ADL_PMLOG_MAX_SENSORS: usize = 256;

/// Opaque per-client context issued by `ADL2_Main_Control_Create`
pub type ADL_CONTEXT_HANDLE = *mut c_void;

/// Allocation callback the driver uses for output buffers
pub type ADL_MAIN_MALLOC_CALLBACK = Option<unsafe extern "C" fn(size: c_int) -> *mut c_void>;

/// Kernel-mode device handle used by the PMLog entry points
pub type ADL_D3DKMT_HANDLE = u32;

/// `ADLThreadingModel`
pub type ADLThreadingModel = c_int;

/// `ADL_RADEON_USB_LED_BAR_CONTROLS`
pub type ADL_RADEON_USB_LED_BAR_CONTROLS = c_int;

/// Placeholder for the undocumented X screen info structure
#[repr(C)]
pub struct XScreenInfo {
    _private: [u8; 0],
}

/// `LPXScreenInfo`
pub type LPXScreenInfo = *mut XScreenInfo;

/// `AdapterInfo`
#[repr(C)]
#[derive(Clone, Copy)]
pub struct AdapterInfo {
    pub iSize: c_int,
    pub iAdapterIndex: c_int,
    pub strUDID: [c_char; ADL_MAX_PATH],
    pub iBusNumber: c_int,
    pub iDeviceNumber: c_int,
    pub iFunctionNumber: c_int,
    pub iVendorID: c_int,
    pub strAdapterName: [c_char; ADL_MAX_PATH],
    pub strDisplayName: [c_char; ADL_MAX_PATH],
    pub iPresent: c_int,
    #[cfg(windows)]
    pub iExist: c_int,
    #[cfg(windows)]
    pub strDriverPath: [c_char; ADL_MAX_PATH],
    #[cfg(windows)]
    pub strDriverPathExt: [c_char; ADL_MAX_PATH],
    #[cfg(windows)]
    pub strPNPString: [c_char; ADL_MAX_PATH],
    #[cfg(windows)]
    pub iOSDisplayIndex: c_int,
    #[cfg(not(windows))]
    pub iXScreenNum: c_int,
    #[cfg(not(windows))]
    pub iDrvIndex: c_int,
    #[cfg(not(windows))]
    pub strXScreenConfigName: [c_char; ADL_MAX_PATH],
}

/// `LPAdapterInfo`
pub type LPAdapterInfo = *mut AdapterInfo;

/// `ADLAdapterCaps`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct ADLAdapterCaps {
    pub iAdapterID: c_int,
    pub iNumControllers: c_int,
    pub iNumDisplays: c_int,
    pub iNumOverlays: c_int,
    pub iNumOfGLSyncConnectors: c_int,
    pub iCapsMask: c_int,
    pub iCapsValue: c_int,
}

/// `ADLBiosInfo`
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ADLBiosInfo {
    pub strPartNumber: [c_char; ADL_MAX_PATH],
    pub strVersion: [c_char; ADL_MAX_PATH],
    pub strDate: [c_char; ADL_MAX_PATH],
}

/// `ADLMemoryInfo`
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ADLMemoryInfo {
    pub iMemorySize: c_longlong,
    pub strMemoryType: [c_char; ADL_MAX_PATH],
    pub iMemoryBandwidth: c_longlong,
}

/// `ADLMemoryInfo2`
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ADLMemoryInfo2 {
    pub iMemorySize: c_longlong,
    pub strMemoryType: [c_char; ADL_MAX_PATH],
    pub iMemoryBandwidth: c_longlong,
    pub iHyperMemorySize: c_longlong,
    pub iInvisibleMemorySize: c_longlong,
    pub iVisibleMemorySize: c_longlong,
}

/// `ADLGamma`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ADLGamma {
    pub fRed: f32,
    pub fGreen: f32,
    pub fBlue: f32,
}

/// `ADLVersionsInfo`
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ADLVersionsInfo {
    pub strDriverVer: [c_char; ADL_MAX_PATH],
    pub strCatalystVersion: [c_char; ADL_MAX_PATH],
    pub strCatalystWebLink: [c_char; ADL_MAX_PATH],
}

/// `ADLVersionsInfoX2`
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ADLVersionsInfoX2 {
    pub strDriverVer: [c_char; ADL_MAX_PATH],
    pub strCatalystVersion: [c_char; ADL_MAX_PATH],
    pub strCrimsonVersion: [c_char; ADL_MAX_PATH],
    pub strCatalystWebLink: [c_char; ADL_MAX_PATH],
}

/// `ADLGraphicCoreInfo`
///
/// The second and third fields are unions in the SDK (`iNumCUs`/`iNumWGPs`,
/// `iNumPEsPerCU`/`iNumPEsPerWGP`); which member applies depends on `iGCGen`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct ADLGraphicCoreInfo {
    pub iGCGen: c_int,
    pub iNumCUs: c_int,
    pub iNumPEsPerCU: c_int,
    pub iNumSIMDs: c_int,
    pub iNumROPs: c_int,
    pub iReserved: [c_int; 11],
}

/// `ADLDisplayID`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ADLDisplayID {
    pub iDisplayLogicalIndex: c_int,
    pub iDisplayPhysicalIndex: c_int,
    pub iDisplayLogicalAdapterIndex: c_int,
    pub iDisplayPhysicalAdapterIndex: c_int,
}

/// `ADLDisplayTarget`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ADLDisplayTarget {
    pub displayID: ADLDisplayID,
    pub iDisplayMapIndex: c_int,
    pub iDisplayTargetMask: c_int,
    pub iDisplayTargetValue: c_int,
}

/// `ADLMode`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ADLMode {
    pub iAdapterIndex: c_int,
    pub displayID: ADLDisplayID,
    pub iXPos: c_int,
    pub iYPos: c_int,
    pub iXRes: c_int,
    pub iYRes: c_int,
    pub iColourDepth: c_int,
    pub fRefreshRate: f32,
    pub iOrientation: c_int,
    pub iModeFlag: c_int,
    pub iModeMask: c_int,
    pub iModeValue: c_int,
}

/// `ADLDisplayMap`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ADLDisplayMap {
    pub iDisplayMapIndex: c_int,
    pub displayMode: ADLMode,
    pub iNumDisplayTarget: c_int,
    pub iFirstDisplayTargetArrayIndex: c_int,
    pub iDisplayMapMask: c_int,
    pub iDisplayMapValue: c_int,
}

/// `ADLSLSGrid`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ADLSLSGrid {
    pub iAdapterIndex: c_int,
    pub iSLSGridIndex: c_int,
    pub iSLSGridRow: c_int,
    pub iSLSGridColumn: c_int,
    pub iSLSGridMask: c_int,
    pub iSLSGridValue: c_int,
}

/// `ADLSLSMap`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ADLSLSMap {
    pub iAdapterIndex: c_int,
    pub iSLSMapIndex: c_int,
    pub grid: ADLSLSGrid,
    pub iSurfaceMapIndex: c_int,
    pub iOrientation: c_int,
    pub iNumSLSTarget: c_int,
    pub iFirstSLSTargetArrayIndex: c_int,
    pub iNumNativeMode: c_int,
    pub iFirstNativeModeArrayIndex: c_int,
    pub iNumBezelMode: c_int,
    pub iFirstBezelModeArrayIndex: c_int,
    pub iNumBezelOffset: c_int,
    pub iFirstBezelOffsetArrayIndex: c_int,
    pub iSLSMapMask: c_int,
    pub iSLSMapValue: c_int,
}

/// `ADLSLSTarget`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ADLSLSTarget {
    pub iAdapterIndex: c_int,
    pub iSLSMapIndex: c_int,
    pub displayTarget: ADLDisplayTarget,
    pub iSLSGridPositionX: c_int,
    pub iSLSGridPositionY: c_int,
    pub viewSize: ADLMode,
    pub iSLSTargetMask: c_int,
    pub iSLSTargetValue: c_int,
}

/// `ADLSLSMode`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ADLSLSMode {
    pub iAdapterIndex: c_int,
    pub iSLSMapIndex: c_int,
    pub iSLSModeIndex: c_int,
    pub displayMode: ADLMode,
    pub iSLSNativeModeMask: c_int,
    pub iSLSNativeModeValue: c_int,
}

/// `ADLBezelTransientMode`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ADLBezelTransientMode {
    pub iAdapterIndex: c_int,
    pub iSLSMapIndex: c_int,
    pub iSLSModeIndex: c_int,
    pub displayMode: ADLMode,
    pub iNumBezelOffset: c_int,
    pub iFirstBezelOffsetArrayIndex: c_int,
    pub iSLSBezelTransientModeMask: c_int,
    pub iSLSBezelTransientModeValue: c_int,
}

/// `ADLSLSOffset`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ADLSLSOffset {
    pub iAdapterIndex: c_int,
    pub iSLSMapIndex: c_int,
    pub displayID: ADLDisplayID,
    pub iBezelModeIndex: c_int,
    pub iBezelOffsetX: c_int,
    pub iBezelOffsetY: c_int,
    pub iDisplayWidth: c_int,
    pub iDisplayHeight: c_int,
    pub iBezelOffsetMask: c_int,
    pub iBezelffsetValue: c_int,
}

/// `ADLODNParameterRange`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ADLODNParameterRange {
    pub iMode: c_int,
    pub iMin: c_int,
    pub iMax: c_int,
    pub iStep: c_int,
    pub iDefault: c_int,
}

/// `ADLODNCapabilities`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct ADLODNCapabilities {
    pub iMaximumNumberOfPerformanceLevels: c_int,
    pub sEngineClockRange: ADLODNParameterRange,
    pub sMemoryClockRange: ADLODNParameterRange,
    pub svddcRange: ADLODNParameterRange,
    pub power: ADLODNParameterRange,
    pub powerTuneTemperature: ADLODNParameterRange,
    pub fanTemperature: ADLODNParameterRange,
    pub fanSpeed: ADLODNParameterRange,
    pub minimumPerformanceClock: ADLODNParameterRange,
}

/// `ADLODNPerformanceLevel`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ADLODNPerformanceLevel {
    pub iClock: c_int,
    pub iVddc: c_int,
    pub iEnabled: c_int,
}

/// `ADLODNPerformanceLevels`
///
/// `aLevels` is a C flexible array declared with one element; the real
/// allocation holds `iNumberOfPerformanceLevels` entries.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct ADLODNPerformanceLevels {
    pub iSize: c_int,
    pub iMode: c_int,
    pub iNumberOfPerformanceLevels: c_int,
    pub aLevels: [ADLODNPerformanceLevel; 1],
}

/// `ADLODNFanControl`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ADLODNFanControl {
    pub iMode: c_int,
    pub iFanControlMode: c_int,
    pub iCurrentFanSpeedMode: c_int,
    pub iCurrentFanSpeed: c_int,
    pub iTargetFanSpeed: c_int,
    pub iTargetTemperature: c_int,
    pub iMinPerformanceClock: c_int,
    pub iMinFanLimit: c_int,
}

/// `ADLODNPowerLimitSetting`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ADLODNPowerLimitSetting {
    pub iMode: c_int,
    pub iTDPLimit: c_int,
    pub iMaxOperatingTemperature: c_int,
}

/// `ADLODNPerformanceStatus`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct ADLODNPerformanceStatus {
    pub iCoreClock: c_int,
    pub iMemoryClock: c_int,
    pub iDCEFClock: c_int,
    pub iGFXClock: c_int,
    pub iUVDClock: c_int,
    pub iVCEClock: c_int,
    pub iGPUActivityPercent: c_int,
    pub iCurrentCorePerformanceLevel: c_int,
    pub iCurrentMemoryPerformanceLevel: c_int,
    pub iCurrentDCEFPerformanceLevel: c_int,
    pub iCurrentGFXPerformanceLevel: c_int,
    pub iUVDPerformanceLevel: c_int,
    pub iVCEPerformanceLevel: c_int,
    pub iCurrentBusSpeed: c_int,
    pub iCurrentBusLanes: c_int,
    pub iMaximumBusLanes: c_int,
    pub iVDDC: c_int,
    pub iVDDCI: c_int,
}

/// `ADLSingleSensorData`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ADLSingleSensorData {
    pub supported: c_int,
    pub value: c_int,
}

/// `ADLPMLogDataOutput`
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ADLPMLogDataOutput {
    pub size: c_int,
    pub sensors: [ADLSingleSensorData; ADL_PMLOG_MAX_SENSORS],
}

impl Default for ADLPMLogDataOutput {
    fn default() -> Self {
        Self {
            size: std::mem::size_of::<Self>() as c_int,
            sensors: [ADLSingleSensorData::default(); ADL_PMLOG_MAX_SENSORS],
        }
    }
}

/// `RadeonLEDBARSupportedControl`, a bitfield union read as one word
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RadeonLEDBARSupportedControl {
    pub u32All: u32,
}

/// `RadeonLEDBARSupportedConfig`, a bitfield union read as one word
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RadeonLEDBARSupportedConfig {
    pub u32All: u32,
}

/// `ADLECCData`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ADLECCData {
    pub iSec: c_int,
    pub iDed: c_int,
}

/// `ADLGLSyncModuleID`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ADLGLSyncModuleID {
    pub iModuleID: c_int,
    pub iGlSyncGPUPort: c_int,
    pub iFWBootSectorVersion: c_int,
    pub iFWUserSectorVersion: c_int,
}

/// `ADLGlSyncMode`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ADLGlSyncMode {
    pub iControlVector: c_int,
    pub iStatusVector: c_int,
    pub iGLSyncConnectorIndex: c_int,
}

/// `ADLGLSyncGenlockConfig`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ADLGLSyncGenlockConfig {
    pub iValidMask: c_int,
    pub iSyncDelay: c_int,
    pub iFramelockCntlVector: c_int,
    pub iSignalSource: c_int,
    pub iSampleRate: c_int,
    pub iSyncField: c_int,
    pub iTriggerEdge: c_int,
    pub iScanRateCoeff: c_int,
}

/// `Default` for structures holding fixed-size string buffers, which the
/// standard derive does not cover for arrays of this length
macro_rules! zeroed_default {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Default for $ty {
                fn default() -> Self {
                    // SAFETY: only integer, float and `c_char` array fields; all-zero is valid.
                    unsafe { std::mem::zeroed() }
                }
            }
        )*
    };
}

zeroed_default!(
    AdapterInfo,
    ADLBiosInfo,
    ADLMemoryInfo,
    ADLMemoryInfo2,
    ADLVersionsInfo,
    ADLVersionsInfoX2,
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn layouts_match_the_sdk() {
        assert_eq!(size_of::<ADLDisplayID>(), 16);
        assert_eq!(size_of::<ADLDisplayTarget>(), 28);
        assert_eq!(size_of::<ADLMode>(), 60);
        assert_eq!(size_of::<ADLDisplayMap>(), 80);
        assert_eq!(size_of::<ADLODNParameterRange>(), 20);
        assert_eq!(size_of::<ADLODNCapabilities>(), 4 + 8 * 20);
        assert_eq!(size_of::<ADLODNPerformanceLevels>(), 24);
        assert_eq!(size_of::<ADLPMLogDataOutput>(), 4 + 256 * 8);
        assert_eq!(size_of::<ADLGraphicCoreInfo>(), 64);
        assert_eq!(size_of::<ADLVersionsInfoX2>(), 4 * ADL_MAX_PATH);
        assert_eq!(size_of::<ADLMemoryInfo>(), 8 + ADL_MAX_PATH + 8);
    }

    #[test]
    fn zeroed_defaults_are_empty_strings() {
        let info = AdapterInfo::default();
        assert_eq!(info.iAdapterIndex, 0);
        assert!(info.strAdapterName.iter().all(|&c| c == 0));
        assert!(ADLVersionsInfoX2::default().strCrimsonVersion.iter().all(|&c| c == 0));
    }

    #[test]
    fn pmlog_default_carries_its_size() {
        let out = ADLPMLogDataOutput::default();
        assert_eq!(out.size as usize, size_of::<ADLPMLogDataOutput>());
        assert!(out.sensors.iter().all(|s| s.supported == 0));
    }
}
