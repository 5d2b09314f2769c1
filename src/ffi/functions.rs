//! Function table for every bound ADL2 entry point
//!
//! Each symbol is declared once in [`adl_functions!`]; the macro produces a
//! struct with one optional function pointer per symbol, resolved by name at
//! load time.

#![allow(non_snake_case)]

use std::fmt;
use std::os::raw::{c_char, c_int, c_void};

use super::types::*;

macro_rules! adl_functions {
    ($(
        $(#[$meta:meta])*
        fn $name:ident($($arg:ident: $ty:ty),* $(,)?) -> $ret:ty;
    )*) => {
        /// Resolved ADL entry points; `None` when the loaded driver does not export the symbol
        #[derive(Clone, Copy, Default)]
        pub struct AdlFunctions {
            $(
                $(#[$meta])*
                pub $name: Option<unsafe extern "C" fn($($arg: $ty),*) -> $ret>,
            )*
        }

        impl AdlFunctions {
            /// Every symbol name in the table, in declaration order
            pub const NAMES: &'static [&'static str] = &[$(stringify!($name)),*];

            /// Resolve every symbol from an opened library
            ///
            /// # Safety
            ///
            /// `library` must be an ADL driver library whose exports match the
            /// signatures declared here, and it must outlive the returned table.
            pub unsafe fn load(library: &libloading::Library) -> Self {
                Self {
                    $(
                        $name: library
                            .get::<unsafe extern "C" fn($($arg: $ty),*) -> $ret>(
                                concat!(stringify!($name), "\0").as_bytes(),
                            )
                            .ok()
                            .map(|symbol| *symbol),
                    )*
                }
            }

            /// Names of the symbols that were found
            pub fn resolved_names(&self) -> Vec<&'static str> {
                let mut names = Vec::new();
                $(
                    if self.$name.is_some() {
                        names.push(stringify!($name));
                    }
                )*
                names
            }

            /// Whether `name` was found
            pub fn has(&self, name: &str) -> bool {
                self.resolved_names().iter().any(|resolved| *resolved == name)
            }
        }
    };
}

adl_functions! {
    // Main control
    fn ADL2_Main_Control_Create(callback: ADL_MAIN_MALLOC_CALLBACK, iEnumConnectedAdapters: c_int, context: *mut ADL_CONTEXT_HANDLE) -> c_int;
    fn ADL2_Main_ControlX2_Create(callback: ADL_MAIN_MALLOC_CALLBACK, iEnumConnectedAdapters: c_int, context: *mut ADL_CONTEXT_HANDLE, threadingModel: ADLThreadingModel) -> c_int;
    fn ADL2_Main_Control_Destroy(context: ADL_CONTEXT_HANDLE) -> c_int;
    fn ADL2_Main_Control_Refresh(context: ADL_CONTEXT_HANDLE) -> c_int;
    fn ADL2_Main_Control_GetProcAddress(context: ADL_CONTEXT_HANDLE, lpModule: *mut c_void, lpProcName: *mut c_char) -> *mut c_void;

    // Adapter
    fn ADL2_Adapter_NumberOfAdapters_Get(context: ADL_CONTEXT_HANDLE, lpNumAdapters: *mut c_int) -> c_int;
    fn ADL2_Adapter_AdapterInfo_Get(context: ADL_CONTEXT_HANDLE, lpInfo: LPAdapterInfo, iInputSize: c_int) -> c_int;
    fn ADL2_Adapter_Active_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpStatus: *mut c_int) -> c_int;
    fn ADL2_Adapter_ID_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpAdapterID: *mut c_int) -> c_int;
    fn ADL2_Adapter_Primary_Get(context: ADL_CONTEXT_HANDLE, lpPrimaryAdapterIndex: *mut c_int) -> c_int;
    fn ADL2_Adapter_ASICFamilyType_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpAsicTypes: *mut c_int, lpValids: *mut c_int) -> c_int;
    fn ADL2_Adapter_Caps(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, adapterCaps: *mut ADLAdapterCaps) -> c_int;
    fn ADL2_Adapter_VideoBiosInfo_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpBiosInfo: *mut ADLBiosInfo) -> c_int;
    fn ADL2_Adapter_MemoryInfo2_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpMemoryInfo2: *mut ADLMemoryInfo2) -> c_int;
    fn ADL2_Adapter_VRAMUsage_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iVRAMUsageInMB: *mut c_int) -> c_int;
    fn ADL2_Adapter_DedicatedVRAMUsage_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iVRAMUsageInMB: *mut c_int) -> c_int;
    fn ADL2_Adapter_ObservedClockInfo_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpCoreClock: *mut c_int, lpMemoryClock: *mut c_int) -> c_int;
    fn ADL2_Adapter_Accessibility_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpAccessibility: *mut c_int) -> c_int;

    // Controller
    fn ADL2_Controller_Color_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iControllerIndex: c_int, lpGammaCurrent: *mut ADLGamma, lpGammaDefault: *mut ADLGamma, lpGammaMin: *mut ADLGamma, lpGammaMax: *mut ADLGamma) -> c_int;
    fn ADL2_Controller_Color_Set(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iControllerIndex: c_int, adlGamma: ADLGamma) -> c_int;

    // Displays manager
    fn ADL2_Display_DisplayMapConfig_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpNumDisplayMap: *mut c_int, lppDisplayMap: *mut *mut ADLDisplayMap, lpNumDisplayTarget: *mut c_int, lppDisplayTarget: *mut *mut ADLDisplayTarget, iOptions: c_int) -> c_int;
    fn ADL2_Display_DisplayMapConfig_Set(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iNumDisplayMap: c_int, lpDisplayMap: *mut ADLDisplayMap, iNumDisplayTarget: c_int, lpDisplayTarget: *mut ADLDisplayTarget) -> c_int;
    fn ADL2_Display_Modes_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iDisplayIndex: c_int, lpNumModes: *mut c_int, lppModes: *mut *mut ADLMode) -> c_int;
    fn ADL2_Display_SLSMapIndexList_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpNumSLSMapIndexList: *mut c_int, lppSLSMapIndexList: *mut *mut c_int, iOptions: c_int) -> c_int;
    fn ADL2_Display_SLSMapConfig_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iSLSMapIndex: c_int, lpSLSMap: *mut ADLSLSMap, lpNumSLSTarget: *mut c_int, lppSLSTarget: *mut *mut ADLSLSTarget, lpNumNativeMode: *mut c_int, lppNativeMode: *mut *mut ADLSLSMode, lpNumBezelMode: *mut c_int, lppBezelMode: *mut *mut ADLBezelTransientMode, lpNumTransientMode: *mut c_int, lppTransientMode: *mut *mut ADLBezelTransientMode, lpNumSLSOffset: *mut c_int, lppSLSOffset: *mut *mut ADLSLSOffset, iOption: c_int) -> c_int;
    fn ADL2_Display_SLSMapConfig_SetState(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iSLSMapIndex: c_int, iState: c_int) -> c_int;
    fn ADL2_Display_SLSMapConfig_Delete(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iSLSMapIndex: c_int) -> c_int;
    fn ADL2_Adapter_Desktop_Caps(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpDesktopCapsValue: *mut c_int, lpDesktopCapsMask: *mut c_int) -> c_int;

    // Graphics
    fn ADL2_Graphics_Versions_Get(context: ADL_CONTEXT_HANDLE, lpVersionsInfo: *mut ADLVersionsInfo) -> c_int;
    fn ADL2_Graphics_VersionsX2_Get(context: ADL_CONTEXT_HANDLE, lpVersionsInfo: *mut ADLVersionsInfoX2) -> c_int;
    fn ADL2_Graphics_Platform_Get(context: ADL_CONTEXT_HANDLE, lpPlatForm: *mut c_int) -> c_int;
    fn ADL2_Adapter_Graphic_Core_Info_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, pGraphicCoreInfo: *mut ADLGraphicCoreInfo) -> c_int;
    fn ADL2_Driver_Path_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iSize: c_int, lpDriverPath: *mut c_char) -> c_int;

    // Linux
    fn ADL2_Adapter_MemoryInfo_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpMemoryInfo: *mut ADLMemoryInfo) -> c_int;
    fn ADL2_Adapter_XScreenInfo_Get(context: ADL_CONTEXT_HANDLE, lpXScreenInfo: LPXScreenInfo, iInputSize: c_int) -> c_int;
    fn ADL2_Display_XrandrDisplayName_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iDisplayIndex: c_int, lpXrandrDisplayName: *mut c_char, iBuffSize: c_int) -> c_int;
    fn ADL2_NumberOfDisplayEnable_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpNumberOfDisplays: *mut c_int) -> c_int;
    fn ADL2_DesktopConfig_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpDesktopConfig: *mut c_int) -> c_int;
    fn ADL2_DesktopConfig_Set(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iDesktopConfig: c_int) -> c_int;
    fn ADL2_Adapter_Tear_Free_Get(context: ADL_CONTEXT_HANDLE, iAdapter: c_int, pDefault: *mut c_int, pRequested: *mut c_int, pStatus: *mut c_int) -> c_int;
    fn ADL2_Adapter_Tear_Free_Set(context: ADL_CONTEXT_HANDLE, iAdapter: c_int, iRequested: c_int, pStatus: *mut c_int) -> c_int;
    fn ADL2_Display_LUTColor_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iDisplayIndex: c_int, lpGammaCurrent: *mut ADLGamma, lpGammaDefault: *mut ADLGamma, lpGammaMin: *mut ADLGamma, lpGammaMax: *mut ADLGamma) -> c_int;
    fn ADL2_Display_LUTColor_Set(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iDisplayIndex: c_int, adlGamma: ADLGamma) -> c_int;

    // Overdrive
    fn ADL2_Overdrive_Caps(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iSupported: *mut c_int, iEnabled: *mut c_int, iVersion: *mut c_int) -> c_int;
    fn ADL2_OverdriveN_Capabilities_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpODCapabilities: *mut ADLODNCapabilities) -> c_int;
    fn ADL2_OverdriveN_SystemClocks_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpODPerformanceLevels: *mut ADLODNPerformanceLevels) -> c_int;
    fn ADL2_OverdriveN_SystemClocks_Set(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpODPerformanceLevels: *mut ADLODNPerformanceLevels) -> c_int;
    fn ADL2_OverdriveN_MemoryClocks_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpODPerformanceLevels: *mut ADLODNPerformanceLevels) -> c_int;
    fn ADL2_OverdriveN_MemoryClocks_Set(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpODPerformanceLevels: *mut ADLODNPerformanceLevels) -> c_int;
    fn ADL2_OverdriveN_FanControl_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpODFanSpeed: *mut ADLODNFanControl) -> c_int;
    fn ADL2_OverdriveN_FanControl_Set(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpODFanControl: *mut ADLODNFanControl) -> c_int;
    fn ADL2_OverdriveN_PowerLimit_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpODPowerLimit: *mut ADLODNPowerLimitSetting) -> c_int;
    fn ADL2_OverdriveN_PowerLimit_Set(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpODPowerLimit: *mut ADLODNPowerLimitSetting) -> c_int;
    fn ADL2_OverdriveN_Temperature_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iTemperatureType: c_int, iTemperature: *mut c_int) -> c_int;
    fn ADL2_OverdriveN_PerformanceStatus_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpODPerformanceStatus: *mut ADLODNPerformanceStatus) -> c_int;
    fn ADL2_OverdriveN_ZeroRPMFan_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpSupport: *mut c_int, lpCurrentValue: *mut c_int, lpDefaultValue: *mut c_int) -> c_int;
    fn ADL2_OverdriveN_ZeroRPMFan_Set(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, currentValue: c_int) -> c_int;
    fn ADL2_New_QueryPMLogData_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpDataOutput: *mut ADLPMLogDataOutput) -> c_int;

    // PowerXpress
    fn ADL2_Display_PowerXpressVersion_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpVersion: *mut c_int) -> c_int;
    fn ADL2_Display_PowerXpressActiveGPU_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpActiveGPU: *mut c_int) -> c_int;
    fn ADL2_Display_PowerXpressActiveGPU_Set(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iActiveGPU: c_int, lpOperationResult: *mut c_int) -> c_int;
    fn ADL2_Display_PowerXpress_AutoSwitchConfig_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpAutoSwitchOnACDCEvent: *mut c_int, lpAutoSwitchOnDCACEvent: *mut c_int) -> c_int;
    fn ADL2_Display_PowerXpress_AutoSwitchConfig_Set(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iAutoSwitchOnACDCEvent: c_int, iAutoSwitchOnDCACEvent: c_int) -> c_int;

    // Radeon USB LED
    fn ADL2_Adapter_Radeon_USB_LED_Support_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, bLEDSupported: *mut bool) -> c_int;
    fn ADL2_Adapter_Radeon_USB_LED_Supported_Controls_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, ControlSupport: *mut RadeonLEDBARSupportedControl) -> c_int;
    fn ADL2_Adapter_Radeon_USB_LED_Pattern_Supported_Controls_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, control: ADL_RADEON_USB_LED_BAR_CONTROLS, ConfigSupport: *mut RadeonLEDBARSupportedConfig) -> c_int;
    fn ADL2_Adapter_Radeon_Usb_Led_Flash_Save(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int) -> c_int;

    // Workstation
    fn ADL2_Workstation_Caps(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpValidBits: *mut c_int, lpCaps: *mut c_int) -> c_int;
    fn ADL2_Workstation_ECC_Caps(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpSupported: *mut c_int) -> c_int;
    fn ADL2_Workstation_ECC_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpDefaultMode: *mut c_int, lpCurrentMode: *mut c_int, lpDesiredMode: *mut c_int) -> c_int;
    fn ADL2_Workstation_ECC_Set(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iDesiredMode: c_int) -> c_int;
    fn ADL2_Workstation_ECCData_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpAdlEccData: *mut ADLECCData) -> c_int;
    fn ADL2_Workstation_SDI_Caps(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpSupported: *mut c_int) -> c_int;
    fn ADL2_Workstation_Stereo_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpDefState: *mut c_int, lpCurState: *mut c_int) -> c_int;
    fn ADL2_Workstation_Stereo_Set(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iCurState: c_int) -> c_int;
    fn ADL2_Workstation_AdapterNumOfGLSyncConnectors_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, lpNumOfGLSyncConnectors: *mut c_int) -> c_int;
    fn ADL2_Workstation_GLSyncModuleDetect_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iGlSyncConnector: c_int, lpGlSyncModuleID: *mut ADLGLSyncModuleID) -> c_int;
    fn ADL2_Workstation_DisplayGenlockCapable_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iDisplayIndex: c_int, lpCanGenlock: *mut c_int) -> c_int;
    fn ADL2_Workstation_DisplayGLSyncMode_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iDisplayIndex: c_int, lpGlSyncMode: *mut ADLGlSyncMode) -> c_int;
    fn ADL2_Workstation_GLSyncGenlockConfiguration_Get(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iGlSyncConnector: c_int, iGlValidMask: c_int, lpGlSyncGenlockConfig: *mut ADLGLSyncGenlockConfig) -> c_int;
    fn ADL2_Workstation_GLSyncGenlockConfiguration_Set(context: ADL_CONTEXT_HANDLE, iAdapterIndex: c_int, iGlSyncConnector: c_int, glSyncGenlockConfig: ADLGLSyncGenlockConfig) -> c_int;
}

impl fmt::Debug for AdlFunctions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdlFunctions")
            .field("resolved", &self.resolved_names().len())
            .field("declared", &Self::NAMES.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe extern "C" fn fake_refresh(_context: ADL_CONTEXT_HANDLE) -> c_int {
        0
    }

    #[test]
    fn default_table_resolves_nothing() {
        let functions = AdlFunctions::default();
        assert!(functions.resolved_names().is_empty());
        assert!(!functions.has("ADL2_Main_Control_Refresh"));
    }

    #[test]
    fn resolved_names_follow_the_fields() {
        let functions = AdlFunctions {
            ADL2_Main_Control_Refresh: Some(fake_refresh),
            ..Default::default()
        };
        assert_eq!(functions.resolved_names(), vec!["ADL2_Main_Control_Refresh"]);
        assert!(functions.has("ADL2_Main_Control_Refresh"));
        assert!(format!("{functions:?}").contains("resolved: 1"));
    }

    #[test]
    fn every_name_is_an_adl2_symbol() {
        assert!(AdlFunctions::NAMES.iter().all(|name| name.starts_with("ADL2_")));
        let mut names = AdlFunctions::NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), AdlFunctions::NAMES.len());
    }
}
