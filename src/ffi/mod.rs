//! Raw ADL2 binding surface
//!
//! Nothing here is safe to call directly: the function table holds raw
//! driver entry points and the structures are plain C mirrors. The safe
//! layer lives on [`crate::Adl`].

#![allow(non_upper_case_globals)]
#![allow(missing_docs)]

mod functions;
mod types;

pub use functions::AdlFunctions;
pub use types::*;

use std::os::raw::c_int;

/// PCI vendor id reported in `AdapterInfo::iVendorID` for AMD/ATI parts
pub const AMD_VENDOR_ID: c_int = 1002;

// ADLThreadingModel
pub const ADL_THREADING_UNLOCKED: c_int = 0;
pub const ADL_THREADING_LOCKED: c_int = 1;

// ASIC family bits from ADL2_Adapter_ASICFamilyType_Get
pub const ADL_ASIC_UNDEFINED: c_int = 0;
pub const ADL_ASIC_DISCRETE: c_int = 1 << 0;
pub const ADL_ASIC_INTEGRATED: c_int = 1 << 1;
pub const ADL_ASIC_WORKSTATION: c_int = 1 << 2;
pub const ADL_ASIC_FIREMV: c_int = 1 << 3;
pub const ADL_ASIC_XGP: c_int = 1 << 4;
pub const ADL_ASIC_FUSION: c_int = 1 << 5;
pub const ADL_ASIC_FIRESTREAM: c_int = 1 << 6;
pub const ADL_ASIC_EMBEDDED: c_int = 1 << 7;

// Display map / SLS query options
pub const ADL_DISPLAY_DISPLAYMAP_OPTION_GPUINFO: c_int = 1;
pub const ADL_DISPLAY_SLSMAPINDEXLIST_OPTION_ACTIVE: c_int = 1;
pub const ADL_DISPLAY_SLSMAPCONFIG_GET_OPTION_RELATIVETO_LANDSCAPE: c_int = 1;
pub const ADL_DISPLAY_SLSMAPCONFIG_GET_OPTION_RELATIVETO_CURRENTANGLE: c_int = 2;

// Graphics platform
pub const GRAPHICS_PLATFORM_DESKTOP: c_int = 0;
pub const GRAPHICS_PLATFORM_MOBILE: c_int = 1;

// ADLODNControlType
pub const ODNControlType_Current: c_int = 0;
pub const ODNControlType_Default: c_int = 1;
pub const ODNControlType_Auto: c_int = 2;
pub const ODNControlType_Manual: c_int = 3;

// ADLODNTemperatureType
pub const ODNTemperatureType_Core: c_int = 1;
pub const ODNTemperatureType_Memory: c_int = 2;
pub const ODNTemperatureType_VrmCore: c_int = 3;
pub const ODNTemperatureType_VrmMemory: c_int = 4;
pub const ODNTemperatureType_Liquid: c_int = 5;
pub const ODNTemperatureType_Plx: c_int = 6;
pub const ODNTemperatureType_Hotspot: c_int = 7;

// PowerXpress
pub const ADL_DL_POWERXPRESS_GPU_INTEGRATED: c_int = 1;
pub const ADL_DL_POWERXPRESS_GPU_DISCRETE: c_int = 2;
pub const ADL_DL_POWERXPRESS_SWITCH_RESULT_STARTED: c_int = 1;
pub const ADL_DL_POWERXPRESS_SWITCH_RESULT_DECLINED: c_int = 2;
pub const ADL_DL_POWERXPRESS_SWITCH_RESULT_ALREADY: c_int = 3;

// Desktop configuration (Linux)
pub const ADL_DESKTOPCONFIG_UNKNOWN: c_int = 0;
pub const ADL_DESKTOPCONFIG_SINGLE: c_int = 1 << 0;
pub const ADL_DESKTOPCONFIG_CLONE: c_int = 1 << 2;
pub const ADL_DESKTOPCONFIG_BIGDESK_H: c_int = 1 << 4;
pub const ADL_DESKTOPCONFIG_BIGDESK_V: c_int = 1 << 5;
pub const ADL_DESKTOPCONFIG_BIGDESK_HR: c_int = 1 << 6;
pub const ADL_DESKTOPCONFIG_BIGDESK_VR: c_int = 1 << 7;
pub const ADL_DESKTOPCONFIG_RANDR12: c_int = 1 << 8;

// ECC modes
pub const ECC_MODE_OFF: c_int = 0;
pub const ECC_MODE_ON: c_int = 2;
pub const ECC_MODE_HBM_ON: c_int = 3;

// GL-Sync genlock configuration mask
pub const ADL_GLSYNC_CONFIGMASK_NONE: c_int = 0;
pub const ADL_GLSYNC_CONFIGMASK_SIGNALSOURCE: c_int = 1 << 0;
pub const ADL_GLSYNC_CONFIGMASK_SYNCFIELD: c_int = 1 << 1;
pub const ADL_GLSYNC_CONFIGMASK_SAMPLERATE: c_int = 1 << 2;
pub const ADL_GLSYNC_CONFIGMASK_SYNCDELAY: c_int = 1 << 3;
pub const ADL_GLSYNC_CONFIGMASK_TRIGGEREDGE: c_int = 1 << 4;
pub const ADL_GLSYNC_CONFIGMASK_SCANRATECOEFF: c_int = 1 << 5;
pub const ADL_GLSYNC_CONFIGMASK_FRAMELOCKCNTL: c_int = 1 << 6;

// ADL_RADEON_USB_LED_BAR_CONTROLS
pub const RadeonLEDBarControl_OFF: c_int = 0;
pub const RadeonLEDBarControl_Static: c_int = 1;
pub const RadeonLEDBarControl_Rainbow: c_int = 2;
pub const RadeonLEDBarControl_Swirl: c_int = 3;
pub const RadeonLEDBarControl_Chase: c_int = 4;
pub const RadeonLEDBarControl_Bounce: c_int = 5;
pub const RadeonLEDBarControl_MorseCode: c_int = 6;
pub const RadeonLEDBarControl_ColorCycle: c_int = 7;
pub const RadeonLEDBarControl_Breathing: c_int = 8;
pub const RadeonLEDBarControl_CustomPattern: c_int = 9;
pub const RadeonLEDBarControl_MAX: c_int = 10;
