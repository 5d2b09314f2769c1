//! Name tables for vendor codes and bitmasks

pub mod sensors;

pub use sensors::{SensorType, SensorUnit};

use crate::ffi::*;

/// Known GPU vendors by PCI vendor id
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GpuVendor {
    /// AMD / ATI
    Amd,
    /// Anything else the driver enumerates
    Unknown,
}

impl GpuVendor {
    /// Classify an `iVendorID`
    pub fn from_id(vendor_id: i32) -> Self {
        if vendor_id == AMD_VENDOR_ID {
            GpuVendor::Amd
        } else {
            GpuVendor::Unknown
        }
    }
}

impl std::fmt::Display for GpuVendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GpuVendor::Amd => write!(f, "AMD"),
            GpuVendor::Unknown => write!(f, "Unknown"),
        }
    }
}

const ASIC_NAMES: &[(i32, &str)] = &[
    (ADL_ASIC_DISCRETE, "discrete"),
    (ADL_ASIC_INTEGRATED, "integrated"),
    (ADL_ASIC_WORKSTATION, "workstation"),
    (ADL_ASIC_FIREMV, "FireMV"),
    (ADL_ASIC_XGP, "XGP"),
    (ADL_ASIC_FUSION, "Fusion"),
    (ADL_ASIC_FIRESTREAM, "FireStream"),
    (ADL_ASIC_EMBEDDED, "embedded"),
];

/// Names of the ASIC family bits set in `types`, restricted to the bits marked valid
pub fn asic_family_names(types: i32, valid: i32) -> Vec<&'static str> {
    ASIC_NAMES
        .iter()
        .filter(|(bit, _)| types & valid & bit != 0)
        .map(|(_, name)| *name)
        .collect()
}

/// Name of a Linux desktop configuration value
pub fn desktop_config_name(config: i32) -> &'static str {
    match config {
        ADL_DESKTOPCONFIG_SINGLE => "single",
        ADL_DESKTOPCONFIG_CLONE => "clone",
        ADL_DESKTOPCONFIG_BIGDESK_H => "big desktop (horizontal)",
        ADL_DESKTOPCONFIG_BIGDESK_V => "big desktop (vertical)",
        ADL_DESKTOPCONFIG_BIGDESK_HR => "big desktop (horizontal, reversed)",
        ADL_DESKTOPCONFIG_BIGDESK_VR => "big desktop (vertical, reversed)",
        ADL_DESKTOPCONFIG_RANDR12 => "RandR 1.2",
        _ => "unknown",
    }
}

/// Name of an ECC mode
pub fn ecc_mode_name(mode: i32) -> &'static str {
    match mode {
        ECC_MODE_OFF => "off",
        ECC_MODE_ON => "on",
        ECC_MODE_HBM_ON => "HBM on",
        _ => "unknown",
    }
}

/// Name of a USB LED bar control
pub fn led_control_name(control: i32) -> &'static str {
    match control {
        RadeonLEDBarControl_OFF => "off",
        RadeonLEDBarControl_Static => "static",
        RadeonLEDBarControl_Rainbow => "rainbow",
        RadeonLEDBarControl_Swirl => "swirl",
        RadeonLEDBarControl_Chase => "chase",
        RadeonLEDBarControl_Bounce => "bounce",
        RadeonLEDBarControl_MorseCode => "morse code",
        RadeonLEDBarControl_ColorCycle => "color cycle",
        RadeonLEDBarControl_Breathing => "breathing",
        RadeonLEDBarControl_CustomPattern => "custom pattern",
        _ => "unknown",
    }
}

/// Split a packed `major << 16 | minor` version
pub fn parse_packed_version(version: i32) -> (u16, u16) {
    let version = version as u32;
    ((version >> 16) as u16, (version & 0xFFFF) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn asic_names_respect_valid_mask() {
        let types = ADL_ASIC_DISCRETE | ADL_ASIC_WORKSTATION;
        assert_eq!(asic_family_names(types, -1), vec!["discrete", "workstation"]);
        assert_eq!(asic_family_names(types, ADL_ASIC_DISCRETE), vec!["discrete"]);
        assert!(asic_family_names(ADL_ASIC_UNDEFINED, -1).is_empty());
    }

    #[test]
    fn vendor_from_id() {
        assert_eq!(GpuVendor::from_id(1002), GpuVendor::Amd);
        assert_eq!(GpuVendor::from_id(0x10de).to_string(), "Unknown");
    }

    #[test]
    fn named_codes() {
        assert_eq!(desktop_config_name(ADL_DESKTOPCONFIG_CLONE), "clone");
        assert_eq!(ecc_mode_name(ECC_MODE_HBM_ON), "HBM on");
        assert_eq!(led_control_name(RadeonLEDBarControl_MorseCode), "morse code");
        assert_eq!(led_control_name(42), "unknown");
    }

    #[test]
    fn packed_versions() {
        assert_eq!(parse_packed_version(0x0003_0002), (3, 2));
        assert_eq!(parse_packed_version(7), (0, 7));
    }
}
