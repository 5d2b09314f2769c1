//! Driver versions and platform queries

use std::os::raw::{c_char, c_int};

use serde::{Deserialize, Serialize};

use crate::context::{adl_call, c_buf_to_string, Adl};
use crate::error::{AdlError, AdlResult};
use crate::ffi::*;

/// Installed driver and software versions
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DriverVersions {
    /// Kernel driver version
    pub driver: String,
    /// Catalyst software version
    pub catalyst: String,
    /// Crimson / Adrenalin version, absent on drivers without the extended query
    pub crimson: Option<String>,
    /// Release notes link
    pub web_link: String,
}

/// Form factor reported by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    /// Desktop system
    Desktop,
    /// Laptop or other mobile system
    Mobile,
    /// Value not known to this crate
    Other(i32),
}

impl From<c_int> for Platform {
    fn from(raw: c_int) -> Self {
        match raw {
            GRAPHICS_PLATFORM_DESKTOP => Platform::Desktop,
            GRAPHICS_PLATFORM_MOBILE => Platform::Mobile,
            other => Platform::Other(other),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Desktop => write!(f, "desktop"),
            Platform::Mobile => write!(f, "mobile"),
            Platform::Other(raw) => write!(f, "unknown ({raw})"),
        }
    }
}

/// Shader core layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphicCoreInfo {
    /// Graphics core generation
    pub generation: i32,
    /// Compute units (work group processors on RDNA)
    pub compute_units: i32,
    /// Processing elements per compute unit
    pub pes_per_cu: i32,
    /// SIMD units
    pub simds: i32,
    /// Render output units
    pub rops: i32,
}

impl Adl {
    /// Driver versions
    ///
    /// Uses `ADL2_Graphics_VersionsX2_Get` when the driver has it and falls
    /// back to `ADL2_Graphics_Versions_Get` otherwise.
    pub fn driver_versions(&self) -> AdlResult<DriverVersions> {
        let mut extended = ADLVersionsInfoX2::default();
        match adl_call!(self, ADL2_Graphics_VersionsX2_Get(&mut extended)) {
            Ok(_) => {
                return Ok(DriverVersions {
                    driver: c_buf_to_string(&extended.strDriverVer),
                    catalyst: c_buf_to_string(&extended.strCatalystVersion),
                    crimson: Some(c_buf_to_string(&extended.strCrimsonVersion)),
                    web_link: c_buf_to_string(&extended.strCatalystWebLink),
                });
            }
            Err(err) if err.is_not_supported() => {
                log::debug!("Falling back to ADL2_Graphics_Versions_Get: {}", err);
            }
            Err(err) => return Err(err),
        }

        let mut basic = ADLVersionsInfo::default();
        adl_call!(self, ADL2_Graphics_Versions_Get(&mut basic))?;
        Ok(DriverVersions {
            driver: c_buf_to_string(&basic.strDriverVer),
            catalyst: c_buf_to_string(&basic.strCatalystVersion),
            crimson: None,
            web_link: c_buf_to_string(&basic.strCatalystWebLink),
        })
    }

    /// Desktop or mobile
    pub fn platform(&self) -> AdlResult<Platform> {
        let mut raw: c_int = 0;
        adl_call!(self, ADL2_Graphics_Platform_Get(&mut raw))?;
        Ok(raw.into())
    }

    /// Compute unit, SIMD and ROP counts
    pub fn graphic_core_info(&self, adapter: i32) -> AdlResult<GraphicCoreInfo> {
        let mut info = ADLGraphicCoreInfo::default();
        adl_call!(self, ADL2_Adapter_Graphic_Core_Info_Get(adapter, &mut info))?;
        Ok(GraphicCoreInfo {
            generation: info.iGCGen,
            compute_units: info.iNumCUs,
            pes_per_cu: info.iNumPEsPerCU,
            simds: info.iNumSIMDs,
            rops: info.iNumROPs,
        })
    }

    /// Registry path of the adapter's driver
    pub fn driver_path(&self, adapter: i32) -> AdlResult<String> {
        let mut buf = [0 as c_char; ADL_MAX_PATH];
        adl_call!(
            self,
            ADL2_Driver_Path_Get(adapter, buf.len() as c_int, buf.as_mut_ptr())
        )?;
        let path = c_buf_to_string(&buf);
        if path.is_empty() {
            return Err(AdlError::Unsupported("driver path"));
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::AdlStatus;
    use crate::testing::{fake_adl, fill};
    use pretty_assertions::assert_eq;

    unsafe extern "C" fn versions_x2_unsupported(_: ADL_CONTEXT_HANDLE, _: *mut ADLVersionsInfoX2) -> c_int {
        -8
    }

    unsafe extern "C" fn versions_x2(_: ADL_CONTEXT_HANDLE, info: *mut ADLVersionsInfoX2) -> c_int {
        fill(&mut (*info).strDriverVer, "31.0.24002.92");
        fill(&mut (*info).strCrimsonVersion, "24.5.1");
        0
    }

    unsafe extern "C" fn versions_warning(_: ADL_CONTEXT_HANDLE, info: *mut ADLVersionsInfo) -> c_int {
        fill(&mut (*info).strDriverVer, "8.982");
        fill(&mut (*info).strCatalystVersion, "12.10");
        // the driver reports a warning when the web link is unavailable
        1
    }

    unsafe extern "C" fn versions_denied(_: ADL_CONTEXT_HANDLE, _: *mut ADLVersionsInfoX2) -> c_int {
        -23
    }

    unsafe extern "C" fn mobile(_: ADL_CONTEXT_HANDLE, platform: *mut c_int) -> c_int {
        *platform = GRAPHICS_PLATFORM_MOBILE;
        0
    }

    #[test]
    fn extended_versions_are_preferred() {
        let adl = fake_adl(AdlFunctions {
            ADL2_Graphics_VersionsX2_Get: Some(versions_x2),
            ADL2_Graphics_Versions_Get: Some(versions_warning),
            ..Default::default()
        });
        let versions = adl.driver_versions().unwrap();
        assert_eq!(versions.driver, "31.0.24002.92");
        assert_eq!(versions.crimson.as_deref(), Some("24.5.1"));
    }

    #[test]
    fn falls_back_when_extended_query_is_unsupported() {
        let adl = fake_adl(AdlFunctions {
            ADL2_Graphics_VersionsX2_Get: Some(versions_x2_unsupported),
            ADL2_Graphics_Versions_Get: Some(versions_warning),
            ..Default::default()
        });
        let versions = adl.driver_versions().unwrap();
        assert_eq!(versions.catalyst, "12.10");
        assert_eq!(versions.crimson, None);
    }

    #[test]
    fn falls_back_when_extended_query_is_missing() {
        let adl = fake_adl(AdlFunctions {
            ADL2_Graphics_Versions_Get: Some(versions_warning),
            ..Default::default()
        });
        assert_eq!(adl.driver_versions().unwrap().driver, "8.982");
    }

    #[test]
    fn other_errors_do_not_fall_back() {
        let adl = fake_adl(AdlFunctions {
            ADL2_Graphics_VersionsX2_Get: Some(versions_denied),
            ADL2_Graphics_Versions_Get: Some(versions_warning),
            ..Default::default()
        });
        let err = adl.driver_versions().unwrap_err();
        assert_eq!(err.status(), Some(AdlStatus::NoAdministratorPrivileges));
    }

    #[test]
    fn platform_decoding() {
        let adl = fake_adl(AdlFunctions {
            ADL2_Graphics_Platform_Get: Some(mobile),
            ..Default::default()
        });
        assert_eq!(adl.platform().unwrap(), Platform::Mobile);
        assert_eq!(Platform::from(9).to_string(), "unknown (9)");
    }
}
