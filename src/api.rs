//! High-level API for GPU information retrieval

use serde::{Deserialize, Serialize};

use crate::adapter::{Adapter, BiosInfo, MemoryInfo, ObservedClocks};
use crate::config::AdlConfig;
use crate::context::Adl;
use crate::error::{AdlError, AdlResult};
use crate::graphics::{DriverVersions, GraphicCoreInfo};
use crate::overdrive::{OverdriveCaps, SensorReading};

/// Structured information about one AMD GPU
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpuInfo {
    /// ADL adapter index
    pub index: i32,
    /// Marketing name
    pub name: String,
    /// Vendor name
    pub vendor: String,
    /// Unique device id string
    pub udid: String,
    /// PCI bus number
    pub bus: i32,
    /// ASIC family names (discrete, integrated, ...)
    pub asic_family: Vec<String>,
    /// Driver version
    pub driver_version: Option<String>,
    /// Adrenalin software version
    pub software_version: Option<String>,
    /// Video BIOS
    pub bios: Option<BiosInfo>,
    /// Memory size and type
    pub memory: Option<MemoryInfo>,
    /// Dedicated VRAM in use, in MB
    pub vram_used_mb: Option<i32>,
    /// Current core and memory clocks
    pub clocks: Option<ObservedClocks>,
    /// Shader core layout
    pub core_info: Option<GraphicCoreInfo>,
    /// Overdrive support
    pub overdrive: Option<OverdriveCaps>,
    /// Supported PMLog sensors at the time of the query
    pub sensors: Vec<SensorReading>,
}

/// Get information for every active AMD GPU
///
/// This is the main entry point for most applications.
pub fn get_gpu_info() -> AdlResult<Vec<GpuInfo>> {
    get_gpu_info_with_config(&AdlConfig::from_env())
}

/// Get GPU information using a specific configuration
///
/// Fails with [`AdlError::NoAdapter`] when the driver loads but reports no
/// active AMD adapter.
pub fn get_gpu_info_with_config(config: &AdlConfig) -> AdlResult<Vec<GpuInfo>> {
    let adl = Adl::open(config)?;
    let gpus = collect_gpu_info(&adl)?;
    if gpus.is_empty() {
        return Err(AdlError::NoAdapter);
    }
    Ok(gpus)
}

/// Collect [`GpuInfo`] for the active AMD adapters of an open context
///
/// Adapter enumeration errors are returned. Every other field is filled
/// best-effort and left empty when the driver does not provide it.
pub fn collect_gpu_info(adl: &Adl) -> AdlResult<Vec<GpuInfo>> {
    let versions = optional("driver versions", adl.driver_versions());
    let adapters = adl.active_amd_adapters()?;
    Ok(adapters
        .iter()
        .map(|adapter| adapter_info(adl, adapter, versions.as_ref()))
        .collect())
}

fn adapter_info(adl: &Adl, adapter: &Adapter, versions: Option<&DriverVersions>) -> GpuInfo {
    let index = adapter.index;
    GpuInfo {
        index,
        name: adapter.name.clone(),
        vendor: adapter.vendor().to_string(),
        udid: adapter.udid.clone(),
        bus: adapter.bus,
        asic_family: optional("ASIC family", adl.asic_family(index))
            .map(|family| family.names().into_iter().map(String::from).collect())
            .unwrap_or_default(),
        driver_version: versions.map(|v| v.driver.clone()),
        software_version: versions.and_then(|v| v.crimson.clone()),
        bios: optional("BIOS info", adl.bios_info(index)),
        memory: optional("memory info", adl.memory_info(index)),
        vram_used_mb: optional("VRAM usage", adl.dedicated_vram_usage_mb(index)),
        clocks: optional("observed clocks", adl.observed_clocks(index)),
        core_info: optional("graphic core info", adl.graphic_core_info(index)),
        overdrive: optional("overdrive caps", adl.overdrive_caps(index)),
        sensors: optional("PMLog", adl.pmlog_snapshot(index))
            .map(|snapshot| snapshot.readings())
            .unwrap_or_default(),
    }
}

fn optional<T>(what: &str, result: AdlResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) if err.is_not_supported() => None,
        Err(err) => {
            log::debug!("Skipping {}: {}", what, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::*;
    use crate::status::AdlStatus;
    use crate::testing::{fake_adl, fill};
    use pretty_assertions::assert_eq;
    use std::mem::size_of;
    use std::os::raw::c_int;

    unsafe extern "C" fn one_adapter(_: ADL_CONTEXT_HANDLE, num: *mut c_int) -> c_int {
        *num = 1;
        0
    }

    unsafe extern "C" fn info(_: ADL_CONTEXT_HANDLE, out: LPAdapterInfo, bytes: c_int) -> c_int {
        if bytes as usize != size_of::<AdapterInfo>() {
            return -4;
        }
        let info = &mut *out;
        info.iVendorID = AMD_VENDOR_ID;
        info.iBusNumber = 3;
        fill(&mut info.strUDID, "PCI_VEN_1002&DEV_73BF");
        fill(&mut info.strAdapterName, "AMD Radeon RX 6800");
        0
    }

    unsafe extern "C" fn active(_: ADL_CONTEXT_HANDLE, _: c_int, status: *mut c_int) -> c_int {
        *status = 1;
        0
    }

    unsafe extern "C" fn clocks(_: ADL_CONTEXT_HANDLE, _: c_int, core: *mut c_int, memory: *mut c_int) -> c_int {
        *core = 210_500;
        *memory = 200_000;
        0
    }

    unsafe extern "C" fn bios_unsupported(_: ADL_CONTEXT_HANDLE, _: c_int, _: *mut ADLBiosInfo) -> c_int {
        -8
    }

    fn functions() -> AdlFunctions {
        AdlFunctions {
            ADL2_Adapter_NumberOfAdapters_Get: Some(one_adapter),
            ADL2_Adapter_AdapterInfo_Get: Some(info),
            ADL2_Adapter_Active_Get: Some(active),
            ADL2_Adapter_ObservedClockInfo_Get: Some(clocks),
            ADL2_Adapter_VideoBiosInfo_Get: Some(bios_unsupported),
            ..Default::default()
        }
    }

    #[test]
    fn collects_best_effort_fields() {
        let adl = fake_adl(functions());
        let gpus = collect_gpu_info(&adl).unwrap();
        assert_eq!(gpus.len(), 1);

        let gpu = &gpus[0];
        assert_eq!(gpu.name, "AMD Radeon RX 6800");
        assert_eq!(gpu.vendor, "AMD");
        assert_eq!(gpu.clocks, Some(ObservedClocks { core_mhz: 2105, memory_mhz: 2000 }));
        assert_eq!(gpu.bios, None);
        assert_eq!(gpu.driver_version, None);
        assert!(gpu.sensors.is_empty());
        assert!(gpu.asic_family.is_empty());
    }

    #[test]
    fn enumeration_errors_are_returned() {
        let adl = fake_adl(AdlFunctions {
            ADL2_Adapter_AdapterInfo_Get: None,
            ..functions()
        });
        assert!(matches!(
            collect_gpu_info(&adl),
            Err(AdlError::SymbolNotFound("ADL2_Adapter_AdapterInfo_Get"))
        ));
    }

    #[test]
    fn serializes_to_json() {
        let adl = fake_adl(functions());
        let gpus = collect_gpu_info(&adl).unwrap();
        let value = serde_json::to_value(&gpus).unwrap();
        assert_eq!(value[0]["clocks"]["core_mhz"], 2105);
        assert!(value[0]["bios"].is_null());
    }

    #[test]
    fn optional_drops_errors() {
        let unsupported: AdlResult<i32> = Err(AdlError::Status {
            function: "ADL2_Adapter_VRAMUsage_Get",
            status: AdlStatus::NotSupported,
        });
        assert_eq!(optional("VRAM usage", unsupported), None);
        assert_eq!(optional("VRAM usage", Err::<i32, _>(AdlError::NoAdapter)), None);
        assert_eq!(optional("VRAM usage", Ok(5)), Some(5));
    }
}
