//! Adapter enumeration and adapter properties

use std::collections::HashSet;
use std::mem::size_of;
use std::os::raw::c_int;

use serde::{Deserialize, Serialize};

use crate::context::{adl_call, c_buf_to_string, Adl};
use crate::error::{AdlError, AdlResult};
use crate::ffi::*;
use crate::mappings::{asic_family_names, GpuVendor};

/// One adapter entry as enumerated by the driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adapter {
    /// ADL adapter index used by every per-adapter call
    pub index: i32,
    /// Unique device id; several indexes can share one physical GPU
    pub udid: String,
    /// PCI bus number
    pub bus: i32,
    /// PCI device number
    pub device: i32,
    /// PCI function number
    pub function: i32,
    /// PCI vendor id
    pub vendor_id: i32,
    /// Marketing name
    pub name: String,
    /// OS display name
    pub display_name: String,
    /// Whether the adapter is physically present
    pub present: bool,
    /// Driver registry path (Windows)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_path: Option<String>,
    /// PnP string (Windows)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pnp_string: Option<String>,
    /// X screen number (Linux)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_screen: Option<i32>,
    /// X screen configuration name (Linux)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_screen_config: Option<String>,
}

impl Adapter {
    /// Vendor classification of `vendor_id`
    pub fn vendor(&self) -> GpuVendor {
        GpuVendor::from_id(self.vendor_id)
    }
}

impl From<&AdapterInfo> for Adapter {
    fn from(info: &AdapterInfo) -> Self {
        let mut adapter = Self {
            index: info.iAdapterIndex,
            udid: c_buf_to_string(&info.strUDID),
            bus: info.iBusNumber,
            device: info.iDeviceNumber,
            function: info.iFunctionNumber,
            vendor_id: info.iVendorID,
            name: c_buf_to_string(&info.strAdapterName),
            display_name: c_buf_to_string(&info.strDisplayName),
            present: info.iPresent != 0,
            driver_path: None,
            pnp_string: None,
            x_screen: None,
            x_screen_config: None,
        };
        #[cfg(windows)]
        {
            adapter.driver_path = Some(c_buf_to_string(&info.strDriverPath));
            adapter.pnp_string = Some(c_buf_to_string(&info.strPNPString));
        }
        #[cfg(not(windows))]
        {
            adapter.x_screen = Some(info.iXScreenNum);
            adapter.x_screen_config = Some(c_buf_to_string(&info.strXScreenConfigName));
        }
        adapter
    }
}

/// ASIC family bits with the mask of bits the driver filled in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsicFamily {
    /// `ADL_ASIC_*` bits
    pub types: i32,
    /// Which bits are meaningful
    pub valid: i32,
}

impl AsicFamily {
    /// Names of the set and valid bits
    pub fn names(&self) -> Vec<&'static str> {
        asic_family_names(self.types, self.valid)
    }

    /// Whether `bit` is set and valid
    pub fn contains(&self, bit: i32) -> bool {
        self.types & self.valid & bit != 0
    }
}

/// Adapter capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterCaps {
    /// Unique adapter id
    pub adapter_id: i32,
    /// Number of display controllers
    pub controllers: i32,
    /// Number of displays
    pub displays: i32,
    /// Number of overlays
    pub overlays: i32,
    /// Number of GL-Sync connectors
    pub gl_sync_connectors: i32,
    #[allow(missing_docs)]
    pub caps_mask: i32,
    #[allow(missing_docs)]
    pub caps_value: i32,
}

impl From<ADLAdapterCaps> for AdapterCaps {
    fn from(caps: ADLAdapterCaps) -> Self {
        Self {
            adapter_id: caps.iAdapterID,
            controllers: caps.iNumControllers,
            displays: caps.iNumDisplays,
            overlays: caps.iNumOverlays,
            gl_sync_connectors: caps.iNumOfGLSyncConnectors,
            caps_mask: caps.iCapsMask,
            caps_value: caps.iCapsValue,
        }
    }
}

/// Video BIOS identification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct BiosInfo {
    pub part_number: String,
    pub version: String,
    pub date: String,
}

/// Video memory description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryInfo {
    /// Total memory in bytes
    pub size_bytes: i64,
    /// Memory technology, e.g. "GDDR6"
    pub memory_type: String,
    /// Bandwidth in MB/s
    pub bandwidth_mbps: i64,
    /// Shared system memory in bytes, when reported
    pub hyper_memory_bytes: Option<i64>,
    /// CPU-invisible part of local memory, when reported
    pub invisible_bytes: Option<i64>,
    /// CPU-visible part of local memory, when reported
    pub visible_bytes: Option<i64>,
}

/// Current engine and memory clocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedClocks {
    /// Engine clock in MHz
    pub core_mhz: i32,
    /// Memory clock in MHz
    pub memory_mhz: i32,
}

impl Adl {
    /// Number of adapters the driver enumerates, active or not
    pub fn adapter_count(&self) -> AdlResult<usize> {
        let mut count: c_int = 0;
        adl_call!(self, ADL2_Adapter_NumberOfAdapters_Get(&mut count))?;
        Ok(count.max(0) as usize)
    }

    /// Every adapter entry; zero adapters yields an empty list
    pub fn adapter_infos(&self) -> AdlResult<Vec<Adapter>> {
        let count = self.adapter_count()?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut infos = vec![AdapterInfo::default(); count];
        for info in infos.iter_mut() {
            info.iSize = size_of::<AdapterInfo>() as c_int;
        }
        let bytes = (count * size_of::<AdapterInfo>()) as c_int;
        adl_call!(self, ADL2_Adapter_AdapterInfo_Get(infos.as_mut_ptr(), bytes))?;

        Ok(infos.iter().map(Adapter::from).collect())
    }

    /// Look up one adapter entry by index
    pub fn adapter(&self, index: i32) -> AdlResult<Adapter> {
        self.adapter_infos()?
            .into_iter()
            .find(|adapter| adapter.index == index)
            .ok_or(AdlError::InvalidAdapter(index))
    }

    /// Whether the adapter is enabled
    pub fn is_active(&self, adapter: i32) -> AdlResult<bool> {
        let mut status: c_int = 0;
        adl_call!(self, ADL2_Adapter_Active_Get(adapter, &mut status))?;
        Ok(status != 0)
    }

    /// Unique adapter id shared by all indexes on the same GPU
    pub fn adapter_id(&self, adapter: i32) -> AdlResult<i32> {
        let mut id: c_int = 0;
        adl_call!(self, ADL2_Adapter_ID_Get(adapter, &mut id))?;
        Ok(id)
    }

    /// Index of the primary adapter
    pub fn primary_adapter(&self) -> AdlResult<i32> {
        let mut index: c_int = -1;
        adl_call!(self, ADL2_Adapter_Primary_Get(&mut index))?;
        Ok(index)
    }

    /// ASIC family bits (discrete, integrated, workstation, ...)
    pub fn asic_family(&self, adapter: i32) -> AdlResult<AsicFamily> {
        let (mut types, mut valid): (c_int, c_int) = (0, 0);
        adl_call!(self, ADL2_Adapter_ASICFamilyType_Get(adapter, &mut types, &mut valid))?;
        Ok(AsicFamily { types, valid })
    }

    /// Controller, display and overlay counts
    pub fn adapter_caps(&self, adapter: i32) -> AdlResult<AdapterCaps> {
        let mut caps = ADLAdapterCaps::default();
        adl_call!(self, ADL2_Adapter_Caps(adapter, &mut caps))?;
        Ok(caps.into())
    }

    /// Video BIOS part number, version and date
    pub fn bios_info(&self, adapter: i32) -> AdlResult<BiosInfo> {
        let mut bios = ADLBiosInfo::default();
        adl_call!(self, ADL2_Adapter_VideoBiosInfo_Get(adapter, &mut bios))?;
        Ok(BiosInfo {
            part_number: c_buf_to_string(&bios.strPartNumber),
            version: c_buf_to_string(&bios.strVersion),
            date: c_buf_to_string(&bios.strDate),
        })
    }

    /// Memory description; falls back to the older single-pool query when the
    /// driver lacks `ADL2_Adapter_MemoryInfo2_Get`
    pub fn memory_info(&self, adapter: i32) -> AdlResult<MemoryInfo> {
        let mut info = ADLMemoryInfo2::default();
        match adl_call!(self, ADL2_Adapter_MemoryInfo2_Get(adapter, &mut info)) {
            Ok(_) => Ok(MemoryInfo {
                size_bytes: info.iMemorySize,
                memory_type: c_buf_to_string(&info.strMemoryType),
                bandwidth_mbps: info.iMemoryBandwidth,
                hyper_memory_bytes: Some(info.iHyperMemorySize),
                invisible_bytes: Some(info.iInvisibleMemorySize),
                visible_bytes: Some(info.iVisibleMemorySize),
            }),
            Err(AdlError::SymbolNotFound(_)) => self.basic_memory_info(adapter),
            Err(err) => Err(err),
        }
    }

    /// VRAM in use across all processes, in MB
    pub fn vram_usage_mb(&self, adapter: i32) -> AdlResult<i32> {
        let mut used: c_int = 0;
        adl_call!(self, ADL2_Adapter_VRAMUsage_Get(adapter, &mut used))?;
        Ok(used)
    }

    /// Dedicated VRAM in use, in MB
    pub fn dedicated_vram_usage_mb(&self, adapter: i32) -> AdlResult<i32> {
        let mut used: c_int = 0;
        adl_call!(self, ADL2_Adapter_DedicatedVRAMUsage_Get(adapter, &mut used))?;
        Ok(used)
    }

    /// Current clocks; the driver reports them in 10 kHz units
    pub fn observed_clocks(&self, adapter: i32) -> AdlResult<ObservedClocks> {
        let (mut core, mut memory): (c_int, c_int) = (0, 0);
        adl_call!(self, ADL2_Adapter_ObservedClockInfo_Get(adapter, &mut core, &mut memory))?;
        Ok(ObservedClocks {
            core_mhz: core / 100,
            memory_mhz: memory / 100,
        })
    }

    /// Whether this process may access the adapter
    pub fn is_accessible(&self, adapter: i32) -> AdlResult<bool> {
        let mut accessible: c_int = 0;
        adl_call!(self, ADL2_Adapter_Accessibility_Get(adapter, &mut accessible))?;
        Ok(accessible != 0)
    }

    /// Active AMD adapters, one entry per physical GPU
    ///
    /// The driver lists one index per output; entries sharing a UDID and bus
    /// number are collapsed to the first.
    pub fn active_amd_adapters(&self) -> AdlResult<Vec<Adapter>> {
        let mut seen = HashSet::new();
        let mut active = Vec::new();

        for adapter in self.adapter_infos()? {
            if adapter.vendor_id != AMD_VENDOR_ID {
                continue;
            }
            if !self.is_active(adapter.index)? {
                continue;
            }
            if seen.insert((adapter.udid.clone(), adapter.bus)) {
                active.push(adapter);
            }
        }

        log::info!(
            "Found {} active AMD adapter(s): {:?}",
            active.len(),
            active.iter().map(|a| a.name.as_str()).collect::<Vec<_>>()
        );
        Ok(active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_adl, fill};
    use pretty_assertions::assert_eq;

    const ENTRIES: [(i32, &str, i32, i32, &str); 4] = [
        (0, "PCI_VEN_1002&DEV_744C", 3, AMD_VENDOR_ID, "AMD Radeon RX 7900 XTX"),
        (1, "PCI_VEN_1002&DEV_744C", 3, AMD_VENDOR_ID, "AMD Radeon RX 7900 XTX"),
        (2, "PCI_VEN_10DE&DEV_2684", 7, 0x10de, "Other"),
        (3, "PCI_VEN_1002&DEV_164E", 12, AMD_VENDOR_ID, "AMD Radeon Graphics"),
    ];

    unsafe extern "C" fn count(_: ADL_CONTEXT_HANDLE, num: *mut c_int) -> c_int {
        *num = ENTRIES.len() as c_int;
        0
    }

    unsafe extern "C" fn no_adapters(_: ADL_CONTEXT_HANDLE, num: *mut c_int) -> c_int {
        *num = 0;
        0
    }

    unsafe extern "C" fn infos(_: ADL_CONTEXT_HANDLE, out: LPAdapterInfo, size: c_int) -> c_int {
        if size as usize != ENTRIES.len() * size_of::<AdapterInfo>() {
            return -4;
        }
        let out = std::slice::from_raw_parts_mut(out, ENTRIES.len());
        for (info, (index, udid, bus, vendor, name)) in out.iter_mut().zip(ENTRIES) {
            info.iAdapterIndex = index;
            info.iBusNumber = bus;
            info.iVendorID = vendor;
            info.iPresent = 1;
            fill(&mut info.strUDID, udid);
            fill(&mut info.strAdapterName, name);
        }
        0
    }

    unsafe extern "C" fn active(_: ADL_CONTEXT_HANDLE, index: c_int, status: *mut c_int) -> c_int {
        // the integrated GPU at index 3 is disabled
        *status = (index != 3) as c_int;
        0
    }

    unsafe extern "C" fn clocks(_: ADL_CONTEXT_HANDLE, _: c_int, core: *mut c_int, mem: *mut c_int) -> c_int {
        *core = 250_000;
        *mem = 125_000;
        0
    }

    unsafe extern "C" fn memory(_: ADL_CONTEXT_HANDLE, _: c_int, info: *mut ADLMemoryInfo) -> c_int {
        (*info).iMemorySize = 8 << 30;
        (*info).iMemoryBandwidth = 448_000;
        fill(&mut (*info).strMemoryType, "GDDR6");
        0
    }

    fn table() -> AdlFunctions {
        AdlFunctions {
            ADL2_Adapter_NumberOfAdapters_Get: Some(count),
            ADL2_Adapter_AdapterInfo_Get: Some(infos),
            ADL2_Adapter_Active_Get: Some(active),
            ..Default::default()
        }
    }

    #[test]
    fn enumerates_every_entry() {
        let adl = fake_adl(table());
        let adapters = adl.adapter_infos().unwrap();
        assert_eq!(adapters.len(), 4);
        assert_eq!(adapters[2].vendor(), GpuVendor::Unknown);
        assert_eq!(adapters[0].name, "AMD Radeon RX 7900 XTX");
    }

    #[test]
    fn active_amd_adapters_are_deduplicated() {
        let adl = fake_adl(table());
        let adapters = adl.active_amd_adapters().unwrap();
        let indexes: Vec<i32> = adapters.iter().map(|a| a.index).collect();
        assert_eq!(indexes, vec![0]);
    }

    #[test]
    fn unknown_index_is_rejected() {
        let adl = fake_adl(table());
        assert_eq!(adl.adapter(3).unwrap().name, "AMD Radeon Graphics");
        assert!(matches!(adl.adapter(9), Err(AdlError::InvalidAdapter(9))));
    }

    #[test]
    fn zero_adapters_is_not_an_error() {
        let adl = fake_adl(AdlFunctions {
            ADL2_Adapter_NumberOfAdapters_Get: Some(no_adapters),
            ..Default::default()
        });
        assert!(adl.adapter_infos().unwrap().is_empty());
        assert!(adl.active_amd_adapters().unwrap().is_empty());
    }

    #[test]
    fn clocks_are_converted_to_mhz() {
        let adl = fake_adl(AdlFunctions {
            ADL2_Adapter_ObservedClockInfo_Get: Some(clocks),
            ..Default::default()
        });
        assert_eq!(
            adl.observed_clocks(0).unwrap(),
            ObservedClocks {
                core_mhz: 2500,
                memory_mhz: 1250
            }
        );
    }

    #[test]
    fn memory_info_falls_back_to_the_basic_query() {
        let adl = fake_adl(AdlFunctions {
            ADL2_Adapter_MemoryInfo_Get: Some(memory),
            ..Default::default()
        });
        let info = adl.memory_info(0).unwrap();
        assert_eq!(info.memory_type, "GDDR6");
        assert_eq!(info.size_bytes, 8 << 30);
        assert_eq!(info.visible_bytes, None);
    }
}
