//! # radeon-adl - Rust bindings for the AMD Display Library
//!
//! Loads AMD's ADL2 driver library at runtime and exposes its entry points
//! through a raw function table and a safe layer on top of it.
//!
//! ## Features
//!
//! - **Runtime loading** of `atiadlxx.dll` / `atiadlxy.dll` / `libatiadlxx.so`
//! - **Raw bindings** with the vendor's exact symbol names and C signatures
//! - **Safe wrappers** for adapters, gamma, display mapping and SLS, driver
//!   versions, Linux desktop queries, OverdriveN, PMLog sensors,
//!   PowerXpress, the USB LED bar and workstation features
//! - **Driver-owned memory** freed automatically
//! - **Fan watchdog** that resets stalled fan control (`monitor` feature)
//! - **JSON export** of everything the safe layer returns
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     for gpu in radeon_adl::get_gpu_info()? {
//!         println!("GPU {}: {}", gpu.index, gpu.name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Lower-level access goes through [`Adl`]:
//!
//! ```no_run
//! use radeon_adl::{Adl, AdlConfig, SensorType};
//!
//! let adl = Adl::open(&AdlConfig::default())?;
//! for adapter in adl.active_amd_adapters()? {
//!     let sensors = adl.pmlog_snapshot(adapter.index)?;
//!     println!("{}: {:?} RPM", adapter.name, sensors.get(SensorType::FanRpm));
//! }
//! # Ok::<(), radeon_adl::AdlError>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod adapter;
pub mod api;
pub mod config;
pub mod context;
pub mod controller;
pub mod displays;
pub mod error;
pub mod ffi;
pub mod graphics;
pub mod library;
pub mod linux;
pub mod mappings;
#[cfg(feature = "monitor")]
pub mod monitor;
pub mod overdrive;
pub mod powerxpress;
pub mod status;
pub mod usbled;
pub mod workstation;

#[cfg(test)]
mod testing;

// Re-export main API for easy access
pub use adapter::{Adapter, MemoryInfo};
pub use api::{collect_gpu_info, get_gpu_info, get_gpu_info_with_config, GpuInfo};
pub use config::{AdlConfig, ThreadingModel};
pub use context::{Adl, DriverBuffer};
pub use error::{AdlError, AdlResult};
pub use library::{find_library, AdlLibrary};
pub use mappings::{GpuVendor, SensorType, SensorUnit};
pub use overdrive::{PmLogSnapshot, SensorReading};
pub use status::AdlStatus;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Whether the AMD Display Library can be loaded on this system
///
/// # Example
///
/// ```no_run
/// if radeon_adl::is_supported() {
///     println!("AMD driver library found");
/// } else {
///     println!("No AMD driver library");
/// }
/// ```
pub fn is_supported() -> bool {
    AdlLibrary::open(&AdlConfig::from_env()).is_ok()
}

/// Get library information
///
/// # Example
///
/// ```no_run
/// println!("Using radeon-adl v{}", radeon_adl::version());
/// ```
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(version(), VERSION);
    }

    #[test]
    fn test_is_supported() {
        // depends on the machine, just ensure it runs
        let _ = is_supported();
    }
}

/// Prelude module for convenient imports
///
/// # Example
///
/// ```no_run
/// use radeon_adl::prelude::*;
///
/// let adl = Adl::open(&AdlConfig::default())?;
/// # Ok::<(), AdlError>(())
/// ```
pub mod prelude {
    pub use crate::api::{get_gpu_info, get_gpu_info_with_config, GpuInfo};
    pub use crate::config::AdlConfig;
    pub use crate::context::Adl;
    pub use crate::error::{AdlError, AdlResult};
    pub use crate::mappings::{SensorType, SensorUnit};
    pub use crate::status::AdlStatus;
    pub use crate::{is_supported, version};
}
