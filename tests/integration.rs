//! End-to-end tests of the safe layer against an in-process driver

#[cfg(test)]
mod integration_tests {
    use std::cell::Cell;
    use std::mem::size_of;
    use std::os::raw::{c_char, c_int};
    use std::process::Command;

    use pretty_assertions::assert_eq;
    use radeon_adl::ffi::*;
    use radeon_adl::monitor::{Monitor, MonitorConfig, Outcome};
    use radeon_adl::{Adl, AdlConfig, AdlError, AdlStatus, SensorType};
    use serial_test::serial;

    thread_local! {
        static FAN_STALLED: Cell<bool> = const { Cell::new(true) };
        static CONTEXTS: Cell<i32> = const { Cell::new(0) };
        static INFO_CALLS: Cell<i32> = const { Cell::new(0) };
    }

    unsafe extern "C" fn create(callback: ADL_MAIN_MALLOC_CALLBACK, _: c_int, context: *mut ADL_CONTEXT_HANDLE) -> c_int {
        let Some(alloc) = callback else { return -11 };
        *context = alloc(16);
        CONTEXTS.with(|c| c.set(c.get() + 1));
        0
    }

    unsafe extern "C" fn destroy(context: ADL_CONTEXT_HANDLE) -> c_int {
        libc::free(context);
        CONTEXTS.with(|c| c.set(c.get() - 1));
        0
    }

    unsafe extern "C" fn count(_: ADL_CONTEXT_HANDLE, num: *mut c_int) -> c_int {
        *num = 2;
        0
    }

    fn fill(buf: &mut [c_char], text: &str) {
        for (dst, src) in buf.iter_mut().zip(text.bytes().chain(std::iter::once(0))) {
            *dst = src as c_char;
        }
    }

    unsafe extern "C" fn infos(_: ADL_CONTEXT_HANDLE, out: LPAdapterInfo, size: c_int) -> c_int {
        INFO_CALLS.with(|c| c.set(c.get() + 1));
        if size as usize != 2 * size_of::<AdapterInfo>() {
            return -4;
        }
        // two outputs of the same board
        for (i, info) in std::slice::from_raw_parts_mut(out, 2).iter_mut().enumerate() {
            info.iAdapterIndex = i as c_int;
            info.iVendorID = AMD_VENDOR_ID;
            info.iBusNumber = 8;
            fill(&mut info.strUDID, "PCI_VEN_1002&DEV_7480");
            fill(&mut info.strAdapterName, "AMD Radeon RX 7600");
        }
        0
    }

    unsafe extern "C" fn active(_: ADL_CONTEXT_HANDLE, _: c_int, status: *mut c_int) -> c_int {
        *status = 1;
        0
    }

    unsafe extern "C" fn pmlog(_: ADL_CONTEXT_HANDLE, _: c_int, out: *mut ADLPMLogDataOutput) -> c_int {
        let rpm = if FAN_STALLED.with(Cell::get) { 65535 } else { 1800 };
        (*out).sensors[SensorType::FanRpm.id()] = ADLSingleSensorData { supported: 1, value: rpm };
        (*out).sensors[SensorType::FanPercentage.id()] = ADLSingleSensorData { supported: 1, value: 45 };
        (*out).sensors[SensorType::TemperatureHotspot.id()] = ADLSingleSensorData { supported: 1, value: 77 };
        0
    }

    unsafe extern "C" fn fan_get(_: ADL_CONTEXT_HANDLE, _: c_int, fan: *mut ADLODNFanControl) -> c_int {
        (*fan).iMode = ODNControlType_Manual;
        0
    }

    unsafe extern "C" fn fan_set(_: ADL_CONTEXT_HANDLE, _: c_int, fan: *mut ADLODNFanControl) -> c_int {
        if (*fan).iMode == ODNControlType_Default {
            FAN_STALLED.with(|s| s.set(false));
        }
        0
    }

    unsafe extern "C" fn versions_unsupported(_: ADL_CONTEXT_HANDLE, _: *mut ADLVersionsInfoX2) -> c_int {
        -8
    }

    fn driver() -> AdlFunctions {
        AdlFunctions {
            ADL2_Main_Control_Create: Some(create),
            ADL2_Main_Control_Destroy: Some(destroy),
            ADL2_Adapter_NumberOfAdapters_Get: Some(count),
            ADL2_Adapter_AdapterInfo_Get: Some(infos),
            ADL2_Adapter_Active_Get: Some(active),
            ADL2_New_QueryPMLogData_Get: Some(pmlog),
            ADL2_OverdriveN_FanControl_Get: Some(fan_get),
            ADL2_OverdriveN_FanControl_Set: Some(fan_set),
            ADL2_Graphics_VersionsX2_Get: Some(versions_unsupported),
            ..Default::default()
        }
    }

    #[test]
    fn test_library_version() {
        assert!(!radeon_adl::version().is_empty());
    }

    #[test]
    fn test_context_lifecycle() {
        {
            let adl = Adl::with_functions(driver(), &AdlConfig::default()).unwrap();
            assert!(!adl.context_handle().is_null());
            assert_eq!(CONTEXTS.with(Cell::get), 1);
        }
        assert_eq!(CONTEXTS.with(Cell::get), 0);
    }

    #[test]
    fn test_gpu_info_collapses_outputs() {
        let adl = Adl::with_functions(driver(), &AdlConfig::default()).unwrap();
        let gpus = radeon_adl::collect_gpu_info(&adl).unwrap();
        assert_eq!(gpus.len(), 1);
        assert_eq!(gpus[0].name, "AMD Radeon RX 7600");
        // the basic version query is missing too, so nothing is filled
        assert_eq!(gpus[0].driver_version, None);
        assert_eq!(gpus[0].sensors.len(), 3);
    }

    #[test]
    fn test_watchdog_recovers_stalled_fan() {
        FAN_STALLED.with(|s| s.set(true));
        let adl = Adl::with_functions(driver(), &AdlConfig::default()).unwrap();
        let mut monitor = Monitor::new(adl, MonitorConfig::quick());

        let report = monitor.check_once().unwrap();
        assert_eq!(report.adapters.len(), 1);
        assert_eq!(report.adapters[0].outcome, Outcome::Recovered);
        assert_eq!(report.adapters[0].sample.and_then(|s| s.fan_rpm), Some(1800));

        let report = monitor.check_once().unwrap();
        assert_eq!(report.adapters[0].outcome, Outcome::Healthy);
    }

    #[test]
    fn test_watchdog_enumerates_adapters_once() {
        FAN_STALLED.with(|s| s.set(false));
        let adl = Adl::with_functions(driver(), &AdlConfig::default()).unwrap();
        let mut monitor = Monitor::new(adl, MonitorConfig::quick().with_samples(4));
        INFO_CALLS.with(|c| c.set(0));

        monitor.run(|_| false).unwrap();
        assert_eq!(monitor.history().len(), 4);
        assert_eq!(INFO_CALLS.with(Cell::get), 1);
    }

    #[test]
    fn test_missing_symbols_and_status_errors() {
        let adl = Adl::with_functions(driver(), &AdlConfig::default()).unwrap();
        assert!(matches!(adl.power_limit(0), Err(AdlError::SymbolNotFound(_))));

        let mut versions = ADLVersionsInfoX2::default();
        let status = unsafe {
            (adl.functions().ADL2_Graphics_VersionsX2_Get.unwrap())(adl.context_handle(), &mut versions)
        };
        assert_eq!(AdlStatus::from(status), AdlStatus::NotSupported);
    }

    #[test]
    #[serial]
    fn test_explicit_library_path_is_reported() {
        let config = AdlConfig::default().with_library("/nonexistent/libatiadlxx.so");
        match Adl::open(&config) {
            Err(AdlError::LibraryLoad { path, .. }) => assert!(path.contains("nonexistent")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("opened a library that does not exist"),
        }
    }

    #[test]
    fn test_cli_help_and_version() {
        // only present when built with the `cli` feature
        let Some(bin) = option_env!("CARGO_BIN_EXE_radeonctl") else {
            return;
        };

        let help = Command::new(bin).arg("--help").output().unwrap();
        assert!(help.status.success());
        let text = String::from_utf8_lossy(&help.stdout);
        for command in ["info", "sensors", "monitor", "overdrive", "symbols"] {
            assert!(text.contains(command), "missing {command} in help");
        }

        let monitor = Command::new(bin).args(["monitor", "--help"]).output().unwrap();
        let text = String::from_utf8_lossy(&monitor.stdout);
        assert!(text.contains("--json-output"));
        assert!(text.contains("--no-alert"));

        let version = Command::new(bin)
            .arg("version")
            .env("ADL_LIBRARY_PATH", "/nonexistent/libatiadlxx.so")
            .output()
            .unwrap();
        assert!(version.status.success());
        assert!(String::from_utf8_lossy(&version.stdout).contains(radeon_adl::VERSION));
    }
}
