//! Fan watchdog over PMLog sensors
//!
//! Some drivers report a fan speed of 65535 RPM when the fan controller
//! stalls. The watchdog samples every adapter, resets OverdriveN fan control
//! to its defaults when it sees that value, and samples again to confirm.
//! An [`Alert`] is raised for every fan still stalled after the reset.

mod watchdog;

pub use watchdog::{AdapterReport, CheckReport, Monitor, Outcome};

use std::io::Write;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::context::Adl;
use crate::error::AdlResult;
use crate::mappings::SensorType;

/// Fan speed the driver reports for a stalled controller
pub const STALLED_FAN_RPM: i32 = 65535;

/// Fan and hotspot readings of one adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FanSample {
    /// Adapter index
    pub adapter: i32,
    /// Fan speed in RPM
    pub fan_rpm: Option<i32>,
    /// Fan speed in percent of maximum
    pub fan_percent: Option<i32>,
    /// Hotspot temperature in degrees Celsius
    pub hotspot_c: Option<i32>,
}

impl FanSample {
    /// Whether the fan reading matches the stall value
    pub fn is_stalled(&self, stall_rpm: i32) -> bool {
        self.fan_rpm == Some(stall_rpm)
    }
}

impl std::fmt::Display for FanSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn field(value: Option<i32>) -> String {
            value.map_or_else(|| "-".to_string(), |v| v.to_string())
        }
        write!(
            f,
            "Fan speed: {:>5} RPM ({:>4}% max) | Temp: {:>3} \u{00b0}C",
            field(self.fan_rpm),
            field(self.fan_percent),
            field(self.hotspot_c)
        )
    }
}

/// Where the watchdog reads sensors from
#[cfg_attr(test, mockall::automock)]
pub trait SensorSource {
    /// Adapter indexes to watch
    fn adapters(&self) -> AdlResult<Vec<i32>>;

    /// Read the fan and hotspot sensors of one adapter
    fn sample(&self, adapter: i32) -> AdlResult<FanSample>;

    /// Return fan control to its defaults
    fn reset_fan(&self, adapter: i32) -> AdlResult<()>;
}

impl SensorSource for Adl {
    fn adapters(&self) -> AdlResult<Vec<i32>> {
        Ok(self
            .active_amd_adapters()?
            .into_iter()
            .map(|adapter| adapter.index)
            .collect())
    }

    fn sample(&self, adapter: i32) -> AdlResult<FanSample> {
        let snapshot = self.pmlog_snapshot(adapter)?;
        Ok(FanSample {
            adapter,
            fan_rpm: snapshot.get(SensorType::FanRpm),
            fan_percent: snapshot.get(SensorType::FanPercentage),
            hotspot_c: snapshot.get(SensorType::TemperatureHotspot),
        })
    }

    fn reset_fan(&self, adapter: i32) -> AdlResult<()> {
        self.reset_fan_control(adapter)
    }
}

/// Raised when resetting fan control did not clear a stall
#[cfg_attr(test, mockall::automock)]
pub trait Alert {
    /// Notify about one adapter whose fan is still stalled
    fn raise(&self, sample: &FanSample) -> AdlResult<()>;
}

/// Rings the terminal bell and prints the stalled reading to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl Alert for TerminalBell {
    fn raise(&self, sample: &FanSample) -> AdlResult<()> {
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "\x07Adapter {} fan still stalled: {}", sample.adapter, sample)?;
        stderr.flush()?;
        Ok(())
    }
}

/// Watchdog configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Time between checks
    pub interval: Duration,
    /// Fan reading treated as a stall
    pub stall_rpm: i32,
    /// Stop after this many checks; `None` runs until stopped
    pub samples: Option<u32>,
    /// Reports kept in memory; the oldest is dropped past this
    pub history_limit: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            stall_rpm: STALLED_FAN_RPM,
            samples: None,
            history_limit: 4096,
        }
    }
}

impl MonitorConfig {
    /// A single immediate check
    pub fn quick() -> Self {
        Self {
            interval: Duration::ZERO,
            samples: Some(1),
            ..Self::default()
        }
    }

    /// Set the check interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Limit the number of checks
    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = Some(samples);
        self
    }

    /// Cap the number of reports kept
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::{AdlFunctions, ADLPMLogDataOutput, ADLSingleSensorData, ADL_CONTEXT_HANDLE};
    use crate::testing::fake_adl;
    use std::os::raw::c_int;

    unsafe extern "C" fn stalled(_: ADL_CONTEXT_HANDLE, _: c_int, out: *mut ADLPMLogDataOutput) -> c_int {
        (*out).sensors[SensorType::FanRpm.id()] = ADLSingleSensorData { supported: 1, value: 65535 };
        (*out).sensors[SensorType::TemperatureHotspot.id()] = ADLSingleSensorData { supported: 1, value: 81 };
        0
    }

    #[test]
    fn adl_samples_fan_sensors() {
        let adl = fake_adl(AdlFunctions {
            ADL2_New_QueryPMLogData_Get: Some(stalled),
            ..Default::default()
        });
        let sample = adl.sample(1).unwrap();
        assert_eq!(sample.adapter, 1);
        assert_eq!(sample.fan_percent, None);
        assert_eq!(sample.hotspot_c, Some(81));
        assert!(sample.is_stalled(STALLED_FAN_RPM));
    }

    #[test]
    fn display_marks_missing_values() {
        let sample = FanSample {
            adapter: 0,
            fan_rpm: Some(1200),
            fan_percent: None,
            hotspot_c: Some(65),
        };
        assert_eq!(sample.to_string(), "Fan speed:  1200 RPM (   -% max) | Temp:  65 \u{00b0}C");
    }

    #[test]
    fn quick_config_runs_once() {
        let config = MonitorConfig::quick();
        assert_eq!(config.samples, Some(1));
        assert_eq!(config.stall_rpm, 65535);
        assert_eq!(MonitorConfig::default().interval, Duration::from_secs(2));
        assert_eq!(MonitorConfig::default().history_limit, 4096);
    }

    #[test]
    fn terminal_bell_writes_to_stderr() {
        let sample = FanSample {
            adapter: 0,
            fan_rpm: Some(STALLED_FAN_RPM),
            ..Default::default()
        };
        assert!(TerminalBell.raise(&sample).is_ok());
    }
}
