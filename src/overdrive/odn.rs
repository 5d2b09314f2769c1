//! OverdriveN clock, fan, power and temperature tuning

use std::mem::size_of;
use std::os::raw::c_int;

use serde::{Deserialize, Serialize};

use crate::context::{adl_call, Adl};
use crate::error::{AdlError, AdlResult};
use crate::ffi::*;

/// A tunable range with its step and default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OdnRange {
    /// Control mode the range applies to
    pub mode: i32,
    /// Lower bound
    pub min: i32,
    /// Upper bound
    pub max: i32,
    /// Granularity
    pub step: i32,
    /// Default value
    pub default: i32,
}

impl OdnRange {
    /// Whether `value` lies within `[min, max]`
    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// An all-zero range means the driver does not expose the setting
    pub fn is_empty(&self) -> bool {
        self.min == 0 && self.max == 0
    }
}

impl From<ADLODNParameterRange> for OdnRange {
    fn from(range: ADLODNParameterRange) -> Self {
        Self {
            mode: range.iMode,
            min: range.iMin,
            max: range.iMax,
            step: range.iStep,
            default: range.iDefault,
        }
    }
}

/// OverdriveN limits of an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OdnCapabilities {
    /// Number of performance levels per clock domain
    pub max_levels: i32,
    /// Engine clock range, 10 kHz units
    pub engine_clock: OdnRange,
    /// Memory clock range, 10 kHz units
    pub memory_clock: OdnRange,
    /// Core voltage range, mV
    pub vddc: OdnRange,
    /// Power limit adjustment, percent
    pub power: OdnRange,
    /// PowerTune temperature target, °C
    pub power_tune_temperature: OdnRange,
    /// Fan target temperature, °C
    pub fan_temperature: OdnRange,
    /// Fan speed, RPM
    pub fan_speed: OdnRange,
    /// Minimum performance clock, 10 kHz units
    pub min_performance_clock: OdnRange,
}

/// One performance level of a clock domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PerformanceLevel {
    /// Clock in 10 kHz units
    pub clock: i32,
    /// Voltage in mV
    pub vddc: i32,
    /// Whether the level is in use
    pub enabled: bool,
}

/// Performance levels of a clock domain
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PerformanceLevels {
    /// `ODNControlType_*` mode
    pub mode: i32,
    /// Levels from lowest to highest
    pub levels: Vec<PerformanceLevel>,
}

const HEADER_WORDS: usize = 3;
const LEVEL_WORDS: usize = size_of::<ADLODNPerformanceLevel>() / size_of::<c_int>();

/// `ADLODNPerformanceLevels` with room for a runtime number of levels
///
/// The vendor struct ends in a one-element array; the driver writes as many
/// entries as `iSize` allows. Backed by `c_int` words so the allocation has
/// the struct's alignment.
pub struct LevelsBuffer {
    words: Vec<c_int>,
}

impl LevelsBuffer {
    /// Room for `count` levels (at least one)
    pub fn new(count: usize) -> Self {
        let count = count.max(1);
        let mut words = vec![0; HEADER_WORDS + count * LEVEL_WORDS];
        words[0] = (words.len() * size_of::<c_int>()) as c_int;
        words[2] = count as c_int;
        Self { words }
    }

    /// Buffer holding `levels`, ready to pass to a set call
    pub fn from_levels(levels: &PerformanceLevels) -> Self {
        let mut buffer = Self::new(levels.levels.len());
        buffer.words[1] = levels.mode;
        buffer.words[2] = levels.levels.len() as c_int;
        for (i, level) in levels.levels.iter().enumerate() {
            let at = HEADER_WORDS + i * LEVEL_WORDS;
            buffer.words[at] = level.clock;
            buffer.words[at + 1] = level.vddc;
            buffer.words[at + 2] = level.enabled as c_int;
        }
        buffer
    }

    /// Value written to `iSize`
    pub fn byte_size(&self) -> usize {
        self.words.len() * size_of::<c_int>()
    }

    /// Number of levels the buffer has room for
    pub fn capacity(&self) -> usize {
        (self.words.len() - HEADER_WORDS) / LEVEL_WORDS
    }

    pub(crate) fn set_mode(&mut self, mode: i32) {
        self.words[1] = mode;
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut ADLODNPerformanceLevels {
        self.words.as_mut_ptr() as *mut ADLODNPerformanceLevels
    }

    /// Decode the header and levels, clamping the level count to the capacity
    pub fn levels(&self) -> PerformanceLevels {
        let count = (self.words[2].max(0) as usize).min(self.capacity());
        let levels = (0..count)
            .map(|i| {
                let at = HEADER_WORDS + i * LEVEL_WORDS;
                PerformanceLevel {
                    clock: self.words[at],
                    vddc: self.words[at + 1],
                    enabled: self.words[at + 2] != 0,
                }
            })
            .collect();
        PerformanceLevels {
            mode: self.words[1],
            levels,
        }
    }
}

/// Fan control state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FanControl {
    /// `ODNControlType_*` mode
    pub mode: i32,
    /// Fan control mode
    pub fan_control_mode: i32,
    /// Whether `current_speed` is in RPM or percent
    pub current_speed_mode: i32,
    /// Current fan speed
    pub current_speed: i32,
    /// Target fan speed
    pub target_speed: i32,
    /// Target temperature, °C
    pub target_temperature: i32,
    /// Minimum performance clock
    pub min_performance_clock: i32,
    /// Minimum fan limit
    pub min_fan_limit: i32,
}

impl From<ADLODNFanControl> for FanControl {
    fn from(fan: ADLODNFanControl) -> Self {
        Self {
            mode: fan.iMode,
            fan_control_mode: fan.iFanControlMode,
            current_speed_mode: fan.iCurrentFanSpeedMode,
            current_speed: fan.iCurrentFanSpeed,
            target_speed: fan.iTargetFanSpeed,
            target_temperature: fan.iTargetTemperature,
            min_performance_clock: fan.iMinPerformanceClock,
            min_fan_limit: fan.iMinFanLimit,
        }
    }
}

impl From<FanControl> for ADLODNFanControl {
    fn from(fan: FanControl) -> Self {
        Self {
            iMode: fan.mode,
            iFanControlMode: fan.fan_control_mode,
            iCurrentFanSpeedMode: fan.current_speed_mode,
            iCurrentFanSpeed: fan.current_speed,
            iTargetFanSpeed: fan.target_speed,
            iTargetTemperature: fan.target_temperature,
            iMinPerformanceClock: fan.min_performance_clock,
            iMinFanLimit: fan.min_fan_limit,
        }
    }
}

/// Power limit settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PowerLimit {
    /// `ODNControlType_*` mode
    pub mode: i32,
    /// TDP limit adjustment, percent
    pub tdp_limit: i32,
    /// Maximum operating temperature, °C
    pub max_operating_temperature: i32,
}

/// Temperature sensor selector for [`Adl::temperature`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureKind {
    /// GPU core (edge)
    Core,
    /// Memory
    Memory,
    /// Core voltage regulator
    VrmCore,
    /// Memory voltage regulator
    VrmMemory,
    /// Liquid cooling loop
    Liquid,
    /// PLX bridge
    Plx,
    /// Junction hotspot
    Hotspot,
}

impl TemperatureKind {
    fn raw(self) -> c_int {
        match self {
            TemperatureKind::Core => ODNTemperatureType_Core,
            TemperatureKind::Memory => ODNTemperatureType_Memory,
            TemperatureKind::VrmCore => ODNTemperatureType_VrmCore,
            TemperatureKind::VrmMemory => ODNTemperatureType_VrmMemory,
            TemperatureKind::Liquid => ODNTemperatureType_Liquid,
            TemperatureKind::Plx => ODNTemperatureType_Plx,
            TemperatureKind::Hotspot => ODNTemperatureType_Hotspot,
        }
    }
}

/// Current clocks, activity and bus state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct PerformanceStatus {
    pub core_clock: i32,
    pub memory_clock: i32,
    pub dcef_clock: i32,
    pub gfx_clock: i32,
    pub uvd_clock: i32,
    pub vce_clock: i32,
    pub gpu_activity_percent: i32,
    pub core_level: i32,
    pub memory_level: i32,
    pub dcef_level: i32,
    pub gfx_level: i32,
    pub uvd_level: i32,
    pub vce_level: i32,
    pub bus_speed: i32,
    pub bus_lanes: i32,
    pub max_bus_lanes: i32,
    pub vddc: i32,
    pub vddci: i32,
}

impl From<ADLODNPerformanceStatus> for PerformanceStatus {
    fn from(s: ADLODNPerformanceStatus) -> Self {
        Self {
            core_clock: s.iCoreClock,
            memory_clock: s.iMemoryClock,
            dcef_clock: s.iDCEFClock,
            gfx_clock: s.iGFXClock,
            uvd_clock: s.iUVDClock,
            vce_clock: s.iVCEClock,
            gpu_activity_percent: s.iGPUActivityPercent,
            core_level: s.iCurrentCorePerformanceLevel,
            memory_level: s.iCurrentMemoryPerformanceLevel,
            dcef_level: s.iCurrentDCEFPerformanceLevel,
            gfx_level: s.iCurrentGFXPerformanceLevel,
            uvd_level: s.iUVDPerformanceLevel,
            vce_level: s.iVCEPerformanceLevel,
            bus_speed: s.iCurrentBusSpeed,
            bus_lanes: s.iCurrentBusLanes,
            max_bus_lanes: s.iMaximumBusLanes,
            vddc: s.iVDDC,
            vddci: s.iVDDCI,
        }
    }
}

/// Zero-RPM fan stop state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZeroRpm {
    /// Whether the adapter supports stopping the fan at idle
    pub supported: bool,
    /// Current setting
    pub enabled: bool,
    /// Driver default
    pub default: bool,
}

fn validate_levels(domain: &str, levels: &PerformanceLevels, clock: &OdnRange, vddc: &OdnRange) -> AdlResult<()> {
    for (i, level) in levels.levels.iter().enumerate() {
        if !clock.contains(level.clock) {
            return Err(AdlError::InvalidParameter(format!(
                "{domain} level {i} clock {} outside [{}, {}]",
                level.clock, clock.min, clock.max
            )));
        }
        if !vddc.is_empty() && !vddc.contains(level.vddc) {
            return Err(AdlError::InvalidParameter(format!(
                "{domain} level {i} voltage {} outside [{}, {}]",
                level.vddc, vddc.min, vddc.max
            )));
        }
    }
    Ok(())
}

impl Adl {
    /// OverdriveN limits
    pub fn odn_capabilities(&self, adapter: i32) -> AdlResult<OdnCapabilities> {
        let mut caps = ADLODNCapabilities::default();
        adl_call!(self, ADL2_OverdriveN_Capabilities_Get(adapter, &mut caps))?;
        Ok(OdnCapabilities {
            max_levels: caps.iMaximumNumberOfPerformanceLevels,
            engine_clock: caps.sEngineClockRange.into(),
            memory_clock: caps.sMemoryClockRange.into(),
            vddc: caps.svddcRange.into(),
            power: caps.power.into(),
            power_tune_temperature: caps.powerTuneTemperature.into(),
            fan_temperature: caps.fanTemperature.into(),
            fan_speed: caps.fanSpeed.into(),
            min_performance_clock: caps.minimumPerformanceClock.into(),
        })
    }

    fn level_count(&self, adapter: i32) -> AdlResult<usize> {
        Ok(self.odn_capabilities(adapter)?.max_levels.max(1) as usize)
    }

    /// Engine clock performance levels
    pub fn system_clocks(&self, adapter: i32) -> AdlResult<PerformanceLevels> {
        let mut buffer = LevelsBuffer::new(self.level_count(adapter)?);
        buffer.set_mode(ODNControlType_Current);
        adl_call!(self, ADL2_OverdriveN_SystemClocks_Get(adapter, buffer.as_mut_ptr()))?;
        Ok(buffer.levels())
    }

    /// Write engine clock levels after checking them against the capability ranges
    pub fn set_system_clocks(&self, adapter: i32, levels: &PerformanceLevels) -> AdlResult<()> {
        let caps = self.odn_capabilities(adapter)?;
        validate_levels("engine", levels, &caps.engine_clock, &caps.vddc)?;
        let mut buffer = LevelsBuffer::from_levels(levels);
        adl_call!(self, ADL2_OverdriveN_SystemClocks_Set(adapter, buffer.as_mut_ptr()))?;
        Ok(())
    }

    /// Memory clock performance levels
    pub fn memory_clocks(&self, adapter: i32) -> AdlResult<PerformanceLevels> {
        let mut buffer = LevelsBuffer::new(self.level_count(adapter)?);
        buffer.set_mode(ODNControlType_Current);
        adl_call!(self, ADL2_OverdriveN_MemoryClocks_Get(adapter, buffer.as_mut_ptr()))?;
        Ok(buffer.levels())
    }

    /// Write memory clock levels after checking them against the capability ranges
    pub fn set_memory_clocks(&self, adapter: i32, levels: &PerformanceLevels) -> AdlResult<()> {
        let caps = self.odn_capabilities(adapter)?;
        validate_levels("memory", levels, &caps.memory_clock, &caps.vddc)?;
        let mut buffer = LevelsBuffer::from_levels(levels);
        adl_call!(self, ADL2_OverdriveN_MemoryClocks_Set(adapter, buffer.as_mut_ptr()))?;
        Ok(())
    }

    /// Current fan control state
    pub fn fan_control(&self, adapter: i32) -> AdlResult<FanControl> {
        let mut fan = ADLODNFanControl::default();
        adl_call!(self, ADL2_OverdriveN_FanControl_Get(adapter, &mut fan))?;
        Ok(fan.into())
    }

    /// Write fan control state
    pub fn set_fan_control(&self, adapter: i32, fan: FanControl) -> AdlResult<()> {
        let mut raw: ADLODNFanControl = fan.into();
        adl_call!(self, ADL2_OverdriveN_FanControl_Set(adapter, &mut raw))?;
        Ok(())
    }

    /// Hand fan control back to the driver defaults
    ///
    /// Clears a stuck fan reading on boards where the fan controller
    /// stops reporting after a manual override.
    pub fn reset_fan_control(&self, adapter: i32) -> AdlResult<()> {
        let mut fan = self.fan_control(adapter)?;
        fan.mode = ODNControlType_Default;
        self.set_fan_control(adapter, fan)?;
        log::info!("Fan control on adapter {} reset to defaults", adapter);
        Ok(())
    }

    /// Current power limit
    pub fn power_limit(&self, adapter: i32) -> AdlResult<PowerLimit> {
        let mut limit = ADLODNPowerLimitSetting::default();
        adl_call!(self, ADL2_OverdriveN_PowerLimit_Get(adapter, &mut limit))?;
        Ok(PowerLimit {
            mode: limit.iMode,
            tdp_limit: limit.iTDPLimit,
            max_operating_temperature: limit.iMaxOperatingTemperature,
        })
    }

    /// Write the power limit
    pub fn set_power_limit(&self, adapter: i32, limit: PowerLimit) -> AdlResult<()> {
        let mut raw = ADLODNPowerLimitSetting {
            iMode: limit.mode,
            iTDPLimit: limit.tdp_limit,
            iMaxOperatingTemperature: limit.max_operating_temperature,
        };
        adl_call!(self, ADL2_OverdriveN_PowerLimit_Set(adapter, &mut raw))?;
        Ok(())
    }

    /// Temperature in °C; the driver reports millidegrees
    pub fn temperature(&self, adapter: i32, kind: TemperatureKind) -> AdlResult<f64> {
        let mut millidegrees: c_int = 0;
        adl_call!(
            self,
            ADL2_OverdriveN_Temperature_Get(adapter, kind.raw(), &mut millidegrees)
        )?;
        Ok(f64::from(millidegrees) / 1000.0)
    }

    /// Live clocks, activity and bus state
    pub fn performance_status(&self, adapter: i32) -> AdlResult<PerformanceStatus> {
        let mut status = ADLODNPerformanceStatus::default();
        adl_call!(self, ADL2_OverdriveN_PerformanceStatus_Get(adapter, &mut status))?;
        Ok(status.into())
    }

    /// Zero-RPM fan stop support and setting
    pub fn zero_rpm(&self, adapter: i32) -> AdlResult<ZeroRpm> {
        let (mut support, mut current, mut default): (c_int, c_int, c_int) = (0, 0, 0);
        adl_call!(
            self,
            ADL2_OverdriveN_ZeroRPMFan_Get(adapter, &mut support, &mut current, &mut default)
        )?;
        Ok(ZeroRpm {
            supported: support != 0,
            enabled: current != 0,
            default: default != 0,
        })
    }

    /// Enable or disable zero-RPM fan stop
    pub fn set_zero_rpm(&self, adapter: i32, enabled: bool) -> AdlResult<()> {
        if !self.zero_rpm(adapter)?.supported {
            return Err(AdlError::Unsupported("zero RPM fan stop"));
        }
        adl_call!(self, ADL2_OverdriveN_ZeroRPMFan_Set(adapter, enabled as c_int))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fake_adl;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    thread_local! {
        static FAN_MODE: Cell<c_int> = const { Cell::new(-1) };
    }

    unsafe extern "C" fn caps(_: ADL_CONTEXT_HANDLE, _: c_int, caps: *mut ADLODNCapabilities) -> c_int {
        (*caps).iMaximumNumberOfPerformanceLevels = 3;
        (*caps).sEngineClockRange = ADLODNParameterRange {
            iMin: 50_000,
            iMax: 250_000,
            ..Default::default()
        };
        0
    }

    unsafe extern "C" fn system_clocks(_: ADL_CONTEXT_HANDLE, _: c_int, levels: *mut ADLODNPerformanceLevels) -> c_int {
        let capacity = ((*levels).iSize as usize - 3 * size_of::<c_int>()) / size_of::<ADLODNPerformanceLevel>();
        if capacity < 3 || (*levels).iNumberOfPerformanceLevels != 3 {
            return -4;
        }
        let entries = std::ptr::addr_of_mut!((*levels).aLevels) as *mut ADLODNPerformanceLevel;
        for i in 0..3 {
            *entries.add(i) = ADLODNPerformanceLevel {
                iClock: 80_000 + i as c_int * 60_000,
                iVddc: 800 + i as c_int * 100,
                iEnabled: 1,
            };
        }
        0
    }

    unsafe extern "C" fn fan_get(_: ADL_CONTEXT_HANDLE, _: c_int, fan: *mut ADLODNFanControl) -> c_int {
        (*fan).iMode = ODNControlType_Manual;
        (*fan).iCurrentFanSpeed = 65535;
        0
    }

    unsafe extern "C" fn fan_set(_: ADL_CONTEXT_HANDLE, _: c_int, fan: *mut ADLODNFanControl) -> c_int {
        FAN_MODE.with(|mode| mode.set((*fan).iMode));
        0
    }

    unsafe extern "C" fn temperature(_: ADL_CONTEXT_HANDLE, _: c_int, kind: c_int, value: *mut c_int) -> c_int {
        if kind != ODNTemperatureType_Hotspot {
            return -3;
        }
        *value = 71_500;
        0
    }

    #[test]
    fn levels_buffer_is_sized_for_every_level() {
        let buffer = LevelsBuffer::new(8);
        assert_eq!(buffer.capacity(), 8);
        assert_eq!(buffer.byte_size(), 3 * 4 + 8 * 12);
        assert_eq!(buffer.levels().levels.len(), 8);
        // never smaller than the declared struct
        assert!(LevelsBuffer::new(0).byte_size() >= size_of::<ADLODNPerformanceLevels>());
    }

    #[test]
    fn levels_buffer_round_trip() {
        let levels = PerformanceLevels {
            mode: ODNControlType_Manual,
            levels: vec![
                PerformanceLevel { clock: 85_200, vddc: 800, enabled: true },
                PerformanceLevel { clock: 199_100, vddc: 1150, enabled: false },
            ],
        };
        assert_eq!(LevelsBuffer::from_levels(&levels).levels(), levels);
    }

    #[test]
    fn system_clocks_use_the_capability_level_count() {
        let adl = fake_adl(AdlFunctions {
            ADL2_OverdriveN_Capabilities_Get: Some(caps),
            ADL2_OverdriveN_SystemClocks_Get: Some(system_clocks),
            ..Default::default()
        });
        let levels = adl.system_clocks(0).unwrap();
        let clocks: Vec<i32> = levels.levels.iter().map(|l| l.clock).collect();
        assert_eq!(clocks, vec![80_000, 140_000, 200_000]);
    }

    #[test]
    fn clocks_outside_the_range_are_rejected() {
        let adl = fake_adl(AdlFunctions {
            ADL2_OverdriveN_Capabilities_Get: Some(caps),
            ..Default::default()
        });
        let levels = PerformanceLevels {
            mode: ODNControlType_Manual,
            levels: vec![PerformanceLevel { clock: 300_000, vddc: 0, enabled: true }],
        };
        let err = adl.set_system_clocks(0, &levels).unwrap_err();
        assert!(matches!(err, AdlError::InvalidParameter(_)));
    }

    #[test]
    fn reset_writes_default_mode() {
        let adl = fake_adl(AdlFunctions {
            ADL2_OverdriveN_FanControl_Get: Some(fan_get),
            ADL2_OverdriveN_FanControl_Set: Some(fan_set),
            ..Default::default()
        });
        adl.reset_fan_control(0).unwrap();
        assert_eq!(FAN_MODE.with(Cell::get), ODNControlType_Default);
    }

    #[test]
    fn temperature_is_converted_from_millidegrees() {
        let adl = fake_adl(AdlFunctions {
            ADL2_OverdriveN_Temperature_Get: Some(temperature),
            ..Default::default()
        });
        assert_eq!(adl.temperature(0, TemperatureKind::Hotspot).unwrap(), 71.5);
        assert!(adl.temperature(0, TemperatureKind::Core).is_err());
    }
}
