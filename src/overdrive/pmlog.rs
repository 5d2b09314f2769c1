//! Performance-metrics log (PMLog) sensor snapshots

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::context::{adl_call, Adl};
use crate::error::AdlResult;
use crate::ffi::ADLPMLogDataOutput;
use crate::mappings::{SensorType, SensorUnit};

/// One sensor value with its unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Sensor
    pub sensor: SensorType,
    /// Raw value in `unit`
    pub value: i32,
    /// Reporting unit
    pub unit: SensorUnit,
}

impl std::fmt::Display for SensorReading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} {}", self.sensor, self.value, self.unit.suffix())
    }
}

/// The supported sensors of one PMLog query
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PmLogSnapshot {
    values: BTreeMap<SensorType, i32>,
}

impl PmLogSnapshot {
    /// Keep the sensors the driver flagged as supported
    pub fn from_output(output: &ADLPMLogDataOutput) -> Self {
        let values = output
            .sensors
            .iter()
            .enumerate()
            .filter(|(_, data)| data.supported != 0)
            .filter_map(|(id, data)| SensorType::from_id(id).map(|sensor| (sensor, data.value)))
            .collect();
        Self { values }
    }

    /// Value of a supported sensor
    pub fn get(&self, sensor: SensorType) -> Option<i32> {
        self.values.get(&sensor).copied()
    }

    /// Whether the sensor was reported
    pub fn contains(&self, sensor: SensorType) -> bool {
        self.values.contains_key(&sensor)
    }

    /// Readings in sensor id order
    pub fn readings(&self) -> Vec<SensorReading> {
        self.values
            .iter()
            .map(|(&sensor, &value)| SensorReading {
                sensor,
                value,
                unit: sensor.unit(),
            })
            .collect()
    }

    /// Number of supported sensors
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no sensor is supported
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(SensorType, i32)> for PmLogSnapshot {
    fn from_iter<I: IntoIterator<Item = (SensorType, i32)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl Adl {
    /// Query every PMLog sensor of an adapter
    pub fn pmlog_snapshot(&self, adapter: i32) -> AdlResult<PmLogSnapshot> {
        let mut output = ADLPMLogDataOutput::default();
        adl_call!(self, ADL2_New_QueryPMLogData_Get(adapter, &mut output))?;
        let snapshot = PmLogSnapshot::from_output(&output);
        log::debug!("Adapter {} reported {} PMLog sensors", adapter, snapshot.len());
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::{AdlFunctions, ADLSingleSensorData, ADL_CONTEXT_HANDLE};
    use crate::testing::fake_adl;
    use pretty_assertions::assert_eq;
    use std::os::raw::c_int;

    unsafe extern "C" fn query(_: ADL_CONTEXT_HANDLE, _: c_int, out: *mut ADLPMLogDataOutput) -> c_int {
        let sensors = &mut (*out).sensors;
        sensors[SensorType::FanRpm.id()] = ADLSingleSensorData { supported: 1, value: 1450 };
        sensors[SensorType::FanPercentage.id()] = ADLSingleSensorData { supported: 1, value: 38 };
        sensors[SensorType::TemperatureHotspot.id()] = ADLSingleSensorData { supported: 1, value: 74 };
        // present but not flagged supported
        sensors[SensorType::TemperatureLiquid.id()] = ADLSingleSensorData { supported: 0, value: 99 };
        0
    }

    #[test]
    fn only_supported_sensors_are_kept() {
        let mut output = ADLPMLogDataOutput::default();
        output.sensors[0] = ADLSingleSensorData { supported: 1, value: 5 };
        output.sensors[200] = ADLSingleSensorData { supported: 1, value: 5 };
        output.sensors[SensorType::ClkGfxclk.id()] = ADLSingleSensorData { supported: 1, value: 2400 };

        let snapshot = PmLogSnapshot::from_output(&output);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get(SensorType::ClkGfxclk), Some(2400));
    }

    #[test]
    fn queries_the_driver() {
        let adl = fake_adl(AdlFunctions {
            ADL2_New_QueryPMLogData_Get: Some(query),
            ..Default::default()
        });
        let snapshot = adl.pmlog_snapshot(0).unwrap();
        assert_eq!(snapshot.get(SensorType::FanRpm), Some(1450));
        assert!(!snapshot.contains(SensorType::TemperatureLiquid));
        let names: Vec<String> = snapshot.readings().iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            vec![
                "Fan speed: 1450 RPM",
                "Fan speed (percent of max): 38 %",
                "Hotspot temperature: 74 \u{00b0}C",
            ]
        );
    }

    #[test]
    fn snapshot_serializes_with_sensor_names() {
        let snapshot: PmLogSnapshot = [(SensorType::FanRpm, 900)].into_iter().collect();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"values":{"FanRpm":900}}"#);
    }
}
