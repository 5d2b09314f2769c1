//! PMLog sensor table
//!
//! Sensor ids index the `sensors` array of `ADLPMLogDataOutput`. Id 0 is
//! reserved by the driver and never carries a reading.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit a PMLog sensor value is reported in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorUnit {
    /// Megahertz
    Mhz,
    /// Degrees Celsius
    Celsius,
    /// Revolutions per minute
    Rpm,
    /// Percent
    Percent,
    /// Millivolts
    Millivolt,
    /// Watts
    Watt,
    /// Amperes
    Ampere,
    /// Raw driver value without a physical unit
    Raw,
}

impl SensorUnit {
    /// Short suffix used when printing values
    pub fn suffix(&self) -> &'static str {
        match self {
            SensorUnit::Mhz => "MHz",
            SensorUnit::Celsius => "\u{00b0}C",
            SensorUnit::Rpm => "RPM",
            SensorUnit::Percent => "%",
            SensorUnit::Millivolt => "mV",
            SensorUnit::Watt => "W",
            SensorUnit::Ampere => "A",
            SensorUnit::Raw => "",
        }
    }
}

macro_rules! sensor_types {
    ($($variant:ident = $id:literal => $name:literal, $unit:ident;)*) => {
        /// A PMLog sensor
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum SensorType {
            $(
                #[doc = $name]
                $variant = $id,
            )*
        }

        impl SensorType {
            /// Every known sensor in id order
            pub const ALL: &'static [SensorType] = &[$(SensorType::$variant),*];

            /// Look up a sensor by its index in the PMLog array
            pub fn from_id(id: usize) -> Option<Self> {
                match id {
                    $($id => Some(SensorType::$variant),)*
                    _ => None,
                }
            }

            /// Index in the PMLog array
            pub fn id(self) -> usize {
                self as usize
            }

            /// Human-readable name
            pub fn name(self) -> &'static str {
                match self {
                    $(SensorType::$variant => $name,)*
                }
            }

            /// Reporting unit
            pub fn unit(self) -> SensorUnit {
                match self {
                    $(SensorType::$variant => SensorUnit::$unit,)*
                }
            }
        }
    };
}

sensor_types! {
    ClkGfxclk = 1 => "Graphics clock", Mhz;
    ClkMemclk = 2 => "Memory clock", Mhz;
    ClkSocclk = 3 => "SoC clock", Mhz;
    ClkUvdclk1 = 4 => "UVD clock 1", Mhz;
    ClkUvdclk2 = 5 => "UVD clock 2", Mhz;
    ClkVceclk = 6 => "VCE clock", Mhz;
    ClkVcnclk = 7 => "VCN clock", Mhz;
    TemperatureEdge = 8 => "Edge temperature", Celsius;
    TemperatureMem = 9 => "Memory temperature", Celsius;
    TemperatureVrvddc = 10 => "VDDC regulator temperature", Celsius;
    TemperatureVrmvdd = 11 => "MVDD regulator temperature", Celsius;
    TemperatureLiquid = 12 => "Liquid temperature", Celsius;
    TemperaturePlx = 13 => "PLX temperature", Celsius;
    FanRpm = 14 => "Fan speed", Rpm;
    FanPercentage = 15 => "Fan speed (percent of max)", Percent;
    SocVoltage = 16 => "SoC voltage", Millivolt;
    SocPower = 17 => "SoC power", Watt;
    SocCurrent = 18 => "SoC current", Ampere;
    InfoActivityGfx = 19 => "Graphics activity", Percent;
    InfoActivityMem = 20 => "Memory activity", Percent;
    GfxVoltage = 21 => "Graphics voltage", Millivolt;
    MemVoltage = 22 => "Memory voltage", Millivolt;
    AsicPower = 23 => "ASIC power", Watt;
    TemperatureVrsoc = 24 => "SoC regulator temperature", Celsius;
    TemperatureVrmvdd0 = 25 => "MVDD0 regulator temperature", Celsius;
    TemperatureVrmvdd1 = 26 => "MVDD1 regulator temperature", Celsius;
    TemperatureHotspot = 27 => "Hotspot temperature", Celsius;
    TemperatureGfx = 28 => "Graphics temperature", Celsius;
    TemperatureSoc = 29 => "SoC temperature", Celsius;
    GfxPower = 30 => "Graphics power", Watt;
    GfxCurrent = 31 => "Graphics current", Ampere;
    TemperatureCpu = 32 => "CPU temperature", Celsius;
    CpuPower = 33 => "CPU power", Watt;
    ClkCpuclk = 34 => "CPU clock", Mhz;
    ThrottlerStatus = 35 => "Throttler status", Raw;
    ClkVcn1clk1 = 36 => "VCN1 clock 1", Mhz;
    ClkVcn1clk2 = 37 => "VCN1 clock 2", Mhz;
    SmartPowershiftCpu = 38 => "SmartShift CPU", Raw;
    SmartPowershiftDgpu = 39 => "SmartShift dGPU", Raw;
    BusSpeed = 40 => "Bus speed", Raw;
    BusLanes = 41 => "Bus lanes", Raw;
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SensorType::FanRpm, 14, SensorUnit::Rpm)]
    #[case(SensorType::FanPercentage, 15, SensorUnit::Percent)]
    #[case(SensorType::TemperatureHotspot, 27, SensorUnit::Celsius)]
    #[case(SensorType::ClkGfxclk, 1, SensorUnit::Mhz)]
    #[case(SensorType::BusLanes, 41, SensorUnit::Raw)]
    fn ids_and_units(#[case] sensor: SensorType, #[case] id: usize, #[case] unit: SensorUnit) {
        assert_eq!(sensor.id(), id);
        assert_eq!(sensor.unit(), unit);
        assert_eq!(SensorType::from_id(id), Some(sensor));
    }

    #[test]
    fn table_is_contiguous() {
        assert_eq!(SensorType::ALL.len(), 41);
        for (offset, sensor) in SensorType::ALL.iter().enumerate() {
            assert_eq!(sensor.id(), offset + 1);
        }
        assert_eq!(SensorType::from_id(0), None);
        assert_eq!(SensorType::from_id(42), None);
    }
}
