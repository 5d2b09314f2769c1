//! Controller colour (gamma)

use serde::{Deserialize, Serialize};

use crate::context::{adl_call, Adl};
use crate::error::{AdlError, AdlResult};
use crate::ffi::ADLGamma;

/// Per-channel gamma
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Gamma {
    /// Red channel
    pub red: f32,
    /// Green channel
    pub green: f32,
    /// Blue channel
    pub blue: f32,
}

impl Gamma {
    /// The same value on every channel
    pub fn uniform(value: f32) -> Self {
        Self {
            red: value,
            green: value,
            blue: value,
        }
    }

    fn channels(&self) -> [(&'static str, f32); 3] {
        [("red", self.red), ("green", self.green), ("blue", self.blue)]
    }
}

impl From<ADLGamma> for Gamma {
    fn from(gamma: ADLGamma) -> Self {
        Self {
            red: gamma.fRed,
            green: gamma.fGreen,
            blue: gamma.fBlue,
        }
    }
}

impl From<Gamma> for ADLGamma {
    fn from(gamma: Gamma) -> Self {
        Self {
            fRed: gamma.red,
            fGreen: gamma.green,
            fBlue: gamma.blue,
        }
    }
}

/// Current gamma with the driver's default and limits
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GammaRange {
    /// Value in effect
    pub current: Gamma,
    /// Driver default
    pub default: Gamma,
    /// Lower bound per channel
    pub min: Gamma,
    /// Upper bound per channel
    pub max: Gamma,
}

impl GammaRange {
    /// Reject `gamma` when any channel lies outside `[min, max]`
    pub fn validate(&self, gamma: &Gamma) -> AdlResult<()> {
        let bounds = self.min.channels().into_iter().zip(self.max.channels());
        for ((channel, value), ((_, min), (_, max))) in gamma.channels().into_iter().zip(bounds) {
            if !(min..=max).contains(&value) {
                return Err(AdlError::InvalidParameter(format!(
                    "{channel} gamma {value} outside [{min}, {max}]"
                )));
            }
        }
        Ok(())
    }
}

impl Adl {
    /// Gamma of one display controller
    pub fn gamma(&self, adapter: i32, controller: i32) -> AdlResult<GammaRange> {
        let mut current = ADLGamma::default();
        let mut default = ADLGamma::default();
        let mut min = ADLGamma::default();
        let mut max = ADLGamma::default();
        adl_call!(
            self,
            ADL2_Controller_Color_Get(
                adapter,
                controller,
                &mut current,
                &mut default,
                &mut min,
                &mut max,
            )
        )?;
        Ok(GammaRange {
            current: current.into(),
            default: default.into(),
            min: min.into(),
            max: max.into(),
        })
    }

    /// Set controller gamma after checking it against the driver's limits
    pub fn set_gamma(&self, adapter: i32, controller: i32, gamma: Gamma) -> AdlResult<()> {
        self.gamma(adapter, controller)?.validate(&gamma)?;
        adl_call!(self, ADL2_Controller_Color_Set(adapter, controller, gamma.into()))?;
        log::debug!("Gamma on {}/{} set to {:?}", adapter, controller, gamma);
        Ok(())
    }
}
