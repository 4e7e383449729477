//! Settings for a delay filter run.
//!
//! `FilterSettings` carries every parameter of the pipeline. It derives `Serialize` and
//! `Deserialize` so a host application can store it next to its own configuration.

use crate::data::DelayPatch;
use crate::error::DelayFilterError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The weight operator applied to the data before the transform.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
pub enum WeightsMode {
    /// Identity, only flagged channels are zeroed (`"I"`).
    #[serde(rename = "I")]
    Identity,
    /// Delay suppression through the cached filter matrix (`"WTL"`).
    #[default]
    #[serde(rename = "WTL")]
    Wtl,
}

impl Display for WeightsMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WeightsMode::Identity => write!(f, "I"),
            WeightsMode::Wtl => write!(f, "WTL"),
        }
    }
}

impl FromStr for WeightsMode {
    type Err = DelayFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "I" => Ok(WeightsMode::Identity),
            "WTL" => Ok(WeightsMode::Wtl),
            other => Err(DelayFilterError::UnsupportedWeights(other.to_string())),
        }
    }
}

/// Domain of the returned axis and values.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputDomain {
    /// Filtered spectrum on the original frequency axis.
    Frequency,
    /// Shifted delay transform, zero delay in the middle.
    #[default]
    Delay,
}

impl Display for OutputDomain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputDomain::Frequency => write!(f, "frequency"),
            OutputDomain::Delay => write!(f, "delay"),
        }
    }
}

impl FromStr for OutputDomain {
    type Err = DelayFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "frequency" => Ok(OutputDomain::Frequency),
            "delay" => Ok(OutputDomain::Delay),
            _ => Err(DelayFilterError::UnsupportedOutputDomain(s.to_string())),
        }
    }
}

/// Parameters of a delay filter run.
///
/// # Fields
/// - `filter_factor`: Suppression factor for the delay patches. Non-positive values disable
///   suppression in continuous mode.
/// - `patches`: Delay windows to suppress.
/// - `weights`: Weight operator, see [`WeightsMode`].
/// - `zero_flags`: Zero flagged channels even when not filtering.
/// - `output_domain`: Domain of the result, see [`OutputDomain`].
/// - `taper`: Name of the tapering window, resolved by a [`crate::WindowGenerator`].
/// - `discrete`: Build the filter from a diagonal in the discrete delay basis.
/// - `spacing_rtol`: Relative tolerance for the uniform channel spacing check.
/// - `pinv_rcond`: Relative cutoff for small singular values, `None` uses `nf * f64::EPSILON`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub filter_factor: f64,
    pub patches: Vec<DelayPatch>,
    pub weights: WeightsMode,
    pub zero_flags: bool,
    pub output_domain: OutputDomain,
    pub taper: String,
    pub discrete: bool,
    pub spacing_rtol: f64,
    pub pinv_rcond: Option<f64>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        FilterSettings {
            filter_factor: 1e-6,
            patches: vec![DelayPatch::new(0.0, 100e-9)],
            weights: WeightsMode::Wtl,
            zero_flags: true,
            output_domain: OutputDomain::Delay,
            taper: "boxcar".to_string(),
            discrete: false,
            spacing_rtol: 1e-6,
            pinv_rcond: None,
        }
    }
}

impl FilterSettings {
    pub fn with_filter_factor(mut self, filter_factor: f64) -> Self {
        self.filter_factor = filter_factor;
        self
    }

    pub fn with_patches(mut self, patches: Vec<DelayPatch>) -> Self {
        self.patches = patches;
        self
    }

    pub fn with_weights(mut self, weights: WeightsMode) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_zero_flags(mut self, zero_flags: bool) -> Self {
        self.zero_flags = zero_flags;
        self
    }

    pub fn with_output_domain(mut self, output_domain: OutputDomain) -> Self {
        self.output_domain = output_domain;
        self
    }

    pub fn with_taper(mut self, taper: impl Into<String>) -> Self {
        self.taper = taper.into();
        self
    }

    pub fn with_discrete(mut self, discrete: bool) -> Self {
        self.discrete = discrete;
        self
    }

    pub fn with_pinv_rcond(mut self, rcond: f64) -> Self {
        self.pinv_rcond = Some(rcond);
        self
    }
}
