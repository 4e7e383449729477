//! Delay-domain filtering of channelized complex spectra.
//!
//! Given a uniformly spaced frequency axis, one complex value per channel and a set of
//! delay windows ("patches"), the filter suppresses power inside the patches by weighting
//! the spectrum with the inverse of a patch covariance model before transforming it.
//! The output is returned either in the delay domain or transformed back to frequency.

/// Filter parameters and their defaults.
pub mod config;

/// Delay patches, frequency axis validation and filter outputs.
pub mod data;

/// Error type shared by the crate.
pub mod error;

/// Filter matrices, the matrix cache and the filter pipeline.
pub mod filters;

/// Pseudo-inverse via singular value decomposition.
pub mod linalg;

/// Taper windows and FFT helpers.
pub mod math_tools;

pub use config::{FilterSettings, OutputDomain, WeightsMode};
pub use data::{BatchOutput, DelayPatch, FilterOutput};
pub use error::{DelayFilterError, Result};
pub use filters::cache::{CacheKey, FilterMatrixCache};
pub use filters::filter_matrix::{build_filter_matrix, FilterMatrix, FilterMatrixParams};
pub use filters::pipeline::{delay_filter, DelayFilter};
pub use math_tools::{NamedWindows, TaperWindow, WindowGenerator};
