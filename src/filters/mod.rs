//! Delay filtering of complex spectra.
//!
//! A delay filter suppresses structure in chosen windows of the delay domain (the Fourier dual
//! of frequency) while leaving the rest of the spectrum as untouched as the filter factor
//! allows. Filtering is split into three stages:
//!
//! * **Filter matrix**: Builds the inverse covariance weighting for a channel layout, a set of
//!   delay patches and the flagged channels.
//!
//! * **Cache**: Stores built matrices so that spectra sharing a layout reuse one matrix.
//!
//! * **Pipeline**: Applies weights and taper to a spectrum and transforms it into the
//!   requested output domain.

/// Inverse covariance and weight matrix construction, continuous and discrete.
pub mod filter_matrix;

/// Thread-safe keyed store of filter matrices with single-flight builds.
pub mod cache;

/// Weighting, tapering and the transform into frequency or delay output.
pub mod pipeline;
