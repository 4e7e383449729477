//! Error types returned by the delay filter.

use thiserror::Error;

/// Result type for delay filter operations
pub type Result<T> = std::result::Result<T, DelayFilterError>;

/// Errors that can occur while building or applying a delay filter.
///
/// Everything except `PseudoInverse` and `Aborted` is a configuration error and is
/// raised before any numerical work starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DelayFilterError {
    /// Weights mode string is neither `I` nor `WTL`
    #[error("unsupported weights mode `{0}`, expected `I` or `WTL`")]
    UnsupportedWeights(String),

    /// Output domain string is neither `frequency` nor `delay`
    #[error("unsupported output domain `{0}`, expected `frequency` or `delay`")]
    UnsupportedOutputDomain(String),

    /// The window generator does not know the requested taper
    #[error("unknown taper window `{0}`")]
    UnknownWindow(String),

    #[error("frequency axis is empty")]
    EmptyFrequencyAxis,

    /// The channel spacing is derived from the first two channels
    #[error("at least two channels are required to derive the channel spacing, got {0}")]
    TooFewChannels(usize),

    /// Two arrays that must be channel-aligned have different lengths
    #[error("{what} has length {actual}, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The frequency axis is not uniformly spaced
    #[error("channel spacing {spacing} at index {index} differs from df = {df}")]
    NonUniformAxis { index: usize, spacing: f64, df: f64 },

    /// Zero or non-finite channel spacing
    #[error("invalid channel spacing {0}")]
    InvalidSpacing(f64),

    #[error("{centers} patch centers but {widths} patch widths")]
    PatchListMismatch { centers: usize, widths: usize },

    /// Discrete construction divides by the patch width
    #[error("patch width must be positive in discrete mode, got {0}")]
    InvalidPatchWidth(f64),

    /// Patch centers and widths enter the matrix through sinc and exp terms
    #[error("patch ({center}, {width}) is not finite")]
    NonFinitePatch { center: f64, width: f64 },

    /// A window generator returned the wrong number of samples
    #[error("window `{name}` has {actual} samples, expected {expected}")]
    WindowLength {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// The taper has zero power and cannot be normalized
    #[error("taper `{0}` has zero power")]
    DegenerateTaper(String),

    /// Singular value decomposition did not converge
    #[error("pseudo-inverse failed: {0}")]
    PseudoInverse(String),

    #[error("filter calculation aborted")]
    Aborted,
}
