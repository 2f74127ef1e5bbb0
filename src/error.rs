//! Error types for the jet-analysis crate.
use thiserror::Error;

/// Error type for the crate.
///
/// Only configuration and input-grid problems are fatal. Per-column and
/// per-longitude failures (`InsufficientSupport`, `SingularFit`) are caught by
/// the orchestrator and degraded to missing values, so a time series with gaps
/// is valid output rather than an error.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum AnalysisError {
    /// The configuration cannot produce a meaningful analysis.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// An input field's shape disagrees with the coordinate arrays.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
    /// A field required for the analysis was not supplied.
    #[error("missing profile required for the analysis: {0}")]
    MissingProfile(&'static str),
    /// Fewer defined profile points than the fit degree requires.
    #[error("{defined} defined points cannot support a degree {degree} fit")]
    InsufficientSupport {
        /// Configured polynomial degree.
        degree: usize,
        /// Number of defined profile points available.
        defined: usize,
    },
    /// The least squares system was degenerate.
    #[error("singular least squares system")]
    SingularFit,
}

/// Shorthand for results.
pub type Result<T> = std::result::Result<T, AnalysisError>;
