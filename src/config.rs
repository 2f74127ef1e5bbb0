//! Configuration of the jet finding algorithm.

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregationMode;
use crate::column::CrossingScan;
use crate::error::{AnalysisError, Result};
use crate::fit::PolyBasis;

/// Tunable parameters of the jet finder.
///
/// Every parameter has a default matching the published configuration of the
/// metric, so `JetFindConfig::default()` is a working setup. The struct
/// derives `Deserialize` with per-field defaults, a partial config file is
/// enough.
///
/// No global state: the config is threaded explicitly into [`JetFinder`].
///
/// [`JetFinder`]: crate::JetFinder
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JetFindConfig {
    /// PV threshold magnitude in PVU defining the dynamical tropopause.
    /// The sign is applied per hemisphere.
    pub pv_threshold: f64,
    /// Degree of the polynomial fitted to theta on the PV surface.
    pub fit_degree: usize,
    /// Basis the fit is expressed in.
    pub basis: PolyBasis,
    /// Equatorward edge of the search band, absolute degrees.
    pub min_lat: f64,
    /// Poleward edge of the search band, absolute degrees.
    pub max_lat: f64,
    /// How per-longitude positions are reported.
    pub aggregation: AggregationMode,
    /// Scan order for columns crossing the threshold more than once.
    pub crossing_scan: CrossingScan,
}

impl Default for JetFindConfig {
    fn default() -> Self {
        JetFindConfig {
            pv_threshold: 2.0,
            fit_degree: 8,
            basis: PolyBasis::Chebyshev,
            min_lat: 10.0,
            max_lat: 65.0,
            aggregation: AggregationMode::ZonalMedian,
            crossing_scan: CrossingScan::TopDown,
        }
    }
}

impl JetFindConfig {
    /// Reject configurations that cannot produce a meaningful analysis.
    pub fn validate(&self) -> Result<()> {
        if !self.pv_threshold.is_finite() || self.pv_threshold == 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "pv_threshold must be finite and nonzero, got {}",
                self.pv_threshold
            )));
        }

        if self.fit_degree == 0 {
            return Err(AnalysisError::InvalidConfig(
                "fit_degree must be at least 1".to_owned(),
            ));
        }

        if !self.min_lat.is_finite() || !self.max_lat.is_finite() {
            return Err(AnalysisError::InvalidConfig(
                "search band edges must be finite".to_owned(),
            ));
        }
        if self.min_lat < 0.0 || self.max_lat > 90.0 || self.min_lat >= self.max_lat {
            return Err(AnalysisError::InvalidConfig(format!(
                "search band ({}, {}) must satisfy 0 <= min < max <= 90",
                self.min_lat, self.max_lat
            )));
        }

        Ok(())
    }
}
