#![warn(missing_docs)]
//! Types and functions for diagnosing the latitude of the subtropical jet
//! stream from gridded atmospheric fields.
//!
//! The diagnostic follows the potential vorticity contour of the dynamical
//! tropopause: in every vertical column the level where PV crosses a
//! threshold (2 PVU by default, negative in the southern hemisphere) is
//! located, the potential temperature of that surface is fitted as a
//! polynomial of latitude, and the jet is identified with a sign qualified
//! extremum of the fitted meridional gradient. Near-surface wind shear breaks
//! ties when more than one extremum qualifies. Per-longitude positions are
//! reduced to a zonal median or reported individually.
//!
//! The crate does no I/O. Callers hand in fully materialized arrays on a
//! (time, level, latitude, longitude) grid and get a time series back;
//! reading and persisting files is their concern.
//!
//! # Examples
//! ```
//! use chrono::NaiveDate;
//! use ndarray::Array4;
//! use jet_analysis::{GriddedInput, JetFindConfig, JetFinder, LevelKind};
//!
//! # fn main() -> Result<(), jet_analysis::AnalysisError> {
//! let levels: Vec<f64> = (0..11).map(|k| 300.0 + 10.0 * k as f64).collect();
//! let latitudes: Vec<f64> = (0..37).map(|i| -90.0 + 5.0 * i as f64).collect();
//! let longitudes = vec![0.0, 90.0, 180.0, 270.0];
//! let times = vec![NaiveDate::from_ymd_opt(2000, 1, 1)
//!     .unwrap()
//!     .and_hms_opt(0, 0, 0)
//!     .unwrap()];
//!
//! let shape = (times.len(), levels.len(), latitudes.len(), longitudes.len());
//! let input = GriddedInput::new(
//!     levels,
//!     latitudes,
//!     longitudes,
//!     times,
//!     LevelKind::PotentialTemperature,
//! )
//! .with_ipv(Array4::zeros(shape))
//! .with_u_wind(Array4::zeros(shape));
//!
//! let config = JetFindConfig::default();
//! let (southern, northern) = JetFinder::new(&config, &input)?.find_jets();
//!
//! // Zero PV never crosses the threshold, so the series exists but every
//! // position is missing.
//! assert_eq!(southern.times().len(), 1);
//! assert!(northern.zonal_latitudes().iter().all(|lat| lat.is_none()));
//! # Ok(())
//! # }
//! ```

//
// API
//

// Modules
mod aggregate;
mod column;
mod config;
mod error;
mod extrema;
mod fit;
mod grid;
mod interpolation;
mod metric;
mod shear;
mod surface;

#[cfg(test)]
mod test_data;

pub use crate::{
    aggregate::{median_defined, AggregationMode, JetSeries, SeriesData, ZonalJet},
    column::{CrossingScan, SurfaceCrossing, VerticalColumn},
    config::JetFindConfig,
    error::{AnalysisError, Result},
    extrema::{find_candidates, Candidate, Hemisphere},
    fit::{fit_profile, PolyBasis, PolyFit},
    grid::{GriddedInput, LevelKind},
    metric::{JetFinder, JetPosition},
    shear::select_candidate,
    surface::{build_profile, MeridionalProfile},
};
