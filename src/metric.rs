//! The jet finder, tying the whole pipeline together.
//!
//! One jet position is diagnosed independently per (time, longitude,
//! hemisphere): extract columns across the latitude band, locate the PV
//! threshold crossing in each, fit theta on that surface as a polynomial of
//! latitude, scan the analytic derivative for sign qualified extrema, and
//! break ties with near-surface shear. Time steps are independent and run in
//! parallel.

use std::sync::atomic::{AtomicUsize, Ordering};

use metfor::{Kelvin, MetersPSec};
use optional::Optioned;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::aggregate::{reduce_time_step, AggregationMode, JetSeries, SeriesData};
use crate::config::JetFindConfig;
use crate::error::Result;
use crate::extrema::{find_candidates, Hemisphere};
use crate::fit::fit_profile;
use crate::grid::GriddedInput;
use crate::interpolation::interp_at;
use crate::shear::select_candidate;
use crate::surface::build_profile;

/// Density of the derivative sampling, in samples per degree of fit domain.
const DERIV_SAMPLES_PER_DEGREE: f64 = 4.0;

/// Never sample the derivative on fewer points than this.
const MIN_DERIV_SAMPLES: usize = 64;

/// Log progress after this many completed time steps.
const PROGRESS_LOG_STRIDE: usize = 50;

/// A diagnosed jet for one time, longitude, and hemisphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JetPosition {
    /// Jet latitude, degrees north.
    pub latitude: f64,
    /// Theta of the PV surface at the jet latitude.
    pub theta: Optioned<Kelvin>,
    /// Zonal wind on the PV surface at the jet latitude.
    pub intensity: Optioned<MetersPSec>,
    /// Near-surface shear used to break ties; missing when only one candidate
    /// existed.
    pub shear: Optioned<MetersPSec>,
}

/// Runs the metric over a validated input grid.
///
/// Construction validates both the configuration and the grid, so a
/// `JetFinder` that exists can always run. Borrowing rather than owning keeps
/// repeated runs over the same fields cheap.
pub struct JetFinder<'a> {
    config: &'a JetFindConfig,
    data: &'a GriddedInput,
}

impl<'a> JetFinder<'a> {
    /// Validate the configuration and grid and wrap them up.
    pub fn new(config: &'a JetFindConfig, data: &'a GriddedInput) -> Result<Self> {
        config.validate()?;
        data.validate()?;
        Ok(JetFinder { config, data })
    }

    /// Diagnose both hemispheres, returned as (southern, northern).
    pub fn find_jets(&self) -> (JetSeries, JetSeries) {
        (
            self.find_hemisphere(Hemisphere::Southern),
            self.find_hemisphere(Hemisphere::Northern),
        )
    }

    /// Diagnose one hemisphere across every time step.
    ///
    /// Failure to find a jet at some time and longitude is recorded as a
    /// missing value, never an error.
    pub fn find_hemisphere(&self, hemisphere: Hemisphere) -> JetSeries {
        let band = self
            .data
            .band_lat_indices(hemisphere, self.config.min_lat, self.config.max_lat);
        let threshold = hemisphere.signed_threshold(self.config.pv_threshold);

        let n_times = self.data.n_times();
        let n_lons = self.data.longitudes().len();
        info!(
            "locating the {} jet over {} time steps, {} longitudes",
            hemisphere, n_times, n_lons
        );

        let progress = AtomicUsize::new(0);
        let rows: Vec<Vec<Option<JetPosition>>> = (0..n_times)
            .into_par_iter()
            .map(|time_idx| {
                let row = (0..n_lons)
                    .map(|lon_idx| {
                        self.find_single_jet(time_idx, lon_idx, &band, threshold, hemisphere)
                    })
                    .collect();

                let done = progress.fetch_add(1, Ordering::Relaxed) + 1;
                if done % PROGRESS_LOG_STRIDE == 0 {
                    info!("completed {}/{} time steps", done, n_times);
                }

                row
            })
            .collect();

        let data = match self.config.aggregation {
            AggregationMode::ZonalMedian => {
                SeriesData::Zonal(rows.iter().map(|row| reduce_time_step(row)).collect())
            }
            AggregationMode::PerLongitude => SeriesData::PerLongitude(rows),
        };

        JetSeries::new(
            hemisphere,
            self.data.times().to_vec(),
            self.data.longitudes().to_vec(),
            data,
        )
    }

    // One (time, longitude, hemisphere) cell of the analysis.
    fn find_single_jet(
        &self,
        time_idx: usize,
        lon_idx: usize,
        band: &[(usize, f64)],
        threshold: f64,
        hemisphere: Hemisphere,
    ) -> Option<JetPosition> {
        let columns = band
            .iter()
            .map(|&(lat_idx, lat)| (lat, self.data.column(time_idx, lat_idx, lon_idx)));
        let profile = build_profile(
            columns,
            threshold,
            self.config.crossing_scan,
            self.config.fit_degree + 1,
        );

        let (lats, thetas) = profile.defined_pairs();
        let fit = match fit_profile(&lats, &thetas, self.config.fit_degree, self.config.basis) {
            Ok(fit) => fit,
            Err(err) => {
                debug!(
                    "no {} fit at time {} lon {}: {}",
                    hemisphere, time_idx, lon_idx, err
                );
                return None;
            }
        };

        let (lo, hi) = fit.domain();
        let n_samples =
            (((hi - lo) * DERIV_SAMPLES_PER_DEGREE).ceil() as usize).max(MIN_DERIV_SAMPLES);
        let samples = fit.derivative_samples(n_samples);

        let candidates = find_candidates(&samples, hemisphere);
        let (selected, shear) =
            select_candidate(&candidates, profile.latitudes(), profile.shear())?;

        let theta = interp_at(profile.latitudes(), profile.theta(), selected.latitude);
        let intensity = interp_at(profile.latitudes(), profile.u_wind(), selected.latitude);

        Some(JetPosition {
            latitude: selected.latitude,
            theta,
            intensity,
            shear,
        })
    }
}
