//! Shared builders for integration tests.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use jet_analysis::{GriddedInput, LevelKind};
use ndarray::Array4;

pub const N_LEVELS: usize = 21;
pub const N_LATS: usize = 71;

/// Theta of the 2 PVU surface: a tanh ramp steepest at 30 degrees in either
/// hemisphere, so the jet sits at exactly 30.
pub fn surface_theta(lat: f64) -> f64 {
    330.0 + 20.0 * ((lat.abs() - 30.0) / 10.0).tanh()
}

/// A zonally uniform grid with the prescribed tanh tropopause.
pub fn jet_input(n_times: usize, n_lons: usize) -> GriddedInput {
    jet_input_with_dead_lon(n_times, n_lons, None)
}

/// Same grid, but PV at longitude index `dead` never reaches the threshold.
pub fn jet_input_with_dead_lon(
    n_times: usize,
    n_lons: usize,
    dead: Option<usize>,
) -> GriddedInput {
    let levels: Vec<f64> = (0..N_LEVELS).map(|k| 300.0 + 5.0 * k as f64).collect();
    let lats: Vec<f64> = (0..N_LATS).map(|i| -87.5 + 2.5 * i as f64).collect();
    let lons: Vec<f64> = (0..n_lons).map(|i| 360.0 * i as f64 / n_lons as f64).collect();

    let start: NaiveDateTime = NaiveDate::from_ymd_opt(2000, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let times: Vec<NaiveDateTime> = (0..n_times)
        .map(|i| start + Duration::hours(6 * i as i64))
        .collect();

    let shape = (n_times, N_LEVELS, N_LATS, n_lons);
    let mut ipv = Array4::zeros(shape);
    let mut u_wind = Array4::zeros(shape);

    for t in 0..n_times {
        for (k, &theta) in levels.iter().enumerate() {
            for (y, &lat) in lats.iter().enumerate() {
                let sign = if lat < 0.0 { -1.0 } else { 1.0 };
                let pv = sign * (2.0 + 0.05 * (theta - surface_theta(lat)));
                let u = (theta - 300.0) / 5.0
                    * (-((lat.abs() - 30.0) / 15.0).powi(2)).exp();
                for x in 0..n_lons {
                    ipv[[t, k, y, x]] = if Some(x) == dead { 1.1 } else { pv };
                    u_wind[[t, k, y, x]] = u;
                }
            }
        }
    }

    GriddedInput::new(levels, lats, lons, times, LevelKind::PotentialTemperature)
        .with_ipv(ipv)
        .with_u_wind(u_wind)
}
