//! Synthetic input grids with analytically known jets, for tests only.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use ndarray::Array4;

use crate::grid::{GriddedInput, LevelKind};

const N_LEVELS: usize = 21;
const N_LATS: usize = 71;

fn levels() -> Vec<f64> {
    // Theta levels 300 to 400 K.
    (0..N_LEVELS).map(|k| 300.0 + 5.0 * k as f64).collect()
}

fn latitudes() -> Vec<f64> {
    // 2.5 degree grid from 87.5S to 87.5N.
    (0..N_LATS).map(|i| -87.5 + 2.5 * i as f64).collect()
}

fn longitudes(n: usize) -> Vec<f64> {
    (0..n).map(|i| 360.0 * i as f64 / n as f64).collect()
}

fn times(n: usize) -> Vec<NaiveDateTime> {
    let start = NaiveDate::from_ymd_opt(2000, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n).map(|i| start + Duration::days(i as i64)).collect()
}

// Theta of the 2 PVU surface: 330 K at the jet, rising poleward through a
// tanh ramp whose steepest ascent sits at 30 degrees in either hemisphere.
fn surface_theta(lat: f64) -> f64 {
    330.0 + 20.0 * ((lat.abs() - 30.0) / 10.0).tanh()
}

/// A zonally uniform grid whose dynamical tropopause puts the subtropical jet
/// at exactly 30 degrees in each hemisphere.
///
/// PV increases monotonically with height through the prescribed surface and
/// carries the hemisphere sign. The zonal wind strengthens with height and is
/// meridionally peaked at the jet so shear tie-breaking favors it.
pub fn tanh_jet_input(n_times: usize, n_lons: usize) -> GriddedInput {
    let levels = levels();
    let lats = latitudes();
    let lons = longitudes(n_lons);

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
                    ipv[[t, k, y, x]] = pv;
                    u_wind[[t, k, y, x]] = u;
                }
            }
        }
    }

    GriddedInput::new(levels, lats, lons, times(n_times), LevelKind::PotentialTemperature)
        .with_ipv(ipv)
        .with_u_wind(u_wind)
}

/// A grid whose PV never reaches the threshold anywhere, so no jet exists.
pub fn no_tropopause_input(n_times: usize, n_lons: usize) -> GriddedInput {
    let shape = (n_times, N_LEVELS, N_LATS, n_lons);

    GriddedInput::new(
        levels(),
        latitudes(),
        longitudes(n_lons),
        times(n_times),
        LevelKind::PotentialTemperature,
    )
    .with_ipv(Array4::from_elem(shape, 1.1))
    .with_u_wind(Array4::from_elem(shape, 10.0))
}
