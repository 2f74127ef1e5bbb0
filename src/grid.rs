//! Gridded input fields and coordinate metadata consumed by the jet finder.
//!
//! The collaborator layer that reads files hands fully materialized arrays in;
//! nothing in this crate does I/O. Fields are indexed (time, level, latitude,
//! longitude). PV must already be on the same grid as the wind, this crate
//! never derives it.

use chrono::NaiveDateTime;
use metfor::{Kelvin, MetersPSec};
use ndarray::Array4;
use optional::{none, some};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::column::VerticalColumn;
use crate::error::{AnalysisError, Result};
use crate::extrema::Hemisphere;

/// Vertical level convention of the input fields.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelKind {
    /// Pressure levels. `scale_to_pa` is the multiplier taking the stored
    /// coordinate values to Pascals (e.g. 100.0 for hPa).
    Pressure {
        /// Multiplier from stored level values to Pascals.
        scale_to_pa: f64,
    },
    /// Potential temperature (isentropic) levels, in Kelvin.
    #[serde(rename = "theta")]
    PotentialTemperature,
}

/// Gridded atmospheric input on a (time, level, latitude, longitude) grid.
///
/// Built with the `with_*` methods and checked once with [`validate`]
/// (`JetFinder::new` does that for you). NaN entries in the fields are treated
/// as missing values. PV whose magnitude never reaches 1 is assumed to be in
/// SI units and is rescaled to PVU when it is attached.
///
/// [`validate`]: GriddedInput::validate
#[derive(Clone, Debug, Default)]
pub struct GriddedInput {
    levels: Vec<f64>,
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
    times: Vec<NaiveDateTime>,
    level_kind: Option<LevelKind>,

    ipv: Option<Array4<f64>>,
    u_wind: Option<Array4<f64>>,
    theta: Option<Array4<f64>>,
}

impl GriddedInput {
    /// Start an input grid from its coordinates.
    ///
    /// Pressure level values are normalized to Pascals here using the
    /// `LevelKind` scale factor; theta level values are kept as Kelvin.
    pub fn new(
        levels: Vec<f64>,
        latitudes: Vec<f64>,
        longitudes: Vec<f64>,
        times: Vec<NaiveDateTime>,
        level_kind: LevelKind,
    ) -> Self {
        let levels = match level_kind {
            LevelKind::Pressure { scale_to_pa } => {
                levels.into_iter().map(|l| l * scale_to_pa).collect()
            }
            LevelKind::PotentialTemperature => levels,
        };

        GriddedInput {
            levels,
            latitudes,
            longitudes,
            times,
            level_kind: Some(level_kind),
            ..Self::default()
        }
    }

    /// Attach the isentropic PV field, in PVU or SI units.
    ///
    /// A field whose finite magnitude never reaches 1 is taken to be in
    /// 10⁻⁶ PVU and rescaled, matching the historical input convention.
    pub fn with_ipv(mut self, mut ipv: Array4<f64>) -> Self {
        let max_abs = ipv
            .iter()
            .filter(|v| v.is_finite())
            .fold(0.0, |acc: f64, &v| acc.max(v.abs()));

        if max_abs > 0.0 && max_abs < 1.0 {
            debug!("PV magnitude peaks at {:.3e}, rescaling to PVU", max_abs);
            ipv.mapv_inplace(|v| v * 1.0e6);
        }

        self.ipv = Some(ipv);
        self
    }

    /// Attach the zonal wind field, in m/s.
    pub fn with_u_wind(mut self, u_wind: Array4<f64>) -> Self {
        self.u_wind = Some(u_wind);
        self
    }

    /// Attach a potential temperature field on the model levels, in Kelvin.
    ///
    /// Required for pressure levels; on isentropic levels theta is the level
    /// coordinate itself and this field is optional.
    pub fn with_theta(mut self, theta: Array4<f64>) -> Self {
        self.theta = Some(theta);
        self
    }

    /// Check that every field agrees with the coordinate arrays.
    pub fn validate(&self) -> Result<()> {
        let kind = self
            .level_kind
            .ok_or(AnalysisError::MissingProfile("level kind"))?;
        let ipv = self.ipv.as_ref().ok_or(AnalysisError::MissingProfile("ipv"))?;
        let u_wind = self
            .u_wind
            .as_ref()
            .ok_or(AnalysisError::MissingProfile("uwnd"))?;

        let expected = (
            self.times.len(),
            self.levels.len(),
            self.latitudes.len(),
            self.longitudes.len(),
        );

        if ipv.dim() != expected {
            return Err(AnalysisError::DimensionMismatch(format!(
                "ipv is {:?}, coordinates say {:?}",
                ipv.dim(),
                expected
            )));
        }
        if u_wind.dim() != expected {
            return Err(AnalysisError::DimensionMismatch(format!(
                "uwnd is {:?}, coordinates say {:?}",
                u_wind.dim(),
                expected
            )));
        }

        match (&self.theta, kind) {
            (Some(theta), _) if theta.dim() != expected => {
                Err(AnalysisError::DimensionMismatch(format!(
                    "theta is {:?}, coordinates say {:?}",
                    theta.dim(),
                    expected
                )))
            }
            (None, LevelKind::Pressure { .. }) => Err(AnalysisError::MissingProfile(
                "theta (required on pressure levels)",
            )),
            _ => Ok(()),
        }
    }

    /// Number of time steps in the grid.
    pub fn n_times(&self) -> usize {
        self.times.len()
    }

    /// Valid times of the grid.
    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    /// Latitude coordinate, degrees north, in grid order.
    pub fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    /// Longitude coordinate, degrees east, in grid order.
    pub fn longitudes(&self) -> &[f64] {
        &self.longitudes
    }

    /// Level coordinate: Pascals for pressure levels, Kelvin for theta levels.
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// True when index 0 of the level axis is the top of the atmosphere.
    pub fn top_is_first(&self) -> bool {
        if self.levels.len() < 2 {
            return false;
        }
        let first = self.levels[0];
        let last = self.levels[self.levels.len() - 1];
        match self.level_kind {
            // Low pressure and high theta are both "up".
            Some(LevelKind::Pressure { .. }) => first < last,
            Some(LevelKind::PotentialTemperature) | None => first > last,
        }
    }

    /// Index of the model level closest to the surface.
    pub fn surface_level_index(&self) -> usize {
        if self.top_is_first() {
            self.levels.len().saturating_sub(1)
        } else {
            0
        }
    }

    /// Latitude indices inside the search band of a hemisphere, paired with
    /// their latitudes and sorted south to north.
    pub fn band_lat_indices(
        &self,
        hemisphere: Hemisphere,
        min_lat: f64,
        max_lat: f64,
    ) -> Vec<(usize, f64)> {
        let (lo, hi) = hemisphere.band(min_lat, max_lat);

        let mut indices: Vec<(usize, f64)> = self
            .latitudes
            .iter()
            .enumerate()
            .filter(|(_, &lat)| lat >= lo && lat <= hi && hemisphere.contains(lat))
            .map(|(i, &lat)| (i, lat))
            .collect();
        indices.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        indices
    }

    /// Extract one vertical column. NaN entries become missing values.
    pub fn column(&self, time_idx: usize, lat_idx: usize, lon_idx: usize) -> VerticalColumn {
        let (ipv, u_wind) = match (&self.ipv, &self.u_wind) {
            (Some(ipv), Some(u_wind)) => (ipv, u_wind),
            _ => return VerticalColumn::default(),
        };

        let nlev = self.levels.len();
        let mut theta = Vec::with_capacity(nlev);
        let mut pv = Vec::with_capacity(nlev);
        let mut u = Vec::with_capacity(nlev);

        for k in 0..nlev {
            let idx = [time_idx, k, lat_idx, lon_idx];

            let pv_val = ipv[idx];
            pv.push(if pv_val.is_finite() { some(pv_val) } else { none() });

            let th_val = match &self.theta {
                Some(theta_field) => theta_field[idx],
                None => self.levels[k],
            };
            theta.push(if th_val.is_finite() {
                some(Kelvin(th_val))
            } else {
                none()
            });

            let u_val = u_wind[idx];
            u.push(if u_val.is_finite() {
                some(MetersPSec(u_val))
            } else {
                none()
            });
        }

        VerticalColumn::new(theta, pv, u, self.top_is_first())
    }
}
