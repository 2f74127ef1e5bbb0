//! Build the meridional profile of the PV surface for one time and longitude.

use metfor::{Kelvin, MetersPSec, Quantity};
use optional::{none, some, Optioned};

use crate::column::{CrossingScan, VerticalColumn};

/// Theta, zonal wind, and near-surface shear on the constant PV surface as a
/// function of latitude, for one time and longitude.
///
/// Latitudes with no threshold crossing keep their slot with missing values,
/// they are never dropped, so downstream consumers see the full band and a
/// reduced support.
#[derive(Clone, Debug, Default)]
pub struct MeridionalProfile {
    latitudes: Vec<f64>,
    theta: Vec<Optioned<Kelvin>>,
    u_wind: Vec<Optioned<MetersPSec>>,
    shear: Vec<Optioned<MetersPSec>>,
}

/// Apply the column crosser across a latitude band.
///
/// `columns` yields (latitude, column) pairs in ascending latitude order.
/// Shear is the zonal wind on the PV surface minus the wind at the column's
/// surface level. When fewer than `min_support` latitudes yield a crossing the
/// profile comes back fully undefined, there is not enough support to fit.
pub fn build_profile(
    columns: impl Iterator<Item = (f64, VerticalColumn)>,
    threshold: f64,
    scan: CrossingScan,
    min_support: usize,
) -> MeridionalProfile {
    let mut profile = MeridionalProfile::default();

    for (lat, column) in columns {
        profile.latitudes.push(lat);

        match column.cross_threshold(threshold, scan) {
            Some(crossing) => {
                profile.theta.push(some(crossing.theta));
                profile.u_wind.push(some(crossing.u_wind));

                let sfc = column.surface_u_wind();
                if sfc.is_some() {
                    profile.shear.push(some(crossing.u_wind - sfc.unpack()));
                } else {
                    profile.shear.push(none());
                }
            }
            None => {
                profile.theta.push(none());
                profile.u_wind.push(none());
                profile.shear.push(none());
            }
        }
    }

    if profile.defined_len() < min_support {
        profile.clear_values();
    }

    profile
}

impl MeridionalProfile {
    /// Latitudes of the profile, ascending, degrees north.
    pub fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    /// Theta on the PV surface per latitude.
    pub fn theta(&self) -> &[Optioned<Kelvin>] {
        &self.theta
    }

    /// Zonal wind on the PV surface per latitude.
    pub fn u_wind(&self) -> &[Optioned<MetersPSec>] {
        &self.u_wind
    }

    /// PV-surface minus surface-level zonal wind per latitude.
    pub fn shear(&self) -> &[Optioned<MetersPSec>] {
        &self.shear
    }

    /// Number of latitudes with a defined theta.
    pub fn defined_len(&self) -> usize {
        self.theta.iter().filter(|th| th.is_some()).count()
    }

    /// The defined (latitude, theta) pairs, unpacked for fitting.
    pub fn defined_pairs(&self) -> (Vec<f64>, Vec<f64>) {
        self.latitudes
            .iter()
            .zip(self.theta.iter())
            .filter(|(_, th)| th.is_some())
            .map(|(&lat, th)| (lat, th.unpack().unpack()))
            .unzip()
    }

    // Blank every value while keeping the latitude slots.
    fn clear_values(&mut self) {
        for th in self.theta.iter_mut() {
            *th = none();
        }
        for u in self.u_wind.iter_mut() {
            *u = none();
        }
        for s in self.shear.iter_mut() {
            *s = none();
        }
    }
}
