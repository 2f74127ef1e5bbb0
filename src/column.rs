//! Find where potential vorticity crosses a threshold in one vertical column.

use itertools::{izip, Itertools};
use metfor::{Kelvin, MetersPSec, Quantity};
use optional::Optioned;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::interpolation::linear_interp;

/// Scan order used when a column crosses the PV threshold more than once.
///
/// The dynamical tropopause convention is to keep the first crossing found
/// scanning downward from the top of the column, but the choice is a policy,
/// not a constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
pub enum CrossingScan {
    /// Scan downward from the top of the atmosphere, keep the first crossing.
    #[strum(serialize = "top-down", serialize = "from-top")]
    #[serde(alias = "from-top")]
    TopDown,
    /// Scan upward from the surface, keep the first crossing.
    #[strum(serialize = "bottom-up", serialize = "from-bottom")]
    #[serde(alias = "from-bottom")]
    BottomUp,
}

/// Interpolated state on the surface where PV equals the threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceCrossing {
    /// Potential temperature of the PV surface.
    pub theta: Kelvin,
    /// Zonal wind on the PV surface.
    pub u_wind: MetersPSec,
}

/// A vertical profile of theta, PV, and zonal wind at one (time, lon, lat).
///
/// The parallel vectors are indexed by model level. Levels must be ordered
/// consistently (all ascending or all descending); `top_is_first` records
/// which end of the vectors is the top of the atmosphere.
#[derive(Clone, Debug, Default)]
pub struct VerticalColumn {
    theta: Vec<Optioned<Kelvin>>,
    pv: Vec<Optioned<f64>>,
    u_wind: Vec<Optioned<MetersPSec>>,
    top_is_first: bool,
}

impl VerticalColumn {
    /// Assemble a column from parallel per-level vectors. PV is in PVU.
    pub fn new(
        theta: Vec<Optioned<Kelvin>>,
        pv: Vec<Optioned<f64>>,
        u_wind: Vec<Optioned<MetersPSec>>,
        top_is_first: bool,
    ) -> Self {
        debug_assert_eq!(theta.len(), pv.len());
        debug_assert_eq!(theta.len(), u_wind.len());

        VerticalColumn {
            theta,
            pv,
            u_wind,
            top_is_first,
        }
    }

    /// Number of model levels in the column.
    pub fn len(&self) -> usize {
        self.pv.len()
    }

    /// True when the column holds no levels.
    pub fn is_empty(&self) -> bool {
        self.pv.is_empty()
    }

    /// Zonal wind at the model level closest to the surface.
    pub fn surface_u_wind(&self) -> Optioned<MetersPSec> {
        let sfc = if self.top_is_first {
            self.u_wind.last()
        } else {
            self.u_wind.first()
        };
        sfc.copied().unwrap_or_default()
    }

    /// Locate the first threshold crossing and interpolate onto it.
    ///
    /// Adjacent pairs of defined levels are scanned in the order given by
    /// `scan`; the first pair where (pv - threshold) changes sign wins, and
    /// theta and wind are interpolated linearly in PV between those two
    /// levels. A level sitting exactly on the threshold is returned as is.
    /// Returns `None` when no sign change exists in the whole column.
    pub fn cross_threshold(&self, threshold: f64, scan: CrossingScan) -> Option<SurfaceCrossing> {
        let start_at_top = match scan {
            CrossingScan::TopDown => true,
            CrossingScan::BottomUp => false,
        };

        let mut levels: Vec<_> = self.defined_levels().collect();
        if self.top_is_first != start_at_top {
            levels.reverse();
        }

        self.scan_levels(threshold, levels.into_iter())
    }

    // Iterator over levels where every field is defined, in storage order.
    fn defined_levels(&self) -> impl Iterator<Item = (Kelvin, f64, MetersPSec)> + '_ {
        izip!(&self.theta, &self.pv, &self.u_wind).filter_map(|(th, pv, u)| {
            if th.is_some() && pv.is_some() && u.is_some() {
                Some((th.unpack(), pv.unpack(), u.unpack()))
            } else {
                None
            }
        })
    }

    fn scan_levels(
        &self,
        threshold: f64,
        levels: impl Iterator<Item = (Kelvin, f64, MetersPSec)>,
    ) -> Option<SurfaceCrossing> {
        levels
            .tuple_windows::<(_, _)>()
            .filter_map(|((th0, pv0, u0), (th1, pv1, u1))| {
                if (pv0 - threshold).abs() < std::f64::EPSILON {
                    Some(SurfaceCrossing { theta: th0, u_wind: u0 })
                } else if (pv1 - threshold).abs() < std::f64::EPSILON {
                    Some(SurfaceCrossing { theta: th1, u_wind: u1 })
                } else if (pv0 - threshold) * (pv1 - threshold) < 0.0 {
                    let theta = Kelvin(linear_interp(
                        threshold,
                        pv0,
                        pv1,
                        th0.unpack(),
                        th1.unpack(),
                    ));
                    let u_wind = MetersPSec(linear_interp(
                        threshold,
                        pv0,
                        pv1,
                        u0.unpack(),
                        u1.unpack(),
                    ));
                    Some(SurfaceCrossing { theta, u_wind })
                } else {
                    None
                }
            })
            .next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optional::{none, some};

    // A column with PV rising from 0.5 to 3.5 PVU going up, theta 300..360.
    fn simple_column() -> VerticalColumn {
        let theta: Vec<_> = (0..7).map(|i| some(Kelvin(300.0 + 10.0 * i as f64))).collect();
        let pv: Vec<_> = (0..7).map(|i| some(0.5 + 0.5 * i as f64)).collect();
        let u: Vec<_> = (0..7).map(|i| some(MetersPSec(5.0 + 2.0 * i as f64))).collect();
        VerticalColumn::new(theta, pv, u, false)
    }

    #[test]
    fn test_single_crossing() {
        let col = simple_column();

        let crossing = col.cross_threshold(2.0, CrossingScan::TopDown).unwrap();
        // PV == 2.0 sits exactly on level 3.
        assert!((crossing.theta.unpack() - 330.0).abs() < 1.0e-9);
        assert!((crossing.u_wind.unpack() - 11.0).abs() < 1.0e-9);
    }

    #[test]
    fn test_interpolated_crossing() {
        let col = simple_column();

        let crossing = col.cross_threshold(2.25, CrossingScan::TopDown).unwrap();
        // Halfway between levels 3 and 4.
        assert!((crossing.theta.unpack() - 335.0).abs() < 1.0e-9);
        assert!((crossing.u_wind.unpack() - 12.0).abs() < 1.0e-9);
    }

    #[test]
    fn test_no_crossing() {
        let col = simple_column();
        assert!(col.cross_threshold(10.0, CrossingScan::TopDown).is_none());
        assert!(col.cross_threshold(-2.0, CrossingScan::BottomUp).is_none());
    }

    #[test]
    fn test_missing_levels_are_bridged() {
        let theta = vec![
            some(Kelvin(300.0)),
            none::<Kelvin>(),
            some(Kelvin(340.0)),
        ];
        let pv = vec![some(1.0), some(1.5), some(3.0)];
        let u = vec![some(MetersPSec(10.0)), some(MetersPSec(12.0)), some(MetersPSec(20.0))];
        let col = VerticalColumn::new(theta, pv, u, false);

        // The middle level has no theta, so the crossing interpolates between
        // the outer two.
        let crossing = col.cross_threshold(2.0, CrossingScan::BottomUp).unwrap();
        assert!((crossing.theta.unpack() - 320.0).abs() < 1.0e-9);
        assert!((crossing.u_wind.unpack() - 15.0).abs() < 1.0e-9);
    }

    #[test]
    fn test_scan_order_picks_different_crossing() {
        // PV wiggles through 2.0 twice.
        let theta: Vec<_> = [300.0, 320.0, 340.0, 360.0]
            .iter()
            .map(|&t| some(Kelvin(t)))
            .collect();
        let pv = vec![some(1.0), some(3.0), some(1.5), some(2.5)];
        let u: Vec<_> = [5.0, 10.0, 15.0, 20.0]
            .iter()
            .map(|&v| some(MetersPSec(v)))
            .collect();
        let col = VerticalColumn::new(theta, pv, u, false);

        let from_bottom = col.cross_threshold(2.0, CrossingScan::BottomUp).unwrap();
        let from_top = col.cross_threshold(2.0, CrossingScan::TopDown).unwrap();

        // Bottom-up finds the 1.0 -> 3.0 crossing, top-down the 1.5 -> 2.5 one.
        assert!((from_bottom.theta.unpack() - 310.0).abs() < 1.0e-9);
        assert!((from_top.theta.unpack() - 350.0).abs() < 1.0e-9);
    }

    #[test]
    fn test_surface_wind_follows_orientation() {
        let col = simple_column();
        assert!((col.surface_u_wind().unpack().unpack() - 5.0).abs() < 1.0e-9);

        let flipped = VerticalColumn::new(
            col.theta.iter().rev().cloned().collect(),
            col.pv.iter().rev().cloned().collect(),
            col.u_wind.iter().rev().cloned().collect(),
            true,
        );
        assert!((flipped.surface_u_wind().unpack().unpack() - 5.0).abs() < 1.0e-9);
    }
}
