//! Hemisphere conventions and extremum detection on the fitted derivative.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Hemisphere tag threaded explicitly through the pipeline.
///
/// Every sign convention in the metric is a pure function of this tag, there
/// is no ad hoc latitude sign checking downstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Hemisphere {
    /// Latitudes north of the equator.
    Northern,
    /// Latitudes south of the equator.
    Southern,
}

impl Hemisphere {
    /// True when `lat` belongs to this hemisphere. The equator belongs to
    /// neither.
    pub fn contains(self, lat: f64) -> bool {
        match self {
            Hemisphere::Northern => lat > 0.0,
            Hemisphere::Southern => lat < 0.0,
        }
    }

    /// Apply this hemisphere's PV sign to a threshold magnitude.
    ///
    /// PV is negative in the southern hemisphere, so a configured 2.0 PVU
    /// threshold means -2.0 PVU there.
    pub fn signed_threshold(self, threshold: f64) -> f64 {
        match self {
            Hemisphere::Northern => threshold.abs(),
            Hemisphere::Southern => -threshold.abs(),
        }
    }

    /// The search band in this hemisphere, oriented south to north.
    ///
    /// `min_lat` and `max_lat` are absolute degrees, e.g. (10, 65) becomes
    /// (-65, -10) in the south.
    pub fn band(self, min_lat: f64, max_lat: f64) -> (f64, f64) {
        match self {
            Hemisphere::Northern => (min_lat, max_lat),
            Hemisphere::Southern => (-max_lat, -min_lat),
        }
    }

    // Jet detection keeps maxima of the meridional gradient in the north and
    // minima in the south.
    pub(crate) fn keeps_maximum(self) -> bool {
        match self {
            Hemisphere::Northern => true,
            Hemisphere::Southern => false,
        }
    }
}

/// A local extremum of the fitted derivative obeying the hemisphere sign rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Latitude of the extremum, degrees north.
    pub latitude: f64,
    /// d(theta)/d(latitude) at the extremum, K per degree.
    pub derivative: f64,
}

/// Scan derivative samples for sign qualified local extrema.
///
/// `samples` are (latitude, derivative) pairs in ascending latitude order.
/// Candidates are returned in ascending latitude order; zero candidates is a
/// normal outcome meaning no jet was detected.
pub fn find_candidates(samples: &[(f64, f64)], hemisphere: Hemisphere) -> Vec<Candidate> {
    let keep_max = hemisphere.keeps_maximum();

    samples
        .iter()
        .copied()
        .tuple_windows::<(_, _, _)>()
        // An interior sample qualifies when both neighbors are on the wrong
        // side of it. The asymmetric comparison keeps one point of a flat top.
        .filter(|&((_, d0), (_, d1), (_, d2))| {
            if keep_max {
                d1 > d0 && d1 >= d2
            } else {
                d1 < d0 && d1 <= d2
            }
        })
        .map(|(_, (latitude, derivative), _)| Candidate {
            latitude,
            derivative,
        })
        .filter(|cand| hemisphere.contains(cand.latitude))
        .collect()
}
