//! Disambiguate multiple jet candidates with near-surface wind shear.

use metfor::{MetersPSec, Quantity};
use optional::{none, Optioned};

use crate::extrema::Candidate;
use crate::interpolation::interp_at;

/// Shear magnitudes closer than this are treated as a tie.
const SHEAR_TIE_TOL: f64 = 1.0e-9; // m/s

/// Pick the jet among the candidate extrema.
///
/// * No candidate: no jet at this time/longitude/hemisphere, `None`.
/// * Exactly one candidate: returned directly, shear is never computed.
/// * Several candidates: the profile shear is interpolated at each candidate
///   latitude and the largest magnitude wins. Magnitudes within
///   `SHEAR_TIE_TOL` of each other are a tie, broken in favor of the candidate
///   closer to the equator, then the first in ascending latitude order.
///   Candidates with undefined shear lose to any defined one; if every shear
///   is undefined the most equatorward candidate is taken.
pub fn select_candidate(
    candidates: &[Candidate],
    latitudes: &[f64],
    shear: &[Optioned<MetersPSec>],
) -> Option<(Candidate, Optioned<MetersPSec>)> {
    match candidates {
        [] => None,
        [only] => Some((*only, none())),
        several => {
            let scored: Vec<(Candidate, Optioned<MetersPSec>, f64)> = several
                .iter()
                .map(|&cand| {
                    let s = interp_at(latitudes, shear, cand.latitude);
                    let magnitude = s
                        .into_option()
                        .map(|v| v.unpack().abs())
                        .unwrap_or(std::f64::NEG_INFINITY);
                    (cand, s, magnitude)
                })
                .collect();

            let mut best = scored[0];
            for &entry in &scored[1..] {
                let (cand, _, magnitude) = entry;
                let both_undefined = magnitude == std::f64::NEG_INFINITY
                    && best.2 == std::f64::NEG_INFINITY;
                let tied = both_undefined || (magnitude - best.2).abs() <= SHEAR_TIE_TOL;

                if tied {
                    if cand.latitude.abs() < best.0.latitude.abs() {
                        best = entry;
                    }
                } else if magnitude > best.2 {
                    best = entry;
                }
            }

            Some((best.0, best.1))
        }
    }
}
