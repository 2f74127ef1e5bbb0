//! Linear interpolation helpers shared across the pipeline.
//!
//! Latitude is the abscissa everywhere in this crate, so these helpers take
//! plain `f64` degrees and quantity-typed ordinates.

use itertools::{izip, Itertools};
use metfor::Quantity;
use optional::{Noned, Optioned};

/// Interpolate linearly between two points.
#[inline]
pub(crate) fn linear_interp(x: f64, x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
    debug_assert_ne!(x0, x1);
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

/// Interpolate a value from parallel coordinate/value slices.
///
/// Missing entries are skipped, so a gap in the middle of the profile is
/// bridged by the defined points on either side of it. Assumes `xs` is
/// monotonic. Returns a missing value when `target_x` is outside the defined
/// part of the profile.
pub(crate) fn interp_at<Y>(xs: &[f64], ys: &[Optioned<Y>], target_x: f64) -> Optioned<Y>
where
    Y: Quantity + Noned,
{
    debug_assert_eq!(xs.len(), ys.len());

    enum Bracket<Y> {
        Between((f64, Y), (f64, Y)),
        Exact(Y),
    }

    let make_bracket = |pnt_0: (f64, Y), pnt_1: (f64, Y)| -> Option<Bracket<Y>> {
        let (x0, _) = pnt_0;
        let (x1, _) = pnt_1;

        if (x0 < target_x && x1 > target_x) || (x0 > target_x && x1 < target_x) {
            Some(Bracket::Between(pnt_0, pnt_1))
        } else if (x0 - target_x).abs() < std::f64::EPSILON {
            Some(Bracket::Exact(pnt_0.1))
        } else if (x1 - target_x).abs() < std::f64::EPSILON {
            Some(Bracket::Exact(pnt_1.1))
        } else {
            None
        }
    };

    let value_opt = izip!(xs, ys)
        // Drop entries with a missing value and unpack the rest.
        .filter(|(_, y)| y.is_some())
        .map(|(x, y)| (*x, y.unpack()))
        // Look at the remaining points two at a time.
        .tuple_windows::<(_, _)>()
        // Keep only the pair that brackets the target, there is at most one.
        .filter_map(|(pnt_0, pnt_1)| make_bracket(pnt_0, pnt_1))
        .next()
        .map(|bracket| match bracket {
            Bracket::Between((x0, y0), (x1, y1)) => {
                Y::pack(linear_interp(target_x, x0, x1, y0.unpack(), y1.unpack()))
            }
            Bracket::Exact(y) => y,
        });

    Optioned::from(value_opt)
}
