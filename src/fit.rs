//! Polynomial fitting of the meridional profile and its analytic derivative.
//!
//! The jet position is read off the derivative of theta on the PV surface with
//! respect to latitude, so the fit has to be differentiated analytically rather
//! than by finite differences. Latitude is mapped onto [-1, 1] before fitting;
//! at degree 8 the plain power basis is ill conditioned near the domain edges,
//! which is why Chebyshev is the default basis.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Domains narrower than this cannot be rescaled onto [-1, 1].
const MIN_DOMAIN_WIDTH: f64 = 1.0e-6;

/// Relative pivot tolerance for declaring the normal equations singular.
const PIVOT_TOL: f64 = 1.0e-13;

/// Polynomial basis used for the meridional fit.
///
/// Selected once at configuration time; parses from the spellings the
/// configuration files historically used (`poly`, `cheby`, `leg`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
pub enum PolyBasis {
    /// Plain power basis. Kept for comparison runs, poorly conditioned at
    /// degree 8.
    #[strum(serialize = "poly", serialize = "polynomial")]
    #[serde(alias = "poly")]
    Polynomial,
    /// Chebyshev polynomials of the first kind.
    #[strum(serialize = "cheby", serialize = "chebyshev")]
    #[serde(alias = "cheby")]
    Chebyshev,
    /// Legendre polynomials.
    #[strum(serialize = "leg", serialize = "legendre")]
    #[serde(alias = "leg")]
    Legendre,
}

/// A least squares polynomial fit and its analytic derivative.
///
/// Coefficients are stored in the natural [-1, 1] domain of the basis. The
/// derivative coefficients already carry the chain rule factor of the domain
/// mapping, so they evaluate directly to d(value)/d(latitude).
#[derive(Clone, Debug, PartialEq)]
pub struct PolyFit {
    basis: PolyBasis,
    lat_min: f64,
    lat_max: f64,
    coeffs: Vec<f64>,
    deriv: Vec<f64>,
}

/// Fit a polynomial to (latitude, value) pairs in the least squares sense.
///
/// The caller passes defined pairs only, missing profile entries must already
/// have been dropped. The fit domain is the span of the latitudes actually
/// supplied. Errors with `InsufficientSupport` when there are fewer points
/// than coefficients and with `SingularFit` when the points cannot determine
/// the coefficients (zero latitude variance, too few distinct latitudes).
pub fn fit_profile(
    lats: &[f64],
    values: &[f64],
    degree: usize,
    basis: PolyBasis,
) -> Result<PolyFit> {
    debug_assert_eq!(lats.len(), values.len());
    debug_assert!(degree >= 1);

    let ncoeffs = degree + 1;
    if lats.len() < ncoeffs {
        return Err(AnalysisError::InsufficientSupport {
            degree,
            defined: lats.len(),
        });
    }

    let lat_min = lats.iter().cloned().fold(std::f64::INFINITY, f64::min);
    let lat_max = lats.iter().cloned().fold(std::f64::NEG_INFINITY, f64::max);
    if !(lat_max - lat_min).is_finite() || lat_max - lat_min < MIN_DOMAIN_WIDTH {
        return Err(AnalysisError::SingularFit);
    }

    // Accumulate the normal equations G c = r with G = AᵀA, without storing
    // the design matrix itself.
    let mut gram = vec![0.0; ncoeffs * ncoeffs];
    let mut rhs = vec![0.0; ncoeffs];
    let mut row = vec![0.0; ncoeffs];

    for (&lat, &y) in lats.iter().zip(values.iter()) {
        let x = rescale(lat, lat_min, lat_max);
        basis_row(basis, x, &mut row);
        for j in 0..ncoeffs {
            rhs[j] += row[j] * y;
            for k in j..ncoeffs {
                gram[j * ncoeffs + k] += row[j] * row[k];
            }
        }
    }
    // Mirror the upper triangle.
    for j in 1..ncoeffs {
        for k in 0..j {
            gram[j * ncoeffs + k] = gram[k * ncoeffs + j];
        }
    }

    let coeffs = cholesky_solve(ncoeffs, gram, rhs)?;

    let chain = 2.0 / (lat_max - lat_min);
    let deriv = deriv_coeffs(basis, &coeffs)
        .into_iter()
        .map(|c| c * chain)
        .collect();

    Ok(PolyFit {
        basis,
        lat_min,
        lat_max,
        coeffs,
        deriv,
    })
}

impl PolyFit {
    /// The latitude span the fit was made over.
    pub fn domain(&self) -> (f64, f64) {
        (self.lat_min, self.lat_max)
    }

    /// Evaluate the fitted polynomial at a latitude.
    pub fn evaluate(&self, lat: f64) -> f64 {
        eval_series(self.basis, &self.coeffs, rescale(lat, self.lat_min, self.lat_max))
    }

    /// Evaluate d(value)/d(latitude) at a latitude.
    pub fn evaluate_derivative(&self, lat: f64) -> f64 {
        eval_series(self.basis, &self.deriv, rescale(lat, self.lat_min, self.lat_max))
    }

    /// Sample the derivative on `n` evenly spaced latitudes spanning the fit
    /// domain, in ascending latitude order.
    pub fn derivative_samples(&self, n: usize) -> Vec<(f64, f64)> {
        debug_assert!(n >= 2);

        let step = (self.lat_max - self.lat_min) / (n - 1) as f64;
        (0..n)
            .map(|i| {
                let lat = self.lat_min + i as f64 * step;
                (lat, self.evaluate_derivative(lat))
            })
            .collect()
    }
}

#[inline]
fn rescale(lat: f64, lat_min: f64, lat_max: f64) -> f64 {
    2.0 * (lat - lat_min) / (lat_max - lat_min) - 1.0
}

// Fill `row` with the basis functions evaluated at x in [-1, 1].
fn basis_row(basis: PolyBasis, x: f64, row: &mut [f64]) {
    row[0] = 1.0;
    if row.len() == 1 {
        return;
    }
    row[1] = x;

    match basis {
        PolyBasis::Polynomial => {
            for k in 2..row.len() {
                row[k] = row[k - 1] * x;
            }
        }
        PolyBasis::Chebyshev => {
            for k in 2..row.len() {
                row[k] = 2.0 * x * row[k - 1] - row[k - 2];
            }
        }
        PolyBasis::Legendre => {
            for k in 2..row.len() {
                let n = (k - 1) as f64;
                row[k] = ((2.0 * n + 1.0) * x * row[k - 1] - n * row[k - 2]) / (n + 1.0);
            }
        }
    }
}

// Evaluate a coefficient series at x in [-1, 1] by forward recurrence.
fn eval_series(basis: PolyBasis, coeffs: &[f64], x: f64) -> f64 {
    match basis {
        PolyBasis::Polynomial => coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c),
        PolyBasis::Chebyshev => {
            let mut sum = coeffs[0];
            let (mut prev, mut cur) = (1.0, x);
            for &c in &coeffs[1..] {
                sum += c * cur;
                let next = 2.0 * x * cur - prev;
                prev = cur;
                cur = next;
            }
            sum
        }
        PolyBasis::Legendre => {
            let mut sum = coeffs[0];
            let (mut prev, mut cur) = (1.0, x);
            for (k, &c) in coeffs.iter().enumerate().skip(1) {
                sum += c * cur;
                let n = k as f64;
                let next = ((2.0 * n + 1.0) * x * cur - n * prev) / (n + 1.0);
                prev = cur;
                cur = next;
            }
            sum
        }
    }
}

// Derivative coefficients in the same basis, still in the scaled domain.
fn deriv_coeffs(basis: PolyBasis, coeffs: &[f64]) -> Vec<f64> {
    let deg = coeffs.len() - 1;
    if deg == 0 {
        return vec![0.0];
    }

    match basis {
        PolyBasis::Polynomial => (1..=deg).map(|k| k as f64 * coeffs[k]).collect(),
        PolyBasis::Chebyshev => {
            let mut c = coeffs.to_vec();
            let mut der = vec![0.0; deg];
            for j in (3..=deg).rev() {
                der[j - 1] = 2.0 * j as f64 * c[j];
                c[j - 2] += j as f64 * c[j] / (j as f64 - 2.0);
            }
            if deg > 1 {
                der[1] = 4.0 * c[2];
            }
            der[0] = c[1];
            der
        }
        PolyBasis::Legendre => {
            let mut c = coeffs.to_vec();
            let mut der = vec![0.0; deg];
            for j in (3..=deg).rev() {
                der[j - 1] = (2.0 * j as f64 - 1.0) * c[j];
                c[j - 2] += c[j];
            }
            if deg > 1 {
                der[1] = 3.0 * c[2];
            }
            der[0] = c[1];
            der
        }
    }
}

// Solve the symmetric positive definite system G x = b in place.
//
// The pivot guard is what turns a degenerate profile (all latitudes alike,
// too few distinct points) into a `SingularFit` instead of garbage
// coefficients.
fn cholesky_solve(m: usize, mut g: Vec<f64>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let max_diag = (0..m).map(|j| g[j * m + j]).fold(0.0, f64::max);
    let tol = PIVOT_TOL * max_diag.max(std::f64::MIN_POSITIVE);

    // Factor G = L Lᵀ, overwriting the lower triangle with L.
    for j in 0..m {
        for k in 0..=j {
            let mut sum = g[j * m + k];
            for i in 0..k {
                sum -= g[j * m + i] * g[k * m + i];
            }
            if j == k {
                if sum <= tol {
                    return Err(AnalysisError::SingularFit);
                }
                g[j * m + j] = sum.sqrt();
            } else {
                g[j * m + k] = sum / g[k * m + k];
            }
        }
    }

    // Forward substitution, L y = b.
    for j in 0..m {
        for i in 0..j {
            b[j] -= g[j * m + i] * b[i];
        }
        b[j] /= g[j * m + j];
    }

    // Back substitution, Lᵀ x = y.
    for j in (0..m).rev() {
        for i in j + 1..m {
            b[j] -= g[i * m + j] * b[i];
        }
        b[j] /= g[j * m + j];
    }

    Ok(b)
}
