//! Automatic initial step-size estimation.
//!
//! Seeds [`Rkf45::integrate`](crate::Rkf45::integrate) with a step size that
//! already satisfies the error budget, so callers do not have to guess one.
//! The estimate is found by bisecting on the single-trial embedded-pair
//! discrepancy of the method itself.

use crate::coefficients::{A, B, B_HAT, C, STAGES};
use crate::solver::{IntegrationError, OdeSystem};

/// Fixed number of bisection iterations, ~2^-32 relative bracket precision
const BISECT_ITERS: usize = 32;

/// Estimate the largest step size whose single-trial local error stays
/// under `tol`.
///
/// Evaluates the six RKF45 stages once per candidate step size, in the
/// scaled form where each stage slope already carries the `h` factor, and
/// takes the worst embedded-pair discrepancy over all equations as the
/// trial error. The candidate bracket `[tol, b - a]` is bisected for a
/// fixed 32 iterations: a trial error under `tol` raises the lower bound,
/// anything else lowers the upper bound. The final midpoint is returned.
///
/// Unlike the stepper, the trial is anchored at the unadvanced time `a`
/// (stage i at `a + c_i*h`); neither `a` nor `y` is updated.
///
/// If even the smallest candidate violates the budget (a very stiff region
/// near `a`), the search still runs to completion and returns a degenerate
/// near-`tol` step; no failure is signaled.
///
/// # Errors
/// Rejects non-finite input, `tol <= 0` and `a >= b`; propagates
/// right-hand-side failures.
///
/// # Example
/// ```
/// use rkf45::{hinit, OdeSystem, RhsError, Rkf45};
///
/// struct ExpDecay;
///
/// impl OdeSystem<1> for ExpDecay {
///     fn rhs(&self, _t: f64, y: &[f64; 1], dydt: &mut [f64; 1]) -> Result<(), RhsError> {
///         dydt[0] = -y[0];
///         Ok(())
///     }
/// }
///
/// let tol = 1e-8;
/// let h0 = hinit(&ExpDecay, 0.0, 5.0, &[1.0], tol).unwrap();
/// assert!(h0 > 0.0 && h0 <= 5.0);
///
/// let mut solver = Rkf45::new(tol);
/// let mut y = [1.0];
/// solver
///     .integrate(&ExpDecay, 0.0, 5.0, h0, &mut y, &mut |_t: f64, _y: &[f64; 1], _dx: &[f64; 1], _e: f64| {})
///     .unwrap();
/// ```
pub fn hinit<const N: usize, S>(
    sys: &S,
    a: f64,
    b: f64,
    y: &[f64; N],
    tol: f64,
) -> Result<f64, IntegrationError>
where
    S: OdeSystem<N>,
{
    if !a.is_finite() || !b.is_finite() {
        return Err(IntegrationError::InvalidInput {
            message: "a and b must be finite".to_string(),
        });
    }
    if a >= b {
        return Err(IntegrationError::InvalidInput {
            message: format!("step estimation requires a < b (got a = {}, b = {})", a, b),
        });
    }
    if !tol.is_finite() || tol <= 0.0 {
        return Err(IntegrationError::InvalidInput {
            message: format!("tol must be positive and finite (got {})", tol),
        });
    }
    for (i, &val) in y.iter().enumerate() {
        if !val.is_finite() {
            return Err(IntegrationError::InvalidInput {
                message: format!("y[{}] is not finite", i),
            });
        }
    }

    let mut k = [[0.0; N]; STAGES];
    let mut y_trial = [0.0; N];

    // Single-trial error functional: worst |rk5 - rk4| over all equations
    // for one attempt of size h, with k[i] = h * f(...)
    let mut rel = |h: f64| -> Result<f64, IntegrationError> {
        sys.rhs(a, y, &mut k[0])
            .map_err(|source| IntegrationError::RhsFailure { t: a, source })?;
        for n in 0..N {
            k[0][n] *= h;
        }

        for i in 1..STAGES {
            for n in 0..N {
                let mut sum = 0.0;
                for j in 0..i {
                    sum += A[i][j] * k[j][n];
                }
                y_trial[n] = y[n] + sum;
            }
            sys.rhs(a + C[i] * h, &y_trial, &mut k[i])
                .map_err(|source| IntegrationError::RhsFailure { t: a, source })?;
            for n in 0..N {
                k[i][n] *= h;
            }
        }

        let mut worst: f64 = 0.0;
        for n in 0..N {
            let mut sum5 = 0.0;
            let mut sum4 = 0.0;
            for i in 0..STAGES {
                sum5 += B[i] * k[i][n];
                sum4 += B_HAT[i] * k[i][n];
            }
            let rk5 = y[n] + sum5;
            let rk4 = y[n] + sum4;
            worst = worst.max((rk5 - rk4).abs());
        }
        Ok(worst)
    };

    let mut lo = tol;
    let mut hi = b - a;
    let mut mid = 0.5 * (lo + hi);

    for _ in 0..BISECT_ITERS {
        mid = 0.5 * (lo + hi);
        if rel(mid)? < tol {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Ok(mid)
}
