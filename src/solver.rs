//! Runge-Kutta-Fehlberg 4(5) Integrator
//!
//! A 6-stage embedded RK4(5) pair with adaptive step-size control against a
//! scalar per-step error budget. Accepted steps are streamed to a caller
//! supplied sink, making the integrator usable for trajectory generation,
//! control-system simulation and plain curve tabulation alike.
//!
//! Reference: NASA TR R-315, Erwin Fehlberg, 1969

use thiserror::Error;

use crate::coefficients::{A, B, B_HAT, C, STAGES};

/// Safety factor of the step-size rescale law
const SAFETY: f64 = 0.84;

/// Exponent of the step-size rescale law, 1/(embedded order)
const EXPONENT: f64 = 0.25;

/// A step is rejected when its error estimate exceeds `tol` by this factor
const REJECT_MARGIN: f64 = 10.0;

/// System of ordinary differential equations: dy/dt = f(t, y)
pub trait OdeSystem<const N: usize> {
    /// Evaluate the right-hand side of the ODE system
    ///
    /// # Arguments
    /// * `t` - Current time
    /// * `y` - Current state vector
    /// * `dydt` - Output: derivative dy/dt
    ///
    /// # Errors
    /// Return an [`RhsError`] if the derivative cannot be evaluated at
    /// `(t, y)` (singular expression, state outside the model's domain).
    /// The integrator aborts and propagates the failure to the caller.
    fn rhs(&self, t: f64, y: &[f64; N], dydt: &mut [f64; N]) -> Result<(), RhsError>;
}

/// Sink for accepted integration steps.
///
/// The integrator calls `on_step` once with the initial condition (error
/// vector and magnitude both zero) before taking any step, then once per
/// accepted step, in strictly increasing time order. Rejected attempts
/// produce no call. The sink may buffer, print, forward to a channel or
/// discard the samples; the integrator itself keeps no trajectory history.
pub trait StepSink<const N: usize> {
    /// Receive one accepted sample.
    ///
    /// # Arguments
    /// * `t` - Time of the sample
    /// * `y` - Solution at `t` (the 5th-order estimate)
    /// * `dx` - Per-equation local error estimate for the step (the raw
    ///   5th-order stage combination, not scaled by the step size)
    /// * `mrel` - Largest embedded-pair discrepancy over all equations,
    ///   exactly the quantity the accept test used
    fn on_step(&mut self, t: f64, y: &[f64; N], dx: &[f64; N], mrel: f64);
}

impl<const N: usize, F> StepSink<N> for F
where
    F: FnMut(f64, &[f64; N], &[f64; N], f64),
{
    fn on_step(&mut self, t: f64, y: &[f64; N], dx: &[f64; N], mrel: f64) {
        self(t, y, dx, mrel)
    }
}

/// Integration result from a single step attempt
#[derive(Debug, Clone)]
pub struct StepResult<const N: usize> {
    /// New state after the step (5th order solution)
    pub y: [f64; N],
    /// New time value
    pub t: f64,
    /// Per-equation local error estimate (5th-order stage combination)
    pub dx: [f64; N],
    /// Largest embedded-pair discrepancy |rk5 - rk4| over all equations
    pub mrel: f64,
    /// Rescale factor for the step size after this attempt
    pub factor: f64,
    /// Whether the step was accepted
    pub accepted: bool,
}

/// Integration statistics for diagnostics
#[derive(Debug, Clone, Default)]
pub struct Stats {
    /// Total number of right-hand-side evaluations
    pub rhs_evals: u64,
    /// Number of accepted steps
    pub accepted_steps: u64,
    /// Number of rejected steps
    pub rejected_steps: u64,
}

/// Step-size controller using the classical RKF rescale law
///
/// factor = safety * (tol * h / mrel)^exponent
///
/// applied after every attempt: shrinks the step after a rejection, and
/// either grows or shrinks it after an acceptance depending on how far the
/// error estimate sits below the budget.
#[derive(Debug, Clone)]
pub struct StepController {
    /// Safety factor (0.84 classical)
    pub safety: f64,
    /// Exponent (1/4 for the 4th-order error estimate)
    pub exponent: f64,
    /// Growth factor used when the error estimate vanishes, where the
    /// rescale law would otherwise divide by zero
    pub zero_error_growth: f64,
}

impl Default for StepController {
    fn default() -> Self {
        Self {
            safety: SAFETY,
            exponent: EXPONENT,
            zero_error_growth: 4.0,
        }
    }
}

impl StepController {
    /// Compute the step size adjustment factor for an attempt with step
    /// size `h` whose worst embedded-pair discrepancy was `mrel`.
    pub fn factor(&self, tol: f64, h: f64, mrel: f64) -> f64 {
        if mrel == 0.0 {
            return self.zero_error_growth;
        }
        self.safety * (tol * h / mrel).powf(self.exponent)
    }
}

/// Runge-Kutta-Fehlberg 4(5) integrator
///
/// # Type Parameters
/// * `N` - Dimension of the state vector
///
/// # Example
/// ```
/// use rkf45::{OdeSystem, RhsError, Rkf45};
///
/// struct HarmonicOscillator {
///     omega: f64,
/// }
///
/// impl OdeSystem<2> for HarmonicOscillator {
///     fn rhs(&self, _t: f64, y: &[f64; 2], dydt: &mut [f64; 2]) -> Result<(), RhsError> {
///         dydt[0] = y[1];
///         dydt[1] = -self.omega * self.omega * y[0];
///         Ok(())
///     }
/// }
///
/// let sys = HarmonicOscillator { omega: 1.0 };
/// let mut solver = Rkf45::new(1e-10);
///
/// let mut y = [1.0, 0.0];
/// let tf = solver
///     .integrate(&sys, 0.0, 10.0, 0.1, &mut y, &mut |_t: f64, _y: &[f64; 2], _dx: &[f64; 2], _e: f64| {})
///     .unwrap();
/// assert!(tf >= 10.0);
/// ```
#[derive(Clone)]
pub struct Rkf45<const N: usize> {
    /// Per-step error budget
    tol: f64,
    /// Step-size controller
    pub controller: StepController,
    /// Maximum number of step attempts before error
    pub max_steps: u64,
    /// Maximum number of consecutive rejections before error
    pub max_rejects: u32,
    /// Stage evaluations (pre-allocated workspace)
    k: [[f64; N]; STAGES],
    /// Integration statistics
    pub stats: Stats,
}

impl<const N: usize> Rkf45<N> {
    /// Create a new RKF45 solver with the given per-step error budget
    pub fn new(tol: f64) -> Self {
        Self {
            tol,
            controller: StepController::default(),
            max_steps: 10_000_000,
            max_rejects: 64,
            k: [[0.0; N]; STAGES],
            stats: Stats::default(),
        }
    }

    /// The per-step error budget this solver was built with
    pub fn tol(&self) -> f64 {
        self.tol
    }

    /// Perform a single step attempt from committed time `t` with step `h`
    ///
    /// This computes the 6 stages, forms the 5th and 4th order solutions,
    /// takes the worst per-equation discrepancy as the error estimate, and
    /// determines whether the step is accepted. The committed state is
    /// untouched; [`Rkf45::integrate`] owns the commit.
    ///
    /// The trial is anchored at the advanced time: the first stage is
    /// evaluated at `t + h` and stage i at `t + h + c_i*h`.
    ///
    /// # Errors
    /// Propagates a right-hand-side failure as
    /// [`IntegrationError::RhsFailure`].
    pub fn step<S: OdeSystem<N>>(
        &mut self,
        sys: &S,
        t: f64,
        y: &[f64; N],
        h: f64,
    ) -> Result<StepResult<N>, IntegrationError> {
        let tn = t + h;

        self.compute_stages(sys, tn, y, h)
            .map_err(|source| IntegrationError::RhsFailure { t, source })?;
        self.stats.rhs_evals += STAGES as u64;

        let mut y_new = [0.0; N];
        let mut dx = [0.0; N];
        let mut mrel: f64 = 0.0;

        for n in 0..N {
            let mut sum5 = 0.0;
            let mut sum4 = 0.0;
            for i in 0..STAGES {
                sum5 += B[i] * self.k[i][n];
                sum4 += B_HAT[i] * self.k[i][n];
            }

            let rk5 = y[n] + h * sum5;
            let rk4 = y[n] + h * sum4;

            // >= keeps the last equation attaining the maximum in charge
            let rel = (rk5 - rk4).abs();
            if rel >= mrel {
                mrel = rel;
            }

            dx[n] = sum5;
            y_new[n] = rk5;
        }

        let factor = self.controller.factor(self.tol, h, mrel);
        let accepted = mrel <= REJECT_MARGIN * self.tol;

        if accepted {
            self.stats.accepted_steps += 1;
        } else {
            self.stats.rejected_steps += 1;
        }

        Ok(StepResult {
            y: y_new,
            t: tn,
            dx,
            mrel,
            factor,
            accepted,
        })
    }

    /// Integrate from `a` to `b`
    ///
    /// Starts with step size `h` and rescales it after every attempt. The
    /// sink receives the initial condition first, then every accepted step.
    /// The loop runs while the committed time is `<= b`, so the final
    /// accepted step may overshoot `b`; there is no endpoint interpolation.
    ///
    /// # Arguments
    /// * `sys` - The ODE system to integrate
    /// * `a` - Initial time
    /// * `b` - Final time bound
    /// * `h` - Initial step size (see [`crate::hinit()`] for an automatic guess)
    /// * `y` - State vector, holds the initial condition on entry and the
    ///   final accepted sample on return
    /// * `sink` - Receiver for accepted samples
    ///
    /// # Returns
    /// * `Ok(t_final)` - the committed time of the last accepted step
    /// * `Err(IntegrationError)` on invalid input or failure to progress
    pub fn integrate<S, O>(
        &mut self,
        sys: &S,
        a: f64,
        b: f64,
        h: f64,
        y: &mut [f64; N],
        sink: &mut O,
    ) -> Result<f64, IntegrationError>
    where
        S: OdeSystem<N>,
        O: StepSink<N>,
    {
        self.validate_inputs(a, b, h, y)?;

        let mut t = a;
        let mut h = h;

        sink.on_step(t, y, &[0.0; N], 0.0);

        let mut attempts = 0u64;
        let mut consecutive_rejects = 0u32;

        while t <= b {
            if !h.is_finite() || h <= 0.0 {
                return Err(IntegrationError::StepSizeUnderflow { t, h });
            }

            let result = self.step(sys, t, y, h)?;

            if result.accepted {
                t = result.t;
                *y = result.y;
                if !y.iter().all(|v| v.is_finite()) {
                    return Err(IntegrationError::NonFiniteState { t });
                }
                consecutive_rejects = 0;
                sink.on_step(t, y, &result.dx, result.mrel);
            } else {
                consecutive_rejects += 1;
                if consecutive_rejects > self.max_rejects {
                    return Err(IntegrationError::TooManyRejections { t, h });
                }
            }

            h *= result.factor;

            attempts += 1;
            if attempts > self.max_steps {
                return Err(IntegrationError::MaxStepsExceeded);
            }
        }

        Ok(t)
    }

    /// Compute all 6 stages, anchored at the advanced time `tn`
    #[allow(clippy::needless_range_loop)]
    fn compute_stages<S: OdeSystem<N>>(
        &mut self,
        sys: &S,
        tn: f64,
        y: &[f64; N],
        h: f64,
    ) -> Result<(), RhsError> {
        let mut y_trial = [0.0; N];

        // Stage 0: k[0] = f(tn, y)
        sys.rhs(tn, y, &mut self.k[0])?;

        // Stages 1-5
        for i in 1..STAGES {
            // y_trial = y + h * sum_{j=0}^{i-1} a[i][j] * k[j]
            for n in 0..N {
                let mut sum = 0.0;
                for j in 0..i {
                    sum += A[i][j] * self.k[j][n];
                }
                y_trial[n] = y[n] + h * sum;
            }

            // k[i] = f(tn + c[i]*h, y_trial)
            sys.rhs(tn + C[i] * h, &y_trial, &mut self.k[i])?;
        }

        Ok(())
    }

    /// Reset statistics
    pub fn reset_stats(&mut self) {
        self.stats = Stats::default();
    }

    /// Validate integration inputs
    fn validate_inputs(
        &self,
        a: f64,
        b: f64,
        h: f64,
        y: &[f64; N],
    ) -> Result<(), IntegrationError> {
        if !a.is_finite() || !b.is_finite() || !h.is_finite() {
            return Err(IntegrationError::InvalidInput {
                message: "a, b, and h must be finite".to_string(),
            });
        }
        if h <= 0.0 {
            return Err(IntegrationError::InvalidInput {
                message: format!("h must be positive (got {})", h),
            });
        }
        if a > b {
            return Err(IntegrationError::InvalidInput {
                message: format!("forward integration requires a <= b (got a = {}, b = {})", a, b),
            });
        }
        if !self.tol.is_finite() || self.tol <= 0.0 {
            return Err(IntegrationError::InvalidInput {
                message: format!("tol must be positive and finite (got {})", self.tol),
            });
        }
        for (i, &val) in y.iter().enumerate() {
            if !val.is_finite() {
                return Err(IntegrationError::InvalidInput {
                    message: format!("y[{}] is not finite", i),
                });
            }
        }
        Ok(())
    }
}

/// Failure raised by an [`OdeSystem`] right-hand-side evaluation
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RhsError {
    /// Description of the failure
    pub message: String,
}

impl RhsError {
    /// Create a right-hand-side failure with the given description
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that can occur during integration
#[derive(Debug, Clone, Error)]
pub enum IntegrationError {
    /// Invalid input parameters
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the invalid input
        message: String,
    },
    /// Too many consecutive step rejections without progress
    #[error("too many consecutive step rejections at t = {t} (h = {h})")]
    TooManyRejections {
        /// Committed time at which progress stalled
        t: f64,
        /// Step size of the last rejected attempt
        h: f64,
    },
    /// Maximum number of step attempts exceeded
    #[error("maximum number of integration steps exceeded")]
    MaxStepsExceeded,
    /// Step size shrank to zero or became non-finite
    #[error("step size underflowed to {h} at t = {t}")]
    StepSizeUnderflow {
        /// Committed time at which the step size degenerated
        t: f64,
        /// The degenerate step size
        h: f64,
    },
    /// Non-finite state detected after an accepted step
    #[error("non-finite state detected at t = {t}")]
    NonFiniteState {
        /// Time at which the non-finite state was committed
        t: f64,
    },
    /// Right-hand-side evaluation failed
    #[error("right-hand side evaluation failed near t = {t}")]
    RhsFailure {
        /// Committed time of the failing attempt
        t: f64,
        /// The underlying failure
        #[source]
        source: RhsError,
    },
}
