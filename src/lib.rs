//! # RKF45: Runge-Kutta-Fehlberg 4(5) Integrator
//!
//! A general-purpose adaptive ODE integrator for control systems, physical
//! simulation and trajectory generation.
//!
//! ## Features
//!
//! - 6-stage embedded RK4(5) pair providing 5th-order accuracy
//! - Adaptive step-size control with 4th-order error estimation
//! - **Automatic initial step-size estimation** by bisection on the
//!   method's own single-trial error
//! - Accepted steps streamed to any caller-supplied sink (a closure, a
//!   buffer, a writer) — the integrator keeps no trajectory history
//! - Based on NASA TR R-315 (Erwin Fehlberg, 1969)
//! - Minimal dependencies (no external linear algebra required)
//! - Designed for embedding into larger simulation stacks
//!
//! ## Basic Usage
//!
//! ```rust
//! use rkf45::{hinit, OdeSystem, RhsError, Rkf45};
//!
//! // Define your ODE system
//! struct HarmonicOscillator { omega: f64 }
//!
//! impl OdeSystem<2> for HarmonicOscillator {
//!     fn rhs(&self, _t: f64, y: &[f64; 2], dydt: &mut [f64; 2]) -> Result<(), RhsError> {
//!         dydt[0] = y[1];
//!         dydt[1] = -self.omega * self.omega * y[0];
//!         Ok(())
//!     }
//! }
//!
//! let sys = HarmonicOscillator { omega: 1.0 };
//! let tol = 1e-10;
//!
//! // Estimate a starting step size, then integrate
//! let y0 = [1.0, 0.0];
//! let h0 = hinit(&sys, 0.0, 10.0, &y0, tol).unwrap();
//!
//! let mut solver = Rkf45::new(tol);
//! let mut y = y0;
//! let tf = solver
//!     .integrate(&sys, 0.0, 10.0, h0, &mut y, &mut |t: f64, y: &[f64; 2], _dx: &[f64; 2], err: f64| {
//!         // one call per accepted step, plus one for the initial condition
//!         let _ = (t, y, err);
//!     })
//!     .unwrap();
//! assert!(tf >= 10.0);
//! ```
//!
//! ## Step Acceptance and Overshoot
//!
//! The step-size controller accepts a step when the embedded-pair
//! discrepancy stays within ten times the error budget `tol`, and rescales
//! the step size after every attempt by the classical fourth-root law
//! `0.84 * (tol*h/err)^(1/4)`. Integration runs while the committed time is
//! `<= b`; the final accepted step may overshoot `b`. There is no dense
//! output or endpoint interpolation — callers needing samples at exact
//! times should bound the interval accordingly.
//!
//! ## Tolerance Selection
//!
//! `tol` is an absolute per-step budget on the embedded-pair discrepancy,
//! so it should be chosen relative to the scale of the state variables:
//!
//! - **Unit-scale problems** (oscillators, normalized dynamics):
//!   `tol ≈ 1e-8` to `1e-12`
//! - **Large-scale problems** (e.g. positions in km): loosen `tol`
//!   proportionally, or rescale the state
//!
//! ## Algorithm Details
//!
//! The six stage slopes K1..K6 are shared between a 4th- and a 5th-order
//! formula; their discrepancy estimates the local truncation error at
//! negligible extra cost. The solution advances with the 5th-order
//! estimate. The initial step-size estimator evaluates the same six-stage
//! trial (without committing state) and bisects the candidate bracket
//! `[tol, b-a]` for 32 iterations to find the largest step whose trial
//! error meets the budget.
//!
//! ## References
//!
//! 1. Fehlberg, E. (1969). "Low-Order Classical Runge-Kutta Formulas with
//!    Stepsize Control and their Application to Some Heat Transfer
//!    Problems". NASA TR R-315.
//!
//! 2. Hairer, E., Nørsett, S.P., & Wanner, G. (1993). "Solving
//!    Ordinary Differential Equations I: Nonstiff Problems".
//!    Springer.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod coefficients;
pub mod hinit;
pub mod solver;

pub use hinit::hinit;
pub use solver::{
    IntegrationError, OdeSystem, RhsError, Rkf45, Stats, StepController, StepResult, StepSink,
};
