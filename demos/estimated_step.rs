//! Automatic initial step-size estimation.
//!
//! Uses `hinit` to find the largest step size whose single-trial error
//! meets the budget, then seeds the integrator with it. Compare the step
//! counts against a deliberately bad hand-picked starting step.
//!
//! Run with:
//!   cargo run --example estimated_step

use rkf45::{hinit, OdeSystem, RhsError, Rkf45};

/// Van der Pol oscillator with mild damping
struct VanDerPol {
    mu: f64,
}

impl OdeSystem<2> for VanDerPol {
    fn rhs(&self, _t: f64, y: &[f64; 2], dydt: &mut [f64; 2]) -> Result<(), RhsError> {
        dydt[0] = y[1];
        dydt[1] = self.mu * (1.0 - y[0] * y[0]) * y[1] - y[0];
        Ok(())
    }
}

fn run(label: &str, h0: f64) {
    let sys = VanDerPol { mu: 1.0 };
    let mut solver = Rkf45::new(1e-9);
    let mut y = [2.0, 0.0];

    let tf = solver
        .integrate(&sys, 0.0, 20.0, h0, &mut y, &mut |_t: f64,
                                                      _y: &[f64; 2],
                                                      _dx: &[f64; 2],
                                                      _e: f64| {})
        .unwrap();

    println!("{label}");
    println!("  h0:             {h0:.6e}");
    println!("  Final time:     {tf:.6}");
    println!("  Final state:    [{:.9}, {:.9}]", y[0], y[1]);
    println!("  Accepted steps: {}", solver.stats.accepted_steps);
    println!("  Rejected steps: {}", solver.stats.rejected_steps);
    println!();
}

fn main() {
    let sys = VanDerPol { mu: 1.0 };
    let tol = 1e-9;
    let y0 = [2.0, 0.0];

    let h0 = hinit(&sys, 0.0, 20.0, &y0, tol).unwrap();
    run("Estimated initial step", h0);
    run("Oversized initial step", 5.0);
}
