//! Streaming per-step output — exponential decay.
//!
//! Integrates y' = -y and prints every accepted sample as it is produced,
//! together with the step's error estimate. The sink is a plain closure;
//! nothing is buffered inside the integrator.
//!
//! Run with:
//!   cargo run --example exponential_decay

use rkf45::{OdeSystem, RhsError, Rkf45};

/// y' = -y, exact solution y = exp(-t)
struct ExpDecay;

impl OdeSystem<1> for ExpDecay {
    fn rhs(&self, _t: f64, y: &[f64; 1], dydt: &mut [f64; 1]) -> Result<(), RhsError> {
        dydt[0] = -y[0];
        Ok(())
    }
}

fn main() {
    let mut solver = Rkf45::new(1e-8);
    let mut y = [1.0];

    println!("{:>12}  {:>20}  {:>20}  {:>12}", "t", "y", "exact", "step err");

    let tf = solver
        .integrate(&ExpDecay, 0.0, 5.0, 0.1, &mut y, &mut |t: f64,
                                                           y: &[f64; 1],
                                                           _dx: &[f64; 1],
                                                           err: f64| {
            println!("{:>12.6}  {:>20.12}  {:>20.12}  {:>12.3e}", t, y[0], (-t).exp(), err);
        })
        .unwrap();

    println!();
    println!("Final time:  {tf:.6}");
    println!("Final error: {:.3e}", (y[0] - (-tf).exp()).abs());
    println!("Stats:       {:?}", solver.stats);
}
