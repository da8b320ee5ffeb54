//! End-to-end tests of the estimator-seeded adaptive integration pipeline.

use approx::assert_abs_diff_eq;
use rkf45::{hinit, IntegrationError, OdeSystem, RhsError, Rkf45};

/// Simple harmonic oscillator, y = cos(t), y' = -sin(t)
struct Sho;

impl OdeSystem<2> for Sho {
    fn rhs(&self, _t: f64, y: &[f64; 2], dydt: &mut [f64; 2]) -> Result<(), RhsError> {
        dydt[0] = y[1];
        dydt[1] = -y[0];
        Ok(())
    }
}

#[test]
fn estimator_seeded_integration() {
    // hinit -> integrate, the intended pipeline: no hand-tuned step size
    let tol = 1e-10;
    let a = 0.0;
    let b = 2.0 * std::f64::consts::PI;
    let y0 = [1.0, 0.0];

    let h0 = hinit(&Sho, a, b, &y0, tol).unwrap();
    assert!(h0 > 0.0 && h0 <= b - a);

    let mut solver = Rkf45::new(tol);
    let mut y = y0;
    let tf = solver
        .integrate(&Sho, a, b, h0, &mut y, &mut |_t: f64,
                                                 _y: &[f64; 2],
                                                 _dx: &[f64; 2],
                                                 _e: f64| {})
        .unwrap();

    assert!(tf >= b);
    assert_abs_diff_eq!(y[0], tf.cos(), epsilon = 1e-6);
    assert_abs_diff_eq!(y[1], -tf.sin(), epsilon = 1e-6);

    // A well-chosen initial step should not be rejected at the start
    assert!(solver.stats.accepted_steps > 0);
}

#[test]
fn trajectory_stream_is_ordered_and_complete() {
    let tol = 1e-9;
    let a = -1.0;
    let b = 1.0;

    let mut solver = Rkf45::new(tol);
    let mut y = [1.0, 0.0];
    let mut samples: Vec<(f64, [f64; 2])> = Vec::new();
    let tf = solver
        .integrate(&Sho, a, b, 0.05, &mut y, &mut |t: f64,
                                                   y: &[f64; 2],
                                                   _dx: &[f64; 2],
                                                   _e: f64| {
            samples.push((t, *y))
        })
        .unwrap();

    // First sample is the initial condition, last is the final state
    assert_eq!(samples.first().unwrap().0, a);
    assert_eq!(samples.last().unwrap().0, tf);
    assert_eq!(samples.last().unwrap().1, y);

    // Strictly increasing times; exactly one crosses b at the end
    for w in samples.windows(2) {
        assert!(w[1].0 > w[0].0);
    }
    let beyond = samples.iter().filter(|(t, _)| *t > b).count();
    assert_eq!(beyond, 1, "only the final sample may overshoot b");
}

#[test]
fn conservation_along_the_whole_trajectory() {
    // y1² + y2² stays near 1 at every accepted sample, not just the end
    let tol = 1e-10;
    let b = 2.0 * std::f64::consts::PI;

    let mut solver = Rkf45::new(tol);
    let mut y = [1.0, 0.0];
    let mut worst: f64 = 0.0;
    solver
        .integrate(&Sho, 0.0, b, 0.1, &mut y, &mut |_t: f64,
                                                    y: &[f64; 2],
                                                    _dx: &[f64; 2],
                                                    _e: f64| {
            worst = worst.max((y[0] * y[0] + y[1] * y[1] - 1.0).abs());
        })
        .unwrap();

    assert!(worst < 1e-6, "energy drift {:.3e} along trajectory", worst);
}

#[test]
fn identical_runs_produce_identical_streams() {
    let run = || {
        let mut solver = Rkf45::new(1e-8);
        let mut y = [1.0, 0.0];
        let mut stream: Vec<u64> = Vec::new();
        solver
            .integrate(&Sho, 0.0, 3.0, 0.02, &mut y, &mut |t: f64,
                                                           y: &[f64; 2],
                                                           dx: &[f64; 2],
                                                           e: f64| {
                stream.push(t.to_bits());
                stream.push(y[0].to_bits());
                stream.push(y[1].to_bits());
                stream.push(dx[0].to_bits());
                stream.push(dx[1].to_bits());
                stream.push(e.to_bits());
            })
            .unwrap();
        stream
    };

    assert_eq!(run(), run());
}

#[test]
fn failure_stops_the_stream_at_the_last_good_sample() {
    // The right-hand side fails mid-interval; every sample delivered
    // before the failure must still be valid, monotone output
    struct FailsAfter {
        t_limit: f64,
    }
    impl OdeSystem<1> for FailsAfter {
        fn rhs(&self, t: f64, y: &[f64; 1], dydt: &mut [f64; 1]) -> Result<(), RhsError> {
            if t > self.t_limit {
                return Err(RhsError::new(format!("model invalid past t = {}", self.t_limit)));
            }
            dydt[0] = -y[0];
            Ok(())
        }
    }

    let sys = FailsAfter { t_limit: 0.5 };
    let mut solver = Rkf45::new(1e-8);
    let mut y = [1.0];
    let mut times: Vec<f64> = Vec::new();
    let result = solver.integrate(&sys, 0.0, 2.0, 0.05, &mut y, &mut |t: f64,
                                                                      _y: &[f64; 1],
                                                                      _dx: &[f64; 1],
                                                                      _e: f64| {
        times.push(t)
    });

    assert!(matches!(result, Err(IntegrationError::RhsFailure { .. })));
    assert!(!times.is_empty());
    for w in times.windows(2) {
        assert!(w[1] > w[0]);
    }
    // Accepting a step requires every stage evaluation to succeed, so no
    // sample at or beyond the failure point was ever delivered
    assert!(times.iter().all(|&t| t < 0.5));
}
