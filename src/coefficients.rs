//! Runge-Kutta-Fehlberg 4(5) Coefficients
//!
//! Coefficients for the 6-stage embedded RK4(5) pair from:
//! Fehlberg, E. (1969). "Low-Order Classical Runge-Kutta Formulas with
//! Stepsize Control and their Application to Some Heat Transfer Problems"
//! NASA TR R-315, Table III.
//!
//! This method advances the solution with the 5th-order formula and uses
//! the embedded 4th-order formula for error estimation and adaptive step
//! control.

/// Number of stages in the RKF45 method
pub const STAGES: usize = 6;

/// Order of the higher-order method (used for advancing the solution)
pub const ORDER: u8 = 5;

/// Order of the embedded method (used for error estimation)
pub const EMBEDDED_ORDER: u8 = 4;

/// Node coefficients (c_i) - the points at which f(t,y) is evaluated
/// c[i] represents t_n + c[i]*h
///
/// From NASA TR R-315, Table III (α values)
pub const C: [f64; STAGES] = [
    0.0,         // c[0]
    1.0 / 4.0,   // c[1]  = 1/4
    3.0 / 8.0,   // c[2]  = 3/8
    12.0 / 13.0, // c[3]  = 12/13
    1.0,         // c[4]  = 1
    0.5,         // c[5]  = 1/2
];

/// Runge-Kutta matrix (a_ij) coefficients
///
/// This is the lower-triangular matrix where:
/// k_i = f(t_n + c_i*h, y_n + h * sum_{j=0}^{i-1} a_{i,j} * k_j)
///
/// Stored as A[i][j] for row i, column j (j < i)
/// From NASA TR R-315, Table III (β values)
pub const A: [[f64; 5]; STAGES] = [
    // Row 0: k_0 = f(t_n, y_n)
    [0.0; 5],
    // Row 1: k_1 = f(t_n + (1/4)*h, y_n + h*(1/4)*k_0)
    [1.0 / 4.0, 0.0, 0.0, 0.0, 0.0],
    // Row 2: k_2
    [3.0 / 32.0, 9.0 / 32.0, 0.0, 0.0, 0.0],
    // Row 3: k_3
    [1932.0 / 2197.0, -7200.0 / 2197.0, 7296.0 / 2197.0, 0.0, 0.0],
    // Row 4: k_4
    [439.0 / 216.0, -8.0, 3680.0 / 513.0, -845.0 / 4104.0, 0.0],
    // Row 5: k_5
    [-8.0 / 27.0, 2.0, -3544.0 / 2565.0, 1859.0 / 4104.0, -11.0 / 40.0],
];

/// Weights for the 5th-order solution (b_i)
///
/// y_{n+1} = y_n + h * sum_{i=0}^{5} b[i] * k_i
///
/// From NASA TR R-315, Table III (ĉ values)
pub const B: [f64; STAGES] = [
    16.0 / 135.0,      // b[0]
    0.0,               // b[1]
    6656.0 / 12825.0,  // b[2]
    28561.0 / 56430.0, // b[3]
    -9.0 / 50.0,       // b[4]
    2.0 / 55.0,        // b[5]
];

/// Weights for the embedded 4th-order solution (b_hat_i)
///
/// y*_{n+1} = y_n + h * sum_{i=0}^{5} b_hat[i] * k_i
///
/// The 4th-order solution uses stages 0, 2, 3, 4 only.
///
/// From NASA TR R-315, Table III (c values)
pub const B_HAT: [f64; STAGES] = [
    25.0 / 216.0,    // b_hat[0]
    0.0,             // b_hat[1]
    1408.0 / 2565.0, // b_hat[2]
    2197.0 / 4104.0, // b_hat[3]
    -1.0 / 5.0,      // b_hat[4]
    0.0,             // b_hat[5]
];

/// Verify that the Butcher tableau satisfies the row-sum condition
/// sum_j(a_{i,j}) = c_i for all i
#[cfg(test)]
mod tests {
    use super::*;

    // Summation of ~6 f64 terms accumulates ~O(n*eps) roundoff
    const TOL: f64 = 1e-14;

    #[test]
    fn test_row_sum_condition() {
        for i in 0..STAGES {
            let row_sum: f64 = A[i].iter().sum();
            let expected = C[i];
            assert!(
                (row_sum - expected).abs() < TOL,
                "Row {} sum = {}, expected c[{}] = {}",
                i,
                row_sum,
                i,
                expected
            );
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let b_sum: f64 = B.iter().sum();
        assert!(
            (b_sum - 1.0).abs() < TOL,
            "5th order weights sum to {}, expected 1.0",
            b_sum
        );

        let b_hat_sum: f64 = B_HAT.iter().sum();
        assert!(
            (b_hat_sum - 1.0).abs() < TOL,
            "4th order weights sum to {}, expected 1.0",
            b_hat_sum
        );
    }

    #[test]
    fn test_specific_coefficients() {
        // Verify some specific values from the table
        assert!((C[1] - 1.0 / 4.0).abs() < TOL);
        assert!((C[3] - 12.0 / 13.0).abs() < TOL);
        assert!((C[5] - 0.5).abs() < TOL);

        // Verify weights
        assert!((B[0] - 16.0 / 135.0).abs() < TOL);
        assert!((B[3] - 28561.0 / 56430.0).abs() < TOL);
        assert!((B_HAT[0] - 25.0 / 216.0).abs() < TOL);
    }

    #[test]
    fn test_embedded_pair_differs_in_last_stage() {
        // The 4th-order formula must not use k_5; the 5th-order one must.
        // Their difference is what drives the error estimate.
        assert_eq!(B_HAT[5], 0.0);
        assert!(B[5] != 0.0);
        assert!((B[0] - B_HAT[0]).abs() > TOL);
    }
}
