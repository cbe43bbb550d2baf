//! Scalar root finding for the velocity force balance.
use crate::errors::HydError;
use log::{debug, warn};

/// Settings for [newton].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonConfig {
    /// Starting guess.
    pub x0: f64,
    /// Absolute step size at which the iteration stops.
    pub tol: f64,
    /// Iteration limit.
    pub max_iter: usize,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        NewtonConfig {
            x0: 1.0,
            tol: 1.48e-8,
            max_iter: 50,
        }
    }
}

/// Find a root of `f` by Newton iteration, estimating the derivative from the last two iterates
/// (secant update).
///
/// # Examples
/// ```
/// use forest_hydraulics::solver::{newton, NewtonConfig};
/// let root = newton(|x| x * x - 2.0, &NewtonConfig::default()).unwrap();
/// assert!((root - 2f64.sqrt()).abs() < 1e-8);
/// ```
pub fn newton<F: FnMut(f64) -> f64>(mut f: F, config: &NewtonConfig) -> Result<f64, HydError> {
    let mut p0 = config.x0;
    let step = if p0 >= 0.0 { 1e-4 } else { -1e-4 };
    let mut p1 = p0 * (1.0 + 1e-4) + step;
    let mut q0 = f(p0);
    let mut q1 = f(p1);
    if q1.abs() < q0.abs() {
        std::mem::swap(&mut p0, &mut p1);
        std::mem::swap(&mut q0, &mut q1);
    }
    for i in 0..config.max_iter {
        if !q0.is_finite() || !q1.is_finite() {
            return Err(HydError::SolveFailed {
                iterations: i,
                last: p1,
            });
        }
        if q1 == q0 {
            if p1 != p0 {
                warn!("Secant slope vanished, step {:e}", p1 - p0);
            }
            return Ok((p1 + p0) / 2.0);
        }
        let p = if q1.abs() > q0.abs() {
            (-q0 / q1 * p1 + p0) / (1.0 - q0 / q1)
        } else {
            (-q1 / q0 * p0 + p1) / (1.0 - q1 / q0)
        };
        if (p - p1).abs() < config.tol {
            debug!("Converged on {} after {} iterations", p, i + 1);
            return Ok(p);
        }
        p0 = p1;
        q0 = q1;
        p1 = p;
        q1 = f(p1);
    }
    Err(HydError::SolveFailed {
        iterations: config.max_iter,
        last: p1,
    })
}
