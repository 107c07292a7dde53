//! Iterative position solve.
use crate::kin::solve2;
use crate::{Error, FourBar, Pose, Result};

const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e12;

/// Iteration budget and damping schedule of the position solve.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SolverCfg {
    /// Maximum iterations before reporting failure.
    pub max_iter: usize,
    /// Residual norm below which the iterate counts as a root.
    pub tol: f64,
    /// Initial Levenberg-Marquardt damping.
    pub lambda_init: f64,
    /// Factor applied to the damping on rejected (resp. accepted) steps.
    pub lambda_factor: f64,
}

impl Default for SolverCfg {
    fn default() -> Self {
        Self {
            max_iter: 100,
            tol: 1e-10,
            lambda_init: 1e-3,
            lambda_factor: 10.,
        }
    }
}

impl FourBar {
    /// Solve the closure constraint for `(theta3, theta4)` at `theta2`.
    ///
    /// Damped (Levenberg-Marquardt) iteration on the two closure residuals,
    /// seeded at `(theta2 + 0.1, theta2 + 0.1)`. The seed lies on the
    /// `theta3 = theta4` locus where the plain Newton Jacobian is singular,
    /// so the step is regularized until the residual decreases. The seed and
    /// schedule are fixed, so repeated calls with the same `theta2` return
    /// the same root; which assembly branch that root lies on depends on the
    /// seed, not on a caller choice. Use
    /// [`position_branch`](Self::position_branch) to pin the branch
    /// explicitly.
    pub fn position_analysis(&self, theta2: f64) -> Result<Pose> {
        self.position_with(theta2, &SolverCfg::default())
    }

    /// [`position_analysis`](Self::position_analysis) with an explicit
    /// iteration budget.
    ///
    /// Fails with [`Error::ConvergenceFailure`] when the budget runs out or
    /// no damping produces a descent step (the loop has no root at this
    /// crank angle); the error carries the last residual norm instead of an
    /// unconverged pose.
    pub fn position_with(&self, theta2: f64, cfg: &SolverCfg) -> Result<Pose> {
        let mut theta3 = theta2 + 0.1;
        let mut theta4 = theta2 + 0.1;
        let mut lambda = cfg.lambda_init;
        let mut residual = f64::INFINITY;
        for iter in 0..cfg.max_iter {
            let [f1, f2] = self.closure_residual(theta2, theta3, theta4);
            residual = f1.hypot(f2);
            log::trace!("position iter {iter}: residual {residual:.3e}, lambda {lambda:.1e}");
            if residual < cfg.tol {
                log::debug!("position solve converged in {iter} iterations");
                return Ok(Pose { theta3, theta4 });
            }
            // Gauss-Newton normal equations (J^T J + lambda I) d = -J^T f,
            // where J is the velocity coefficient matrix.
            let [[a11, a12], [a21, a22]] = self.coeff_matrix(theta3, theta4);
            let m11 = a11 * a11 + a21 * a21;
            let m12 = a11 * a12 + a21 * a22;
            let m22 = a12 * a12 + a22 * a22;
            let g = [a11 * f1 + a21 * f2, a12 * f1 + a22 * f2];
            loop {
                let m = [[m11 + lambda, m12], [m12, m22 + lambda]];
                if let Some([d3, d4]) = solve2(m, [-g[0], -g[1]], 0.) {
                    let [f1, f2] = self.closure_residual(theta2, theta3 + d3, theta4 + d4);
                    if f1.hypot(f2) < residual {
                        theta3 += d3;
                        theta4 += d4;
                        lambda = (lambda / cfg.lambda_factor).max(LAMBDA_MIN);
                        break;
                    }
                }
                lambda *= cfg.lambda_factor;
                if lambda > LAMBDA_MAX {
                    return Err(Error::ConvergenceFailure { iterations: iter, residual });
                }
            }
        }
        Err(Error::ConvergenceFailure { iterations: cfg.max_iter, residual })
    }
}
