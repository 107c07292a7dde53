//! Analysis errors.
use thiserror::Error;

/// Failure of a linkage construction or analysis stage.
///
/// Each variant maps to exactly one stage, so [`FourBar::analyze`] callers
/// can tell where a chained analysis stopped from the variant alone.
///
/// [`FourBar::analyze`]: crate::FourBar::analyze
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A link length is zero, negative, or non-finite.
    #[error("link lengths must be positive and finite")]
    InvalidLinkage,
    /// The position solve exhausted its iteration budget, or its Jacobian
    /// became singular before the residual reached tolerance.
    #[error("position solve did not converge after {iterations} iterations (residual {residual:.3e})")]
    ConvergenceFailure {
        /// Iterations performed before giving up.
        iterations: usize,
        /// Loop-closure residual norm at the last iterate.
        residual: f64,
    },
    /// The coupler and follower are collinear (dead point), so the
    /// velocity/acceleration coefficient matrix is singular.
    #[error("singular configuration: coupler and follower are collinear")]
    SingularConfiguration,
    /// The crank angle places the coupler-follower joint out of reach; the
    /// loop cannot be closed at this input angle.
    #[error("linkage cannot be assembled at the given crank angle")]
    Unassemblable,
}

/// Alias for analysis results.
pub type Result<T, E = Error> = std::result::Result<T, E>;
