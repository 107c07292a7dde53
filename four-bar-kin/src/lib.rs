//! Kinematic analysis of planar four-bar linkages.
//!
//! Given the four link lengths and the driving crank state (angle, angular
//! velocity, angular acceleration), this crate solves the loop-closure
//! constraint for the coupler and follower angles, then chains two linear
//! solves for their angular velocities and accelerations.
//!
//! ```
//! use four_bar_kin::FourBar;
//! use std::f64::consts::FRAC_PI_4;
//!
//! let fb = FourBar::new(2.5, 1., 2., 1.5)?;
//! let state = fb.analyze(FRAC_PI_4)?;
//! assert!(state.theta3.is_finite() && state.alpha4.is_finite());
//! # Ok::<(), four_bar_kin::Error>(())
//! ```
//!
//! Every operation is a pure function of its arguments and the immutable
//! [`FourBar`] value, so a shared linkage can be analyzed from any number of
//! threads without synchronization.
pub use crate::err::*;
pub use crate::fb::*;
pub use crate::kin::*;
pub use crate::solver::*;

mod err;
mod fb;
mod kin;
mod solver;
#[cfg(test)]
mod tests;
