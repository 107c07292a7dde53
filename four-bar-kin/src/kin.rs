//! Loop-closure analysis stages.
//!
//! The closure constraint of the loop is
//!
//! ```text
//! l2 cos(t2) + l3 cos(t3) - l4 cos(t4) - l1 = 0
//! l2 sin(t2) + l3 sin(t3) - l4 sin(t4)      = 0
//! ```
//!
//! Differentiating once and twice in time yields two linear systems sharing
//! one coefficient matrix; its determinant `l3 * l4 * sin(t3 - t4)` vanishes
//! exactly at the dead points where the coupler and follower are collinear.
use crate::{Error, FourBar, Result};

/// Relative determinant tolerance below which the coefficient matrix is
/// treated as singular.
///
/// Matched to the position solve's accuracy near a fold: a residual tolerance
/// of 1e-10 pins the angles only to about its square root in the singular
/// direction, so a converged pose at a dead point can carry |sin(t3 - t4)| of
/// order 1e-5. The nearest well-conditioned poses sit orders of magnitude
/// above this threshold.
pub(crate) const DET_TOL: f64 = 1e-4;

/// The two unknown angles solved from the closure constraint.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pose {
    /// Coupler angle (rad)
    pub theta3: f64,
    /// Follower angle (rad)
    pub theta4: f64,
}

/// Assembly branch of the closed-form position solve.
///
/// A closable loop generically admits two joint positions, mirrored across
/// the crank-pin-to-follower-pivot chord.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Branch {
    /// Joint on the left of the chord, seen from the crank pin.
    Open,
    /// Joint on the right of the chord.
    Crossed,
}

/// Full kinematic state of the passive links for one crank state.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct KinState {
    /// Coupler angle (rad)
    pub theta3: f64,
    /// Follower angle (rad)
    pub theta4: f64,
    /// Coupler angular velocity (rad/s)
    pub omega3: f64,
    /// Follower angular velocity (rad/s)
    pub omega4: f64,
    /// Coupler angular acceleration (rad/s^2)
    pub alpha3: f64,
    /// Follower angular acceleration (rad/s^2)
    pub alpha4: f64,
}

/// Closed-form solve of `a * x = b` for a 2x2 `a`.
///
/// Returns `None` when `|det a|` is at or below `tol`.
pub(crate) fn solve2(a: [[f64; 2]; 2], b: [f64; 2], tol: f64) -> Option<[f64; 2]> {
    let det = a[0][0] * a[1][1] - a[0][1] * a[1][0];
    (det.abs() > tol).then(|| {
        [
            (b[0] * a[1][1] - b[1] * a[0][1]) / det,
            (a[0][0] * b[1] - a[1][0] * b[0]) / det,
        ]
    })
}

impl FourBar {
    /// Closure residual at `(theta2, theta3, theta4)`.
    ///
    /// Both components are zero (within tolerance) for any valid pose.
    pub fn closure_residual(&self, theta2: f64, theta3: f64, theta4: f64) -> [f64; 2] {
        [
            self.l2 * theta2.cos() + self.l3 * theta3.cos() - self.l4 * theta4.cos() - self.l1,
            self.l2 * theta2.sin() + self.l3 * theta3.sin() - self.l4 * theta4.sin(),
        ]
    }

    /// Coefficient matrix of the velocity and acceleration systems, also the
    /// Jacobian of [`closure_residual`](Self::closure_residual) in
    /// `(theta3, theta4)`.
    pub(crate) fn coeff_matrix(&self, theta3: f64, theta4: f64) -> [[f64; 2]; 2] {
        [
            [-self.l3 * theta3.sin(), self.l4 * theta4.sin()],
            [self.l3 * theta3.cos(), -self.l4 * theta4.cos()],
        ]
    }

    /// Length-scaled singularity threshold for the coefficient determinant.
    pub(crate) fn det_tol(&self) -> f64 {
        DET_TOL * self.l3 * self.l4
    }

    fn solve_coeff(&self, pose: &Pose, b: [f64; 2]) -> Result<[f64; 2]> {
        let a = self.coeff_matrix(pose.theta3, pose.theta4);
        solve2(a, b, self.det_tol()).ok_or(Error::SingularConfiguration)
    }

    /// Closed-form position solve on an explicit assembly branch.
    ///
    /// Intersects the coupler circle around the crank pin with the follower
    /// circle around the follower pivot. Unlike
    /// [`position_analysis`](Self::position_analysis) this cannot fail to
    /// converge; it fails only when the circles do not intersect
    /// ([`Error::Unassemblable`]).
    pub fn position_branch(&self, theta2: f64, branch: Branch) -> Result<Pose> {
        let (s2, c2) = theta2.sin_cos();
        // Chord from the crank pin to the follower pivot.
        let dx = self.l1 - self.l2 * c2;
        let dy = -self.l2 * s2;
        let r = dx.hypot(dy);
        if r > self.l3 + self.l4 || r < (self.l3 - self.l4).abs() || r < f64::EPSILON {
            return Err(Error::Unassemblable);
        }
        let e = (self.l3 * self.l3 - self.l4 * self.l4 + r * r) / (2. * r);
        let h = (self.l3 * self.l3 - e * e).max(0.).sqrt();
        let h = match branch {
            Branch::Open => h,
            Branch::Crossed => -h,
        };
        let (ux, uy) = (dx / r, dy / r);
        // Joint relative to the crank pin: chord offset plus normal offset.
        let jx = e * ux - h * uy;
        let jy = e * uy + h * ux;
        let theta3 = jy.atan2(jx);
        let px = self.l2 * c2 + jx;
        let py = self.l2 * s2 + jy;
        let theta4 = py.atan2(px - self.l1);
        Ok(Pose { theta3, theta4 })
    }

    /// Angular velocities `(omega3, omega4)` of coupler and follower.
    ///
    /// Solves the once-differentiated closure constraint for the given pose
    /// and crank rate. Fails with [`Error::SingularConfiguration`] at a dead
    /// point.
    pub fn velocity_analysis(&self, theta2: f64, omega2: f64, pose: &Pose) -> Result<(f64, f64)> {
        let (s2, c2) = theta2.sin_cos();
        let b = [self.l2 * omega2 * s2, -self.l2 * omega2 * c2];
        let [omega3, omega4] = self.solve_coeff(pose, b)?;
        Ok((omega3, omega4))
    }

    /// Angular accelerations `(alpha3, alpha4)` of coupler and follower.
    ///
    /// Same coefficient matrix and singularity contract as
    /// [`velocity_analysis`](Self::velocity_analysis); the right-hand side
    /// carries the centripetal terms of all three moving links.
    #[allow(clippy::too_many_arguments)]
    pub fn acceleration_analysis(
        &self,
        theta2: f64,
        omega2: f64,
        alpha2: f64,
        pose: &Pose,
        omega3: f64,
        omega4: f64,
    ) -> Result<(f64, f64)> {
        let (s2, c2) = theta2.sin_cos();
        let (s3, c3) = pose.theta3.sin_cos();
        let (s4, c4) = pose.theta4.sin_cos();
        let b = [
            self.l2 * (alpha2 * s2 + omega2 * omega2 * c2) + self.l3 * omega3 * omega3 * c3
                - self.l4 * omega4 * omega4 * c4,
            -self.l2 * (alpha2 * c2 - omega2 * omega2 * s2) + self.l3 * omega3 * omega3 * s3
                - self.l4 * omega4 * omega4 * s4,
        ];
        let [alpha3, alpha4] = self.solve_coeff(pose, b)?;
        Ok((alpha3, alpha4))
    }

    /// Full analysis at a nominal constant-speed crank
    /// (`omega2 = 1` rad/s, `alpha2 = 0`).
    pub fn analyze(&self, theta2: f64) -> Result<KinState> {
        self.analyze_with(theta2, 1., 0.)
    }

    /// Full analysis chain: position, then velocity, then acceleration.
    ///
    /// Each call is independent; the error variant identifies the failing
    /// stage. A pose that passes the velocity stage cannot fail the
    /// acceleration stage, since both share the coefficient matrix.
    pub fn analyze_with(&self, theta2: f64, omega2: f64, alpha2: f64) -> Result<KinState> {
        let pose = self.position_analysis(theta2)?;
        self.state_at(theta2, omega2, alpha2, pose)
    }

    /// Full analysis chain rooted at the closed-form solve of `branch`.
    pub fn analyze_branch(
        &self,
        theta2: f64,
        omega2: f64,
        alpha2: f64,
        branch: Branch,
    ) -> Result<KinState> {
        let pose = self.position_branch(theta2, branch)?;
        self.state_at(theta2, omega2, alpha2, pose)
    }

    fn state_at(&self, theta2: f64, omega2: f64, alpha2: f64, pose: Pose) -> Result<KinState> {
        let (omega3, omega4) = self.velocity_analysis(theta2, omega2, &pose)?;
        let (alpha3, alpha4) =
            self.acceleration_analysis(theta2, omega2, alpha2, &pose, omega3, omega4)?;
        let Pose { theta3, theta4 } = pose;
        log::debug!("analyzed theta2={theta2:.6}: theta3={theta3:.6}, theta4={theta4:.6}");
        Ok(KinState { theta3, theta4, omega3, omega4, alpha3, alpha4 })
    }

    /// Joint coordinates `[crank pivot, crank pin, coupler-follower joint,
    /// follower pivot]` for a solved pose, in the ground frame.
    pub fn joints(&self, theta2: f64, pose: &Pose) -> [[f64; 2]; 4] {
        let (s2, c2) = theta2.sin_cos();
        let (s3, c3) = pose.theta3.sin_cos();
        let p2 = [self.l2 * c2, self.l2 * s2];
        let p3 = [p2[0] + self.l3 * c3, p2[1] + self.l3 * s3];
        [[0., 0.], p2, p3, [self.l1, 0.]]
    }
}
