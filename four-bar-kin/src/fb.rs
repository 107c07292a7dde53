//! Four-bar linkage type and loop classification.
use crate::{Error, Result};
use std::f64::consts::TAU;

/// Planar four-bar linkage defined by its four link lengths.
///
/// # Parameters
///
/// + Ground link `l1`, the fixed pivot distance
/// + Driver link `l2`, the crank
/// + Coupler link `l3`
/// + Follower link `l4`, the rocker
///
/// The ground link lies on the +x axis with the crank pivot at the origin.
/// All angles are measured from the +x axis in radians.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FourBar {
    /// Length of the ground link
    pub l1: f64,
    /// Length of the driver link
    pub l2: f64,
    /// Length of the coupler link
    pub l3: f64,
    /// Length of the follower link
    pub l4: f64,
}

impl FourBar {
    /// Create a linkage from `(ground, driver, coupler, follower)` lengths.
    ///
    /// Every length must be positive and finite.
    pub fn new(l1: f64, l2: f64, l3: f64, l4: f64) -> Result<Self> {
        let fb = Self { l1, l2, l3, l4 };
        if fb.planar_loop().iter().all(|l| l.is_finite() && *l > 0.) {
            Ok(fb)
        } else {
            Err(Error::InvalidLinkage)
        }
    }

    /// The loop lengths `[l1, l2, l3, l4]`.
    pub const fn planar_loop(&self) -> [f64; 4] {
        [self.l1, self.l2, self.l3, self.l4]
    }

    /// Classify the loop.
    pub fn ty(&self) -> FourBarTy {
        FourBarTy::from_loop(self.planar_loop())
    }

    /// Check if the loop can be assembled at all.
    pub fn is_valid(&self) -> bool {
        self.ty().is_valid()
    }

    /// Input angle range in which the loop closes.
    pub fn angle_bound(&self) -> AngleBound {
        AngleBound::from_planar_loop(self.planar_loop())
    }
}

/// Type of the four-bar linkage.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[allow(clippy::upper_case_acronyms)]
pub enum FourBarTy {
    /// Grashof double crank (Drag-link)
    GCCC,
    /// Grashof crank rocker
    GCRR,
    /// Grashof double rocker
    GRCR,
    /// Grashof rocker crank
    GRRC,
    /// Non-Grashof triple rocker (ground link is the longest)
    RRR1,
    /// Non-Grashof triple rocker (driver link is the longest)
    RRR2,
    /// Non-Grashof triple rocker (coupler link is the longest)
    RRR3,
    /// Non-Grashof triple rocker (follower link is the longest)
    RRR4,
    /// Invalid
    Invalid,
}

impl FourBarTy {
    /// Detect from the loop `[l1, l2, l3, l4]`.
    pub fn from_loop(fb_loop: [f64; 4]) -> Self {
        let [l1, l2, l3, l4] = fb_loop;
        let mut sorted = fb_loop;
        sorted.sort_unstable_by(f64::total_cmp);
        let [s, p, q, l] = sorted;
        if l > s + p + q {
            return Self::Invalid;
        }
        if s + l < p + q {
            // Grashof: the class follows the shortest link.
            match s {
                _ if s == l1 => Self::GCCC,
                _ if s == l2 => Self::GCRR,
                _ if s == l3 => Self::GRCR,
                _ => Self::GRRC,
            }
        } else {
            match l {
                _ if l == l1 => Self::RRR1,
                _ if l == l2 => Self::RRR2,
                _ if l == l3 => Self::RRR3,
                _ => Self::RRR4,
            }
        }
    }

    /// Name of the type.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GCCC => "Grashof double crank (Drag-link, GCCC)",
            Self::GCRR => "Grashof crank rocker (GCRR)",
            Self::GRCR => "Grashof double rocker (GRCR)",
            Self::GRRC => "Grashof rocker crank (GRRC)",
            Self::RRR1 => "Non-Grashof triple rocker (RRR1)",
            Self::RRR2 => "Non-Grashof triple rocker (RRR2)",
            Self::RRR3 => "Non-Grashof triple rocker (RRR3)",
            Self::RRR4 => "Non-Grashof triple rocker (RRR4)",
            Self::Invalid => "Invalid",
        }
    }

    /// Check if the type is valid.
    pub const fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid)
    }

    /// Return true if the type is a Grashof linkage.
    pub const fn is_grashof(&self) -> bool {
        matches!(self, Self::GCCC | Self::GCRR | Self::GRCR | Self::GRRC)
    }
}

impl std::fmt::Display for FourBarTy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Angle boundary types. The crank angle range in which the loop closes.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Copy, Clone, PartialEq, Default, Debug)]
pub enum AngleBound {
    /// The crank rotates fully.
    Closed,
    /// The crank oscillates in `[start, end]`.
    Open([f64; 2]),
    /// Both reach limits are interior; `[start, end]` covers one branch.
    OpenBranch([f64; 2]),
    /// The loop never closes.
    #[default]
    Invalid,
}

impl AngleBound {
    /// Compute the bound from the loop `[l1, l2, l3, l4]`.
    ///
    /// The loop closes where the crank-pin-to-follower-pivot distance stays
    /// between `|l3 - l4|` and `l3 + l4`; both limits translate to cosine
    /// bounds on the crank angle.
    pub fn from_planar_loop(planar_loop: [f64; 4]) -> Self {
        let [l1, l2, l3, l4] = planar_loop;
        let mut sorted = planar_loop;
        sorted.sort_unstable_by(f64::total_cmp);
        if sorted[3] > sorted[..3].iter().sum::<f64>() {
            return Self::Invalid;
        }
        let num = l1 * l1 + l2 * l2;
        let den = 2. * l1 * l2;
        // Reach limit approached near theta2 = pi resp. theta2 = 0.
        let c_far = (num - (l3 + l4) * (l3 + l4)) / den;
        let c_near = (num - (l3 - l4) * (l3 - l4)) / den;
        match (c_far <= -1., c_near >= 1.) {
            (true, true) => Self::Closed,
            (true, false) => Self::Open([c_near.acos(), TAU - c_near.acos()]),
            (false, true) => Self::Open([-c_far.acos(), c_far.acos()]),
            (false, false) => Self::OpenBranch([c_near.acos(), c_far.acos()]),
        }
    }

    /// Turn into boundary values.
    pub fn to_value(self) -> Option<[f64; 2]> {
        match self {
            Self::Closed => Some([0., TAU]),
            Self::Open(a) | Self::OpenBranch(a) => Some(a),
            Self::Invalid => None,
        }
    }

    /// Check whether a crank angle lies inside the bound.
    pub fn contains(&self, theta2: f64) -> bool {
        match *self {
            Self::Closed => true,
            Self::Open([a, b]) | Self::OpenBranch([a, b]) => {
                let b = if b > a { b } else { b + TAU };
                let t = a + (theta2 - a).rem_euclid(TAU);
                t <= b
            }
            Self::Invalid => false,
        }
    }

    /// Check if the bound is valid.
    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid)
    }
}
