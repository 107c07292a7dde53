use crate::*;
use approx::{assert_abs_diff_eq, assert_relative_eq};
use std::f64::consts::{FRAC_PI_4, PI, TAU};

/// Crank-rocker style demo loop: ground 2.5, driver 1, coupler 2, follower 1.5.
fn demo() -> FourBar {
    FourBar::new(2.5, 1., 2., 1.5).unwrap()
}

fn assert_closure(fb: &FourBar, theta2: f64, pose: &Pose) {
    let [f1, f2] = fb.closure_residual(theta2, pose.theta3, pose.theta4);
    assert_abs_diff_eq!(f1, 0., epsilon = 1e-6);
    assert_abs_diff_eq!(f2, 0., epsilon = 1e-6);
}

fn assert_angle_eq(a: f64, b: f64) {
    let diff = (a - b + PI).rem_euclid(TAU) - PI;
    assert_abs_diff_eq!(diff, 0., epsilon = 1e-6);
}

#[test]
fn position_satisfies_closure() {
    let fb = demo();
    let pose = fb.position_analysis(FRAC_PI_4).unwrap();
    assert_closure(&fb, FRAC_PI_4, &pose);
}

#[test]
fn position_is_deterministic() {
    let fb = demo();
    let a = fb.position_analysis(FRAC_PI_4).unwrap();
    let b = fb.position_analysis(FRAC_PI_4).unwrap();
    assert_eq!(a, b);
}

#[test]
fn closed_form_branches() {
    let fb = demo();
    let open = fb.position_branch(FRAC_PI_4, Branch::Open).unwrap();
    let crossed = fb.position_branch(FRAC_PI_4, Branch::Crossed).unwrap();
    assert_closure(&fb, FRAC_PI_4, &open);
    assert_closure(&fb, FRAC_PI_4, &crossed);
    assert!((open.theta3 - crossed.theta3).abs() > 1e-3);
    assert!((open.theta4 - crossed.theta4).abs() > 1e-3);
}

#[test]
fn iterative_root_lies_on_a_branch() {
    let fb = demo();
    let pose = fb.position_analysis(FRAC_PI_4).unwrap();
    let open = fb.position_branch(FRAC_PI_4, Branch::Open).unwrap();
    let crossed = fb.position_branch(FRAC_PI_4, Branch::Crossed).unwrap();
    let on_open = (pose.theta3 - open.theta3).abs() < 1e-6;
    let target = if on_open { open } else { crossed };
    assert_angle_eq(pose.theta3, target.theta3);
    assert_angle_eq(pose.theta4, target.theta4);
}

#[test]
fn velocity_matches_finite_difference() {
    let fb = demo();
    let theta2 = FRAC_PI_4;
    let h = 1e-5;
    let pose = fb.position_analysis(theta2).unwrap();
    let (omega3, omega4) = fb.velocity_analysis(theta2, 1., &pose).unwrap();
    let plus = fb.position_analysis(theta2 + h).unwrap();
    let minus = fb.position_analysis(theta2 - h).unwrap();
    assert_relative_eq!(omega3, (plus.theta3 - minus.theta3) / (2. * h), max_relative = 0.01);
    assert_relative_eq!(omega4, (plus.theta4 - minus.theta4) / (2. * h), max_relative = 0.01);
}

#[test]
fn acceleration_matches_finite_difference() {
    let fb = demo();
    let theta2 = FRAC_PI_4;
    let h = 1e-5;
    let vel = |theta2: f64| {
        let pose = fb.position_analysis(theta2).unwrap();
        fb.velocity_analysis(theta2, 1., &pose).unwrap()
    };
    let pose = fb.position_analysis(theta2).unwrap();
    let (omega3, omega4) = vel(theta2);
    let (alpha3, alpha4) = fb
        .acceleration_analysis(theta2, 1., 0., &pose, omega3, omega4)
        .unwrap();
    let plus = vel(theta2 + h);
    let minus = vel(theta2 - h);
    assert_relative_eq!(alpha3, (plus.0 - minus.0) / (2. * h), max_relative = 0.01);
    assert_relative_eq!(alpha4, (plus.1 - minus.1) / (2. * h), max_relative = 0.01);
}

#[test]
fn dead_point_is_singular() {
    let fb = demo();
    // Collinear coupler and follower, both alignments.
    for pose in [
        Pose { theta3: 0.7, theta4: 0.7 },
        Pose { theta3: 0.7, theta4: 0.7 - PI },
    ] {
        assert_eq!(
            fb.velocity_analysis(FRAC_PI_4, 1., &pose),
            Err(Error::SingularConfiguration),
        );
        assert_eq!(
            fb.acceleration_analysis(FRAC_PI_4, 1., 0., &pose, 0.5, 0.5),
            Err(Error::SingularConfiguration),
        );
    }
}

#[test]
fn dead_point_reached_by_position_solve() {
    // At theta2 = pi the demo loop is stretched to its reach limit
    // (r = l3 + l4): both assembly branches coincide and theta3 - theta4
    // is a straight angle. The solved pose carries a small residual-level
    // error, so detection must not rely on the determinant being exactly
    // zero.
    let fb = demo();
    let pose = fb.position_analysis(PI).unwrap();
    assert_closure(&fb, PI, &pose);
    assert_eq!(
        fb.velocity_analysis(PI, 1., &pose),
        Err(Error::SingularConfiguration),
    );
    assert_eq!(fb.analyze(PI), Err(Error::SingularConfiguration));
    assert_eq!(
        fb.analyze_branch(PI, 1., 0., Branch::Open),
        Err(Error::SingularConfiguration),
    );
}

#[test]
fn full_rotation_sweep() {
    let fb = demo();
    let h = 1e-5;
    for deg in (0..360).step_by(5) {
        if deg == 180 {
            // Dead point, covered by `dead_point_reached_by_position_solve`.
            continue;
        }
        let theta2 = (deg as f64).to_radians();
        let pose = fb.position_analysis(theta2).unwrap();
        assert_closure(&fb, theta2, &pose);
        let (omega3, omega4) = fb.velocity_analysis(theta2, 1., &pose).unwrap();
        let plus = fb.position_analysis(theta2 + h).unwrap();
        let minus = fb.position_analysis(theta2 - h).unwrap();
        let fd3 = (plus.theta3 - minus.theta3) / (2. * h);
        let fd4 = (plus.theta4 - minus.theta4) / (2. * h);
        assert_relative_eq!(omega3, fd3, max_relative = 0.01, epsilon = 1e-6);
        assert_relative_eq!(omega4, fd4, max_relative = 0.01, epsilon = 1e-6);
    }
}

#[test]
fn non_positive_length_rejected() {
    assert_eq!(FourBar::new(2.5, 0., 2., 1.5), Err(Error::InvalidLinkage));
    assert_eq!(FourBar::new(-2.5, 1., 2., 1.5), Err(Error::InvalidLinkage));
    assert_eq!(FourBar::new(2.5, 1., f64::NAN, 1.5), Err(Error::InvalidLinkage));
}

#[test]
fn default_crank_rate() {
    let fb = demo();
    let a = fb.analyze(FRAC_PI_4).unwrap();
    let b = fb.analyze_with(FRAC_PI_4, 1., 0.).unwrap();
    assert_eq!(a, b);
}

#[test]
fn out_of_reach_crank_angle() {
    // Follower reach 1.5 + 1.8 < the pin-to-pivot distance at theta2 = pi.
    let fb = FourBar::new(3., 1., 1.5, 1.8).unwrap();
    assert!(matches!(
        fb.position_analysis(PI),
        Err(Error::ConvergenceFailure { .. }),
    ));
    assert_eq!(fb.position_branch(PI, Branch::Open), Err(Error::Unassemblable));
    let bound = fb.angle_bound();
    assert!(bound.is_valid());
    assert!(bound.contains(0.));
    assert!(!bound.contains(PI));
}

#[test]
fn loop_classification() {
    let ty = FourBarTy::from_loop([90., 35., 70., 70.]);
    assert_eq!(ty, FourBarTy::GCRR);
    assert!(ty.is_grashof());
    assert_eq!(demo().ty(), FourBarTy::RRR1);
    assert_eq!(FourBarTy::from_loop([4., 1., 1., 1.]), FourBarTy::Invalid);
    assert!(!FourBar { l1: 4., l2: 1., l3: 1., l4: 1. }.is_valid());
}

#[test]
fn crank_rocker_rotates_fully() {
    assert_eq!(
        AngleBound::from_planar_loop([90., 35., 70., 70.]),
        AngleBound::Closed,
    );
    assert_eq!(AngleBound::from_planar_loop([4., 1., 1., 1.]), AngleBound::Invalid);
}

#[test]
fn full_analysis_chain() {
    let fb = demo();
    let state = fb.analyze_with(FRAC_PI_4, 1., 0.).unwrap();
    let KinState { theta3, theta4, omega3, omega4, alpha3, alpha4 } = state;
    for x in [theta3, theta4, omega3, omega4, alpha3, alpha4] {
        assert!(x.is_finite());
    }
    assert_closure(&fb, FRAC_PI_4, &Pose { theta3, theta4 });
    // The seed picks the same circuit as the explicit open branch here.
    let branch = fb.analyze_branch(FRAC_PI_4, 1., 0., Branch::Open).unwrap();
    assert_abs_diff_eq!(state.theta3, branch.theta3, epsilon = 1e-6);
    assert_abs_diff_eq!(state.omega4, branch.omega4, epsilon = 1e-6);
    assert_abs_diff_eq!(state.alpha3, branch.alpha3, epsilon = 1e-6);
}

#[test]
fn joints_respect_link_lengths() {
    let fb = demo();
    let pose = fb.position_analysis(FRAC_PI_4).unwrap();
    let [p1, p2, p3, p4] = fb.joints(FRAC_PI_4, &pose);
    let dist = |a: [f64; 2], b: [f64; 2]| (a[0] - b[0]).hypot(a[1] - b[1]);
    assert_abs_diff_eq!(dist(p1, p2), fb.l2, epsilon = 1e-9);
    assert_abs_diff_eq!(dist(p2, p3), fb.l3, epsilon = 1e-9);
    assert_abs_diff_eq!(dist(p3, p4), fb.l4, epsilon = 1e-6);
    assert_abs_diff_eq!(dist(p1, p4), fb.l1, epsilon = 1e-9);
}
