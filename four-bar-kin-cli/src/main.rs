//! Prints one kinematic analysis report for a planar four-bar linkage.
use clap::{Parser, ValueEnum};
use four_bar_kin::{Branch, FourBar, Pose};
use std::f64::consts::FRAC_PI_4;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum BranchArg {
    /// Open assembly circuit
    Open,
    /// Crossed assembly circuit
    Crossed,
}

/// Kinematic analysis of a planar four-bar linkage.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Ground link length
    #[arg(long, default_value_t = 2.5)]
    ground: f64,
    /// Driver (crank) link length
    #[arg(long, default_value_t = 1.)]
    driver: f64,
    /// Coupler link length
    #[arg(long, default_value_t = 2.)]
    coupler: f64,
    /// Follower (rocker) link length
    #[arg(long, default_value_t = 1.5)]
    follower: f64,
    /// Crank angle (rad)
    #[arg(long, default_value_t = FRAC_PI_4)]
    theta2: f64,
    /// Crank angular velocity (rad/s)
    #[arg(long, default_value_t = 1.)]
    omega2: f64,
    /// Crank angular acceleration (rad/s^2)
    #[arg(long, default_value_t = 0.)]
    alpha2: f64,
    /// Pin the assembly branch instead of using the iterative solve
    #[arg(long, value_enum)]
    branch: Option<BranchArg>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let fb = FourBar::new(cli.ground, cli.driver, cli.coupler, cli.follower)?;
    let Cli { theta2, omega2, alpha2, .. } = cli;
    let state = match cli.branch {
        Some(BranchArg::Open) => fb.analyze_branch(theta2, omega2, alpha2, Branch::Open)?,
        Some(BranchArg::Crossed) => fb.analyze_branch(theta2, omega2, alpha2, Branch::Crossed)?,
        None => fb.analyze_with(theta2, omega2, alpha2)?,
    };
    println!("Four-bar linkage analysis");
    println!("Type: {}", fb.ty());
    println!("Input: theta2 = {theta2:.3} rad, omega2 = {omega2} rad/s, alpha2 = {alpha2} rad/s^2");
    println!("theta3 = {:.3} rad", state.theta3);
    println!("theta4 = {:.3} rad", state.theta4);
    println!("omega3 = {:.3} rad/s", state.omega3);
    println!("omega4 = {:.3} rad/s", state.omega4);
    println!("alpha3 = {:.3} rad/s^2", state.alpha3);
    println!("alpha4 = {:.3} rad/s^2", state.alpha4);
    let pose = Pose { theta3: state.theta3, theta4: state.theta4 };
    let names = ["crank pivot", "crank pin", "coupler-follower joint", "follower pivot"];
    for (name, [x, y]) in names.iter().zip(fb.joints(theta2, &pose)) {
        println!("{name}: ({x:.3}, {y:.3})");
    }
    Ok(())
}
