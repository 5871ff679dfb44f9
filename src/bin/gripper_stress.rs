//! Stress test the gripper by running the full gesture in a loop:
//!
//! 1. Lower Z axis, close claw
//! 2. Raise Z axis, claw to neutral
//! 3. Lower Z axis a little, open claw, claw to neutral
//!
//! This allows us to watch the mechanism and confirm it holds up over many cycles.

use std::env;
use std::time::Instant;

use log::info;

use touch_claw::config::ControllerConfig;
use touch_claw::control_loop::ControlLoop;
use touch_claw::gantry_hal_factory::GantryHalFactory;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Vec<_> = env::args().collect();
    let num_runs_str = args.get(1).cloned().unwrap_or_else(|| "50".to_owned());
    let num_runs: u32 = num_runs_str.parse()?;
    let fake_hw = args.iter().any(|arg| arg == "--fake-hw");

    let config = ControllerConfig::load(env::var_os("CLAW_CONFIG"))?;
    let hal = GantryHalFactory::new_maybe_mock(fake_hw).create_hal(&config)?;
    let mut control = ControlLoop::new(hal, &config)?;

    for i in 0..num_runs {
        info!("Starting run #{i}...");
        let start = Instant::now();
        control.run_gripper_cycle()?;
        info!("Run #{i} took {:.1}s", start.elapsed().as_secs_f64());
    }
    info!("Successful stress test!");
    Ok(())
}
