//! Touch-driven gantry claw.  Samples the five pads every tick, steers X and Y while a pad is
//! held, and runs a full grab/release when the grab pad is touched.

use std::path::PathBuf;

use clap::Parser;

use touch_claw::config::ControllerConfig;
use touch_claw::control_loop::ControlLoop;
use touch_claw::gantry_hal_factory::GantryHalFactory;

#[derive(Parser, Debug)]
#[clap(name = "claw")]
struct Opts {
    /// JSON file overriding any of the controller defaults.
    #[clap(short, long)]
    config: Option<PathBuf>,

    #[clap(short, long)]
    threshold: Option<u16>,

    #[clap(long)]
    tick_interval_ms: Option<u64>,

    /// Stop after this many ticks instead of running forever.
    #[clap(long)]
    max_ticks: Option<u64>,

    #[clap(long)]
    fake_hw: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts: Opts = Opts::parse();

    let mut config = ControllerConfig::load(opts.config.as_ref())?;
    if let Some(threshold) = opts.threshold {
        config.threshold = threshold;
    }
    if let Some(tick_interval_ms) = opts.tick_interval_ms {
        config.tick_interval_ms = tick_interval_ms;
    }

    let hal = GantryHalFactory::new_maybe_mock(opts.fake_hw).create_hal(&config)?;
    let mut control = ControlLoop::new(hal, &config)?;
    control.run_for(opts.max_ticks)
}
