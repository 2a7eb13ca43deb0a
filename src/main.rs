//! Keel entry point
//!
//! Headless driver: runs one level of the balancing simulation at a fixed
//! timestep and logs the trajectory. Useful for difficulty tuning and as a
//! reference for how a rendering frontend drives the core.
//!
//! Usage: `keel [level] [seconds] [seed]`

use std::path::Path;

use keel::consts::SIM_DT;
use keel::sim::{
    DataLibrary, GeneratorKind, PendulumModel, PerturbationEngine, PerturbationObserver,
    PerturbationProfile,
};
use keel::{SimConfig, angle_from_upright};

/// Observer that logs cues and keeps run statistics.
#[derive(Default)]
struct RunStats {
    impulses: u32,
    warnings: u32,
    peak_force: f64,
}

impl PerturbationObserver for RunStats {
    fn force_applied(&mut self, magnitude: f64, elapsed: f64, kind: Option<GeneratorKind>) {
        if kind == Some(GeneratorKind::Impulse) {
            self.impulses += 1;
            log::debug!("impulse {magnitude:+.3} at t={elapsed:.2}");
        }
        if magnitude.abs() > self.peak_force {
            self.peak_force = magnitude.abs();
        }
    }

    fn impulse_warning(&mut self, direction: f64) {
        self.warnings += 1;
        let side = if direction > 0.0 { "right" } else { "left" };
        log::debug!("incoming impulse from the {side}");
    }
}

/// Integrate whole timesteps from the frame accumulator, at most
/// `max_substeps` per frame. Backlog beyond the cap is dropped, never
/// integrated as one large gap (a stall or backgrounding event must not
/// destabilize the integrator).
fn integrate_frame(
    engine: &mut PerturbationEngine,
    model: &mut PendulumModel,
    observer: &mut dyn PerturbationObserver,
    sim_time: &mut f64,
    accumulator: &mut f64,
    timestep: f64,
    max_substeps: u32,
) {
    let mut substeps = 0;
    while *accumulator >= timestep && substeps < max_substeps {
        *sim_time += timestep;
        engine.update(*sim_time, model, observer);
        model.advance(timestep);
        *accumulator -= timestep;
        substeps += 1;
    }
    if *accumulator >= timestep {
        *accumulator = 0.0;
    }
}

fn parse_arg<T: std::str::FromStr>(args: &[String], index: usize, default: T) -> T {
    args.get(index)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let level: i32 = parse_arg(&args, 1, 1);
    let seconds: f64 = parse_arg(&args, 2, 30.0);

    let config = SimConfig::load(Path::new("keel.json"));
    let seed: u64 = parse_arg(&args, 3, config.seed);

    let library = match &config.data_dir {
        Some(dir) => DataLibrary::with_dir(dir),
        None => DataLibrary::new(),
    };

    let mut model = PendulumModel::new(config.pendulum);
    let mut engine = PerturbationEngine::new(seed, library);
    let mut stats = RunStats::default();

    let profile = PerturbationProfile::for_level(level);
    log::info!(
        "level {level} `{}` for {seconds:.0}s at {:.0} Hz, seed {seed}",
        profile.name,
        1.0 / config.timestep
    );
    engine.activate_profile(profile);

    let dt = if config.timestep > 0.0 { config.timestep } else { SIM_DT };
    // 60 Hz frame cadence with physics substeps, as a frontend would drive it
    let frame_dt = 1.0 / 60.0;
    let frames = (seconds / frame_dt).ceil() as u64;
    let mut sim_time = 0.0;
    let mut accumulator = 0.0;
    let mut next_log = 1.0;

    for _ in 0..frames {
        accumulator += frame_dt;
        integrate_frame(
            &mut engine,
            &mut model,
            &mut stats,
            &mut sim_time,
            &mut accumulator,
            dt,
            config.max_substeps,
        );

        if sim_time >= next_log {
            next_log += 1.0;
            let s = model.state();
            log::info!(
                "t={:6.2}  off-balance {:+.4} rad  omega {:+.4}  energy {:.4}",
                s.time,
                angle_from_upright(s.theta),
                s.theta_dot,
                model.energy()
            );
        }
    }

    let s = model.state();
    log::info!(
        "run complete: final offset {:+.4} rad, {} impulses ({} warned), peak force {:.3}",
        angle_from_upright(s.theta),
        stats.impulses,
        stats.warnings,
        stats.peak_force
    );
}
