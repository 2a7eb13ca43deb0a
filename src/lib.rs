//! Keel - an inverted-pendulum balancing game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (pendulum dynamics, perturbation engine)
//! - `config`: Data-driven simulation configuration
//!
//! Rendering, audio, and telemetry are external collaborators: they call
//! [`sim::PendulumModel::apply_force`], read [`sim::PendulumModel::state`]
//! once per tick, and receive effect cues through
//! [`sim::PerturbationObserver`].

pub mod config;
pub mod sim;

pub use config::SimConfig;
pub use sim::{
    GeneratorKind, NullObserver, PendulumModel, PendulumParams, PendulumState,
    PerturbationEngine, PerturbationObserver, PerturbationProfile,
};

/// Simulation tuning constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f64 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Upright equilibrium angle (radians)
    pub const UPRIGHT_ANGLE: f64 = std::f64::consts::PI;

    /// Calibrated amplitude reduction for the sine generator.
    /// Matches prior difficulty tuning - do not retune casually.
    pub const SINE_AMPLITUDE_SCALE: f64 = 0.225;
    /// Amplitude reduction for replayed data samples
    pub const DATASET_SCALE: f64 = 0.5;
    /// Background-noise generator scale (kept small by design)
    pub const NOISE_SCALE: f64 = 0.1;
    /// Global reduction applied to a compound profile's summed sub-profiles
    pub const COMPOUND_DAMPING_SCALE: f64 = 0.75;

    /// Forces below this magnitude are not forwarded to the model
    pub const FORCE_EPSILON: f64 = 0.001;
    /// Advance-warning delay before a warned impulse lands (seconds)
    pub const WARNING_DELAY: f64 = 1.0;
    /// Impulse magnitude jitter bounds (uniform draw, times strength)
    pub const IMPULSE_JITTER_LO: f64 = 0.8;
    pub const IMPULSE_JITTER_HI: f64 = 1.2;
}

/// Signed displacement from the upright equilibrium (radians)
#[inline]
pub fn angle_from_upright(theta: f64) -> f64 {
    theta - consts::UPRIGHT_ANGLE
}
