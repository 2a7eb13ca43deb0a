//! Simulation configuration
//!
//! Data-driven knobs for the driver loop: timestep, substep cap, RNG seed,
//! disturbance-data directory, and the pendulum's physical parameters.
//! Stored as JSON next to the binary; any load problem falls back to
//! defaults so a bad config never blocks a run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::sim::PendulumParams;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Fixed integration timestep (s)
    pub timestep: f64,
    /// Frame-gap clamp: at most this many substeps per frame
    pub max_substeps: u32,
    /// Seed for the perturbation engine's RNG
    pub seed: u64,
    /// Directory of file-backed disturbance sequences (`<name>.txt`)
    pub data_dir: Option<PathBuf>,
    /// Physical parameters for the pendulum
    pub pendulum: PendulumParams,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            timestep: SIM_DT,
            max_substeps: MAX_SUBSTEPS,
            seed: 42,
            data_dir: None,
            pendulum: PendulumParams::default(),
        }
    }
}

impl SimConfig {
    /// Load from a JSON file, falling back to defaults on any error.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => {
                    log::info!("loaded config from {}", path.display());
                    config
                }
                Err(err) => {
                    log::warn!("bad config at {}: {err}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        fs::write(path, json)
    }

    /// Largest frame gap the driver will integrate before dropping time
    pub fn max_frame_gap(&self) -> f64 {
        self.timestep * self.max_substeps as f64
    }
}
