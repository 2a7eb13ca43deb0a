//! Disturbance-sequence loading
//!
//! Data-replay profiles name a precomputed sequence of force samples.
//! Sequences are plain text, one floating-point value per line; anything
//! that does not parse as a number is skipped. Loading happens once,
//! eagerly, at profile activation - never on the tick path.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("unknown data source `{0}`")]
    Unknown(String),
    #[error("failed to read disturbance data: {0}")]
    Io(#[from] std::io::Error),
    #[error("no numeric samples in `{0}`")]
    Empty(String),
}

/// Parse a disturbance sequence, dropping non-numeric lines silently.
pub fn parse_sequence(text: &str) -> Vec<f64> {
    text.lines()
        .filter_map(|line| line.trim().parse::<f64>().ok())
        .collect()
}

/// Load a disturbance sequence from a file.
pub fn load_sequence(path: &Path) -> Result<Vec<f64>, DataError> {
    let text = fs::read_to_string(path)?;
    let samples = parse_sequence(&text);
    if samples.is_empty() {
        return Err(DataError::Empty(path.display().to_string()));
    }
    Ok(samples)
}

/// Resolves a profile's `data_source` name to a sample sequence.
///
/// Built-in tables ship with the game; a data directory, when configured,
/// adds file-backed sequences (`<dir>/<name>.txt`). Built-ins win on name
/// collisions so campaign levels stay deterministic.
#[derive(Debug, Clone)]
pub struct DataLibrary {
    dir: Option<PathBuf>,
    builtin: HashMap<String, Vec<f64>>,
}

impl Default for DataLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLibrary {
    pub fn new() -> Self {
        let mut lib = Self {
            dir: None,
            builtin: HashMap::new(),
        };
        lib.register("seismic", SEISMIC.to_vec());
        lib.register("tremor", TREMOR.to_vec());
        lib
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        let mut lib = Self::new();
        lib.dir = Some(dir.into());
        lib
    }

    /// Register an in-memory sequence under a name.
    pub fn register(&mut self, name: &str, samples: Vec<f64>) {
        self.builtin.insert(name.to_string(), samples);
    }

    pub fn resolve(&self, name: &str) -> Result<Vec<f64>, DataError> {
        if let Some(samples) = self.builtin.get(name) {
            return Ok(samples.clone());
        }
        match &self.dir {
            Some(dir) => load_sequence(&dir.join(format!("{name}.txt"))),
            None => Err(DataError::Unknown(name.to_string())),
        }
    }
}

/// Recorded quake-style burst: sharp onset, ringing decay
const SEISMIC: [f64; 24] = [
    0.05, 0.12, 0.78, 1.0, 0.62, -0.41, -0.88, -0.53, 0.31, 0.67, 0.44, -0.22,
    -0.49, -0.30, 0.15, 0.33, 0.21, -0.10, -0.24, -0.14, 0.06, 0.12, 0.05, -0.02,
];

/// Low-amplitude rumble
const TREMOR: [f64; 16] = [
    0.10, 0.18, 0.07, -0.12, -0.21, -0.09, 0.14, 0.24, 0.11, -0.08, -0.19, -0.06,
    0.05, 0.16, 0.04, -0.11,
];
