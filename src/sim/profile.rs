//! Perturbation profiles
//!
//! Immutable descriptors of a level's disturbance regime. Construction is
//! pure: all randomness lives in generator execution, never in the profile
//! itself.

use serde::{Deserialize, Serialize};

/// Disturbance generator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneratorKind {
    /// Discrete kicks at randomized intervals
    Impulse,
    /// Continuous sinusoidal sway
    Sine,
    /// Replay of a precomputed disturbance sequence (loops forever)
    DataSet,
    /// Small uniform background noise
    Random,
    /// Sum of independent sub-profiles (one level of nesting only)
    Compound,
}

/// One level's disturbance regime. Read-only once activated; replaced
/// wholesale on level or mode change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerturbationProfile {
    pub name: String,
    /// Active generator kinds (a set; duplicates are dropped at activation)
    pub types: Vec<GeneratorKind>,
    /// Base amplitude multiplier
    pub strength: f64,
    /// Sine frequency in Hz (ignored by other generators)
    pub frequency: f64,
    /// Inclusive bounds for the randomized gap between impulses (seconds)
    pub random_interval: (f64, f64),
    /// Named disturbance sequence for the data-replay generator
    pub data_source: Option<String>,
    /// Whether impulses announce themselves one second ahead
    pub show_warnings: bool,
    /// Sub-profiles, meaningful only when `types` contains `Compound`.
    /// Nested compound entries are ignored at evaluation time.
    pub sub_profiles: Vec<PerturbationProfile>,
}

impl PerturbationProfile {
    fn new(name: &str, types: &[GeneratorKind]) -> Self {
        Self {
            name: name.to_string(),
            types: types.to_vec(),
            strength: 0.0,
            frequency: 0.0,
            random_interval: (0.0, 0.0),
            data_source: None,
            show_warnings: false,
            sub_profiles: Vec::new(),
        }
    }

    pub fn has(&self, kind: GeneratorKind) -> bool {
        self.types.contains(&kind)
    }

    /// Drop duplicate generator entries, keeping first-occurrence order.
    /// `types` is a set: a duplicated kind must not double its force or
    /// tick an impulse countdown twice. The engine normalizes profiles
    /// with this at activation.
    pub fn dedup_types(&mut self) {
        let mut seen: Vec<GeneratorKind> = Vec::with_capacity(self.types.len());
        self.types.retain(|&kind| {
            if seen.contains(&kind) {
                false
            } else {
                seen.push(kind);
                true
            }
        });
    }

    /// Interval with ordered bounds. An inverted interval is a programming
    /// error; release builds recover by swapping.
    pub fn interval(&self) -> (f64, f64) {
        let (lo, hi) = self.random_interval;
        debug_assert!(lo <= hi, "inverted random_interval on `{}`", self.name);
        if lo <= hi { (lo, hi) } else { (hi, lo) }
    }

    /// Fixed profile for a campaign level. Pure: the same level always
    /// yields the same profile. Levels below 1 clamp to 1; levels 8 and up
    /// use procedurally scaled compound regimes.
    pub fn for_level(level: i32) -> Self {
        use GeneratorKind::*;
        match level.max(1) {
            1 => {
                let mut p = Self::new("Gentle Breeze", &[Impulse]);
                p.strength = 0.3;
                p.random_interval = (4.0, 6.0);
                p.show_warnings = true;
                p
            }
            2 => {
                let mut p = Self::new("Rolling Swell", &[Sine]);
                p.strength = 0.45;
                p.frequency = 0.25;
                p
            }
            3 => {
                let mut p = Self::new("Crosswinds", &[Impulse, Sine]);
                p.strength = 0.55;
                p.frequency = 0.35;
                p.random_interval = (3.0, 5.0);
                p.show_warnings = true;
                p
            }
            4 => {
                let mut p = Self::new("Aftershock", &[DataSet]);
                p.strength = 0.65;
                p.data_source = Some("seismic".to_string());
                p
            }
            5 => {
                let mut p = Self::new("Squall", &[Impulse, Random]);
                p.strength = 0.75;
                p.random_interval = (2.5, 4.5);
                p.show_warnings = true;
                p
            }
            6 => {
                let mut p = Self::new("Undertow", &[Sine, Random]);
                p.strength = 0.85;
                p.frequency = 0.5;
                p
            }
            7 => {
                let mut p = Self::new("Gale", &[Impulse, Sine, Random]);
                p.strength = 0.95;
                p.frequency = 0.6;
                p.random_interval = (2.0, 4.0);
                p
            }
            n => Self::tempest(n),
        }
    }

    /// Compound regime for levels 8 and up: monotonically harder, with
    /// capped strength growth and floored impulse intervals.
    fn tempest(level: i32) -> Self {
        let n = (level - 7) as f64;
        let strength = (1.0 + 0.1 * n).min(2.0);
        let frequency = (0.5 + 0.05 * n).min(1.2);
        let interval = (
            (3.0 - 0.25 * n).max(0.5),
            (5.0 - 0.25 * n).max(1.0),
        );

        let mut impulse = Self::new("tempest-impulse", &[GeneratorKind::Impulse]);
        impulse.strength = strength;
        impulse.random_interval = interval;

        let mut sine = Self::new("tempest-sine", &[GeneratorKind::Sine]);
        sine.strength = strength;
        sine.frequency = frequency;

        let mut noise = Self::new("tempest-noise", &[GeneratorKind::Random]);
        noise.strength = strength;

        let mut p = Self::new(
            &format!("Tempest {}", level - 7),
            &[GeneratorKind::Compound],
        );
        p.strength = strength;
        p.frequency = frequency;
        p.random_interval = interval;
        p.sub_profiles = vec![impulse, sine, noise];
        p
    }

    /// Fixed profile for a free-play mode. Unknown modes clamp to Practice.
    pub fn for_mode(mode: i32) -> Self {
        use GeneratorKind::*;
        match mode {
            1 => {
                let mut p = Self::new("Zen", &[Sine]);
                p.strength = 0.4;
                p.frequency = 0.2;
                p
            }
            2 => {
                let mut p = Self::tempest(8);
                p.name = "Storm".to_string();
                p
            }
            3 => {
                let mut p = Self::new("Mayhem", &[Impulse, Random]);
                p.strength = 1.2;
                p.random_interval = (1.0, 2.0);
                p
            }
            _ => Self::new("Practice", &[]),
        }
    }
}
