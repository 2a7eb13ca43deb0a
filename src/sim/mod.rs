//! Deterministic simulation module
//!
//! All gameplay physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies
//! - No I/O on the tick path (disturbance data is loaded at profile activation)

pub mod data;
pub mod pendulum;
pub mod perturbation;
pub mod profile;

pub use data::{DataError, DataLibrary, load_sequence, parse_sequence};
pub use pendulum::{PendulumModel, PendulumParams, PendulumState};
pub use perturbation::{NullObserver, PerturbationEngine, PerturbationObserver};
pub use profile::{GeneratorKind, PerturbationProfile};
