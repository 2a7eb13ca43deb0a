//! Perturbation engine
//!
//! Composes the active profile's generators into a single scalar force
//! each tick and feeds it to the dynamics model. Fully deterministic for a
//! fixed seed: impulse timing, sign, jitter, and noise all come from one
//! seeded PCG stream consumed in a stable order.

use log::{debug, warn};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::data::DataLibrary;
use super::pendulum::PendulumModel;
use super::profile::{GeneratorKind, PerturbationProfile};
use crate::consts::*;

/// Receives effect cues (visual/audio/haptic) from the engine.
///
/// Implementations live outside the core; the engine only borrows the
/// observer for the duration of an `update` call.
pub trait PerturbationObserver {
    /// A net force was just fed to the dynamics model. `kind` is set when
    /// the force has a single generator origin.
    fn force_applied(&mut self, magnitude: f64, elapsed: f64, kind: Option<GeneratorKind>);

    /// An impulse warning countdown began; the kick lands in the warned
    /// direction after [`WARNING_DELAY`] seconds.
    fn impulse_warning(&mut self, direction: f64);
}

/// Observer that ignores every cue.
pub struct NullObserver;

impl PerturbationObserver for NullObserver {
    fn force_applied(&mut self, _magnitude: f64, _elapsed: f64, _kind: Option<GeneratorKind>) {}
    fn impulse_warning(&mut self, _direction: f64) {}
}

/// Runtime state for one profile slot (the root profile or one compound
/// sub-profile). Slots never share timing state, so sub-profiles evaluate
/// independently of each other.
#[derive(Debug, Clone, Default)]
struct SlotState {
    /// Countdown to the next impulse (seconds)
    impulse_timer: f64,
    /// Loaded data-replay samples; empty when absent or failed to load
    sequence: Vec<f64>,
    /// Replay cursor, always within the sequence when non-empty
    data_index: usize,
}

/// A warned impulse awaiting delivery on the engine's elapsed clock.
#[derive(Debug, Clone, Copy)]
struct PendingImpulse {
    due_at: f64,
    magnitude: f64,
}

/// Composes disturbance forces from the active profile once per tick.
///
/// State machine: `Inactive -> Active(profile) -> Inactive`. Driven
/// synchronously from a single control loop; never call concurrently.
pub struct PerturbationEngine {
    profile: Option<PerturbationProfile>,
    active: bool,
    /// Time since profile activation
    elapsed: f64,
    /// Previous tick's time; 0 means "no previous tick" so the next
    /// update sees dt = 0 instead of a stale gap
    last_update_time: f64,
    root: SlotState,
    subs: Vec<SlotState>,
    pending: Vec<PendingImpulse>,
    rng: Pcg32,
    library: DataLibrary,
}

impl PerturbationEngine {
    pub fn new(seed: u64, library: DataLibrary) -> Self {
        Self {
            profile: None,
            active: false,
            elapsed: 0.0,
            last_update_time: 0.0,
            root: SlotState::default(),
            subs: Vec::new(),
            pending: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            library,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn profile(&self) -> Option<&PerturbationProfile> {
        self.profile.as_ref()
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Activate a profile, replacing any previous one. Resets the elapsed
    /// clock, re-randomizes impulse timing, and eagerly loads any named
    /// data sequences (a failed load degrades that generator to silence).
    pub fn activate_profile(&mut self, mut profile: PerturbationProfile) {
        profile.dedup_types();
        for sub in &mut profile.sub_profiles {
            sub.dedup_types();
        }
        self.root = Self::make_slot(&self.library, &profile);
        self.subs = profile
            .sub_profiles
            .iter()
            .map(|sub| Self::make_slot(&self.library, sub))
            .collect();
        if profile.has(GeneratorKind::Impulse) {
            self.root.impulse_timer = draw_interval(&mut self.rng, profile.interval());
        }
        for (sub, slot) in profile.sub_profiles.iter().zip(self.subs.iter_mut()) {
            if sub.has(GeneratorKind::Impulse) {
                slot.impulse_timer = draw_interval(&mut self.rng, sub.interval());
            }
        }
        self.elapsed = 0.0;
        self.last_update_time = 0.0;
        self.pending.clear();
        self.active = true;
        debug!("activated perturbation profile `{}`", profile.name);
        self.profile = Some(profile);
    }

    fn make_slot(library: &DataLibrary, profile: &PerturbationProfile) -> SlotState {
        let mut slot = SlotState::default();
        if let Some(name) = &profile.data_source {
            match library.resolve(name) {
                Ok(samples) => slot.sequence = samples,
                Err(err) => {
                    warn!(
                        "data source for `{}` unavailable, replay disabled: {err}",
                        profile.name
                    );
                }
            }
        }
        slot
    }

    /// Suppress all generator evaluation and drop any warned impulses still
    /// in flight.
    pub fn stop(&mut self) {
        self.active = false;
        self.pending.clear();
    }

    /// Re-enter the active state with the same profile. Impulse timing is
    /// re-randomized and the next update sees dt = 0, never a stale gap.
    /// Impulses cancelled by `stop` are lost, not restored.
    pub fn resume(&mut self) {
        let Self {
            profile,
            active,
            last_update_time,
            root,
            subs,
            rng,
            ..
        } = self;
        let Some(profile) = profile.as_ref() else {
            return;
        };
        *active = true;
        *last_update_time = 0.0;
        if profile.has(GeneratorKind::Impulse) {
            root.impulse_timer = draw_interval(rng, profile.interval());
        }
        for (sub, slot) in profile.sub_profiles.iter().zip(subs.iter_mut()) {
            if sub.has(GeneratorKind::Impulse) {
                slot.impulse_timer = draw_interval(rng, sub.interval());
            }
        }
    }

    /// Evaluate all active generators and feed the summed force into the
    /// model. A no-op when inactive or no profile is set.
    ///
    /// Warned impulses that have come due are delivered here first, on the
    /// same call path as everything else - the one-second warning delay is
    /// serialized onto this queue rather than a timer thread.
    pub fn update(
        &mut self,
        current_time: f64,
        model: &mut PendulumModel,
        observer: &mut dyn PerturbationObserver,
    ) {
        let Self {
            profile,
            active,
            elapsed,
            last_update_time,
            root,
            subs,
            pending,
            rng,
            ..
        } = self;
        if !*active {
            return;
        }
        let Some(profile) = profile.as_ref() else {
            return;
        };

        let dt = if *last_update_time == 0.0 {
            0.0
        } else {
            current_time - *last_update_time
        };
        *last_update_time = current_time;
        *elapsed += dt;

        // Deliver warned impulses that have come due
        let mut i = 0;
        while i < pending.len() {
            if pending[i].due_at <= *elapsed {
                let impulse = pending.remove(i);
                model.apply_force(impulse.magnitude);
                observer.force_applied(
                    impulse.magnitude,
                    *elapsed,
                    Some(GeneratorKind::Impulse),
                );
            } else {
                i += 1;
            }
        }

        let total =
            eval_profile(profile, root, subs, rng, dt, *elapsed, pending, observer, 1.0, true);

        if total.abs() > FORCE_EPSILON {
            model.apply_force(total);
            let kind = if profile.types.len() == 1 {
                Some(profile.types[0])
            } else {
                None
            };
            observer.force_applied(total, *elapsed, kind);
        }
    }
}

/// Sum the contributions of one profile's generators. Contributions are
/// additive and order-independent; the iteration order only fixes the RNG
/// consumption order for determinism.
///
/// `warn_scale` is the amplitude reduction the caller applies to this
/// profile's immediate total. Warned impulses are delivered later, outside
/// that multiplication, so they carry the scale with them at schedule time.
#[allow(clippy::too_many_arguments)]
fn eval_profile(
    profile: &PerturbationProfile,
    slot: &mut SlotState,
    subs: &mut [SlotState],
    rng: &mut Pcg32,
    dt: f64,
    elapsed: f64,
    pending: &mut Vec<PendingImpulse>,
    observer: &mut dyn PerturbationObserver,
    warn_scale: f64,
    allow_compound: bool,
) -> f64 {
    let mut total = 0.0;
    for &kind in &profile.types {
        total += match kind {
            GeneratorKind::Impulse => {
                eval_impulse(profile, slot, rng, dt, elapsed, pending, observer, warn_scale)
            }
            GeneratorKind::Sine => {
                (std::f64::consts::TAU * profile.frequency * elapsed).sin()
                    * profile.strength
                    * SINE_AMPLITUDE_SCALE
            }
            GeneratorKind::DataSet => eval_data(profile, slot),
            GeneratorKind::Random => {
                rng.random_range(-1.0..=1.0) * profile.strength * NOISE_SCALE
            }
            GeneratorKind::Compound if allow_compound => {
                let mut sub_total = 0.0;
                for (sub, sub_slot) in profile.sub_profiles.iter().zip(subs.iter_mut()) {
                    sub_total += eval_profile(
                        sub,
                        sub_slot,
                        &mut [],
                        rng,
                        dt,
                        elapsed,
                        pending,
                        observer,
                        warn_scale * COMPOUND_DAMPING_SCALE,
                        false,
                    );
                }
                sub_total * COMPOUND_DAMPING_SCALE
            }
            // Nested compound entries are unsupported; skip to guarantee
            // termination
            GeneratorKind::Compound => 0.0,
        };
    }
    total
}

#[allow(clippy::too_many_arguments)]
fn eval_impulse(
    profile: &PerturbationProfile,
    slot: &mut SlotState,
    rng: &mut Pcg32,
    dt: f64,
    elapsed: f64,
    pending: &mut Vec<PendingImpulse>,
    observer: &mut dyn PerturbationObserver,
    warn_scale: f64,
) -> f64 {
    slot.impulse_timer -= dt;
    if slot.impulse_timer > 0.0 {
        return 0.0;
    }

    let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let magnitude =
        direction * profile.strength * rng.random_range(IMPULSE_JITTER_LO..=IMPULSE_JITTER_HI);
    slot.impulse_timer = draw_interval(rng, profile.interval());

    if profile.show_warnings {
        observer.impulse_warning(direction);
        pending.push(PendingImpulse {
            due_at: elapsed + WARNING_DELAY,
            magnitude: magnitude * warn_scale,
        });
        0.0
    } else {
        magnitude
    }
}

fn eval_data(profile: &PerturbationProfile, slot: &mut SlotState) -> f64 {
    if slot.sequence.is_empty() {
        return 0.0;
    }
    let value = slot.sequence[slot.data_index] * profile.strength * DATASET_SCALE;
    slot.data_index = (slot.data_index + 1) % slot.sequence.len();
    value
}

/// Uniform draw from an inclusive interval; a degenerate interval (equal
/// bounds, including [0, 0]) returns the bound without consuming the RNG.
fn draw_interval(rng: &mut Pcg32, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo { rng.random_range(lo..=hi) } else { lo }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::pendulum::PendulumParams;

    /// Records every cue for assertions.
    #[derive(Default)]
    struct Recorder {
        forces: Vec<(f64, f64, Option<GeneratorKind>)>,
        warnings: Vec<f64>,
    }

    impl PerturbationObserver for Recorder {
        fn force_applied(&mut self, magnitude: f64, elapsed: f64, kind: Option<GeneratorKind>) {
            self.forces.push((magnitude, elapsed, kind));
        }
        fn impulse_warning(&mut self, direction: f64) {
            self.warnings.push(direction);
        }
    }

    fn engine(seed: u64) -> PerturbationEngine {
        PerturbationEngine::new(seed, DataLibrary::new())
    }

    fn model() -> PendulumModel {
        PendulumModel::new(PendulumParams::default())
    }

    fn sine_profile(strength: f64, frequency: f64) -> PerturbationProfile {
        let mut p = PerturbationProfile::for_level(2);
        p.strength = strength;
        p.frequency = frequency;
        p
    }

    #[test]
    fn test_inactive_engine_is_noop() {
        let mut eng = engine(1);
        let mut m = model();
        let mut obs = Recorder::default();
        eng.update(1.0, &mut m, &mut obs);
        assert!(obs.forces.is_empty());
        assert_eq!(eng.elapsed(), 0.0);

        eng.activate_profile(sine_profile(1.0, 0.5));
        eng.stop();
        eng.update(2.0, &mut m, &mut obs);
        assert!(obs.forces.is_empty());
    }

    #[test]
    fn test_first_update_sees_zero_dt() {
        let mut eng = engine(1);
        let mut m = model();
        let mut obs = Recorder::default();
        eng.activate_profile(sine_profile(1.0, 0.5));

        eng.update(42.0, &mut m, &mut obs);
        assert_eq!(eng.elapsed(), 0.0);

        eng.update(42.5, &mut m, &mut obs);
        assert!((eng.elapsed() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sine_quarter_period_amplitude() {
        let mut eng = engine(1);
        let mut m = model();
        let mut obs = Recorder::default();
        eng.activate_profile(sine_profile(0.7, 0.3));

        // Quarter period of 0.3 Hz
        let quarter = 1.0 / (4.0 * 0.3);
        eng.update(5.0, &mut m, &mut obs);
        eng.update(5.0 + quarter, &mut m, &mut obs);

        let (magnitude, elapsed, kind) = *obs.forces.last().unwrap();
        assert!((magnitude - 0.7 * SINE_AMPLITUDE_SCALE).abs() < 1e-12);
        assert!((magnitude - 0.1575).abs() < 1e-12);
        assert!((elapsed - quarter).abs() < 1e-12);
        assert_eq!(kind, Some(GeneratorKind::Sine));
    }

    #[test]
    fn test_forces_below_epsilon_are_not_applied() {
        let mut eng = engine(1);
        let mut m = model();
        let mut obs = Recorder::default();
        eng.activate_profile(sine_profile(0.001, 0.3));

        for i in 0..200 {
            eng.update((i + 1) as f64 * 0.01, &mut m, &mut obs);
        }
        assert!(obs.forces.is_empty());
        assert_eq!(m.state().theta_dot, 0.0);
    }

    #[test]
    fn test_impulse_gaps_respect_interval() {
        let mut p = PerturbationProfile::for_level(1);
        p.show_warnings = false;
        p.strength = 1.0;
        p.random_interval = (0.5, 1.0);

        let mut eng = engine(99);
        let mut m = model();
        let mut obs = Recorder::default();
        eng.activate_profile(p);

        let dt = 0.01;
        for i in 0..3000 {
            eng.update((i + 1) as f64 * dt, &mut m, &mut obs);
        }

        let fire_times: Vec<f64> = obs.forces.iter().map(|&(_, t, _)| t).collect();
        assert!(fire_times.len() >= 20, "expected many impulses over 30s");
        for pair in fire_times.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= 0.5 - 1e-9, "gap {gap} under interval lower bound");
            assert!(gap <= 1.0 + dt + 1e-9, "gap {gap} over interval upper bound");
        }
        for &(magnitude, _, kind) in &obs.forces {
            assert!(magnitude.abs() >= IMPULSE_JITTER_LO - 1e-12);
            assert!(magnitude.abs() <= IMPULSE_JITTER_HI + 1e-12);
            assert_eq!(kind, Some(GeneratorKind::Impulse));
        }
    }

    #[test]
    fn test_degenerate_interval_fires_every_tick() {
        let mut p = PerturbationProfile::for_level(1);
        p.show_warnings = false;
        p.strength = 1.0;
        p.random_interval = (0.0, 0.0);

        let mut eng = engine(5);
        let mut m = model();
        let mut obs = Recorder::default();
        eng.activate_profile(p);

        for i in 0..50 {
            eng.update((i + 1) as f64 * 0.01, &mut m, &mut obs);
        }
        assert_eq!(obs.forces.len(), 50);
    }

    #[test]
    fn test_warned_impulse_lands_after_delay() {
        let mut p = PerturbationProfile::for_level(1);
        p.strength = 0.5;
        p.random_interval = (1.0, 1.0);
        assert!(p.show_warnings);

        let mut eng = engine(7);
        let mut m = model();
        let mut obs = Recorder::default();
        eng.activate_profile(p);

        let dt = 0.1;
        for i in 0..35 {
            eng.update((i + 1) as f64 * dt, &mut m, &mut obs);
        }

        // Countdown expires at elapsed 1.0; the kick lands one second later
        assert!(!obs.warnings.is_empty());
        let (magnitude, delivered_at, kind) = obs.forces[0];
        assert!((delivered_at - 2.0).abs() < dt + 1e-9);
        assert!(magnitude.abs() >= 0.5 * IMPULSE_JITTER_LO - 1e-12);
        assert!(magnitude.abs() <= 0.5 * IMPULSE_JITTER_HI + 1e-12);
        assert_eq!(kind, Some(GeneratorKind::Impulse));
        // Warned direction matches the delivered sign
        assert_eq!(obs.warnings[0].signum(), magnitude.signum());
    }

    #[test]
    fn test_stop_cancels_pending_impulses() {
        let mut p = PerturbationProfile::for_level(1);
        p.random_interval = (1.0, 1.0);

        let mut eng = engine(7);
        let mut m = model();
        let mut obs = Recorder::default();
        eng.activate_profile(p);

        // Run just past the countdown so a delivery is pending
        let dt = 0.1;
        for i in 0..13 {
            eng.update((i + 1) as f64 * dt, &mut m, &mut obs);
        }
        assert!(!eng.pending.is_empty());

        eng.stop();
        assert!(eng.pending.is_empty());

        // Resuming does not restore the cancelled kick
        eng.resume();
        eng.update(10.0, &mut m, &mut obs);
        eng.update(10.05, &mut m, &mut obs);
        assert!(obs.forces.is_empty());
    }

    #[test]
    fn test_resume_sees_zero_dt_not_stale_gap() {
        let mut eng = engine(3);
        let mut m = model();
        let mut obs = Recorder::default();
        eng.activate_profile(sine_profile(1.0, 0.5));

        eng.update(1.0, &mut m, &mut obs);
        eng.update(2.0, &mut m, &mut obs);
        let elapsed_before = eng.elapsed();

        eng.stop();
        eng.resume();
        // A large wall-clock jump while stopped must not leak into elapsed
        eng.update(500.0, &mut m, &mut obs);
        assert_eq!(eng.elapsed(), elapsed_before);
    }

    #[test]
    fn test_data_replay_wraps_around() {
        let mut library = DataLibrary::new();
        library.register("triplet", vec![1.0, 2.0, 3.0]);
        let mut eng = PerturbationEngine::new(1, library);
        let mut m = model();
        let mut obs = Recorder::default();

        let mut p = PerturbationProfile::for_level(4);
        p.strength = 2.0;
        p.data_source = Some("triplet".to_string());
        eng.activate_profile(p);

        for i in 0..5 {
            eng.update((i + 1) as f64 * 0.01, &mut m, &mut obs);
        }

        // strength 2.0 x DATASET_SCALE 0.5 replays the raw samples
        let magnitudes: Vec<f64> = obs.forces.iter().map(|&(f, _, _)| f).collect();
        assert_eq!(magnitudes, vec![1.0, 2.0, 3.0, 1.0, 2.0]);
        assert_eq!(eng.root.data_index, 2);
    }

    #[test]
    fn test_missing_data_source_degrades_to_silence() {
        let mut eng = engine(1);
        let mut m = model();
        let mut obs = Recorder::default();

        let mut p = PerturbationProfile::for_level(4);
        p.data_source = Some("no-such-source".to_string());
        eng.activate_profile(p);
        assert!(eng.root.sequence.is_empty());

        for i in 0..100 {
            eng.update((i + 1) as f64 * 0.01, &mut m, &mut obs);
        }
        assert!(obs.forces.is_empty());
        assert_eq!(m.state().theta_dot, 0.0);
    }

    #[test]
    fn test_compound_sums_subs_then_scales() {
        // Two sine sub-profiles: deterministic, no RNG consumption, so the
        // compound total must equal the independent sum times the scale
        let mut sub_a = sine_profile(0.6, 0.3);
        let mut sub_b = sine_profile(0.9, 0.3);
        sub_a.name = "a".to_string();
        sub_b.name = "b".to_string();

        let mut compound = PerturbationProfile::for_level(8);
        compound.sub_profiles = vec![sub_a.clone(), sub_b.clone()];
        compound.types = vec![GeneratorKind::Compound];

        let quarter = 1.0 / (4.0 * 0.3);
        let run = |profile: PerturbationProfile| -> f64 {
            let mut eng = engine(1);
            let mut m = model();
            let mut obs = Recorder::default();
            eng.activate_profile(profile);
            eng.update(5.0, &mut m, &mut obs);
            eng.update(5.0 + quarter, &mut m, &mut obs);
            obs.forces.last().map(|&(f, _, _)| f).unwrap_or(0.0)
        };

        let a = run(sub_a);
        let b = run(sub_b);
        let total = run(compound);
        assert!((total - (a + b) * COMPOUND_DAMPING_SCALE).abs() < 1e-12);
    }

    #[test]
    fn test_nested_compound_is_skipped() {
        let sine = sine_profile(0.8, 0.3);
        let mut nested = PerturbationProfile::for_level(8);
        nested.name = "nested".to_string();

        let mut compound = PerturbationProfile::for_level(8);
        compound.types = vec![GeneratorKind::Compound];
        compound.sub_profiles = vec![sine.clone(), nested];

        let quarter = 1.0 / (4.0 * 0.3);
        let run = |profile: PerturbationProfile| -> f64 {
            let mut eng = engine(1);
            let mut m = model();
            let mut obs = Recorder::default();
            eng.activate_profile(profile);
            eng.update(5.0, &mut m, &mut obs);
            eng.update(5.0 + quarter, &mut m, &mut obs);
            obs.forces.last().map(|&(f, _, _)| f).unwrap_or(0.0)
        };

        // Only the sine sub contributes; the nested compound is ignored
        let sine_only = run(sine);
        let total = run(compound);
        assert!((total - sine_only * COMPOUND_DAMPING_SCALE).abs() < 1e-12);
    }

    #[test]
    fn test_duplicate_types_contribute_once() {
        // `types` is a set: a profile deserialized with a repeated kind
        // must not double its generator's force
        let mut dup = sine_profile(0.7, 0.3);
        dup.types = vec![GeneratorKind::Sine, GeneratorKind::Sine];

        let quarter = 1.0 / (4.0 * 0.3);
        let run = |profile: PerturbationProfile| -> f64 {
            let mut eng = engine(1);
            let mut m = model();
            let mut obs = Recorder::default();
            eng.activate_profile(profile);
            eng.update(5.0, &mut m, &mut obs);
            eng.update(5.0 + quarter, &mut m, &mut obs);
            obs.forces.last().map(|&(f, _, _)| f).unwrap_or(0.0)
        };

        let single = run(sine_profile(0.7, 0.3));
        let doubled = run(dup);
        assert_eq!(single, doubled);
        assert!((single - 0.1575).abs() < 1e-12);
    }

    #[test]
    fn test_duplicate_impulse_ticks_timer_once() {
        let mut p = PerturbationProfile::for_level(1);
        p.show_warnings = false;
        p.strength = 1.0;
        p.random_interval = (1.0, 1.0);
        p.types = vec![GeneratorKind::Impulse, GeneratorKind::Impulse];

        let mut eng = engine(17);
        let mut m = model();
        let mut obs = Recorder::default();
        eng.activate_profile(p);

        // Fixed 1s countdown: over 2.5s exactly two kicks, one per expiry
        let dt = 0.1;
        for i in 0..25 {
            eng.update((i + 1) as f64 * dt, &mut m, &mut obs);
        }
        assert_eq!(obs.forces.len(), 2);
    }

    #[test]
    fn test_warned_impulse_from_compound_is_scaled() {
        let mut kick = PerturbationProfile::for_level(1);
        kick.strength = 1.0;
        kick.random_interval = (1.0, 1.0);
        assert!(kick.show_warnings);

        let mut compound = PerturbationProfile::for_level(8);
        compound.sub_profiles = vec![kick];

        let mut eng = engine(11);
        let mut m = model();
        let mut obs = Recorder::default();
        eng.activate_profile(compound);

        let dt = 0.1;
        for i in 0..25 {
            eng.update((i + 1) as f64 * dt, &mut m, &mut obs);
        }

        // The kick carries the compound reduction when it finally lands
        assert!(!obs.forces.is_empty());
        for &(magnitude, _, kind) in &obs.forces {
            assert_eq!(kind, Some(GeneratorKind::Impulse));
            assert!(
                magnitude.abs() >= IMPULSE_JITTER_LO * COMPOUND_DAMPING_SCALE - 1e-12,
                "delivered kick {magnitude} under scaled bounds"
            );
            assert!(
                magnitude.abs() <= IMPULSE_JITTER_HI * COMPOUND_DAMPING_SCALE + 1e-12,
                "delivered kick {magnitude} missing the compound reduction"
            );
        }
    }

    #[test]
    fn test_level_one_scenario() {
        // 20 simulated seconds of Gentle Breeze under a fixed seed: mean
        // inter-impulse gap is 5s, so 3-5 warnings and each delivered kick
        // within strength x jitter bounds
        let mut eng = engine(2024);
        let mut m = model();
        let mut obs = Recorder::default();
        eng.activate_profile(PerturbationProfile::for_level(1));

        let dt = 0.01;
        for i in 0..2000 {
            eng.update((i + 1) as f64 * dt, &mut m, &mut obs);
        }

        assert!(
            (3..=5).contains(&obs.warnings.len()),
            "unexpected warning count {}",
            obs.warnings.len()
        );
        assert!(!obs.forces.is_empty());
        for &(magnitude, _, _) in &obs.forces {
            assert!(magnitude.abs() >= 0.24 - 1e-12);
            assert!(magnitude.abs() <= 0.36 + 1e-12);
        }
    }

    #[test]
    fn test_identical_seeds_reproduce_runs() {
        let profile = PerturbationProfile::for_level(7);
        let mut eng_a = engine(555);
        let mut eng_b = engine(555);
        let mut m_a = model();
        let mut m_b = model();
        let mut obs_a = Recorder::default();
        let mut obs_b = Recorder::default();
        eng_a.activate_profile(profile.clone());
        eng_b.activate_profile(profile);

        for i in 0..1000 {
            let t = (i + 1) as f64 * 0.01;
            eng_a.update(t, &mut m_a, &mut obs_a);
            eng_b.update(t, &mut m_b, &mut obs_b);
            m_a.advance(0.01);
            m_b.advance(0.01);
        }

        assert_eq!(obs_a.forces, obs_b.forces);
        assert_eq!(m_a.state(), m_b.state());
    }
}
