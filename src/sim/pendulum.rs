//! Inverted-pendulum dynamics
//!
//! A damped, spring-restored pendulum balanced at θ = π, advanced with
//! fourth-order Runge-Kutta. Simple Euler drifts visibly near the
//! separatrix and during full rotations; RK4 holds the trajectory at
//! real-time cost.

use serde::{Deserialize, Serialize};

use crate::consts::UPRIGHT_ANGLE;

/// Physical state of the pendulum. The sole mutable state of the model.
///
/// `theta` is never wrapped or normalized; callers may observe values
/// outside `[0, 2π)` during full rotations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendulumState {
    /// Angle in radians; π is the upright equilibrium
    pub theta: f64,
    /// Angular velocity (rad/s)
    pub theta_dot: f64,
    /// Monotonic simulation clock (s)
    pub time: f64,
}

impl Default for PendulumState {
    fn default() -> Self {
        Self {
            theta: UPRIGHT_ANGLE,
            theta_dot: 0.0,
            time: 0.0,
        }
    }
}

/// Physical parameters, read at each integration step.
///
/// Mutable between ticks (level progression retunes them) but treated as
/// constant within a single `advance` call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendulumParams {
    /// Bob mass (kg), strictly positive
    pub mass: f64,
    /// Rod length (m), strictly positive
    pub length: f64,
    /// Viscous damping coefficient, zero allowed (frictionless)
    pub damping: f64,
    /// Restoring-spring constant about θ = π, zero allowed
    pub spring_constant: f64,
    /// Gravitational acceleration (m/s²), strictly positive
    pub gravity: f64,
    /// Moment of inertia about the pivot, strictly positive
    pub moment_of_inertia: f64,
}

impl PendulumParams {
    /// Rod inertia about one end: m·l²/3
    pub fn default_inertia(mass: f64, length: f64) -> f64 {
        mass * length * length / 3.0
    }
}

impl Default for PendulumParams {
    fn default() -> Self {
        let mass = 1.0;
        let length = 1.0;
        Self {
            mass,
            length,
            damping: 0.5,
            spring_constant: 1.5,
            gravity: 9.81,
            moment_of_inertia: Self::default_inertia(mass, length),
        }
    }
}

/// The dynamics model: owns the physical state and advances it.
///
/// Equation of motion:
///
/// ```text
/// I·θ'' = m·g·l·sin(θ) − b·θ' − k·(θ − π) + τ
/// ```
///
/// where τ is the net torque accumulated via [`apply_force`] since the
/// last `advance`.
///
/// [`apply_force`]: PendulumModel::apply_force
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendulumModel {
    state: PendulumState,
    params: PendulumParams,
    /// Torque accumulated for the next integration step
    pending_torque: f64,
}

impl PendulumModel {
    pub fn new(params: PendulumParams) -> Self {
        Self {
            state: PendulumState::default(),
            params,
            pending_torque: 0.0,
        }
    }

    /// Read-only snapshot of the current physical state
    pub fn state(&self) -> PendulumState {
        self.state
    }

    pub fn params(&self) -> &PendulumParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut PendulumParams {
        &mut self.params
    }

    /// Reset to upright rest at t = 0. Clears any pending torque.
    pub fn reset(&mut self) {
        self.state = PendulumState::default();
        self.pending_torque = 0.0;
    }

    /// Record a torque contribution for the next integration step.
    ///
    /// Contributions accumulate; magnitude is unconstrained (callers keep
    /// it physically plausible). Does not advance time.
    pub fn apply_force(&mut self, magnitude: f64) {
        self.pending_torque += magnitude;
    }

    /// Angular acceleration at (θ, ω) under the given applied torque
    fn acceleration(&self, theta: f64, omega: f64, torque: f64) -> f64 {
        let p = &self.params;
        let gravity_torque = p.mass * p.gravity * p.length * theta.sin();
        let damping_torque = p.damping * omega;
        let spring_torque = p.spring_constant * (theta - UPRIGHT_ANGLE);
        (gravity_torque - damping_torque - spring_torque + torque) / p.moment_of_inertia
    }

    /// Integrate the state forward by `dt` seconds with RK4, consuming the
    /// pending torque.
    ///
    /// A zero or negative `dt` is a complete no-op (the first tick after
    /// activation or resume commonly has `dt = 0`); pending torque is kept
    /// for the next real step. Extreme parameter values are not guarded
    /// here - callers clamp `dt` to sane bounds (never integrate a
    /// multi-second gap after the app was backgrounded).
    pub fn advance(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }

        let torque = self.pending_torque;
        self.pending_torque = 0.0;

        let theta = self.state.theta;
        let omega = self.state.theta_dot;

        // RK4 on the first-order system θ' = ω, ω' = acceleration(θ, ω, τ)
        let k1_theta = omega;
        let k1_omega = self.acceleration(theta, omega, torque);

        let k2_theta = omega + 0.5 * dt * k1_omega;
        let k2_omega = self.acceleration(
            theta + 0.5 * dt * k1_theta,
            omega + 0.5 * dt * k1_omega,
            torque,
        );

        let k3_theta = omega + 0.5 * dt * k2_omega;
        let k3_omega = self.acceleration(
            theta + 0.5 * dt * k2_theta,
            omega + 0.5 * dt * k2_omega,
            torque,
        );

        let k4_theta = omega + dt * k3_omega;
        let k4_omega =
            self.acceleration(theta + dt * k3_theta, omega + dt * k3_omega, torque);

        self.state.theta +=
            dt / 6.0 * (k1_theta + 2.0 * k2_theta + 2.0 * k3_theta + k4_theta);
        self.state.theta_dot +=
            dt / 6.0 * (k1_omega + 2.0 * k2_omega + 2.0 * k3_omega + k4_omega);
        self.state.time += dt;
    }

    /// Total mechanical energy: ½Iω² + mgl(1 + cosθ) + ½k(θ − π)².
    ///
    /// The gravity potential is zero at the upright equilibrium and maximal
    /// hanging, matching the equation of motion: under pure damping this
    /// quantity decays as dE/dt = −b·ω². Derived for telemetry only; plays
    /// no role in integration.
    pub fn energy(&self) -> f64 {
        let p = &self.params;
        let omega = self.state.theta_dot;
        let displacement = self.state.theta - UPRIGHT_ANGLE;
        0.5 * p.moment_of_inertia * omega * omega
            + p.mass * p.gravity * p.length * (1.0 + self.state.theta.cos())
            + 0.5 * p.spring_constant * displacement * displacement
    }
}
