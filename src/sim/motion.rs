//! Per-tick motion integration
//!
//! The world picks one `MotionMode` per tick and hands it to every body, so
//! the integrator never has to ask whether a target exists.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, SpeedRange};

/// Steps shorter than this fraction of the remaining distance are skipped
pub const HOMING_REL_TOLERANCE: f64 = 1e-9;

/// How bodies move this tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionMode {
    /// Move by velocity alone, bouncing off the walls
    FreeFlight,
    /// Head for an externally set point at the body's own speed
    Seek(DVec2),
    /// Head back to the spawn point at the inverse speed
    ReturnHome,
}

impl MotionMode {
    pub fn is_homing(&self) -> bool {
        !matches!(self, MotionMode::FreeFlight)
    }
}

/// Candidate position for `body` after `dt` under `mode`
pub fn integrate(body: &Body, mode: MotionMode, speeds: &SpeedRange, dt: f64) -> DVec2 {
    match mode {
        MotionMode::FreeFlight => free_flight(body.position, body.velocity, dt),
        MotionMode::Seek(target) => home_toward(body.position, target, body.speed(), dt),
        MotionMode::ReturnHome => {
            home_toward(body.position, body.home_position, speeds.inverse(body.speed()), dt)
        }
    }
}

#[inline]
pub fn free_flight(position: DVec2, velocity: DVec2, dt: f64) -> DVec2 {
    position + velocity * dt
}

/// Move straight toward `goal` by at most `speed * dt`, landing exactly on it
/// when the remaining distance fits in one step.
pub fn home_toward(position: DVec2, goal: DVec2, speed: f64, dt: f64) -> DVec2 {
    let to_goal = goal - position;
    let distance = to_goal.length();
    if distance == 0.0 {
        return goal;
    }

    let step = speed * dt;
    if step <= HOMING_REL_TOLERANCE * distance {
        return position;
    }
    if distance <= step {
        return goal;
    }
    position + to_goal * (step / distance)
}
