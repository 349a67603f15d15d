//! Body entity and its render-facing snapshot
//!
//! A body is pure physics data. Anything a presentation layer needs (sprite,
//! colour, sound) is keyed by `BodyId` on the host side.

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Stable body identifier, unique within one world generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive speed bounds for spawned bodies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRange {
    pub min: f64,
    pub max: f64,
}

impl SpeedRange {
    pub fn new(min: f64, max: f64) -> SimResult<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> SimResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(SimError::invalid(format!(
                "speed bounds must be finite, got [{}, {}]",
                self.min, self.max
            )));
        }
        if self.min < 0.0 {
            return Err(SimError::invalid(format!(
                "minimum speed must be non-negative, got {}",
                self.min
            )));
        }
        if self.min > self.max {
            return Err(SimError::invalid(format!(
                "minimum speed {} exceeds maximum speed {}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Speed used when returning home: faster movers come back slower.
    /// Floored at zero for bodies a collision pushed above `max`.
    #[inline]
    pub fn inverse(&self, speed: f64) -> f64 {
        (self.max - speed).max(0.0)
    }
}

/// A simulated circle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    pub position: DVec2,
    pub velocity: DVec2,
    pub radius: f64,
    pub mass: f64,
    /// Where the body was spawned; the homing variant returns here
    pub home_position: DVec2,
}

impl Body {
    pub fn new(id: BodyId, position: DVec2, velocity: DVec2, radius: f64) -> Self {
        Self {
            id,
            position,
            velocity,
            radius,
            mass: 1.0,
            home_position: position,
        }
    }

    /// Same body with a non-default mass. Mass must be finite and positive.
    pub fn with_mass(mut self, mass: f64) -> SimResult<Self> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(SimError::invalid(format!("mass must be positive, got {mass}")));
        }
        self.mass = mass;
        Ok(self)
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    /// Unit heading, zero for a body at rest
    #[inline]
    pub fn direction(&self) -> DVec2 {
        self.velocity.normalize_or_zero()
    }

    /// Replace the heading while keeping the speed
    pub fn set_direction(&mut self, direction: DVec2) {
        self.velocity = direction.normalize_or_zero() * self.speed();
    }

    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared()
    }

    #[inline]
    pub fn momentum(&self) -> DVec2 {
        self.velocity * self.mass
    }

    /// True if `point` is within the spawn exclusion zone around this body,
    /// i.e. a second body of the same radius centred there would come closer
    /// than `buffer` to this one.
    pub fn contains(&self, point: DVec2, buffer: f64) -> bool {
        point.distance(self.position) <= 2.0 * (self.radius + buffer)
    }

    /// True if `point` lies on the disc (pointer picking)
    pub fn hit_test(&self, point: DVec2) -> bool {
        point.distance_squared(self.position) <= self.radius * self.radius
    }

    pub fn snapshot(&self) -> BodySnapshot {
        BodySnapshot {
            id: self.id,
            position: self.position,
            radius: self.radius,
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Body #{} at ({:.2}, {:.2}) speed {:.3} radius {}",
            self.id,
            self.position.x,
            self.position.y,
            self.speed(),
            self.radius
        )
    }
}

/// What the renderer needs for one body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub id: BodyId,
    pub position: DVec2,
    pub radius: f64,
}
