//! Non-overlapping spawn placement
//!
//! Rejection sampling: draw a uniform candidate, keep it if it clears every
//! accepted position by `2 * (radius + buffer)`, otherwise draw again. Each body
//! gets a bounded number of draws so an over-packed arena fails instead of
//! spinning forever.

use std::f64::consts::TAU;

use glam::DVec2;
use rand::Rng;

use super::arena::ArenaBounds;
use super::body::{Body, BodyId, SpeedRange};
use crate::error::{SimError, SimResult};

/// Default number of draws per body before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10_000;

/// Spawn placement parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementGenerator {
    pub radius: f64,
    /// Extra clearance between body edges at spawn time
    pub buffer: f64,
    /// Minimum distance from a spawned centre to the arena edge.
    /// Never smaller than `radius + buffer`.
    pub edge_margin: f64,
    pub max_attempts: u32,
}

impl PlacementGenerator {
    pub fn new(radius: f64, buffer: f64) -> SimResult<Self> {
        let generator = Self {
            radius,
            buffer,
            edge_margin: radius + buffer,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        };
        generator.validate()?;
        Ok(generator)
    }

    /// Keep spawns further from the walls than `radius + buffer`
    pub fn with_edge_margin(mut self, margin: f64) -> Self {
        self.edge_margin = margin.max(self.radius + self.buffer);
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn validate(&self) -> SimResult<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(SimError::invalid(format!(
                "radius must be positive, got {}",
                self.radius
            )));
        }
        if !self.buffer.is_finite() || self.buffer < 0.0 {
            return Err(SimError::invalid(format!(
                "placement buffer must be non-negative, got {}",
                self.buffer
            )));
        }
        if self.max_attempts == 0 {
            return Err(SimError::invalid("placement attempt budget must be at least 1"));
        }
        Ok(())
    }

    /// Minimum centre-to-centre distance between spawned bodies
    #[inline]
    pub fn separation(&self) -> f64 {
        2.0 * (self.radius + self.buffer)
    }

    /// Draw `count` pairwise-separated positions inside `arena`
    pub fn place<R: Rng>(
        &self,
        count: usize,
        arena: &ArenaBounds,
        rng: &mut R,
    ) -> SimResult<Vec<DVec2>> {
        let margin = self.edge_margin.max(self.radius + self.buffer);
        let (lo_x, hi_x) = (margin, arena.width - 1.0 - margin);
        let (lo_y, hi_y) = (margin, arena.height - 1.0 - margin);

        let mut positions: Vec<DVec2> = Vec::with_capacity(count);
        if count == 0 {
            return Ok(positions);
        }
        if hi_x < lo_x || hi_y < lo_y {
            log::warn!(
                "Arena {}x{} too small for edge margin {}",
                arena.width,
                arena.height,
                margin
            );
            return Err(SimError::PlacementInfeasible {
                placed: 0,
                requested: count,
            });
        }

        let separation = self.separation();
        for _ in 0..count {
            let mut accepted = None;
            for _ in 0..self.max_attempts {
                let candidate = DVec2::new(rng.random_range(lo_x..=hi_x), rng.random_range(lo_y..=hi_y));
                if positions.iter().all(|p| p.distance(candidate) >= separation) {
                    accepted = Some(candidate);
                    break;
                }
            }
            match accepted {
                Some(p) => positions.push(p),
                None => {
                    log::warn!(
                        "Placement gave up after {} attempts with {}/{} bodies placed",
                        self.max_attempts,
                        positions.len(),
                        count
                    );
                    return Err(SimError::PlacementInfeasible {
                        placed: positions.len(),
                        requested: count,
                    });
                }
            }
        }
        Ok(positions)
    }

    /// Place `count` bodies and give each a random heading and speed.
    /// Ids run from 0 in placement order.
    pub fn spawn<R: Rng>(
        &self,
        count: usize,
        arena: &ArenaBounds,
        speeds: &SpeedRange,
        rng: &mut R,
    ) -> SimResult<Vec<Body>> {
        let positions = self.place(count, arena, rng)?;
        let bodies = positions
            .into_iter()
            .enumerate()
            .map(|(i, position)| {
                let direction = random_direction(rng);
                let speed = rng.random_range(speeds.min..=speeds.max);
                Body::new(BodyId(i as u32), position, direction * speed, self.radius)
            })
            .collect();
        Ok(bodies)
    }
}

/// Free-function form of [`PlacementGenerator::place`]
pub fn place<R: Rng>(
    count: usize,
    radius: f64,
    min_buffer: f64,
    arena: &ArenaBounds,
    rng: &mut R,
) -> SimResult<Vec<DVec2>> {
    PlacementGenerator::new(radius, min_buffer)?.place(count, arena, rng)
}

/// Uniformly random unit vector
pub fn random_direction<R: Rng>(rng: &mut R) -> DVec2 {
    let theta = rng.random_range(0.0..TAU);
    DVec2::new(theta.cos(), theta.sin())
}
