//! Arena wall handling
//!
//! Clamp first, then reflect the heading about the inward normal of every
//! wall the body is touching. Reflection only flips a velocity that points
//! into the wall; one already heading back inside is left alone.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::arena::ArenaBounds;
use super::body::Body;

/// Inward normals in test order: left, right, top, bottom
pub const WALL_NORMALS: [DVec2; 4] = [
    DVec2::new(1.0, 0.0),
    DVec2::new(-1.0, 0.0),
    DVec2::new(0.0, 1.0),
    DVec2::new(0.0, -1.0),
];

/// What to do when a body touches two walls at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CornerPolicy {
    /// Reflect about the first wall in left/right/top/bottom order
    #[default]
    FirstMatch,
    /// Reflect about every touched wall (true corner bounce)
    ReflectAll,
}

/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: DVec2, normal: DVec2) -> DVec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundaryReflector {
    pub corner_policy: CornerPolicy,
}

impl BoundaryReflector {
    pub fn new(corner_policy: CornerPolicy) -> Self {
        Self { corner_policy }
    }

    /// Clamp `body` into the arena and bounce it off any wall it touches.
    /// Returns true if the velocity was reflected.
    pub fn apply(&self, body: &mut Body, arena: &ArenaBounds) -> bool {
        body.position = arena.clamp(body.position, body.radius);

        let mut reflected = false;
        for normal in touched_walls(body.position, body.radius, arena) {
            if body.velocity.dot(normal) >= 0.0 {
                continue;
            }
            body.velocity = reflect_velocity(body.velocity, normal);
            reflected = true;
            if self.corner_policy == CornerPolicy::FirstMatch {
                break;
            }
        }
        reflected
    }
}

/// Clamp only; used while bodies are homing
#[inline]
pub fn contain(body: &mut Body, arena: &ArenaBounds) {
    body.position = arena.clamp(body.position, body.radius);
}

/// Inward normals of the walls `position` touches or penetrates
fn touched_walls(position: DVec2, radius: f64, arena: &ArenaBounds) -> impl Iterator<Item = DVec2> {
    let touching = [
        position.x <= radius,
        position.x >= arena.width - radius,
        position.y <= radius,
        position.y >= arena.height - radius,
    ];
    WALL_NORMALS
        .into_iter()
        .zip(touching)
        .filter_map(|(normal, hit)| hit.then_some(normal))
}
