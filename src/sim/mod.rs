//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Caller-supplied dt, no clock reads
//! - Seeded RNG only (placement)
//! - Stable iteration order (by index into the body list)
//! - No rendering, audio or input dependencies

pub mod arena;
pub mod body;
pub mod boundary;
pub mod collision;
pub mod motion;
pub mod placement;
pub mod world;

pub use arena::ArenaBounds;
pub use body::{Body, BodyId, BodySnapshot, SpeedRange};
pub use boundary::{BoundaryReflector, CornerPolicy, reflect_velocity};
pub use collision::{CollisionEvent, CollisionResolver, elastic_bounce, resolve_collisions};
pub use motion::{MotionMode, home_toward, integrate};
pub use placement::{PlacementGenerator, place, random_direction};
pub use world::{TickResult, World, WorldPhase};
