//! Bounce Sim - bouncing and homing circles with elastic collisions
//!
//! Core modules:
//! - `sim`: Deterministic simulation (placement, motion, walls, collisions, world)
//! - `settings`: Data-driven configuration and variant presets
//! - `error`: Error taxonomy shared by the above
//!
//! Rendering, audio and input decoding belong to the host. The host drives
//! `World::tick` once per frame and keys its sprites and sounds by `BodyId`.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{SimError, SimResult};
pub use settings::{SimConfig, Variant};
pub use sim::{BodyId, BodySnapshot, CollisionEvent, TickResult, World};

/// Simulation constants
///
/// Distances are pixels and times are milliseconds, so speeds are px/ms.
pub mod consts {
    /// Frame rate the demos were tuned for
    pub const FRAME_RATE: u32 = 60;
    /// Frame time at `FRAME_RATE`
    pub const FRAME_DT_MS: f64 = 1000.0 / FRAME_RATE as f64;

    /// Free-flight variant speed bounds
    pub const BOUNCE_MIN_SPEED: f64 = 0.1;
    pub const BOUNCE_MAX_SPEED: f64 = 0.7;
    /// Target-seeking variant speed bounds
    pub const HOMING_MIN_SPEED: f64 = 0.25;
    pub const HOMING_MAX_SPEED: f64 = 5.0;

    /// Arena dimensions
    pub const ARENA_WIDTH: f64 = 800.0;
    pub const ARENA_HEIGHT: f64 = 800.0;

    /// Population defaults
    pub const DEFAULT_BODY_COUNT: usize = 10;
    pub const DEFAULT_RADIUS: f64 = 32.0;
    /// A tenth of the radius, rounded down
    pub const DEFAULT_BUFFER: f64 = 3.0;
    /// Spawns stay five radii away from the walls
    pub const DEFAULT_EDGE_MARGIN: f64 = 5.0 * DEFAULT_RADIUS;

    pub const DEFAULT_SEED: u64 = 12345;
}
