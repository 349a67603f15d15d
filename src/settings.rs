//! Simulation settings
//!
//! Loaded from a JSON file by the native driver, or built in code by a host.
//! Missing fields fall back to the ten-ball bounce scene defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{SimError, SimResult};
use crate::sim::{ArenaBounds, CornerPolicy, PlacementGenerator, SpeedRange};

/// Which demo the world behaves like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Variant {
    /// Free flight off the walls; a target makes every body seek it
    #[default]
    Bounce,
    /// Bodies seek the target while it is set and drift home otherwise
    Homing,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Bounce => "Bounce",
            Variant::Homing => "Homing",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bounce" => Some(Variant::Bounce),
            "homing" | "home" => Some(Variant::Homing),
            _ => None,
        }
    }

    /// Spawn speed bounds this variant was tuned for
    pub fn speed_range(&self) -> SpeedRange {
        match self {
            Variant::Bounce => SpeedRange {
                min: BOUNCE_MIN_SPEED,
                max: BOUNCE_MAX_SPEED,
            },
            Variant::Homing => SpeedRange {
                min: HOMING_MIN_SPEED,
                max: HOMING_MAX_SPEED,
            },
        }
    }
}

/// Everything needed to build a `World`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub variant: Variant,
    pub arena: ArenaBounds,
    pub body_count: usize,
    pub radius: f64,
    /// Extra clearance between bodies at spawn time
    pub placement_buffer: f64,
    /// Keep spawns at least this far from the walls (never less than
    /// `radius + placement_buffer`)
    pub edge_margin: Option<f64>,
    pub speed_range: SpeedRange,
    pub seed: u64,
    pub corner_policy: CornerPolicy,
    pub max_placement_attempts: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Bounce,
            arena: ArenaBounds {
                width: ARENA_WIDTH,
                height: ARENA_HEIGHT,
            },
            body_count: DEFAULT_BODY_COUNT,
            radius: DEFAULT_RADIUS,
            placement_buffer: DEFAULT_BUFFER,
            edge_margin: Some(DEFAULT_EDGE_MARGIN),
            speed_range: Variant::Bounce.speed_range(),
            seed: DEFAULT_SEED,
            corner_policy: CornerPolicy::FirstMatch,
            max_placement_attempts: crate::sim::placement::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl SimConfig {
    /// Defaults with the variant's speed bounds
    pub fn from_variant(variant: Variant) -> Self {
        Self {
            variant,
            speed_range: variant.speed_range(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        self.arena.validate()?;
        self.speed_range.validate()?;
        if let Some(margin) = self.edge_margin {
            if !margin.is_finite() || margin < 0.0 {
                return Err(SimError::invalid(format!(
                    "edge margin must be non-negative, got {margin}"
                )));
            }
        }
        self.placement()?.validate()
    }

    /// Spawn placement built from these settings
    pub fn placement(&self) -> SimResult<PlacementGenerator> {
        let mut generator = PlacementGenerator::new(self.radius, self.placement_buffer)?
            .with_max_attempts(self.max_placement_attempts);
        if let Some(margin) = self.edge_margin {
            generator = generator.with_edge_margin(margin);
        }
        Ok(generator)
    }

    /// Read and validate a JSON settings file
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SimError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(config)
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
