//! Rectangular arena bounds
//!
//! Origin at the top-left corner, x to the right, y down (screen coordinates).

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Width/height of the play area, fixed for a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaBounds {
    pub width: f64,
    pub height: f64,
}

impl ArenaBounds {
    pub fn new(width: f64, height: f64) -> SimResult<Self> {
        let bounds = Self { width, height };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(self.width.is_finite() && self.height.is_finite()) || self.width <= 0.0 || self.height <= 0.0 {
            return Err(SimError::invalid(format!(
                "arena must have positive size, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Clamp a centre into `[r, w-r] x [r, h-r]`.
    ///
    /// Uses max-then-min rather than `f64::clamp` so a body wider than the
    /// arena does not panic; it ends up pinned to the far edge instead.
    #[inline]
    pub fn clamp(&self, position: DVec2, radius: f64) -> DVec2 {
        DVec2::new(
            position.x.max(radius).min(self.width - radius),
            position.y.max(radius).min(self.height - radius),
        )
    }

    /// Containment test with a small slack for rounding
    pub fn contains(&self, position: DVec2, radius: f64, epsilon: f64) -> bool {
        position.x >= radius - epsilon
            && position.x <= self.width - radius + epsilon
            && position.y >= radius - epsilon
            && position.y <= self.height - radius + epsilon
    }

    /// Shift that moves both centres of a pair inside the band without
    /// changing their separation. Zero when both already fit.
    pub fn pair_shift(&self, a: DVec2, ra: f64, b: DVec2, rb: f64) -> DVec2 {
        DVec2::new(
            axis_shift(a.x, ra, b.x, rb, self.width),
            axis_shift(a.y, ra, b.y, rb, self.height),
        )
    }
}

fn axis_shift(a: f64, ra: f64, b: f64, rb: f64, extent: f64) -> f64 {
    // Smallest push needed off the low edge, largest allowed toward the high edge
    let need = (ra - a).max(rb - b);
    let allow = (extent - ra - a).min(extent - rb - b);
    if need > 0.0 {
        need
    } else if allow < 0.0 {
        allow
    } else {
        0.0
    }
}
