//! Volume bounds and the coordinator that keeps them ordered
//!
//! The user edits the floor and the ceiling independently. Whenever an edit
//! would make `min >= max`, the other bound is pushed out of the way:
//!
//! - lowering the ceiling drags the floor down, but never below `lower_limit`
//! - raising the floor drags the ceiling up, but never above `upper_limit`
//!
//! `upper_limit` is independent of the device's maximum level, so the two
//! directions are intentionally asymmetric. When the partner cannot move far
//! enough, the edited bound itself is snapped back so that `min < max` holds.

use serde::{Deserialize, Serialize};

/// User-configured output floor and ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeBounds {
    /// Volume when stationary or below the mode's speed window
    pub min: u32,
    /// Volume at or above the top of the mode's speed window
    pub max: u32,
}

impl Default for VolumeBounds {
    fn default() -> Self {
        Self { min: 1, max: 40 }
    }
}

impl VolumeBounds {
    /// Create a bounds pair
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Whether `min < max`
    pub fn is_ordered(&self) -> bool {
        self.min < self.max
    }

    /// Distance between ceiling and floor
    pub fn span(&self) -> u32 {
        self.max.saturating_sub(self.min)
    }

    /// Whether a level lies inside `[min, max]`
    pub fn contains(&self, level: u32) -> bool {
        (self.min..=self.max).contains(&level)
    }
}

/// Absolute limits that govern bound edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeLimits {
    /// Lowest value the floor may be dragged down to when the ceiling drops
    pub lower_limit: u32,
    /// Highest value the ceiling may be dragged up to when the floor rises
    pub upper_limit: u32,
    /// Highest level the output device accepts
    pub device_max_volume: u32,
}

impl Default for VolumeLimits {
    fn default() -> Self {
        Self {
            lower_limit: 1,
            upper_limit: 35,
            device_max_volume: 100,
        }
    }
}

/// Outcome of a single bound edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundsEdit {
    /// Bounds after the edit
    pub bounds: VolumeBounds,
    /// The other bound was moved to keep `min < max`
    pub partner_adjusted: bool,
    /// The requested value could not be applied as-is
    pub request_clamped: bool,
}

/// Applies user edits to [`VolumeBounds`] while preserving `min < max`
#[derive(Debug, Clone)]
pub struct BoundCoordinator {
    bounds: VolumeBounds,
    limits: VolumeLimits,
}

impl BoundCoordinator {
    /// Create a coordinator.
    ///
    /// Initial bounds outside the device range or out of order are pulled
    /// back in: the ceiling is clamped to `device_max_volume` (and kept at
    /// least 1), then the floor is kept below it.
    pub fn new(bounds: VolumeBounds, limits: VolumeLimits) -> Self {
        let max = bounds.max.min(limits.device_max_volume).max(1);
        let min = bounds.min.min(max - 1);
        let normalized = VolumeBounds::new(min, max);

        if normalized != bounds {
            tracing::warn!(
                requested_min = bounds.min,
                requested_max = bounds.max,
                min,
                max,
                "initial volume bounds normalized"
            );
        }

        Self {
            bounds: normalized,
            limits,
        }
    }

    /// Current bounds
    pub fn bounds(&self) -> VolumeBounds {
        self.bounds
    }

    /// Configured limits
    pub fn limits(&self) -> VolumeLimits {
        self.limits
    }

    /// Set the ceiling. Drags the floor down to `max(lower_limit, max - 1)`
    /// when the new ceiling is not above it.
    pub fn set_max(&mut self, requested: u32) -> BoundsEdit {
        let value = requested.min(self.limits.device_max_volume);
        let mut request_clamped = value != requested;
        let mut partner_adjusted = false;

        self.bounds.max = value;
        if self.bounds.max <= self.bounds.min {
            self.bounds.min = self
                .bounds
                .max
                .saturating_sub(1)
                .max(self.limits.lower_limit);
            partner_adjusted = true;

            // Ceiling at or below the floor limit: keep it one step above.
            if self.bounds.min >= self.bounds.max {
                self.bounds.max = self.bounds.min + 1;
                request_clamped = true;
            }
        }

        self.finish("max", requested, partner_adjusted, request_clamped)
    }

    /// Set the floor. Drags the ceiling up to `min(upper_limit, min + 1)`
    /// when the new floor is not below it.
    pub fn set_min(&mut self, requested: u32) -> BoundsEdit {
        let value = requested.min(self.limits.device_max_volume);
        let mut request_clamped = value != requested;
        let mut partner_adjusted = false;

        self.bounds.min = value;
        if self.bounds.min >= self.bounds.max {
            self.bounds.max = (self.bounds.min + 1).min(self.limits.upper_limit);
            partner_adjusted = true;

            // Floor at or above the ceiling limit: keep it one step below.
            if self.bounds.min >= self.bounds.max {
                self.bounds.min = self.bounds.max.saturating_sub(1);
                request_clamped = true;
            }
        }

        self.finish("min", requested, partner_adjusted, request_clamped)
    }

    fn finish(
        &self,
        edited: &'static str,
        requested: u32,
        partner_adjusted: bool,
        request_clamped: bool,
    ) -> BoundsEdit {
        debug_assert!(self.bounds.is_ordered());

        if partner_adjusted || request_clamped {
            tracing::debug!(
                edited,
                requested,
                min = self.bounds.min,
                max = self.bounds.max,
                partner_adjusted,
                request_clamped,
                "volume bounds adjusted"
            );
        }

        BoundsEdit {
            bounds: self.bounds,
            partner_adjusted,
            request_clamped,
        }
    }
}
