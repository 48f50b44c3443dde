//! Speed to volume mapping
//!
//! Linear ramp from `bounds.min` at the mode's floor speed to `bounds.max`
//! at the mode's ceiling speed. Below the window the floor applies, at or
//! above it the ceiling applies.

use crate::bounds::VolumeBounds;
use crate::mode::Mode;

/// Compute the target volume for a speed in km/h
///
/// # Arguments
/// * `speed_kmh` - Current ground speed
/// * `mode` - Movement mode selecting the speed window
/// * `bounds` - Output floor and ceiling
///
/// # Returns
/// A level in `[bounds.min, bounds.max]`. A speed that is not a number is
/// treated like a stationary device.
pub fn map_speed_to_volume(speed_kmh: f64, mode: Mode, bounds: VolumeBounds) -> u32 {
    let range = mode.speed_range();

    if speed_kmh.is_nan() || speed_kmh < range.min_kmh {
        return bounds.min;
    }

    if speed_kmh >= range.max_kmh {
        return bounds.max;
    }

    let ratio = (speed_kmh - range.min_kmh) / range.span();
    let step = (ratio * f64::from(bounds.span())).round() as u32;
    (bounds.min + step).min(bounds.max)
}
