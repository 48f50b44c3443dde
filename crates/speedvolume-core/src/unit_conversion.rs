//! Speed Unit Conversion Functions
//!
//! Location providers report m/s; the control loop works in km/h.

const KMH_PER_MPS: f64 = 3.6;

/// Convert m/s to km/h
pub fn mps_to_kmh(mps: f64) -> f64 {
    mps * KMH_PER_MPS
}
