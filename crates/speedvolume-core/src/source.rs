//! Speed Source Adapter
//!
//! Platform location services push samples into a [`SampleSender`] from
//! whatever thread they run on. The [`SpeedFeed`] owns the receiving end and
//! is drained on the control loop task, so the last known speed is only ever
//! touched from one place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

use crate::error::SpeedSourceError;
use crate::unit_conversion::mps_to_kmh;

/// Sending half handed to a [`SpeedSource`] on subscribe
pub type SampleSender = mpsc::UnboundedSender<SpeedSample>;

/// A single ground speed measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedSample {
    /// Ground speed in km/h
    pub speed_kmh: f64,
    /// When the provider produced the fix
    pub timestamp: DateTime<Utc>,
}

impl SpeedSample {
    /// Create a sample from a km/h reading
    pub fn new(speed_kmh: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            speed_kmh,
            timestamp,
        }
    }

    /// Create a sample from a m/s reading, as location providers report it
    pub fn from_meters_per_second(mps: f64, timestamp: DateTime<Utc>) -> Self {
        Self::new(mps_to_kmh(mps), timestamp)
    }

    /// Create a sample stamped with the current time
    pub fn now(speed_kmh: f64) -> Self {
        Self::new(speed_kmh, Utc::now())
    }

    /// Finite and non-negative
    pub fn is_valid(&self) -> bool {
        self.speed_kmh.is_finite() && self.speed_kmh >= 0.0
    }
}

/// Which location provider is currently able to deliver fixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderStatus {
    /// Satellite fix available
    Precise,
    /// Only network-based location available
    Coarse,
    /// No provider enabled
    #[default]
    Unavailable,
}

impl ProviderStatus {
    /// Status line shown to the user
    pub fn label(self) -> &'static str {
        match self {
            ProviderStatus::Precise => "GPS: Connected",
            ProviderStatus::Coarse => "GPS: Using Network",
            ProviderStatus::Unavailable => "GPS: Disconnected",
        }
    }

    /// Whether any provider can deliver samples
    pub fn is_available(self) -> bool {
        !matches!(self, ProviderStatus::Unavailable)
    }
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// External provider of real-time speed samples
pub trait SpeedSource: Send {
    /// Start delivering samples into `samples`
    fn subscribe(&mut self, samples: SampleSender) -> Result<(), SpeedSourceError>;

    /// Stop delivering samples. Must be safe to call when not subscribed.
    fn unsubscribe(&mut self);

    /// Current provider availability
    fn status(&self) -> ProviderStatus;
}

/// Holds the last known speed, fed through an unbounded channel
#[derive(Debug)]
pub struct SpeedFeed {
    tx: SampleSender,
    rx: mpsc::UnboundedReceiver<SpeedSample>,
    last: Option<SpeedSample>,
}

impl Default for SpeedFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeedFeed {
    /// Create an empty feed
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx, last: None }
    }

    /// Sender for a source to push samples into
    pub fn sender(&self) -> SampleSender {
        self.tx.clone()
    }

    /// Record a sample directly. Invalid samples are dropped.
    ///
    /// Returns whether the sample became the last known speed.
    pub fn record(&mut self, sample: SpeedSample) -> bool {
        if !sample.is_valid() {
            tracing::warn!(speed_kmh = sample.speed_kmh, "dropping invalid speed sample");
            return false;
        }
        self.last = Some(sample);
        true
    }

    /// Consume every pending sample, keeping the most recent valid one.
    ///
    /// Returns the number of samples accepted.
    pub fn drain(&mut self) -> usize {
        let mut accepted = 0;
        while let Ok(sample) = self.rx.try_recv() {
            if self.record(sample) {
                accepted += 1;
            }
        }
        accepted
    }

    /// Last known speed in km/h, or 0 before the first sample
    pub fn current_speed(&self) -> f64 {
        self.last.map(|s| s.speed_kmh).unwrap_or(0.0)
    }

    /// Last accepted sample
    pub fn last_sample(&self) -> Option<&SpeedSample> {
        self.last.as_ref()
    }
}
