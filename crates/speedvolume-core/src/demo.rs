//! Demo Mode - Simulated drive for testing without a location provider
//!
//! [`DemoDrive`] generates a plausible speed profile: standing at a light,
//! pulling away, cruising with some jitter, braking to a stop, repeat.
//! Speeds are ground speed in m/s, as a location fix reports them.
//! [`DemoSpeedSource`] pushes that profile into the control loop once per
//! second, and [`MemoryVolumeSink`] stands in for the system volume.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::error::{SinkError, SpeedSourceError};
use crate::sink::VolumeSink;
use crate::source::{ProviderStatus, SampleSender, SpeedSample, SpeedSource};

/// Interval between simulated location fixes
pub const DEMO_FIX_INTERVAL: Duration = Duration::from_millis(1000);

/// Simulated vehicle speed generator
pub struct DemoDrive {
    /// Last update time (ms)
    last_update_ms: Option<u64>,
    /// Current phase of the drive
    phase: DrivePhase,
    /// Current speed (m/s)
    speed_mps: f64,
    /// Random number generator
    rng: StdRng,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DrivePhase {
    /// Standing still until the given time
    Stopped { until_ms: u64 },
    /// Speeding up towards a cruise speed
    Accelerating { target_mps: f64 },
    /// Holding speed until the given time
    Cruising { target_mps: f64, until_ms: u64 },
    /// Slowing down to a stop
    Braking,
}

/// Acceleration while pulling away (m/s²)
const ACCEL_MPS2: f64 = 2.2;
/// Deceleration while braking (m/s²)
const BRAKE_MPS2: f64 = 3.3;

impl Default for DemoDrive {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoDrive {
    /// Create a drive with a random seed
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create a reproducible drive
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(mut rng: StdRng) -> Self {
        let until_ms = rng.gen_range(3000..8000);
        Self {
            last_update_ms: None,
            phase: DrivePhase::Stopped { until_ms },
            speed_mps: 0.0,
            rng,
        }
    }

    /// Current speed in m/s without advancing the simulation
    pub fn speed(&self) -> f64 {
        self.speed_mps
    }

    /// Advance the simulation and return the speed in m/s
    ///
    /// # Arguments
    /// * `elapsed_ms` - Milliseconds since the drive started
    pub fn update(&mut self, elapsed_ms: u64) -> f64 {
        let delta_s = self
            .last_update_ms
            .map(|last| elapsed_ms.saturating_sub(last) as f64 / 1000.0)
            .unwrap_or(0.0);
        self.last_update_ms = Some(elapsed_ms);

        match self.phase {
            DrivePhase::Stopped { until_ms } => {
                self.speed_mps = 0.0;
                if elapsed_ms >= until_ms {
                    let target_mps = self.rng.gen_range(8.0..30.0);
                    self.phase = DrivePhase::Accelerating { target_mps };
                }
            }
            DrivePhase::Accelerating { target_mps } => {
                self.speed_mps = (self.speed_mps + ACCEL_MPS2 * delta_s).min(target_mps);
                if self.speed_mps >= target_mps {
                    let hold_ms = self.rng.gen_range(10_000..30_000);
                    self.phase = DrivePhase::Cruising {
                        target_mps,
                        until_ms: elapsed_ms + hold_ms,
                    };
                }
            }
            DrivePhase::Cruising {
                target_mps,
                until_ms,
            } => {
                let jitter = self.rng.gen_range(-0.5..0.5);
                self.speed_mps = (target_mps + jitter).max(0.0);
                if elapsed_ms >= until_ms {
                    self.phase = DrivePhase::Braking;
                }
            }
            DrivePhase::Braking => {
                self.speed_mps = (self.speed_mps - BRAKE_MPS2 * delta_s).max(0.0);
                if self.speed_mps == 0.0 {
                    let wait_ms = self.rng.gen_range(3000..8000);
                    self.phase = DrivePhase::Stopped {
                        until_ms: elapsed_ms + wait_ms,
                    };
                }
            }
        }

        self.speed_mps
    }
}

/// Speed source backed by a [`DemoDrive`] on a tokio task
pub struct DemoSpeedSource {
    seed: Option<u64>,
    status: ProviderStatus,
    fix_interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl Default for DemoSpeedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoSpeedSource {
    /// Create a source reporting a precise provider
    pub fn new() -> Self {
        Self {
            seed: None,
            status: ProviderStatus::Precise,
            fix_interval: DEMO_FIX_INTERVAL,
            task: None,
        }
    }

    /// Use a fixed seed so every subscription replays the same drive
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Report a different provider status
    pub fn with_status(mut self, status: ProviderStatus) -> Self {
        self.status = status;
        self
    }

    /// Change the time between fixes
    pub fn with_fix_interval(mut self, interval: Duration) -> Self {
        self.fix_interval = interval;
        self
    }

    /// Whether a drive is currently being streamed
    pub fn is_subscribed(&self) -> bool {
        self.task.is_some()
    }
}

impl SpeedSource for DemoSpeedSource {
    fn subscribe(&mut self, samples: SampleSender) -> Result<(), SpeedSourceError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SpeedSourceError::Unavailable(e.to_string()))?;

        self.unsubscribe();

        let mut drive = match self.seed {
            Some(seed) => DemoDrive::with_seed(seed),
            None => DemoDrive::new(),
        };
        let fix_interval = self.fix_interval;

        self.task = Some(runtime.spawn(async move {
            let started = tokio::time::Instant::now();
            let mut ticker = tokio::time::interval(fix_interval);
            loop {
                ticker.tick().await;
                let elapsed_ms = started.elapsed().as_millis() as u64;
                let speed_mps = drive.update(elapsed_ms);
                let sample = SpeedSample::from_meters_per_second(speed_mps, Utc::now());
                if samples.send(sample).is_err() {
                    break;
                }
            }
        }));

        tracing::debug!(interval_ms = fix_interval.as_millis() as u64, "demo drive subscribed");
        Ok(())
    }

    fn unsubscribe(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("demo drive unsubscribed");
        }
    }

    fn status(&self) -> ProviderStatus {
        self.status
    }
}

impl Drop for DemoSpeedSource {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[derive(Debug)]
struct MemorySinkState {
    level: u32,
    max_level: u32,
    writes: usize,
    reject_writes: bool,
}

/// In-memory volume sink. Clones share the same level.
#[derive(Debug, Clone)]
pub struct MemoryVolumeSink {
    state: Arc<Mutex<MemorySinkState>>,
}

impl MemoryVolumeSink {
    /// Create a sink accepting levels up to `max_level`
    pub fn new(max_level: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemorySinkState {
                level: 0,
                max_level,
                writes: 0,
                reject_writes: false,
            })),
        }
    }

    /// Current level
    pub fn level(&self) -> u32 {
        self.lock().level
    }

    /// Number of accepted writes
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    /// Make subsequent writes fail (or succeed again)
    pub fn set_reject_writes(&self, reject: bool) {
        self.lock().reject_writes = reject;
    }

    fn lock(&self) -> MutexGuard<'_, MemorySinkState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl VolumeSink for MemoryVolumeSink {
    fn set_volume(&mut self, level: u32) -> Result<(), SinkError> {
        let mut state = self.lock();
        if state.reject_writes {
            return Err(SinkError::Rejected("sink is read-only".to_string()));
        }
        state.level = level.min(state.max_level);
        state.writes += 1;
        Ok(())
    }

    fn volume(&self) -> Result<u32, SinkError> {
        Ok(self.level())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_starts_stationary() {
        let mut drive = DemoDrive::with_seed(7);
        for ms in (0..3000).step_by(500) {
            assert_eq!(drive.update(ms), 0.0);
        }
    }

    #[test]
    fn test_drive_speed_stays_in_range() {
        let mut drive = DemoDrive::with_seed(42);
        let mut peak: f64 = 0.0;
        for ms in (0..300_000).step_by(1000) {
            let speed = drive.update(ms);
            assert!((0.0..=30.5).contains(&speed), "speed {} out of range", speed);
            assert_eq!(drive.speed(), speed);
            peak = peak.max(speed);
        }
        assert!(peak > 7.0, "drive never got moving, peak {}", peak);
    }

    #[test]
    fn test_seeded_drives_repeat() {
        let mut a = DemoDrive::with_seed(3);
        let mut b = DemoDrive::with_seed(3);
        for ms in (0..60_000).step_by(1000) {
            assert_eq!(a.update(ms), b.update(ms));
        }
    }

    #[test]
    fn test_memory_sink_clamps_and_counts() {
        let mut sink = MemoryVolumeSink::new(15);
        sink.set_volume(40).unwrap();
        assert_eq!(sink.level(), 15);
        assert_eq!(sink.writes(), 1);

        let observer = sink.clone();
        sink.set_reject_writes(true);
        assert!(sink.set_volume(3).is_err());
        assert_eq!(observer.level(), 15);
        assert_eq!(observer.writes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_source_streams_samples() {
        let mut source = DemoSpeedSource::new().with_seed(1);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        source.subscribe(tx).unwrap();
        assert!(source.is_subscribed());

        let first = rx.recv().await.unwrap();
        assert_eq!(first.speed_kmh, 0.0);

        source.unsubscribe();
        assert!(!source.is_subscribed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_source_converts_fixes_to_kmh() {
        let mut source = DemoSpeedSource::new().with_seed(5);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        source.subscribe(tx).unwrap();

        let mut replay = DemoDrive::with_seed(5);
        for second in 0..40u64 {
            let sample = rx.recv().await.unwrap();
            let expected = crate::unit_conversion::mps_to_kmh(replay.update(second * 1000));
            assert!((sample.speed_kmh - expected).abs() < 1e-9);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_source_options() {
        let mut source = DemoSpeedSource::new()
            .with_status(ProviderStatus::Coarse)
            .with_fix_interval(Duration::from_millis(250));
        assert_eq!(source.status(), ProviderStatus::Coarse);

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        source.subscribe(tx).unwrap();
        let started = tokio::time::Instant::now();

        rx.recv().await.unwrap();
        rx.recv().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_millis(250));
    }

    #[test]
    fn test_demo_source_needs_runtime() {
        let mut source = DemoSpeedSource::new();
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        assert!(matches!(
            source.subscribe(tx),
            Err(SpeedSourceError::Unavailable(_))
        ));
    }
}
