//! Control loop controller
//!
//! Owns the run state, the selected mode, the volume bounds and the injected
//! collaborators. All methods are synchronous; the periodic cadence is
//! supplied by [`crate::runtime::ControlLoop`], which calls [`tick`] on a
//! single task.
//!
//! [`tick`]: SpeedVolumeController::tick

use serde::Serialize;
use std::time::Duration;

use crate::bounds::{BoundCoordinator, BoundsEdit, VolumeBounds};
use crate::config::ControllerConfig;
use crate::error::{ConfigError, ControlError};
use crate::mapper::map_speed_to_volume;
use crate::mode::Mode;
use crate::sink::{AuthorizationGate, VolumeSink};
use crate::source::{ProviderStatus, SpeedFeed, SpeedSource};

/// Whether the loop is driving the volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// Idle, volume held at the floor
    #[default]
    Stopped,
    /// Evaluating on every tick
    Running,
}

/// What a single evaluation did
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickReport {
    /// Speed the evaluation used (km/h)
    pub speed_kmh: f64,
    /// Computed level
    pub target_volume: u32,
    /// Whether the write was attempted (authorization granted)
    pub volume_written: bool,
    /// Provider availability after the tick
    pub provider_status: ProviderStatus,
}

/// Point-in-time view for a front-end
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerSnapshot {
    /// Current run state
    pub state: RunState,
    /// Selected mode
    pub mode: Mode,
    /// Floor and ceiling
    pub bounds: VolumeBounds,
    /// Last known speed (km/h)
    pub speed_kmh: f64,
    /// Level the sink reports, if it could be read
    pub reported_volume: Option<u32>,
    /// Provider availability
    pub provider_status: ProviderStatus,
    /// Whether volume writes are authorized
    pub volume_authorized: bool,
}

/// Maps speed samples to output volume on each tick
pub struct SpeedVolumeController {
    source: Box<dyn SpeedSource>,
    sink: Box<dyn VolumeSink>,
    gate: Box<dyn AuthorizationGate>,
    feed: SpeedFeed,
    coordinator: BoundCoordinator,
    mode: Mode,
    state: RunState,
    provider_status: ProviderStatus,
    tick_interval: Duration,
}

impl SpeedVolumeController {
    /// Create a stopped controller.
    ///
    /// The configuration is validated first, so a hand-built config gets the
    /// same checks as one read with [`ControllerConfig::load`].
    pub fn new(
        config: &ControllerConfig,
        source: Box<dyn SpeedSource>,
        sink: Box<dyn VolumeSink>,
        gate: Box<dyn AuthorizationGate>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let provider_status = source.status();
        Ok(Self {
            source,
            sink,
            gate,
            feed: SpeedFeed::new(),
            coordinator: BoundCoordinator::new(config.bounds, config.limits),
            mode: config.mode,
            state: RunState::Stopped,
            provider_status,
            tick_interval: config.tick_interval(),
        })
    }

    /// Current run state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Whether the loop is running
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Selected mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Select a mode. Takes effect on the next tick.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode != self.mode {
            tracing::info!(%mode, "mode changed");
            self.mode = mode;
        }
    }

    /// Current floor and ceiling
    pub fn bounds(&self) -> VolumeBounds {
        self.coordinator.bounds()
    }

    /// Edit the floor
    pub fn set_min_volume(&mut self, level: u32) -> BoundsEdit {
        self.coordinator.set_min(level)
    }

    /// Edit the ceiling
    pub fn set_max_volume(&mut self, level: u32) -> BoundsEdit {
        self.coordinator.set_max(level)
    }

    /// Period between ticks while running
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Last known speed in km/h
    pub fn current_speed(&self) -> f64 {
        self.feed.current_speed()
    }

    /// Provider availability as of the last refresh
    pub fn provider_status(&self) -> ProviderStatus {
        self.provider_status
    }

    /// Begin receiving samples.
    ///
    /// Already running is not an error. A subscribe failure leaves the
    /// controller stopped.
    pub fn start(&mut self) -> Result<(), ControlError> {
        if self.is_running() {
            return Ok(());
        }

        self.refresh_provider_status();
        if !self.provider_status.is_available() {
            tracing::warn!("no location provider enabled, starting anyway");
        }
        if !self.gate.may_control_volume() {
            tracing::warn!("volume control not authorized, writes will have no effect");
        }

        if let Err(e) = self.source.subscribe(self.feed.sender()) {
            tracing::warn!(error = %e, "failed to subscribe to speed source");
            return Err(e.into());
        }

        self.state = RunState::Running;
        tracing::info!(mode = %self.mode, "speed-based volume control started");
        Ok(())
    }

    /// Stop receiving samples and return the volume to the floor.
    ///
    /// Already stopped is not an error.
    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }

        self.source.unsubscribe();
        self.state = RunState::Stopped;
        self.apply_floor();
        tracing::info!("speed-based volume control stopped");
    }

    /// Run one evaluation. Does nothing while stopped.
    pub fn tick(&mut self) -> Option<TickReport> {
        if !self.is_running() {
            return None;
        }

        self.feed.drain();
        let speed_kmh = self.feed.current_speed();
        let target_volume = map_speed_to_volume(speed_kmh, self.mode, self.bounds());
        let volume_written = self.write_volume(target_volume);
        self.refresh_provider_status();

        tracing::debug!(
            speed_kmh,
            target_volume,
            volume_written,
            provider = %self.provider_status,
            "tick"
        );

        Some(TickReport {
            speed_kmh,
            target_volume,
            volume_written,
            provider_status: self.provider_status,
        })
    }

    /// Write the floor to the sink
    pub fn apply_floor(&mut self) {
        let floor = self.bounds().min;
        self.write_volume(floor);
    }

    /// Collect the current status. Pending samples are folded in first so
    /// the reported speed is current.
    pub fn snapshot(&mut self) -> ControllerSnapshot {
        self.feed.drain();
        ControllerSnapshot {
            state: self.state,
            mode: self.mode,
            bounds: self.bounds(),
            speed_kmh: self.feed.current_speed(),
            reported_volume: self.sink.volume().ok(),
            provider_status: self.provider_status,
            volume_authorized: self.gate.may_control_volume(),
        }
    }

    fn write_volume(&mut self, level: u32) -> bool {
        if !self.gate.may_control_volume() {
            return false;
        }
        if let Err(e) = self.sink.set_volume(level) {
            tracing::warn!(level, error = %e, "volume write failed");
        }
        true
    }

    fn refresh_provider_status(&mut self) {
        let status = self.source.status();
        if status != self.provider_status {
            tracing::info!(from = %self.provider_status, to = %status, "provider status changed");
            self.provider_status = status;
        }
    }
}

impl Drop for SpeedVolumeController {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for SpeedVolumeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeedVolumeController")
            .field("state", &self.state)
            .field("mode", &self.mode)
            .field("bounds", &self.bounds())
            .field("speed_kmh", &self.feed.current_speed())
            .field("provider_status", &self.provider_status)
            .finish()
    }
}
