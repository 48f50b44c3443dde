//! # SpeedVolume Core Library
//!
//! Drives a media output volume from measured ground speed.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Movement modes with their speed windows
//! - The speed to volume mapping
//! - Ordered floor/ceiling bounds with coordinated edits
//! - A start/stop control loop re-evaluating every 500 ms on a tokio task
//! - Demo collaborators (simulated drive, in-memory sink)
//!
//! ## Example
//!
//! ```rust,ignore
//! use speedvolume_core::prelude::*;
//!
//! let config = ControllerConfig::load("speedvolume.json")?;
//! let controller = SpeedVolumeController::new(
//!     &config,
//!     Box::new(DemoSpeedSource::new()),
//!     Box::new(MemoryVolumeSink::new(100)),
//!     Box::new(AlwaysAuthorized),
//! )?;
//!
//! let (handle, _task) = ControlLoop::spawn(controller);
//! handle.start().await?;
//! handle.set_mode(Mode::Bike).await?;
//! println!("{:?}", handle.snapshot().await?);
//! ```

pub mod bounds;
pub mod config;
pub mod controller;
pub mod demo;
pub mod error;
pub mod mapper;
pub mod mode;
pub mod runtime;
pub mod sink;
pub mod source;
pub mod unit_conversion;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::bounds::{BoundCoordinator, BoundsEdit, VolumeBounds, VolumeLimits};
    pub use crate::config::ControllerConfig;
    pub use crate::controller::{ControllerSnapshot, RunState, SpeedVolumeController, TickReport};
    pub use crate::demo::{DemoDrive, DemoSpeedSource, MemoryVolumeSink};
    pub use crate::error::{ConfigError, ControlError, SinkError, SpeedSourceError};
    pub use crate::mapper::map_speed_to_volume;
    pub use crate::mode::{thresholds_for, Mode, SpeedRange};
    pub use crate::runtime::{ControlLoop, ControllerHandle};
    pub use crate::sink::{AlwaysAuthorized, AuthorizationGate, VolumeSink};
    pub use crate::source::{ProviderStatus, SampleSender, SpeedFeed, SpeedSample, SpeedSource};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
