//! Volume output interfaces
//!
//! The sink is the system property the loop writes to. It applies its own
//! floor and ceiling, and may silently ignore writes when the process is not
//! allowed to change the volume.

use crate::error::SinkError;

/// Output channel whose level is driven by the control loop
pub trait VolumeSink: Send {
    /// Request a new output level
    fn set_volume(&mut self, level: u32) -> Result<(), SinkError>;

    /// Level the device actually reports
    fn volume(&self) -> Result<u32, SinkError>;
}

/// Capability check performed before each volume write
pub trait AuthorizationGate: Send {
    /// Whether volume writes are expected to take effect
    fn may_control_volume(&self) -> bool;
}

/// Gate for platforms without a volume permission
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAuthorized;

impl AuthorizationGate for AlwaysAuthorized {
    fn may_control_volume(&self) -> bool {
        true
    }
}
