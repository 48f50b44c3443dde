//! Test doubles shared by the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use speedvolume_core::prelude::*;

#[derive(Default)]
struct SourceState {
    sender: Option<SampleSender>,
    status: Option<ProviderStatus>,
    deny: bool,
    subscribes: usize,
    unsubscribes: usize,
}

/// Speed source driven by the test. Clones share state.
#[derive(Clone, Default)]
pub struct ManualSource {
    state: Arc<Mutex<SourceState>>,
}

impl ManualSource {
    pub fn new() -> Self {
        let source = Self::default();
        source.set_status(ProviderStatus::Precise);
        source
    }

    /// Fail the next subscribe with a permission error
    pub fn deny(&self) {
        self.state.lock().unwrap().deny = true;
    }

    pub fn set_status(&self, status: ProviderStatus) {
        self.state.lock().unwrap().status = Some(status);
    }

    /// Push a km/h sample. Returns false when nobody is subscribed.
    pub fn push(&self, speed_kmh: f64) -> bool {
        let state = self.state.lock().unwrap();
        match &state.sender {
            Some(sender) => sender.send(SpeedSample::now(speed_kmh)).is_ok(),
            None => false,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.state.lock().unwrap().sender.is_some()
    }

    pub fn subscribes(&self) -> usize {
        self.state.lock().unwrap().subscribes
    }

    pub fn unsubscribes(&self) -> usize {
        self.state.lock().unwrap().unsubscribes
    }
}

impl SpeedSource for ManualSource {
    fn subscribe(&mut self, samples: SampleSender) -> Result<(), SpeedSourceError> {
        let mut state = self.state.lock().unwrap();
        if state.deny {
            return Err(SpeedSourceError::PermissionDenied(
                "ACCESS_FINE_LOCATION".to_string(),
            ));
        }
        state.sender = Some(samples);
        state.subscribes += 1;
        Ok(())
    }

    fn unsubscribe(&mut self) {
        let mut state = self.state.lock().unwrap();
        if state.sender.take().is_some() {
            state.unsubscribes += 1;
        }
    }

    fn status(&self) -> ProviderStatus {
        self.state.lock().unwrap().status.unwrap_or_default()
    }
}

/// Authorization gate the test can flip
#[derive(Clone)]
pub struct SwitchGate(Arc<AtomicBool>);

impl SwitchGate {
    pub fn granted() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn denied() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn set(&self, granted: bool) {
        self.0.store(granted, Ordering::SeqCst);
    }
}

impl AuthorizationGate for SwitchGate {
    fn may_control_volume(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Controller wired to test doubles
pub struct Rig {
    pub controller: SpeedVolumeController,
    pub source: ManualSource,
    pub sink: MemoryVolumeSink,
    pub gate: SwitchGate,
}

pub fn rig() -> Rig {
    rig_with(ControllerConfig::default())
}

pub fn rig_with(config: ControllerConfig) -> Rig {
    try_rig_with(config).unwrap()
}

pub fn try_rig_with(config: ControllerConfig) -> Result<Rig, ConfigError> {
    let source = ManualSource::new();
    let sink = MemoryVolumeSink::new(config.limits.device_max_volume);
    let gate = SwitchGate::granted();
    let controller = SpeedVolumeController::new(
        &config,
        Box::new(source.clone()),
        Box::new(sink.clone()),
        Box::new(gate.clone()),
    )?;
    Ok(Rig {
        controller,
        source,
        sink,
        gate,
    })
}
