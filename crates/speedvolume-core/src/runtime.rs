//! Control loop task
//!
//! One tokio task owns the [`SpeedVolumeController`]. Commands from any
//! number of [`ControllerHandle`] clones and the periodic tick are both
//! processed on that task, so bound edits and evaluations never overlap and
//! the bounds need no lock.
//!
//! The tick interval only exists while running. `stop` drops it before it
//! replies, so no evaluation happens after `stop().await` returns.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Interval, MissedTickBehavior};

use crate::bounds::BoundsEdit;
use crate::controller::{ControllerSnapshot, RunState, SpeedVolumeController};
use crate::error::ControlError;
use crate::mode::Mode;

type Reply<T> = oneshot::Sender<T>;

enum Command {
    Start(Reply<Result<(), ControlError>>),
    Stop(Reply<()>),
    Toggle(Reply<Result<RunState, ControlError>>),
    SetMode(Mode, Reply<()>),
    SetMinVolume(u32, Reply<BoundsEdit>),
    SetMaxVolume(u32, Reply<BoundsEdit>),
    Snapshot(Reply<ControllerSnapshot>),
    Shutdown,
}

/// Cloneable front door to a running [`ControlLoop`]
#[derive(Clone, Debug)]
pub struct ControllerHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl ControllerHandle {
    /// Start the loop. Returns the subscribe failure, if any.
    pub async fn start(&self) -> Result<(), ControlError> {
        self.request(Command::Start).await?
    }

    /// Stop the loop and return the volume to the floor
    pub async fn stop(&self) -> Result<(), ControlError> {
        self.request(Command::Stop).await
    }

    /// Start when stopped, stop when running. Returns the resulting state.
    ///
    /// The state is checked and flipped on the loop task, so concurrent
    /// toggles from several handles alternate instead of racing.
    pub async fn toggle(&self) -> Result<RunState, ControlError> {
        self.request(Command::Toggle).await?
    }

    /// Select a mode
    pub async fn set_mode(&self, mode: Mode) -> Result<(), ControlError> {
        self.request(|reply| Command::SetMode(mode, reply)).await
    }

    /// Edit the volume floor
    pub async fn set_min_volume(&self, level: u32) -> Result<BoundsEdit, ControlError> {
        self.request(|reply| Command::SetMinVolume(level, reply)).await
    }

    /// Edit the volume ceiling
    pub async fn set_max_volume(&self, level: u32) -> Result<BoundsEdit, ControlError> {
        self.request(|reply| Command::SetMaxVolume(level, reply)).await
    }

    /// Current status
    pub async fn snapshot(&self) -> Result<ControllerSnapshot, ControlError> {
        self.request(Command::Snapshot).await
    }

    /// Stop the controller and end the task
    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, ControlError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(build(tx))
            .map_err(|_| ControlError::LoopClosed)?;
        rx.await.map_err(|_| ControlError::LoopClosed)
    }
}

/// Drives a [`SpeedVolumeController`] on a dedicated task
pub struct ControlLoop {
    controller: SpeedVolumeController,
    commands: mpsc::UnboundedReceiver<Command>,
    ticker: Option<Interval>,
}

impl ControlLoop {
    /// Spawn the loop on the current tokio runtime.
    ///
    /// The sink is set to the floor once before any command is processed.
    /// The task ends after [`ControllerHandle::shutdown`] or once every
    /// handle has been dropped, stopping the controller on the way out.
    pub fn spawn(controller: SpeedVolumeController) -> (ControllerHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let control_loop = ControlLoop {
            controller,
            commands: rx,
            ticker: None,
        };
        let task = tokio::spawn(control_loop.run());
        (ControllerHandle { commands: tx }, task)
    }

    async fn run(mut self) {
        self.controller.apply_floor();

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
                _ = next_tick(&mut self.ticker) => {
                    self.controller.tick();
                }
            }
        }

        self.stop();
        tracing::debug!("control loop exited");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Start(reply) => {
                let _ = reply.send(self.start());
            }
            Command::Stop(reply) => {
                self.stop();
                let _ = reply.send(());
            }
            Command::Toggle(reply) => {
                let result = if self.controller.is_running() {
                    self.stop();
                    Ok(())
                } else {
                    self.start()
                };
                let _ = reply.send(result.map(|()| self.controller.state()));
            }
            Command::SetMode(mode, reply) => {
                self.controller.set_mode(mode);
                let _ = reply.send(());
            }
            Command::SetMinVolume(level, reply) => {
                let _ = reply.send(self.controller.set_min_volume(level));
            }
            Command::SetMaxVolume(level, reply) => {
                let _ = reply.send(self.controller.set_max_volume(level));
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.controller.snapshot());
            }
            Command::Shutdown => {}
        }
    }

    fn start(&mut self) -> Result<(), ControlError> {
        self.controller.start()?;
        if self.ticker.is_none() {
            let mut ticker = time::interval(self.controller.tick_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.ticker = Some(ticker);
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.ticker = None;
        self.controller.stop();
    }
}

/// Resolves on the next tick, or never when no ticker is armed
async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
