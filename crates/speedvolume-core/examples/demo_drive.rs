//! Runs the control loop against a simulated drive and prints the status.
//!
//! ```text
//! RUST_LOG=speedvolume_core=debug cargo run --example demo_drive -- [config.json] [seconds]
//! ```

use std::time::Duration;

use speedvolume_core::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => ControllerConfig::load(&path)?,
        None => ControllerConfig::default(),
    };
    let seconds: u64 = args.next().map(|s| s.parse::<u64>()).transpose()?.unwrap_or(60);

    println!("{}", config.mode.description());

    let sink = MemoryVolumeSink::new(config.limits.device_max_volume);
    let controller = SpeedVolumeController::new(
        &config,
        Box::new(DemoSpeedSource::new()),
        Box::new(sink.clone()),
        Box::new(AlwaysAuthorized),
    )?;
    let (handle, task) = ControlLoop::spawn(controller);

    handle.start().await?;

    let mut status = tokio::time::interval(Duration::from_secs(1));
    for _ in 0..seconds {
        status.tick().await;
        let snapshot = handle.snapshot().await?;
        println!(
            "Speed: {:.1} km/h | Current Volume: {} | {}",
            snapshot.speed_kmh,
            snapshot
                .reported_volume
                .map(|v| v.to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            snapshot.provider_status,
        );
    }

    handle.stop().await?;
    handle.shutdown();
    task.await?;
    println!("Stopped, volume back at {}", sink.level());
    Ok(())
}
