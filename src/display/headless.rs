use anyhow::Result;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::info;

use crate::config::Config;
use crate::ipc::{self, IpcCommand};
use crate::matrix::{AsciiSurface, MatrixSurface};
use crate::sensor::{SensorFeed, SimulatedSensor};
use crate::session::Session;

/// Headless mode: every changed frame is written to stdout as text.
///
/// Runs until Ctrl-C, or until `frame_limit` frames have been written.
pub async fn run(
    config: Config,
    config_path: Option<PathBuf>,
    ipc_rx: mpsc::Receiver<IpcCommand>,
    frame_limit: Option<usize>,
) -> Result<()> {
    let grid = config.grid()?;
    info!("Headless mode, {}x{} matrix", grid.columns, grid.rows);

    let surface = AsciiSurface::new(io::stdout(), grid);
    run_with_surface(config, config_path, ipc_rx, frame_limit, surface).await?;
    Ok(())
}

pub(crate) async fn run_with_surface<W: Write>(
    config: Config,
    config_path: Option<PathBuf>,
    mut ipc_rx: mpsc::Receiver<IpcCommand>,
    frame_limit: Option<usize>,
    mut surface: AsciiSurface<W>,
) -> Result<AsciiSurface<W>> {
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        shutdown_tx.send(true).ok();
    });

    let sensor = SimulatedSensor::new(config.sensor.sweep_speed, config.sensor.sweep_axes.clone());
    let feed = SensorFeed::new(sensor.clone(), config.poll_interval());
    let mut readings = feed.subscribe();
    let mut session = Session::new(&config, config_path, sensor)?;

    let tick = config.poll_interval();

    loop {
        if *shutdown_rx.borrow() {
            info!("Interrupted, stopping");
            break;
        }

        while let Ok(cmd) = ipc_rx.try_recv() {
            ipc::process_ipc_command(cmd, &mut session);
        }

        let now = Instant::now();
        if readings.has_changed().unwrap_or(false) {
            let orientation = *readings.borrow_and_update();
            session.on_reading(orientation, now)?;
        }
        session.tick(now)?;

        if let Some(frame) = session.take_frame() {
            surface.commit(&frame)?;
            if frame_limit.is_some_and(|limit| surface.frames() >= limit) {
                break;
            }
        }

        tokio::time::sleep(tick.min(Duration::from_millis(50))).await;
    }

    Ok(surface)
}
