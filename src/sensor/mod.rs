mod simulated;

pub use simulated::SimulatedSensor;

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Orientation of the board in degrees, as reported by the IMU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,
}

impl Orientation {
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Pitch => self.pitch,
            Axis::Roll => self.roll,
            Axis::Yaw => self.yaw,
        }
    }

    pub fn get_mut(&mut self, axis: Axis) -> &mut f64 {
        match axis {
            Axis::Pitch => &mut self.pitch,
            Axis::Roll => &mut self.roll,
            Axis::Yaw => &mut self.yaw,
        }
    }
}

/// Which rotation drives the display. Depends on how the board is mounted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    Pitch,
    Roll,
    Yaw,
}

/// Source of orientation readings.
pub trait OrientationSensor: Send {
    fn read(&mut self) -> Result<Orientation>;
}

/// Polls a sensor on a fixed cadence and publishes readings to every
/// subscriber.
///
/// Polling starts with the first subscriber and stops once every receiver
/// has been dropped; the next `subscribe` starts it again.
pub struct SensorFeed {
    sender: Arc<watch::Sender<Orientation>>,
    sensor: Arc<Mutex<Box<dyn OrientationSensor>>>,
    interval: Duration,
    polling: Arc<AtomicBool>,
}

impl SensorFeed {
    pub fn new(sensor: impl OrientationSensor + 'static, interval: Duration) -> Self {
        let (sender, _) = watch::channel(Orientation::default());
        Self {
            sender: Arc::new(sender),
            sensor: Arc::new(Mutex::new(Box::new(sensor))),
            interval,
            polling: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register a subscriber, starting the poller if it is idle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe(&self) -> watch::Receiver<Orientation> {
        let receiver = self.sender.subscribe();

        if !self.polling.swap(true, Ordering::SeqCst) {
            info!("Starting sensor polling every {:?}", self.interval);
            tokio::spawn(poll_loop(
                self.sender.clone(),
                self.sensor.clone(),
                self.interval,
                self.polling.clone(),
            ));
        }

        receiver
    }

    pub fn is_polling(&self) -> bool {
        self.polling.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

async fn poll_loop(
    sender: Arc<watch::Sender<Orientation>>,
    sensor: Arc<Mutex<Box<dyn OrientationSensor>>>,
    interval: Duration,
    polling: Arc<AtomicBool>,
) {
    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;

        if sender.receiver_count() == 0 {
            polling.store(false, Ordering::SeqCst);
            // a subscriber that arrived after the check either restarted
            // polling itself or is now served by this task
            if sender.receiver_count() == 0 || polling.swap(true, Ordering::SeqCst) {
                debug!("No subscribers left, sensor polling stopped");
                break;
            }
        }

        let reading = sensor
            .lock()
            .map_err(|_| anyhow!("sensor lock poisoned"))
            .and_then(|mut sensor| sensor.read());

        match reading {
            Ok(orientation) => {
                sender.send_replace(orientation);
            }
            Err(e) => warn!("Sensor read failed: {}", e),
        }
    }
}
