use anyhow::{anyhow, Result};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::{Axis, Orientation, OrientationSensor};

struct SimState {
    orientation: Orientation,
    sweep_speed: f64,
    sweep_axes: Vec<Axis>,
    paused: bool,
    last_read: Option<Instant>,
}

/// A stand-in IMU: sweeps the chosen axes at a fixed speed and can be nudged
/// by hand. Clones share the same state, so one clone can be handed to the
/// sensor feed while another takes keyboard or socket input.
#[derive(Clone)]
pub struct SimulatedSensor {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedSensor {
    /// `sweep_speed` is in degrees per second and may be negative or zero.
    pub fn new(sweep_speed: f64, sweep_axes: Vec<Axis>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                orientation: Orientation::default(),
                sweep_speed,
                sweep_axes,
                paused: false,
                last_read: None,
            })),
        }
    }

    /// A sensor that only moves when nudged.
    pub fn still() -> Self {
        Self::new(0.0, Vec::new())
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut SimState) -> T) -> Result<T> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow!("simulated sensor lock poisoned"))?;
        Ok(f(&mut *state))
    }

    /// Rotate one axis by `degrees`.
    pub fn nudge(&self, axis: Axis, degrees: f64) -> Result<()> {
        self.with_state(|s| {
            let value = s.orientation.get_mut(axis);
            *value = (*value + degrees).rem_euclid(360.0);
        })
    }

    /// Toggle the automatic sweep; returns whether it is now paused.
    pub fn toggle_pause(&self) -> Result<bool> {
        self.with_state(|s| {
            s.paused = !s.paused;
            s.paused
        })
    }

    pub fn is_paused(&self) -> bool {
        self.with_state(|s| s.paused).unwrap_or(false)
    }
}

impl OrientationSensor for SimulatedSensor {
    fn read(&mut self) -> Result<Orientation> {
        self.with_state(|s| {
            let now = Instant::now();
            let elapsed = s
                .last_read
                .map(|t| now.duration_since(t).as_secs_f64())
                .unwrap_or(0.0);
            s.last_read = Some(now);

            if !s.paused && s.sweep_speed != 0.0 {
                let step = s.sweep_speed * elapsed;
                for &axis in &s.sweep_axes {
                    let value = s.orientation.get_mut(axis);
                    *value = (*value + step).rem_euclid(360.0);
                }
            }

            s.orientation
        })
    }
}
