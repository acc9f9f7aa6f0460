use anyhow::Result;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::color::ColorScheme;
use crate::config::{self, Config};
use crate::geometry::{GeometryError, GridSize};
use crate::level::{LevelDisplay, RenderStyle};
use crate::matrix::{Frame, Pattern, PatternError};
use crate::sensor::{Axis, Orientation, SimulatedSensor};

/// Everything a running display needs between frames: the level state, a
/// handle on the simulated sensor, and any pattern temporarily shown in
/// place of the line.
///
/// Actions only queue a frame; the caller commits it with [`Session::take_frame`].
pub struct Session {
    level: LevelDisplay,
    sensor: SimulatedSensor,
    axis: Axis,
    pattern_until: Option<Instant>,
    pattern_hold: Duration,
    config_path: Option<PathBuf>,
    pending: Option<Frame>,
    current: Frame,
}

impl Session {
    pub fn new(config: &Config, config_path: Option<PathBuf>, sensor: SimulatedSensor) -> Result<Self> {
        let grid = config.grid()?;
        let level = LevelDisplay::from_config(grid, &config.level);
        let current = Frame::new(grid, config.level.background_color);

        let mut session = Self {
            level,
            sensor,
            axis: config.level.axis,
            pattern_until: None,
            pattern_hold: config.pattern_hold(),
            config_path,
            pending: None,
            current,
        };
        session.refresh()?;
        Ok(session)
    }

    pub fn grid(&self) -> GridSize {
        self.level.grid()
    }

    /// The frame most recently handed out by `take_frame`.
    pub fn current(&self) -> &Frame {
        &self.current
    }

    pub fn take_frame(&mut self) -> Option<Frame> {
        let frame = self.pending.take()?;
        self.current = frame.clone();
        Some(frame)
    }

    fn pattern_active(&self, now: Instant) -> bool {
        self.pattern_until.is_some_and(|until| now < until)
    }

    pub fn on_reading(&mut self, orientation: Orientation, now: Instant) -> Result<(), GeometryError> {
        let frame = self.level.observe(orientation.get(self.axis))?;
        if self.pattern_active(now) {
            // redraw once the pattern expires
            self.level.invalidate();
            return Ok(());
        }
        if let Some(frame) = frame {
            debug!("Redraw at {:.1}°", orientation.get(self.axis));
            self.pending = Some(frame);
        }
        Ok(())
    }

    /// Expire a held pattern.
    pub fn tick(&mut self, now: Instant) -> Result<(), GeometryError> {
        if self.pattern_until.is_some() && !self.pattern_active(now) {
            debug!("Pattern hold expired");
            self.pattern_until = None;
            self.refresh()?;
        }
        Ok(())
    }

    /// Queue a redraw of the line for the last reading.
    fn refresh(&mut self) -> Result<(), GeometryError> {
        self.level.invalidate();
        if self.pattern_until.is_some() {
            return Ok(());
        }
        self.pending = match self.level.last_observed() {
            Some(reading) => self.level.observe(reading)?,
            None => Some(self.level.render(self.level.display_angle(0.0))?),
        };
        Ok(())
    }

    /// Treat the current reading as level, and remember it in the config file.
    pub fn zero(&mut self) -> Result<Option<f64>, GeometryError> {
        let reference = self.level.reset_reference();
        if let Some(offset) = reference {
            info!("Zeroed at {:.1}°", offset);
            if let Some(path) = &self.config_path {
                if let Err(e) = config::persist_reference_offset(path, offset) {
                    warn!("Could not save reference offset: {:#}", e);
                }
            }
        }
        self.refresh()?;
        Ok(reference)
    }

    pub fn next_style(&mut self) -> Result<RenderStyle, GeometryError> {
        let style = self.level.style().next();
        self.level.set_style(style);
        self.refresh()?;
        Ok(style)
    }

    pub fn next_color_scheme(&mut self) -> Result<ColorScheme, GeometryError> {
        let scheme = self.level.color_scheme().next();
        self.level.set_color_scheme(scheme);
        self.refresh()?;
        Ok(scheme)
    }

    /// Turn the simulated board by `degrees` on the driving axis.
    pub fn nudge(&self, degrees: f64) -> Result<()> {
        self.sensor.nudge(self.axis, degrees)
    }

    pub fn toggle_pause(&self) -> Result<bool> {
        self.sensor.toggle_pause()
    }

    /// Show a validated pattern instead of the line for the configured hold time.
    pub fn show_pattern(&mut self, pattern: &Pattern, now: Instant) -> Result<(), PatternError> {
        let frame = Frame::from_pattern(self.grid(), pattern)?;
        self.pattern_until = Some(now + self.pattern_hold);
        self.pending = Some(frame);
        Ok(())
    }

    pub fn status(&self) -> String {
        let reading = self
            .level
            .last_observed()
            .map(|r| format!("{:.1}", r))
            .unwrap_or_else(|| "none".to_string());
        let shown = self
            .level
            .last_observed()
            .map(|r| format!("{:.1}", self.level.display_angle(r)))
            .unwrap_or_else(|| "none".to_string());
        format!(
            "axis={:?} reading={} angle={} reference={:.1} style={} color={} pattern={} paused={}",
            self.axis,
            reading,
            shown,
            self.level.reference(),
            self.level.style(),
            self.level.color_scheme(),
            self.pattern_until.is_some(),
            self.sensor.is_paused(),
        )
        .to_lowercase()
    }
}
