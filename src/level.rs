use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::color::{lerp_color, ColorScheme, RgbColor};
use crate::config::LevelConfig;
use crate::geometry::{self, GeometryError, GridSize};
use crate::matrix::Frame;

/// How much of the line color the horizon fill keeps.
const WATER_BRIGHTNESS: f32 = 0.35;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    /// Just the tilted line
    #[default]
    Line,
    /// The line with everything below it filled, like a spirit level
    Horizon,
}

impl RenderStyle {
    pub fn next(self) -> Self {
        match self {
            RenderStyle::Line => RenderStyle::Horizon,
            RenderStyle::Horizon => RenderStyle::Line,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RenderStyle::Line => "line",
            RenderStyle::Horizon => "horizon",
        }
    }
}

impl fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Turns raw sensor angles into frames, redrawing only when the reading
/// actually changed.
#[derive(Debug, Clone)]
pub struct LevelDisplay {
    grid: GridSize,
    style: RenderStyle,
    color_scheme: ColorScheme,
    line_color: RgbColor,
    background: RgbColor,
    invert: bool,
    reference: f64,
    last_observed: Option<f64>,
    last_drawn: Option<f64>,
}

/// Readings are compared at 0.1° so sensor jitter doesn't cause redraws.
fn quantize(angle: f64) -> f64 {
    (angle * 10.0).round() / 10.0
}

impl LevelDisplay {
    pub fn new(grid: GridSize) -> Self {
        Self {
            grid,
            style: RenderStyle::default(),
            color_scheme: ColorScheme::default(),
            line_color: RgbColor::RED,
            background: RgbColor::BLACK,
            invert: false,
            reference: 0.0,
            last_observed: None,
            last_drawn: None,
        }
    }

    pub fn from_config(grid: GridSize, config: &LevelConfig) -> Self {
        Self {
            style: config.style,
            color_scheme: config.color_scheme,
            line_color: config.line_color,
            background: config.background_color,
            invert: config.invert_rotation,
            reference: config.reference_offset,
            ..Self::new(grid)
        }
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn style(&self) -> RenderStyle {
        self.style
    }

    pub fn set_style(&mut self, style: RenderStyle) {
        self.style = style;
        self.invalidate();
    }

    pub fn color_scheme(&self) -> ColorScheme {
        self.color_scheme
    }

    pub fn set_color_scheme(&mut self, scheme: ColorScheme) {
        self.color_scheme = scheme;
        self.invalidate();
    }

    pub fn reference(&self) -> f64 {
        self.reference
    }

    pub fn last_observed(&self) -> Option<f64> {
        self.last_observed
    }

    /// Force the next `observe` to produce a frame.
    pub fn invalidate(&mut self) {
        self.last_drawn = None;
    }

    /// Make the most recent reading the new "level" position.
    ///
    /// Returns the new reference, or `None` when nothing has been observed yet.
    pub fn reset_reference(&mut self) -> Option<f64> {
        let reading = self.last_observed?;
        self.reference = reading;
        self.invalidate();
        debug!("Reference reset to {:.1}°", reading);
        Some(reading)
    }

    /// The angle shown for a sensor reading. The reference is removed first,
    /// then the direction is flipped if the board is mounted inverted.
    pub fn display_angle(&self, reading: f64) -> f64 {
        let relative = reading - self.reference;
        if self.invert {
            -relative
        } else {
            relative
        }
    }

    /// Feed a raw reading; returns a frame only if it differs from the last
    /// drawn one.
    pub fn observe(&mut self, reading: f64) -> Result<Option<Frame>, GeometryError> {
        if !reading.is_finite() {
            return Err(GeometryError::NonFiniteAngle(reading));
        }

        let reading = quantize(reading);
        self.last_observed = Some(reading);

        if self.last_drawn == Some(reading) {
            return Ok(None);
        }

        let frame = self.render(self.display_angle(reading))?;
        self.last_drawn = Some(reading);
        Ok(Some(frame))
    }

    /// Draw the display for an already reference-adjusted angle.
    pub fn render(&self, angle: f64) -> Result<Frame, GeometryError> {
        let mut frame = Frame::new(self.grid, self.background);
        let color = self.color_scheme.line_color(angle, self.line_color);

        match self.style {
            RenderStyle::Line => {
                for pixel in geometry::rasterize_in(angle, self.grid)? {
                    frame.set_pixel(pixel, color);
                }
            }
            RenderStyle::Horizon => {
                let horizon = geometry::horizon(angle, self.grid)?;
                let water = lerp_color(self.background, color, WATER_BRIGHTNESS);
                for pixel in horizon.water {
                    frame.set_pixel(pixel, water);
                }
                for pixel in horizon.line {
                    frame.set_pixel(pixel, color);
                }
            }
        }

        Ok(frame)
    }
}
