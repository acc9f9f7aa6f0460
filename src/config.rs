use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use toml_edit::DocumentMut;
use tracing::warn;

use crate::cli::Args;
use crate::color::{ColorScheme, RgbColor};
use crate::display::DisplayMode;
use crate::geometry::GridSize;
use crate::level::RenderStyle;
use crate::sensor::Axis;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub level: LevelConfig,
    #[serde(default)]
    pub sensor: SensorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub mode: DisplayMode,
    pub columns: usize,
    pub rows: usize,
    /// How often the orientation sensor is read
    pub poll_interval_ms: u64,
    /// How long a pattern sent over the socket stays up
    pub pattern_hold_secs: u64,
    pub ipc: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Terminal,
            columns: 8,
            rows: 8,
            poll_interval_ms: 100,
            pattern_hold_secs: 5,
            ipc: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub axis: Axis,
    pub invert_rotation: bool,
    pub style: RenderStyle,
    pub color_scheme: ColorScheme,
    pub line_color: RgbColor,
    pub background_color: RgbColor,
    /// Reading (degrees) treated as level; updated by the "zero" action
    pub reference_offset: f64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            axis: Axis::Pitch,
            invert_rotation: false,
            style: RenderStyle::Line,
            color_scheme: ColorScheme::Solid,
            line_color: RgbColor::RED,
            background_color: RgbColor::BLACK,
            reference_offset: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Simulated sweep speed in degrees per second (0 = only manual nudges)
    pub sweep_speed: f64,
    pub sweep_axes: Vec<Axis>,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            sweep_speed: 20.0,
            sweep_axes: vec![Axis::Pitch],
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Get the default XDG config path (~/.config/senseline/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("senseline").join("config.toml"))
    }

    /// Initialize default config file at XDG path, returns the path
    pub fn init_default_config() -> Result<PathBuf> {
        let path = Self::default_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, Self::generate_config_template())?;

        Ok(path)
    }

    pub fn grid(&self) -> Result<GridSize> {
        Ok(GridSize::new(self.display.columns, self.display.rows)?)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.display.poll_interval_ms.max(1))
    }

    pub fn pattern_hold(&self) -> Duration {
        Duration::from_secs(self.display.pattern_hold_secs)
    }

    /// Generate a commented TOML config template
    pub fn generate_config_template() -> String {
        r#"# senseline configuration
# This file is auto-generated. Edit as needed.

[display]
# Display mode: "terminal" or "headless"
mode = "terminal"
# Matrix size in cells (the Sense HAT is 8x8)
columns = 8
rows = 8
# Sensor poll interval in milliseconds
poll_interval_ms = 100
# Seconds a pattern received over the control socket stays on the matrix
pattern_hold_secs = 5
# Listen for commands on the control socket
ipc = true

[level]
# Orientation axis driving the line: "pitch", "roll" or "yaw"
# Pick the one that makes the line turn with the board as it is mounted
axis = "pitch"
# Set to true if the line turns the opposite way to the board
invert_rotation = false
# Render style: "line" or "horizon" (line plus filled area below it)
style = "line"
# Color scheme: "solid", "rainbow", "tilt"
color_scheme = "solid"
line_color = { r = 255, g = 0, b = 0 }
background_color = { r = 0, g = 0, b = 0 }
# Reading treated as level. The "zero" command stores the current reading here.
reference_offset = 0.0

[sensor]
# Simulated sensor sweep in degrees per second (0 = only manual nudges)
sweep_speed = 20.0
sweep_axes = ["pitch"]
"#
        .to_string()
    }

    /// Merge CLI arguments into config (CLI takes priority)
    pub fn merge_args(&mut self, args: &Args) {
        if let Some(mode) = args.mode {
            self.display.mode = mode;
        }
        if let Some(columns) = args.columns {
            self.display.columns = columns;
        }
        if let Some(rows) = args.rows {
            self.display.rows = rows;
        }
        if let Some(interval) = args.poll_interval {
            self.display.poll_interval_ms = interval;
        }
        if args.no_ipc {
            self.display.ipc = false;
        }

        if let Some(axis) = args.axis {
            self.level.axis = axis;
        }
        if args.invert {
            self.level.invert_rotation = true;
        }
        if let Some(style) = args.style {
            self.level.style = style;
        }
        if let Some(ref colors) = args.colors {
            match colors.parse() {
                Ok(scheme) => self.level.color_scheme = scheme,
                Err(e) => warn!("{}", e),
            }
        }
        if let Some(ref color) = args.line_color {
            match RgbColor::from_hex(color) {
                Some(color) => self.level.line_color = color,
                None => warn!("Ignoring invalid line color '{}'", color),
            }
        }

        if let Some(speed) = args.sweep_speed {
            self.sensor.sweep_speed = speed;
        }
    }
}

/// Store a new reference offset in the config file, keeping its comments and
/// layout intact.
pub fn persist_reference_offset(path: &Path, offset: f64) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let mut doc: DocumentMut = content
        .parse()
        .with_context(|| format!("Failed to parse config {}", path.display()))?;

    if !doc.contains_key("level") {
        doc["level"] = toml_edit::table();
    }
    doc["level"]["reference_offset"] = toml_edit::value(offset);

    std::fs::write(path, doc.to_string())
        .with_context(|| format!("Failed to write config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("senseline-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn template_matches_defaults() {
        let config: Config = toml::from_str(&Config::generate_config_template()).unwrap();
        let defaults = Config::default();
        assert_eq!(config.display.columns, defaults.display.columns);
        assert_eq!(config.display.poll_interval_ms, defaults.display.poll_interval_ms);
        assert_eq!(config.level.axis, defaults.level.axis);
        assert_eq!(config.level.line_color, defaults.level.line_color);
        assert_eq!(config.level.style, defaults.level.style);
        assert_eq!(config.sensor.sweep_axes, defaults.sensor.sweep_axes);
        assert_eq!(config.grid().unwrap(), GridSize::SENSE_HAT);
    }

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [level]
            axis = "roll"
            style = "horizon"
            "#,
        )
        .unwrap();
        assert_eq!(config.level.axis, Axis::Roll);
        assert_eq!(config.level.style, RenderStyle::Horizon);
        assert_eq!(config.level.color_scheme, ColorScheme::Solid);
        assert_eq!(config.display.rows, 8);
        assert!(config.display.ipc);
    }

    #[test]
    fn zero_sized_grid_is_an_error() {
        let mut config = Config::default();
        config.display.columns = 0;
        assert!(config.grid().is_err());
    }

    #[test]
    fn cli_overrides_file_values() {
        let mut config = Config::default();
        let args = Args {
            columns: Some(16),
            axis: Some(Axis::Yaw),
            invert: true,
            colors: Some("tilt".into()),
            line_color: Some("#00FF00".into()),
            no_ipc: true,
            ..Args::default()
        };
        config.merge_args(&args);
        assert_eq!(config.display.columns, 16);
        assert_eq!(config.display.rows, 8);
        assert_eq!(config.level.axis, Axis::Yaw);
        assert!(config.level.invert_rotation);
        assert_eq!(config.level.color_scheme, ColorScheme::Tilt);
        assert_eq!(config.level.line_color, RgbColor::new(0, 255, 0));
        assert!(!config.display.ipc);
    }

    #[test]
    fn invalid_cli_values_keep_the_file_values() {
        let mut config = Config::default();
        let args = Args {
            colors: Some("plaid".into()),
            line_color: Some("red".into()),
            ..Args::default()
        };
        config.merge_args(&args);
        assert_eq!(config.level.color_scheme, ColorScheme::Solid);
        assert_eq!(config.level.line_color, RgbColor::RED);
    }

    #[test]
    fn reference_offset_is_persisted_with_comments() {
        let path = scratch_file("persist.toml", &Config::generate_config_template());
        persist_reference_offset(&path, 12.5).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("# Reading treated as level."));
        let config = Config::load(&path).unwrap();
        assert_eq!(config.level.reference_offset, 12.5);
        assert_eq!(config.level.axis, Axis::Pitch);
    }

    #[test]
    fn reference_offset_creates_the_level_table() {
        let path = scratch_file("bare.toml", "[display]\nrows = 8\n");
        persist_reference_offset(&path, -3.0).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.level.reference_offset, -3.0);
        assert_eq!(config.display.rows, 8);
    }
}
