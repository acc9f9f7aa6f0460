use clap::Parser;
use std::path::PathBuf;

use crate::display::DisplayMode;
use crate::level::RenderStyle;
use crate::sensor::Axis;

#[derive(Parser, Debug, Default)]
#[command(name = "senseline")]
#[command(author, version, about = "Tilt-driven line display for LED matrices")]
pub struct Args {
    /// Display mode: terminal or headless
    #[arg(short, long)]
    pub mode: Option<DisplayMode>,

    /// Config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write a commented default config to the config directory and exit
    #[arg(long)]
    pub init_config: bool,

    /// Send a command to a running instance (e.g. "zero", "status") and exit
    #[arg(long, value_name = "COMMAND")]
    pub send: Option<String>,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<clap_complete::Shell>,

    /// Matrix width in cells
    #[arg(long)]
    pub columns: Option<usize>,

    /// Matrix height in cells
    #[arg(long)]
    pub rows: Option<usize>,

    /// Orientation axis that drives the line
    #[arg(short, long)]
    pub axis: Option<Axis>,

    /// Rotate the line opposite to the board
    #[arg(long)]
    pub invert: bool,

    /// Render style: line or horizon
    #[arg(short, long)]
    pub style: Option<RenderStyle>,

    /// Color scheme: solid, rainbow, tilt
    #[arg(long)]
    pub colors: Option<String>,

    /// Line color for the solid scheme, as hex (e.g. "#FF0000")
    #[arg(long)]
    pub line_color: Option<String>,

    /// Simulated sweep speed in degrees per second
    #[arg(long)]
    pub sweep_speed: Option<f64>,

    /// Sensor poll interval in milliseconds
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Headless mode: stop after this many frames
    #[arg(long)]
    pub frames: Option<usize>,

    /// Don't listen on the control socket
    #[arg(long)]
    pub no_ipc: bool,
}
