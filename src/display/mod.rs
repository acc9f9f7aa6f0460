pub mod headless;
pub mod terminal;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Interactive matrix simulator in the terminal
    #[default]
    Terminal,
    /// Plain-text frames on stdout, one per change
    Headless,
}
