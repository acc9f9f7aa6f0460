//! Tilt-driven line and horizon rendering for small LED matrices.
//!
//! [`geometry`] holds the rasterizer ([`geometry::rasterize_line`] and
//! friends); everything else wires it to a sensor, a config file and a
//! display.

pub mod cli;
pub mod color;
pub mod config;
pub mod display;
pub mod geometry;
pub mod ipc;
pub mod level;
pub mod matrix;
pub mod sensor;
pub mod session;
