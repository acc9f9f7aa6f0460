mod angle;
mod horizon;
mod line;

pub use angle::{continuous_tan, NormalizedAngle, Quadrant};
pub use horizon::{horizon, Horizon};
pub use line::{line_offsets, rasterize_in, rasterize_line};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::Hash;
use thiserror::Error;

/// Errors for inputs the rasterizer refuses to work with.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    #[error("angle must be finite, got {0}")]
    NonFiniteAngle(f64),
    #[error("grid must have at least one column and one row, got {columns}x{rows}")]
    EmptyGrid { columns: usize, rows: usize },
    #[error("grid sides are limited to {max} cells, got {columns}x{rows}")]
    GridTooLarge { columns: usize, rows: usize, max: usize },
}

/// Dimensions of the LED matrix. Origin is the top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub columns: usize,
    pub rows: usize,
}

impl GridSize {
    /// The 8x8 matrix found on the Sense HAT.
    pub const SENSE_HAT: GridSize = GridSize { columns: 8, rows: 8 };

    /// Largest side accepted by [`GridSize::new`]. Coordinates and terminal
    /// cells are `i32`/`u16`, so every side fits both.
    pub const MAX_SIDE: usize = u16::MAX as usize;

    pub fn new(columns: usize, rows: usize) -> Result<Self, GeometryError> {
        if columns == 0 || rows == 0 {
            return Err(GeometryError::EmptyGrid { columns, rows });
        }
        if columns > Self::MAX_SIDE || rows > Self::MAX_SIDE {
            return Err(GeometryError::GridTooLarge {
                columns,
                rows,
                max: Self::MAX_SIDE,
            });
        }
        Ok(Self { columns, rows })
    }

    /// Center cell, using floor division on both axes.
    pub fn center(&self) -> (i32, i32) {
        ((self.columns / 2) as i32, (self.rows / 2) as i32)
    }

    /// How far the driving coordinate is stepped from the center.
    pub fn reach(&self) -> i32 {
        (self.columns.min(self.rows) / 2) as i32
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.columns && (y as usize) < self.rows
    }

    pub fn cell_count(&self) -> usize {
        self.columns * self.rows
    }

    /// Translate a center-relative offset into a grid cell, if it lands inside.
    pub fn locate(&self, offset: PixelOffset) -> Option<Pixel> {
        let (cx, cy) = self.center();
        let (x, y) = (cx + offset.dx, cy + offset.dy);
        self.contains(x, y).then(|| Pixel {
            x: x as usize,
            y: y as usize,
        })
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::SENSE_HAT
    }
}

/// A point on the rasterized line, relative to the grid center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PixelOffset {
    pub dx: i32,
    pub dy: i32,
}

impl PixelOffset {
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Point reflection through the center.
    pub fn reflected(self) -> Self {
        Self::new(-self.dx, -self.dy)
    }
}

/// An absolute grid cell, always inside the grid it was produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pixel {
    pub x: usize,
    pub y: usize,
}

impl Pixel {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

pub(crate) fn ensure_finite(angle: f64) -> Result<f64, GeometryError> {
    if angle.is_finite() {
        Ok(angle)
    } else {
        Err(GeometryError::NonFiniteAngle(angle))
    }
}

/// Append `item` unless `seen` already holds it, keeping first-seen order.
pub(crate) fn push_unique<T: Copy + Eq + Hash>(items: &mut Vec<T>, seen: &mut HashSet<T>, item: T) {
    if seen.insert(item) {
        items.push(item);
    }
}
