mod ascii;
mod pattern;

pub use ascii::AsciiSurface;
pub use pattern::{Pattern, PatternError};

use anyhow::Result;

use crate::color::RgbColor;
use crate::geometry::{GridSize, Pixel};

/// Full contents of the LED matrix, built off-screen and committed in one go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    size: GridSize,
    background: RgbColor,
    cells: Vec<RgbColor>,
}

impl Frame {
    pub fn new(size: GridSize, background: RgbColor) -> Self {
        Self {
            size,
            background,
            cells: vec![background; size.cell_count()],
        }
    }

    /// Build a frame from a pattern, rejecting patterns of the wrong shape.
    pub fn from_pattern(size: GridSize, pattern: &Pattern) -> Result<Self, PatternError> {
        pattern.validate(size)?;
        let mut frame = Self::new(size, RgbColor::BLACK);
        for (y, row) in pattern.matrix.iter().enumerate() {
            for (x, &color) in row.iter().enumerate() {
                frame.cells[y * size.columns + x] = color.into();
            }
        }
        Ok(frame)
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn background(&self) -> RgbColor {
        self.background
    }

    /// Set a single cell; writes outside the grid are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, color: RgbColor) {
        if x < self.size.columns && y < self.size.rows {
            self.cells[y * self.size.columns + x] = color;
        }
    }

    pub fn set_pixel(&mut self, pixel: Pixel, color: RgbColor) {
        self.set(pixel.x, pixel.y, color);
    }

    pub fn get(&self, x: usize, y: usize) -> Option<RgbColor> {
        if x < self.size.columns && y < self.size.rows {
            Some(self.cells[y * self.size.columns + x])
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.fill(self.background);
    }

    pub fn fill(&mut self, color: RgbColor) {
        self.cells.iter_mut().for_each(|c| *c = color);
    }

    /// Cells that differ from the background.
    pub fn lit_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != self.background).count()
    }

    pub fn is_lit(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_some_and(|c| c != self.background)
    }

    /// Row-major cells, the order LED drivers expect.
    pub fn cells(&self) -> &[RgbColor] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[RgbColor]> {
        self.cells.chunks(self.size.columns)
    }
}

/// Anything that can show a frame: hardware, a terminal, a log.
pub trait MatrixSurface {
    /// Replace everything on the surface with `frame`.
    fn commit(&mut self, frame: &Frame) -> Result<()>;

    fn size(&self) -> GridSize;
}
