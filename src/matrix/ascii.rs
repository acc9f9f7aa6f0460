use anyhow::{Context, Result};
use std::io::Write;

use super::{Frame, MatrixSurface};
use crate::geometry::GridSize;

/// Writes each committed frame as text, `#` for lit cells and `.` for dark ones.
pub struct AsciiSurface<W: Write> {
    out: W,
    size: GridSize,
    frames: usize,
}

impl<W: Write> AsciiSurface<W> {
    pub fn new(out: W, size: GridSize) -> Self {
        Self { out, size, frames: 0 }
    }

    /// Number of frames committed so far.
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

pub fn render_ascii(frame: &Frame) -> String {
    let background = frame.background();
    let mut text = String::with_capacity((frame.size().columns + 1) * frame.size().rows);
    for row in frame.rows() {
        text.extend(row.iter().map(|&c| if c == background { '.' } else { '#' }));
        text.push('\n');
    }
    text
}

impl<W: Write> MatrixSurface for AsciiSurface<W> {
    fn commit(&mut self, frame: &Frame) -> Result<()> {
        if frame.size() != self.size {
            anyhow::bail!(
                "frame is {}x{}, surface is {}x{}",
                frame.size().columns,
                frame.size().rows,
                self.size.columns,
                self.size.rows
            );
        }
        writeln!(self.out, "{}", render_ascii(frame)).context("Failed to write frame")?;
        self.out.flush()?;
        self.frames += 1;
        Ok(())
    }

    fn size(&self) -> GridSize {
        self.size
    }
}
