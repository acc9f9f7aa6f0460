use std::collections::HashSet;

use super::line::offsets_with_reach;
use super::{push_unique, GeometryError, GridSize, NormalizedAngle, Pixel, PixelOffset};

/// A spirit-level rendering: the tilted line plus the "water" below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Horizon {
    pub line: Vec<Pixel>,
    /// Cells below the line, excluding the line itself.
    pub water: Vec<Pixel>,
}

/// Unit step pointing away from the line toward "down" (screen +y at 0°).
///
/// The true normal is `(-sin a, cos a)`; it is snapped to whichever axis the
/// line is furthest from.
fn fill_direction(degrees: f64) -> (i32, i32) {
    let half_turn = degrees.rem_euclid(180.0);
    let full_turn = degrees.rem_euclid(360.0);

    if half_turn > 45.0 && half_turn < 135.0 {
        if full_turn < 180.0 {
            (-1, 0)
        } else {
            (1, 0)
        }
    } else if full_turn > 90.0 && full_turn < 270.0 {
        (0, -1)
    } else {
        (0, 1)
    }
}

pub fn horizon(angle: f64, grid: GridSize) -> Result<Horizon, GeometryError> {
    let normalized = NormalizedAngle::absolute(angle)?;

    let line: Vec<Pixel> = offsets_with_reach(&normalized, grid.reach())
        .into_iter()
        .filter_map(|o| grid.locate(o))
        .collect();

    // the fill sources run past the edges so every column (or row) gets water,
    // including on non-square grids
    let long_reach = (grid.columns.max(grid.rows) / 2) as i32 + 1;
    let sources = offsets_with_reach(&normalized, long_reach);
    let (step_x, step_y) = fill_direction(normalized.degrees);
    let span = grid.columns.max(grid.rows) as i32;

    // line cells start out "seen" so water never covers them
    let mut seen: HashSet<Pixel> = line.iter().copied().collect();
    let mut water = Vec::new();
    for source in sources {
        for distance in 1..=span {
            let offset = PixelOffset::new(source.dx + step_x * distance, source.dy + step_y * distance);
            if let Some(pixel) = grid.locate(offset) {
                push_unique(&mut water, &mut seen, pixel);
            }
        }
    }

    Ok(Horizon { line, water })
}
