use std::collections::HashSet;

use super::{push_unique, GeometryError, GridSize, NormalizedAngle, Pixel, PixelOffset};

/// Center-relative offsets of the line through the grid center at `angle`.
///
/// Offsets are not bounds-checked: on even grids the positive end reaches one
/// cell past the last row/column. Use [`rasterize_in`] for drawable cells.
pub fn line_offsets(angle: f64, grid: GridSize) -> Result<Vec<PixelOffset>, GeometryError> {
    let angle = NormalizedAngle::absolute(angle)?;
    Ok(offsets_with_reach(&angle, grid.reach()))
}

/// Absolute grid cells of the line through the center at `angle`, in degrees.
///
/// Cells falling outside `columns x rows` are dropped, never clamped.
pub fn rasterize_line(angle: f64, columns: usize, rows: usize) -> Result<Vec<Pixel>, GeometryError> {
    rasterize_in(angle, GridSize::new(columns, rows)?)
}

pub fn rasterize_in(angle: f64, grid: GridSize) -> Result<Vec<Pixel>, GeometryError> {
    let offsets = line_offsets(angle, grid)?;
    Ok(offsets.into_iter().filter_map(|o| grid.locate(o)).collect())
}

/// Steps the driving coordinate from 0 to `reach` and emits each point along
/// with its reflection through the center.
pub(crate) fn offsets_with_reach(angle: &NormalizedAngle, reach: i32) -> Vec<PixelOffset> {
    let mut offsets = Vec::with_capacity(2 * reach.max(0) as usize + 1);
    let mut seen = HashSet::with_capacity(offsets.capacity());

    for driving in 0..=reach {
        let companion = (driving as f64 * angle.tan).round() as i32;

        let (x, y) = if angle.quadrant.upper_half {
            (companion, driving)
        } else {
            (driving, companion)
        };

        // quadrants one and three reuse quadrant zero rotated by 90°
        let (x, y) = if angle.quadrant.odd_quarter {
            (-y, x)
        } else {
            (x, y)
        };

        let point = PixelOffset::new(x, y);
        push_unique(&mut offsets, &mut seen, point);
        push_unique(&mut offsets, &mut seen, point.reflected());
    }

    offsets
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn offset_set(angle: f64) -> BTreeSet<(i32, i32)> {
        line_offsets(angle, GridSize::SENSE_HAT)
            .unwrap()
            .into_iter()
            .map(|o| (o.dx, o.dy))
            .collect()
    }

    fn pixel_set(angle: f64, grid: GridSize) -> BTreeSet<(usize, usize)> {
        rasterize_in(angle, grid)
            .unwrap()
            .into_iter()
            .map(|p| (p.x, p.y))
            .collect()
    }

    fn symmetric(points: &[(i32, i32)]) -> BTreeSet<(i32, i32)> {
        points
            .iter()
            .flat_map(|&(x, y)| [(x, y), (-x, -y)])
            .collect()
    }

    /// Largest Chebyshev distance from any point of one set to the other set.
    fn hausdorff(a: &BTreeSet<(usize, usize)>, b: &BTreeSet<(usize, usize)>) -> usize {
        let directed = |from: &BTreeSet<(usize, usize)>, to: &BTreeSet<(usize, usize)>| {
            from.iter()
                .map(|&(x, y)| {
                    to.iter()
                        .map(|&(tx, ty)| x.abs_diff(tx).max(y.abs_diff(ty)))
                        .min()
                        .unwrap_or(usize::MAX)
                })
                .max()
                .unwrap_or(0)
        };
        directed(a, b).max(directed(b, a))
    }

    #[test]
    fn horizontal_at_zero() {
        assert_eq!(
            offset_set(0.0),
            symmetric(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)])
        );
        let row: BTreeSet<_> = (0..8).map(|x| (x, 4)).collect();
        assert_eq!(pixel_set(0.0, GridSize::SENSE_HAT), row);
    }

    #[test]
    fn vertical_at_ninety() {
        assert_eq!(
            offset_set(90.0),
            symmetric(&[(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)])
        );
        let column: BTreeSet<_> = (0..8).map(|y| (4, y)).collect();
        assert_eq!(pixel_set(90.0, GridSize::SENSE_HAT), column);
    }

    #[test]
    fn diagonal_at_forty_five() {
        assert_eq!(
            offset_set(45.0),
            symmetric(&[(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)])
        );
        // (8, 8) falls off the grid
        let diagonal: BTreeSet<_> = (0..8).map(|i| (i, i)).collect();
        assert_eq!(pixel_set(45.0, GridSize::SENSE_HAT), diagonal);
    }

    #[test]
    fn anti_diagonal_at_one_thirty_five() {
        assert_eq!(
            offset_set(135.0),
            symmetric(&[(0, 0), (-1, 1), (-2, 2), (-3, 3), (-4, 4)])
        );
    }

    #[test]
    fn half_turn_draws_the_same_line() {
        assert_eq!(offset_set(180.0), offset_set(0.0));
        assert_eq!(offset_set(225.0), offset_set(45.0));
        assert_eq!(offset_set(270.0), offset_set(90.0));
    }

    #[test]
    fn wraps_past_a_full_turn() {
        assert_eq!(offset_set(405.0), offset_set(45.0));
        assert_eq!(offset_set(-315.0), offset_set(45.0));
    }

    #[test]
    fn companion_is_rounded_not_truncated() {
        // tan(30°) * 4 = 2.31, tan(30°) * 3 = 1.73
        assert_eq!(
            offset_set(30.0),
            symmetric(&[(0, 0), (1, 1), (2, 1), (3, 2), (4, 2)])
        );
    }

    #[test]
    fn upper_half_swaps_the_driving_axis() {
        // 1 - tan(15°) = 0.732
        assert_eq!(
            offset_set(60.0),
            symmetric(&[(0, 0), (1, 1), (1, 2), (2, 3), (3, 4)])
        );
    }

    #[test]
    fn periodic_over_full_turns() {
        for step in -3600..3600 {
            let angle = step as f64 / 10.0;
            assert_eq!(offset_set(angle), offset_set(angle + 360.0), "angle {angle}");
        }
    }

    #[test]
    fn every_offset_has_its_reflection() {
        for step in -720..720 {
            let set = offset_set(step as f64 / 2.0);
            for &(x, y) in &set {
                assert!(set.contains(&(-x, -y)));
            }
            assert!(set.contains(&(0, 0)));
        }
    }

    #[test]
    fn stays_inside_the_grid() {
        for (columns, rows) in [(8, 8), (7, 7), (16, 8), (5, 9), (1, 1), (2, 3)] {
            let grid = GridSize::new(columns, rows).unwrap();
            for step in 0..720 {
                for pixel in rasterize_in(step as f64 / 2.0, grid).unwrap() {
                    assert!(pixel.x < columns && pixel.y < rows);
                }
            }
        }
    }

    #[test]
    fn small_sweeps_move_at_most_one_cell() {
        for grid in [GridSize::SENSE_HAT, GridSize::new(7, 7).unwrap()] {
            let mut previous = pixel_set(-360.0, grid);
            for step in -3599..=3600 {
                let current = pixel_set(step as f64 / 10.0, grid);
                assert!(hausdorff(&previous, &current) <= 1, "jump at {}", step as f64 / 10.0);
                previous = current;
            }
        }
    }

    #[test]
    fn repeated_calls_agree() {
        let first = rasterize_line(123.4, 8, 8).unwrap();
        let second = rasterize_line(123.4, 8, 8).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn one_by_one_grid_lights_its_only_cell() {
        assert_eq!(rasterize_line(77.0, 1, 1).unwrap(), vec![Pixel::new(0, 0)]);
    }

    #[test]
    fn invalid_input_is_reported() {
        assert!(matches!(
            rasterize_line(f64::NAN, 8, 8),
            Err(GeometryError::NonFiniteAngle(_))
        ));
        assert!(matches!(
            rasterize_line(f64::NEG_INFINITY, 8, 8),
            Err(GeometryError::NonFiniteAngle(_))
        ));
        assert_eq!(
            rasterize_line(0.0, 0, 8),
            Err(GeometryError::EmptyGrid { columns: 0, rows: 8 })
        );
    }
}
