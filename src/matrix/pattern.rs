use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::GridSize;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid pattern payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("pattern has {found} rows, matrix has {expected}")]
    RowCount { expected: usize, found: usize },
    #[error("pattern row {row} has {found} columns, matrix has {expected}")]
    ColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// A full picture for the matrix: `matrix[y][x] = [r, g, b]`.
///
/// Channels are `u8`, so a value above 255 fails to decode rather than
/// wrapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    pub matrix: Vec<Vec<[u8; 3]>>,
}

impl Pattern {
    pub fn parse(json: &str) -> Result<Self, PatternError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the pattern is exactly `size.rows` rows of `size.columns` cells.
    pub fn validate(&self, size: GridSize) -> Result<(), PatternError> {
        if self.matrix.len() != size.rows {
            return Err(PatternError::RowCount {
                expected: size.rows,
                found: self.matrix.len(),
            });
        }
        for (row, cells) in self.matrix.iter().enumerate() {
            if cells.len() != size.columns {
                return Err(PatternError::ColumnCount {
                    row,
                    expected: size.columns,
                    found: cells.len(),
                });
            }
        }
        Ok(())
    }
}
