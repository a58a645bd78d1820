use crate::error::{Error, Result};

/// Rows x columns arrangement for a multi-panel figure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub rows: usize,
    pub columns: usize,
}

impl GridShape {
    /// Number of slots, saturating at `usize::MAX`
    pub fn capacity(&self) -> usize {
        self.rows.saturating_mul(self.columns)
    }

    /// Row-major (row, column) of the panel at `index`
    pub fn cell(&self, index: usize) -> Option<(usize, usize)> {
        if self.columns == 0 || index >= self.capacity() {
            return None;
        }
        Some((index / self.columns, index % self.columns))
    }
}

/// Smallest integer `c` with `c * c >= n`
fn ceil_sqrt(n: usize) -> usize {
    let c = n.isqrt();
    if c * c < n { c + 1 } else { c }
}

/// Plan a roughly square grid for `panel_count` panels.
///
/// Columns are `ceil(sqrt(n))`; one row is dropped when the square grid
/// would leave more than a full row of empty slots (`columns² - n > columns`).
pub fn plan_grid(panel_count: usize) -> Result<GridShape> {
    if panel_count == 0 {
        return Err(Error::InvalidArgument(
            "panel count must be positive".to_string(),
        ));
    }

    let columns = ceil_sqrt(panel_count);
    // columns² can exceed usize for counts near usize::MAX
    let slack = (columns as u128) * (columns as u128) - panel_count as u128;
    let rows = if slack > columns as u128 {
        columns - 1
    } else {
        columns
    };

    Ok(GridShape { rows, columns })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_panels_fit_three_by_four() {
        assert_eq!(plan_grid(10).unwrap(), GridShape { rows: 3, columns: 4 });
    }

    #[test]
    fn zero_panels_is_rejected() {
        assert!(matches!(plan_grid(0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn ceil_sqrt_is_exact_at_squares() {
        assert_eq!(ceil_sqrt(1), 1);
        assert_eq!(ceil_sqrt(4), 2);
        assert_eq!(ceil_sqrt(5), 3);
        assert_eq!(ceil_sqrt(10_000), 100);
        assert_eq!(ceil_sqrt(10_001), 101);
        assert_eq!(ceil_sqrt(usize::MAX), usize::MAX.isqrt() + 1);
    }

    #[test]
    fn cells_are_row_major() {
        let grid = GridShape { rows: 3, columns: 4 };
        assert_eq!(grid.cell(0), Some((0, 0)));
        assert_eq!(grid.cell(5), Some((1, 1)));
        assert_eq!(grid.cell(11), Some((2, 3)));
        assert_eq!(grid.cell(12), None);
    }
}
