//! Grid indexing: linear cell index ↔ (row, column), perimeter tests and
//! orthogonal neighbors.
//!
//! Cells are row-major: `row = index / width`, `column = index % width`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cell_set::CellSet;

/// A precondition violation on grid or exit input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    ZeroDimension { width: usize, height: usize },

    #[error("grid {width}x{height} has too many cells")]
    TooLarge { width: usize, height: usize },

    #[error("cell {cell} is outside a grid of {cells} cells")]
    OutOfRange { cell: usize, cells: usize },

    #[error("exit {cell} (row {row}, column {column}) is not on the grid perimeter")]
    NotOnPerimeter { cell: usize, row: usize, column: usize },

    #[error("exit {0} is a blocked cell")]
    BlockedExit(usize),
}

/// Validated grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDims")]
pub struct GridDims {
    width: usize,
    height: usize,
}

/// Unchecked wire form; deserializing goes through [`GridDims::new`].
#[derive(Deserialize)]
struct RawDims {
    width: usize,
    height: usize,
}

impl TryFrom<RawDims> for GridDims {
    type Error = GridError;

    fn try_from(raw: RawDims) -> Result<Self, GridError> {
        Self::new(raw.width, raw.height)
    }
}

impl GridDims {
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroDimension { width, height });
        }
        if width.checked_mul(height).is_none() {
            return Err(GridError::TooLarge { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn contains(&self, cell: usize) -> bool {
        cell < self.cell_count()
    }

    pub fn row(&self, cell: usize) -> usize {
        cell / self.width
    }

    pub fn column(&self, cell: usize) -> usize {
        cell % self.width
    }

    /// `(row, column)` of a cell.
    pub fn coords(&self, cell: usize) -> (usize, usize) {
        (self.row(cell), self.column(cell))
    }

    /// Linear index of `(row, column)`. Returns `None` off the grid.
    pub fn index(&self, row: usize, column: usize) -> Option<usize> {
        (row < self.height && column < self.width).then(|| row * self.width + column)
    }

    pub fn is_perimeter(&self, cell: usize) -> bool {
        let (row, column) = self.coords(cell);
        row == 0 || row == self.height - 1 || column == 0 || column == self.width - 1
    }

    /// All perimeter cells in ascending index order.
    pub fn perimeter(&self) -> Vec<usize> {
        (0..self.cell_count())
            .filter(|&c| self.is_perimeter(c))
            .collect()
    }

    /// Orthogonal neighbors in the fixed order left, right, up, down,
    /// clipped at the grid edges.
    pub fn neighbors(&self, cell: usize) -> impl Iterator<Item = usize> {
        let (row, column) = self.coords(cell);
        let width = self.width;
        [
            (column > 0).then(|| cell - 1),
            (column + 1 < width).then(|| cell + 1),
            (row > 0).then(|| cell - width),
            (row + 1 < self.height).then(|| cell + width),
        ]
        .into_iter()
        .flatten()
    }
}

/// Grid dimensions plus the cells that can hold neither plants nor corridor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    dims: GridDims,
    blocked: CellSet,
}

impl Grid {
    /// A fully open grid.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        let dims = GridDims::new(width, height)?;
        Ok(Self {
            dims,
            blocked: CellSet::empty(dims.cell_count()),
        })
    }

    /// A grid with some cells blocked off (pillars, occupied beds).
    pub fn with_blocked(
        width: usize,
        height: usize,
        blocked: impl IntoIterator<Item = usize>,
    ) -> Result<Self, GridError> {
        let mut grid = Self::new(width, height)?;
        let cells = grid.dims.cell_count();
        for cell in blocked {
            if cell >= cells {
                return Err(GridError::OutOfRange { cell, cells });
            }
            grid.blocked.insert(cell);
        }
        Ok(grid)
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn is_blocked(&self, cell: usize) -> bool {
        self.blocked.contains(cell)
    }

    pub fn blocked(&self) -> &CellSet {
        &self.blocked
    }

    /// Cells that are not blocked.
    pub fn open_cells(&self) -> CellSet {
        let mut open = CellSet::full(self.dims.cell_count());
        for cell in self.blocked.iter() {
            open.remove(cell);
        }
        open
    }

    /// Neighbors that are not blocked, in the same fixed order as
    /// [`GridDims::neighbors`].
    pub fn open_neighbors(&self, cell: usize) -> impl Iterator<Item = usize> + '_ {
        self.dims
            .neighbors(cell)
            .filter(move |&n| !self.blocked.contains(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimensions_rejected() {
        assert_eq!(
            GridDims::new(0, 4),
            Err(GridError::ZeroDimension {
                width: 0,
                height: 4
            })
        );
        assert!(GridDims::new(3, 0).is_err());
    }

    #[test]
    fn overflowing_dimensions_rejected() {
        assert!(matches!(
            GridDims::new(usize::MAX, 2),
            Err(GridError::TooLarge { .. })
        ));
    }

    #[test]
    fn row_major_coords() {
        // 4 wide, 3 tall: cell 6 is row 1, column 2
        let dims = GridDims::new(4, 3).unwrap();
        assert_eq!(dims.coords(6), (1, 2));
        assert_eq!(dims.index(1, 2), Some(6));
        assert_eq!(dims.index(3, 0), None);
        assert_eq!(dims.index(0, 4), None);
    }

    #[test]
    fn non_square_uses_width_divisor() {
        let dims = GridDims::new(5, 2).unwrap();
        assert_eq!(dims.coords(7), (1, 2));
        let neighbors: Vec<_> = dims.neighbors(7).collect();
        assert_eq!(neighbors, vec![6, 8, 2]);
    }

    #[test]
    fn neighbor_order_is_left_right_up_down() {
        let dims = GridDims::new(3, 3).unwrap();
        let neighbors: Vec<_> = dims.neighbors(4).collect();
        assert_eq!(neighbors, vec![3, 5, 1, 7]);
    }

    #[test]
    fn corner_neighbors_clipped() {
        let dims = GridDims::new(3, 3).unwrap();
        assert_eq!(dims.neighbors(0).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(dims.neighbors(8).collect::<Vec<_>>(), vec![7, 5]);
    }

    #[test]
    fn single_cell_has_no_neighbors() {
        let dims = GridDims::new(1, 1).unwrap();
        assert_eq!(dims.neighbors(0).count(), 0);
        assert!(dims.is_perimeter(0));
    }

    #[test]
    fn perimeter_of_4x3() {
        let dims = GridDims::new(4, 3).unwrap();
        assert_eq!(dims.perimeter(), vec![0, 1, 2, 3, 4, 7, 8, 9, 10, 11]);
        assert!(!dims.is_perimeter(5));
    }

    #[test]
    fn blocked_cells_skip_neighbors() {
        let grid = Grid::with_blocked(3, 3, [1, 3]).unwrap();
        assert!(grid.is_blocked(1));
        assert_eq!(grid.open_neighbors(0).count(), 0);
        assert_eq!(grid.open_neighbors(4).collect::<Vec<_>>(), vec![5, 7]);
        assert_eq!(grid.open_cells().len(), 7);
    }

    #[test]
    fn dims_load_through_validation() {
        let dims: GridDims = serde_json::from_str(r#"{"width":4,"height":2}"#).unwrap();
        assert_eq!(dims, GridDims::new(4, 2).unwrap());
        assert!(serde_json::from_str::<GridDims>(r#"{"width":0,"height":3}"#).is_err());
    }

    #[test]
    fn blocked_out_of_range_rejected() {
        assert_eq!(
            Grid::with_blocked(2, 2, [4]),
            Err(GridError::OutOfRange { cell: 4, cells: 4 })
        );
    }
}
