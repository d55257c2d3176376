//! Cell grid synthesis from independent row and column partitions.

use crate::geometry::{BBox, Frame};

/// Cell boxes of one table, row-major.
///
/// Every row holds exactly as many cells as there were columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<F: Frame> {
    rows: Vec<Vec<BBox<F>>>,
    column_count: usize,
}

impl<F: Frame> Grid<F> {
    /// Cartesian product of ordered rows and ordered columns.
    ///
    /// Cell `(r, c)` takes its horizontal extent from column `c` and its
    /// vertical extent from row `r`. With no rows or no columns the grid is
    /// empty.
    pub fn synthesize(rows: &[BBox<F>], columns: &[BBox<F>]) -> Self {
        if rows.is_empty() || columns.is_empty() {
            return Self {
                rows: Vec::new(),
                column_count: 0,
            };
        }

        let cells = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|col| BBox::new(col.x0, row.y0, col.x1, row.y1))
                    .collect::<Vec<_>>()
            })
            .collect();

        Self {
            rows: cells,
            column_count: columns.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn rows(&self) -> &[Vec<BBox<F>>] {
        &self.rows
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&BBox<F>> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Bounding box of all cells, if any.
    pub fn bbox(&self) -> Option<BBox<F>> {
        self.rows
            .iter()
            .flatten()
            .copied()
            .reduce(|acc, cell| acc.union(&cell))
    }

    /// Replace every cell box with a value computed from it, keeping the
    /// row/column order. Stops at the first error.
    pub fn try_map_cells<T, E>(
        &self,
        mut f: impl FnMut(&BBox<F>) -> Result<T, E>,
    ) -> Result<Vec<Vec<T>>, E> {
        self.rows
            .iter()
            .map(|row| row.iter().map(&mut f).collect::<Result<Vec<T>, E>>())
            .collect()
    }
}

/// Build the cell grid of a table from its ordered rows and columns.
///
/// See [`Grid::synthesize`].
pub fn synthesize_grid<F: Frame>(rows: &[BBox<F>], columns: &[BBox<F>]) -> Grid<F> {
    Grid::synthesize(rows, columns)
}
