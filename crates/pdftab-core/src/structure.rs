//! Table structure: detected rows and columns, and their reading order.

use crate::detection::{Detection, Label, boxes_with_label};
use crate::geometry::{BBox, Frame, PdfSpace};

/// Unordered row and column boxes of one table, as recognized by the
/// structure detector.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureSet<F: Frame> {
    pub rows: Vec<BBox<F>>,
    pub columns: Vec<BBox<F>>,
}

impl<F: Frame> StructureSet<F> {
    /// Split structure detections into rows and columns.
    ///
    /// Detections with any other label (headers, spanning cells, the table
    /// itself) are ignored. Detector order is kept.
    pub fn from_detections(detections: &[Detection<F>]) -> Self {
        Self {
            rows: boxes_with_label(detections, Label::TableRow),
            columns: boxes_with_label(detections, Label::TableColumn),
        }
    }

    /// True when there is nothing to build a grid from.
    pub fn is_degenerate(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Apply `f` to every row and column box, keeping their order.
    ///
    /// Stops at the first error.
    pub fn try_map<G: Frame, E>(
        &self,
        mut f: impl FnMut(BBox<F>) -> Result<BBox<G>, E>,
    ) -> Result<StructureSet<G>, E> {
        let rows = self.rows.iter().map(|b| f(*b)).collect::<Result<_, _>>()?;
        let columns = self
            .columns
            .iter()
            .map(|b| f(*b))
            .collect::<Result<_, _>>()?;
        Ok(StructureSet { rows, columns })
    }
}

/// Put rows and columns in reading order.
///
/// Runs on boxes already in [`PdfSpace`], where y grows upwards:
/// rows are ordered by `y0` descending, so the visually topmost row comes
/// first; columns by `x0` ascending. Both sorts are stable, so boxes with
/// equal keys keep detector order.
pub fn sort_rows_cols(
    mut rows: Vec<BBox<PdfSpace>>,
    mut columns: Vec<BBox<PdfSpace>>,
) -> (Vec<BBox<PdfSpace>>, Vec<BBox<PdfSpace>>) {
    rows.sort_by(|a, b| b.y0.total_cmp(&a.y0));
    columns.sort_by(|a, b| a.x0.total_cmp(&b.x0));
    (rows, columns)
}
