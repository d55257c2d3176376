//! Table assembly: one detected table region in, one text table out.

use image::{Rgb, RgbImage, imageops};
use pdftab_core::{
    BBox, CoordinateMapper, CropPixels, CropWindow, Detection, ExtractOptions, ExtractWarning,
    Frame, Grid, MalformedBox, ObjectDetector, PagePixels, PdfSpace, StructureSet, TableError,
    TableRecord, TextQuery, normalize_cell_text, sort_rows_cols, synthesize_grid,
};

/// A table found by the table detector, in page-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TableRegion {
    /// Page the table is on (0-indexed).
    pub page: usize,
    /// Position of the table in the detector's output for its page.
    pub index: usize,
    /// Detector confidence.
    pub score: f32,
    pub bbox: BBox<PagePixels>,
}

/// A fully reconstructed table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExtractedTable {
    /// Page the table is on (0-indexed).
    pub page: usize,
    /// Position of the table in the detector's output for its page.
    pub index: usize,
    /// Detector confidence for the table region.
    pub score: f32,
    /// Table region in bottom-left-origin PDF points.
    pub bbox: BBox<PdfSpace>,
    /// Cell boxes in PDF points, row-major, top row first.
    #[cfg_attr(feature = "serde", serde(skip_serializing))]
    pub grid: Grid<PdfSpace>,
    pub record: TableRecord,
}

/// Result of assembling one region.
#[derive(Debug, Clone, PartialEq)]
pub enum AssembleOutcome {
    Assembled(ExtractedTable),
    /// The region did not yield a table. The warning says why.
    Skipped(ExtractWarning),
}

/// Cut `bounds` out of a page image.
///
/// Bounds are rounded to whole pixels. Any part of the window that falls
/// outside the page is filled with white, so crop pixel `(0, 0)` always sits
/// at the window's top-left corner.
pub fn crop_region(page_image: &RgbImage, bounds: &BBox<PagePixels>) -> RgbImage {
    let x0 = bounds.x0.round() as i64;
    let y0 = bounds.y0.round() as i64;
    let width = (bounds.x1.round() as i64 - x0).max(0) as u32;
    let height = (bounds.y1.round() as i64 - y0).max(0) as u32;

    let mut crop = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    imageops::replace(&mut crop, page_image, -x0, -y0);
    crop
}

/// Builds tables from regions of one rendered page.
///
/// Holds borrowed collaborators only. A new assembler is cheap to create
/// per page.
#[derive(Debug)]
pub struct TableAssembler<'a, Q, S> {
    text: &'a Q,
    structure: &'a S,
    options: &'a ExtractOptions,
}

impl<'a, Q, S> TableAssembler<'a, Q, S>
where
    Q: TextQuery,
    S: ObjectDetector,
{
    pub fn new(text: &'a Q, structure: &'a S, options: &'a ExtractOptions) -> Self {
        Self {
            text,
            structure,
            options,
        }
    }

    /// Reconstruct the table in `region`.
    ///
    /// `page_image` is the page rendered at `options.dpi` and `page_height`
    /// the page's height in points. Regions that yield no usable table come
    /// back as [`AssembleOutcome::Skipped`]. Errors are collaborator
    /// failures, left for the caller to record or propagate.
    pub fn assemble(
        &self,
        page_image: &RgbImage,
        page_height: f64,
        region: &TableRegion,
    ) -> Result<AssembleOutcome, TableError> {
        let malformed = |err: MalformedBox| {
            skipped(ExtractWarning::malformed_box(region.page, region.index, &err))
        };

        if !region.bbox.is_well_formed() {
            return Ok(malformed(MalformedBox {
                frame: PagePixels::NAME,
                coords: region.bbox.to_xyxy(),
            }));
        }

        let window = CropWindow::new(region.bbox, self.options.padding);
        let crop = crop_region(page_image, &window.bounds());
        let detections: Vec<Detection<CropPixels>> =
            self.structure.detect(&crop).map_err(Into::<TableError>::into)?;
        let structure = StructureSet::from_detections(&detections);
        tracing::debug!(
            page = region.page,
            table = region.index,
            rows = structure.rows.len(),
            columns = structure.columns.len(),
            "recognized table structure"
        );

        if structure.is_degenerate() {
            return Ok(skipped(ExtractWarning::detection_empty(
                region.page,
                region.index,
                structure.rows.len(),
                structure.columns.len(),
            )));
        }

        let mapper = CoordinateMapper::new(window, self.options.dpi, page_height);
        let mapped = match structure.try_map(|b| mapper.to_pdf_space(b)) {
            Ok(mapped) => mapped,
            Err(err) => return Ok(malformed(err)),
        };
        let bbox = match mapper.page_pixels_to_pdf_space(region.bbox) {
            Ok(bbox) => bbox,
            Err(err) => return Ok(malformed(err)),
        };

        let (rows, columns) = sort_rows_cols(mapped.rows, mapped.columns);
        let grid = synthesize_grid(&rows, &columns);

        let cells = grid.try_map_cells(|cell| {
            self.text
                .text_in_box(region.page, cell)
                .map(|raw| normalize_cell_text(&raw).into_owned())
                .map_err(Into::<TableError>::into)
        })?;

        let record = match TableRecord::new(cells, self.options.first_row_header) {
            Ok(record) => record,
            Err(err) => {
                return Ok(skipped(ExtractWarning::irregular_grid(
                    region.page,
                    region.index,
                    err,
                )));
            }
        };

        tracing::debug!(
            page = region.page,
            table = region.index,
            rows = grid.row_count(),
            columns = grid.column_count(),
            "assembled table"
        );
        Ok(AssembleOutcome::Assembled(ExtractedTable {
            page: region.page,
            index: region.index,
            score: region.score,
            bbox,
            grid,
            record,
        }))
    }
}

fn skipped(warning: ExtractWarning) -> AssembleOutcome {
    tracing::warn!(%warning, "skipping table");
    AssembleOutcome::Skipped(warning)
}
