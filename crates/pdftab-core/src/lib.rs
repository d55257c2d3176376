//! pdftab-core: Backend-independent data types and algorithms.
//!
//! This crate provides the frame-typed boxes and coordinate transforms, the
//! row/column sorter, grid synthesis, cell text normalization and table
//! records used by pdftab. Rendering, text extraction and object detection
//! are reached only through the [`Rasterizer`], [`TextQuery`] and
//! [`ObjectDetector`] traits.

pub mod detection;
pub mod document;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod record;
pub mod structure;
pub mod text;
pub mod transform;

pub use detection::{Detection, Label, ObjectDetector, boxes_with_label};
pub use document::{Rasterizer, TextQuery};
pub use error::{ExtractOptions, ExtractResult, ExtractWarning, ExtractWarningCode, TableError};
pub use geometry::{BBox, CropPixels, Frame, PagePixels, PagePoints, PdfSpace, VerticalFlip};
pub use grid::{Grid, synthesize_grid};
pub use record::{RaggedRows, TableRecord};
pub use structure::{StructureSet, sort_rows_cols};
pub use text::normalize_cell_text;
pub use transform::{
    CoordinateMapper, CropWindow, DEFAULT_DPI, DEFAULT_PADDING, MalformedBox, POINTS_PER_INCH,
    crop_box, invert_y, pad_to_full, pixels_to_points,
};
