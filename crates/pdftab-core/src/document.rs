//! Document collaborator traits.
//!
//! The reconstruction pipeline only reads from a document: it needs page
//! rasters, page heights and a text-layer query. [`Rasterizer`] and
//! [`TextQuery`] abstract those so that pdfium (or a test double) can be
//! plugged in.

use image::RgbImage;

use crate::error::TableError;
use crate::geometry::{BBox, PdfSpace};

/// Renders pages of a document to raster images.
///
/// # Usage
///
/// ```ignore
/// let height_pt = doc.page_height(0)?;
/// let image = doc.render(0, 300.0)?;
/// ```
pub trait Rasterizer {
    /// Backend-specific error type, convertible to [`TableError`].
    type Error: std::error::Error + Into<TableError>;

    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Height of a page in PDF points.
    fn page_height(&self, page: usize) -> Result<f64, Self::Error>;

    /// Render a page at `dpi` dots per inch.
    fn render(&self, page: usize, dpi: f64) -> Result<RgbImage, Self::Error>;
}

/// Answers "which text lies inside this box" for a page's text layer.
pub trait TextQuery {
    /// Backend-specific error type, convertible to [`TableError`].
    type Error: std::error::Error + Into<TableError>;

    /// Raw text inside `bbox`, which is in bottom-left-origin PDF points.
    fn text_in_box(&self, page: usize, bbox: &BBox<PdfSpace>) -> Result<String, Self::Error>;
}
