//! pdfium-backed document: page rasters, page sizes and text-in-box queries.

use std::path::Path;

use image::{DynamicImage, RgbImage, RgbaImage};
use pdfium_render::prelude::*;
use pdftab_core::{BBox, POINTS_PER_INCH, PdfSpace, Rasterizer, TextQuery};

use crate::error::BackendError;

/// Bind the pdfium shared library.
///
/// With `lib_dir`, only that directory is tried. Otherwise the library is
/// looked up in the working directory first and then on the system paths.
pub fn bind_pdfium(lib_dir: Option<&Path>) -> Result<Pdfium, BackendError> {
    let bindings = match lib_dir {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| BackendError::Bind(e.to_string()))?;

    Ok(Pdfium::new(bindings))
}

/// An open PDF document.
///
/// Borrows the [`Pdfium`] instance it was loaded with. Dropping the value
/// closes the document.
pub struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
    page_count: usize,
}

impl<'a> PdfiumDocument<'a> {
    /// Load a PDF file.
    pub fn open(pdfium: &'a Pdfium, path: &Path) -> Result<Self, BackendError> {
        let document = pdfium.load_pdf_from_file(path, None)?;
        let page_count = document.pages().len() as usize;
        tracing::debug!(path = %path.display(), page_count, "opened document");
        Ok(Self {
            document,
            page_count,
        })
    }

    /// Load a PDF held in memory.
    pub fn from_bytes(pdfium: &'a Pdfium, bytes: &'a [u8]) -> Result<Self, BackendError> {
        let document = pdfium.load_pdf_from_byte_slice(bytes, None)?;
        let page_count = document.pages().len() as usize;
        Ok(Self {
            document,
            page_count,
        })
    }

    fn page(&self, page: usize) -> Result<PdfPage<'a>, BackendError> {
        let invalid = || BackendError::InvalidPage {
            page,
            page_count: self.page_count,
        };
        if page >= self.page_count {
            return Err(invalid());
        }
        let index = page.try_into().map_err(|_| invalid())?;
        Ok(self.document.pages().get(index)?)
    }
}

impl std::fmt::Debug for PdfiumDocument<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfiumDocument")
            .field("document", &"<PdfDocument>")
            .field("page_count", &self.page_count)
            .finish()
    }
}

impl Rasterizer for PdfiumDocument<'_> {
    type Error = BackendError;

    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_height(&self, page: usize) -> Result<f64, BackendError> {
        Ok(f64::from(self.page(page)?.height().value))
    }

    fn render(&self, page: usize, dpi: f64) -> Result<RgbImage, BackendError> {
        let config = PdfRenderConfig::new().scale_page_by_factor((dpi / POINTS_PER_INCH) as f32);
        let pdf_page = self.page(page)?;
        let bitmap = pdf_page.render_with_config(&config)?;

        let width = u32::try_from(bitmap.width())
            .map_err(|_| BackendError::Render(format!("negative bitmap width on page {page}")))?;
        let height = u32::try_from(bitmap.height())
            .map_err(|_| BackendError::Render(format!("negative bitmap height on page {page}")))?;
        let rgba = RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes()).ok_or_else(|| {
            BackendError::Render(format!(
                "bitmap buffer does not match {width}x{height} on page {page}"
            ))
        })?;

        tracing::debug!(page, width, height, dpi, "rendered page");
        Ok(DynamicImage::ImageRgba8(rgba).to_rgb8())
    }
}

impl TextQuery for PdfiumDocument<'_> {
    type Error = BackendError;

    fn text_in_box(&self, page: usize, bbox: &BBox<PdfSpace>) -> Result<String, BackendError> {
        let pdf_page = self.page(page)?;
        let text = pdf_page
            .text()
            .map_err(|e| BackendError::TextLayer(e.to_string()))?;
        let rect = PdfRect::new_from_values(
            bbox.y0 as f32,
            bbox.x0 as f32,
            bbox.y1 as f32,
            bbox.x1 as f32,
        );
        Ok(text.inside_rect(rect))
    }
}
