//! Coordinate transforms between the pipeline's frames.
//!
//! A structure-detector box reaches text-query space in exactly three steps:
//!
//! ```text
//! CropPixels --pad_to_full--> PagePixels --pixels_to_points--> PagePoints --invert_y--> PdfSpace
//! ```
//!
//! The frame types make any other order a compile error. [`CoordinateMapper`]
//! bundles the three steps together with the per-table parameters and checks
//! every intermediate box.

use crate::geometry::{BBox, CropPixels, Frame, PagePixels, PagePoints, PdfSpace, VerticalFlip};

/// Points per inch in PDF user space.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Resolution pages are rendered at unless configured otherwise.
pub const DEFAULT_DPI: f64 = 300.0;

/// Margin added around a detected table before cropping it for structure
/// recognition.
pub const DEFAULT_PADDING: f64 = 50.0;

/// Map a box from crop pixels back to page pixels.
///
/// The crop's top-left corner sits at `region - padding`, so every coordinate
/// is offset by the region origin minus the padding.
pub fn pad_to_full(
    bbox: BBox<CropPixels>,
    region: &BBox<PagePixels>,
    padding: f64,
) -> BBox<PagePixels> {
    let dx = region.x0 - padding;
    let dy = region.y0 - padding;
    BBox::new(bbox.x0 + dx, bbox.y0 + dy, bbox.x1 + dx, bbox.y1 + dy)
}

/// Scale a page-pixel box rendered at `dpi` into PDF points.
pub fn pixels_to_points(bbox: BBox<PagePixels>, dpi: f64) -> BBox<PagePoints> {
    let scale = POINTS_PER_INCH / dpi;
    BBox::new(
        bbox.x0 * scale,
        bbox.y0 * scale,
        bbox.x1 * scale,
        bbox.y1 * scale,
    )
}

/// Flip the vertical axis against the page height.
///
/// `y0' = h - y1` and `y1' = h - y0`, so `y0 <= y1` still holds afterwards.
/// Applying it twice returns the original box.
pub fn invert_y<F: VerticalFlip>(bbox: BBox<F>, page_height: f64) -> BBox<F::Flipped> {
    BBox::new(bbox.x0, page_height - bbox.y1, bbox.x1, page_height - bbox.y0)
}

/// Expand a page-pixel box by `padding` on every side, giving the crop bounds.
pub fn crop_box(bbox: BBox<PagePixels>, padding: f64) -> BBox<PagePixels> {
    bbox.expand(padding)
}

/// A detected table region together with the padding used to crop it.
///
/// Both directions of the padding ([`crop_box`] when cutting the image and
/// [`pad_to_full`] when mapping results back) read the same stored value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropWindow {
    region: BBox<PagePixels>,
    padding: f64,
}

impl CropWindow {
    pub fn new(region: BBox<PagePixels>, padding: f64) -> Self {
        Self { region, padding }
    }

    /// The un-padded table region in page pixels.
    pub fn region(&self) -> &BBox<PagePixels> {
        &self.region
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    /// Page-pixel bounds of the image to crop.
    pub fn bounds(&self) -> BBox<PagePixels> {
        crop_box(self.region, self.padding)
    }

    /// Map a box detected inside the cropped image back to page pixels.
    pub fn to_page(&self, bbox: BBox<CropPixels>) -> BBox<PagePixels> {
        pad_to_full(bbox, &self.region, self.padding)
    }
}

/// A box that stopped being well-formed at some step of the mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedBox {
    /// Name of the frame the bad box was observed in.
    pub frame: &'static str,
    /// The offending coordinates as `[x0, y0, x1, y1]`.
    pub coords: [f64; 4],
}

impl std::fmt::Display for MalformedBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [x0, y0, x1, y1] = self.coords;
        write!(f, "malformed {} box [{x0}, {y0}, {x1}, {y1}]", self.frame)
    }
}

fn checked<F: Frame>(bbox: BBox<F>) -> Result<BBox<F>, MalformedBox> {
    if bbox.is_well_formed() {
        Ok(bbox)
    } else {
        Err(MalformedBox {
            frame: F::NAME,
            coords: bbox.to_xyxy(),
        })
    }
}

/// Maps structure-detector boxes of one table into text-query space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    window: CropWindow,
    dpi: f64,
    page_height: f64,
}

impl CoordinateMapper {
    /// `page_height` is the height of the table's page in points.
    pub fn new(window: CropWindow, dpi: f64, page_height: f64) -> Self {
        Self {
            window,
            dpi,
            page_height,
        }
    }

    pub fn window(&self) -> &CropWindow {
        &self.window
    }

    /// Run `pad_to_full`, `pixels_to_points` and `invert_y` in order,
    /// validating the input and every intermediate box.
    pub fn to_pdf_space(&self, bbox: BBox<CropPixels>) -> Result<BBox<PdfSpace>, MalformedBox> {
        let crop = checked(bbox)?;
        let page_px = checked(self.window.to_page(crop))?;
        let page_pt = checked(pixels_to_points(page_px, self.dpi))?;
        checked(invert_y(page_pt, self.page_height))
    }

    /// Map a page-pixel box (e.g. a detected table region) to text-query space.
    pub fn page_pixels_to_pdf_space(
        &self,
        bbox: BBox<PagePixels>,
    ) -> Result<BBox<PdfSpace>, MalformedBox> {
        let page_pt = checked(pixels_to_points(checked(bbox)?, self.dpi))?;
        checked(invert_y(page_pt, self.page_height))
    }
}
