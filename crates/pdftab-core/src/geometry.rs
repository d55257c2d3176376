//! Frame-tagged bounding boxes.
//!
//! Every [`BBox`] carries a zero-sized frame marker naming the coordinate
//! system its four scalars live in. The pipeline moves through four frames:
//!
//! | frame | origin | unit |
//! |-------|--------|------|
//! | [`CropPixels`] | top-left of the padded crop | pixel |
//! | [`PagePixels`] | top-left of the rendered page | pixel |
//! | [`PagePoints`] | top-left of the page | PDF point |
//! | [`PdfSpace`] | bottom-left of the page | PDF point |
//!
//! Boxes of different frames cannot be mixed; the only way between frames is
//! through the functions in [`crate::transform`].

use std::fmt;
use std::marker::PhantomData;

mod sealed {
    pub trait Sealed {}
}

/// A coordinate frame marker.
pub trait Frame: sealed::Sealed + Copy + Default + fmt::Debug + PartialEq {
    /// Short name used in debug output and diagnostics.
    const NAME: &'static str;
}

/// Pixel space of a cropped, padded table image (structure detector output).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CropPixels;

/// Pixel space of the full rendered page (table detector output).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PagePixels;

/// PDF point space with the origin at the top-left corner of the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PagePoints;

/// PDF point space with the origin at the bottom-left corner of the page.
///
/// This is the native PDF user space and the frame expected by text-layer
/// queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PdfSpace;

impl sealed::Sealed for CropPixels {}
impl sealed::Sealed for PagePixels {}
impl sealed::Sealed for PagePoints {}
impl sealed::Sealed for PdfSpace {}

impl Frame for CropPixels {
    const NAME: &'static str = "crop-px";
}
impl Frame for PagePixels {
    const NAME: &'static str = "page-px";
}
impl Frame for PagePoints {
    const NAME: &'static str = "page-pt";
}
impl Frame for PdfSpace {
    const NAME: &'static str = "pdf-pt";
}

/// Frames whose vertical axis can be flipped against the page height.
///
/// The flip is an involution: `Flipped::Flipped == Self`.
pub trait VerticalFlip: Frame {
    /// The frame reached by flipping the y axis.
    type Flipped: VerticalFlip<Flipped = Self>;
}

impl VerticalFlip for PagePoints {
    type Flipped = PdfSpace;
}

impl VerticalFlip for PdfSpace {
    type Flipped = PagePoints;
}

/// Axis-aligned bounding box in the frame `F`.
///
/// - `x0`: left edge
/// - `y0`: smaller y edge (top in top-left frames, bottom in [`PdfSpace`])
/// - `x1`: right edge
/// - `y1`: larger y edge
#[derive(Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BBox<F: Frame> {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    #[cfg_attr(feature = "serde", serde(skip))]
    frame: PhantomData<F>,
}

impl<F: Frame> BBox<F> {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0,
            y0,
            x1,
            y1,
            frame: PhantomData,
        }
    }

    /// Build a box from the `[xmin, ymin, xmax, ymax]` layout detectors emit.
    pub fn from_xyxy(coords: [f64; 4]) -> Self {
        Self::new(coords[0], coords[1], coords[2], coords[3])
    }

    pub fn to_xyxy(&self) -> [f64; 4] {
        [self.x0, self.y0, self.x1, self.y1]
    }

    /// Width of the bounding box.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height of the bounding box.
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// True when all coordinates are finite and `x0 <= x1`, `y0 <= y1`.
    pub fn is_well_formed(&self) -> bool {
        self.to_xyxy().iter().all(|v| v.is_finite()) && self.x0 <= self.x1 && self.y0 <= self.y1
    }

    /// Shift the box by `(dx, dy)` within the same frame.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x0 + dx, self.y0 + dy, self.x1 + dx, self.y1 + dy)
    }

    /// Grow the box by `amount` on all four sides.
    pub fn expand(&self, amount: f64) -> Self {
        Self::new(
            self.x0 - amount,
            self.y0 - amount,
            self.x1 + amount,
            self.y1 + amount,
        )
    }

    /// Compute the union of two bounding boxes.
    pub fn union(&self, other: &BBox<F>) -> BBox<F> {
        BBox::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }
}

impl<F: Frame> fmt::Debug for BBox<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BBox<{}>({}, {}, {}, {})",
            F::NAME,
            self.x0,
            self.y0,
            self.x1,
            self.y1
        )
    }
}

impl<F: Frame> fmt::Display for BBox<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.1}, {:.1}, {:.1}, {:.1}]",
            self.x0, self.y0, self.x1, self.y1
        )
    }
}
