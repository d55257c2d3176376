//! Object detector output and the detector capability.

use std::fmt;
use std::str::FromStr;

use image::RgbImage;

use crate::error::TableError;
use crate::geometry::{BBox, Frame};

/// Class labels emitted by the table detection and structure recognition
/// models, spelled the way the models' label maps spell them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Label {
    Table,
    TableRotated,
    TableColumn,
    TableRow,
    TableColumnHeader,
    TableProjectedRowHeader,
    TableSpanningCell,
    NoObject,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Table => "table",
            Label::TableRotated => "table rotated",
            Label::TableColumn => "table column",
            Label::TableRow => "table row",
            Label::TableColumnHeader => "table column header",
            Label::TableProjectedRowHeader => "table projected row header",
            Label::TableSpanningCell => "table spanning cell",
            Label::NoObject => "no object",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "table" => Ok(Label::Table),
            "table rotated" => Ok(Label::TableRotated),
            "table column" => Ok(Label::TableColumn),
            "table row" => Ok(Label::TableRow),
            "table column header" => Ok(Label::TableColumnHeader),
            "table projected row header" => Ok(Label::TableProjectedRowHeader),
            "table spanning cell" => Ok(Label::TableSpanningCell),
            "no object" | "n/a" => Ok(Label::NoObject),
            _ => Err(format!("unknown detection label '{s}'")),
        }
    }
}

/// One labeled box produced by an object detector.
///
/// `bbox` is in the pixel frame of the image the detector was given. The
/// score is informational; detectors apply their own confidence threshold
/// before returning.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection<F: Frame> {
    pub label: Label,
    pub score: f32,
    pub bbox: BBox<F>,
}

impl<F: Frame> Detection<F> {
    pub fn new(label: Label, score: f32, bbox: BBox<F>) -> Self {
        Self { label, score, bbox }
    }
}

/// Anything that turns an image into labeled boxes.
///
/// Boxes come back in the image's own pixel coordinates, already filtered by
/// the detector's confidence threshold, in the detector's output order.
/// The caller decides which frame that pixel space is by choosing `F`.
pub trait ObjectDetector {
    /// Detector-specific error type, convertible to [`TableError`].
    type Error: std::error::Error + Into<TableError>;

    fn detect<F: Frame>(&self, image: &RgbImage) -> Result<Vec<Detection<F>>, Self::Error>;
}

/// Keep only detections carrying `label`, in their original order.
pub fn boxes_with_label<F: Frame>(detections: &[Detection<F>], label: Label) -> Vec<BBox<F>> {
    detections
        .iter()
        .filter(|d| d.label == label)
        .map(|d| d.bbox)
        .collect()
}
