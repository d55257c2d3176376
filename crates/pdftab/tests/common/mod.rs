//! In-memory collaborators for driving the extractor without pdfium or
//! ONNX models.
//!
//! - [`FakeDocument`] renders blank pages whose pixel `(0, 0)` encodes the
//!   page index, and answers text queries from a list of placed words.
//! - [`FakeTableDetector`] returns scripted table boxes per page.
//! - [`FakeStructureDetector`] returns scripted rows and columns keyed by the
//!   size of the crop it receives.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Mutex;

use image::{Rgb, RgbImage};
use pdftab::pdftab_core::Frame;
use pdftab::{BBox, Detection, Label, ObjectDetector, PdfSpace, Rasterizer, TableError, TextQuery};

pub const LETTER_WIDTH: f64 = 612.0;
pub const LETTER_HEIGHT: f64 = 792.0;

#[derive(Debug, Clone, PartialEq)]
pub enum FakeError {
    Render(String),
    Text(String),
    Detect(String),
}

impl fmt::Display for FakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FakeError::Render(msg) | FakeError::Text(msg) | FakeError::Detect(msg) => {
                f.write_str(msg)
            }
        }
    }
}

impl std::error::Error for FakeError {}

impl From<FakeError> for TableError {
    fn from(err: FakeError) -> Self {
        match err {
            FakeError::Render(msg) => TableError::Render(msg),
            FakeError::Text(msg) => TableError::TextQuery(msg),
            FakeError::Detect(msg) => TableError::Detection(msg),
        }
    }
}

/// A word placed at a point (bottom-left-origin PDF points) on a page.
#[derive(Debug, Clone)]
pub struct Word {
    pub page: usize,
    pub x: f64,
    pub y: f64,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct FakeDocument {
    pub heights: Vec<f64>,
    pub words: Vec<Word>,
    pub failing_renders: HashSet<usize>,
    /// Number of text queries that succeed before every further one fails.
    pub text_budget: Option<usize>,
    pub renders: Mutex<Vec<(usize, f64)>>,
    pub queries: Mutex<Vec<(usize, BBox<PdfSpace>)>>,
}

impl FakeDocument {
    pub fn letter(pages: usize) -> Self {
        Self {
            heights: vec![LETTER_HEIGHT; pages],
            ..Self::default()
        }
    }

    pub fn with_word(mut self, page: usize, x: f64, y: f64, text: &str) -> Self {
        self.words.push(Word {
            page,
            x,
            y,
            text: text.to_string(),
        });
        self
    }

    pub fn failing_render(mut self, page: usize) -> Self {
        self.failing_renders.insert(page);
        self
    }

    pub fn text_budget(mut self, queries: usize) -> Self {
        self.text_budget = Some(queries);
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

impl Rasterizer for FakeDocument {
    type Error = FakeError;

    fn page_count(&self) -> usize {
        self.heights.len()
    }

    fn page_height(&self, page: usize) -> Result<f64, FakeError> {
        self.heights
            .get(page)
            .copied()
            .ok_or_else(|| FakeError::Render(format!("no page {page}")))
    }

    fn render(&self, page: usize, dpi: f64) -> Result<RgbImage, FakeError> {
        if self.failing_renders.contains(&page) {
            return Err(FakeError::Render(format!("cannot render page {page}")));
        }
        self.renders.lock().unwrap().push((page, dpi));

        let scale = dpi / 72.0;
        let width = (LETTER_WIDTH * scale).round() as u32;
        let height = (self.page_height(page)? * scale).round() as u32;
        let mut image = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        image.put_pixel(0, 0, Rgb([page as u8, 0, 0]));
        Ok(image)
    }
}

impl TextQuery for FakeDocument {
    type Error = FakeError;

    /// Words whose anchor point lies inside `bbox`, one per line.
    fn text_in_box(&self, page: usize, bbox: &BBox<PdfSpace>) -> Result<String, FakeError> {
        let mut queries = self.queries.lock().unwrap();
        if self.text_budget.is_some_and(|budget| queries.len() >= budget) {
            return Err(FakeError::Text(format!("text layer unavailable on page {page}")));
        }
        queries.push((page, *bbox));

        let words: Vec<&str> = self
            .words
            .iter()
            .filter(|w| w.page == page)
            .filter(|w| bbox.x0 <= w.x && w.x <= bbox.x1 && bbox.y0 <= w.y && w.y <= bbox.y1)
            .map(|w| w.text.as_str())
            .collect();
        Ok(words.join("\n"))
    }
}

/// A labeled box in the raw `[x0, y0, x1, y1]` form, usable in any frame.
#[derive(Debug, Clone, Copy)]
pub struct Scripted {
    pub label: Label,
    pub coords: [f64; 4],
}

pub fn table(coords: [f64; 4]) -> Scripted {
    Scripted {
        label: Label::Table,
        coords,
    }
}

pub fn row(coords: [f64; 4]) -> Scripted {
    Scripted {
        label: Label::TableRow,
        coords,
    }
}

pub fn column(coords: [f64; 4]) -> Scripted {
    Scripted {
        label: Label::TableColumn,
        coords,
    }
}

fn to_detections<F: Frame>(scripted: &[Scripted]) -> Vec<Detection<F>> {
    scripted
        .iter()
        .map(|s| Detection::new(s.label, 0.95, BBox::from_xyxy(s.coords)))
        .collect()
}

/// Table detector that reads the page index from pixel `(0, 0)`.
#[derive(Debug, Default)]
pub struct FakeTableDetector {
    pub pages: HashMap<usize, Vec<Scripted>>,
    pub failing_pages: HashSet<usize>,
}

impl FakeTableDetector {
    pub fn on_page(mut self, page: usize, boxes: Vec<Scripted>) -> Self {
        self.pages.insert(page, boxes);
        self
    }

    pub fn failing_on(mut self, page: usize) -> Self {
        self.failing_pages.insert(page);
        self
    }
}

impl ObjectDetector for FakeTableDetector {
    type Error = FakeError;

    fn detect<F: Frame>(&self, image: &RgbImage) -> Result<Vec<Detection<F>>, FakeError> {
        let page = image.get_pixel(0, 0)[0] as usize;
        if self.failing_pages.contains(&page) {
            return Err(FakeError::Detect(format!("detector crashed on page {page}")));
        }
        Ok(self
            .pages
            .get(&page)
            .map(|boxes| to_detections(boxes))
            .unwrap_or_default())
    }
}

/// Structure detector keyed by crop dimensions.
#[derive(Debug, Default)]
pub struct FakeStructureDetector {
    pub by_size: HashMap<(u32, u32), Vec<Scripted>>,
    pub fallback: Vec<Scripted>,
    pub failing_sizes: HashSet<(u32, u32)>,
    pub crops: Mutex<Vec<(u32, u32)>>,
}

impl FakeStructureDetector {
    pub fn always(boxes: Vec<Scripted>) -> Self {
        Self {
            fallback: boxes,
            ..Self::default()
        }
    }

    pub fn for_crop(mut self, width: u32, height: u32, boxes: Vec<Scripted>) -> Self {
        self.by_size.insert((width, height), boxes);
        self
    }

    pub fn failing_for_crop(mut self, width: u32, height: u32) -> Self {
        self.failing_sizes.insert((width, height));
        self
    }
}

impl ObjectDetector for FakeStructureDetector {
    type Error = FakeError;

    fn detect<F: Frame>(&self, image: &RgbImage) -> Result<Vec<Detection<F>>, FakeError> {
        self.crops.lock().unwrap().push(image.dimensions());
        if self.failing_sizes.contains(&image.dimensions()) {
            let (width, height) = image.dimensions();
            return Err(FakeError::Detect(format!("model crashed on {width}x{height} crop")));
        }
        let boxes = self
            .by_size
            .get(&image.dimensions())
            .unwrap_or(&self.fallback);
        Ok(to_detections(boxes))
    }
}

/// Two rows and three columns of a table cropped from region
/// `(100, 100, 500, 400)` with 50px padding.
pub fn two_by_three_structure() -> Vec<Scripted> {
    vec![
        row([50.0, 200.0, 450.0, 350.0]),
        column([320.0, 50.0, 450.0, 350.0]),
        table([50.0, 50.0, 450.0, 350.0]),
        row([50.0, 50.0, 450.0, 200.0]),
        column([50.0, 50.0, 180.0, 350.0]),
        column([180.0, 50.0, 320.0, 350.0]),
    ]
}

/// A 2x2 structure filling a crop of a region of `width` x `height` pixels
/// with 50px padding.
pub fn two_by_two_structure(width: f64, height: f64) -> Vec<Scripted> {
    let (x0, y0) = (50.0, 50.0);
    let (x1, y1) = (50.0 + width, 50.0 + height);
    let (xm, ym) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
    vec![
        row([x0, y0, x1, ym]),
        row([x0, ym, x1, y1]),
        column([x0, y0, xm, y1]),
        column([xm, y0, x1, y1]),
    ]
}
