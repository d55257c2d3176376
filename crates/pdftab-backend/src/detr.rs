//! Table Transformer (DETR) object detection through ONNX Runtime.
//!
//! One detector type serves both models of the pipeline. [`DetrConfig`]
//! selects the label map and input size for either table detection or
//! table structure recognition.
//!
//! Pre-processing follows the DETR image processor: resize so the shortest
//! edge reaches a target while capping the longest edge, rescale to `[0, 1]`,
//! normalize with ImageNet mean/std, lay out as NCHW `pixel_values`.
//! Post-processing applies a softmax over the class logits, ignores the
//! trailing no-object class, keeps scores above the threshold and converts
//! normalized `(cx, cy, w, h)` boxes to pixel corners of the input image.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use image::RgbImage;
use image::imageops::{self, FilterType};
use ndarray::Array4;
use ort::session::{Session, builder::GraphOptimizationLevel};
use pdftab_core::{BBox, Detection, Frame, Label, ObjectDetector};

use crate::error::BackendError;

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Score a class must exceed for a detection to be kept.
pub const DEFAULT_THRESHOLD: f32 = 0.8;

/// Model and pre/post-processing settings for one detector.
#[derive(Debug, Clone, PartialEq)]
pub struct DetrConfig {
    /// Path to the ONNX export.
    pub model_path: PathBuf,
    /// Class index to label map, without the no-object class.
    pub labels: Vec<Label>,
    /// Target length of the image's shorter side.
    pub shortest_edge: u32,
    /// Upper bound on the image's longer side after resizing.
    pub longest_edge: u32,
    /// Minimum class probability (exclusive).
    pub threshold: f32,
    /// Intra-op threads for the session (default: all available cores).
    pub intra_threads: Option<usize>,
}

impl DetrConfig {
    /// Settings for the table detection model (`table`, `table rotated`).
    pub fn table_detection(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            labels: vec![Label::Table, Label::TableRotated],
            shortest_edge: 800,
            longest_edge: 1333,
            threshold: DEFAULT_THRESHOLD,
            intra_threads: None,
        }
    }

    /// Settings for the table structure recognition model (rows, columns,
    /// headers, spanning cells).
    pub fn structure_recognition(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            labels: vec![
                Label::Table,
                Label::TableColumn,
                Label::TableRow,
                Label::TableColumnHeader,
                Label::TableProjectedRowHeader,
                Label::TableSpanningCell,
            ],
            shortest_edge: 800,
            longest_edge: 1000,
            threshold: DEFAULT_THRESHOLD,
            intra_threads: None,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }
}

/// A Table Transformer ONNX session plus its configuration.
///
/// Sessions need exclusive access to run, so the session sits behind a
/// mutex and [`detect`](ObjectDetector::detect) can take `&self`.
pub struct DetrDetector {
    session: Mutex<Session>,
    config: DetrConfig,
}

impl std::fmt::Debug for DetrDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetrDetector")
            .field("session", &"<Session>")
            .field("config", &self.config)
            .finish()
    }
}

impl DetrDetector {
    /// Load the model named by `config`.
    pub fn load(config: DetrConfig) -> Result<Self, BackendError> {
        let session = build_session(&config.model_path, config.intra_threads)?;
        tracing::debug!(
            model = %config.model_path.display(),
            labels = config.labels.len(),
            "loaded detection model"
        );
        Ok(Self {
            session: Mutex::new(session),
            config,
        })
    }

    pub fn config(&self) -> &DetrConfig {
        &self.config
    }
}

fn build_session(model_path: &Path, intra_threads: Option<usize>) -> Result<Session, BackendError> {
    if !model_path.exists() {
        return Err(BackendError::Model(format!(
            "model file not found: {}",
            model_path.display()
        )));
    }

    let threads = intra_threads
        .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
        .unwrap_or(1);

    Session::builder()
        .map_err(|e| model_error(model_path, e))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| model_error(model_path, e))?
        .with_intra_threads(threads)
        .map_err(|e| model_error(model_path, e))?
        .commit_from_file(model_path)
        .map_err(|e| model_error(model_path, e))
}

fn model_error(model_path: &Path, err: impl std::fmt::Display) -> BackendError {
    BackendError::Model(format!("{}: {err}", model_path.display()))
}

impl ObjectDetector for DetrDetector {
    type Error = BackendError;

    fn detect<F: Frame>(&self, image: &RgbImage) -> Result<Vec<Detection<F>>, BackendError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }

        let input = pixel_values(image, self.config.shortest_edge, self.config.longest_edge);
        let shape = input.shape().to_vec();
        let data = input
            .as_slice()
            .ok_or_else(|| BackendError::Inference("input tensor is not contiguous".to_string()))?;
        let input_value = ort::value::Value::from_array((shape.as_slice(), data.to_vec()))
            .map_err(|e| BackendError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| BackendError::Inference("session lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs!["pixel_values" => input_value])
            .map_err(|e| BackendError::Inference(e.to_string()))?;

        // logits: [1, queries, classes + 1], pred_boxes: [1, queries, 4]
        let (logits_shape, logits) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| BackendError::Inference(e.to_string()))?;
        let (_, boxes) = outputs[1]
            .try_extract_tensor::<f32>()
            .map_err(|e| BackendError::Inference(e.to_string()))?;

        if logits_shape.len() != 3 {
            return Err(BackendError::Inference(format!(
                "expected 3-D logits, got {} dimensions",
                logits_shape.len()
            )));
        }
        let queries = logits_shape[1] as usize;
        let classes = logits_shape[2] as usize;

        let detections = decode_detections(
            logits,
            boxes,
            queries,
            classes,
            &self.config.labels,
            self.config.threshold,
            (width, height),
        )?;
        tracing::debug!(
            queries,
            kept = detections.len(),
            width,
            height,
            "ran detection model"
        );
        Ok(detections)
    }
}

/// Output size for the DETR resize rule.
///
/// Scales the shorter side to `shortest_edge`, unless that would push the
/// longer side past `longest_edge`, in which case the longer side is capped
/// and the shorter one follows the aspect ratio.
pub(crate) fn resized_dimensions(
    width: u32,
    height: u32,
    shortest_edge: u32,
    longest_edge: u32,
) -> (u32, u32) {
    let (w, h) = (f64::from(width), f64::from(height));
    let (min_side, max_side) = (w.min(h), w.max(h));
    let mut size = f64::from(shortest_edge);
    if max_side / min_side * size > f64::from(longest_edge) {
        size = (f64::from(longest_edge) * min_side / max_side).round_ties_even();
    }

    if width < height {
        (size as u32, (size * h / w) as u32)
    } else {
        ((size * w / h) as u32, size as u32)
    }
}

/// Resize and normalize an image into a `[1, 3, H, W]` tensor.
pub(crate) fn pixel_values(
    image: &RgbImage,
    shortest_edge: u32,
    longest_edge: u32,
) -> Array4<f32> {
    let (width, height) =
        resized_dimensions(image.width(), image.height(), shortest_edge, longest_edge);
    let resized = imageops::resize(image, width.max(1), height.max(1), FilterType::Triangle);

    Array4::from_shape_fn(
        (1, 3, resized.height() as usize, resized.width() as usize),
        |(_, c, y, x)| {
            let value = f32::from(resized.get_pixel(x as u32, y as u32)[c]) / 255.0;
            (value - IMAGENET_MEAN[c]) / IMAGENET_STD[c]
        },
    )
}

/// Turn raw model outputs into thresholded detections in pixel space.
///
/// `logits` is `queries x classes` (the last class is no-object), `boxes` is
/// `queries x 4` normalized `(cx, cy, w, h)`. Query order is kept.
pub(crate) fn decode_detections<F: Frame>(
    logits: &[f32],
    boxes: &[f32],
    queries: usize,
    classes: usize,
    labels: &[Label],
    threshold: f32,
    (width, height): (u32, u32),
) -> Result<Vec<Detection<F>>, BackendError> {
    if classes < 2 {
        return Err(BackendError::Inference(format!(
            "expected at least 2 classes, got {classes}"
        )));
    }
    if logits.len() < queries * classes || boxes.len() < queries * 4 {
        return Err(BackendError::Inference(format!(
            "output tensors too small for {queries} queries ({} logits, {} box values)",
            logits.len(),
            boxes.len()
        )));
    }

    let (img_w, img_h) = (f64::from(width), f64::from(height));
    let mut detections = Vec::new();

    for q in 0..queries {
        let row = &logits[q * classes..(q + 1) * classes];
        let max_logit = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exp: Vec<f32> = row.iter().map(|l| (l - max_logit).exp()).collect();
        let total: f32 = exp.iter().sum();

        let Some((class, prob)) = exp[..classes - 1]
            .iter()
            .map(|e| e / total)
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (i, p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((i, p)),
            })
        else {
            continue;
        };
        if prob <= threshold {
            continue;
        }
        let Some(&label) = labels.get(class) else {
            continue;
        };

        let b = &boxes[q * 4..q * 4 + 4];
        let (cx, cy, w, h) = (
            f64::from(b[0]),
            f64::from(b[1]),
            f64::from(b[2]),
            f64::from(b[3]),
        );
        let bbox = BBox::new(
            (cx - 0.5 * w) * img_w,
            (cy - 0.5 * h) * img_h,
            (cx + 0.5 * w) * img_w,
            (cy + 0.5 * h) * img_h,
        );
        detections.push(Detection::new(label, prob, bbox));
    }

    Ok(detections)
}
