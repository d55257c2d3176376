//! pdftab-backend: concrete collaborators for the pdftab pipeline.
//!
//! - [`PdfiumDocument`]: renders pages and answers text-in-box queries
//!   through pdfium ([`Rasterizer`](pdftab_core::Rasterizer) +
//!   [`TextQuery`](pdftab_core::TextQuery)).
//! - [`DetrDetector`]: runs a Table Transformer ONNX export
//!   ([`ObjectDetector`](pdftab_core::ObjectDetector)), configured either
//!   for table detection or for structure recognition.

pub mod detr;
pub mod error;
pub mod pdfium;

pub use detr::{DetrConfig, DetrDetector};
pub use error::BackendError;
pub use pdfium::{PdfiumDocument, bind_pdfium};
pub use pdfium_render::prelude::Pdfium;
