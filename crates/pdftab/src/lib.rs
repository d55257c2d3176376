//! pdftab: Reconstruct tables from PDF pages.
//!
//! This is the public API facade crate for pdftab. It re-exports types from
//! pdftab-core and the pdfium / ONNX Runtime collaborators from
//! pdftab-backend, and provides the table assembler and the page driver.
//!
//! # Architecture
//!
//! - **pdftab-core**: Backend-independent geometry, sorting, grid synthesis and records
//! - **pdftab-backend**: pdfium document and Table Transformer detectors
//! - **pdftab** (this crate): Table assembly and the document driver
//!
//! # Example
//!
//! ```ignore
//! use pdftab::{
//!     DetrConfig, DetrDetector, ExtractOptions, PdfiumDocument, TableExtractor, bind_pdfium,
//! };
//!
//! let pdfium = bind_pdfium(None)?;
//! let doc = PdfiumDocument::open(&pdfium, "report.pdf".as_ref())?;
//! let tables = DetrDetector::load(DetrConfig::table_detection("detection.onnx"))?;
//! let structure = DetrDetector::load(DetrConfig::structure_recognition("structure.onnx"))?;
//!
//! let extractor = TableExtractor::new(&doc, &tables, &structure, ExtractOptions::default());
//! let result = extractor.extract_tables();
//! for warning in &result.warnings {
//!     eprintln!("{warning}");
//! }
//! ```

pub mod assembler;
pub mod extractor;

pub use pdftab_backend;
pub use pdftab_core;

pub use assembler::{AssembleOutcome, ExtractedTable, TableAssembler, TableRegion, crop_region};
pub use extractor::TableExtractor;
pub use pdftab_backend::{
    BackendError, DetrConfig, DetrDetector, Pdfium, PdfiumDocument, bind_pdfium,
};
pub use pdftab_core::{
    BBox, Detection, ExtractOptions, ExtractResult, ExtractWarning, ExtractWarningCode, Grid,
    Label, ObjectDetector, PagePixels, PdfSpace, Rasterizer, TableError, TableRecord, TextQuery,
};
