//! Error and warning types for pdftab.
//!
//! Provides [`TableError`] for collaborator failures that stop the current
//! page, [`ExtractWarning`] for per-table or per-page issues that allow
//! best-effort continuation, [`ExtractResult`] for pairing a value with
//! collected warnings, and [`ExtractOptions`] for configuring extraction.

use std::fmt;
use std::path::PathBuf;

use crate::transform::{DEFAULT_DPI, DEFAULT_PADDING, MalformedBox};

/// Fatal error types for table extraction.
///
/// These are raised by collaborators (renderer, detectors, text layer) and
/// abort the page they occur on.
#[derive(Debug, Clone, PartialEq)]
pub enum TableError {
    /// The page could not be rendered, or its size could not be read.
    Render(String),
    /// An object detector failed to run.
    Detection(String),
    /// The text layer could not be queried.
    TextQuery(String),
    /// I/O error reading or writing files.
    Io(String),
    /// A detection model could not be loaded or has an unexpected shape.
    Model(String),
    /// A page index outside the document was requested.
    InvalidPage {
        /// Requested page (0-indexed).
        page: usize,
        /// Number of pages in the document.
        page_count: usize,
    },
    /// Any other error not covered by specific variants.
    Other(String),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Render(msg) => write!(f, "render error: {msg}"),
            TableError::Detection(msg) => write!(f, "detection error: {msg}"),
            TableError::TextQuery(msg) => write!(f, "text query error: {msg}"),
            TableError::Io(msg) => write!(f, "I/O error: {msg}"),
            TableError::Model(msg) => write!(f, "model error: {msg}"),
            TableError::InvalidPage { page, page_count } => write!(
                f,
                "page {page} out of range (document has {page_count} pages)"
            ),
            TableError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for TableError {}

impl From<std::io::Error> for TableError {
    fn from(err: std::io::Error) -> Self {
        TableError::Io(err.to_string())
    }
}

/// Machine-readable warning code for categorizing extraction issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExtractWarningCode {
    /// The structure detector found no rows or no columns in a table region.
    DetectionEmpty,
    /// A box became degenerate (NaN, infinite or inverted) while being
    /// mapped to PDF space.
    MalformedBox,
    /// The extracted cell text did not form a rectangular table.
    IrregularGrid,
    /// A collaborator (renderer, detector, text layer) failed on a page.
    CollaboratorFailure,
}

impl ExtractWarningCode {
    /// Returns the string tag for this warning code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractWarningCode::DetectionEmpty => "DETECTION_EMPTY",
            ExtractWarningCode::MalformedBox => "MALFORMED_BOX",
            ExtractWarningCode::IrregularGrid => "IRREGULAR_GRID",
            ExtractWarningCode::CollaboratorFailure => "COLLABORATOR_FAILURE",
        }
    }
}

impl fmt::Display for ExtractWarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal issue encountered during extraction.
///
/// Carries a structured [`code`](ExtractWarning::code), a human-readable
/// description, and the page and table it concerns when known.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractWarning {
    /// Machine-readable warning code.
    pub code: ExtractWarningCode,
    /// Human-readable description of the warning.
    pub description: String,
    /// Page the warning concerns (0-indexed), if applicable.
    pub page: Option<usize>,
    /// Index of the table on its page (detector order), if applicable.
    pub table: Option<usize>,
}

impl ExtractWarning {
    /// Create a warning with a code and description.
    pub fn with_code(code: ExtractWarningCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            page: None,
            table: None,
        }
    }

    /// A table was skipped because the structure detector found no rows or
    /// columns.
    pub fn detection_empty(page: usize, table: usize, rows: usize, columns: usize) -> Self {
        Self::with_code(
            ExtractWarningCode::DetectionEmpty,
            format!("structure detection found {rows} rows and {columns} columns"),
        )
        .at(page, Some(table))
    }

    /// A table was skipped because one of its boxes could not be mapped.
    pub fn malformed_box(page: usize, table: usize, err: &MalformedBox) -> Self {
        Self::with_code(ExtractWarningCode::MalformedBox, err.to_string()).at(page, Some(table))
    }

    /// A table was skipped because its rows had differing lengths.
    pub fn irregular_grid(page: usize, table: usize, detail: impl fmt::Display) -> Self {
        Self::with_code(ExtractWarningCode::IrregularGrid, detail.to_string())
            .at(page, Some(table))
    }

    /// A collaborator failed. Call [`at`](Self::at) to attach the table it
    /// happened in.
    pub fn collaborator_failure(page: usize, err: &TableError) -> Self {
        Self::with_code(ExtractWarningCode::CollaboratorFailure, err.to_string()).at(page, None)
    }

    /// Attach page and table context, returning the modified warning.
    pub fn at(mut self, page: usize, table: Option<usize>) -> Self {
        self.page = Some(page);
        self.table = table;
        self
    }
}

impl fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)?;
        if let Some(page) = self.page {
            write!(f, " (page {page})")?;
        }
        if let Some(table) = self.table {
            write!(f, " [table #{table}]")?;
        }
        Ok(())
    }
}

/// Result wrapper that pairs a value with collected warnings.
///
/// Used when extraction can partially succeed with non-fatal issues.
#[derive(Debug, Clone)]
pub struct ExtractResult<T> {
    /// The extracted value.
    pub value: T,
    /// Warnings collected during extraction.
    pub warnings: Vec<ExtractWarning>,
}

impl<T> ExtractResult<T> {
    /// Create a result with no warnings.
    pub fn ok(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Create a result with warnings.
    pub fn with_warnings(value: T, warnings: Vec<ExtractWarning>) -> Self {
        Self { value, warnings }
    }

    /// Returns true if there are no warnings.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Transform the value while preserving warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ExtractResult<U> {
        ExtractResult {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

/// Options controlling table extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Pixels added on every side of a detected table before structure
    /// recognition (default: 50).
    pub padding: f64,
    /// Rendering resolution in dots per inch (default: 300).
    pub dpi: f64,
    /// Promote the first extracted row of each table to its header when the
    /// table has more than one row (default: true).
    pub first_row_header: bool,
    /// Whether to collect warnings during extraction (default: true).
    pub collect_warnings: bool,
    /// 0-indexed pages to process, in the order given (default: None = all).
    pub pages: Option<Vec<usize>>,
    /// Directory to write each rendered page into as `page_{n}.png`
    /// (default: None).
    pub page_image_dir: Option<PathBuf>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            dpi: DEFAULT_DPI,
            first_row_header: true,
            collect_warnings: true,
            pages: None,
            page_image_dir: None,
        }
    }
}
