//! Error types for the rendering and detection backends.
//!
//! Uses [`thiserror`] for ergonomic error derivation. Provides [`BackendError`]
//! that wraps backend-specific errors and converts them to [`TableError`].

use pdfium_render::prelude::PdfiumError;
use pdftab_core::TableError;
use thiserror::Error;

/// Error type for pdfium and ONNX Runtime backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The pdfium shared library could not be loaded.
    #[error("cannot bind pdfium library: {0}")]
    Bind(String),

    /// Error reported by pdfium while loading or rendering.
    #[error("pdfium error: {0}")]
    Pdfium(#[from] PdfiumError),

    /// A rendered bitmap could not be converted to an image.
    #[error("render error: {0}")]
    Render(String),

    /// Error reading a page's text layer.
    #[error("text layer error: {0}")]
    TextLayer(String),

    /// A model file could not be loaded into a session.
    #[error("model error: {0}")]
    Model(String),

    /// Inference failed or produced tensors of an unexpected shape.
    #[error("inference error: {0}")]
    Inference(String),

    /// Error reading files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A page index outside the document was requested.
    #[error("page {page} out of range (document has {page_count} pages)")]
    InvalidPage { page: usize, page_count: usize },

    /// A core library error.
    #[error(transparent)]
    Core(#[from] TableError),
}

impl From<BackendError> for TableError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Bind(msg) => {
                TableError::Other(format!("cannot bind pdfium library: {msg}"))
            }
            BackendError::Pdfium(e) => TableError::Render(e.to_string()),
            BackendError::Render(msg) => TableError::Render(msg),
            BackendError::TextLayer(msg) => TableError::TextQuery(msg),
            BackendError::Model(msg) => TableError::Model(msg),
            BackendError::Inference(msg) => TableError::Detection(msg),
            BackendError::Io(e) => TableError::Io(e.to_string()),
            BackendError::InvalidPage { page, page_count } => {
                TableError::InvalidPage { page, page_count }
            }
            BackendError::Core(e) => e,
        }
    }
}
