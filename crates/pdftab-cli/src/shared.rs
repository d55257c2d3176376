use std::path::Path;

use pdftab::{
    DetrConfig, DetrDetector, ExtractWarning, Pdfium, PdfiumDocument, Rasterizer, bind_pdfium,
};

use crate::cli::DocumentArgs;
use crate::page_range::parse_page_range;

/// Bind pdfium, printing a hint on failure.
pub fn load_pdfium(lib_dir: Option<&Path>) -> Result<Pdfium, i32> {
    bind_pdfium(lib_dir).map_err(|e| {
        eprintln!("Error: {e}");
        eprintln!("hint: pass --pdfium-lib DIR or set PDFIUM_LIB_DIR");
        1
    })
}

/// Open a PDF file with user-friendly error messages.
pub fn open_document<'a>(pdfium: &'a Pdfium, file: &Path) -> Result<PdfiumDocument<'a>, i32> {
    PdfiumDocument::open(pdfium, file).map_err(|e| {
        eprintln!("Error: failed to open PDF: {e}");
        1
    })
}

/// Load an ONNX detector.
pub fn load_detector(config: DetrConfig) -> Result<DetrDetector, i32> {
    DetrDetector::load(config).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })
}

/// Everything the subcommands share: the open document, the table detector
/// and the selected pages.
pub fn prepare<'a>(
    pdfium: &'a Pdfium,
    args: &DocumentArgs,
) -> Result<(PdfiumDocument<'a>, DetrDetector, Vec<usize>), i32> {
    let doc = open_document(pdfium, &args.file)?;
    let pages = resolve_pages(args.pages.as_deref(), doc.page_count())?;
    let detector = load_detector(
        DetrConfig::table_detection(&args.detection_model).with_threshold(args.threshold),
    )?;
    Ok((doc, detector, pages))
}

/// Resolve an optional page range string into 0-indexed page indices.
///
/// If `pages` is `None`, returns all pages (0..page_count).
pub fn resolve_pages(pages: Option<&str>, page_count: usize) -> Result<Vec<usize>, i32> {
    match pages {
        Some(range) => parse_page_range(range, page_count).map_err(|e| {
            eprintln!("Error: {e}");
            1
        }),
        None => Ok((0..page_count).collect()),
    }
}

/// Fail early, before pdfium or a model is loaded, when an input is missing.
pub fn check_file(path: &Path, what: &str) -> Result<(), i32> {
    if path.is_file() {
        Ok(())
    } else {
        eprintln!("Error: {what} not found: {}", path.display());
        Err(1)
    }
}

/// Print extraction warnings to stderr.
pub fn report_warnings(warnings: &[ExtractWarning]) {
    for warning in warnings {
        eprintln!("Warning: {warning}");
    }
}

/// Escape a string for CSV output.
///
/// Text containing commas, double quotes, or line breaks is wrapped in
/// double quotes, with internal double quotes doubled.
pub fn csv_escape(text: &str) -> String {
    if text.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

/// Serialize `value` as one line of JSON on stdout.
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), i32> {
    let json = serde_json::to_string(value).map_err(|e| {
        eprintln!("Error: failed to serialize output: {e}");
        1
    })?;
    println!("{json}");
    Ok(())
}
