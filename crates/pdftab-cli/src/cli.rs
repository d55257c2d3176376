use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Find and reconstruct tables in PDF documents.
#[derive(Debug, Parser)]
#[command(name = "pdftab", about, version)]
pub struct Cli {
    /// Increase log verbosity (-v: debug, -vv: trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconstruct the tables of PDF pages as text grids
    Tables {
        #[command(flatten)]
        document: DocumentArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// With --format csv, write one table_{i}.csv per table into this directory
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Path to the table structure recognition ONNX model
        #[arg(long, env = "PDFTAB_STRUCTURE_MODEL", value_name = "MODEL")]
        structure_model: PathBuf,

        /// Pixels of context added around each table before structure recognition
        #[arg(long, default_value_t = 50.0)]
        padding: f64,

        /// Keep the first row as data instead of using it as the header
        #[arg(long)]
        no_header: bool,

        /// Write every rendered page as PNG into this directory
        #[arg(long, value_name = "DIR")]
        dump_pages: Option<PathBuf>,
    },

    /// List the table regions found on PDF pages
    Detect {
        #[command(flatten)]
        document: DocumentArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Input document, page selection and the table detector.
#[derive(Debug, Args)]
pub struct DocumentArgs {
    /// Path to the PDF file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Page range (e.g. '1,3-5'). Default: all pages
    #[arg(long)]
    pub pages: Option<String>,

    /// Path to the table detection ONNX model
    #[arg(long, env = "PDFTAB_DETECTION_MODEL", value_name = "MODEL")]
    pub detection_model: PathBuf,

    /// Minimum detection confidence (exclusive) for both models
    #[arg(long, default_value_t = 0.8)]
    pub threshold: f32,

    /// Rendering resolution in dots per inch
    #[arg(long, default_value_t = 300.0)]
    pub dpi: f64,

    /// Directory holding the pdfium shared library
    #[arg(long, env = "PDFIUM_LIB_DIR", value_name = "DIR")]
    pub pdfium_lib: Option<PathBuf>,
}

/// Output format for the tables and detect subcommands.
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Aligned plain text
    Text,
    /// JSON output
    Json,
    /// CSV output
    Csv,
}
