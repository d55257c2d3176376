mod cli;
mod detect_cmd;
mod page_range;
mod shared;
mod tables_cmd;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        cli::Commands::Tables {
            ref document,
            ref format,
            ref output_dir,
            ref structure_model,
            padding,
            no_header,
            ref dump_pages,
        } => tables_cmd::run(
            document,
            format,
            output_dir.as_deref(),
            structure_model,
            padding,
            no_header,
            dump_pages.as_deref(),
        ),
        cli::Commands::Detect {
            ref document,
            ref format,
        } => detect_cmd::run(document, format),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
