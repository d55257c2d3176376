use pdftab::{ExtractOptions, ExtractWarning, TableExtractor, TableRegion};
use serde::Serialize;

use crate::cli::{DocumentArgs, OutputFormat};
use crate::shared::{check_file, load_pdfium, prepare, print_json, report_warnings};

#[derive(Serialize)]
struct DetectOutput<'a> {
    regions: &'a [TableRegion],
    warnings: &'a [ExtractWarning],
}

pub fn run(document: &DocumentArgs, format: &OutputFormat) -> Result<(), i32> {
    check_file(&document.file, "file")?;
    check_file(&document.detection_model, "model")?;

    let pdfium = load_pdfium(document.pdfium_lib.as_deref())?;
    let (doc, table_detector, pages) = prepare(&pdfium, document)?;

    let options = ExtractOptions {
        dpi: document.dpi,
        ..ExtractOptions::default()
    };
    // Structure recognition is not run, so the table detector stands in.
    let extractor = TableExtractor::new(&doc, &table_detector, &table_detector, options);

    let mut regions = Vec::new();
    let mut warnings = Vec::new();
    for page in pages {
        match extractor.detect_regions(page) {
            Ok(found) => regions.extend(found),
            Err(err) => warnings.push(ExtractWarning::collaborator_failure(page, &err)),
        }
    }
    report_warnings(&warnings);

    match format {
        OutputFormat::Text => {
            write_text(&regions);
            Ok(())
        }
        OutputFormat::Json => print_json(&DetectOutput {
            regions: &regions,
            warnings: &warnings,
        }),
        OutputFormat::Csv => {
            println!("page,index,score,x0,y0,x1,y1");
            for line in regions.iter().map(csv_line) {
                println!("{line}");
            }
            Ok(())
        }
    }
}

fn write_text(regions: &[TableRegion]) {
    if regions.is_empty() {
        println!("No tables found.");
        return;
    }
    println!("page\tindex\tscore\tx0\ty0\tx1\ty1");
    for region in regions {
        let [x0, y0, x1, y1] = region.bbox.to_xyxy();
        println!(
            "{}\t{}\t{:.3}\t{x0:.1}\t{y0:.1}\t{x1:.1}\t{y1:.1}",
            region.page + 1,
            region.index,
            region.score,
        );
    }
}

/// One region with its 1-indexed page and page-pixel box.
fn csv_line(region: &TableRegion) -> String {
    let [x0, y0, x1, y1] = region.bbox.to_xyxy();
    format!(
        "{},{},{:.3},{x0:.1},{y0:.1},{x1:.1},{y1:.1}",
        region.page + 1,
        region.index,
        region.score
    )
}
