use std::path::Path;

use pdftab::{DetrConfig, ExtractOptions, ExtractedTable, TableExtractor, TableRecord};

use crate::cli::{DocumentArgs, OutputFormat};
use crate::shared::{
    check_file, csv_escape, load_detector, load_pdfium, prepare, print_json, report_warnings,
};

pub fn run(
    document: &DocumentArgs,
    format: &OutputFormat,
    output_dir: Option<&Path>,
    structure_model: &Path,
    padding: f64,
    no_header: bool,
    dump_pages: Option<&Path>,
) -> Result<(), i32> {
    check_file(&document.file, "file")?;
    check_file(&document.detection_model, "model")?;
    check_file(structure_model, "model")?;

    let pdfium = load_pdfium(document.pdfium_lib.as_deref())?;
    let (doc, table_detector, pages) = prepare(&pdfium, document)?;
    let structure_detector = load_detector(
        DetrConfig::structure_recognition(structure_model).with_threshold(document.threshold),
    )?;

    let options = ExtractOptions {
        padding,
        dpi: document.dpi,
        first_row_header: !no_header,
        pages: Some(pages),
        page_image_dir: dump_pages.map(Path::to_path_buf),
        ..ExtractOptions::default()
    };
    let extractor = TableExtractor::new(&doc, &table_detector, &structure_detector, options);
    let result = extractor.extract_tables();
    report_warnings(&result.warnings);

    match format {
        OutputFormat::Text => write_grid(&result.value),
        OutputFormat::Json => write_json(&result.value),
        OutputFormat::Csv => match output_dir {
            Some(dir) => write_csv_files(&result.value, dir),
            None => write_csv(&result.value),
        },
    }
}

fn write_grid(tables: &[ExtractedTable]) -> Result<(), i32> {
    for (num, table) in tables.iter().enumerate() {
        let [x0, y0, x1, y1] = table.bbox.to_xyxy();
        println!(
            "--- Table {} (page {}, bbox: [{x0:.1}, {y0:.1}, {x1:.1}, {y1:.1}]) ---",
            num + 1,
            table.page + 1,
        );
        for line in grid_lines(&table.record) {
            println!("{line}");
        }
        println!();
    }

    if tables.is_empty() {
        println!("No tables found.");
    }
    Ok(())
}

/// Render a record as `|`-separated rows with aligned columns. A header, if
/// any, is followed by a rule.
fn grid_lines(record: &TableRecord) -> Vec<String> {
    let labels = record.header().map(|_| record.column_labels());
    let mut widths = vec![1usize; record.column_count()];
    for row in labels.iter().chain(record.rows()) {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |row: &[String]| {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        format!("| {} |", cells.join(" | "))
    };

    let mut lines = Vec::with_capacity(record.row_count() + 2);
    if let Some(labels) = &labels {
        lines.push(format_row(labels));
        let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
        lines.push(format!("|-{}-|", rule.join("-|-")));
    }
    lines.extend(record.rows().iter().map(|row| format_row(row)));
    lines
}

fn write_json(tables: &[ExtractedTable]) -> Result<(), i32> {
    let tables: Vec<serde_json::Value> = tables
        .iter()
        .map(|table| {
            serde_json::json!({
                "page": table.page + 1,
                "index": table.index,
                "score": table.score,
                "bbox": table.bbox,
                "header": table.record.header(),
                "rows": table.record.rows(),
            })
        })
        .collect();
    print_json(&tables)
}

/// One `table_{i}.csv` per table, numbered from 0 across the document.
fn write_csv_files(tables: &[ExtractedTable], dir: &Path) -> Result<(), i32> {
    std::fs::create_dir_all(dir).map_err(|e| {
        eprintln!("Error: cannot create {}: {e}", dir.display());
        1
    })?;

    for (i, table) in tables.iter().enumerate() {
        let path = dir.join(format!("table_{i}.csv"));
        let mut contents = csv_lines(&table.record).join("\n");
        contents.push('\n');
        std::fs::write(&path, contents).map_err(|e| {
            eprintln!("Error: cannot write {}: {e}", path.display());
            1
        })?;
        tracing::debug!(path = %path.display(), "wrote table");
    }
    eprintln!("Wrote {} table(s) to {}", tables.len(), dir.display());
    Ok(())
}

fn write_csv(tables: &[ExtractedTable]) -> Result<(), i32> {
    for (num, table) in tables.iter().enumerate() {
        if num > 0 {
            println!();
        }
        for line in csv_lines(&table.record) {
            println!("{line}");
        }
    }
    Ok(())
}

/// Column labels, then one line per data row.
fn csv_lines(record: &TableRecord) -> Vec<String> {
    let join = |row: &[String]| {
        row.iter()
            .map(|cell| csv_escape(cell))
            .collect::<Vec<_>>()
            .join(",")
    };
    std::iter::once(join(&record.column_labels()))
        .chain(record.rows().iter().map(|row| join(row)))
        .collect()
}
