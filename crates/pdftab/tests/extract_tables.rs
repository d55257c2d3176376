//! Integration tests for the table extractor, driven by in-memory
//! collaborators.

mod common;

use common::*;
use pdftab::{ExtractOptions, ExtractWarningCode, TableError, TableExtractor};

const UPPER_REGION: [f64; 4] = [100.0, 100.0, 500.0, 400.0];
const LOWER_REGION: [f64; 4] = [100.0, 1500.0, 700.0, 1900.0];

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

/// One page, one table with a 2x3 structure and a word in every cell.
fn invoice_page() -> FakeDocument {
    FakeDocument::letter(1)
        .with_word(0, 40.0, 750.0, "Item")
        .with_word(0, 70.0, 750.0, "Qty")
        .with_word(0, 100.0, 750.0, "Price")
        .with_word(0, 40.0, 714.0, "Widget")
        .with_word(0, 70.0, 714.0, "3")
        .with_word(0, 100.0, 714.0, "1.50")
}

// --- Single table ---

#[test]
fn two_by_three_table_is_reconstructed() {
    let doc = invoice_page();
    let tables = FakeTableDetector::default().on_page(0, vec![table(UPPER_REGION)]);
    let structure = FakeStructureDetector::always(two_by_three_structure());
    let options = ExtractOptions {
        first_row_header: false,
        ..ExtractOptions::default()
    };

    let result = TableExtractor::new(&doc, &tables, &structure, options).extract_tables();
    assert!(result.is_clean(), "{:?}", result.warnings);
    assert_eq!(result.value.len(), 1);

    let extracted = &result.value[0];
    assert_eq!(extracted.page, 0);
    assert_eq!(extracted.index, 0);
    assert_eq!(extracted.grid.row_count(), 2);
    assert_eq!(extracted.grid.column_count(), 3);

    // Row 0 sits above row 1 in bottom-left-origin coordinates.
    let top = extracted.grid.cell(0, 0).unwrap();
    let bottom = extracted.grid.cell(1, 0).unwrap();
    assert!(top.y0 > bottom.y0);
    assert_close(top.y0, 732.0);
    assert_close(top.y1, 768.0);
    assert_close(bottom.y0, 696.0);

    assert!(extracted.record.header().is_none());
    assert_eq!(
        extracted.record.rows(),
        &[
            vec!["Item".to_string(), "Qty".to_string(), "Price".to_string()],
            vec!["Widget".to_string(), "3".to_string(), "1.50".to_string()],
        ]
    );
}

#[test]
fn first_row_becomes_header_by_default() {
    let doc = invoice_page();
    let tables = FakeTableDetector::default().on_page(0, vec![table(UPPER_REGION)]);
    let structure = FakeStructureDetector::always(two_by_three_structure());

    let result =
        TableExtractor::new(&doc, &tables, &structure, ExtractOptions::default()).extract_tables();
    let record = &result.value[0].record;
    assert_eq!(record.column_labels(), vec!["Item", "Qty", "Price"]);
    assert_eq!(record.row_count(), 1);
    assert_eq!(record.get(0, "Price"), Some("1.50"));
}

#[test]
fn table_bbox_is_in_pdf_space() {
    let doc = invoice_page();
    let tables = FakeTableDetector::default().on_page(0, vec![table(UPPER_REGION)]);
    let structure = FakeStructureDetector::always(two_by_three_structure());

    let result =
        TableExtractor::new(&doc, &tables, &structure, ExtractOptions::default()).extract_tables();
    let bbox = result.value[0].bbox;
    assert_close(bbox.x0, 24.0);
    assert_close(bbox.y0, 696.0);
    assert_close(bbox.x1, 120.0);
    assert_close(bbox.y1, 768.0);
}

#[test]
fn cell_text_is_normalized() {
    let doc = invoice_page()
        .with_word(0, 100.0, 720.0, "each\t\tnet")
        .with_word(0, 40.0, 760.0, "Line\r\nItem");
    let tables = FakeTableDetector::default().on_page(0, vec![table(UPPER_REGION)]);
    let structure = FakeStructureDetector::always(two_by_three_structure());
    let options = ExtractOptions {
        first_row_header: false,
        ..ExtractOptions::default()
    };

    let result = TableExtractor::new(&doc, &tables, &structure, options).extract_tables();
    let rows = result.value[0].record.rows();
    assert_eq!(rows[0][0], "Item Line Item");
    assert_eq!(rows[1][2], "1.50 each net");
    assert!(rows.iter().flatten().all(|cell| !cell.contains("  ")));
}

#[test]
fn structure_detector_sees_padded_crop() {
    let doc = invoice_page();
    let tables = FakeTableDetector::default().on_page(0, vec![table(UPPER_REGION)]);
    let structure = FakeStructureDetector::always(two_by_three_structure());

    TableExtractor::new(&doc, &tables, &structure, ExtractOptions::default()).extract_tables();
    assert_eq!(*structure.crops.lock().unwrap(), vec![(500, 400)]);
}

#[test]
fn padding_option_changes_crop_and_mapping() {
    let doc = invoice_page();
    let tables = FakeTableDetector::default().on_page(0, vec![table(UPPER_REGION)]);
    // Same boxes as the 50px layout, shifted by the 20px smaller margin.
    let shifted = two_by_three_structure()
        .into_iter()
        .map(|mut s| {
            for c in &mut s.coords {
                *c -= 20.0;
            }
            s
        })
        .collect();
    let structure = FakeStructureDetector::always(shifted);
    let options = ExtractOptions {
        padding: 30.0,
        first_row_header: false,
        ..ExtractOptions::default()
    };

    let result = TableExtractor::new(&doc, &tables, &structure, options).extract_tables();
    assert_eq!(*structure.crops.lock().unwrap(), vec![(460, 360)]);
    let cell = result.value[0].grid.cell(0, 0).unwrap();
    assert_close(cell.x0, 24.0);
    assert_close(cell.y1, 768.0);
    assert_eq!(result.value[0].record.rows()[0][1], "Qty");
}

// --- Skipped tables ---

#[test]
fn table_without_rows_is_skipped() {
    let doc = invoice_page();
    let tables = FakeTableDetector::default().on_page(0, vec![table(UPPER_REGION)]);
    let structure = FakeStructureDetector::always(vec![
        column([50.0, 50.0, 180.0, 350.0]),
        column([180.0, 50.0, 320.0, 350.0]),
    ]);

    let result =
        TableExtractor::new(&doc, &tables, &structure, ExtractOptions::default()).extract_tables();
    assert!(result.value.is_empty());
    assert_eq!(result.warnings.len(), 1);
    let warning = &result.warnings[0];
    assert_eq!(warning.code, ExtractWarningCode::DetectionEmpty);
    assert_eq!(warning.page, Some(0));
    assert_eq!(warning.table, Some(0));
    assert_eq!(doc.query_count(), 0);
}

#[test]
fn skipped_table_does_not_stop_the_next_one() {
    let doc = FakeDocument::letter(1);
    let tables = FakeTableDetector::default()
        .on_page(0, vec![table(UPPER_REGION), table(LOWER_REGION)]);
    // Only the lower table's crop gets a structure.
    let structure =
        FakeStructureDetector::default().for_crop(700, 500, two_by_two_structure(600.0, 400.0));

    let result =
        TableExtractor::new(&doc, &tables, &structure, ExtractOptions::default()).extract_tables();
    assert_eq!(result.value.len(), 1);
    assert_eq!(result.value[0].index, 1);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].table, Some(0));
}

#[test]
fn malformed_structure_box_skips_table() {
    let doc = invoice_page();
    let tables = FakeTableDetector::default().on_page(0, vec![table(UPPER_REGION)]);
    let mut boxes = two_by_three_structure();
    boxes.push(row([50.0, f64::NAN, 450.0, 120.0]));
    let structure = FakeStructureDetector::always(boxes);

    let result =
        TableExtractor::new(&doc, &tables, &structure, ExtractOptions::default()).extract_tables();
    assert!(result.value.is_empty());
    assert_eq!(result.warnings[0].code, ExtractWarningCode::MalformedBox);
}

#[test]
fn inverted_table_region_skips_table() {
    let doc = invoice_page();
    let tables =
        FakeTableDetector::default().on_page(0, vec![table([500.0, 100.0, 100.0, 400.0])]);
    let structure = FakeStructureDetector::always(two_by_three_structure());

    let result =
        TableExtractor::new(&doc, &tables, &structure, ExtractOptions::default()).extract_tables();
    assert!(result.value.is_empty());
    assert_eq!(result.warnings[0].code, ExtractWarningCode::MalformedBox);
    assert!(structure.crops.lock().unwrap().is_empty());
}

#[test]
fn warnings_can_be_disabled() {
    let doc = invoice_page();
    let tables = FakeTableDetector::default().on_page(0, vec![table(UPPER_REGION)]);
    let structure = FakeStructureDetector::default();
    let options = ExtractOptions {
        collect_warnings: false,
        ..ExtractOptions::default()
    };

    let result = TableExtractor::new(&doc, &tables, &structure, options).extract_tables();
    assert!(result.value.is_empty());
    assert!(result.is_clean());
}

// --- Ordering ---

#[test]
fn tables_keep_detector_order() {
    let doc = FakeDocument::letter(1);
    // The lower table is reported first.
    let tables = FakeTableDetector::default()
        .on_page(0, vec![table(LOWER_REGION), table(UPPER_REGION)]);
    let structure = FakeStructureDetector::default()
        .for_crop(700, 500, two_by_two_structure(600.0, 400.0))
        .for_crop(500, 400, two_by_three_structure());

    let result =
        TableExtractor::new(&doc, &tables, &structure, ExtractOptions::default()).extract_tables();
    assert_eq!(result.value.len(), 2);

    let first = &result.value[0];
    assert_eq!(first.index, 0);
    assert_eq!(first.grid.column_count(), 2);
    assert_close(first.bbox.y0, 336.0);
    assert_close(first.bbox.y1, 432.0);

    let second = &result.value[1];
    assert_eq!(second.index, 1);
    assert_eq!(second.grid.column_count(), 3);
    assert!(second.bbox.y0 > first.bbox.y1);
}

#[test]
fn only_upright_tables_are_extracted() {
    let doc = FakeDocument::letter(1);
    let tables = FakeTableDetector::default().on_page(
        0,
        vec![
            Scripted {
                label: pdftab::Label::TableRotated,
                coords: LOWER_REGION,
            },
            table(UPPER_REGION),
        ],
    );
    let structure = FakeStructureDetector::always(two_by_three_structure());

    let extractor = TableExtractor::new(&doc, &tables, &structure, ExtractOptions::default());
    let regions = extractor.detect_regions(0).unwrap();
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].index, 0);
    assert_eq!(regions[0].bbox.to_xyxy(), UPPER_REGION);

    let result = extractor.extract_tables();
    assert_eq!(result.value.len(), 1);
    assert!(result.is_clean());
}

#[test]
fn pages_processed_in_order_with_own_height() {
    let mut doc = FakeDocument::letter(3);
    doc.heights[1] = 600.0;
    let tables = FakeTableDetector::default()
        .on_page(0, vec![table(UPPER_REGION)])
        .on_page(1, vec![table(UPPER_REGION)])
        .on_page(2, vec![table(UPPER_REGION)]);
    let structure = FakeStructureDetector::always(two_by_three_structure());

    let result =
        TableExtractor::new(&doc, &tables, &structure, ExtractOptions::default()).extract_tables();
    let pages: Vec<usize> = result.value.iter().map(|t| t.page).collect();
    assert_eq!(pages, vec![0, 1, 2]);
    assert_close(result.value[0].bbox.y1, 768.0);
    assert_close(result.value[1].bbox.y1, 576.0);

    let renders = doc.renders.lock().unwrap();
    assert_eq!(*renders, vec![(0, 300.0), (1, 300.0), (2, 300.0)]);
}

#[test]
fn page_selection_is_respected() {
    let doc = FakeDocument::letter(3);
    let tables = FakeTableDetector::default()
        .on_page(0, vec![table(UPPER_REGION)])
        .on_page(2, vec![table(UPPER_REGION)]);
    let structure = FakeStructureDetector::always(two_by_three_structure());
    let options = ExtractOptions {
        pages: Some(vec![2, 1]),
        ..ExtractOptions::default()
    };

    let result = TableExtractor::new(&doc, &tables, &structure, options).extract_tables();
    assert_eq!(result.value.len(), 1);
    assert_eq!(result.value[0].page, 2);
    let rendered: Vec<usize> = doc.renders.lock().unwrap().iter().map(|r| r.0).collect();
    assert_eq!(rendered, vec![2, 1]);
}

// --- Collaborator failures ---

#[test]
fn failed_page_keeps_other_pages() {
    let doc = FakeDocument::letter(3).failing_render(1);
    let tables = FakeTableDetector::default()
        .on_page(0, vec![table(UPPER_REGION)])
        .on_page(1, vec![table(UPPER_REGION)])
        .on_page(2, vec![table(UPPER_REGION)]);
    let structure = FakeStructureDetector::always(two_by_three_structure());

    let result =
        TableExtractor::new(&doc, &tables, &structure, ExtractOptions::default()).extract_tables();
    let pages: Vec<usize> = result.value.iter().map(|t| t.page).collect();
    assert_eq!(pages, vec![0, 2]);
    assert_eq!(result.warnings.len(), 1);
    let warning = &result.warnings[0];
    assert_eq!(warning.code, ExtractWarningCode::CollaboratorFailure);
    assert_eq!(warning.page, Some(1));
    assert_eq!(warning.table, None);
    assert!(warning.description.contains("cannot render page 1"));
}

#[test]
fn detector_failure_becomes_warning() {
    let doc = FakeDocument::letter(2);
    let tables = FakeTableDetector::default()
        .on_page(0, vec![table(UPPER_REGION)])
        .failing_on(1);
    let structure = FakeStructureDetector::always(two_by_three_structure());

    let result =
        TableExtractor::new(&doc, &tables, &structure, ExtractOptions::default()).extract_tables();
    assert_eq!(result.value.len(), 1);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].description.starts_with("detection error"));
}

#[test]
fn text_failure_abandons_rest_of_page() {
    // Each 2x2 table needs four text queries; the fifth fails.
    let doc = FakeDocument::letter(2).text_budget(4);
    let tables = FakeTableDetector::default()
        .on_page(
            0,
            vec![
                table(UPPER_REGION),
                table(LOWER_REGION),
                table([100.0, 2200.0, 500.0, 2500.0]),
            ],
        )
        .on_page(1, vec![table(UPPER_REGION)]);
    let structure = FakeStructureDetector::always(two_by_two_structure(400.0, 300.0));

    let result =
        TableExtractor::new(&doc, &tables, &structure, ExtractOptions::default()).extract_tables();
    assert_eq!(result.value.len(), 1);
    assert_eq!(result.value[0].index, 0);

    assert_eq!(result.warnings.len(), 2);
    for warning in &result.warnings {
        assert_eq!(warning.code, ExtractWarningCode::CollaboratorFailure);
        assert!(warning.description.starts_with("text query error"));
    }
    assert_eq!(result.warnings[0].page, Some(0));
    assert_eq!(result.warnings[0].table, Some(1));
    assert_eq!(result.warnings[1].page, Some(1));
    assert_eq!(result.warnings[1].table, Some(0));

    // The third table on page 0 is never cropped; page 1 still runs.
    assert_eq!(*structure.crops.lock().unwrap(), vec![(500, 400), (700, 500), (500, 400)]);
    assert_eq!(doc.query_count(), 4);
}

#[test]
fn structure_failure_abandons_rest_of_page() {
    let doc = FakeDocument::letter(2);
    let tables = FakeTableDetector::default()
        .on_page(0, vec![table(UPPER_REGION), table(LOWER_REGION)])
        .on_page(1, vec![table(LOWER_REGION)]);
    let structure = FakeStructureDetector::default()
        .for_crop(700, 500, two_by_two_structure(600.0, 400.0))
        .failing_for_crop(500, 400);

    let result =
        TableExtractor::new(&doc, &tables, &structure, ExtractOptions::default()).extract_tables();
    let found: Vec<(usize, usize)> = result.value.iter().map(|t| (t.page, t.index)).collect();
    assert_eq!(found, vec![(1, 0)]);

    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].page, Some(0));
    assert_eq!(result.warnings[0].table, Some(0));
    assert!(result.warnings[0].description.starts_with("detection error"));
    assert_eq!(*structure.crops.lock().unwrap(), vec![(500, 400), (700, 500)]);
}

#[test]
fn extract_page_propagates_table_failure() {
    let doc = FakeDocument::letter(1).text_budget(0);
    let tables = FakeTableDetector::default().on_page(0, vec![table(UPPER_REGION)]);
    let structure = FakeStructureDetector::always(two_by_three_structure());
    let extractor = TableExtractor::new(&doc, &tables, &structure, ExtractOptions::default());

    assert!(matches!(extractor.extract_page(0).unwrap_err(), TableError::TextQuery(_)));
}

#[test]
fn page_without_detections_is_quietly_skipped() {
    let doc = FakeDocument::letter(2);
    let tables = FakeTableDetector::default().on_page(1, vec![table(UPPER_REGION)]);
    let structure = FakeStructureDetector::always(two_by_three_structure());

    let result =
        TableExtractor::new(&doc, &tables, &structure, ExtractOptions::default()).extract_tables();
    assert!(result.is_clean());
    assert_eq!(result.value.len(), 1);
    assert_eq!(result.value[0].page, 1);
    assert_eq!(structure.crops.lock().unwrap().len(), 1);
}

#[test]
fn out_of_range_page_in_selection_is_reported() {
    let doc = FakeDocument::letter(2);
    let tables = FakeTableDetector::default();
    let structure = FakeStructureDetector::default();
    let options = ExtractOptions {
        pages: Some(vec![0, 7]),
        ..ExtractOptions::default()
    };

    let result = TableExtractor::new(&doc, &tables, &structure, options).extract_tables();
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].page, Some(7));
    assert!(result.warnings[0].description.contains("out of range"));
}

#[test]
fn extract_page_propagates_errors() {
    let doc = FakeDocument::letter(2).failing_render(1);
    let tables = FakeTableDetector::default().on_page(0, vec![table(UPPER_REGION)]);
    let structure = FakeStructureDetector::always(two_by_three_structure());
    let extractor = TableExtractor::new(&doc, &tables, &structure, ExtractOptions::default());

    assert_eq!(extractor.extract_page(0).unwrap().value.len(), 1);
    assert_eq!(
        extractor.extract_page(1).unwrap_err(),
        TableError::Render("cannot render page 1".to_string())
    );
    assert!(matches!(
        extractor.extract_page(9).unwrap_err(),
        TableError::InvalidPage {
            page: 9,
            page_count: 2
        }
    ));
}

// --- Page images ---

#[test]
fn rendered_pages_are_saved_when_requested() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("pages");
    let doc = FakeDocument::letter(2);
    let tables = FakeTableDetector::default();
    let structure = FakeStructureDetector::default();
    let options = ExtractOptions {
        dpi: 72.0,
        page_image_dir: Some(out.clone()),
        ..ExtractOptions::default()
    };

    let result = TableExtractor::new(&doc, &tables, &structure, options).extract_tables();
    assert!(result.is_clean());
    let saved = image::open(out.join("page_1.png")).unwrap();
    assert_eq!((saved.width(), saved.height()), (612, 792));
    assert!(out.join("page_0.png").exists());
}

// --- Serialization ---

#[cfg(feature = "serde")]
#[test]
fn extracted_table_serializes_without_grid() {
    let doc = invoice_page();
    let tables = FakeTableDetector::default().on_page(0, vec![table(UPPER_REGION)]);
    let structure = FakeStructureDetector::always(two_by_three_structure());

    let result =
        TableExtractor::new(&doc, &tables, &structure, ExtractOptions::default()).extract_tables();
    let json = serde_json::to_value(&result.value[0]).unwrap();
    assert_eq!(json["page"], 0);
    assert_eq!(json["record"]["header"][0], "Item");
    assert!(json.get("grid").is_none());
}
