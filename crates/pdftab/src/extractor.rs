//! Page and document driver.

use std::path::Path;

use image::RgbImage;
use pdftab_core::{
    Detection, ExtractOptions, ExtractResult, ExtractWarning, Label, ObjectDetector, PagePixels,
    Rasterizer, TableError, TextQuery,
};

use crate::assembler::{AssembleOutcome, ExtractedTable, TableAssembler, TableRegion};

/// Finds and reconstructs the tables of a document.
///
/// The document and both detectors are borrowed for the extractor's
/// lifetime. Nothing is reloaded between pages or calls.
///
/// # Usage
///
/// ```ignore
/// let options = ExtractOptions::default();
/// let extractor = TableExtractor::new(&doc, &table_detector, &structure_detector, options);
/// let result = extractor.extract_tables();
/// for table in &result.value {
///     println!("page {} table {}: {} rows", table.page, table.index, table.record.row_count());
/// }
/// ```
#[derive(Debug)]
pub struct TableExtractor<'a, D, T, S> {
    document: &'a D,
    table_detector: &'a T,
    structure_detector: &'a S,
    options: ExtractOptions,
}

impl<'a, D, T, S> TableExtractor<'a, D, T, S>
where
    D: Rasterizer + TextQuery,
    T: ObjectDetector,
    S: ObjectDetector,
{
    pub fn new(
        document: &'a D,
        table_detector: &'a T,
        structure_detector: &'a S,
        options: ExtractOptions,
    ) -> Self {
        Self {
            document,
            table_detector,
            structure_detector,
            options,
        }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Pages to process: the configured selection, or every page in order.
    pub fn page_indices(&self) -> Vec<usize> {
        match &self.options.pages {
            Some(pages) => pages.clone(),
            None => (0..self.document.page_count()).collect(),
        }
    }

    /// Extract every table of the selected pages.
    ///
    /// Tables come back page by page, in detector order within a page.
    /// Regions that yield no table are skipped with a warning. A collaborator
    /// failure (render, detection, text query) abandons the rest of its page
    /// with a warning. Tables produced before the failure are kept, including
    /// earlier tables on the same page.
    pub fn extract_tables(&self) -> ExtractResult<Vec<ExtractedTable>> {
        let mut tables = Vec::new();
        let mut warnings = Vec::new();

        for page in self.page_indices() {
            self.process_page_lossy(page, &mut tables, &mut warnings);
        }

        tracing::debug!(
            tables = tables.len(),
            warnings = warnings.len(),
            "extraction finished"
        );
        self.finish(tables, warnings)
    }

    /// Extract the tables of one page.
    ///
    /// Unlike [`extract_tables`](Self::extract_tables), a collaborator
    /// failure is returned as an error.
    pub fn extract_page(
        &self,
        page: usize,
    ) -> Result<ExtractResult<Vec<ExtractedTable>>, TableError> {
        let mut tables = Vec::new();
        let mut warnings = Vec::new();
        self.process_page(page, &mut tables, &mut warnings)
            .map_err(|failure| failure.error)?;
        Ok(self.finish(tables, warnings))
    }

    /// Render one page and run the table detector on it, without
    /// reconstructing the tables.
    pub fn detect_regions(&self, page: usize) -> Result<Vec<TableRegion>, TableError> {
        let image = self.render_page(page)?;
        self.regions_on(page, &image)
    }

    fn finish(
        &self,
        tables: Vec<ExtractedTable>,
        warnings: Vec<ExtractWarning>,
    ) -> ExtractResult<Vec<ExtractedTable>> {
        if self.options.collect_warnings {
            ExtractResult::with_warnings(tables, warnings)
        } else {
            ExtractResult::ok(tables)
        }
    }

    /// [`process_page`](Self::process_page), turning a failure into a
    /// warning.
    fn process_page_lossy(
        &self,
        page: usize,
        tables: &mut Vec<ExtractedTable>,
        warnings: &mut Vec<ExtractWarning>,
    ) {
        if let Err(failure) = self.process_page(page, tables, warnings) {
            let warning =
                ExtractWarning::collaborator_failure(page, &failure.error).at(page, failure.table);
            tracing::warn!(%warning, "abandoning page");
            warnings.push(warning);
        }
    }

    /// Assemble every table of `page` in detector order. The first
    /// collaborator failure stops the page; tables pushed before it stay.
    fn process_page(
        &self,
        page: usize,
        tables: &mut Vec<ExtractedTable>,
        warnings: &mut Vec<ExtractWarning>,
    ) -> Result<(), PageFailure> {
        let image = self.render_page(page)?;
        let page_height = self
            .document
            .page_height(page)
            .map_err(Into::<TableError>::into)?;
        let regions = self.regions_on(page, &image)?;
        if regions.is_empty() {
            tracing::debug!(page, "no tables detected, skipping page");
            return Ok(());
        }
        tracing::debug!(page, tables = regions.len(), page_height, "detected tables");

        let assembler = TableAssembler::new(self.document, self.structure_detector, &self.options);
        for region in &regions {
            match assembler.assemble(&image, page_height, region) {
                Ok(AssembleOutcome::Assembled(table)) => tables.push(table),
                Ok(AssembleOutcome::Skipped(warning)) => warnings.push(warning),
                Err(error) => {
                    return Err(PageFailure {
                        error,
                        table: Some(region.index),
                    });
                }
            }
        }
        Ok(())
    }

    fn render_page(&self, page: usize) -> Result<RgbImage, TableError> {
        let page_count = self.document.page_count();
        if page >= page_count {
            return Err(TableError::InvalidPage { page, page_count });
        }

        let image = self
            .document
            .render(page, self.options.dpi)
            .map_err(Into::<TableError>::into)?;
        if let Some(dir) = &self.options.page_image_dir {
            save_page_image(dir, page, &image)?;
        }
        Ok(image)
    }

    fn regions_on(&self, page: usize, image: &RgbImage) -> Result<Vec<TableRegion>, TableError> {
        let detections: Vec<Detection<PagePixels>> =
            self.table_detector.detect(image).map_err(Into::<TableError>::into)?;
        Ok(detections
            .into_iter()
            .filter(|d| d.label == Label::Table)
            .enumerate()
            .map(|(index, d)| TableRegion {
                page,
                index,
                score: d.score,
                bbox: d.bbox,
            })
            .collect())
    }
}

#[cfg(feature = "parallel")]
impl<D, T, S> TableExtractor<'_, D, T, S>
where
    D: Rasterizer + TextQuery + Sync,
    T: ObjectDetector + Sync,
    S: ObjectDetector + Sync,
{
    /// [`extract_tables`](Self::extract_tables) with pages processed on the
    /// rayon thread pool.
    ///
    /// The output has the same order as the sequential version.
    pub fn extract_tables_parallel(&self) -> ExtractResult<Vec<ExtractedTable>> {
        use rayon::prelude::*;

        let mut per_page: Vec<(usize, Vec<ExtractedTable>, Vec<ExtractWarning>)> = self
            .page_indices()
            .into_par_iter()
            .enumerate()
            .map(|(order, page)| {
                let mut tables = Vec::new();
                let mut warnings = Vec::new();
                self.process_page_lossy(page, &mut tables, &mut warnings);
                (order, tables, warnings)
            })
            .collect();
        per_page.sort_by_key(|(order, _, _)| *order);

        let mut tables = Vec::new();
        let mut warnings = Vec::new();
        for (_, mut page_tables, page_warnings) in per_page {
            page_tables.sort_by_key(|t| t.index);
            tables.extend(page_tables);
            warnings.extend(page_warnings);
        }
        self.finish(tables, warnings)
    }
}

/// A collaborator error that stopped a page, with the table it hit.
#[derive(Debug)]
struct PageFailure {
    error: TableError,
    table: Option<usize>,
}

impl From<TableError> for PageFailure {
    fn from(error: TableError) -> Self {
        Self { error, table: None }
    }
}

fn save_page_image(dir: &Path, page: usize, image: &RgbImage) -> Result<(), TableError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("page_{page}.png"));
    image
        .save(&path)
        .map_err(|e| TableError::Io(format!("{}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), "saved page image");
    Ok(())
}
