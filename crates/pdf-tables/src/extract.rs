use crate::error::ExtractError;
use crate::header::split_header;
use crate::model::{Cell, DetectedTable, PageText, RawTable};
use crate::options::{ExtractOptions, PageSelector, QualityMode};
use crate::pdf_reader::read_pdf_pages;
use crate::table_detect::{LOW_CONFIDENCE_THRESHOLD, detect_tables};
use crate::warning::{ExtractWarning, WarningCode};

/// Tables found in one document, in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extraction {
    pub tables: Vec<RawTable>,
    pub warnings: Vec<ExtractWarning>,
}

/// A table detection engine.
///
/// Implementations return one [`RawTable`] per detected region, ordered by
/// page and then top to bottom, and fail with [`ExtractError::NoTablesFound`]
/// when the document holds no table at all.
pub trait TableExtractor: Send + Sync {
    /// # Errors
    ///
    /// Returns an error for unreadable or encrypted documents, engine faults,
    /// or when no table region is found.
    fn extract(&self, document: &[u8], pages: &PageSelector) -> Result<Extraction, ExtractError>;
}

/// Detects tables from the text layout of each page.
///
/// Cells are separated by tabs or runs of two or more spaces; consecutive
/// lines with enough cells form a table.
#[derive(Debug, Clone, Default)]
pub struct TextLayoutExtractor {
    options: ExtractOptions,
}

impl TextLayoutExtractor {
    #[must_use]
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    fn apply_quality_mode(
        &self,
        tables: Vec<DetectedTable>,
        warnings: &mut Vec<ExtractWarning>,
    ) -> Result<Vec<DetectedTable>, ExtractError> {
        let mut out = Vec::new();

        for table in tables {
            if table.confidence >= LOW_CONFIDENCE_THRESHOLD {
                out.push(table);
                continue;
            }

            match self.options.quality_mode {
                QualityMode::BestEffort => {
                    warnings.push(
                        ExtractWarning::new(
                            WarningCode::LowConfidence,
                            "table confidence is low; exported in best-effort mode",
                        )
                        .with_page(table.page)
                        .with_confidence(table.confidence),
                    );
                    out.push(table);
                }
                QualityMode::Strict => {
                    return Err(ExtractError::AmbiguousTable {
                        page: table.page,
                        confidence: table.confidence,
                    });
                }
                QualityMode::SkipAmbiguous => {
                    warnings.push(
                        ExtractWarning::new(
                            WarningCode::LowConfidence,
                            "skipping low-confidence table",
                        )
                        .with_page(table.page)
                        .with_confidence(table.confidence),
                    );
                }
            }
        }

        Ok(out)
    }

    fn extract_from_pages(
        &self,
        pages: &[PageText],
        full_text: Option<&str>,
    ) -> Result<Extraction, ExtractError> {
        let mut warnings = Vec::new();
        let mut detected = detect_tables(pages, self.options.min_cols);
        if detected.is_empty()
            && let Some(text) = full_text.filter(|text| !text.trim().is_empty())
        {
            let document_page = [PageText {
                page_number: 1,
                text: text.to_string(),
            }];
            detected = detect_tables(&document_page, self.options.min_cols);
            if !detected.is_empty() {
                warnings.push(ExtractWarning::new(
                    WarningCode::DocumentTextFallback,
                    "no page-level tables detected; retried with document-level text extraction",
                ));
            }
        }

        let detected = self.apply_quality_mode(detected, &mut warnings)?;

        let mut tables = Vec::with_capacity(detected.len());
        for (index, table) in detected.into_iter().enumerate() {
            let page = table.page;
            let split = split_header(table, self.options.header_mode, &mut warnings, index + 1);
            let rows = split
                .rows
                .iter()
                .map(|row| row.iter().map(|cell| Cell::from_detected(cell)).collect())
                .collect();
            tables.push(RawTable::new(page, split.header, rows));
        }

        if tables.is_empty() {
            return Err(ExtractError::NoTablesFound);
        }

        Ok(Extraction { tables, warnings })
    }
}

impl TableExtractor for TextLayoutExtractor {
    fn extract(&self, document: &[u8], pages: &PageSelector) -> Result<Extraction, ExtractError> {
        if self.options.min_cols < 2 {
            return Err(ExtractError::InvalidOption(
                "min_cols must be at least 2".to_string(),
            ));
        }

        let text = read_pdf_pages(document, pages)?;
        let extraction = self.extract_from_pages(&text.pages, text.full_text.as_deref())?;
        tracing::debug!(
            tables = extraction.tables.len(),
            warnings = extraction.warnings.len(),
            "text layout extraction finished"
        );
        Ok(extraction)
    }
}
