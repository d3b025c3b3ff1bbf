//! Table extraction and normalization for text PDFs.
//!
//! The pipeline is extract, flatten, combine, serialize:
//!
//! 1. a [`TableExtractor`] turns PDF bytes into [`RawTable`]s,
//! 2. [`flatten`] collapses multi-line text cells onto one line,
//! 3. [`combine`] concatenates the tables into one [`CombinedTable`],
//! 4. [`write_csv`] / [`write_csv_to_string`] render the result.

mod combine;
mod csv_out;
mod error;
mod extract;
mod flatten;
mod header;
mod model;
mod options;
mod pdf_reader;
mod table_detect;
mod table_parse;
mod warning;

use std::path::Path;

pub use combine::{ColumnPolicy, CombineOptions, combine};
pub use csv_out::{write_csv, write_csv_to_string};
pub use error::{CombineError, ConvertError, ExtractError, WriteError};
pub use extract::{Extraction, TableExtractor, TextLayoutExtractor};
pub use flatten::{flatten, join_lines};
pub use model::{Cell, CombinedTable, FlattenedTable, RawTable};
pub use options::{ExtractOptions, HeaderMode, PageSelection, PageSelector, QualityMode};
pub use warning::{ExtractWarning, WarningCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub pages: PageSelector,
    pub combine: CombineOptions,
    pub delimiter: u8,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            pages: PageSelector::All,
            combine: CombineOptions::default(),
            delimiter: b',',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub row_count: usize,
    pub table_count: usize,
    pub warnings: Vec<ExtractWarning>,
}

/// Flattens every table and combines them in order.
///
/// # Errors
///
/// See [`combine`].
pub fn normalize(
    tables: Vec<RawTable>,
    options: CombineOptions,
) -> Result<CombinedTable, CombineError> {
    combine(tables.into_iter().map(flatten).collect(), options)
}

fn convert(
    document: &[u8],
    extractor: &dyn TableExtractor,
    options: &ConvertOptions,
) -> Result<(CombinedTable, Vec<ExtractWarning>), ConvertError> {
    let extraction = extractor.extract(document, &options.pages)?;
    if extraction.tables.is_empty() {
        return Err(ExtractError::NoTablesFound.into());
    }
    let combined = normalize(extraction.tables, options.combine)?;
    Ok((combined, extraction.warnings))
}

/// Runs the whole pipeline on a PDF file and writes the CSV to `output_csv`.
///
/// # Errors
///
/// Returns the first failing stage's error.
pub fn convert_pdf_to_csv(
    input_pdf: &Path,
    output_csv: &Path,
    extractor: &dyn TableExtractor,
    options: &ConvertOptions,
) -> Result<ConversionReport, ConvertError> {
    let document = std::fs::read(input_pdf).map_err(ConvertError::Read)?;
    let (combined, warnings) = convert(&document, extractor, options)?;
    write_csv(output_csv, &combined, options.delimiter)?;

    Ok(ConversionReport {
        row_count: combined.row_count(),
        table_count: combined.table_count,
        warnings,
    })
}

/// Runs the whole pipeline on in-memory PDF bytes.
///
/// # Errors
///
/// Returns the first failing stage's error.
pub fn convert_pdf_bytes_to_csv_string(
    document: &[u8],
    extractor: &dyn TableExtractor,
    options: &ConvertOptions,
) -> Result<(String, ConversionReport), ConvertError> {
    let (combined, warnings) = convert(document, extractor, options)?;
    let csv = write_csv_to_string(&combined, options.delimiter)?;

    Ok((
        csv,
        ConversionReport {
            row_count: combined.row_count(),
            table_count: combined.table_count,
            warnings,
        },
    ))
}
