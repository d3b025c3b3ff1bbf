use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("PDF is encrypted")]
    Encrypted,

    #[error("invalid page selection: {0}")]
    InvalidPageSelection(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("no pages available after applying selection")]
    NoPagesSelected,

    #[error("table on page {page} is too ambiguous (confidence={confidence:.2})")]
    AmbiguousTable { page: u32, confidence: f32 },

    #[error("no tables found in the PDF")]
    NoTablesFound,

    #[error("table extractor failed: {0}")]
    Engine(String),
}

#[derive(Debug, Error)]
pub enum CombineError {
    #[error("no tables to combine")]
    EmptyInput,

    #[error("table {table} has columns {found:?}, expected {expected:?}")]
    ColumnMismatch {
        table: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid utf-8 csv output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Combine(#[from] CombineError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("failed to read PDF: {0}")]
    Read(#[source] io::Error),
}
