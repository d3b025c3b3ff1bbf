use std::borrow::Cow;
use std::fmt::{Display, Formatter};

/// A single value in an extracted table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Missing,
}

impl Cell {
    /// Classifies a cell string produced by table detection.
    ///
    /// Blank strings become [`Cell::Missing`]. A string is only treated as a
    /// number when rendering the parsed value gives back the exact same text,
    /// so values like `007` or `1,200` are kept as text.
    #[must_use]
    pub fn from_detected(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Missing;
        }

        if let Ok(value) = trimmed.parse::<f64>()
            && value.is_finite()
            && value.to_string() == trimmed
        {
            return Self::Number(value);
        }

        Self::Text(trimmed.to_string())
    }

    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn as_csv_field(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text),
            Self::Number(value) => Cow::Owned(value.to_string()),
            Self::Missing => Cow::Borrowed(""),
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_csv_field())
    }
}

/// One table region as produced by a [`crate::TableExtractor`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// 1-based page the table was detected on.
    pub page: u32,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    #[must_use]
    pub fn new(page: u32, header: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { page, header, rows }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of column positions used by either the header or any row.
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }
}

/// A [`RawTable`] whose text cells contain no line breaks.
///
/// Only [`crate::flatten`] creates values of this type.
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenedTable(RawTable);

impl FlattenedTable {
    pub(crate) fn from_flattened(table: RawTable) -> Self {
        Self(table)
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.0.page
    }

    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.0.header
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.0.rows
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.0.row_count()
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.0.width()
    }

    #[must_use]
    pub fn into_raw(self) -> RawTable {
        self.0
    }
}

/// All tables of one document concatenated into a single grid.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub table_count: usize,
}

impl CombinedTable {
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageText {
    pub page_number: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DetectedTable {
    pub page: u32,
    pub rows: Vec<Vec<String>>,
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::{Cell, RawTable};

    #[test]
    fn classifies_detected_cells() {
        assert_eq!(Cell::from_detected("  "), Cell::Missing);
        assert_eq!(Cell::from_detected("42"), Cell::Number(42.0));
        assert_eq!(Cell::from_detected("1.5"), Cell::Number(1.5));
        assert_eq!(Cell::from_detected("007"), Cell::text("007"));
        assert_eq!(Cell::from_detected("1,200"), Cell::text("1,200"));
        assert_eq!(Cell::from_detected("NaN"), Cell::text("NaN"));
        assert_eq!(Cell::from_detected(" Alice "), Cell::text("Alice"));
    }

    #[test]
    fn renders_csv_fields() {
        assert_eq!(Cell::Number(30.0).as_csv_field(), "30");
        assert_eq!(Cell::Number(9.9).as_csv_field(), "9.9");
        assert_eq!(Cell::Missing.as_csv_field(), "");
        assert_eq!(Cell::text("a b").to_string(), "a b");
    }

    #[test]
    fn width_covers_header_and_ragged_rows() {
        let table = RawTable::new(
            1,
            vec!["a".to_string()],
            vec![vec![Cell::Missing, Cell::Missing, Cell::Missing]],
        );
        assert_eq!(table.width(), 3);
        assert_eq!(table.row_count(), 1);
    }
}
