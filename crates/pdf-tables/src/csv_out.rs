use std::io::Write;
use std::path::Path;

use csv::{Writer, WriterBuilder};

use crate::error::WriteError;
use crate::model::CombinedTable;

fn write_table<W: Write>(writer: &mut Writer<W>, table: &CombinedTable) -> Result<(), WriteError> {
    writer.write_record(&table.header)?;
    for row in &table.rows {
        for cell in row {
            let field = cell.as_csv_field();
            writer.write_field(field.as_bytes())?;
        }
        writer.write_record(None::<&[u8]>)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `table` to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns an error when the file cannot be created or written.
pub fn write_csv(path: &Path, table: &CombinedTable, delimiter: u8) -> Result<(), WriteError> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    write_table(&mut writer, table)
}

/// Renders `table` as CSV text.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn write_csv_to_string(table: &CombinedTable, delimiter: u8) -> Result<String, WriteError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::<u8>::new());
    write_table(&mut writer, table)?;

    let bytes = writer
        .into_inner()
        .map_err(|error| WriteError::Io(error.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::{write_csv, write_csv_to_string};
    use crate::model::{Cell, CombinedTable};

    fn sample() -> CombinedTable {
        CombinedTable {
            header: vec!["name".to_string(), "notes".to_string()],
            rows: vec![
                vec![Cell::text("Line1 Line2"), Cell::Number(1.5)],
                vec![Cell::text("a,b"), Cell::Missing],
            ],
            table_count: 1,
        }
    }

    #[test]
    fn renders_header_and_quoted_fields() {
        let csv = write_csv_to_string(&sample(), b',').expect("csv should render");
        assert_eq!(csv, "name,notes\nLine1 Line2,1.5\n\"a,b\",\n");
    }

    #[test]
    fn honours_delimiter() {
        let csv = write_csv_to_string(&sample(), b';').expect("csv should render");
        assert!(csv.starts_with("name;notes\n"), "unexpected csv: {csv:?}");
        assert!(csv.contains("a,b;"), "unexpected csv: {csv:?}");
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempdir().expect("tempdir should be created");
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale content that is longer than the new csv\n")
            .expect("seed file should be written");

        write_csv(&path, &sample(), b',').expect("csv should be written");
        let written = std::fs::read_to_string(&path).expect("csv should be readable");
        assert_eq!(written, write_csv_to_string(&sample(), b',').expect("csv"));
    }
}
