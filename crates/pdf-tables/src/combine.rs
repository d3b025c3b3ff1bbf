use std::str::FromStr;

use serde::Deserialize;

use crate::error::CombineError;
use crate::model::{Cell, CombinedTable, FlattenedTable};

/// How columns of differently shaped tables line up in the combined output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPolicy {
    /// Align by position; short rows are padded with missing cells.
    #[default]
    Positional,
    /// Align by header name; unknown names become new columns.
    #[serde(alias = "by-header")]
    ByHeader,
    /// Positional, but every table must carry the first table's header.
    Strict,
}

impl FromStr for ColumnPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "positional" => Ok(Self::Positional),
            "by-header" => Ok(Self::ByHeader),
            "strict" => Ok(Self::Strict),
            other => Err(format!(
                "unknown column policy '{other}', expected positional, by-header or strict"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombineOptions {
    pub policy: ColumnPolicy,
    /// Prepend `page` and `table_id` columns to every row.
    pub provenance: bool,
}

fn generated_column_name(position: usize) -> String {
    format!("col_{}", position + 1)
}

fn extend_generated_names(header: &mut Vec<String>, width: usize) {
    for position in header.len()..width {
        header.push(generated_column_name(position));
    }
}

fn ensure_matching_headers(tables: &[FlattenedTable]) -> Result<(), CombineError> {
    let Some((first, rest)) = tables.split_first() else {
        return Ok(());
    };

    for (index, table) in rest.iter().enumerate() {
        if table.header() != first.header() {
            return Err(CombineError::ColumnMismatch {
                table: index + 2,
                expected: first.header().to_vec(),
                found: table.header().to_vec(),
            });
        }
    }

    Ok(())
}

struct SourcedRow {
    page: u32,
    table_id: usize,
    cells: Vec<Cell>,
}

fn concat_positional(tables: Vec<FlattenedTable>) -> (Vec<String>, Vec<SourcedRow>) {
    let width = tables
        .iter()
        .map(FlattenedTable::width)
        .max()
        .unwrap_or(0);

    let mut header = tables
        .first()
        .map(|table| table.header().to_vec())
        .unwrap_or_default();
    extend_generated_names(&mut header, width);

    let mut rows = Vec::new();
    for (index, table) in tables.into_iter().enumerate() {
        let table = table.into_raw();
        for mut cells in table.rows {
            cells.resize(width, Cell::Missing);
            rows.push(SourcedRow {
                page: table.page,
                table_id: index + 1,
                cells,
            });
        }
    }

    (header, rows)
}

fn concat_by_header(tables: Vec<FlattenedTable>) -> (Vec<String>, Vec<SourcedRow>) {
    let mut header: Vec<String> = Vec::new();
    let mut mappings = Vec::with_capacity(tables.len());

    for table in &tables {
        let mut columns = table.header().to_vec();
        extend_generated_names(&mut columns, table.width());

        // Repeated names inside one table map to distinct output columns.
        let mut mapping: Vec<usize> = Vec::with_capacity(columns.len());
        for name in columns {
            let existing =
                (0..header.len()).find(|&index| header[index] == name && !mapping.contains(&index));
            let target = existing.unwrap_or_else(|| {
                header.push(name);
                header.len() - 1
            });
            mapping.push(target);
        }
        mappings.push(mapping);
    }

    let width = header.len();
    let mut rows = Vec::new();
    for (index, (table, mapping)) in tables.into_iter().zip(mappings).enumerate() {
        let table = table.into_raw();
        for source in table.rows {
            let mut cells = vec![Cell::Missing; width];
            for (cell, &target) in source.into_iter().zip(&mapping) {
                cells[target] = cell;
            }
            rows.push(SourcedRow {
                page: table.page,
                table_id: index + 1,
                cells,
            });
        }
    }

    (header, rows)
}

/// Concatenates flattened tables, in order, into one table.
///
/// # Errors
///
/// Returns [`CombineError::EmptyInput`] when `tables` is empty and
/// [`CombineError::ColumnMismatch`] under [`ColumnPolicy::Strict`] when a
/// table's header differs from the first one.
pub fn combine(
    tables: Vec<FlattenedTable>,
    options: CombineOptions,
) -> Result<CombinedTable, CombineError> {
    if tables.is_empty() {
        return Err(CombineError::EmptyInput);
    }
    if options.policy == ColumnPolicy::Strict {
        ensure_matching_headers(&tables)?;
    }

    let table_count = tables.len();
    let (header, rows) = match options.policy {
        ColumnPolicy::Positional | ColumnPolicy::Strict => concat_positional(tables),
        ColumnPolicy::ByHeader => concat_by_header(tables),
    };

    if !options.provenance {
        return Ok(CombinedTable {
            header,
            rows: rows.into_iter().map(|row| row.cells).collect(),
            table_count,
        });
    }

    let mut prefixed_header = vec!["page".to_string(), "table_id".to_string()];
    prefixed_header.extend(header);
    let rows = rows
        .into_iter()
        .map(|row| {
            let mut cells = Vec::with_capacity(row.cells.len() + 2);
            cells.push(Cell::Text(row.page.to_string()));
            cells.push(Cell::Text(row.table_id.to_string()));
            cells.extend(row.cells);
            cells
        })
        .collect();

    Ok(CombinedTable {
        header: prefixed_header,
        rows,
        table_count,
    })
}
