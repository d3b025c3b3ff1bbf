use crate::model::DetectedTable;
use crate::options::HeaderMode;
use crate::warning::{ExtractWarning, WarningCode};

const HEADER_CONFIDENCE_THRESHOLD: f32 = 0.55;

fn is_numeric(value: &str) -> bool {
    let trimmed = value.trim().replace(',', "");
    trimmed.parse::<f64>().is_ok()
}

fn non_numeric_ratio(cells: &[String]) -> f32 {
    if cells.is_empty() {
        return 0.0;
    }

    let non_numeric = cells.iter().filter(|cell| !is_numeric(cell)).count();
    non_numeric as f32 / cells.len() as f32
}

pub(crate) fn infer_has_header(rows: &[Vec<String>]) -> (bool, f32) {
    let Some(first) = rows.first() else {
        return (false, 0.0);
    };

    let first = non_numeric_ratio(first);
    let second = rows.get(1).map_or(0.0, |row| non_numeric_ratio(row));

    let confidence = (first * 0.6 + (1.0 - second) * 0.4).clamp(0.0, 1.0);
    let has_header = first >= 0.6 && second <= 0.7;
    (has_header, confidence)
}

fn generated_header(rows: &[Vec<String>]) -> Vec<String> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    (1..=width).map(|index| format!("col_{index}")).collect()
}

/// Header and data rows of one detected table.
pub(crate) struct SplitTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn take_first_row(mut rows: Vec<Vec<String>>) -> SplitTable {
    let header = if rows.is_empty() {
        Vec::new()
    } else {
        rows.remove(0)
    };
    SplitTable { header, rows }
}

fn without_header(rows: Vec<Vec<String>>) -> SplitTable {
    SplitTable {
        header: generated_header(&rows),
        rows,
    }
}

pub(crate) fn split_header(
    table: DetectedTable,
    mode: HeaderMode,
    warnings: &mut Vec<ExtractWarning>,
    table_id: usize,
) -> SplitTable {
    match mode {
        HeaderMode::HasHeader => take_first_row(table.rows),
        HeaderMode::NoHeader => without_header(table.rows),
        HeaderMode::AutoDetect => {
            let (has_header, confidence) = infer_has_header(&table.rows);
            if has_header && confidence >= HEADER_CONFIDENCE_THRESHOLD {
                return take_first_row(table.rows);
            }

            if confidence < HEADER_CONFIDENCE_THRESHOLD {
                warnings.push(
                    ExtractWarning::new(
                        WarningCode::HeaderInferenceLowConfidence,
                        "header inference confidence is low; keeping the first row as data",
                    )
                    .with_page(table.page)
                    .with_table_id(table_id)
                    .with_confidence(confidence),
                );
            }

            without_header(table.rows)
        }
    }
}
