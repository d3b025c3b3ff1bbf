use std::collections::BTreeMap;

/// Splits a text line into cells at tabs and at gaps of two or more
/// whitespace characters. A single space stays inside the cell.
pub(crate) fn split_line_into_cells(line: &str) -> Vec<String> {
    line.split('\t').flat_map(split_on_wide_gaps).collect()
}

fn split_on_wide_gaps(segment: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut gap = 0_usize;

    for ch in segment.chars() {
        if ch.is_whitespace() {
            gap += 1;
            continue;
        }
        if gap >= 2 {
            finish_cell(&mut cells, &mut cell);
        } else if gap == 1 && !cell.is_empty() {
            cell.push(' ');
        }
        gap = 0;
        cell.push(ch);
    }

    finish_cell(&mut cells, &mut cell);
    cells
}

fn finish_cell(cells: &mut Vec<String>, cell: &mut String) {
    if !cell.is_empty() {
        cells.push(std::mem::take(cell));
    }
}

/// Every whitespace-separated word becomes its own cell.
pub(crate) fn soft_split_line_into_cells(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// The most common row width; ties go to the wider one.
pub(crate) fn modal_width(rows: &[Vec<String>]) -> usize {
    let mut widths = BTreeMap::<usize, usize>::new();
    for row in rows {
        *widths.entry(row.len()).or_default() += 1;
    }

    widths
        .into_iter()
        .max_by_key(|&(width, seen)| (seen, width))
        .map_or(0, |(width, _)| width)
}
