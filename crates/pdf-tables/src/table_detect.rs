use crate::model::{DetectedTable, PageText};
use crate::table_parse::{modal_width, soft_split_line_into_cells, split_line_into_cells};

pub(crate) const LOW_CONFIDENCE_THRESHOLD: f32 = 0.60;

/// Longest soft-split line accepted without any digit in it.
const MAX_SOFT_TEXT_CELLS: usize = 6;

/// Share of rows at the modal width, tempered by the spread between the
/// narrowest and widest row.
fn table_confidence(rows: &[Vec<String>]) -> f32 {
    let modal = modal_width(rows);
    if rows.len() < 2 || modal == 0 {
        return 0.0;
    }

    let (narrowest, widest) = rows
        .iter()
        .map(Vec::len)
        .fold((usize::MAX, 0), |(lo, hi), width| (lo.min(width), hi.max(width)));
    let at_modal = rows.iter().filter(|row| row.len() == modal).count() as f32 / rows.len() as f32;
    let spread = (widest - narrowest) as f32 / widest as f32;

    (at_modal * 0.75 + (1.0 - spread) * 0.25).clamp(0.0, 1.0)
}

fn line_cells(line: &str, min_cols: usize) -> Vec<String> {
    let cells = split_line_into_cells(line);
    if cells.len() >= min_cols {
        return cells;
    }

    let soft_cells = soft_split_line_into_cells(line);
    let has_numeric = soft_cells
        .iter()
        .any(|cell| cell.chars().any(|ch| ch.is_ascii_digit()));
    let looks_like_sentence = ['.', '!', '?']
        .iter()
        .any(|punctuation| line.trim_end().ends_with(*punctuation));
    if soft_cells.len() >= min_cols
        && !looks_like_sentence
        && (has_numeric || soft_cells.len() <= MAX_SOFT_TEXT_CELLS)
    {
        soft_cells
    } else {
        cells
    }
}

fn detect_tables_in_page(page: &PageText, min_cols: usize) -> Vec<DetectedTable> {
    // Runs of consecutive table-like lines; any other line closes the run.
    let mut regions: Vec<Vec<Vec<String>>> = vec![Vec::new()];
    for line in page.text.lines() {
        let cells = line_cells(line, min_cols);
        if cells.len() >= min_cols {
            if let Some(region) = regions.last_mut() {
                region.push(cells);
            }
        } else if regions.last().is_some_and(|region| !region.is_empty()) {
            regions.push(Vec::new());
        }
    }

    regions
        .into_iter()
        .filter(|rows| rows.len() >= 2)
        .map(|rows| DetectedTable {
            page: page.page_number,
            confidence: table_confidence(&rows),
            rows,
        })
        .collect()
}

/// Finds table regions on every page, in page then top-to-bottom order.
pub(crate) fn detect_tables(pages: &[PageText], min_cols: usize) -> Vec<DetectedTable> {
    pages
        .iter()
        .flat_map(|page| detect_tables_in_page(page, min_cols.max(2)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{LOW_CONFIDENCE_THRESHOLD, detect_tables};
    use crate::model::PageText;

    fn page(page_number: u32, text: &str) -> PageText {
        PageText {
            page_number,
            text: text.to_string(),
        }
    }

    #[test]
    fn splits_regions_on_prose_lines() {
        let pages = vec![page(
            1,
            "Name  Age\nAlice  30\nBob  22\nSome narrative text in between.\nCity  Pop\nA  10",
        )];

        let tables = detect_tables(&pages, 2);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].rows.len(), 3);
        assert_eq!(tables[1].rows[1], vec!["A", "10"]);
    }

    #[test]
    fn keeps_document_order_across_pages() {
        let pages = vec![page(1, "a  b\n1  2"), page(3, "c  d\n3  4")];

        let tables = detect_tables(&pages, 2);
        assert_eq!(tables.iter().map(|t| t.page).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn ragged_regions_have_low_confidence() {
        let pages = vec![page(1, "A  B  C\n1  2\n3  4  5  6\n7  8")];

        let tables = detect_tables(&pages, 2);
        assert_eq!(tables.len(), 1);
        assert!(tables[0].confidence < LOW_CONFIDENCE_THRESHOLD);
    }

    #[test]
    fn single_lines_are_not_tables() {
        let pages = vec![page(1, "Only  one  row\nThis is prose.")];
        assert!(detect_tables(&pages, 2).is_empty());
    }
}
