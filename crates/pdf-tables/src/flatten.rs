use std::borrow::Cow;

use crate::model::{Cell, FlattenedTable, RawTable};

fn is_line_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r'
            | '\u{0B}'
            | '\u{0C}'
            | '\u{1C}'
            | '\u{1D}'
            | '\u{1E}'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

/// Joins the lines of `text` with single spaces.
///
/// `\r\n` counts as one break and a trailing break does not start a new line.
#[must_use]
pub fn join_lines(text: &str) -> Cow<'_, str> {
    if !text.contains(is_line_break) {
        return Cow::Borrowed(text);
    }

    let mut lines = Vec::new();
    let mut rest = text;
    while let Some(position) = rest.find(is_line_break) {
        lines.push(&rest[..position]);
        let tail = &rest[position..];
        let break_len = if tail.starts_with("\r\n") {
            2
        } else {
            tail.chars().next().map_or(1, char::len_utf8)
        };
        rest = &tail[break_len..];
    }
    if !rest.is_empty() {
        lines.push(rest);
    }

    Cow::Owned(lines.join(" "))
}

fn flatten_cell(cell: Cell) -> Cell {
    match cell {
        Cell::Text(text) => {
            let joined = match join_lines(&text) {
                Cow::Borrowed(_) => None,
                Cow::Owned(joined) => Some(joined),
            };
            Cell::Text(joined.unwrap_or(text))
        }
        other => other,
    }
}

/// Collapses every multi-line text cell of `table` onto a single line.
#[must_use]
pub fn flatten(table: RawTable) -> FlattenedTable {
    let rows = table
        .rows
        .into_iter()
        .map(|row| row.into_iter().map(flatten_cell).collect())
        .collect();

    FlattenedTable::from_flattened(RawTable {
        page: table.page,
        header: table.header,
        rows,
    })
}
