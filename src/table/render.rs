//! Plain-text table rendering

use super::field::Field;
use super::sort::TableSort;
use serde::Serialize;

/// Widest a column may grow when the field does not set its own width
pub const DEFAULT_MAX_COLUMN_WIDTH: usize = 60;

const COLUMN_GAP: &str = "  ";
const ELLIPSIS: char = '…';

/// Render rows (already in display order) under the field headers
///
/// The active sort column is marked with an arrow: `↑` ascending, `↓` descending.
pub fn render_table<T: Serialize>(
    fields: &[Field<T>],
    rows: &[&T],
    sort: &TableSort,
    max_column_width: usize,
) -> String {
    let headers: Vec<String> = fields
        .iter()
        .enumerate()
        .map(|(i, f)| {
            if i == sort.column() && f.is_sortable() {
                let arrow = if sort.is_reversed() { '↓' } else { '↑' };
                format!("{} {}", f.label.to_uppercase(), arrow)
            } else {
                f.label.to_uppercase()
            }
        })
        .collect();

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| fields.iter().map(|f| f.render(row)).collect())
        .collect();

    let widths: Vec<usize> = fields
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let natural = cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(headers[i].chars().count()))
                .max()
                .unwrap_or(0);
            natural.min(f.width.unwrap_or(max_column_width))
        })
        .collect();

    let mut lines = Vec::with_capacity(cells.len() + 1);
    lines.push(format_line(&headers, &widths));
    if cells.is_empty() {
        lines.push("No data".to_string());
    }
    for row in &cells {
        lines.push(format_line(row, &widths));
    }
    lines.join("\n")
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| {
            let cell = truncate(cell, width);
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect();
    padded.join(COLUMN_GAP).trim_end().to_string()
}

/// Cut text to `width` characters, ending in an ellipsis when shortened
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push(ELLIPSIS);
    cut
}
