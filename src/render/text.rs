//! Plain-text rendering of dialog content for terminals.

use serde_json::Value;

use super::html::scalar_text;
use crate::traits::DialogContent;

const INDENT: &str = "  ";

/// Render JSON as indented `key: value` lines.
pub fn json_to_text(value: &Value) -> String {
    let mut lines = Vec::new();
    write_value(&mut lines, value, 0);
    lines.join("\n")
}

fn write_value(lines: &mut Vec<String>, value: &Value, depth: usize) {
    match value {
        Value::Object(map) => {
            for (key, item) in map {
                let pad = INDENT.repeat(depth);
                match item {
                    Value::Object(inner) if !inner.is_empty() => {
                        lines.push(format!("{}{}:", pad, key));
                        write_value(lines, item, depth + 1);
                    }
                    Value::Object(_) => lines.push(format!("{}{}:", pad, key)),
                    other => lines.push(format!("{}{}: {}", pad, key, scalar_text(other))),
                }
            }
        }
        other => lines.push(format!("{}{}", INDENT.repeat(depth), scalar_text(other))),
    }
}

/// Render a headed grid with aligned columns.
pub fn grid_to_text(heading: &str, headers: &[String], rows: &[Vec<String>]) -> String {
    let columns = headers
        .len()
        .max(rows.iter().map(Vec::len).max().unwrap_or(0));
    let mut widths = vec![0usize; columns];
    for row in std::iter::once(headers).chain(rows.iter().map(Vec::as_slice)) {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let format_row = |row: &[String]| -> String {
        let cells: Vec<String> = (0..columns)
            .map(|idx| {
                let cell = row.get(idx).map(String::as_str).unwrap_or("");
                let pad = widths[idx].saturating_sub(cell.chars().count());
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect();
        cells.join("  ").trim_end().to_string()
    };

    let rule_width = widths.iter().sum::<usize>() + columns.saturating_sub(1) * 2;
    let mut out = vec![
        heading.to_string(),
        "═".repeat(heading.chars().count().max(rule_width)),
        format_row(headers),
        "─".repeat(rule_width),
    ];
    out.extend(rows.iter().map(|row| format_row(row.as_slice())));
    out.join("\n")
}

/// Text for any dialog body.
pub fn dialog_text(content: &DialogContent) -> String {
    match content {
        DialogContent::Table(value) => json_to_text(value),
        DialogContent::Grid {
            heading,
            headers,
            rows,
        } => grid_to_text(heading, headers, rows),
        DialogContent::Preformatted(text) => text.clone(),
    }
}
