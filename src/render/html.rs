//! HTML rendering of dialog content.
//!
//! Every string that came from the server passes through [`escape_html`]
//! before it is placed in markup.

use serde_json::Value;
use std::fmt::Write;

use crate::traits::DialogContent;

/// Escape `& < > " '` for use in element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Plain-text form of a leaf value. Strings are unquoted.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(scalar_text).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

/// Render JSON as nested tables.
///
/// Objects become two-column tables (key, value) with nested objects
/// expanded recursively. Arrays are flattened to comma-delimited text and
/// scalars are inserted as escaped text.
pub fn json_to_html_table(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Object(map) => {
            out.push_str("<table class=\"table table-condensed\">");
            for (key, item) in map {
                let _ = write!(out, "<tr><th>{}</th><td>", escape_html(key));
                write_value(out, item);
                out.push_str("</td></tr>");
            }
            out.push_str("</table>");
        }
        other => out.push_str(&escape_html(&scalar_text(other))),
    }
}

/// Render a headed grid as a striped table.
pub fn grid_to_html(heading: &str, headers: &[String], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    let _ = write!(out, "<h2>{}</h2>", escape_html(heading));
    out.push_str("<table class=\"table table-striped\"><thead><tr>");
    for header in headers {
        let _ = write!(out, "<th>{}</th>", escape_html(header));
    }
    out.push_str("</tr></thead><tbody>");
    for row in rows {
        out.push_str("<tr>");
        for cell in row {
            let _ = write!(out, "<td>{}</td>", escape_html(cell));
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    out
}

/// Markup for any dialog body.
pub fn dialog_html(content: &DialogContent) -> String {
    match content {
        DialogContent::Table(value) => json_to_html_table(value),
        DialogContent::Grid {
            heading,
            headers,
            rows,
        } => grid_to_html(heading, headers, rows),
        DialogContent::Preformatted(text) => format!("<pre>{}</pre>", escape_html(text)),
    }
}
