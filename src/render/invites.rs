//! Invite code report grid.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use super::html::scalar_text;
use crate::traits::DialogContent;

pub const INVITES_HEADING: &str = "Existing invite codes";

pub const INVITES_COLUMNS: [&str; 5] = ["Code", "Created", "Max", "Expires", "Used"];

/// Build the invite report grid from the `data` array of the report.
pub fn invites_grid(data: &Value) -> DialogContent {
    let rows = data
        .as_array()
        .map(|invites| invites.iter().map(invite_row).collect())
        .unwrap_or_default();

    DialogContent::Grid {
        heading: INVITES_HEADING.to_string(),
        headers: INVITES_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}

fn invite_row(invite: &Value) -> Vec<String> {
    vec![
        scalar_text(&invite["invite_code"]),
        format_date(&invite["time_created"]),
        or_fallback(&invite["max_count"], "Unlimited"),
        format_date(&invite["expires_on"]),
        or_fallback(&invite["count"], "NA"),
    ]
}

/// Falsy values (absent, null, 0, "", false) show the fallback.
fn or_fallback(value: &Value, fallback: &str) -> String {
    let falsy = match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    };
    if falsy {
        fallback.to_string()
    } else {
        scalar_text(value)
    }
}

/// ISO 8601 timestamp in local time. Timestamps without an offset are UTC.
/// Unparseable values are shown as sent.
fn format_date(value: &Value) -> String {
    let raw = scalar_text(value);
    parse_timestamp(&raw)
        .map(|utc| {
            Local
                .from_utc_datetime(&utc.naive_utc())
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or(raw)
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}
