//! CSV upload payloads
//!
//! The Datasets Service expects headerless CSV in schema column order:
//! comma separated, CRLF terminated, fields quoted only when they contain a
//! delimiter, quote or line break, and embedded quotes doubled. No
//! backslash escaping.

use ::csv::{QuoteStyle, Terminator, WriterBuilder};
use datasync_domain::{CellValue, Result, SyncError};

use crate::schema::normalize_cell;

/// Render one cell as CSV field text. Null and non-finite floats are the
/// empty field.
fn field_text(value: &CellValue) -> String {
    match value {
        CellValue::Null => String::new(),
        CellValue::String(text) => text.clone(),
        CellValue::Integer(number) => number.to_string(),
        CellValue::Float(number) if number.is_finite() => number.to_string(),
        CellValue::Float(_) => String::new(),
        CellValue::Boolean(flag) => field_text(&normalize_cell(CellValue::Boolean(*flag))),
        CellValue::Json(value) => value.to_string(),
    }
}

/// Encode projected rows as a CSV body.
///
/// # Errors
/// `SyncError::Serialization` if the writer fails; with an in-memory sink
/// this only happens on an internal encoding fault.
pub fn encode_csv(rows: &[Vec<CellValue>]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .delimiter(b',')
        .quote(b'"')
        .double_quote(true)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    for row in rows {
        writer
            .write_record(row.iter().map(field_text))
            .map_err(|e| SyncError::Serialization(format!("csv write failed: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| SyncError::Serialization(format!("csv flush failed: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| SyncError::Serialization(format!("csv output is not utf-8: {e}")))
}
