//! CSV export of defect records.

use std::io;

use chrono::SecondsFormat;
use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::DefectRecord;
use crate::error::Result;

/// Column headers, in order.
pub const HEADERS: [&str; 8] = [
    "Timestamp",
    "Defect Type",
    "Product ID",
    "Transaction Type",
    "Stower",
    "Recommended",
    "Actual",
    "Reason",
];

const NOT_AVAILABLE: &str = "N/A";

/// Renders records as CSV, one row per record after the header row.
///
/// Values containing a comma, quote or line break are quoted with inner
/// quotes doubled. Rows are separated by `\n` with no trailing newline.
pub fn export<'a>(records: impl IntoIterator<Item = &'a DefectRecord>) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(HEADERS)?;

    for r in records {
        let timestamp = r.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true);
        let reason = r.override_reason.map(|o| o.code()).unwrap_or(NOT_AVAILABLE);
        writer.write_record([
            timestamp.as_str(),
            r.defect_type.as_str(),
            r.product_id.as_str(),
            r.transaction_type.as_str(),
            r.stower_id.as_deref().unwrap_or(""),
            r.recommended_location.as_deref().unwrap_or(NOT_AVAILABLE),
            r.actual_location.as_deref().unwrap_or(NOT_AVAILABLE),
            reason,
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| io::Error::new(e.error().kind(), e.to_string()))?;
    let mut text = String::from_utf8_lossy(&bytes).into_owned();
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}
