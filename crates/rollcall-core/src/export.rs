//! CSV export of a single session's roll.

use chrono::{DateTime, Local, Utc};

use crate::types::{AttendanceRecord, MISSING_ROLL};

const CSV_HEADER: &str = "Student Name,Roll Number,Status,Time";

/// Render a session's records as a comma-separated table, one row per
/// record under a fixed header.
///
/// Field values are written verbatim; embedded commas or quotes in a
/// student name are not escaped. The timestamp format is comma-free, so
/// well-formed names keep every line at exactly four fields.
pub fn export_session_csv(records: &[AttendanceRecord]) -> String {
    let mut out = String::from(CSV_HEADER);
    for record in records {
        out.push('\n');
        out.push_str(&format!(
            "{},{},{},{}",
            record.student_name(),
            record.student_roll(),
            record.status,
            csv_timestamp(record.created_at),
        ));
    }
    out
}

/// Locale-independent timestamp ("2026-03-04 09:15:00"), local time to
/// stay consistent with the on-screen report.
fn csv_timestamp(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(t) => t
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => MISSING_ROLL.to_string(),
    }
}
