//! Session analytics: date-bucketed trend series and running summary
//! statistics for the dashboard.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};

use crate::types::AttendanceSession;

/// One point of the attendance trend: a local calendar date and the
/// total recognized-present count across that date's sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub total_present: u32,
}

impl TrendPoint {
    /// Chart axis label ("Mar 04").
    pub fn label(&self) -> String {
        self.date.format("%b %d").to_string()
    }
}

/// Running totals shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub total_sessions: usize,
    pub average_class_size: u32,
}

/// Group sessions by local calendar date, summing record counts.
///
/// Output is ordered by date ascending, so truncating to the trailing N
/// points yields the most recent N dates. Sessions with zero records
/// still contribute a zero-valued bucket; sessions whose timestamp did
/// not parse are skipped. Empty input produces an empty series (the
/// caller renders its no-data state, not an error).
pub fn bucket_by_date(sessions: &[AttendanceSession]) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for session in sessions {
        let Some(created) = session.created_at else {
            continue;
        };
        let date = created.with_timezone(&Local).date_naive();
        *buckets.entry(date).or_insert(0) += session.record_count;
    }
    buckets
        .into_iter()
        .map(|(date, total_present)| TrendPoint {
            date,
            total_present,
        })
        .collect()
}

/// Session count and round-half-up average class size. Zero sessions
/// yields a zero average rather than dividing.
pub fn compute_summary(sessions: &[AttendanceSession]) -> Summary {
    if sessions.is_empty() {
        return Summary::default();
    }
    let total: u32 = sessions.iter().map(|s| s.record_count).sum();
    let average = (f64::from(total) / sessions.len() as f64).round() as u32;
    Summary {
        total_sessions: sessions.len(),
        average_class_size: average,
    }
}

/// Leading slice of an already newest-first history listing.
pub fn recent_sessions(sessions: &[AttendanceSession], n: usize) -> &[AttendanceSession] {
    &sessions[..n.min(sessions.len())]
}
