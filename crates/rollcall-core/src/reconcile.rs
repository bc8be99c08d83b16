//! Roster reconciliation: derive the present/absent split for a session
//! and the shared search rule used by every student listing.

use std::collections::HashSet;

use crate::types::{AttendanceRecord, Student};

/// Roster split for a single session.
///
/// `present` echoes the session's records in recognition order, exactly
/// as the backend returned them; `absent` preserves roster order. The
/// split is recomputed per view and never persisted.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub present: Vec<AttendanceRecord>,
    pub absent: Vec<Student>,
}

/// Split the roster against a session's records.
///
/// A student is absent iff no record carries their id. Runs in
/// O(|roster| + |records|).
pub fn partition_attendance(roster: &[Student], records: &[AttendanceRecord]) -> Partition {
    let present_ids: HashSet<&str> = records.iter().map(|r| r.student_id.as_str()).collect();

    let absent: Vec<Student> = roster
        .iter()
        .filter(|s| !present_ids.contains(s.id.as_str()))
        .cloned()
        .collect();

    tracing::debug!(
        roster = roster.len(),
        present = records.len(),
        absent = absent.len(),
        "partitioned attendance"
    );

    Partition {
        present: records.to_vec(),
        absent,
    }
}

/// Case-insensitive substring search against any of the supplied key
/// extractors. An empty query returns every item, in order. Present and
/// absent listings share this one rule.
pub fn filter_matching<'a, T>(items: &'a [T], query: &str, keys: &[fn(&T) -> &str]) -> Vec<&'a T> {
    if query.is_empty() {
        return items.iter().collect();
    }
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| keys.iter().any(|key| key(item).to_lowercase().contains(&needle)))
        .collect()
}
