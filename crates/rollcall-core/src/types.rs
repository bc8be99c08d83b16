use std::fmt;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Display sentinel for a record whose student row no longer exists.
pub const UNKNOWN_STUDENT: &str = "Unknown";
/// Display sentinel for a missing roll number.
pub const MISSING_ROLL: &str = "N/A";

/// Signed-in teacher profile, as returned by the auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub id: String,
    pub email: String,
}

/// A registered student. Immutable once created; the product has no
/// edit or delete flows for roster rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub roll_number: String,
    /// Reference-photo location, when the backend exposes one.
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// One attendance-taking event tied to a subject and timestamp.
/// Sessions are append-only history; they are never edited.
#[derive(Debug, Clone)]
pub struct AttendanceSession {
    pub id: String,
    pub subject: String,
    pub teacher_id: String,
    /// `None` when the backend sent an unparseable timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Number of students recognized present in this session.
    pub record_count: u32,
}

/// Present/absent marker. The backend only ever stores `Present`;
/// `Absent` is derived client-side by subtracting a session's records
/// from the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttendanceStatus::Present => write!(f, "present"),
            AttendanceStatus::Absent => write!(f, "absent"),
        }
    }
}

/// Roster fields the backend joins onto a record.
#[derive(Debug, Clone)]
pub struct RecordStudent {
    pub name: String,
    pub roll_number: String,
}

/// One recognized-present student within a session.
#[derive(Debug, Clone)]
pub struct AttendanceRecord {
    pub id: String,
    pub session_id: String,
    pub student_id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub status: AttendanceStatus,
    /// Joined student row. `None` when the roster was mutated after the
    /// session was taken; display falls back to sentinels.
    pub student: Option<RecordStudent>,
    /// Subject echoed onto the record by the backend (shape varies, see
    /// the wire layer); used to head per-session reports.
    pub session_subject: Option<String>,
}

impl AttendanceRecord {
    pub fn student_name(&self) -> &str {
        self.student
            .as_ref()
            .map(|s| s.name.as_str())
            .unwrap_or(UNKNOWN_STUDENT)
    }

    pub fn student_roll(&self) -> &str {
        self.student
            .as_ref()
            .map(|s| s.roll_number.as_str())
            .unwrap_or(MISSING_ROLL)
    }
}

/// Human-readable local timestamp for listings ("Mar 04, 2026 09:15 AM").
/// Missing timestamps render as an empty string, matching the product's
/// listings which simply omit the time.
pub fn display_timestamp(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(t) => t
            .with_timezone(&Local)
            .format("%b %d, %Y %I:%M %p")
            .to_string(),
        None => String::new(),
    }
}
