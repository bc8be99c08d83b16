//! rollcall-core: attendance domain model, roster reconciliation and
//! session analytics.
//!
//! Everything here is pure and total over well-formed input; no I/O and
//! no panics. Missing relations (a record whose student row was deleted)
//! render as sentinel display values rather than errors.

pub mod analytics;
pub mod export;
pub mod reconcile;
pub mod types;

pub use analytics::{bucket_by_date, compute_summary, recent_sessions, Summary, TrendPoint};
pub use export::export_session_csv;
pub use reconcile::{filter_matching, partition_attendance, Partition};
pub use types::{
    AttendanceRecord, AttendanceSession, AttendanceStatus, RecordStudent, Student, Teacher,
};
