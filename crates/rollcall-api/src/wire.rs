//! Wire shapes for the recognition backend.
//!
//! Every field the backend has been observed to omit is an `Option`
//! here, and fallback values are applied in this one conversion layer
//! instead of scattered across views. Malformed timestamps degrade to
//! `None` rather than failing a whole response.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use rollcall_core::types::{
    AttendanceRecord, AttendanceSession, AttendanceStatus, RecordStudent, Teacher, MISSING_ROLL,
    UNKNOWN_STUDENT,
};

/// `user` object returned by the auth endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct UserDto {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignupResponse {
    pub user: UserDto,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub user: UserDto,
    pub session: SessionTokenDto,
}

#[derive(Debug, Deserialize)]
pub struct SessionTokenDto {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterStudentResponse {
    pub student_id: String,
}

#[derive(Debug, Deserialize)]
pub struct TakeAttendanceResponse {
    pub session_id: String,
    pub present_count: u32,
}

/// History row: a session with its record count nested Supabase-style
/// as `attendance_records: [{"count": N}]`.
#[derive(Debug, Deserialize)]
pub struct SessionDto {
    pub id: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub attendance_records: Vec<RecordCountDto>,
}

#[derive(Debug, Deserialize)]
pub struct RecordCountDto {
    #[serde(default)]
    pub count: Option<u32>,
}

/// Session-detail row: a record with its joined student row and,
/// depending on backend version, session fields either flat on the
/// record or nested under `attendance_sessions`.
#[derive(Debug, Deserialize)]
pub struct RecordDto {
    pub id: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub students: Option<StudentJoinDto>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub attendance_sessions: Option<SessionJoinDto>,
}

#[derive(Debug, Deserialize)]
pub struct StudentJoinDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub roll_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionJoinDto {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Error body (`{"detail": "..."}`).
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

pub fn teacher_from_wire(user: UserDto) -> Teacher {
    Teacher {
        id: user.id,
        email: user.email.unwrap_or_default(),
    }
}

pub fn session_from_wire(dto: SessionDto) -> AttendanceSession {
    let record_count = dto
        .attendance_records
        .first()
        .and_then(|r| r.count)
        .unwrap_or(0);
    AttendanceSession {
        id: dto.id,
        subject: dto.subject.unwrap_or_else(|| "Class".to_string()),
        teacher_id: dto.teacher_id.unwrap_or_default(),
        created_at: parse_timestamp(dto.created_at.as_deref()),
        record_count,
    }
}

pub fn record_from_wire(dto: RecordDto) -> AttendanceRecord {
    // Subject and date have been observed nested under
    // `attendance_sessions` on some backend versions and flat on the
    // record on others; fall back across both, like the shipped client.
    // Flagged to the backend-API owners as a shape inconsistency.
    let session_subject = dto
        .attendance_sessions
        .as_ref()
        .and_then(|s| s.subject.clone())
        .or(dto.subject);
    let created_at = parse_timestamp(dto.created_at.as_deref()).or_else(|| {
        parse_timestamp(
            dto.attendance_sessions
                .as_ref()
                .and_then(|s| s.created_at.as_deref()),
        )
    });
    let status = match dto.status.as_deref() {
        Some("absent") => AttendanceStatus::Absent,
        // The backend only ever writes "present"
        _ => AttendanceStatus::Present,
    };
    let student = dto.students.map(|s| RecordStudent {
        name: s.name.unwrap_or_else(|| UNKNOWN_STUDENT.to_string()),
        roll_number: s.roll_number.unwrap_or_else(|| MISSING_ROLL.to_string()),
    });

    AttendanceRecord {
        id: dto.id,
        session_id: dto.session_id.unwrap_or_default(),
        student_id: dto.student_id.unwrap_or_default(),
        created_at,
        status,
        student,
        session_subject,
    }
}

/// Parse a backend timestamp. Accepts RFC 3339 with offset and the
/// offset-less form Supabase sometimes emits, which is taken as UTC.
fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|t| t.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_row_flattens_nested_count() {
        let dto: SessionDto = serde_json::from_str(
            r#"{
                "id": "s1",
                "subject": "Math",
                "teacher_id": "t1",
                "created_at": "2026-03-04T09:15:00+00:00",
                "attendance_records": [{"count": 23}]
            }"#,
        )
        .unwrap();
        let session = session_from_wire(dto);
        assert_eq!(session.record_count, 23);
        assert_eq!(session.subject, "Math");
        assert!(session.created_at.is_some());
    }

    #[test]
    fn test_history_row_missing_count_defaults_to_zero() {
        let empty: SessionDto =
            serde_json::from_str(r#"{"id": "s1", "attendance_records": []}"#).unwrap();
        assert_eq!(session_from_wire(empty).record_count, 0);

        let absent: SessionDto = serde_json::from_str(r#"{"id": "s2"}"#).unwrap();
        let session = session_from_wire(absent);
        assert_eq!(session.record_count, 0);
        assert_eq!(session.subject, "Class");
        assert!(session.created_at.is_none());
    }

    #[test]
    fn test_record_with_joined_student() {
        let dto: RecordDto = serde_json::from_str(
            r#"{
                "id": "r1",
                "session_id": "s1",
                "student_id": "st1",
                "status": "present",
                "created_at": "2026-03-04T09:15:00+00:00",
                "students": {"name": "Alice", "roll_number": "CS101"}
            }"#,
        )
        .unwrap();
        let record = record_from_wire(dto);
        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.student_name(), "Alice");
        assert_eq!(record.student_roll(), "CS101");
    }

    #[test]
    fn test_record_missing_student_keeps_sentinels() {
        let dto: RecordDto =
            serde_json::from_str(r#"{"id": "r1", "student_id": "gone"}"#).unwrap();
        let record = record_from_wire(dto);
        assert!(record.student.is_none());
        assert_eq!(record.student_name(), "Unknown");
        assert_eq!(record.student_roll(), "N/A");
    }

    #[test]
    fn test_record_subject_prefers_nested_session() {
        let dto: RecordDto = serde_json::from_str(
            r#"{
                "id": "r1",
                "subject": "Flat",
                "attendance_sessions": {"subject": "Nested", "created_at": "2026-03-04T09:15:00+00:00"}
            }"#,
        )
        .unwrap();
        let record = record_from_wire(dto);
        assert_eq!(record.session_subject.as_deref(), Some("Nested"));
        // Record-level created_at missing: the nested session timestamp fills in
        assert!(record.created_at.is_some());
    }

    #[test]
    fn test_record_subject_falls_back_to_flat() {
        let dto: RecordDto =
            serde_json::from_str(r#"{"id": "r1", "subject": "Flat"}"#).unwrap();
        assert_eq!(
            record_from_wire(dto).session_subject.as_deref(),
            Some("Flat")
        );
    }

    #[test]
    fn test_malformed_timestamp_degrades_to_none() {
        let dto: RecordDto = serde_json::from_str(
            r#"{"id": "r1", "created_at": "not-a-date", "status": "present"}"#,
        )
        .unwrap();
        assert!(record_from_wire(dto).created_at.is_none());
    }

    #[test]
    fn test_offsetless_timestamp_taken_as_utc() {
        let dto: RecordDto = serde_json::from_str(
            r#"{"id": "r1", "created_at": "2026-03-04T09:15:00.123456"}"#,
        )
        .unwrap();
        assert!(record_from_wire(dto).created_at.is_some());
    }

    #[test]
    fn test_login_response_shape() {
        let resp: LoginResponse = serde_json::from_str(
            r#"{
                "message": "Login successful",
                "user": {"id": "t1", "email": "teacher@school.edu"},
                "session": {"access_token": "tok-123", "expires_in": 3600}
            }"#,
        )
        .unwrap();
        assert_eq!(resp.session.access_token, "tok-123");
        let teacher = teacher_from_wire(resp.user);
        assert_eq!(teacher.email, "teacher@school.edu");
    }
}
