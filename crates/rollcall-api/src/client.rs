//! Async HTTP client for the recognition/session backend.
//!
//! Face matching and persistence live behind these endpoints; the
//! client submits multipart photo payloads and decodes the responses
//! through the wire layer. Failed requests are never retried here; the
//! user re-runs the operation.

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

use rollcall_core::{AttendanceRecord, AttendanceSession, Student, Teacher};

use crate::error::ApiError;
use crate::store::StoredSession;
use crate::wire;

/// Development-server default, overridable via configuration.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Image attachment for a multipart submission.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

impl Attachment {
    fn into_part(self) -> Result<Part, ApiError> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime_type)?)
    }
}

/// Result of a classroom-photo submission.
#[derive(Debug, Clone)]
pub struct AttendanceOutcome {
    pub session_id: String,
    pub present_count: u32,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            token: None,
        }
    }

    /// Attach the bearer token sent with every subsequent request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<Teacher, ApiError> {
        tracing::info!(email, "signing up teacher");
        let form = credentials_form(email, password);
        let resp: wire::SignupResponse = self
            .send(self.post("/teacher/signup").multipart(form))
            .await?;
        Ok(wire::teacher_from_wire(resp.user))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<StoredSession, ApiError> {
        tracing::info!(email, "logging in teacher");
        let form = credentials_form(email, password);
        let resp: wire::LoginResponse = self
            .send(self.post("/teacher/login").multipart(form))
            .await?;
        Ok(StoredSession {
            user: wire::teacher_from_wire(resp.user),
            access_token: resp.session.access_token,
        })
    }

    /// Full roster, in backend order.
    pub async fn students(&self) -> Result<Vec<Student>, ApiError> {
        self.send(self.get("/students")).await
    }

    /// Register a student with their reference photo. Returns the new
    /// student's id.
    pub async fn register_student(
        &self,
        name: &str,
        roll_number: &str,
        image: Attachment,
    ) -> Result<String, ApiError> {
        tracing::info!(name, roll_number, "registering student");
        let form = Form::new()
            .text("name", name.to_string())
            .text("roll_number", roll_number.to_string())
            .part("image", image.into_part()?);
        let resp: wire::RegisterStudentResponse = self
            .send(self.post("/register-student").multipart(form))
            .await?;
        Ok(resp.student_id)
    }

    /// Submit a classroom photo for recognition, creating a session.
    pub async fn take_attendance(
        &self,
        subject: &str,
        teacher_id: &str,
        image: Attachment,
    ) -> Result<AttendanceOutcome, ApiError> {
        tracing::info!(subject, "submitting classroom photo");
        let form = Form::new()
            .text("subject", subject.to_string())
            .text("teacher_id", teacher_id.to_string())
            .part("image", image.into_part()?);
        let resp: wire::TakeAttendanceResponse = self
            .send(self.post("/take-attendance").multipart(form))
            .await?;
        Ok(AttendanceOutcome {
            session_id: resp.session_id,
            present_count: resp.present_count,
        })
    }

    /// Session history for a teacher, newest first.
    pub async fn history(&self, teacher_id: &str) -> Result<Vec<AttendanceSession>, ApiError> {
        let rows: Vec<wire::SessionDto> = self
            .send(
                self.get("/attendance-history")
                    .query(&[("teacher_id", teacher_id)]),
            )
            .await?;
        Ok(rows.into_iter().map(wire::session_from_wire).collect())
    }

    /// Recognized-present records of one session, with joined students.
    pub async fn session_details(
        &self,
        session_id: &str,
    ) -> Result<Vec<AttendanceRecord>, ApiError> {
        let rows: Vec<wire::RecordDto> = self
            .send(self.get(&format!("/attendance-history/{session_id}")))
            .await?;
        Ok(rows.into_iter().map(wire::record_from_wire).collect())
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.http.get(format!("{}{path}", self.base_url)))
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.http.post(format!("{}{path}", self.base_url)))
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<wire::ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .unwrap_or_else(|| format!("request failed with status {status}"));
            tracing::warn!(status = status.as_u16(), %message, "backend rejected request");
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp.json().await?)
    }
}

fn credentials_form(email: &str, password: &str) -> Form {
    Form::new()
        .text("email", email.to_string())
        .text("password", password.to_string())
}
