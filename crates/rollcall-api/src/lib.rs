//! rollcall-api: HTTP client for the recognition/session backend.
//!
//! The backend owns face matching and all persistence; this crate owns
//! the wire shapes (with their observed optional-field quirks),
//! bearer-token attachment and the locally persisted sign-in state.

pub mod client;
pub mod error;
pub mod store;
pub mod wire;

pub use client::{ApiClient, Attachment, AttendanceOutcome, DEFAULT_API_URL};
pub use error::ApiError;
pub use store::{SessionStore, StoredSession};
