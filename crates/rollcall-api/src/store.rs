//! Locally persisted sign-in state.
//!
//! Only non-sensitive session artifacts survive across runs: the current
//! teacher profile and the backend access token, under a fixed file
//! name, cleared in full on logout.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use rollcall_core::Teacher;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub user: Teacher,
    pub access_token: String,
}

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store under the user config dir (`<config>/rollcall/session.json`).
    pub fn default_location() -> Option<Self> {
        dirs::config_dir().map(|d| Self::at(d.join("rollcall").join("session.json")))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the persisted session. Absent or unreadable state reads as
    /// signed out.
    pub fn load(&self) -> Option<StoredSession> {
        let json = fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&json).ok()
    }

    pub fn save(&self, session: &StoredSession) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session).map_err(io::Error::other)?;
        fs::write(&self.path, json)
    }

    /// Remove the whole persisted state (logout). Already-signed-out is
    /// not an error.
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StoredSession {
        StoredSession {
            user: Teacher {
                id: "t1".into(),
                email: "teacher@school.edu".into(),
            },
            access_token: "tok-123".into(),
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("rollcall").join("session.json"));

        assert!(store.load().is_none());
        store.save(&sample()).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.user.id, "t1");
        assert_eq!(loaded.access_token, "tok-123");
    }

    #[test]
    fn test_corrupt_state_reads_as_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let store = SessionStore::at(path);
        assert!(store.load().is_none());
    }

    #[test]
    fn test_clear_removes_state_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("session.json"));

        store.save(&sample()).unwrap();
        assert!(store.load().is_some());

        store.clear().unwrap();
        assert!(store.load().is_none());
        store.clear().unwrap();
    }
}
