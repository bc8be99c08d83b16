//! Capture workflow state machine.
//!
//! A controller produces exactly one image payload per workflow, from a
//! file on disk or a single live camera frame. The camera handle is a
//! scoped resource: acquired by `open_camera`, released by exactly one
//! of `capture`, `cancel` or teardown, on every exit path.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

use crate::camera::CameraError;

/// Largest accepted image payload (5 MiB). Checked before any payload is
/// held, so an oversized file never reaches the network layer.
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("image is {size} bytes; the limit is {limit}")]
    ImageTooLarge { size: u64, limit: u64 },
    #[error("camera access denied or unavailable: {0}")]
    CameraUnavailable(#[source] CameraError),
    #[error("a camera feed is already live")]
    CameraBusy,
    #[error("no live camera feed to capture from")]
    NoLiveFeed,
    #[error("could not read image file: {0}")]
    FileRead(#[from] std::io::Error),
}

/// A live camera feed the controller can snapshot. Dropping the source
/// releases the underlying device.
pub trait CameraSource {
    /// Capture one still frame as an encoded JPEG.
    fn snapshot(&mut self) -> Result<Vec<u8>, CameraError>;
}

/// The binary image payload a capture workflow produces, ready to attach
/// to a registration or attendance submission.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

/// Observable controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    CameraActive,
    HasImage,
}

enum Mode {
    Idle,
    CameraActive(Box<dyn CameraSource>),
    HasImage(ImagePayload),
}

pub struct CaptureController {
    mode: Mode,
}

impl CaptureController {
    pub fn new() -> Self {
        Self { mode: Mode::Idle }
    }

    pub fn state(&self) -> CaptureState {
        match self.mode {
            Mode::Idle => CaptureState::Idle,
            Mode::CameraActive(_) => CaptureState::CameraActive,
            Mode::HasImage(_) => CaptureState::HasImage,
        }
    }

    pub fn payload(&self) -> Option<&ImagePayload> {
        match &self.mode {
            Mode::HasImage(payload) => Some(payload),
            _ => None,
        }
    }

    /// Hand the payload to the caller for submission, returning the
    /// controller to `Idle`.
    pub fn take_payload(&mut self) -> Option<ImagePayload> {
        match std::mem::replace(&mut self.mode, Mode::Idle) {
            Mode::HasImage(payload) => Some(payload),
            other => {
                self.mode = other;
                None
            }
        }
    }

    /// Accept an image file from disk.
    ///
    /// The size check runs against file metadata before the file is
    /// read; on failure the controller state is unchanged.
    pub fn select_file(&mut self, path: &Path) -> Result<(), CaptureError> {
        let meta = fs::metadata(path)?;
        if meta.len() > MAX_IMAGE_BYTES {
            return Err(CaptureError::ImageTooLarge {
                size: meta.len(),
                limit: MAX_IMAGE_BYTES,
            });
        }
        let bytes = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let mime_type = mime_for_extension(path);
        self.select_image(bytes, file_name, mime_type)
    }

    /// Accept an in-memory image blob.
    ///
    /// On success the controller holds the payload (`HasImage`),
    /// replacing any previous one and releasing a live feed. On an
    /// oversize blob nothing changes.
    pub fn select_image(
        &mut self,
        bytes: Vec<u8>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Result<(), CaptureError> {
        if bytes.len() as u64 > MAX_IMAGE_BYTES {
            return Err(CaptureError::ImageTooLarge {
                size: bytes.len() as u64,
                limit: MAX_IMAGE_BYTES,
            });
        }
        self.mode = Mode::HasImage(ImagePayload {
            bytes,
            file_name: file_name.into(),
            mime_type: mime_type.into(),
        });
        Ok(())
    }

    /// Acquire a live camera feed.
    ///
    /// Legal from `Idle` or `HasImage` (a retake discards the held
    /// payload); a second live feed is refused. If acquisition fails the
    /// controller reverts to `Idle` and the device error surfaces as
    /// `CameraUnavailable`.
    pub fn open_camera<F>(&mut self, open: F) -> Result<(), CaptureError>
    where
        F: FnOnce() -> Result<Box<dyn CameraSource>, CameraError>,
    {
        if matches!(self.mode, Mode::CameraActive(_)) {
            return Err(CaptureError::CameraBusy);
        }
        match open() {
            Ok(source) => {
                self.mode = Mode::CameraActive(source);
                Ok(())
            }
            Err(err) => {
                self.mode = Mode::Idle;
                Err(CaptureError::CameraUnavailable(err))
            }
        }
    }

    /// Snapshot the live feed into a still payload.
    ///
    /// Only valid while a feed is live. The device is released on every
    /// exit path: success lands in `HasImage`, a snapshot failure lands
    /// back in `Idle`.
    pub fn capture(&mut self) -> Result<(), CaptureError> {
        match std::mem::replace(&mut self.mode, Mode::Idle) {
            Mode::CameraActive(mut source) => {
                let bytes = source
                    .snapshot()
                    .map_err(CaptureError::CameraUnavailable)?;
                drop(source);
                self.select_image(bytes, "camera_capture.jpg", "image/jpeg")
            }
            other => {
                self.mode = other;
                Err(CaptureError::NoLiveFeed)
            }
        }
    }

    /// Abandon a live feed, releasing the device. No-op in other states,
    /// so callers may invoke it unconditionally on the way out.
    pub fn cancel(&mut self) {
        if matches!(self.mode, Mode::CameraActive(_)) {
            self.mode = Mode::Idle;
        }
    }

    /// Discard any payload or live feed and return to `Idle`.
    pub fn reset(&mut self) {
        self.mode = Mode::Idle;
    }

    /// Preview representation of the held payload, as a data URL. Does
    /// not mutate the payload.
    pub fn preview_data_url(&self) -> Option<String> {
        self.payload()
            .map(|p| format!("data:{};base64,{}", p.mime_type, BASE64.encode(&p.bytes)))
    }
}

impl Default for CaptureController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CaptureController {
    // Teardown closes the scoped-resource contract: a live device is
    // released even if the surrounding flow disappears mid-capture.
    fn drop(&mut self) {
        self.reset();
    }
}

fn mime_for_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Stand-in camera recording whether the device was released.
    struct FakeCamera {
        released: Arc<AtomicBool>,
        fail_snapshot: bool,
    }

    impl FakeCamera {
        fn source(released: &Arc<AtomicBool>, fail_snapshot: bool) -> Box<dyn CameraSource> {
            Box::new(FakeCamera {
                released: released.clone(),
                fail_snapshot,
            })
        }
    }

    impl CameraSource for FakeCamera {
        fn snapshot(&mut self) -> Result<Vec<u8>, CameraError> {
            if self.fail_snapshot {
                Err(CameraError::CaptureFailed("stream stalled".into()))
            } else {
                Ok(vec![0xFF, 0xD8, 0xFF, 0xE0])
            }
        }
    }

    impl Drop for FakeCamera {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_select_image_happy_path() {
        let mut ctl = CaptureController::new();
        assert_eq!(ctl.state(), CaptureState::Idle);

        ctl.select_image(vec![1, 2, 3], "class.jpg", "image/jpeg")
            .unwrap();
        assert_eq!(ctl.state(), CaptureState::HasImage);
        assert_eq!(ctl.payload().unwrap().file_name, "class.jpg");
    }

    #[test]
    fn test_oversized_image_rejected_state_unchanged() {
        let mut ctl = CaptureController::new();
        let six_mib = vec![0u8; 6 * 1024 * 1024];

        let err = ctl
            .select_image(six_mib, "big.jpg", "image/jpeg")
            .unwrap_err();
        assert!(matches!(err, CaptureError::ImageTooLarge { .. }));
        assert_eq!(ctl.state(), CaptureState::Idle);
        assert!(ctl.payload().is_none());
    }

    #[test]
    fn test_select_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("class.png");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(&[137, 80, 78, 71]).unwrap();

        let mut ctl = CaptureController::new();
        ctl.select_file(&path).unwrap();
        assert_eq!(ctl.state(), CaptureState::HasImage);
        let payload = ctl.payload().unwrap();
        assert_eq!(payload.file_name, "class.png");
        assert_eq!(payload.mime_type, "image/png");
    }

    #[test]
    fn test_select_file_missing_is_error() {
        let mut ctl = CaptureController::new();
        let err = ctl.select_file(Path::new("/nonexistent/class.jpg"));
        assert!(matches!(err, Err(CaptureError::FileRead(_))));
        assert_eq!(ctl.state(), CaptureState::Idle);
    }

    #[test]
    fn test_camera_capture_flow() {
        let released = Arc::new(AtomicBool::new(false));
        let mut ctl = CaptureController::new();

        ctl.open_camera(|| Ok(FakeCamera::source(&released, false)))
            .unwrap();
        assert_eq!(ctl.state(), CaptureState::CameraActive);
        assert!(!released.load(Ordering::SeqCst));

        ctl.capture().unwrap();
        assert_eq!(ctl.state(), CaptureState::HasImage);
        assert!(released.load(Ordering::SeqCst), "device not released");

        let payload = ctl.payload().unwrap();
        assert_eq!(payload.file_name, "camera_capture.jpg");
        assert_eq!(payload.mime_type, "image/jpeg");
    }

    #[test]
    fn test_open_camera_denied_reverts_to_idle() {
        let mut ctl = CaptureController::new();
        let err = ctl.open_camera(|| Err(CameraError::DeviceNotFound("/dev/video9".into())));
        assert!(matches!(err, Err(CaptureError::CameraUnavailable(_))));
        assert_eq!(ctl.state(), CaptureState::Idle);
        assert!(ctl.payload().is_none());
    }

    #[test]
    fn test_capture_without_feed_is_error() {
        let mut ctl = CaptureController::new();
        assert!(matches!(ctl.capture(), Err(CaptureError::NoLiveFeed)));
        assert_eq!(ctl.state(), CaptureState::Idle);
    }

    #[test]
    fn test_second_feed_refused() {
        let released = Arc::new(AtomicBool::new(false));
        let mut ctl = CaptureController::new();
        ctl.open_camera(|| Ok(FakeCamera::source(&released, false)))
            .unwrap();

        let err = ctl.open_camera(|| Ok(FakeCamera::source(&released, false)));
        assert!(matches!(err, Err(CaptureError::CameraBusy)));
        // The original feed is still live
        assert_eq!(ctl.state(), CaptureState::CameraActive);
        assert!(!released.load(Ordering::SeqCst));
    }

    #[test]
    fn test_cancel_releases_device() {
        let released = Arc::new(AtomicBool::new(false));
        let mut ctl = CaptureController::new();
        ctl.open_camera(|| Ok(FakeCamera::source(&released, false)))
            .unwrap();

        ctl.cancel();
        assert_eq!(ctl.state(), CaptureState::Idle);
        assert!(released.load(Ordering::SeqCst));

        // Safe to call again with nothing live
        ctl.cancel();
        assert_eq!(ctl.state(), CaptureState::Idle);
    }

    #[test]
    fn test_snapshot_failure_releases_device_and_idles() {
        let released = Arc::new(AtomicBool::new(false));
        let mut ctl = CaptureController::new();
        ctl.open_camera(|| Ok(FakeCamera::source(&released, true)))
            .unwrap();

        let err = ctl.capture();
        assert!(matches!(err, Err(CaptureError::CameraUnavailable(_))));
        assert_eq!(ctl.state(), CaptureState::Idle);
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn test_teardown_releases_device() {
        let released = Arc::new(AtomicBool::new(false));
        {
            let mut ctl = CaptureController::new();
            ctl.open_camera(|| Ok(FakeCamera::source(&released, false)))
                .unwrap();
            // Controller dropped while the feed is live
        }
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn test_retake_from_held_image() {
        let released = Arc::new(AtomicBool::new(false));
        let mut ctl = CaptureController::new();
        ctl.select_image(vec![1], "old.jpg", "image/jpeg").unwrap();

        ctl.open_camera(|| Ok(FakeCamera::source(&released, false)))
            .unwrap();
        assert_eq!(ctl.state(), CaptureState::CameraActive);
        ctl.capture().unwrap();
        assert_eq!(ctl.payload().unwrap().file_name, "camera_capture.jpg");
    }

    #[test]
    fn test_reset_discards_payload() {
        let mut ctl = CaptureController::new();
        ctl.select_image(vec![1, 2], "x.jpg", "image/jpeg").unwrap();
        ctl.reset();
        assert_eq!(ctl.state(), CaptureState::Idle);
        assert!(ctl.payload().is_none());
    }

    #[test]
    fn test_take_payload_consumes() {
        let mut ctl = CaptureController::new();
        ctl.select_image(vec![9, 9], "x.jpg", "image/jpeg").unwrap();

        let payload = ctl.take_payload().unwrap();
        assert_eq!(payload.bytes, vec![9, 9]);
        assert_eq!(ctl.state(), CaptureState::Idle);
        assert!(ctl.take_payload().is_none());
    }

    #[test]
    fn test_preview_data_url() {
        let mut ctl = CaptureController::new();
        assert!(ctl.preview_data_url().is_none());

        ctl.select_image(vec![0xFF, 0xD8], "x.jpg", "image/jpeg")
            .unwrap();
        let url = ctl.preview_data_url().unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
        // Preview generation leaves the payload untouched
        assert_eq!(ctl.payload().unwrap().bytes, vec![0xFF, 0xD8]);
    }
}
