//! rollcall-capture: image acquisition for attendance submissions.
//!
//! Produces exactly one image payload per workflow, from a file picker
//! path or a single live camera frame, with retake/cancel semantics.
//! The camera is the only system resource touched and is held
//! exclusively by one workflow at a time.

pub mod camera;
pub mod controller;
pub mod frame;

pub use camera::{CameraDevice, CameraError, DeviceInfo, PixelFormat};
pub use controller::{
    CameraSource, CaptureController, CaptureError, CaptureState, ImagePayload, MAX_IMAGE_BYTES,
};
