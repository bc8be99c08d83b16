/// Client configuration, loaded from environment variables.
pub struct Config {
    /// Recognition backend base URL.
    pub api_url: String,
    /// V4L2 device path used for live capture.
    pub camera_device: String,
}

impl Config {
    /// Load configuration from `ROLLCALL_*` environment variables with
    /// defaults.
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("ROLLCALL_API_URL")
                .unwrap_or_else(|_| rollcall_api::DEFAULT_API_URL.to_string()),
            camera_device: std::env::var("ROLLCALL_CAMERA_DEVICE")
                .unwrap_or_else(|_| "/dev/video0".to_string()),
        }
    }
}
