use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Network failure or undecodable response body. Retried manually by
    /// the user; the client never retries on its own.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-2xx backend response, carrying the backend's `detail` message
    /// when the body provided one.
    #[error("{message}")]
    Backend { status: u16, message: String },
}
