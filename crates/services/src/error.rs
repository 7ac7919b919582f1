/// Errors from any [`LectureService`](crate::LectureService) implementation.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The HTTP request itself failed (network, DNS, timeout, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Lecture API error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The requested lecture, video, frame or box does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The configured base URL cannot address the backend.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// The offline catalog could not be read or parsed.
    #[error("Catalog error: {0}")]
    Catalog(String),
}
