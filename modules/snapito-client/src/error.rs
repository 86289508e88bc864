use thiserror::Error;

pub type Result<T> = std::result::Result<T, SnapitoError>;

#[derive(Debug, Error)]
pub enum SnapitoError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Target is not an http(s) URL: {0}")]
    InvalidTarget(String),
}

impl From<reqwest::Error> for SnapitoError {
    fn from(err: reqwest::Error) -> Self {
        SnapitoError::Network(err.to_string())
    }
}
