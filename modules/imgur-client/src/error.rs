use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImgurError>;

#[derive(Debug, Error)]
pub enum ImgurError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<reqwest::Error> for ImgurError {
    fn from(err: reqwest::Error) -> Self {
        ImgurError::Network(err.to_string())
    }
}
