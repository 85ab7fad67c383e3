use thiserror::Error;

#[derive(Error, Debug)]
pub enum WireError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid timestamp: {0}")]
    Timestamp(String),
}

pub type Result<T> = std::result::Result<T, WireError>;
