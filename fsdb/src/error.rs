use thiserror::Error;

#[derive(Error, Debug)]
pub enum FsdbError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid document id: {0:?}")]
    InvalidId(String),
}

pub type Result<T> = std::result::Result<T, FsdbError>;
