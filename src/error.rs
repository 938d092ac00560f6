use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
}
