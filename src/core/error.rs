use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid numeric input: {0:?}")]
    InvalidNumericInput(String),

    #[error("no active player")]
    NoActivePlayer,

    #[error("failed to read '{key}' from store: {reason}")]
    PersistenceRead { key: String, reason: String },

    #[error("failed to write '{key}' to store: {reason}")]
    PersistenceWrite { key: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
