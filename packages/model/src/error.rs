use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path '{input}': {message}")]
    InvalidPath { input: String, message: String },

    #[error("Unknown element type: {0}")]
    UnknownKind(String),
}

impl ModelError {
    pub fn invalid_path(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            input: input.into(),
            message: message.into(),
        }
    }
}
