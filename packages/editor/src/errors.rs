//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Model error: {0}")]
    Model(#[from] lectern_model::ModelError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Image error: {0}")]
    Image(#[from] crate::images::ImageError),

    #[error("Submit error: {0}")]
    Submit(#[from] crate::session::SubmitError),

    #[error("Document source error: {0}")]
    Source(String),

    #[error("Document is read-only")]
    ReadOnly,
}
