use thiserror::Error;

/// Any failure surfaced while transferring the file, regardless of cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct UploadError {
    message: String,
}

impl UploadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// A required flag was missing or malformed. `usage` is the rendered help text.
    #[error("{message}")]
    Argument { message: String, usage: String },

    #[error("Error uploading: {0}")]
    Upload(#[from] UploadError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
