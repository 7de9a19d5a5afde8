use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = SourceError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open {}: {message}", .path.display())]
    Open { path: PathBuf, message: String },
    #[error("I/O error: {0}")]
    Io(String),
    #[error("device not open")]
    NotOpen,
    #[error("publish failed: {0}")]
    Publish(String),
    #[error("worker task failed: {0}")]
    Task(String),
}
