use common::RenderRequestError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("A render is already in progress")]
    Busy,

    #[error(transparent)]
    Request(#[from] RenderRequestError),

    #[error("Scene not found: {0}")]
    SceneNotFound(Uuid),

    #[error("Workspace error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Scene archive contains no *.{0} file")]
    SceneFileMissing(String),

    #[error("Failed to start render tool: {0}")]
    Spawn(std::io::Error),

    #[error("Task error: {0}")]
    Task(String),
}

impl From<walkdir::Error> for RenderError {
    fn from(e: walkdir::Error) -> Self {
        RenderError::Io(e.into())
    }
}

impl From<tokio::task::JoinError> for RenderError {
    fn from(e: tokio::task::JoinError) -> Self {
        RenderError::Task(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
