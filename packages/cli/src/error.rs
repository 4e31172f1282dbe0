use std::path::PathBuf;

use common::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("No aether project is initialized at {}", .0.display())]
    NotInitialized(PathBuf),

    #[error("Aether project already initialized in {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("{} is not a file", .0.display())]
    NotAFile(PathBuf),

    #[error("{} is not a .{ext} file", .path.display())]
    NotAScene { path: PathBuf, ext: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed project file: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Checksum(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ProjectError>;
