use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::archive;
use crate::error::{RenderError, Result};

/// Scratch directory holding one extracted scene, `<workspace dir>/<scene id>`.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Replace any leftover directory for `id` with a fresh extraction of `archive`.
    pub async fn prepare(workspace_dir: &Path, id: Uuid, archive_path: &Path) -> Result<Self> {
        let root = workspace_dir.join(id.to_string());
        if let Ok(meta) = fs::symlink_metadata(&root).await {
            info!(path = %root.display(), "Removing stale workspace");
            if meta.is_dir() {
                fs::remove_dir_all(&root).await?;
            } else {
                fs::remove_file(&root).await?;
            }
        }
        fs::create_dir_all(&root).await?;

        let dest = root.clone();
        let archive_path = archive_path.to_path_buf();
        tokio::task::spawn_blocking(move || archive::extract(&archive_path, &dest)).await??;

        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// First file with `extension` in a depth-first walk ordered by file name.
    pub async fn find_scene_file(&self, extension: &str) -> Result<PathBuf> {
        let root = self.root.clone();
        let wanted = extension.to_string();
        let found = tokio::task::spawn_blocking(move || -> Result<Option<PathBuf>> {
            for entry in WalkDir::new(&root).sort_by_file_name() {
                let entry = entry?;
                let matches = entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted.as_str()));
                if entry.file_type().is_file() && matches {
                    return Ok(Some(entry.into_path()));
                }
            }
            Ok(None)
        })
        .await??;

        found.ok_or_else(|| RenderError::SceneFileMissing(extension.to_string()))
    }

    pub async fn remove(self) -> std::io::Result<()> {
        debug!(path = %self.root.display(), "Removing workspace");
        fs::remove_dir_all(&self.root).await
    }
}

/// Create the frame output directory next to `scene_file`.
pub async fn create_output_dir(scene_file: &Path, name: &str) -> Result<PathBuf> {
    let parent = scene_file.parent().unwrap_or_else(|| Path::new("."));
    let dir = parent.join(name);
    fs::create_dir_all(&dir).await?;
    Ok(dir)
}
