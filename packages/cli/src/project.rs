//! The `.aether` project directory: creation metadata and the list of scene
//! files tracked for the next commit to the daemon.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use common::Checksum;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{ProjectError, Result};

pub const PROJECT_DIR: &str = ".aether";
pub const METADATA_FILE: &str = "metadata.json";
pub const TRACKED_FILES_FILE: &str = "tracked_files.json";
pub const SCENE_EXTENSION: &str = "blend";

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedFile {
    /// Relative to the project root when the file lives inside it.
    pub path: PathBuf,
    pub checksum: Checksum,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TrackedFiles {
    pub files: Vec<TrackedFile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    Added,
    /// The file was tracked with a different checksum.
    Updated,
    Unchanged,
}

#[derive(Debug)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Create `.aether/` under `root`. Fails if a project already exists there.
    pub async fn init(root: &Path) -> Result<Self> {
        let dir = root.join(PROJECT_DIR);
        if fs::try_exists(&dir).await? {
            return Err(ProjectError::AlreadyInitialized(root.to_path_buf()));
        }
        fs::create_dir_all(&dir).await?;

        let metadata = ProjectMetadata {
            created_at: Utc::now(),
        };
        fs::write(dir.join(METADATA_FILE), serde_json::to_vec_pretty(&metadata)?).await?;

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Open the project at `root`, creating an empty tracked-files list on first use.
    pub async fn open(root: &Path) -> Result<Self> {
        if !fs::try_exists(root.join(PROJECT_DIR)).await? {
            return Err(ProjectError::NotInitialized(root.to_path_buf()));
        }

        let project = Self {
            root: root.to_path_buf(),
        };
        if !fs::try_exists(project.tracked_files_path()).await? {
            project.save(&TrackedFiles::default()).await?;
        }
        Ok(project)
    }

    pub fn tracked_files_path(&self) -> PathBuf {
        self.root.join(PROJECT_DIR).join(TRACKED_FILES_FILE)
    }

    pub async fn tracked(&self) -> Result<TrackedFiles> {
        let bytes = fs::read(self.tracked_files_path()).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Track `file`, or refresh its checksum if it changed since it was added.
    pub async fn track(&self, file: &Path) -> Result<TrackOutcome> {
        let absolute = self.root.join(file);
        let is_file = fs::metadata(&absolute)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(ProjectError::NotAFile(file.to_path_buf()));
        }
        let is_scene = absolute
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(SCENE_EXTENSION));
        if !is_scene {
            return Err(ProjectError::NotAScene {
                path: file.to_path_buf(),
                ext: SCENE_EXTENSION,
            });
        }

        let checksum = Checksum::compute_file(&absolute).await?;
        let path = absolute
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or(absolute.clone());

        let mut tracked = self.tracked().await?;
        let outcome = match tracked.files.iter_mut().find(|f| f.path == path) {
            Some(existing) if existing.checksum == checksum => return Ok(TrackOutcome::Unchanged),
            Some(existing) => {
                existing.checksum = checksum;
                TrackOutcome::Updated
            }
            None => {
                tracked.files.push(TrackedFile { path, checksum });
                TrackOutcome::Added
            }
        };

        self.save(&tracked).await?;
        Ok(outcome)
    }

    async fn save(&self, tracked: &TrackedFiles) -> Result<()> {
        fs::write(self.tracked_files_path(), serde_json::to_vec_pretty(tracked)?).await?;
        Ok(())
    }
}
