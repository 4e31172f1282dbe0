//! Persisted, append-only index of uploaded scenes.
//!
//! The index lives in a single JSON file that is rewritten in full after
//! every append. Lookups scan linearly in insertion order, so when the same
//! checksum was recorded twice the earliest entry wins.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

use crate::checksum::Checksum;
use crate::error::StoreError;

/// File extension of stored scene archives and render results.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Storage name for an archive owned by `id`, e.g. `<uuid>.zip`.
pub fn archive_file_name(id: Uuid) -> String {
    format!("{id}.{ARCHIVE_EXTENSION}")
}

/// One accepted upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneMetadata {
    pub checksum: Checksum,
    pub id: Uuid,
    /// Server-assigned storage name inside the scenes directory.
    pub filename: String,
    /// Client-supplied name. Display only, never used to build paths.
    pub original_name: String,
    /// Acceptance time, nanoseconds since the Unix epoch.
    pub created_at: i64,
}

impl SceneMetadata {
    pub fn new(id: Uuid, checksum: Checksum, original_name: impl Into<String>) -> Self {
        Self {
            checksum,
            id,
            filename: archive_file_name(id),
            original_name: original_name.into(),
            created_at: now_nanos(),
        }
    }
}

fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

/// In-memory form of the index file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneIndex {
    pub created_at: i64,
    #[serde(default)]
    pub scenes: Vec<SceneMetadata>,
}

impl SceneIndex {
    pub fn empty() -> Self {
        Self {
            created_at: now_nanos(),
            scenes: Vec::new(),
        }
    }

    pub fn find_by_checksum(&self, checksum: &Checksum) -> Option<&SceneMetadata> {
        self.scenes.iter().find(|scene| &scene.checksum == checksum)
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<&SceneMetadata> {
        self.scenes.iter().find(|scene| scene.id == id)
    }
}

/// The scene index together with the file backing it.
pub struct SceneStore {
    path: PathBuf,
    index: RwLock<SceneIndex>,
}

impl SceneStore {
    /// Load the index from `path`, creating an empty index file when it does
    /// not exist yet. A file that exists but cannot be decoded is an error.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let index = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<SceneIndex>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let index = SceneIndex::empty();
                write_index(&path, &index).await?;
                info!(path = %path.display(), "Created scene index file");
                index
            }
            Err(e) => return Err(e.into()),
        };

        if index.scenes.is_empty() {
            info!("No scenes to load");
        } else {
            info!(count = index.scenes.len(), "Loaded scenes");
        }

        Ok(Self {
            path,
            index: RwLock::new(index),
        })
    }

    pub async fn find_by_checksum(&self, checksum: &Checksum) -> Option<SceneMetadata> {
        self.index.read().await.find_by_checksum(checksum).cloned()
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<SceneMetadata> {
        self.index.read().await.find_by_id(id).cloned()
    }

    /// Append a scene and rewrite the index file.
    ///
    /// A failed rewrite is logged and the in-memory entry is kept.
    pub async fn add_scene(&self, scene: SceneMetadata) {
        let mut index = self.index.write().await;
        index.scenes.push(scene);

        if let Err(e) = write_index(&self.path, &index).await {
            error!(path = %self.path.display(), error = %e, "Could not persist scene index");
        }
    }

    /// Snapshot of every scene in upload order.
    pub async fn scenes(&self) -> Vec<SceneMetadata> {
        self.index.read().await.scenes.clone()
    }

    pub async fn len(&self) -> usize {
        self.index.read().await.scenes.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

// Overwrites in place; a crash mid-write can leave a truncated index.
async fn write_index(path: &Path, index: &SceneIndex) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(index)?;
    fs::write(path, &bytes).await?;
    info!(bytes = bytes.len(), "Written scene index");
    Ok(())
}
