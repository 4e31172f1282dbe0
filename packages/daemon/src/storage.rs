use std::path::{Path, PathBuf};

use common::daemon::KnownNode;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use crate::error::Result;

pub const STORAGE_FILE: &str = "nodes.json";

/// Persisted daemon state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonStorage {
    #[serde(default)]
    pub nodes: Vec<KnownNode>,
}

impl DaemonStorage {
    /// Read `<dir>/nodes.json`, creating the directory and an empty file when
    /// either is missing. A plain file squatting on `dir` is replaced.
    pub async fn read_or_create(dir: &Path) -> Result<Self> {
        match fs::metadata(dir).await {
            Ok(meta) if !meta.is_dir() => {
                warn!(path = %dir.display(), "Replacing file in place of storage directory");
                fs::remove_file(dir).await?;
                fs::create_dir_all(dir).await?;
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                fs::create_dir_all(dir).await?;
                info!(path = %dir.display(), "Created storage directory");
            }
            Err(e) => return Err(e.into()),
        }

        let path = Self::file_path(dir);
        match fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let storage = Self::default();
                storage.save(dir).await?;
                Ok(storage)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, dir: &Path) -> Result<()> {
        fs::write(Self::file_path(dir), serde_json::to_vec_pretty(self)?).await?;
        Ok(())
    }

    pub fn file_path(dir: &Path) -> PathBuf {
        dir.join(STORAGE_FILE)
    }
}
