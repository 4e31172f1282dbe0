use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;
use tokio::fs;
use tracing::debug;

/// Locations of the node's on-disk data.
#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// Landing directory for uploads until their checksum is verified. Default: "data/tmp".
    #[serde(default = "default_temp_directory")]
    pub temp_directory: PathBuf,
    /// Verified scene archives, stored as `<id>.zip`. Default: "data/scenes".
    #[serde(default = "default_scenes_directory")]
    pub scenes_directory: PathBuf,
    /// JSON file holding the scene index. Default: "data/scenes.json".
    #[serde(default = "default_scene_index")]
    pub scene_index: PathBuf,
    /// Per-render scratch directories. Default: "data/workspace".
    #[serde(default = "default_workspace_directory")]
    pub workspace_directory: PathBuf,
    /// Finished render archives, stored as `<id>.zip`. Default: "data/output".
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,
}

fn default_temp_directory() -> PathBuf {
    "data/tmp".into()
}
fn default_scenes_directory() -> PathBuf {
    "data/scenes".into()
}
fn default_scene_index() -> PathBuf {
    "data/scenes.json".into()
}
fn default_workspace_directory() -> PathBuf {
    "data/workspace".into()
}
fn default_output_directory() -> PathBuf {
    "data/output".into()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            temp_directory: default_temp_directory(),
            scenes_directory: default_scenes_directory(),
            scene_index: default_scene_index(),
            workspace_directory: default_workspace_directory(),
            output_directory: default_output_directory(),
        }
    }
}

impl DataConfig {
    /// Root every path under `root`. Used by tests and embedded setups.
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            temp_directory: root.join("tmp"),
            scenes_directory: root.join("scenes"),
            scene_index: root.join("scenes.json"),
            workspace_directory: root.join("workspace"),
            output_directory: root.join("output"),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let paths = [
            ("data.temp_directory", &self.temp_directory),
            ("data.scenes_directory", &self.scenes_directory),
            ("data.scene_index", &self.scene_index),
            ("data.workspace_directory", &self.workspace_directory),
            ("data.output_directory", &self.output_directory),
        ];
        for (key, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Message(format!("Config does not set \"{key}\"")));
            }
        }

        if self.scene_index.extension().and_then(|e| e.to_str()) != Some("json") {
            return Err(ConfigError::Message(format!(
                "Scene index must be a JSON file, got \"{}\"",
                self.scene_index.display()
            )));
        }

        Ok(())
    }

    /// Create every data directory that does not exist yet, including the
    /// parent of the scene index file.
    pub async fn ensure_directories(&self) -> std::io::Result<()> {
        let index_parent = self.scene_index.parent().map(PathBuf::from);
        let mut dirs = vec![
            &self.temp_directory,
            &self.scenes_directory,
            &self.workspace_directory,
            &self.output_directory,
        ];
        if let Some(parent) = index_parent.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            dirs.push(parent);
        }

        for dir in dirs {
            if !fs::try_exists(dir).await? {
                debug!(path = %dir.display(), "Creating directory");
            }
            fs::create_dir_all(dir).await?;
        }
        Ok(())
    }
}
