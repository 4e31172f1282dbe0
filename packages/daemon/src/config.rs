use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Coordination daemon configuration, read from the `[daemon]` section.
#[derive(Debug, Deserialize, Clone)]
pub struct DaemonConfig {
    /// Unix socket clients connect to. Default: "/tmp/aetherd.sock".
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,
    /// Directory holding `nodes.json`. Default: "data/aetherd".
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
}

fn default_socket_path() -> PathBuf {
    "/tmp/aetherd.sock".into()
}
fn default_storage_dir() -> PathBuf {
    "data/aetherd".into()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            storage_dir: default_storage_dir(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DaemonAppConfig {
    #[serde(default)]
    pub daemon: DaemonConfig,
}

impl DaemonAppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("AETHER_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            .add_source(File::with_name(&config_path).required(false))
            .add_source(Environment::with_prefix("AETHER").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
