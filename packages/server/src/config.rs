use common::config::DataConfig;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use worker::RenderConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Display name of this node.
    pub name: String,
    /// Largest scene archive accepted, in bytes.
    pub max_upload_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("AETHER_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 4000)?
            .set_default("server.name", "aether-node")?
            .set_default("server.max_upload_size", 4_i64 * 1024 * 1024 * 1024)?
            .add_source(File::with_name(&config_path).required(false))
            // e.g. AETHER__RENDER__BLENDER=/opt/blender/blender
            .add_source(Environment::with_prefix("AETHER").separator("__"))
            .build()?;

        let config: Self = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("server.port must be non-zero".into()));
        }
        if self.render.blender.trim().is_empty() {
            return Err(ConfigError::Message("render.blender must be set".into()));
        }
        self.data.validate()
    }
}
