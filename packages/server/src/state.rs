use std::sync::Arc;

use common::{SceneStore, StoreError};
use worker::{RenderEngine, SingleFlight};

use crate::config::AppConfig;
use crate::node::NodeInfo;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub scenes: Arc<SceneStore>,
    pub engine: Arc<RenderEngine>,
    /// Admits one upload at a time.
    pub uploads: SingleFlight,
    pub node: Arc<NodeInfo>,
}

impl AppState {
    /// Load the scene index and wire up the render engine. Data directories
    /// must already exist.
    pub async fn new(config: AppConfig) -> Result<Self, StoreError> {
        let scenes = Arc::new(SceneStore::load(&config.data.scene_index).await?);
        let engine = Arc::new(RenderEngine::new(
            config.data.clone(),
            config.render.clone(),
            scenes.clone(),
        ));
        let node = Arc::new(NodeInfo::generate(config.server.name.clone()));

        Ok(Self {
            config,
            scenes,
            engine,
            uploads: SingleFlight::new("upload"),
            node,
        })
    }
}
