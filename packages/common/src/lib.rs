pub mod checksum;
pub mod config;
pub mod daemon;
pub mod error;
pub mod render_request;
pub mod render_status;
pub mod scene;
pub mod upload;

pub use checksum::Checksum;
pub use error::StoreError;
pub use render_request::{RenderRequest, RenderRequestError, RenderSpec, ResultRequest};
pub use render_status::{RenderProgress, StatusResponse};
pub use scene::{SceneIndex, SceneMetadata, SceneStore};
