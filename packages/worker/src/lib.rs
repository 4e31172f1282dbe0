pub mod archive;
pub mod blender;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod progress;
pub mod state;
pub mod workspace;

pub use config::RenderConfig;
pub use engine::RenderEngine;
pub use error::{RenderError, Result};
pub use gate::{FlightPermit, SingleFlight};
pub use state::{JobPhase, RendererState};
