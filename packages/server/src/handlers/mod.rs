pub mod node;
pub mod render;
pub mod scene;
