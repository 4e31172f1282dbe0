use serde::Deserialize;

/// How the external render tool is invoked and where it writes frames.
#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    /// Render tool executable. Default: "blender".
    #[serde(default = "default_blender")]
    pub blender: String,
    /// Extension of the scene file searched for inside an extracted archive. Default: "blend".
    #[serde(default = "default_scene_extension")]
    pub scene_extension: String,
    /// Directory created next to the scene file to receive frames. Default: ".aether".
    #[serde(default = "default_output_dir_name")]
    pub output_dir_name: String,
    /// Output file pattern handed to the render tool; `#` runs are replaced
    /// by the zero-padded frame number. Default: "frame_####".
    #[serde(default = "default_frame_pattern")]
    pub frame_pattern: String,
}

fn default_blender() -> String {
    "blender".into()
}
fn default_scene_extension() -> String {
    "blend".into()
}
fn default_output_dir_name() -> String {
    ".aether".into()
}
fn default_frame_pattern() -> String {
    "frame_####".into()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            blender: default_blender(),
            scene_extension: default_scene_extension(),
            output_dir_name: default_output_dir_name(),
            frame_pattern: default_frame_pattern(),
        }
    }
}

impl RenderConfig {
    pub fn with_blender(blender: impl Into<String>) -> Self {
        Self {
            blender: blender.into(),
            ..Self::default()
        }
    }
}
