//! GPU-free still frames of the background.

use image::RgbaImage;
use tracing::debug;

use crate::camera::PerspectiveCamera;
use crate::gradient::{GradientParams, SceneError};
use crate::scene::Scene;

/// What to render and how the scene gets there.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewOptions {
    pub width: u32,
    pub height: u32,
    /// Clock value, in seconds, of the rendered frame.
    pub time: f32,
    /// Pointer positions in pixels (origin top-left), replayed one per frame
    /// before the final frame is shaded.
    pub pointer_path: Vec<[f32; 2]>,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            time: 0.0,
            pointer_path: Vec::new(),
        }
    }
}

/// Replays `options.pointer_path` through a fresh scene and shades the result
/// on the CPU.
pub fn render_still(
    params: GradientParams,
    camera: PerspectiveCamera,
    options: &PreviewOptions,
) -> Result<RgbaImage, SceneError> {
    let mut scene = Scene::new(
        params,
        camera,
        options.width as f32,
        options.height as f32,
    )?;
    for &[x, y] in &options.pointer_path {
        scene.pointer_moved(x, y);
        scene.tick(0.0);
    }
    scene.tick(options.time);
    debug!(
        width = options.width,
        height = options.height,
        time = scene.background().time(),
        trail = scene.touch().trail().len(),
        "rendering still frame"
    );
    Ok(scene.shader().render(options.width, options.height))
}
