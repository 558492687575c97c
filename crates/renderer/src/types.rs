use crate::camera::PerspectiveCamera;
use crate::gradient::GradientParams;

/// Output color handling for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpaceMode {
    /// Gamma-encoded swapchain; shader colours are written as-is, like a
    /// browser canvas would show them.
    #[default]
    Auto,
    /// Treat shader outputs as gamma-encoded; use non-sRGB surfaces.
    Gamma,
    /// Treat shader outputs as linear and use sRGB swapchains for conversion.
    Linear,
}

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

/// Immutable configuration passed to the renderer at start-up.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window title.
    pub title: String,
    /// Initial window size in logical pixels.
    pub surface_size: (u32, u32),
    /// Palette and shader scalars of the gradient.
    pub gradient: GradientParams,
    /// Camera the plane is sized against. The aspect ratio is overwritten on
    /// every resize.
    pub camera: PerspectiveCamera,
    /// Optional FPS cap; `None` renders on every redraw opportunity.
    pub target_fps: Option<f32>,
    pub antialiasing: Antialiasing,
    pub color_space: ColorSpaceMode,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            title: "Will you?".to_string(),
            surface_size: (1280, 720),
            gradient: GradientParams::default(),
            camera: PerspectiveCamera::default(),
            target_fps: None,
            antialiasing: Antialiasing::default(),
            color_space: ColorSpaceMode::default(),
        }
    }
}
