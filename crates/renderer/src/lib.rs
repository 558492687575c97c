//! Renderer crate for Rosewash, a touch-reactive gradient background.
//!
//! ```text
//!   pointer / touch ──▶ TouchTexture ──(64×64 raster)──┐
//!                                                     ▼
//!   Renderer::run ──▶ winit loop ──▶ Scene::tick ──▶ GpuState::render ──▶ surface
//!                                      │
//!                                      └─▶ GradientBackground (time, plane, resolution)
//! ```
//!
//! Everything above the GPU is plain data: [`Scene`] owns the camera, the
//! input trail and the background, and can be shaded on the CPU through
//! [`GradientShader`] for still previews and tests. The `gpu` module mirrors
//! the same state into wgpu buffers and a GLSL pipeline.

use anyhow::Result;

mod camera;
mod compile;
mod gpu;
mod gradient;
mod preview;
mod runtime;
mod scene;
mod shade;
mod touch;
mod types;
mod window;

pub use camera::{PerspectiveCamera, ViewSize};
pub use gradient::{GradientBackground, GradientParams, PlaneGeometry, PlaneVertex, Rgb, SceneError};
pub use preview::{render_still, PreviewOptions};
pub use runtime::{FrameClock, FrameScheduler};
pub use scene::Scene;
pub use shade::{smoothstep, GradientShader};
pub use touch::{IntensityTexture, TouchPoint, TouchTexture, MAX_AGE, MAX_FORCE, TEXTURE_SIZE};
pub use types::{Antialiasing, ColorSpaceMode, RendererConfig};

/// High-level entry point that owns the chosen configuration.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the window and animates until it is closed.
    ///
    /// Fails if no window, surface or GPU device can be created.
    pub fn run(&mut self) -> Result<()> {
        tracing::info!(
            title = %self.config.title,
            width = self.config.surface_size.0,
            height = self.config.surface_size.1,
            antialiasing = ?self.config.antialiasing,
            color_space = ?self.config.color_space,
            "starting gradient background"
        );
        window::run_window(self.config.clone())
    }
}
