use tracing::{debug, trace};

use crate::camera::PerspectiveCamera;
use crate::gradient::{GradientBackground, GradientParams, SceneError};
use crate::shade::GradientShader;
use crate::touch::{IntensityTexture, TouchTexture};

/// GPU-free frame state: camera, input trail and background.
#[derive(Debug, Clone)]
pub struct Scene {
    camera: PerspectiveCamera,
    touch: TouchTexture,
    background: GradientBackground,
    viewport: [f32; 2],
}

impl Scene {
    /// Builds a scene for a `width`×`height` viewport in logical pixels.
    pub fn new(
        params: GradientParams,
        mut camera: PerspectiveCamera,
        width: f32,
        height: f32,
    ) -> Result<Self, SceneError> {
        camera.set_aspect(width, height);
        let mut background = GradientBackground::new(params);
        background.init(&camera)?;
        background.on_resize(width, height, &camera)?;
        Ok(Self {
            camera,
            touch: TouchTexture::new(),
            background,
            viewport: [width, height],
        })
    }

    /// Feeds a pointer position in window pixels (origin top-left).
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        let [width, height] = self.viewport;
        let point = [x / width, 1.0 - y / height];
        trace!(x, y, u = point[0], v = point[1], "pointer moved");
        self.touch.add_touch(point);
    }

    /// Advances one frame: the trail first, then the background clock.
    pub fn tick(&mut self, delta: f32) {
        self.touch.update();
        self.background.update(delta);
    }

    /// Runs one full frame: ticks the scene, then hands it to `draw` so the
    /// draw always reads this frame's texture and time.
    pub fn frame<R>(&mut self, delta: f32, draw: impl FnOnce(&mut Scene) -> R) -> R {
        self.tick(delta);
        draw(self)
    }

    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), SceneError> {
        let mut camera = self.camera;
        camera.set_aspect(width, height);
        self.background.on_resize(width, height, &camera)?;
        self.camera = camera;
        self.viewport = [width, height];
        debug!(width, height, "scene resized");
        Ok(())
    }

    /// Returns the touch raster if it changed since the last call.
    pub fn take_texture_upload(&mut self) -> Option<&IntensityTexture> {
        self.touch.take_upload()
    }

    pub fn shader(&self) -> GradientShader<'_> {
        GradientShader::new(
            self.background.params(),
            self.touch.texture(),
            self.background.time(),
            self.background.resolution(),
        )
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn touch(&self) -> &TouchTexture {
        &self.touch
    }

    pub fn background(&self) -> &GradientBackground {
        &self.background
    }

    pub fn viewport(&self) -> [f32; 2] {
        self.viewport
    }
}
