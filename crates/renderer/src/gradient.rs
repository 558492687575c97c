//! Background renderer state: the full-view plane, its shader parameters and
//! the animation clock that drives them.
//!
//! Everything here is GPU-free. [`crate::gpu`] mirrors the state into a
//! uniform block and vertex buffers; [`crate::shade`] evaluates the same
//! shading on the CPU.

use bytemuck::{Pod, Zeroable};
use thiserror::Error;
use tracing::debug;

use crate::camera::{PerspectiveCamera, ViewSize};

pub type Rgb = [f32; 3];

/// Shader parameters that stay constant for the lifetime of a background.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientParams {
    pub colors: [Rgb; 6],
    pub dark: Rgb,
    pub speed: f32,
    pub intensity: f32,
    pub gradient_size: f32,
    pub grain_intensity: f32,
}

impl Default for GradientParams {
    fn default() -> Self {
        Self {
            colors: [
                [0.40, 0.01, 0.10],
                [0.30, 0.05, 0.15],
                [0.20, 0.00, 0.05],
                [0.15, 0.02, 0.05],
                [0.30, 0.05, 0.15],
                [0.40, 0.01, 0.10],
            ],
            dark: [0.99, 0.30, 0.51],
            speed: 0.6,
            intensity: 0.5,
            gradient_size: 1.2,
            grain_intensity: 0.05,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SceneError {
    #[error("gradient background is already attached to a scene")]
    AlreadyInitialised,
    #[error("invalid viewport size {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PlaneVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Single-segment plane centred on the origin in the `z = 0` plane.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneGeometry {
    size: ViewSize,
    vertices: [PlaneVertex; 4],
}

impl PlaneGeometry {
    pub const INDICES: [u16; 6] = [0, 2, 1, 2, 3, 1];

    pub fn new(size: ViewSize) -> Self {
        let hw = size.width / 2.0;
        let hh = size.height / 2.0;
        // Top row first, uv origin bottom-left.
        let vertices = [
            PlaneVertex {
                position: [-hw, hh, 0.0],
                uv: [0.0, 1.0],
            },
            PlaneVertex {
                position: [hw, hh, 0.0],
                uv: [1.0, 1.0],
            },
            PlaneVertex {
                position: [-hw, -hh, 0.0],
                uv: [0.0, 0.0],
            },
            PlaneVertex {
                position: [hw, -hh, 0.0],
                uv: [1.0, 0.0],
            },
        ];
        Self { size, vertices }
    }

    pub fn size(&self) -> ViewSize {
        self.size
    }

    pub fn vertices(&self) -> &[PlaneVertex; 4] {
        &self.vertices
    }
}

#[derive(Debug, Clone)]
pub struct GradientBackground {
    params: GradientParams,
    time: f32,
    resolution: [f32; 2],
    geometry: Option<PlaneGeometry>,
    geometry_revision: u64,
}

impl GradientBackground {
    pub fn new(params: GradientParams) -> Self {
        Self {
            params,
            time: 0.0,
            resolution: [0.0, 0.0],
            geometry: None,
            geometry_revision: 0,
        }
    }

    /// Builds the plane for `camera` and attaches it. Fails if already attached.
    pub fn init(&mut self, camera: &PerspectiveCamera) -> Result<(), SceneError> {
        if self.is_attached() {
            return Err(SceneError::AlreadyInitialised);
        }
        self.replace_geometry(camera);
        Ok(())
    }

    pub fn dispose(&mut self) {
        if self.geometry.take().is_some() {
            debug!("gradient plane detached");
        }
    }

    pub fn update(&mut self, delta: f32) {
        let delta = if delta.is_finite() && delta >= 0.0 {
            delta
        } else {
            debug!(delta, "ignoring invalid frame delta");
            0.0
        };
        self.time += delta;
    }

    /// Rebuilds the plane from the camera and records the new viewport size.
    ///
    /// Invalid sizes leave the background untouched.
    pub fn on_resize(
        &mut self,
        width: f32,
        height: f32,
        camera: &PerspectiveCamera,
    ) -> Result<(), SceneError> {
        let valid = |value: f32| value.is_finite() && value > 0.0;
        if !valid(width) || !valid(height) {
            return Err(SceneError::InvalidViewport { width, height });
        }
        if self.geometry.is_some() {
            self.replace_geometry(camera);
        }
        self.resolution = [width, height];
        Ok(())
    }

    fn replace_geometry(&mut self, camera: &PerspectiveCamera) {
        let geometry = PlaneGeometry::new(camera.view_size());
        debug!(
            width = geometry.size().width,
            height = geometry.size().height,
            "gradient plane rebuilt"
        );
        self.geometry = Some(geometry);
        self.geometry_revision += 1;
    }

    pub fn params(&self) -> &GradientParams {
        &self.params
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn resolution(&self) -> [f32; 2] {
        self.resolution
    }

    pub fn geometry(&self) -> Option<&PlaneGeometry> {
        self.geometry.as_ref()
    }

    /// Bumped whenever the plane is rebuilt, so GPU buffers know to follow.
    pub fn geometry_revision(&self) -> u64 {
        self.geometry_revision
    }

    pub fn is_attached(&self) -> bool {
        self.geometry.is_some()
    }
}

impl Default for GradientBackground {
    fn default() -> Self {
        Self::new(GradientParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(width: f32, height: f32) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::default();
        camera.set_aspect(width, height);
        camera
    }

    #[test]
    fn update_accumulates_time() {
        let mut background = GradientBackground::default();
        let start = background.time();
        background.update(0.5);
        background.update(0.5);
        assert!((background.time() - start - 1.0).abs() < 1e-6);
    }

    #[test]
    fn invalid_deltas_do_not_move_time() {
        let mut background = GradientBackground::default();
        background.update(0.25);
        background.update(-1.0);
        background.update(f32::NAN);
        background.update(f32::INFINITY);
        assert_eq!(background.time(), 0.25);
    }

    #[test]
    fn resize_sets_resolution_exactly() {
        let mut background = GradientBackground::default();
        let cam = camera(1024.0, 768.0);
        background.init(&cam).unwrap();
        background.on_resize(1024.0, 768.0, &cam).unwrap();
        assert_eq!(background.resolution(), [1024.0, 768.0]);
    }

    #[test]
    fn plane_size_depends_only_on_camera() {
        let cam = camera(1280.0, 720.0);
        let mut a = GradientBackground::default();
        let mut b = GradientBackground::default();
        a.init(&cam).unwrap();
        b.init(&cam).unwrap();
        a.on_resize(1280.0, 720.0, &cam).unwrap();
        b.on_resize(640.0, 360.0, &cam).unwrap();

        let size_a = a.geometry().unwrap().size();
        let size_b = b.geometry().unwrap().size();
        assert_eq!(size_a, size_b);
        assert_eq!(size_a, cam.view_size());
    }

    #[test]
    fn resize_replaces_geometry() {
        let mut background = GradientBackground::default();
        let wide = camera(1600.0, 900.0);
        background.init(&wide).unwrap();
        let revision = background.geometry_revision();

        let square = camera(800.0, 800.0);
        background.on_resize(800.0, 800.0, &square).unwrap();
        assert!(background.geometry_revision() > revision);
        let size = background.geometry().unwrap().size();
        assert!((size.width - size.height).abs() < 1e-4);
    }

    #[test]
    fn rejects_degenerate_viewport() {
        let mut background = GradientBackground::default();
        let cam = camera(800.0, 600.0);
        background.init(&cam).unwrap();
        background.on_resize(800.0, 600.0, &cam).unwrap();
        let revision = background.geometry_revision();

        for (w, h) in [(0.0, 600.0), (800.0, -1.0), (f32::NAN, 600.0)] {
            let err = background.on_resize(w, h, &cam).unwrap_err();
            assert!(matches!(err, SceneError::InvalidViewport { .. }));
        }
        assert_eq!(background.resolution(), [800.0, 600.0]);
        assert_eq!(background.geometry_revision(), revision);
    }

    #[test]
    fn double_init_is_rejected_until_disposed() {
        let mut background = GradientBackground::default();
        let cam = PerspectiveCamera::default();
        background.init(&cam).unwrap();
        assert_eq!(background.init(&cam), Err(SceneError::AlreadyInitialised));
        background.dispose();
        assert!(!background.is_attached());
        background.init(&cam).unwrap();
    }

    #[test]
    fn plane_triangles_share_winding() {
        let plane = PlaneGeometry::new(PerspectiveCamera::default().view_size());
        let v = plane.vertices();
        let cross = |a: usize, b: usize, c: usize| {
            let (pa, pb, pc) = (v[a].position, v[b].position, v[c].position);
            (pb[0] - pa[0]) * (pc[1] - pa[1]) - (pb[1] - pa[1]) * (pc[0] - pa[0])
        };
        let i = PlaneGeometry::INDICES;
        let first = cross(i[0] as usize, i[1] as usize, i[2] as usize);
        let second = cross(i[3] as usize, i[4] as usize, i[5] as usize);
        assert!(first > 0.0 && second > 0.0);
    }
}
