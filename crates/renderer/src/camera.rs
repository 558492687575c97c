use glam::{Mat4, Vec3};

/// Perspective camera looking down -Z from `(0, 0, distance)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub distance: f32,
}

/// World-space extent of a plane at `z = 0` that exactly fills the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSize {
    pub width: f32,
    pub height: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
            distance: 50.0,
        }
    }
}

impl PerspectiveCamera {
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn view_size(&self) -> ViewSize {
        let half_fov = self.fov_degrees.to_radians() / 2.0;
        let height = (self.distance * half_fov.tan() * 2.0).abs();
        ViewSize {
            width: height * self.aspect,
            height,
        }
    }

    pub fn eye(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.distance)
    }

    /// Right-handed projection with a `[0, 1]` depth range.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), Vec3::ZERO, Vec3::Y)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_size_follows_fov_and_aspect() {
        let mut camera = PerspectiveCamera::default();
        camera.set_aspect(1920.0, 1080.0);
        let size = camera.view_size();
        let expected_height = 50.0 * (22.5_f32).to_radians().tan() * 2.0;
        assert!((size.height - expected_height).abs() < 1e-4);
        assert!((size.width - expected_height * 1920.0 / 1080.0).abs() < 1e-4);
    }

    #[test]
    fn degenerate_aspect_is_ignored() {
        let mut camera = PerspectiveCamera::default();
        let before = camera.aspect;
        camera.set_aspect(0.0, 720.0);
        assert_eq!(camera.aspect, before);
    }

    #[test]
    fn view_moves_the_plane_to_the_camera_distance() {
        let camera = PerspectiveCamera::default();
        let origin = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(Vec3::new(0.0, 0.0, -50.0), 1e-5), "{origin:?}");
    }

    #[test]
    fn full_view_plane_corners_hit_clip_edges() {
        let mut camera = PerspectiveCamera::default();
        camera.set_aspect(800.0, 600.0);
        let size = camera.view_size();
        let matrix = camera.view_projection();

        for (sx, sy) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let corner = Vec3::new(sx * size.width / 2.0, sy * size.height / 2.0, 0.0);
            let ndc = matrix.project_point3(corner);
            assert!((ndc.x - sx).abs() < 1e-4, "ndc x {ndc:?}");
            assert!((ndc.y - sy).abs() < 1e-4, "ndc y {ndc:?}");
            assert!(ndc.z > 0.0 && ndc.z < 1.0, "depth {ndc:?}");
        }
    }
}
