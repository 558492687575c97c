//! CPU evaluation of the gradient fragment shader.
//!
//! Mirrors the GLSL fragment body in `compile.rs` line for line so still frames can be
//! produced without a GPU and the shading can be unit tested.

use glam::{Vec2, Vec3, Vec4};
use image::{Rgba, RgbaImage};

use crate::gradient::GradientParams;
use crate::touch::IntensityTexture;

const GRAIN_KEY: Vec2 = Vec2::new(12.9898, 78.233);

/// GLSL `smoothstep`, including its behaviour for `x` outside `[e0, e1]`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Snapshot of everything the fragment shader reads for one frame.
#[derive(Debug, Clone, Copy)]
pub struct GradientShader<'a> {
    pub params: &'a GradientParams,
    pub touch: &'a IntensityTexture,
    pub time: f32,
    pub resolution: Vec2,
}

impl<'a> GradientShader<'a> {
    pub fn new(
        params: &'a GradientParams,
        touch: &'a IntensityTexture,
        time: f32,
        resolution: [f32; 2],
    ) -> Self {
        Self {
            params,
            touch,
            time,
            resolution: Vec2::from(resolution),
        }
    }

    /// Blob centres at the current time, in uv space.
    pub fn centers(&self) -> [Vec2; 4] {
        let ts = self.time * self.params.speed;
        [
            Vec2::new(0.5 + (ts * 0.4).sin() * 0.4, 0.5 + (ts * 0.5).cos() * 0.4),
            Vec2::new(0.5 + (ts * 0.6).cos() * 0.5, 0.5 + (ts * 0.45).sin() * 0.5),
            Vec2::new(0.5 + (ts * 0.35).sin() * 0.45, 0.5 + (ts * 0.55).cos() * 0.45),
            Vec2::new(0.5 + (ts * 0.5).cos() * 0.4, 0.5 + (ts * 0.4).sin() * 0.4),
        ]
    }

    /// Gradient colour before grain, for an already distorted `uv`.
    pub fn gradient_color(&self, uv: Vec2) -> Vec3 {
        let params = self.params;
        let t = self.time;
        let influences = self
            .centers()
            .map(|center| 1.0 - smoothstep(0.0, params.gradient_size, uv.distance(center)));
        let weights = [
            influences[0] * (0.6 + 0.4 * t.sin()),
            influences[1] * (0.6 + 0.4 * t.cos()),
            influences[2],
            influences[3],
        ];

        let color = params
            .colors
            .iter()
            .zip(weights)
            .fold(Vec3::ZERO, |acc, (base, weight)| {
                acc + Vec3::from_array(*base) * weight
            });
        let color = color.clamp(Vec3::ZERO, Vec3::ONE) * params.intensity;

        let mix_factor = (color.length() * 1.2).max(0.15);
        Vec3::from_array(params.dark).lerp(color, mix_factor)
    }

    /// Hash noise in `[-1, 1)`.
    pub fn grain(&self, uv: Vec2) -> f32 {
        let grain_uv = uv * self.resolution * 0.5 + Vec2::splat(self.time);
        let value = fract(grain_uv.dot(GRAIN_KEY).sin() * 43758.5453);
        value * 2.0 - 1.0
    }

    /// Distorts `uv` by the touch texture sampled at the same spot.
    pub fn displaced_uv(&self, uv: Vec2) -> Vec2 {
        let [r, g, b] = self.touch.sample(uv.x, uv.y);
        let direction = Vec2::new(r, g) * 2.0 - Vec2::ONE;
        uv - direction * 0.8 * b
    }

    /// Final RGBA for a fragment at `uv` (origin bottom-left). Colour is not
    /// clamped, matching what the fragment shader writes.
    pub fn shade(&self, uv: Vec2) -> Vec4 {
        let uv = self.displaced_uv(uv);
        let color = self.gradient_color(uv);
        let grain = self.grain(uv) * self.params.grain_intensity;
        (color + Vec3::splat(grain)).extend(1.0)
    }

    /// Rasterises the whole viewport, sampling at pixel centres.
    pub fn render(&self, width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let u = (x as f32 + 0.5) / width as f32;
            let v = 1.0 - (y as f32 + 0.5) / height as f32;
            let rgba = self.shade(Vec2::new(u, v)).clamp(Vec4::ZERO, Vec4::ONE) * 255.0;
            Rgba(rgba.round().to_array().map(|c| c as u8))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::touch::{TouchTexture, TEXTURE_SIZE};

    fn quiet_params() -> GradientParams {
        GradientParams {
            grain_intensity: 0.0,
            ..GradientParams::default()
        }
    }

    #[test]
    fn smoothstep_matches_glsl() {
        assert_eq!(smoothstep(0.0, 1.0, -0.5), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
        assert!((smoothstep(0.0, 2.0, 0.5) - 0.15625).abs() < 1e-6);
    }

    #[test]
    fn centers_start_on_known_positions() {
        let params = GradientParams::default();
        let touch = IntensityTexture::new(TEXTURE_SIZE, TEXTURE_SIZE);
        let shader = GradientShader::new(&params, &touch, 0.0, [800.0, 600.0]);
        let expected = [
            Vec2::new(0.5, 0.9),
            Vec2::new(1.0, 0.5),
            Vec2::new(0.5, 0.95),
            Vec2::new(0.9, 0.5),
        ];
        for (center, want) in shader.centers().iter().zip(expected) {
            assert!(center.abs_diff_eq(want, 1e-6), "{center:?} vs {want:?}");
        }
    }

    #[test]
    fn dim_regions_fall_back_to_dark_tint() {
        let params = GradientParams {
            intensity: 0.0,
            ..quiet_params()
        };
        let touch = IntensityTexture::new(TEXTURE_SIZE, TEXTURE_SIZE);
        let shader = GradientShader::new(&params, &touch, 3.0, [800.0, 600.0]);
        let color = shader.gradient_color(Vec2::new(0.2, 0.7));
        let expected = Vec3::from_array(params.dark) * 0.85;
        assert!(color.abs_diff_eq(expected, 1e-5), "{color:?}");
    }

    #[test]
    fn grain_is_bounded_and_scaled() {
        let params = GradientParams::default();
        let touch = IntensityTexture::new(TEXTURE_SIZE, TEXTURE_SIZE);
        let shader = GradientShader::new(&params, &touch, 1.7, [1920.0, 1080.0]);
        for i in 0..50 {
            let uv = Vec2::new(i as f32 / 50.0, 1.0 - i as f32 / 70.0);
            let g = shader.grain(uv);
            assert!((-1.0..=1.0).contains(&g), "grain {g} at {uv:?}");
        }

        let quiet = quiet_params();
        let quiet_shader = GradientShader::new(&quiet, &touch, 1.7, [1920.0, 1080.0]);
        let uv = Vec2::splat(0.4);
        let shaded = quiet_shader.shade(uv);
        assert_eq!(shaded.truncate(), quiet_shader.gradient_color(uv));
        assert_eq!(shaded.w, 1.0);
    }

    #[test]
    fn untouched_texture_barely_moves_uv() {
        let params = quiet_params();
        let touch = IntensityTexture::new(TEXTURE_SIZE, TEXTURE_SIZE);
        let shader = GradientShader::new(&params, &touch, 0.0, [800.0, 600.0]);
        let uv = Vec2::new(0.3, 0.6);
        assert_eq!(shader.displaced_uv(uv), uv);
    }

    #[test]
    fn touch_pushes_uv_against_motion() {
        let mut touch = TouchTexture::new();
        touch.add_touch([0.4, 0.5]);
        touch.add_touch([0.45, 0.5]);
        for _ in 0..10 {
            touch.update();
        }
        let point = Vec2::from(touch.trail()[0].position);

        let params = quiet_params();
        let shader = GradientShader::new(&params, touch.texture(), 0.0, [800.0, 600.0]);
        let displaced = shader.displaced_uv(point);
        assert!(displaced.x < point.x, "moved right, so uv shifts left");
        assert!((displaced.y - point.y).abs() < 1e-2);
    }

    #[test]
    fn render_fills_every_pixel_opaque() {
        let params = GradientParams::default();
        let touch = IntensityTexture::new(TEXTURE_SIZE, TEXTURE_SIZE);
        let shader = GradientShader::new(&params, &touch, 2.0, [32.0, 16.0]);
        let image = shader.render(32, 16);
        assert_eq!(image.dimensions(), (32, 16));
        assert!(image.pixels().all(|p| p.0[3] == 255));
    }
}
