//! Pointer trail tracking and the small raster it feeds to the gradient shader.
//!
//! Every pointer or touch move appends a [`TouchPoint`] to the trail. Once per
//! frame [`TouchTexture::update`] ages the trail, drops expired points and
//! repaints the [`IntensityTexture`] from black. Red and green carry the
//! direction of travel (remapped from `[-1, 1]` to `[0, 1]`), blue carries the
//! glow strength the shader uses to scale its displacement.

use std::f32::consts::FRAC_PI_2;

use image::imageops::flip_vertical_in_place;
use image::{Rgba, RgbaImage};

use crate::shade::smoothstep;

/// Edge length of the square touch texture, in pixels.
pub const TEXTURE_SIZE: u32 = 64;
/// Number of updates a touch point stays alive.
pub const MAX_AGE: u32 = 64;
/// Upper bound for the force derived from pointer speed.
pub const MAX_FORCE: f32 = 2.0;

const RADIUS: f32 = 0.25 * TEXTURE_SIZE as f32;
const SPEED: f32 = 1.0 / MAX_AGE as f32;
const FORCE_GAIN: f32 = 20_000.0;
const EASE_IN_FRACTION: f32 = 0.3;
const GLOW_ALPHA: f32 = 0.8;

/// One sample along the pointer trail, in normalised bottom-left coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub position: [f32; 2],
    pub age: u32,
    pub force: f32,
    pub direction: [f32; 2],
}

impl TouchPoint {
    /// Drifts the point along its direction, slowing down as it ages.
    fn advance(&mut self) {
        let step = self.force * SPEED * (1.0 - self.age as f32 / MAX_AGE as f32);
        self.position[0] += self.direction[0] * step;
        self.position[1] += self.direction[1] * step;
        self.age += 1;
    }

    fn expired(&self) -> bool {
        self.age >= MAX_AGE
    }

    /// Sine ease-in over the first 30% of the lifetime, quadratic ease-out after.
    pub fn glow_intensity(&self) -> f32 {
        let ramp = MAX_AGE as f32 * EASE_IN_FRACTION;
        let age = self.age as f32;
        let eased = if age < ramp {
            (age / ramp * FRAC_PI_2).sin()
        } else {
            let t = 1.0 - (age - ramp) / (MAX_AGE as f32 * (1.0 - EASE_IN_FRACTION));
            -t * (t - 2.0)
        };
        eased * self.force
    }
}

/// RGB raster written by the trail, stored top row first.
#[derive(Debug, Clone)]
pub struct IntensityTexture {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 3]>,
    needs_update: bool,
}

impl IntensityTexture {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0.0; 3]; (width * height) as usize],
            needs_update: true,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at column `x`, row `y` (row 0 is the top edge).
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 3] {
        self.pixels[(y * self.width + x) as usize]
    }

    /// True when the contents changed since the last GPU upload.
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    pub fn is_black(&self) -> bool {
        self.pixels.iter().all(|pixel| *pixel == [0.0; 3])
    }

    fn clear(&mut self) {
        self.pixels.fill([0.0; 3]);
    }

    /// Paints a soft disc centred on `center` (pixel space) with source-over
    /// compositing. Coverage is half at `radius` and reaches zero at twice it.
    fn draw_glow(&mut self, center: [f32; 2], radius: f32, alpha: f32, color: [f32; 3]) {
        if alpha.is_nan() || alpha <= 0.0 || !center[0].is_finite() || !center[1].is_finite() {
            return;
        }
        let reach = radius * 2.0;
        let min_x = (center[0] - reach).floor().max(0.0) as u32;
        let max_x = ((center[0] + reach).ceil().max(0.0) as u32).min(self.width);
        let min_y = (center[1] - reach).floor().max(0.0) as u32;
        let max_y = ((center[1] + reach).ceil().max(0.0) as u32).min(self.height);

        for y in min_y..max_y {
            for x in min_x..max_x {
                let dx = x as f32 + 0.5 - center[0];
                let dy = y as f32 + 0.5 - center[1];
                let coverage = 1.0 - smoothstep(0.0, reach, (dx * dx + dy * dy).sqrt());
                if coverage <= 0.0 {
                    continue;
                }
                let a = alpha * coverage;
                let pixel = &mut self.pixels[(y * self.width + x) as usize];
                for (channel, source) in pixel.iter_mut().zip(color) {
                    *channel = source * a + *channel * (1.0 - a);
                }
            }
        }
    }

    /// Bilinear, clamp-to-edge sample with `v = 0` at the bottom edge. An
    /// empty texture samples as black.
    pub fn sample(&self, u: f32, v: f32) -> [f32; 3] {
        if self.width == 0 || self.height == 0 {
            return [0.0; 3];
        }
        let fx = u * self.width as f32 - 0.5;
        let fy = (1.0 - v) * self.height as f32 - 0.5;
        let x0f = fx.floor();
        let y0f = fy.floor();
        let tx = fx - x0f;
        let ty = fy - y0f;

        let max_x = self.width as i64 - 1;
        let max_y = self.height as i64 - 1;
        let x0 = (x0f as i64).clamp(0, max_x) as u32;
        let x1 = (x0f as i64 + 1).clamp(0, max_x) as u32;
        let y0 = (y0f as i64).clamp(0, max_y) as u32;
        let y1 = (y0f as i64 + 1).clamp(0, max_y) as u32;

        let top_left = self.pixel(x0, y0);
        let top_right = self.pixel(x1, y0);
        let bottom_left = self.pixel(x0, y1);
        let bottom_right = self.pixel(x1, y1);

        let mut out = [0.0; 3];
        for channel in 0..3 {
            let top = top_left[channel] + (top_right[channel] - top_left[channel]) * tx;
            let bottom =
                bottom_left[channel] + (bottom_right[channel] - bottom_left[channel]) * tx;
            out[channel] = top + (bottom - top) * ty;
        }
        out
    }

    /// Converts the raster to RGBA8, flipped so the first row is the bottom
    /// edge. This matches the UV origin used by the plane geometry.
    pub fn to_rgba8(&self) -> RgbaImage {
        let mut image = RgbaImage::from_fn(self.width, self.height, |x, y| {
            let [r, g, b] = self.pixel(x, y);
            Rgba([to_unorm8(r), to_unorm8(g), to_unorm8(b), 255])
        });
        flip_vertical_in_place(&mut image);
        image
    }
}

fn to_unorm8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Input tracker: owns the trail and the texture rasterised from it.
#[derive(Debug, Clone)]
pub struct TouchTexture {
    trail: Vec<TouchPoint>,
    last: Option<[f32; 2]>,
    texture: IntensityTexture,
}

impl Default for TouchTexture {
    fn default() -> Self {
        Self::new()
    }
}

impl TouchTexture {
    pub fn new() -> Self {
        Self {
            trail: Vec::new(),
            last: None,
            texture: IntensityTexture::new(TEXTURE_SIZE, TEXTURE_SIZE),
        }
    }

    pub fn trail(&self) -> &[TouchPoint] {
        &self.trail
    }

    pub fn texture(&self) -> &IntensityTexture {
        &self.texture
    }

    /// Records a pointer sample in normalised coordinates (`y = 0` at the bottom).
    ///
    /// The first sample only establishes a baseline, and a sample identical to
    /// the previous one is dropped since it has no direction.
    pub fn add_touch(&mut self, point: [f32; 2]) {
        let Some(last) = self.last else {
            self.last = Some(point);
            return;
        };

        let dx = point[0] - last[0];
        let dy = point[1] - last[1];
        if dx == 0.0 && dy == 0.0 {
            return;
        }

        let distance_sq = dx * dx + dy * dy;
        let distance = distance_sq.sqrt();
        let force = (distance_sq * FORCE_GAIN).min(MAX_FORCE);

        self.last = Some(point);
        self.trail.push(TouchPoint {
            position: point,
            age: 0,
            force,
            direction: [dx / distance, dy / distance],
        });
    }

    /// Ages every point by one tick and repaints the texture from scratch.
    pub fn update(&mut self) {
        self.texture.clear();

        for index in (0..self.trail.len()).rev() {
            let point = &mut self.trail[index];
            point.advance();
            if point.expired() {
                self.trail.remove(index);
                continue;
            }
            let point = *point;
            self.draw_point(&point);
        }

        self.texture.needs_update = true;
    }

    /// Hands the texture to the GPU upload when it changed since the last call.
    pub fn take_upload(&mut self) -> Option<&IntensityTexture> {
        if self.texture.needs_update {
            self.texture.needs_update = false;
            Some(&self.texture)
        } else {
            None
        }
    }

    fn draw_point(&mut self, point: &TouchPoint) {
        let center = [
            point.position[0] * self.texture.width as f32,
            (1.0 - point.position[1]) * self.texture.height as f32,
        ];
        let alpha = (GLOW_ALPHA * point.glow_intensity()).clamp(0.0, 1.0);
        let color = [
            0.5 + 0.5 * point.direction[0],
            0.5 + 0.5 * point.direction[1],
            1.0,
        ];
        self.texture.draw_glow(center, RADIUS, alpha, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_touch_only_records_baseline() {
        let mut touch = TouchTexture::new();
        touch.add_touch([0.2, 0.2]);
        assert!(touch.trail().is_empty());
    }

    #[test]
    fn distinct_touches_create_one_fewer_point() {
        let mut touch = TouchTexture::new();
        for step in 0..10 {
            touch.add_touch([0.1 + step as f32 * 0.05, 0.3]);
        }
        assert_eq!(touch.trail().len(), 9);
    }

    #[test]
    fn repeated_coordinate_is_ignored() {
        let mut touch = TouchTexture::new();
        touch.add_touch([0.4, 0.4]);
        touch.add_touch([0.5, 0.4]);
        touch.add_touch([0.5, 0.4]);
        assert_eq!(touch.trail().len(), 1);
    }

    #[test]
    fn horizontal_swipe_has_unit_direction_and_capped_force() {
        let mut touch = TouchTexture::new();
        touch.add_touch([0.5, 0.5]);
        touch.add_touch([0.6, 0.5]);

        assert_eq!(touch.trail().len(), 1);
        let point = touch.trail()[0];
        assert!((point.direction[0] - 1.0).abs() < 1e-6);
        assert!(point.direction[1].abs() < 1e-6);
        assert_eq!(point.force, 2.0);
        assert_eq!(point.age, 0);
        assert_eq!(point.position, [0.6, 0.5]);
    }

    #[test]
    fn force_stays_within_bounds() {
        let mut touch = TouchTexture::new();
        touch.add_touch([0.0, 0.0]);
        touch.add_touch([0.001, 0.0]);
        touch.add_touch([1.0, 1.0]);
        touch.add_touch([-50.0, 80.0]);

        let forces: Vec<f32> = touch.trail().iter().map(|point| point.force).collect();
        assert!((forces[0] - 0.02).abs() < 1e-4);
        assert!(forces
            .iter()
            .all(|force| (0.0..=MAX_FORCE).contains(force)));
        assert_eq!(forces[1], MAX_FORCE);
        assert_eq!(forces[2], MAX_FORCE);
    }

    #[test]
    fn point_expires_after_max_age_updates() {
        let mut touch = TouchTexture::new();
        touch.add_touch([0.5, 0.5]);
        touch.add_touch([0.52, 0.5]);

        for _ in 0..MAX_AGE - 1 {
            touch.update();
        }
        assert_eq!(touch.trail().len(), 1);
        assert_eq!(touch.trail()[0].age, MAX_AGE - 1);

        touch.update();
        assert!(touch.trail().is_empty());

        touch.update();
        assert!(touch.texture().is_black());
    }

    #[test]
    fn ages_increase_by_one_per_update() {
        let mut touch = TouchTexture::new();
        touch.add_touch([0.1, 0.1]);
        touch.add_touch([0.2, 0.1]);
        touch.update();
        touch.add_touch([0.3, 0.1]);
        touch.update();
        let ages: Vec<u32> = touch.trail().iter().map(|point| point.age).collect();
        assert_eq!(ages, vec![2, 1]);
    }

    #[test]
    fn empty_update_leaves_black_texture_marked_dirty() {
        let mut touch = TouchTexture::new();
        assert!(touch.take_upload().is_some());
        assert!(touch.take_upload().is_none());

        touch.update();
        assert!(touch.texture().is_black());
        assert!(touch.texture().needs_update());
        let uploaded = touch.take_upload().expect("dirty after update");
        assert_eq!(uploaded.width(), TEXTURE_SIZE);
        assert!(!touch.texture().needs_update());
    }

    #[test]
    fn points_drift_along_their_direction() {
        let mut touch = TouchTexture::new();
        touch.add_touch([0.5, 0.5]);
        touch.add_touch([0.5, 0.6]);
        touch.update();

        let point = touch.trail()[0];
        let expected = 0.6 + MAX_FORCE * SPEED;
        assert!((point.position[1] - expected).abs() < 1e-6);
        assert!((point.position[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn glow_lands_where_the_pointer_was() {
        let mut touch = TouchTexture::new();
        touch.add_touch([0.3, 0.85]);
        touch.add_touch([0.305, 0.85]);
        for _ in 0..10 {
            touch.update();
        }

        let texture = touch.texture();
        let x = (touch.trail()[0].position[0] * TEXTURE_SIZE as f32) as u32;
        // Input y is bottom-up, texture rows are top-down.
        let y = ((1.0 - 0.85) * TEXTURE_SIZE as f32) as u32;
        let lit = texture.pixel(x, y);
        assert!(lit[2] > 0.1, "expected glow at ({x}, {y}), got {lit:?}");
        // Moving right pushes red above the neutral 0.5 scaled by coverage.
        assert!(lit[0] > lit[1]);
        assert_eq!(texture.pixel(0, TEXTURE_SIZE - 1), [0.0; 3]);
    }

    #[test]
    fn glow_intensity_ramps_up_then_fades() {
        let mut point = TouchPoint {
            position: [0.5, 0.5],
            age: 0,
            force: 1.0,
            direction: [1.0, 0.0],
        };
        assert_eq!(point.glow_intensity(), 0.0);

        point.age = (MAX_AGE as f32 * EASE_IN_FRACTION).ceil() as u32;
        let peak = point.glow_intensity();
        assert!(peak > 0.95);

        point.age = MAX_AGE - 1;
        let tail = point.glow_intensity();
        assert!(tail < 0.1 && tail > 0.0);

        point.force = 2.0;
        assert!((point.glow_intensity() - tail * 2.0).abs() < 1e-6);
    }

    #[test]
    fn rgba_export_flips_rows_to_bottom_first() {
        let mut touch = TouchTexture::new();
        touch.add_touch([0.5, 0.9]);
        touch.add_touch([0.51, 0.9]);
        for _ in 0..8 {
            touch.update();
        }

        let image = touch.texture().to_rgba8();
        let top_rows_lit = (0..8).any(|y| image.get_pixel(32, y)[2] > 0);
        let bottom_rows_lit = (TEXTURE_SIZE - 8..TEXTURE_SIZE).any(|y| image.get_pixel(32, y)[2] > 0);
        assert!(bottom_rows_lit, "glow near the top edge should land in the last rows");
        assert!(!top_rows_lit);
        assert!(image.pixels().all(|pixel| pixel[3] == 255));
    }

    #[test]
    fn glow_disc_has_half_coverage_at_radius() {
        assert_eq!(RADIUS, 16.0);
        let mut touch = TouchTexture::new();
        let size = TEXTURE_SIZE as f32;
        // Centre lands on the middle of texel (32, 32).
        let point = TouchPoint {
            position: [32.5 / size, 1.0 - 32.5 / size],
            age: 20,
            force: 1.0,
            direction: [1.0, 0.0],
        };
        touch.draw_point(&point);

        let alpha = GLOW_ALPHA * point.glow_intensity();
        assert!(alpha > 0.0 && alpha < 1.0);
        let texture = touch.texture();

        let centre = texture.pixel(32, 32);
        assert!((centre[2] - alpha).abs() < 1e-5, "{centre:?} vs {alpha}");
        assert!((centre[0] - alpha).abs() < 1e-5);
        assert!((centre[1] - 0.5 * alpha).abs() < 1e-5);

        let at_radius = texture.pixel(32 + RADIUS as u32, 32);
        assert!((at_radius[2] - 0.5 * alpha).abs() < 1e-5, "{at_radius:?}");

        let at_twice_radius = texture.pixel(32, 32 - 2 * RADIUS as u32);
        assert_eq!(at_twice_radius, [0.0; 3]);
        assert_eq!(texture.pixel(63, 63), [0.0; 3]);
    }

    #[test]
    fn strong_glow_alpha_is_clamped_to_one() {
        let mut touch = TouchTexture::new();
        let size = TEXTURE_SIZE as f32;
        let point = TouchPoint {
            position: [32.5 / size, 1.0 - 32.5 / size],
            age: 20,
            force: MAX_FORCE,
            direction: [0.0, 1.0],
        };
        assert!(GLOW_ALPHA * point.glow_intensity() > 1.0);
        touch.draw_point(&point);
        assert_eq!(touch.texture().pixel(32, 32), [0.5, 1.0, 1.0]);
    }

    #[test]
    fn empty_texture_samples_black() {
        let texture = IntensityTexture::new(0, 0);
        assert_eq!(texture.sample(0.5, 0.5), [0.0; 3]);
        assert_eq!(texture.sample(-3.0, 7.0), [0.0; 3]);
        assert!(texture.is_black());
    }

    #[test]
    fn bilinear_sample_interpolates_between_texels() {
        let mut texture = IntensityTexture::new(2, 1);
        texture.pixels = vec![[0.0, 0.0, 0.0], [1.0, 0.5, 0.25]];

        assert_eq!(texture.sample(0.0, 0.5), [0.0, 0.0, 0.0]);
        assert_eq!(texture.sample(1.0, 0.5), [1.0, 0.5, 0.25]);
        let mid = texture.sample(0.5, 0.5);
        assert!((mid[0] - 0.5).abs() < 1e-6);
        assert!((mid[1] - 0.25).abs() < 1e-6);
    }
}
