use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::gradient::{GradientParams, Rgb};

/// CPU mirror of the `GradientParams` std140 block in `compile.rs`.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct GradientUniforms {
    pub view_projection: Mat4,
    pub colors: [[f32; 4]; 6],
    pub dark: [f32; 4],
    pub resolution: [f32; 2],
    pub time: f32,
    pub speed: f32,
    pub intensity: f32,
    pub gradient_size: f32,
    pub grain_intensity: f32,
    pub padding0: f32,
}

unsafe impl Zeroable for GradientUniforms {}
unsafe impl Pod for GradientUniforms {}

fn extend(rgb: Rgb) -> [f32; 4] {
    [rgb[0], rgb[1], rgb[2], 1.0]
}

impl GradientUniforms {
    pub fn new(params: &GradientParams) -> Self {
        Self {
            view_projection: Mat4::IDENTITY,
            colors: params.colors.map(extend),
            dark: extend(params.dark),
            resolution: [0.0, 0.0],
            time: 0.0,
            speed: params.speed,
            intensity: params.intensity,
            gradient_size: params.gradient_size,
            grain_intensity: params.grain_intensity,
            padding0: 0.0,
        }
    }

    pub fn set_view_projection(&mut self, matrix: Mat4) {
        self.view_projection = matrix;
    }

    pub fn set_resolution(&mut self, width: f32, height: f32) {
        self.resolution = [width, height];
    }

    pub fn set_time(&mut self, time: f32) {
        self.time = time;
    }
}
