//! Caps the shading resolution at [`MAX_PIXEL_RATIO`] device pixels per
//! logical pixel. On denser displays the gradient is drawn into a smaller
//! offscreen target and stretched over the swapchain with one extra pass.

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;

use crate::compile::compile_upscale_shaders;

use super::pipeline::sampled_texture_entries;

/// Highest device pixel ratio the gradient is shaded at.
pub(crate) const MAX_PIXEL_RATIO: f64 = 2.0;

/// Size the gradient is rendered at for a surface of `physical` pixels.
pub(crate) fn capped_render_size(
    physical: PhysicalSize<u32>,
    scale_factor: f64,
) -> PhysicalSize<u32> {
    if !scale_factor.is_finite() || scale_factor <= MAX_PIXEL_RATIO {
        return physical;
    }
    let ratio = MAX_PIXEL_RATIO / scale_factor;
    let scale = |value: u32| ((value as f64 * ratio).round() as u32).clamp(1, value.max(1));
    PhysicalSize::new(scale(physical.width), scale(physical.height))
}

pub(crate) struct UpscalePass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

/// Offscreen colour target the gradient renders into when the cap applies.
pub(crate) struct UpscaleTarget {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
}

impl UpscalePass {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Result<Self> {
        let (vertex_module, fragment_module) =
            compile_upscale_shaders(device).context("failed to compile upscale shaders")?;
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("upscale layout"),
            entries: &sampled_texture_entries(),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("upscale pipeline layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("upscale pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("upscale sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Ok(Self {
            pipeline,
            layout,
            sampler,
        })
    }

    pub fn create_target(
        &self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
    ) -> UpscaleTarget {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("capped color target"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("upscale bind group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        UpscaleTarget {
            _texture: texture,
            view,
            bind_group,
        }
    }

    /// Stretches `target` over the whole of `surface_view`.
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &UpscaleTarget,
        surface_view: &wgpu::TextureView,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("upscale pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &target.bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}
