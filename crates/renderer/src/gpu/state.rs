use std::time::{Duration, Instant};

use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::debug;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::gradient::{GradientParams, PlaneGeometry};
use crate::scene::Scene;
use crate::types::{Antialiasing, ColorSpaceMode};

use super::context::GpuContext;
use super::pipeline::{GradientPipeline, PipelineLayouts};
use super::touch_channel::TouchChannel;
use super::uniforms::GradientUniforms;
use super::upscale::{capped_render_size, UpscalePass, UpscaleTarget};

pub(crate) struct GpuState {
    context: GpuContext,
    _layouts: PipelineLayouts,
    pipeline: GradientPipeline,
    touch: TouchChannel,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: GradientUniforms,
    plane: Option<PlaneBuffers>,
    render_size: PhysicalSize<u32>,
    multisample_target: Option<MultisampleTarget>,
    upscale: UpscalePass,
    upscale_target: Option<UpscaleTarget>,
    last_fps_update: Instant,
    frames_since_last_update: u32,
    frame_count: u64,
}

struct PlaneBuffers {
    revision: u64,
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
}

struct MultisampleTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl MultisampleTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa color target"),
            size: extent,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        scale_factor: f64,
        params: &GradientParams,
        antialiasing: Antialiasing,
        color_space: ColorSpaceMode,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size, antialiasing, color_space)?;
        let layouts = PipelineLayouts::new(&context.device);
        let touch = TouchChannel::new(&context.device, &context.queue);
        let pipeline = GradientPipeline::new(
            &context.device,
            &layouts,
            &touch,
            context.surface_format,
            context.sample_count,
        )?;

        let uniforms = GradientUniforms::new(params);
        let uniform_buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("uniform buffer"),
                contents: bytemuck::bytes_of(&uniforms),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("uniform bind group"),
                layout: &layouts.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

        let upscale = UpscalePass::new(&context.device, context.surface_format)?;
        let surface_size = context.size;

        let mut state = Self {
            context,
            _layouts: layouts,
            pipeline,
            touch,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
            plane: None,
            render_size: surface_size,
            multisample_target: None,
            upscale,
            upscale_target: None,
            last_fps_update: Instant::now(),
            frames_since_last_update: 0,
            frame_count: 0,
        };
        state.rebuild_targets(scale_factor);
        Ok(state)
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>, scale_factor: f64) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        self.rebuild_targets(scale_factor);
    }

    /// Recreates the MSAA and capped-resolution targets for the current
    /// surface size.
    fn rebuild_targets(&mut self, scale_factor: f64) {
        let surface_size = self.context.size;
        let render_size = capped_render_size(surface_size, scale_factor);
        let device = &self.context.device;
        let format = self.context.surface_format;

        self.upscale_target = (render_size != surface_size)
            .then(|| self.upscale.create_target(device, format, render_size));
        self.multisample_target = (self.context.sample_count > 1).then(|| {
            MultisampleTarget::new(device, format, render_size, self.context.sample_count)
        });
        if render_size != self.render_size {
            debug!(
                surface_width = surface_size.width,
                surface_height = surface_size.height,
                render_width = render_size.width,
                render_height = render_size.height,
                scale_factor,
                "render targets rebuilt"
            );
        }
        self.render_size = render_size;
    }

    /// Uploads pending touch data and uniforms, then draws the plane once.
    pub(crate) fn render(&mut self, scene: &mut Scene) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;

        if let Some(raster) = scene.take_texture_upload() {
            self.touch.upload(&self.context.queue, raster);
        }

        self.sync_plane(scene);
        self.uniforms
            .set_view_projection(scene.camera().view_projection());
        let [width, height] = scene.background().resolution();
        self.uniforms.set_resolution(width, height);
        self.uniforms.set_time(scene.background().time());
        self.context.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.uniforms),
        );

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });
        match self.upscale_target.as_ref() {
            Some(target) => {
                self.encode_draw(&mut encoder, &target.view);
                self.upscale.encode(&mut encoder, target, &view);
            }
            None => self.encode_draw(&mut encoder, &view),
        }
        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        self.record_frame();
        Ok(())
    }

    fn sync_plane(&mut self, scene: &Scene) {
        let background = scene.background();
        let Some(geometry) = background.geometry() else {
            self.plane = None;
            return;
        };
        let revision = background.geometry_revision();
        if self
            .plane
            .as_ref()
            .is_some_and(|plane| plane.revision == revision)
        {
            return;
        }

        let device = &self.context.device;
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("plane vertices"),
            contents: bytemuck::cast_slice(geometry.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("plane indices"),
            contents: bytemuck::cast_slice(&PlaneGeometry::INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });
        debug!(revision, "uploaded plane geometry");
        self.plane = Some(PlaneBuffers {
            revision,
            vertices,
            indices,
        });
    }

    fn encode_draw(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let (attachment_view, resolve_target) = match self.multisample_target.as_ref() {
            Some(msaa) => (&msaa.view, Some(view)),
            None => (view, None),
        };
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("render pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: attachment_view,
                depth_slice: None,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        let Some(plane) = self.plane.as_ref() else {
            return;
        };
        render_pass.set_pipeline(&self.pipeline.pipeline);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.set_bind_group(1, &self.pipeline.touch_bind_group, &[]);
        render_pass.set_vertex_buffer(0, plane.vertices.slice(..));
        render_pass.set_index_buffer(plane.indices.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..PlaneGeometry::INDICES.len() as u32, 0, 0..1);
    }

    fn record_frame(&mut self) {
        self.frame_count = self.frame_count.saturating_add(1);
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last_fps_update);
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames_since_last_update as f32 / elapsed.as_secs_f32();
            debug!(
                fps = fps.round(),
                frame_count = self.frame_count,
                time = self.uniforms.time,
                "render stats"
            );
            self.frames_since_last_update = 0;
            self.last_fps_update = now;
        }
    }
}
