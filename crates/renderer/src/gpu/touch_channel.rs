use wgpu::util::{DeviceExt, TextureDataOrder};

use crate::touch::{IntensityTexture, TEXTURE_SIZE};

const BYTES_PER_PIXEL: u32 = 4;

/// GPU copy of the touch raster, bound next to the uniform block.
pub(crate) struct TouchChannel {
    texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl TouchChannel {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        // Black until the first upload, matching an empty trail.
        let data = vec![0u8; (TEXTURE_SIZE * TEXTURE_SIZE * BYTES_PER_PIXEL) as usize];
        // Direction and glow are data, never colour, so no sRGB decode.
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("touch texture"),
                size: extent(),
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            TextureDataOrder::LayerMajor,
            &data,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("touch sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    pub fn upload(&self, queue: &wgpu::Queue, raster: &IntensityTexture) {
        if raster.width() != TEXTURE_SIZE || raster.height() != TEXTURE_SIZE {
            tracing::warn!(
                width = raster.width(),
                height = raster.height(),
                "touch texture upload ignored due to mismatched size"
            );
            return;
        }

        let image = raster.to_rgba8();
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(TEXTURE_SIZE * BYTES_PER_PIXEL),
                rows_per_image: Some(TEXTURE_SIZE),
            },
            extent(),
        );
    }
}

fn extent() -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: TEXTURE_SIZE,
        height: TEXTURE_SIZE,
        depth_or_array_layers: 1,
    }
}
