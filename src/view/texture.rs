use crate::error::AssetLoadError;
use crate::model::TextureKey;

/// CPU-side RGBA8 pixels ready for upload
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Decode any format the `image` features allow (JPEG for the demo assets)
pub fn decode_image(path: &str, bytes: &[u8]) -> Result<DecodedImage, AssetLoadError> {
    let image = image::load_from_memory(bytes).map_err(|source| AssetLoadError::Decode {
        path: path.to_string(),
        source,
    })?;
    let rgba = image.to_rgba8();
    Ok(DecodedImage {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl GpuTexture {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, image: &DecodedImage, srgb: bool, label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let format = if srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width * 4),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// GPU textures by key, with a 1x1 white stand-in for anything not loaded yet
pub struct TextureLibrary {
    pub sampler: wgpu::Sampler,
    fallback: GpuTexture,
    loaded: Vec<Option<GpuTexture>>,
}

impl TextureLibrary {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let white = DecodedImage { width: 1, height: 1, rgba: vec![255; 4] };
        let fallback = GpuTexture::upload(device, queue, &white, false, "fallback_texture");

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("map_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            sampler,
            fallback,
            loaded: TextureKey::ALL.iter().map(|_| None).collect(),
        }
    }

    pub fn insert(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, key: TextureKey, image: &DecodedImage) {
        let texture = GpuTexture::upload(device, queue, image, key.is_color(), key.relative_path());
        self.loaded[key.index()] = Some(texture);
    }

    /// View to bind for a slot, and whether it holds real image data
    pub fn view_for(&self, key: Option<TextureKey>) -> (&wgpu::TextureView, bool) {
        match key.and_then(|k| self.loaded[k.index()].as_ref()) {
            Some(texture) => (&texture.view, true),
            None => (&self.fallback.view, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let err = decode_image("rock/broken.jpg", b"definitely not a jpeg").unwrap_err();
        assert!(matches!(err, AssetLoadError::Decode { ref path, .. } if path == "rock/broken.jpg"));
        assert!(err.to_string().contains("rock/broken.jpg"));
    }

    #[test]
    fn test_truncated_jpeg_fails_to_decode() {
        // SOI marker followed by nothing
        let err = decode_image("ground/cut.jpg", &[0xFF, 0xD8, 0xFF]).unwrap_err();
        assert!(matches!(err, AssetLoadError::Decode { .. }));
    }
}
