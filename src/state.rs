//! Particle state textures and the double-buffer swap protocol.
//!
//! Positions live in `Rgba32Float` textures, one texel per particle. Two
//! such textures alternate roles every frame: the simulation pass reads the
//! back texture (last frame's output) and renders into the front one. The
//! swap is a pure role flip; no texel data ever moves.
//!
//! Morph targets are the same format but immutable: uploaded once at build
//! time and only ever read.

/// Texture format for all particle state data.
pub const STATE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// A pair of resources alternating between front (written this frame) and
/// back (read this frame) roles.
///
/// Generic over the held resource so the swap algebra is testable without a
/// GPU device. Swapping twice restores the original assignment.
#[derive(Debug)]
pub struct PingPong<T> {
    a: T,
    b: T,
    front_is_b: bool,
}

impl<T> PingPong<T> {
    /// Create a pair with `a` as the initial front.
    pub fn new(a: T, b: T) -> Self {
        Self { a, b, front_is_b: false }
    }

    /// The resource written this frame.
    pub fn front(&self) -> &T {
        if self.front_is_b {
            &self.b
        } else {
            &self.a
        }
    }

    /// The resource read this frame (last frame's front).
    pub fn back(&self) -> &T {
        if self.front_is_b {
            &self.a
        } else {
            &self.b
        }
    }

    /// Exchange front and back roles. Must be called exactly once per
    /// simulation tick, before the simulation pass is encoded.
    pub fn swap(&mut self) {
        self.front_is_b = !self.front_is_b;
    }

    /// Index of the current front resource: 0 for `a`, 1 for `b`.
    ///
    /// Used to select between pre-built per-orientation bind groups.
    pub fn front_index(&self) -> usize {
        usize::from(self.front_is_b)
    }
}

/// One particle state texture with its render-attachment view.
pub struct StateTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl StateTexture {
    /// Allocate a `width * height` state texture.
    ///
    /// Single mip level, no sampler anywhere in the pipeline: shaders address
    /// state textures with `textureLoad` only, so adjacent texels can never
    /// bleed into each other.
    pub fn new(device: &wgpu::Device, label: &str, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: STATE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// The two immutable morph target textures (shape A and shape B).
pub struct MorphTargets {
    pub a: wgpu::Texture,
    pub a_view: wgpu::TextureView,
    pub b: wgpu::Texture,
    pub b_view: wgpu::TextureView,
}

impl MorphTargets {
    /// Upload both morph target shapes.
    ///
    /// `data_*` is row-major RGBA32F texel data, 4 floats per particle, as
    /// produced by [`crate::ShapeDistribution::fill`].
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        data_a: &[f32],
        data_b: &[f32],
    ) -> Self {
        let (a, a_view) = upload_target(device, queue, "Morph Target A", width, height, data_a);
        let (b, b_view) = upload_target(device, queue, "Morph Target B", width, height, data_b);
        Self { a, a_view, b, b_view }
    }
}

fn upload_target(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    width: u32,
    height: u32,
    data: &[f32],
) -> (wgpu::Texture, wgpu::TextureView) {
    debug_assert_eq!(data.len() as u32, width * height * 4);

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: STATE_FORMAT,
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
        bytemuck::cast_slice(data),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 16),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_roles() {
        let pair = PingPong::new(1, 2);
        assert_eq!(*pair.front(), 1);
        assert_eq!(*pair.back(), 2);
        assert_eq!(pair.front_index(), 0);
    }

    #[test]
    fn test_swap_exchanges_roles() {
        let mut pair = PingPong::new(1, 2);
        pair.swap();
        assert_eq!(*pair.front(), 2);
        assert_eq!(*pair.back(), 1);
        assert_eq!(pair.front_index(), 1);
    }

    #[test]
    fn test_swap_is_involution() {
        let mut pair = PingPong::new('x', 'y');
        pair.swap();
        pair.swap();
        assert_eq!(*pair.front(), 'x');
        assert_eq!(*pair.back(), 'y');
    }
}
