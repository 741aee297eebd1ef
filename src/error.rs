//! Error types for morphcloud.
//!
//! All failures in this crate happen at initialization time: acquiring a GPU
//! device, or allocating the floating-point render targets the simulation
//! depends on. Steady-state operation has no recoverable errors.

use std::fmt;

/// Errors that can occur while acquiring a GPU context.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur while building a [`crate::MorphCloud`].
///
/// Either the adapter cannot render into `Rgba32Float` textures (the position
/// state has nowhere to live), or the underlying GPU context failed. No
/// partial cloud state survives a failed build.
#[derive(Debug)]
pub enum InitError {
    /// The adapter does not support rendering into floating-point textures.
    FloatTargetUnsupported,
    /// A state texture dimension was zero.
    EmptyStateTexture,
    /// GPU context acquisition failed.
    Gpu(GpuError),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::FloatTargetUnsupported => write!(
                f,
                "Adapter cannot use Rgba32Float as a render attachment; the particle state pipeline requires float render targets"
            ),
            InitError::EmptyStateTexture => {
                write!(f, "State texture must be at least 1x1 texel")
            }
            InitError::Gpu(e) => write!(f, "GPU error: {}", e),
        }
    }
}

impl std::error::Error for InitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InitError::Gpu(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GpuError> for InitError {
    fn from(e: GpuError) -> Self {
        InitError::Gpu(e)
    }
}
