//! Error types of the viewer.

use std::io;
use std::path::PathBuf;

/// Failure to turn an asset into something renderable.
///
/// None of these touch the scene: whatever was displayed before stays.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode glTF asset")]
    Gltf(#[from] gltf::Error),

    #[error("failed to decode frame {}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("no renderable geometry found")]
    MissingGeometry,

    #[error("no frames given")]
    NoFrames,

    #[error("frame {} is {width}x{height}, expected {expected_width}x{expected_height} with an even height", path.display())]
    FrameSize {
        path: PathBuf,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
}

/// Parameters that make no sense, caught before the window opens.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("subsample rate must be in (0, 1], got {0}")]
    SubsampleRate(f64),

    #[error("evaporation amount must be in [0, 1], got {0}")]
    EvaporationAmount(f64),

    #[error("appearance duration and delay must not be negative")]
    NegativeTiming,

    #[error("focal lengths must be non-zero")]
    FocalLength,

    #[error("point grid must be at least 2x2, got {0}x{1}")]
    Grid(u32, u32),

    #[error("frame rate must be positive, got {0}")]
    FrameRate(f32),
}

/// Failure to bring up the GPU.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("no suitable graphics adapter found")]
    NoAdapter,

    #[error("failed to create surface")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to request device")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}
