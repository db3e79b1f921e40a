#![cfg_attr(not(test), no_std)]
//! Per-point math shared by the SPIR-V shaders and the host.
//!
//! Everything in here runs unchanged on the GPU (through `shaders`) and on the
//! CPU (through the viewer's software evaluation path and the unit tests).

pub mod appearance;
pub mod depth;
pub mod evaporation;
pub mod particle;
pub mod projection;

use glam::{Mat4, UVec2, Vec2, Vec3};

/// Bound at descriptor set 0 for every drawable.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct CameraUniforms {
    pub model_view: Mat4,
    pub projection: Mat4,
}

/// Uniforms of the particle (model) hologram.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ParticleUniforms {
    pub point_size: f32,
    pub time: f32,
    pub evaporation_speed: f32,
    pub evaporation_enabled: u32,
    pub max_height: f32,
    pub appearance_progress: f32,
    pub appearance_scale: f32,
    pub global_opacity: f32,
}

/// One point of a subsampled model, laid out as the particle vertex buffer.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ParticleVertex {
    pub position: Vec3,
    pub color: Vec3,
    pub evaporation_factor: f32,
    pub random_delay: f32,
}

/// Uniforms of the video hologram.
///
/// `resolution` is the point grid (and projection) resolution, `frame_size`
/// the size of the hybrid frame holding both the depth and the color plane.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct HologramUniforms {
    pub resolution: Vec2,
    pub focal_length: Vec2,
    pub frame_size: UVec2,
    pub min_z: f32,
    pub max_z: f32,
    pub point_size: f32,
    pub reverse_depth: u32,
    pub far_fade: f32,
    pub _padding: f32,
}

/// GLSL `fract`: always in `[0, 1)`, also for negative input.
pub fn fract(x: f32) -> f32 {
    use num_traits::Float;
    x - x.floor()
}

pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
