//! The complete per-point transform of the particle hologram.

use glam::Vec3;

use crate::appearance::reveal;
use crate::evaporation::{self, evaporate, is_evaporating};
use crate::{ParticleUniforms, ParticleVertex};

/// Reference distance the base point size is given at.
pub const SIZE_DISTANCE: f32 = 1000.0;

#[derive(Clone, Copy)]
pub struct Particle {
    /// Model space position.
    pub position: Vec3,
    pub opacity: f32,
    /// Multiplier on the base point size.
    pub size: f32,
}

/// Composes the appearance animation with the evaporation cycle.
///
/// Evaporation takes over opacity and size once a point has started to
/// appear. Points the reveal has not reached stay invisible.
pub fn animate(vertex: &ParticleVertex, uniforms: &ParticleUniforms) -> Particle {
    let reveal = reveal(
        vertex.position,
        vertex.random_delay,
        uniforms.appearance_progress,
        uniforms.appearance_scale,
        uniforms.global_opacity,
    );
    let mut particle = Particle {
        position: reveal.position,
        opacity: reveal.opacity,
        size: reveal.size,
    };

    if is_evaporating(uniforms.evaporation_enabled != 0, vertex.evaporation_factor) {
        let evaporation = evaporate(
            uniforms.time,
            vertex.evaporation_factor,
            uniforms.evaporation_speed,
            uniforms.max_height,
            uniforms.global_opacity,
        );
        particle.position.y += evaporation.rise;
        particle.opacity = if reveal.progress > 0.0 {
            evaporation.opacity
        } else {
            0.0
        };
        particle.size = evaporation::SIZE;
    }

    particle
}

/// Perspective point size at view space depth `view_z` (negative).
pub fn point_size(base: f32, size: f32, view_z: f32) -> f32 {
    base * size * (SIZE_DISTANCE / -view_z)
}
