//! Turning loaded geometry into a subsampled, animatable point set.

use glam::{Mat4, Vec3, Vec4};
use log::info;
use rand::seq::index;
use rand::Rng;
use shared::particle::{animate, point_size};
use shared::{ParticleUniforms, ParticleVertex};

use crate::error::LoadError;

/// Smallest evaporation factor handed out to an evaporating point.
pub const MIN_EVAPORATION_FACTOR: f32 = 0.2;

/// Positions and optional colors as they come out of the asset loader.
#[derive(Debug, Clone)]
pub struct SourceGeometry {
    positions: Vec<Vec3>,
    colors: Option<Vec<Vec3>>,
}

impl SourceGeometry {
    /// Fails with [`LoadError::MissingGeometry`] when there are no positions.
    pub fn new(positions: Vec<Vec3>, colors: Option<Vec<Vec3>>) -> Result<Self, LoadError> {
        if positions.is_empty() {
            return Err(LoadError::MissingGeometry);
        }
        Ok(Self { positions, colors })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    /// Color of point `index`, opaque white if the source has none.
    pub fn color(&self, index: usize) -> Vec3 {
        self.colors
            .as_ref()
            .and_then(|colors| colors.get(index).copied())
            .unwrap_or(Vec3::ONE)
    }
}

/// Number of points left after subsampling, never zero.
pub fn target_count(original_count: usize, subsample_rate: f64) -> usize {
    ((original_count as f64 * subsample_rate).floor() as usize).max(1)
}

/// Source point picked for output point `index` by stride decimation.
pub fn source_index(index: usize, original_count: usize, target_count: usize) -> usize {
    let stride = original_count as f64 / target_count as f64;
    ((index as f64 * stride).floor() as usize).min(original_count - 1)
}

pub fn evaporation_count(target_count: usize, evaporation_amount: f64) -> usize {
    ((target_count as f64 * evaporation_amount).floor() as usize).min(target_count)
}

/// A subsampled point cloud with its per-point animation attributes.
///
/// All attribute vectors have the same length, index `i` is the same point
/// in each of them.
#[derive(Debug, Clone)]
pub struct PointSet {
    positions: Vec<Vec3>,
    colors: Vec<Vec3>,
    evaporation_factors: Vec<f32>,
    random_delays: Vec<f32>,
}

impl PointSet {
    /// Decimates `source` down to `subsample_rate` of its points and picks a
    /// fresh random evaporating subset.
    pub fn build<R: Rng + ?Sized>(
        source: &SourceGeometry,
        subsample_rate: f64,
        evaporation_amount: f64,
        rng: &mut R,
    ) -> Self {
        let original_count = source.len();
        let target_count = target_count(original_count, subsample_rate);
        let evaporation_count = evaporation_count(target_count, evaporation_amount);
        info!(
            "Setting {} points to evaporate out of {} total",
            evaporation_count, target_count
        );

        let mut evaporation_factors = vec![0.0; target_count];
        for i in index::sample(rng, target_count, evaporation_count) {
            evaporation_factors[i] = rng.gen_range(MIN_EVAPORATION_FACTOR..=1.0);
        }

        let mut positions = Vec::with_capacity(target_count);
        let mut colors = Vec::with_capacity(target_count);
        let mut random_delays = Vec::with_capacity(target_count);
        for i in 0..target_count {
            let source_index = source_index(i, original_count, target_count);
            positions.push(source.positions[source_index]);
            colors.push(source.color(source_index));
            random_delays.push(rng.gen::<f32>());
        }

        Self {
            positions,
            colors,
            evaporation_factors,
            random_delays,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[cfg(test)]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[cfg(test)]
    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    #[cfg(test)]
    pub fn evaporation_factors(&self) -> &[f32] {
        &self.evaporation_factors
    }

    #[cfg(test)]
    pub fn random_delays(&self) -> &[f32] {
        &self.random_delays
    }

    pub fn evaporating_count(&self) -> usize {
        self.evaporation_factors.iter().filter(|&&f| f > 0.0).count()
    }

    pub fn vertex(&self, index: usize) -> ParticleVertex {
        ParticleVertex {
            position: self.positions[index],
            color: self.colors[index],
            evaporation_factor: self.evaporation_factors[index],
            random_delay: self.random_delays[index],
        }
    }

    pub fn vertices(&self) -> Vec<ParticleVertex> {
        (0..self.len()).map(|i| self.vertex(i)).collect()
    }

    /// Software rendition of the particle vertex shader.
    pub fn evaluate(&self, uniforms: &ParticleUniforms, model_view: Mat4) -> Vec<RenderedPoint> {
        (0..self.len())
            .map(|i| {
                let vertex = self.vertex(i);
                let particle = animate(&vertex, uniforms);
                let view_z = model_view.transform_point3(particle.position).z;
                RenderedPoint {
                    position: particle.position,
                    color: vertex.color.extend(particle.opacity),
                    size: point_size(uniforms.point_size, particle.size, view_z),
                }
            })
            .collect()
    }
}

/// A point as it ends up on screen: model space position, RGBA and size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedPoint {
    pub position: Vec3,
    pub color: Vec4,
    pub size: f32,
}
