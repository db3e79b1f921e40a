//! The scene context: everything the frame driver and renderer work on.

use glam::{Mat4, UVec2, Vec3};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::ParticleUniforms;

use crate::animation::AnimationState;
use crate::cli::{HologramParams, ModelOptions, ParticleParams, Placement, VideoOptions};
use crate::hologram::{FrameSequence, Hologram};
use crate::loader::Asset;
use crate::point_cloud::{PointSet, RenderedPoint, SourceGeometry};

pub const MIN_SUBSAMPLE_RATE: f64 = 0.01;

/// The active point set together with its animation.
pub struct PointCloud {
    point_set: PointSet,
    animation: AnimationState,
}

impl PointCloud {
    pub fn point_set(&self) -> &PointSet {
        &self.point_set
    }

    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }
}

pub struct Scene {
    placement: Placement,
    particles: ParticleParams,
    evaporation_enabled: bool,
    grid: UVec2,
    hologram_params: HologramParams,

    source: Option<SourceGeometry>,
    point_cloud: Option<PointCloud>,
    hologram: Option<Hologram>,
    hologram_started_at: f32,

    /// Bumped whenever the displayed geometry is replaced.
    generation: u64,
    rng: StdRng,
}

impl Scene {
    fn new(placement: Placement, particles: ParticleParams) -> Self {
        Self {
            placement,
            evaporation_enabled: !particles.no_evaporation,
            particles,
            grid: UVec2::ZERO,
            hologram_params: HologramParams::default(),
            source: None,
            point_cloud: None,
            hologram: None,
            hologram_started_at: 0.0,
            generation: 0,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn for_model(options: &ModelOptions) -> Self {
        Self::new(options.content_type.placement(), options.particles.clone())
    }

    pub fn for_video(options: &VideoOptions) -> Self {
        Self {
            grid: options.grid(),
            hologram_params: options.hologram.clone(),
            ..Self::new(Placement::VIDEO, ParticleParams::default())
        }
    }

    #[cfg(test)]
    fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// World position the camera orbits around.
    pub fn focus(&self) -> Vec3 {
        self.placement.translation
    }

    pub fn particles(&self) -> &ParticleParams {
        &self.particles
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn point_cloud(&self) -> Option<&PointCloud> {
        self.point_cloud.as_ref()
    }

    pub fn hologram(&self) -> Option<&Hologram> {
        self.hologram.as_ref()
    }

    pub fn particle_uniforms(&self) -> Option<ParticleUniforms> {
        self.point_cloud
            .as_ref()
            .map(|cloud| cloud.animation.uniforms(&self.particles))
    }

    /// Replaces whatever is displayed with a freshly loaded asset.
    pub fn install(&mut self, asset: Asset, now: f32) {
        match asset {
            Asset::Geometry(geometry) => self.install_geometry(geometry, now),
            Asset::Frames(frames) => self.install_frames(frames, now),
        }
    }

    pub fn install_geometry(&mut self, geometry: SourceGeometry, now: f32) {
        self.hologram = None;
        self.source = Some(geometry);
        self.resample(now);
    }

    pub fn install_frames(&mut self, frames: FrameSequence, now: f32) {
        self.source = None;
        self.point_cloud = None;
        self.hologram = Some(Hologram::new(frames, self.grid, self.hologram_params.clone()));
        self.hologram_started_at = now;
        self.generation += 1;
        info!(
            "Showing video hologram with {}x{} points",
            self.grid.x, self.grid.y
        );
    }

    /// Rebuilds the point set from the loaded geometry and restarts its
    /// appearance. Does nothing before a model has been loaded.
    pub fn resample(&mut self, now: f32) {
        let Some(source) = &self.source else {
            return;
        };

        let point_set = PointSet::build(
            source,
            self.particles.subsample_rate,
            self.particles.evaporation_amount,
            &mut self.rng,
        );
        info!(
            "Created point cloud with {} of {} points, {} evaporating (subsample rate {})",
            point_set.len(),
            source.len(),
            point_set.evaporating_count(),
            self.particles.subsample_rate
        );

        let mut animation = AnimationState::new(self.evaporation_enabled);
        animation.trigger_appearance(now, self.particles.appearance_delay);

        // The previous cloud is dropped here.
        self.point_cloud = Some(PointCloud {
            point_set,
            animation,
        });
        self.generation += 1;
    }

    /// Moves the subsample rate by `delta` and resamples.
    pub fn adjust_subsample_rate(&mut self, delta: f64, now: f32) {
        let rate = (self.particles.subsample_rate + delta).clamp(MIN_SUBSAMPLE_RATE, 1.0);
        let rate = (rate * 100.0).round() / 100.0;
        if rate == self.particles.subsample_rate {
            return;
        }
        info!("Subsample rate set to {}", rate);
        self.particles.subsample_rate = rate;
        self.resample(now);
    }

    pub fn toggle_evaporation(&mut self) {
        self.evaporation_enabled = !self.evaporation_enabled;
        info!(
            "Evaporation {}",
            if self.evaporation_enabled { "enabled" } else { "disabled" }
        );
        if let Some(cloud) = &mut self.point_cloud {
            cloud.animation.set_evaporation_enabled(self.evaporation_enabled);
        }
    }

    pub fn retrigger_appearance(&mut self, now: f32) {
        if let Some(cloud) = &mut self.point_cloud {
            cloud
                .animation
                .trigger_appearance(now, self.particles.appearance_delay);
        }
    }

    pub(crate) fn advance(&mut self, now: f32) {
        if let Some(cloud) = &mut self.point_cloud {
            cloud.animation.advance(now, self.particles.appearance_duration);
        }
        if let Some(hologram) = &mut self.hologram {
            hologram.advance(now - self.hologram_started_at);
        }
    }

    /// CPU rendition of everything currently displayed, in model space.
    pub fn evaluate(&self, view: Mat4) -> Vec<RenderedPoint> {
        let model_view = view * self.placement.matrix();
        let mut points = Vec::new();
        if let (Some(cloud), Some(uniforms)) = (&self.point_cloud, self.particle_uniforms()) {
            points.extend(cloud.point_set.evaluate(&uniforms, model_view));
        }
        if let Some(hologram) = &self.hologram {
            points.extend(hologram.evaluate(model_view));
        }
        points
    }
}
