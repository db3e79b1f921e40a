use std::time::Instant;

use crate::scene::Scene;

/// The per-frame clock.
///
/// Only the frame driver advances animation time, once per redraw.
pub struct FrameDriver {
    start_time: Instant,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.start_time.elapsed().as_secs_f32()
    }

    pub fn tick(&self, scene: &mut Scene) -> f32 {
        let now = self.elapsed();
        scene.advance(now);
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ContentType, ModelOptions, ParticleParams};
    use crate::point_cloud::SourceGeometry;
    use glam::Vec3;

    #[test]
    fn ticking_moves_the_scene_clock() {
        let mut scene = Scene::for_model(&ModelOptions {
            file: "model.glb".into(),
            content_type: ContentType::Object,
            particles: ParticleParams::default(),
        });
        let geometry = SourceGeometry::new(vec![Vec3::ZERO; 4], None).unwrap();
        scene.install_geometry(geometry, 0.0);

        let driver = FrameDriver::new();
        let first = driver.tick(&mut scene);
        let second = driver.tick(&mut scene);
        assert!(second >= first);
        assert_eq!(scene.particle_uniforms().unwrap().time, second);
    }
}
