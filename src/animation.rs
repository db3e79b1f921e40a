//! Per point cloud animation state, advanced once per frame.

use log::info;
use shared::ParticleUniforms;

use crate::cli::ParticleParams;

/// Lifecycle of the one-shot appearance animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Appearance {
    /// Nothing scheduled, points are shown settled.
    Idle,
    /// Waiting for the entry delay to run out.
    Pending { starts_at: f32 },
    Running { started_at: f32 },
    Complete,
}

#[derive(Debug, Clone)]
pub struct AnimationState {
    appearance: Appearance,
    appearance_progress: f32,
    global_opacity: f32,
    evaporation_enabled: bool,
    time: f32,
}

impl AnimationState {
    pub fn new(evaporation_enabled: bool) -> Self {
        Self {
            appearance: Appearance::Idle,
            appearance_progress: 1.0,
            global_opacity: 1.0,
            evaporation_enabled,
            time: 0.0,
        }
    }

    pub fn appearance(&self) -> Appearance {
        self.appearance
    }

    pub fn appearance_progress(&self) -> f32 {
        self.appearance_progress
    }

    pub fn global_opacity(&self) -> f32 {
        self.global_opacity
    }

    #[cfg(test)]
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn set_evaporation_enabled(&mut self, enabled: bool) {
        self.evaporation_enabled = enabled;
    }

    /// Restarts the appearance animation `delay` seconds after `now`.
    ///
    /// With a delay the cloud is hidden until the animation actually starts.
    pub fn trigger_appearance(&mut self, now: f32, delay: f32) {
        self.appearance_progress = 0.0;
        info!("Appearance animation scheduled with {}s delay", delay);

        if delay > 0.0 {
            self.global_opacity = 0.0;
            self.appearance = Appearance::Pending {
                starts_at: now + delay,
            };
        } else {
            self.start_appearance(now);
        }
    }

    fn start_appearance(&mut self, at: f32) {
        self.appearance = Appearance::Running { started_at: at };
        self.global_opacity = 1.0;
        info!("Appearance animation started");
    }

    /// Moves the clock to `now` and the appearance along with it.
    pub(crate) fn advance(&mut self, now: f32, duration: f32) {
        self.time = now;

        if let Appearance::Pending { starts_at } = self.appearance {
            if now >= starts_at {
                self.start_appearance(starts_at);
            }
        }

        if let Appearance::Running { started_at } = self.appearance {
            let progress = if duration > 0.0 {
                ((now - started_at) / duration).clamp(0.0, 1.0)
            } else {
                1.0
            };
            self.appearance_progress = self.appearance_progress.max(progress);

            if self.appearance_progress >= 1.0 {
                self.appearance = Appearance::Complete;
                info!("Appearance animation completed");
            }
        }
    }

    pub fn uniforms(&self, params: &ParticleParams) -> ParticleUniforms {
        ParticleUniforms {
            point_size: params.point_size,
            time: self.time,
            evaporation_speed: params.evaporation_speed,
            evaporation_enabled: self.evaporation_enabled as u32,
            max_height: params.max_height,
            appearance_progress: self.appearance_progress,
            appearance_scale: params.appearance_scale,
            global_opacity: self.global_opacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_settled_and_visible() {
        let state = AnimationState::new(true);
        assert_eq!(state.appearance(), Appearance::Idle);
        assert_eq!(state.appearance_progress(), 1.0);
        assert_eq!(state.global_opacity(), 1.0);
    }

    #[test]
    fn delayed_appearance_hides_the_cloud_until_it_starts() {
        let mut state = AnimationState::new(true);
        state.trigger_appearance(10.0, 2.0);
        assert_eq!(state.appearance(), Appearance::Pending { starts_at: 12.0 });
        assert_eq!(state.appearance_progress(), 0.0);
        assert_eq!(state.global_opacity(), 0.0);

        state.advance(11.0, 3.0);
        assert_eq!(state.global_opacity(), 0.0);
        assert_eq!(state.appearance_progress(), 0.0);

        state.advance(12.0, 3.0);
        assert_eq!(state.appearance(), Appearance::Running { started_at: 12.0 });
        assert_eq!(state.global_opacity(), 1.0);
        assert_eq!(state.appearance_progress(), 0.0);

        state.advance(13.5, 3.0);
        assert!((state.appearance_progress() - 0.5).abs() < 1e-6);

        state.advance(15.0, 3.0);
        assert_eq!(state.appearance(), Appearance::Complete);
        assert_eq!(state.appearance_progress(), 1.0);
    }

    #[test]
    fn undelayed_appearance_starts_right_away() {
        let mut state = AnimationState::new(true);
        state.trigger_appearance(4.0, 0.0);
        assert_eq!(state.appearance(), Appearance::Running { started_at: 4.0 });
        assert_eq!(state.global_opacity(), 1.0);
    }

    #[test]
    fn progress_is_clamped_and_never_goes_back() {
        let mut state = AnimationState::new(false);
        state.trigger_appearance(0.0, 0.0);
        state.advance(2.0, 4.0);
        assert_eq!(state.appearance_progress(), 0.5);
        state.advance(1.0, 4.0);
        assert_eq!(state.appearance_progress(), 0.5);
        state.advance(100.0, 4.0);
        assert_eq!(state.appearance_progress(), 1.0);

        // Completed animations only move the clock.
        state.advance(200.0, 4.0);
        assert_eq!(state.appearance(), Appearance::Complete);
        assert_eq!(state.appearance_progress(), 1.0);
        assert_eq!(state.time(), 200.0);
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let mut state = AnimationState::new(true);
        state.trigger_appearance(1.0, 0.0);
        state.advance(1.0, 0.0);
        assert_eq!(state.appearance(), Appearance::Complete);
    }

    #[test]
    fn retrigger_resets_progress() {
        let mut state = AnimationState::new(true);
        state.trigger_appearance(0.0, 0.0);
        state.advance(10.0, 3.0);
        assert_eq!(state.appearance_progress(), 1.0);

        state.trigger_appearance(10.0, 1.0);
        assert_eq!(state.appearance_progress(), 0.0);
        assert_eq!(state.global_opacity(), 0.0);
    }

    #[test]
    fn uniforms_carry_state_and_params() {
        let params = ParticleParams::default();
        let mut state = AnimationState::new(true);
        state.trigger_appearance(0.0, 0.0);
        state.advance(1.5, params.appearance_duration);

        let uniforms = state.uniforms(&params);
        assert_eq!(uniforms.time, 1.5);
        assert_eq!(uniforms.appearance_progress, 0.5);
        assert_eq!(uniforms.evaporation_enabled, 1);
        assert_eq!(uniforms.point_size, params.point_size);

        state.set_evaporation_enabled(false);
        assert_eq!(state.uniforms(&params).evaporation_enabled, 0);
    }
}
