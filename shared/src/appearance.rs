//! Per-point reveal of the appearance animation.
//!
//! Points fly in from a scattered start offset towards their target position.
//! Lower points and points with a small `random_delay` go first; the easing
//! curve, the flight path and the size overshoot are all picked per point from
//! hashes of `random_delay`.

use glam::Vec3;
use num_traits::Float;

use crate::{fract, mix};

/// Points with an ease gate below this use cubic easing, the rest back easing.
pub const CUBIC_EASE_SHARE: f32 = 0.6;
/// Points with an ease gate above this overshoot in size.
pub const SIZE_OVERSHOOT_GATE: f32 = 0.7;
/// Overshoot of [`ease_out_back`].
pub const BACK_OVERSHOOT: f32 = 1.70158;
/// Size coefficient a point starts its flight with.
pub const START_SIZE: f32 = 0.3;

pub fn hash(n: f32) -> f32 {
    fract(n.sin() * 43758.5453123)
}

pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powf(3.0)
}

pub fn ease_out_back(t: f32) -> f32 {
    let c1 = BACK_OVERSHOOT;
    let c3 = c1 + 1.0;
    1.0 + c3 * (t - 1.0).powf(3.0) + c1 * (t - 1.0).powf(2.0)
}

/// The three per-point random numbers derived from `random_delay`.
#[derive(Clone, Copy)]
pub struct Seeds {
    /// In `[0.7, 1.3)`.
    pub speed: f32,
    pub path: f32,
    pub ease: f32,
}

impl Seeds {
    pub fn new(random_delay: f32) -> Self {
        Self {
            speed: hash(random_delay * 123.456) * 0.6 + 0.7,
            path: hash(random_delay * 789.123),
            ease: hash(random_delay * 345.678),
        }
    }
}

/// Where a point is and how it looks at some point of the reveal.
#[derive(Clone, Copy)]
pub struct Reveal {
    pub position: Vec3,
    pub opacity: f32,
    pub size: f32,
    /// Eased per-point progress in `[0, 1]` (back easing may overshoot).
    pub progress: f32,
}

/// Eased reveal progress of a point at global `appearance_progress`.
pub fn point_progress(target: Vec3, random_delay: f32, appearance_progress: f32) -> f32 {
    let seeds = Seeds::new(random_delay);
    let height_factor = height_factor(target);
    let delay_factor = height_factor * 0.5 + random_delay * 0.5;

    let threshold = appearance_progress * (1.5 + seeds.speed * 0.5);
    let progress = ((threshold - delay_factor) / (0.8 + seeds.speed * 0.3)).clamp(0.0, 1.0);

    if progress > 0.01 && progress < 0.99 {
        if seeds.ease < CUBIC_EASE_SHARE {
            ease_out_cubic(progress)
        } else {
            ease_out_back(progress)
        }
    } else {
        progress
    }
}

fn height_factor(target: Vec3) -> f32 {
    ((target.y + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Scattered offset a point starts from, shrinking its spiral as it lands.
pub fn start_offset(target: Vec3, random_delay: f32, progress: f32, scale: f32) -> Vec3 {
    let path = Seeds::new(random_delay).path;
    let height_factor = height_factor(target);

    let angle = path * 6.28;
    let spiral = 0.15 * path * (1.0 - progress);

    let x = (path - 0.5) * 0.4 + angle.cos() * spiral;
    let y = -0.5 - random_delay * 0.5;
    let z = scale * (0.8 + path * 0.4) + height_factor * (0.5 + path * 0.3) + angle.sin() * spiral;
    Vec3::new(x, y, z)
}

/// Evaluates the appearance animation for one point.
pub fn reveal(
    target: Vec3,
    random_delay: f32,
    appearance_progress: f32,
    appearance_scale: f32,
    global_opacity: f32,
) -> Reveal {
    if appearance_progress >= 1.0 {
        return Reveal {
            position: target,
            opacity: global_opacity,
            size: 1.0,
            progress: 1.0,
        };
    }

    let progress = point_progress(target, random_delay, appearance_progress);
    if progress <= 0.0 {
        return Reveal {
            position: target,
            opacity: 0.0,
            size: 1.0,
            progress,
        };
    }

    let seeds = Seeds::new(random_delay);
    let offset = start_offset(target, random_delay, progress, appearance_scale);
    let path_bias = progress.powf(0.7 + seeds.path * 0.6);
    let position = (target + offset).lerp(target, path_bias);

    let size = if seeds.ease > SIZE_OVERSHOOT_GATE {
        let size_progress = (progress * 1.2).min(1.0);
        let overshoot = 1.0 + 0.3 * (1.0 - (2.0 * size_progress - 1.8).abs());
        mix(START_SIZE, overshoot, size_progress)
    } else {
        mix(START_SIZE, 1.0, progress)
    };

    Reveal {
        position,
        opacity: global_opacity * progress,
        size,
        progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delays() -> impl Iterator<Item = f32> {
        (0..200).map(|i| i as f32 / 200.0)
    }

    fn targets() -> impl Iterator<Item = Vec3> {
        (0..9).map(|i| Vec3::new(0.1 * i as f32, -1.2 + 0.3 * i as f32, 0.5))
    }

    #[test]
    fn easing_curves_hit_their_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!(ease_out_back(0.0).abs() < 1e-6);
        assert_eq!(ease_out_back(1.0), 1.0);
        // Back easing overshoots before settling.
        assert!(ease_out_back(0.8) > 1.0);
    }

    #[test]
    fn hash_stays_in_unit_range() {
        for n in [-1000.0, -1.5, 0.0, 0.3, 123.456, 98765.0] {
            let h = hash(n);
            assert!((0.0..1.0).contains(&h), "hash({n}) = {h}");
        }
    }

    #[test]
    fn nothing_is_visible_at_zero_progress() {
        for target in targets() {
            for delay in delays() {
                let reveal = reveal(target, delay, 0.0, 1.0, 1.0);
                assert_eq!(reveal.opacity, 0.0);
                assert_eq!(reveal.progress, 0.0);
            }
        }
    }

    #[test]
    fn everything_lands_at_full_progress() {
        for target in targets() {
            for delay in delays() {
                let reveal = reveal(target, delay, 1.0, 1.0, 0.8);
                assert_eq!(reveal.progress, 1.0);
                assert_eq!(reveal.position, target);
                assert_eq!(reveal.opacity, 0.8);
                assert_eq!(reveal.size, 1.0);
            }
        }
    }

    #[test]
    fn lower_points_appear_first() {
        let delay = 0.5;
        let low = point_progress(Vec3::new(0.0, -1.0, 0.0), delay, 0.3);
        let high = point_progress(Vec3::new(0.0, 1.0, 0.0), delay, 0.3);
        assert!(low > high, "{low} <= {high}");
    }

    #[test]
    fn revealing_points_start_scattered() {
        let target = Vec3::new(0.2, -0.9, 0.1);
        let (delay, reveal) = delays()
            .map(|delay| (delay, reveal(target, delay, 0.2, 1.0, 1.0)))
            .find(|(_, r)| r.progress > 0.05 && r.progress < 0.5)
            .expect("some point is mid-flight");

        assert!(reveal.opacity > 0.0 && reveal.opacity < 1.0);
        assert!(reveal.position.distance(target) > 0.01, "delay {delay}");
        assert!(reveal.size >= START_SIZE && reveal.size < 1.3);
    }

    #[test]
    fn easing_split_uses_both_curves() {
        let cubic = delays()
            .filter(|&d| Seeds::new(d).ease < CUBIC_EASE_SHARE)
            .count();
        assert!(cubic > 80 && cubic < 160, "{cubic} of 200 use cubic easing");
    }
}
