//! Looping rise-and-fade of the evaporating subset of points.

use crate::fract;

/// Factors at or below this never evaporate.
pub const MIN_FACTOR: f32 = 0.01;
/// Size coefficient of evaporating points.
pub const SIZE: f32 = 1.5;

#[derive(Clone, Copy)]
pub struct Evaporation {
    /// Sawtooth phase in `[0, 1)`.
    pub phase: f32,
    pub rise: f32,
    pub opacity: f32,
}

pub fn is_evaporating(enabled: bool, factor: f32) -> bool {
    enabled && factor > MIN_FACTOR
}

/// Phase of a point's cycle. The period is `1 / (factor * speed)` seconds.
pub fn cycle_phase(time: f32, factor: f32, speed: f32) -> f32 {
    fract(time * factor * speed)
}

pub fn evaporate(
    time: f32,
    factor: f32,
    speed: f32,
    max_height: f32,
    global_opacity: f32,
) -> Evaporation {
    let phase = cycle_phase(time, factor, speed);
    Evaporation {
        phase,
        rise: phase * max_height,
        opacity: global_opacity * (1.0 - phase),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_flagged_points_evaporate() {
        assert!(is_evaporating(true, 0.2));
        assert!(!is_evaporating(true, 0.0));
        assert!(!is_evaporating(true, 0.005));
        assert!(!is_evaporating(false, 1.0));
    }

    #[test]
    fn opacity_is_periodic_and_fades_linearly() {
        let (factor, speed): (f32, f32) = (0.5, 0.04);
        let period = 1.0 / (factor * speed);
        assert!((period - 50.0).abs() < 1e-3);

        let start = evaporate(0.0, factor, speed, 1.0, 1.0);
        assert_eq!(start.opacity, 1.0);
        assert_eq!(start.rise, 0.0);

        let quarter = evaporate(period * 0.25, factor, speed, 2.0, 1.0);
        assert!((quarter.opacity - 0.75).abs() < 1e-4);
        assert!((quarter.rise - 0.5).abs() < 1e-4);

        for t in [3.0, 17.5, 31.0, 49.0] {
            let now = evaporate(t, factor, speed, 1.0, 0.9);
            let later = evaporate(t + period, factor, speed, 1.0, 0.9);
            assert!((now.opacity - later.opacity).abs() < 1e-3, "t = {t}");
            assert!((now.opacity - 0.9 * (1.0 - t / period)).abs() < 1e-3);
        }
    }

    #[test]
    fn cycle_snaps_back_after_each_period() {
        let (factor, speed) = (1.0, 0.25);
        let before = cycle_phase(3.99, factor, speed);
        let after = cycle_phase(4.01, factor, speed);
        assert!(before > 0.99);
        assert!(after < 0.01);
    }
}
