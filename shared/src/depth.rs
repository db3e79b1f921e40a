//! Sampling of hybrid depth/color frames.
//!
//! A hybrid frame stacks two planes of equal width. Rows are addressed bottom
//! up as in GL, `v = 0` being the image's bottom row: the depth plane is the
//! image's bottom half (`v` in `[0, 0.5]`), the color plane its top half
//! (`v` in `[0.5, 1]`). Each plane is addressed with its own `[0, 1]^2`
//! coordinates so that filtering never crosses the seam.

use glam::{IVec2, UVec2, Vec2, Vec4};

use crate::mix;

/// Anything texels can be fetched from by integer coordinate.
pub trait TexelSource {
    fn texel(&self, coord: UVec2) -> Vec4;
}

#[cfg(target_arch = "spirv")]
impl TexelSource for spirv_std::image::Image2d {
    fn texel(&self, coord: UVec2) -> Vec4 {
        self.fetch(coord.as_ivec2())
    }
}

/// A rectangular band of rows inside a frame.
#[derive(Clone, Copy)]
pub struct Plane {
    pub first_row: u32,
    pub size: UVec2,
}

impl Plane {
    pub fn depth(frame_size: UVec2) -> Self {
        Self {
            first_row: 0,
            size: UVec2::new(frame_size.x, frame_size.y / 2),
        }
    }

    pub fn color(frame_size: UVec2) -> Self {
        let rows = frame_size.y / 2;
        Self {
            first_row: rows,
            size: UVec2::new(frame_size.x, frame_size.y - rows),
        }
    }

    fn fetch<S: TexelSource + ?Sized>(&self, source: &S, texel: IVec2) -> Vec4 {
        let max = self.size.as_ivec2() - IVec2::ONE;
        let texel = texel.clamp(IVec2::ZERO, max.max(IVec2::ZERO)).as_uvec2();
        source.texel(UVec2::new(texel.x, texel.y + self.first_row))
    }
}

/// Bilinear filtering of the red channel between the four nearest texel
/// centers. Out of range coordinates are clamped to the plane's edge.
pub fn sample_bilinear<S: TexelSource + ?Sized>(source: &S, plane: Plane, uv: Vec2) -> f32 {
    let uv = uv.clamp(Vec2::ZERO, Vec2::ONE);
    let texel = uv * plane.size.as_vec2() - Vec2::splat(0.5);
    let base = texel.floor();
    let weight = texel - base;
    let base = base.as_ivec2();

    let d00 = plane.fetch(source, base).x;
    let d10 = plane.fetch(source, base + IVec2::new(1, 0)).x;
    let d01 = plane.fetch(source, base + IVec2::new(0, 1)).x;
    let d11 = plane.fetch(source, base + IVec2::new(1, 1)).x;

    let top = mix(d00, d10, weight.x);
    let bottom = mix(d01, d11, weight.x);
    mix(top, bottom, weight.y).clamp(0.0, 1.0)
}

/// Unfiltered read of the texel covering `uv`.
pub fn sample_nearest<S: TexelSource + ?Sized>(source: &S, plane: Plane, uv: Vec2) -> Vec4 {
    let uv = uv.clamp(Vec2::ZERO, Vec2::ONE);
    let texel = (uv * plane.size.as_vec2()).floor().as_ivec2();
    plane.fetch(source, texel)
}

/// Normalized depth under grid coordinate `grid`.
pub fn sample_depth<S: TexelSource + ?Sized>(source: &S, frame_size: UVec2, grid: Vec2) -> f32 {
    sample_bilinear(source, Plane::depth(frame_size), grid)
}

/// RGBA color under grid coordinate `grid`.
pub fn sample_color<S: TexelSource + ?Sized>(source: &S, frame_size: UVec2, grid: Vec2) -> Vec4 {
    sample_nearest(source, Plane::color(frame_size), grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Grid {
        width: u32,
        values: Vec<f32>,
    }

    impl TexelSource for Grid {
        fn texel(&self, coord: UVec2) -> Vec4 {
            let value = self.values[(coord.y * self.width + coord.x) as usize];
            Vec4::new(value, value, value, 1.0)
        }
    }

    fn grid(width: u32, values: &[f32]) -> (Grid, Plane) {
        let rows = values.len() as u32 / width;
        let plane = Plane {
            first_row: 0,
            size: UVec2::new(width, rows),
        };
        (
            Grid {
                width,
                values: values.to_vec(),
            },
            plane,
        )
    }

    #[test]
    fn texel_centers_return_raw_values() {
        let (source, plane) = grid(3, &[0.1, 0.5, 0.9, 0.2, 0.4, 0.6]);
        for y in 0..2u32 {
            for x in 0..3u32 {
                let uv = Vec2::new((x as f32 + 0.5) / 3.0, (y as f32 + 0.5) / 2.0);
                let expected = source.values[(y * 3 + x) as usize];
                let sampled = sample_bilinear(&source, plane, uv);
                assert!((sampled - expected).abs() < 1e-5, "{uv}: {sampled} != {expected}");
            }
        }
    }

    #[test]
    fn midpoint_between_texels_is_their_mean() {
        let (source, plane) = grid(2, &[0.2, 0.8]);
        let sampled = sample_bilinear(&source, plane, Vec2::new(0.5, 0.5));
        assert!((sampled - 0.5).abs() < 1e-6);

        let (source, plane) = grid(1, &[0.3, 0.7]);
        let sampled = sample_bilinear(&source, plane, Vec2::new(0.5, 0.5));
        assert!((sampled - 0.5).abs() < 1e-6);
    }

    #[test]
    fn interpolates_along_both_axes() {
        let (source, plane) = grid(2, &[0.0, 1.0, 1.0, 0.0]);
        // A quarter of the way from texel (0,0) towards (1,1).
        let uv = Vec2::new(0.375, 0.375);
        let expected = mix(mix(0.0, 1.0, 0.25), mix(1.0, 0.0, 0.25), 0.25);
        assert!((sample_bilinear(&source, plane, uv) - expected).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_coordinates_clamp_to_edges() {
        let (source, plane) = grid(2, &[0.25, 0.75]);
        assert!((sample_bilinear(&source, plane, Vec2::new(-3.0, 0.5)) - 0.25).abs() < 1e-6);
        assert!((sample_bilinear(&source, plane, Vec2::new(7.0, 2.0)) - 0.75).abs() < 1e-6);
        assert!((sample_bilinear(&source, plane, Vec2::new(0.0, 0.5)) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn result_is_clamped_to_unit_range() {
        let (source, plane) = grid(2, &[1.5, 2.0]);
        assert_eq!(sample_bilinear(&source, plane, Vec2::new(0.5, 0.5)), 1.0);
    }

    #[test]
    fn depth_and_color_planes_do_not_bleed_into_each_other() {
        // 2x4 frame: depth rows hold 0.0 / 1.0, color rows hold 0.5.
        let (source, _) = grid(2, &[0.0, 0.0, 1.0, 1.0, 0.5, 0.5, 0.5, 0.5]);
        let frame_size = UVec2::new(2, 4);

        assert!(sample_depth(&source, frame_size, Vec2::new(0.5, 1.0)) > 0.99);
        assert!(sample_depth(&source, frame_size, Vec2::new(0.5, 0.0)) < 0.01);
        assert_eq!(sample_color(&source, frame_size, Vec2::new(0.0, 0.0)).x, 0.5);
        assert_eq!(sample_color(&source, frame_size, Vec2::new(1.0, 1.0)).x, 0.5);
    }

    #[test]
    fn nearest_picks_covering_texel() {
        let (source, plane) = grid(4, &[0.0, 0.25, 0.5, 0.75]);
        assert_eq!(sample_nearest(&source, plane, Vec2::new(0.3, 0.0)).x, 0.25);
        assert_eq!(sample_nearest(&source, plane, Vec2::new(1.0, 0.0)).x, 0.75);
    }
}
