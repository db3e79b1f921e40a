//! Video holograms: hybrid depth/color frames reprojected into points.

use glam::{Mat4, UVec2, Vec2, Vec4};
use shared::depth::{sample_color, sample_depth, TexelSource};
use shared::projection::{discard_fragment, fragment_color, grid_coord, point_size, project};
use shared::HologramUniforms;

use crate::cli::HologramParams;
use crate::point_cloud::RenderedPoint;

/// One RGBA8 frame, color plane on top, depth plane below.
///
/// Rows are stored bottom up, so row 0 is the bottom of the image.
#[derive(Debug, Clone)]
pub struct HybridFrame {
    size: UVec2,
    pixels: Vec<u8>,
}

impl HybridFrame {
    pub fn new(mut image: image::RgbaImage) -> Self {
        image::imageops::flip_vertical_in_place(&mut image);
        let size = UVec2::new(image.width(), image.height());
        Self {
            size,
            pixels: image.into_raw(),
        }
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl TexelSource for HybridFrame {
    fn texel(&self, coord: UVec2) -> Vec4 {
        let offset = ((coord.y * self.size.x + coord.x) * 4) as usize;
        let [r, g, b, a] = [0, 1, 2, 3].map(|c| self.pixels[offset + c] as f32 / 255.0);
        Vec4::new(r, g, b, a)
    }
}

/// Equally sized frames played back in a loop.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    frames: Vec<HybridFrame>,
    fps: f32,
}

impl FrameSequence {
    /// `frames` must be non-empty and share one size; the loader checks both.
    pub(crate) fn new(frames: Vec<HybridFrame>, fps: f32) -> Self {
        Self { frames, fps }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn frame_size(&self) -> UVec2 {
        self.frames[0].size()
    }

    pub fn frame(&self, index: usize) -> &HybridFrame {
        &self.frames[index]
    }

    pub fn index_at(&self, time: f32) -> usize {
        (time.max(0.0) * self.fps) as usize % self.frames.len()
    }
}

/// The active video hologram: frames, point grid and camera model.
pub struct Hologram {
    frames: FrameSequence,
    grid: UVec2,
    params: HologramParams,
    current: usize,
}

impl Hologram {
    pub fn new(frames: FrameSequence, grid: UVec2, params: HologramParams) -> Self {
        Self {
            frames,
            grid,
            params,
            current: 0,
        }
    }

    pub fn point_count(&self) -> u32 {
        self.grid.x * self.grid.y
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_frame(&self) -> &HybridFrame {
        self.frames.frame(self.current)
    }

    pub(crate) fn advance(&mut self, now: f32) {
        self.current = self.frames.index_at(now);
    }

    pub fn uniforms(&self) -> HologramUniforms {
        HologramUniforms {
            resolution: self.grid.as_vec2(),
            focal_length: Vec2::new(self.params.focal_length_x, self.params.focal_length_y),
            frame_size: self.frames.frame_size(),
            min_z: self.params.min_z,
            max_z: self.params.max_z,
            point_size: self.params.particle_size,
            reverse_depth: self.params.reverse_depth as u32,
            far_fade: self.params.far_fade,
            _padding: 0.0,
        }
    }

    /// Software rendition of the hologram shaders, skipping discarded points.
    pub fn evaluate(&self, model_view: Mat4) -> Vec<RenderedPoint> {
        let frame = self.current_frame();
        let uniforms = self.uniforms();
        (0..self.point_count())
            .filter_map(|index| {
                let grid = grid_coord(index, self.grid);
                let depth = sample_depth(frame, uniforms.frame_size, grid);
                let color = sample_color(frame, uniforms.frame_size, grid);
                if discard_fragment(grid, color) {
                    return None;
                }
                let position = project(grid, depth, &uniforms);
                let view_z = model_view.transform_point3(position).z;
                Some(RenderedPoint {
                    position,
                    color: fragment_color(color, depth, &uniforms),
                    size: point_size(uniforms.point_size, model_view, view_z),
                })
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cli::Placement;
    use image::{Rgba, RgbaImage};

    /// A frame of uniform depth and color.
    pub(crate) fn flat_frame(width: u32, height: u32, depth: u8, color: [u8; 4]) -> HybridFrame {
        HybridFrame::new(RgbaImage::from_fn(width, height, |_, y| {
            if y >= height - height / 2 {
                Rgba([depth, depth, depth, 255])
            } else {
                Rgba(color)
            }
        }))
    }

    #[test]
    fn texels_are_normalized() {
        let frame = flat_frame(2, 2, 255, [0, 51, 102, 255]);
        assert_eq!(frame.texel(UVec2::new(1, 0)), Vec4::ONE);
        assert_eq!(frame.texel(UVec2::new(0, 1)), Vec4::new(0.0, 0.2, 0.4, 1.0));
    }

    #[test]
    fn playback_loops() {
        let frames = (0..3).map(|d| flat_frame(2, 2, d, [0; 4])).collect();
        let sequence = FrameSequence::new(frames, 10.0);
        assert_eq!(sequence.index_at(0.0), 0);
        assert_eq!(sequence.index_at(0.15), 1);
        assert_eq!(sequence.index_at(0.25), 2);
        assert_eq!(sequence.index_at(0.35), 0);
    }

    #[test]
    fn advancing_selects_the_frame_for_the_time() {
        let frames = (0..2).map(|d| flat_frame(2, 2, d, [0; 4])).collect();
        let mut hologram = Hologram::new(
            FrameSequence::new(frames, 2.0),
            UVec2::new(2, 2),
            HologramParams::default(),
        );
        hologram.advance(0.6);
        assert_eq!(hologram.current_index(), 1);
        hologram.advance(1.1);
        assert_eq!(hologram.current_index(), 0);
    }

    #[test]
    fn flat_depth_reprojects_onto_a_plane() {
        let frame = flat_frame(8, 8, 255, [255, 0, 0, 255]);
        let hologram = Hologram::new(
            FrameSequence::new(vec![frame], 30.0),
            UVec2::new(5, 5),
            HologramParams::default(),
        );
        let model_view = Placement::VIDEO.matrix();
        let points = hologram.evaluate(model_view);

        // The bottom row sits past the seam cutoff.
        assert_eq!(points.len(), 20);
        for point in &points {
            assert_eq!(point.position.z, -120.0);
            assert_eq!(point.color, Vec4::new(1.0, 0.0, 0.0, 1.0));
            assert!(point.size >= 1.0);
        }
        let center = points[12].position;
        assert!(center.x.abs() < 1e-3 && center.y.abs() < 1e-3);
    }

    #[test]
    fn image_top_ends_up_on_top() {
        // Color rows 0-1 red, 2-3 blue, depth in rows 4-7.
        let image = RgbaImage::from_fn(2, 8, |_, y| match y {
            0..=1 => Rgba([255, 0, 0, 255]),
            2..=3 => Rgba([0, 0, 255, 255]),
            _ => Rgba([255, 255, 255, 255]),
        });
        let hologram = Hologram::new(
            FrameSequence::new(vec![HybridFrame::new(image)], 30.0),
            UVec2::new(2, 4),
            HologramParams::default(),
        );
        let points = hologram.evaluate(Placement::VIDEO.matrix());

        let red: Vec<_> = points.iter().filter(|p| p.color.x == 1.0).collect();
        let blue: Vec<_> = points.iter().filter(|p| p.color.z == 1.0).collect();
        assert!(!red.is_empty() && !blue.is_empty());
        assert!(red.iter().all(|p| p.position.y > 0.0));
        assert!(blue.iter().all(|p| p.position.y < 0.0));
    }

    #[test]
    fn transparent_pixels_are_dropped() {
        let frame = flat_frame(4, 4, 128, [255, 255, 255, 0]);
        let hologram = Hologram::new(
            FrameSequence::new(vec![frame], 30.0),
            UVec2::new(3, 3),
            HologramParams::default(),
        );
        assert!(hologram.evaluate(Mat4::IDENTITY).is_empty());
    }
}
