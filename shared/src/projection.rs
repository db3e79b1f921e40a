//! Pinhole back-projection of depth samples for the video hologram.

use glam::{Mat4, UVec2, Vec2, Vec3, Vec4};

use crate::{mix, smoothstep, HologramUniforms};

/// Grid rows above this are never drawn (the frame's bottom seam).
pub const GRID_EDGE_CUTOFF: f32 = 0.994;
/// Fragments with less color alpha than this are discarded.
pub const MIN_ALPHA: f32 = 0.1;

/// Normalized coordinate of grid point `index` in a `columns x rows` grid.
pub fn grid_coord(index: u32, grid: UVec2) -> Vec2 {
    let x = index % grid.x;
    let y = index / grid.x;
    let span = (grid.max(UVec2::splat(2)) - UVec2::ONE).as_vec2();
    Vec2::new(x as f32, y as f32) / span
}

/// Back-projects a depth sample.
///
/// Both axes are mirrored to match the orientation of the capture source.
/// `z` lies between `min_z` and `max_z`, which are negative since the camera
/// looks down -Z.
pub fn project(grid: Vec2, depth: f32, uniforms: &HologramUniforms) -> Vec3 {
    let depth = if uniforms.reverse_depth != 0 {
        1.0 - depth
    } else {
        depth
    };
    let resolution = uniforms.resolution;
    let pixel = (Vec2::ONE - grid) * resolution - resolution / 2.0;
    let z = mix(uniforms.min_z, uniforms.max_z, depth);
    let xy = pixel * z / uniforms.focal_length;
    Vec3::new(xy.x, xy.y, z)
}

/// Screen size of a hologram point, never below one pixel.
pub fn point_size(size: f32, model_view: Mat4, view_z: f32) -> f32 {
    let object_scale = model_view.x_axis.truncate().length();
    (size * object_scale / (-view_z).max(1.0)).max(1.0)
}

/// Fades the nearest depths out over `[0, far_fade]`.
pub fn far_fade(depth: f32, far_fade: f32) -> f32 {
    if far_fade > 0.001 {
        smoothstep(0.0, far_fade, depth)
    } else {
        1.0
    }
}

pub fn discard_fragment(grid: Vec2, color: Vec4) -> bool {
    grid.y > GRID_EDGE_CUTOFF || color.w < MIN_ALPHA
}

pub fn fragment_color(color: Vec4, depth: f32, uniforms: &HologramUniforms) -> Vec4 {
    color.truncate().extend(color.w * far_fade(depth, uniforms.far_fade))
}

/// Round point sprites: true outside the inscribed circle.
pub fn outside_sprite(point_coord: Vec2) -> bool {
    (point_coord - Vec2::splat(0.5)).length() > 0.5
}
