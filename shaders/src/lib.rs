#![no_std]

use shared::depth::{sample_color, sample_depth};
use shared::particle::{animate, point_size};
use shared::projection::{
    discard_fragment, fragment_color, grid_coord, outside_sprite, project,
    point_size as hologram_point_size,
};
use shared::{CameraUniforms, HologramUniforms, ParticleUniforms, ParticleVertex};
use spirv_std::glam::{Vec2, Vec3, Vec4};
use spirv_std::image::Image2d;
use spirv_std::spirv;

#[spirv(vertex)]
pub fn particles_vs(
    #[spirv(uniform, descriptor_set = 0, binding = 0)] camera: &CameraUniforms,
    #[spirv(uniform, descriptor_set = 1, binding = 0)] uniforms: &ParticleUniforms,
    position: Vec3,
    color: Vec3,
    evaporation_factor: f32,
    random_delay: f32,
    #[spirv(position)] out_pos: &mut Vec4,
    #[spirv(point_size)] out_point_size: &mut f32,
    out_color: &mut Vec3,
    out_opacity: &mut f32,
) {
    let vertex = ParticleVertex {
        position,
        color,
        evaporation_factor,
        random_delay,
    };
    let particle = animate(&vertex, uniforms);

    let view_pos = camera.model_view * particle.position.extend(1.0);
    *out_pos = camera.projection * view_pos;
    *out_point_size = point_size(uniforms.point_size, particle.size, view_pos.z);
    *out_color = color;
    *out_opacity = particle.opacity;
}

#[spirv(fragment)]
pub fn particles_fs(
    #[spirv(point_coord)] point_coord: Vec2,
    color: Vec3,
    opacity: f32,
    output: &mut Vec4,
) {
    if outside_sprite(point_coord) {
        spirv_std::arch::kill();
    }
    *output = color.extend(opacity);
}

#[spirv(vertex)]
pub fn hologram_vs(
    #[spirv(uniform, descriptor_set = 0, binding = 0)] camera: &CameraUniforms,
    #[spirv(uniform, descriptor_set = 1, binding = 0)] uniforms: &HologramUniforms,
    #[spirv(descriptor_set = 1, binding = 1)] frame: &Image2d,
    #[spirv(vertex_index)] vertex_index: u32,
    #[spirv(position)] out_pos: &mut Vec4,
    #[spirv(point_size)] out_point_size: &mut f32,
    out_grid: &mut Vec2,
    out_depth: &mut f32,
) {
    let grid = grid_coord(vertex_index, uniforms.resolution.as_uvec2());
    let depth = sample_depth(frame, uniforms.frame_size, grid);
    let position = project(grid, depth, uniforms);

    let view_pos = camera.model_view * position.extend(1.0);
    *out_pos = camera.projection * view_pos;
    *out_point_size = hologram_point_size(uniforms.point_size, camera.model_view, view_pos.z);
    *out_grid = grid;
    *out_depth = depth;
}

#[spirv(fragment)]
pub fn hologram_fs(
    #[spirv(uniform, descriptor_set = 1, binding = 0)] uniforms: &HologramUniforms,
    #[spirv(descriptor_set = 1, binding = 1)] frame: &Image2d,
    #[spirv(point_coord)] point_coord: Vec2,
    grid: Vec2,
    depth: f32,
    output: &mut Vec4,
) {
    let color = sample_color(frame, uniforms.frame_size, grid);
    if outside_sprite(point_coord) || discard_fragment(grid, color) {
        spirv_std::arch::kill();
    }
    *output = fragment_color(color, depth, uniforms);
}
