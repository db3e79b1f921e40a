use std::f32::consts::PI;

use glam::{Mat4, Vec3};

const MIN_ZOOM: f32 = 0.5;

/// Orbit camera circling a target point.
pub struct Camera {
    pitch: f32,
    yaw: f32,
    zoom: f32,
    target: Vec3,
    up: Vec3,
    aspect: f32,
    fovy: f32,
    znear: f32,
    zfar: f32,
}

impl Camera {
    pub fn new(target: Vec3, aspect: f32) -> Self {
        Self {
            pitch: 0.0,
            yaw: 0.0,
            zoom: 8.0,
            target,
            up: Vec3::Y,
            aspect,
            fovy: 45.0,
            znear: 0.1,
            zfar: 100.0,
        }
    }

    pub fn eye(&self) -> Vec3 {
        self.target
            + self.zoom
                * Vec3::new(
                    self.yaw.cos() * self.pitch.sin(),
                    self.yaw.sin(),
                    self.yaw.cos() * self.pitch.cos(),
                )
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy.to_radians(), self.aspect, self.znear, self.zfar)
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Maps a cursor position to an orbit angle, the window center being
    /// the front view.
    pub fn orbit_to(&mut self, x: f32, y: f32, width: u32, height: u32) {
        let (width, height) = (width.max(1) as f32, height.max(1) as f32);
        self.yaw = (PI / height) * (y - height / 2.0);
        self.pitch = ((2.0 * PI) / width) * (x - width / 2.0);
    }

    pub fn zoom_by(&mut self, delta: f32) {
        self.zoom = (self.zoom - delta).max(MIN_ZOOM);
    }
}
