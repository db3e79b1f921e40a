use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use glam::{EulerRot, Mat4, Quat, UVec2, Vec3};

use crate::error::ConfigError;

/// Renders GLB models and hybrid depth videos as point-cloud holograms.
#[derive(Debug, Parser)]
pub struct AppOptions {
    /// Verbosity of the command line output.
    #[clap(long, default_value = "info")]
    pub log_level: log::LevelFilter,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows a GLB model as an animated particle hologram.
    Model(ModelOptions),

    /// Shows a sequence of hybrid depth/color frames as a video hologram.
    ///
    /// Every frame holds the color image in its top half and the depth map in
    /// its bottom half.
    Video(VideoOptions),
}

#[derive(Debug, Clone, Args)]
pub struct ModelOptions {
    /// GLB file to load.
    #[clap()]
    pub file: PathBuf,

    /// How the model was generated, decides where it is placed.
    #[clap(long, value_enum, default_value = "3d")]
    pub content_type: ContentType,

    #[clap(flatten)]
    pub particles: ParticleParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ContentType {
    /// A single object.
    #[value(name = "3d")]
    Object,

    /// A 360 degree environment.
    #[value(name = "360")]
    Panorama,
}

impl ContentType {
    pub fn placement(self) -> Placement {
        match self {
            ContentType::Object => Placement {
                translation: Vec3::new(0.0, 3.05, 2.0),
                rotation: Quat::from_rotation_y(std::f32::consts::PI),
                scale: 3.0,
            },
            ContentType::Panorama => Placement {
                translation: Vec3::new(0.0, 7.0, 2.0),
                rotation: Quat::from_euler(
                    EulerRot::XYZ,
                    std::f32::consts::FRAC_PI_2,
                    std::f32::consts::TAU,
                    std::f32::consts::FRAC_PI_2,
                ),
                scale: 3.0,
            },
        }
    }
}

/// Where a hologram sits in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Placement {
    pub const VIDEO: Placement = Placement {
        translation: Vec3::new(0.0, 1.4, 0.5),
        rotation: Quat::IDENTITY,
        scale: 0.009,
    };

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.translation)
    }
}

#[derive(Debug, Clone, Args)]
pub struct ParticleParams {
    /// Base size of a particle.
    #[clap(long, default_value = "0.02")]
    pub point_size: f32,

    /// Fraction of the model's points that are shown, in (0, 1].
    #[clap(long, default_value = "1.0")]
    pub subsample_rate: f64,

    /// Fraction of the shown points that evaporate, in [0, 1].
    #[clap(long, default_value = "0.01")]
    pub evaporation_amount: f64,

    /// Cycles per second of an evaporating point with factor 1.
    #[clap(long, default_value = "0.04")]
    pub evaporation_speed: f32,

    /// How high evaporating points rise before they reset.
    #[clap(long, default_value = "1.0")]
    pub max_height: f32,

    /// Start with evaporation switched off.
    #[clap(long)]
    pub no_evaporation: bool,

    /// Length of the appearance animation in seconds.
    #[clap(long, default_value = "3.0")]
    pub appearance_duration: f32,

    /// Scales how far points scatter before they fly in.
    #[clap(long, default_value = "1.0")]
    pub appearance_scale: f32,

    /// Seconds to wait before the appearance animation starts.
    #[clap(long, default_value = "2.0")]
    pub appearance_delay: f32,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            point_size: 0.02,
            subsample_rate: 1.0,
            evaporation_amount: 0.01,
            evaporation_speed: 0.04,
            max_height: 1.0,
            no_evaporation: false,
            appearance_duration: 3.0,
            appearance_scale: 1.0,
            appearance_delay: 2.0,
        }
    }
}

impl ParticleParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.subsample_rate > 0.0 && self.subsample_rate <= 1.0) {
            return Err(ConfigError::SubsampleRate(self.subsample_rate));
        }
        if !(0.0..=1.0).contains(&self.evaporation_amount) {
            return Err(ConfigError::EvaporationAmount(self.evaporation_amount));
        }
        if self.appearance_duration < 0.0 || self.appearance_delay < 0.0 {
            return Err(ConfigError::NegativeTiming);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Args)]
pub struct VideoOptions {
    /// Hybrid frames, played in the given order and looped.
    #[clap(required = true)]
    pub frames: Vec<PathBuf>,

    /// Playback rate of the frame sequence.
    #[clap(long, default_value = "30")]
    pub fps: f32,

    /// Number of point columns.
    #[clap(long, default_value = "2048")]
    pub grid_width: u32,

    /// Number of point rows.
    #[clap(long, default_value = "1024")]
    pub grid_height: u32,

    #[clap(flatten)]
    pub hologram: HologramParams,
}

impl VideoOptions {
    pub fn grid(&self) -> UVec2 {
        UVec2::new(self.grid_width, self.grid_height)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width < 2 || self.grid_height < 2 {
            return Err(ConfigError::Grid(self.grid_width, self.grid_height));
        }
        if !(self.fps > 0.0) {
            return Err(ConfigError::FrameRate(self.fps));
        }
        self.hologram.validate()
    }
}

#[derive(Debug, Clone, Args)]
pub struct HologramParams {
    /// Point size at unit distance, scaled by the hologram's placement.
    #[clap(long, default_value = "2400.0")]
    pub particle_size: f32,

    #[clap(long, default_value = "1100.0")]
    pub focal_length_x: f32,

    #[clap(long, default_value = "1100.0")]
    pub focal_length_y: f32,

    /// Z of depth value 0.
    #[clap(long, default_value = "-1000.0", allow_negative_numbers = true)]
    pub min_z: f32,

    /// Z of depth value 1.
    #[clap(long, default_value = "-120.0", allow_negative_numbers = true)]
    pub max_z: f32,

    /// Treat bright depth values as far instead of near.
    #[clap(long)]
    pub reverse_depth: bool,

    /// Fades out depths below this value. 0 disables the fade.
    #[clap(long, default_value = "0.0")]
    pub far_fade: f32,
}

impl Default for HologramParams {
    fn default() -> Self {
        Self {
            particle_size: 2400.0,
            focal_length_x: 1100.0,
            focal_length_y: 1100.0,
            min_z: -1000.0,
            max_z: -120.0,
            reverse_depth: false,
            far_fade: 0.0,
        }
    }
}

impl HologramParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.focal_length_x == 0.0 || self.focal_length_y == 0.0 {
            return Err(ConfigError::FocalLength);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_command_line_defaults() {
        let options = AppOptions::parse_from(["hologram-viewer", "model", "room.glb"]);
        let Command::Model(model) = options.command else {
            panic!("expected the model command");
        };
        let defaults = ParticleParams::default();
        assert_eq!(model.content_type, ContentType::Object);
        assert_eq!(model.particles.point_size, defaults.point_size);
        assert_eq!(model.particles.subsample_rate, defaults.subsample_rate);
        assert_eq!(model.particles.evaporation_amount, defaults.evaporation_amount);
        assert_eq!(model.particles.appearance_delay, defaults.appearance_delay);
        assert!(!model.particles.no_evaporation);
        assert_eq!(options.log_level, log::LevelFilter::Info);
    }

    #[test]
    fn parses_video_options() {
        let options = AppOptions::parse_from([
            "hologram-viewer",
            "video",
            "a.png",
            "b.png",
            "--fps",
            "24",
            "--min-z",
            "-500",
            "--reverse-depth",
        ]);
        let Command::Video(video) = options.command else {
            panic!("expected the video command");
        };
        assert_eq!(video.frames.len(), 2);
        assert_eq!(video.fps, 24.0);
        assert_eq!(video.grid(), UVec2::new(2048, 1024));
        assert_eq!(video.hologram.min_z, -500.0);
        assert!(video.hologram.reverse_depth);
        assert_eq!(video.validate(), Ok(()));
    }

    #[test]
    fn rejects_out_of_range_particle_params() {
        let mut params = ParticleParams::default();
        assert_eq!(params.validate(), Ok(()));

        params.subsample_rate = 0.0;
        assert_eq!(params.validate(), Err(ConfigError::SubsampleRate(0.0)));
        params.subsample_rate = 1.5;
        assert_eq!(params.validate(), Err(ConfigError::SubsampleRate(1.5)));

        params.subsample_rate = 0.5;
        params.evaporation_amount = -0.1;
        assert_eq!(params.validate(), Err(ConfigError::EvaporationAmount(-0.1)));

        params.evaporation_amount = 0.1;
        params.appearance_delay = -1.0;
        assert_eq!(params.validate(), Err(ConfigError::NegativeTiming));
    }

    #[test]
    fn rejects_zero_focal_length() {
        let params = HologramParams {
            focal_length_y: 0.0,
            ..HologramParams::default()
        };
        assert_eq!(params.validate(), Err(ConfigError::FocalLength));
    }

    #[test]
    fn object_placement_faces_the_viewer() {
        let matrix = ContentType::Object.placement().matrix();
        let forward = matrix.transform_vector3(Vec3::Z);
        assert!((forward - Vec3::new(0.0, 0.0, -3.0)).length() < 1e-4);
        assert_eq!(matrix.w_axis.truncate(), Vec3::new(0.0, 3.05, 2.0));
    }
}
