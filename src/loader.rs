//! One-shot background loading of holograms.
//!
//! A load runs on its own thread and reports back to the event loop exactly
//! once, through an [`AppEvent`].

use std::path::{Path, PathBuf};
use std::thread;

use glam::Vec3;
use log::{debug, error, info, warn};
use winit::event_loop::EventLoopProxy;

use crate::cli::Command;
use crate::error::LoadError;
use crate::hologram::{FrameSequence, HybridFrame};
use crate::point_cloud::SourceGeometry;

/// Notifications sent to the event loop.
pub enum AppEvent {
    Loaded(Result<Asset, LoadError>),
}

pub enum Asset {
    Geometry(SourceGeometry),
    Frames(FrameSequence),
}

/// What to load, taken from the command line.
#[derive(Debug, Clone)]
pub enum AssetSource {
    Model(PathBuf),
    Frames { paths: Vec<PathBuf>, fps: f32 },
}

impl From<&Command> for AssetSource {
    fn from(command: &Command) -> Self {
        match command {
            Command::Model(options) => AssetSource::Model(options.file.clone()),
            Command::Video(options) => AssetSource::Frames {
                paths: options.frames.clone(),
                fps: options.fps,
            },
        }
    }
}

pub fn spawn_load(source: AssetSource, proxy: EventLoopProxy<AppEvent>) {
    thread::spawn(move || {
        let result = load(&source);
        if let Err(err) = &result {
            error!("Failed to load {:?}: {}", source, err);
        }
        if proxy.send_event(AppEvent::Loaded(result)).is_err() {
            warn!("Event loop closed before {:?} finished loading", source);
        }
    });
}

pub fn load(source: &AssetSource) -> Result<Asset, LoadError> {
    match source {
        AssetSource::Model(path) => load_geometry(path).map(Asset::Geometry),
        AssetSource::Frames { paths, fps } => load_frames(paths, *fps).map(Asset::Frames),
    }
}

pub fn load_geometry(path: &Path) -> Result<SourceGeometry, LoadError> {
    info!("Loading model from {}", path.display());
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_owned(),
        source,
    })?;
    let geometry = geometry_from_gltf(&bytes)?;
    info!(
        "Loaded {} points from {} ({} colors)",
        geometry.len(),
        path.display(),
        if geometry.has_colors() { "with" } else { "without" }
    );
    Ok(geometry)
}

/// Extracts the first primitive with positions from a glTF or GLB document.
///
/// Points and triangle meshes are treated alike: only their vertices matter.
pub fn geometry_from_gltf(bytes: &[u8]) -> Result<SourceGeometry, LoadError> {
    let (document, buffers, _) = gltf::import_slice(bytes)?;

    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
            let Some(positions) = reader.read_positions() else {
                debug!("Skipping primitive without positions in mesh {:?}", mesh.name());
                continue;
            };
            let positions: Vec<Vec3> = positions.map(Vec3::from).collect();
            if positions.is_empty() {
                continue;
            }

            debug!(
                "Found geometry in mesh {:?}, mode {:?}, {} vertices",
                mesh.name(),
                primitive.mode(),
                positions.len()
            );
            let colors = reader
                .read_colors(0)
                .map(|colors| colors.into_rgb_f32().map(Vec3::from).collect());
            if colors.is_none() {
                info!("No color attribute found, using white");
            }
            return SourceGeometry::new(positions, colors);
        }
    }

    Err(LoadError::MissingGeometry)
}

pub fn load_frames(paths: &[PathBuf], fps: f32) -> Result<FrameSequence, LoadError> {
    let mut frames: Vec<HybridFrame> = Vec::with_capacity(paths.len());
    for path in paths {
        let image = image::open(path).map_err(|source| LoadError::Image {
            path: path.clone(),
            source,
        })?;
        let frame = HybridFrame::new(image.to_rgba8());
        check_frame_size(path, &frame, frames.first())?;
        frames.push(frame);
    }
    if frames.is_empty() {
        return Err(LoadError::NoFrames);
    }

    let sequence = FrameSequence::new(frames, fps);
    info!(
        "Loaded {} frames of {}x{}",
        sequence.len(),
        sequence.frame_size().x,
        sequence.frame_size().y
    );
    Ok(sequence)
}

fn check_frame_size(
    path: &Path,
    frame: &HybridFrame,
    first: Option<&HybridFrame>,
) -> Result<(), LoadError> {
    let size = frame.size();
    let expected = first.map_or(size, HybridFrame::size);
    if size != expected || size.y < 2 || size.y % 2 != 0 {
        return Err(LoadError::FrameSize {
            path: path.to_owned(),
            width: size.x,
            height: size.y,
            expected_width: expected.x,
            expected_height: expected.y,
        });
    }
    Ok(())
}
