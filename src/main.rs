mod animation;
mod camera;
mod cli;
mod error;
mod frame;
mod hologram;
mod loader;
mod point_cloud;
mod renderer;
mod scene;

use clap::Parser;
use log::{error, info};
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::EventLoopBuilder;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::camera::Camera;
use crate::cli::{AppOptions, Command};
use crate::frame::FrameDriver;
use crate::loader::{AppEvent, AssetSource};
use crate::renderer::Renderer;
use crate::scene::Scene;

type Result<T = (), E = Box<dyn std::error::Error>> = std::result::Result<T, E>;

const SUBSAMPLE_STEP: f64 = 0.05;

fn main() -> Result {
    let options = AppOptions::parse();
    env_logger::builder().filter_level(options.log_level).init();

    let mut scene = match &options.command {
        Command::Model(model) => {
            model.particles.validate()?;
            Scene::for_model(model)
        }
        Command::Video(video) => {
            video.validate()?;
            Scene::for_video(video)
        }
    };
    let source = AssetSource::from(&options.command);

    // WINDOW
    let event_loop = EventLoopBuilder::<AppEvent>::with_user_event().build()?;
    let proxy = event_loop.create_proxy();
    let window = WindowBuilder::new()
        .with_title("Hologram Viewer")
        .build(&event_loop)?;

    let mut renderer = Renderer::new(&window)?;
    let size = window.inner_size();
    let mut camera = Camera::new(
        scene.focus(),
        size.width as f32 / size.height.max(1) as f32,
    );
    let driver = FrameDriver::new();
    let mut dragging = false;

    loader::spawn_load(source.clone(), proxy.clone());

    // EVENT LOOP
    event_loop.run(move |event, elwt| match event {
        Event::UserEvent(AppEvent::Loaded(result)) => match result {
            Ok(asset) => scene.install(asset, driver.elapsed()),
            Err(err) => error!("Keeping the current hologram: {}", err),
        },

        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => elwt.exit(),

            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                let now = driver.elapsed();
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::Escape) => elwt.exit(),
                    PhysicalKey::Code(KeyCode::Equal | KeyCode::NumpadAdd) => {
                        scene.adjust_subsample_rate(SUBSAMPLE_STEP, now)
                    }
                    PhysicalKey::Code(KeyCode::Minus | KeyCode::NumpadSubtract) => {
                        scene.adjust_subsample_rate(-SUBSAMPLE_STEP, now)
                    }
                    PhysicalKey::Code(KeyCode::KeyE) => scene.toggle_evaporation(),
                    PhysicalKey::Code(KeyCode::KeyA) => scene.retrigger_appearance(now),
                    PhysicalKey::Code(KeyCode::KeyR) => {
                        info!("Reloading {:?}", source);
                        loader::spawn_load(source.clone(), proxy.clone());
                    }
                    PhysicalKey::Code(KeyCode::KeyP) => {
                        let points = scene.evaluate(camera.view());
                        let visible = points.iter().filter(|p| p.color.w > 0.0).count();
                        info!("{} of {} points visible", visible, points.len());
                        if let Some(cloud) = scene.point_cloud() {
                            let animation = cloud.animation();
                            info!(
                                "Appearance {:?} at {:.2}, opacity {}, subsample rate {}",
                                animation.appearance(),
                                animation.appearance_progress(),
                                animation.global_opacity(),
                                scene.particles().subsample_rate
                            );
                        }
                    }
                    _ => {}
                }
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => dragging = state == ElementState::Pressed,

            WindowEvent::CursorMoved { position, .. } if dragging => {
                let size = window.inner_size();
                camera.orbit_to(position.x as f32, position.y as f32, size.width, size.height);
            }

            WindowEvent::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(_, y) => camera.zoom_by(y),
                MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => {
                    camera.zoom_by(y as f32)
                }
            },

            WindowEvent::Resized(size) => {
                renderer.resize(size.width, size.height);
                camera.set_aspect(size.width, size.height);
            }

            WindowEvent::RedrawRequested => {
                driver.tick(&mut scene);
                renderer.sync(&scene, camera.view(), camera.projection());
                if let Err(err) = renderer.render() {
                    error!("Failed to render frame: {}", err);
                    if matches!(err, wgpu::SurfaceError::OutOfMemory) {
                        elwt.exit();
                    }
                }
            }
            _ => {}
        },
        Event::AboutToWait => window.request_redraw(),
        _ => {}
    })?;
    Ok(())
}
