#![warn(clippy::pedantic)]
use std::time::Instant;

use winit::{
    event::{ElementState, Event, WindowEvent},
    event_loop::{ControlFlow, EventLoopBuilder},
};

use buffer::{MeshBuffer, MeshSet};
use camera::CameraBank;
use config::Config;
use error::{Error, Result};
use frame::{Application, SceneAssets};
use input::Pointer;
use load::{MeshId, SceneManifest};
use state::{Flow, SceneState};
use texture::TextureTable;

mod animation;
mod buffer;
mod camera;
mod config;
mod error;
mod frame;
mod geometry;
mod input;
mod load;
mod proximity;
mod shader;
mod state;
mod texture;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::from_env();
    let manifest = SceneManifest::load(&config.manifest_path())?;

    let event_loop = EventLoopBuilder::new().build()?;
    let (window, display) = glium::backend::glutin::SimpleWindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(config.window_size.0, config.window_size.1)
        .build(&event_loop);

    log::info!(
        "{} / OpenGL {}",
        display.get_opengl_renderer_string(),
        display.get_opengl_version_string()
    );
    if !display.is_glsl_version_supported(&glium::Version(glium::Api::Gl, 3, 3)) {
        return Err(Error::Unsupported(String::from("OpenGL 3.3 is not supported")));
    }

    // load assets
    let exterior = buffer::load_exterior(&display, &manifest, &config.asset_root)?;
    let texture_paths: Vec<_> = manifest.textures.iter().map(|path| config.asset(path)).collect();
    let textures = TextureTable::load(&texture_paths, texture::decode_image, |image| {
        texture::upload_srgb(&display, image)
    });
    log::info!(
        "{} material chunks, {} lights, {}/{} textures mapped",
        exterior.len(),
        manifest.lights.len(),
        textures.mapped_count(),
        textures.len()
    );

    let skymap = match texture::load_cubemap(&display, &config.cubemap_faces()) {
        Ok(cubemap) => Some(cubemap),
        Err(e) => {
            log::warn!("skybox disabled: {e}");
            None
        }
    };

    let meshes = MeshId::ALL
        .iter()
        .map(|&mesh| {
            let buffer = MeshBuffer::new(&display, &load::load_frames(&config, mesh)?)?;
            log::info!("{mesh:?}: {} frames", buffer.frame_count());
            Ok(buffer)
        })
        .collect::<Result<Vec<_>>>()?;

    let (width, height) = config.window_size;
    let presets = CameraBank::new(&manifest.camera, width as f32 / height as f32, &config.camera);
    let mut state = SceneState::new(presets, &config);
    let app = Application::new(
        &display,
        SceneAssets {
            meshes: MeshSet::new(meshes)?,
            exterior,
            textures,
            skymap,
            lights: manifest.lights.clone(),
        },
    )?;

    for line in input::KEY_HELP {
        log::info!("{line}");
    }

    let mut pointer = Pointer::default();
    let mut next_tick = Instant::now() + config.tick;
    let mut failure = None;

    // rendering loop
    event_loop.run(|event, window_target| {
        let mut flow = Flow::Continue;
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => flow = Flow::Exit,

                WindowEvent::RedrawRequested => {
                    let mut target = display.draw();
                    let drawn = app.draw_frame(&mut target, &state);
                    if let Err(e) = drawn.and(target.finish().map_err(Error::from)) {
                        failure = Some(e);
                        flow = Flow::Exit;
                    }
                }
                WindowEvent::Resized(size) => {
                    display.resize(size.into());
                    state.set_aspect(size.width, size.height);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if event.state == ElementState::Pressed {
                        if let Some(command) = input::command_for_key(&event.logical_key) {
                            flow = state.apply(command);
                            window.request_redraw();
                        }
                    }
                }
                WindowEvent::ModifiersChanged(modifiers) => {
                    let modifiers = modifiers.state();
                    pointer.set_modifiers(modifiers.shift_key(), modifiers.control_key());
                }
                WindowEvent::MouseInput { state: pressed, button, .. } => {
                    pointer.button(button, pressed);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    for command in pointer.moved(position.x, position.y) {
                        state.apply(command);
                        window.request_redraw();
                    }
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    if let Some(command) = pointer.wheel(delta) {
                        state.apply(command);
                        window.request_redraw();
                    }
                }
                _ => (),
            },
            // fixed rate scene timer
            Event::AboutToWait => {
                let now = Instant::now();
                if now >= next_tick {
                    state.tick();
                    next_tick += config.tick;
                    if next_tick < now {
                        next_tick = now + config.tick;
                    }
                    window.request_redraw();
                }
                window_target.set_control_flow(ControlFlow::WaitUntil(next_tick));
            }
            _ => (),
        }
        if flow == Flow::Exit {
            window_target.exit();
        }
    })?;

    failure.map_or(Ok(()), Err)
}
