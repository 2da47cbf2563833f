use std::time;

use nalgebra as na;
use na::{vector, Vector3};
use show_image::event::{VirtualKeyCode, WindowEvent};
use show_image::{create_window, ImageInfo, ImageView, WindowOptions};

use crate::config::Params;
use crate::scene::camera::Camera;
use crate::scene::renderer::Renderer;
use crate::scene::settings::RenderSettings;
use crate::scene::util::ColorRGB;
use crate::scene::{DefaultMeshes, Scene, DEFAULT_MESH_POSITION};

const CLEAR_COLOR: ColorRGB = vector![0.39, 0.39, 0.39];
const UNIFORM_CLEAR_COLOR: ColorRGB = vector![0.1, 0.1, 0.1];
const ROTATION_SPEED: f32 = 45.0; // Degrees per second.

const FOV_Y: f32 = 45.0; // Degrees.
const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;

/// Everything the keyboard can change between frames.
#[derive(Debug, Clone, Copy)]
struct AppState {
    settings: RenderSettings,
    rotate: bool,
    show_effect: bool,
    uniform_clear_color: bool,
    print_fps: bool,
    exit: bool,
}

impl AppState {
    fn new(params: &Params) -> Self {
        return Self {
            settings: params.settings,
            rotate: true,
            show_effect: true,
            uniform_clear_color: false,
            print_fps: params.print_fps,
            exit: false,
        };
    }

    fn clear_color(&self) -> ColorRGB {
        return if self.uniform_clear_color { UNIFORM_CLEAR_COLOR } else { CLEAR_COLOR };
    }

    /// Applies a released key. Keys without a binding are ignored.
    fn handle_key(&mut self, key: VirtualKeyCode) {
        let settings = &mut self.settings;
        match key {
            VirtualKeyCode::F2 => {
                self.rotate = !self.rotate;
                log::info!("Rotation {}", on_off(self.rotate));
            }
            VirtualKeyCode::F3 => {
                self.show_effect = !self.show_effect;
                log::info!("Fire effect {}", on_off(self.show_effect));
            }
            VirtualKeyCode::F4 => {
                settings.address_mode = settings.address_mode.next();
                log::info!("Sampler address mode {:?}", settings.address_mode);
            }
            VirtualKeyCode::F5 => {
                settings.shading_mode = settings.shading_mode.next();
                log::info!("Shading mode {:?}", settings.shading_mode);
            }
            VirtualKeyCode::F6 => {
                settings.use_normal_map = !settings.use_normal_map;
                log::info!("Normal map {}", on_off(settings.use_normal_map));
            }
            VirtualKeyCode::F7 => {
                settings.show_depth = !settings.show_depth;
                log::info!("Depth visualization {}", on_off(settings.show_depth));
            }
            VirtualKeyCode::F8 => {
                settings.show_bounding_boxes = !settings.show_bounding_boxes;
                log::info!("Bounding boxes {}", on_off(settings.show_bounding_boxes));
            }
            VirtualKeyCode::F9 => {
                settings.cull_mode = settings.cull_mode.next();
                log::info!("Cull mode {:?}", settings.cull_mode);
            }
            VirtualKeyCode::F10 => {
                self.uniform_clear_color = !self.uniform_clear_color;
                log::info!("Uniform clear color {}", on_off(self.uniform_clear_color));
            }
            VirtualKeyCode::F11 => {
                self.print_fps = !self.print_fps;
                log::info!("FPS printing {}", on_off(self.print_fps));
            }
            VirtualKeyCode::Escape => {
                self.exit = true;
            }
            _ => (),
        }
    }
}

fn on_off(value: bool) -> &'static str {
    return if value { "on" } else { "off" };
}

/// Helper, picking out key releases from the window events.
fn released_key(window_event: WindowEvent) -> Option<VirtualKeyCode> {
    if let WindowEvent::KeyboardInput(event) = window_event {
        if event.input.state.is_released() {
            return event.input.key_code;
        }
    }
    return None;
}

/// Spins both default meshes around their y axis.
fn set_rotation(scene: &mut Scene, meshes: DefaultMeshes, angle: f32) {
    scene.mesh_mut(meshes.vehicle).set_rotation_y(angle);
    scene.mesh_mut(meshes.effect).set_rotation_y(angle);
}

/// Actually launches the window, showing rendered frames until Escape is released.
pub fn run(params: Params) -> Result<(), Box<dyn std::error::Error>> {
    let (mut scene, meshes) = Scene::load_default(&params.asset_dir)?;
    let camera = Camera::new(Vector3::zeros(), FOV_Y, params.width as f32 / params.height as f32, NEAR, FAR);
    log::info!("Camera at {:?}, meshes at {:?}", camera.origin(), DEFAULT_MESH_POSITION);
    let mut renderer = Renderer::new(params.width, params.height, params.threads, params.tile_size);
    let mut state = AppState::new(&params);

    let window_options = WindowOptions {
        size: Some([params.width, params.height]),
        ..Default::default()
    };
    let window = create_window("dual rasterizer", window_options)?;
    let event_channel = window.event_channel()?;

    let mut angle: f32 = 0.0;
    let mut last_frame = time::Instant::now();
    let mut frame_counter_time_begin = time::Instant::now();
    let mut frame_counter: u32 = 0;
    while !state.exit {
        let now = time::Instant::now();
        let elapsed = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;
        if state.rotate {
            angle += ROTATION_SPEED.to_radians() * elapsed;
            set_rotation(&mut scene, meshes, angle);
        }
        scene.mesh_mut(meshes.effect).visible = state.show_effect;

        let frame = renderer.render(&mut scene, &camera, state.settings, state.clear_color())?;
        let image_data = ImageView::new(ImageInfo::rgb8(frame.width(), frame.height()), frame.as_render_data());
        window.set_image("frame", image_data)?;

        // Unloading everything that piled up in the event channel since the last frame.
        for key in event_channel.try_iter().filter_map(released_key) {
            state.handle_key(key);
        }

        if state.print_fps {
            frame_counter += 1;
            if time::Instant::now().duration_since(frame_counter_time_begin).as_secs_f32() > 1.0 {
                log::info!("FPS --- {}", frame_counter);
                frame_counter_time_begin = time::Instant::now();
                frame_counter = 0;
            }
        }
    }

    return Ok(());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::settings::{CullMode, ShadingMode};
    use crate::scene::texture::AddressMode;

    fn state() -> AppState {
        return AppState::new(&Params::default());
    }

    #[test]
    fn function_keys_toggle_settings() {
        let mut state = state();
        for key in [
            VirtualKeyCode::F4,
            VirtualKeyCode::F5,
            VirtualKeyCode::F6,
            VirtualKeyCode::F7,
            VirtualKeyCode::F8,
            VirtualKeyCode::F9,
        ] {
            state.handle_key(key);
        }
        assert_eq!(state.settings.address_mode, AddressMode::Clamp);
        assert_eq!(state.settings.shading_mode, ShadingMode::ObservedAreaOnly);
        assert!(!state.settings.use_normal_map);
        assert!(state.settings.show_depth);
        assert!(state.settings.show_bounding_boxes);
        assert_eq!(state.settings.cull_mode, CullMode::FrontFace);
        assert!(!state.exit);
    }

    #[test]
    fn application_toggles() {
        let mut state = state();
        assert_eq!(state.clear_color(), CLEAR_COLOR);
        state.handle_key(VirtualKeyCode::F2);
        state.handle_key(VirtualKeyCode::F3);
        state.handle_key(VirtualKeyCode::F10);
        state.handle_key(VirtualKeyCode::F11);
        assert!(!state.rotate);
        assert!(!state.show_effect);
        assert_eq!(state.clear_color(), UNIFORM_CLEAR_COLOR);
        assert!(state.print_fps);

        state.handle_key(VirtualKeyCode::A);
        assert!(!state.exit);
        state.handle_key(VirtualKeyCode::Escape);
        assert!(state.exit);
    }
}
