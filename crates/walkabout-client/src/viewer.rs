//! Windowed viewer: winit event loop driving a [`FrameDriver`].
//!
//! There is no renderer attached here. The committed pose and HUD flags are
//! shown in the window title; a renderer would implement [`PoseSink`].

use std::sync::mpsc;
use std::sync::Arc;

use glam::Vec3;
use notify::RecommendedWatcher;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

use walkabout_core::{CameraMode, CameraPose, DebugCommand, FrameDriver, HudState, PointerCapture, PoseSink};

use crate::input::{load_bindings, InputMapper, TouchRouter};
use crate::orbit::TurntableOrbit;
use crate::project_config::ViewerSettings;
use crate::scene;
use crate::watcher::{self, WatchEvent, WatchTargets};

const COLLIDER_NUDGE: f32 = 0.1;
const TITLE_INTERVAL_SECS: f32 = 0.1;

/// Pointer lock on the viewer window.
#[derive(Default)]
pub struct WindowCapture {
    window: Option<Arc<Window>>,
    engaged: bool,
}

impl PointerCapture for WindowCapture {
    fn engage(&mut self) -> bool {
        let Some(window) = &self.window else {
            return false;
        };
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
        match grabbed {
            Ok(()) => {
                window.set_cursor_visible(false);
                self.engaged = true;
                tracing::info!("Pointer captured");
            }
            Err(e) => tracing::warn!("Pointer capture refused: {}", e),
        }
        self.engaged
    }

    fn release(&mut self) {
        if let Some(window) = &self.window {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
            window.set_cursor_visible(true);
        }
        if self.engaged {
            tracing::info!("Pointer released");
        }
        self.engaged = false;
    }

    fn is_engaged(&self) -> bool {
        self.engaged
    }
}

/// Writes pose and HUD flags into the window title, at most every 100 ms.
pub struct TitleHud {
    name: String,
    window: Option<Arc<Window>>,
    last_update: Option<instant::Instant>,
}

impl TitleHud {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            window: None,
            last_update: None,
        }
    }
}

pub fn hud_line(pose: &CameraPose, hud: &HudState) -> String {
    let p = pose.position;
    format!(
        "{:?} {:?} | jump {} | hop x{:.2} | ({:.2}, {:.2}, {:.2})",
        hud.mode,
        hud.status,
        if hud.can_jump { "ready" } else { "-" },
        hud.bunny_hop,
        p.x,
        p.y,
        p.z
    )
}

impl PoseSink for TitleHud {
    fn submit(&mut self, pose: &CameraPose, hud: &HudState) {
        let Some(window) = &self.window else {
            return;
        };
        let now = instant::Instant::now();
        if let Some(last) = self.last_update {
            if now.duration_since(last).as_secs_f32() < TITLE_INTERVAL_SECS {
                return;
            }
        }
        self.last_update = Some(now);
        window.set_title(&format!("{} | {}", self.name, hud_line(pose, hud)));
    }
}

/// Main viewer struct implementing winit's ApplicationHandler.
pub struct Viewer {
    settings: ViewerSettings,
    driver: FrameDriver,
    mapper: InputMapper,
    capture: WindowCapture,
    hud: TitleHud,
    window: Option<Arc<Window>>,
    last_frame_time: Option<instant::Instant>,
    scene_spawn: Option<Vec3>,
    watcher: Option<(RecommendedWatcher, mpsc::Receiver<WatchEvent>)>,
}

impl Viewer {
    pub fn new(settings: ViewerSettings, start_mode: CameraMode) -> Self {
        let config = &settings.config;
        let bindings = load_bindings(settings.bindings_path.as_deref());
        let mapper = InputMapper::new(
            &bindings,
            config.sensitivity.mouse,
            TouchRouter::new(config.joystick_radius, config.sensitivity.touch),
        );
        let driver = FrameDriver::new(
            config.locomotion.clone(),
            Box::new(TurntableOrbit::default()),
            start_mode,
        );
        let hud = TitleHud::new(&config.name);

        let mut viewer = Self {
            settings,
            driver,
            mapper,
            capture: WindowCapture::default(),
            hud,
            window: None,
            last_frame_time: None,
            scene_spawn: None,
            watcher: None,
        };
        viewer.load_scene();
        if start_mode == CameraMode::FirstPerson {
            viewer.driver.place_feet(viewer.driver.spawn());
        }
        viewer
    }

    /// Load (or reload) the scene. A failure keeps the current colliders.
    fn load_scene(&mut self) {
        let Some(path) = self.settings.scene_path.clone() else {
            tracing::info!("No scene configured; walking on the fallback plane");
            return;
        };
        match scene::load_scene(&path).and_then(|s| {
            scene::apply_scene(&mut self.driver, &s)?;
            Ok(s.spawn())
        }) {
            Ok(spawn) => self.scene_spawn = spawn,
            Err(e) => tracing::error!("Failed to load scene {:?}: {}", path, e),
        }
    }

    fn reload_config(&mut self) {
        if let Err(e) = self.settings.reload() {
            tracing::error!("Config reload failed, keeping previous settings: {}", e);
            return;
        }
        let config = &self.settings.config;
        self.driver.set_config(config.locomotion.clone());
        if let Some(spawn) = self.scene_spawn {
            self.driver.set_spawn(spawn);
        }
        self.mapper.mouse_sensitivity = config.sensitivity.mouse;
        self.mapper.touches.look_sensitivity = config.sensitivity.touch;
        self.mapper.touches.joystick_radius = config.joystick_radius.max(1.0);
        tracing::info!("Reloaded {:?}", self.settings.config_path);
    }

    fn start_watcher(&mut self) {
        let targets = WatchTargets {
            scene: self.settings.scene_path.clone(),
            config: self.settings.config_path.clone(),
            bindings: self.settings.bindings_path.clone(),
        };
        match watcher::start_watching(&self.settings.project_root, targets) {
            Ok(w) => self.watcher = Some(w),
            Err(e) => tracing::warn!("Hot reload disabled: {}", e),
        }
    }

    fn process_reloads(&mut self) {
        let Some((_, rx)) = &self.watcher else {
            return;
        };
        for event in watcher::drain(rx) {
            match event {
                WatchEvent::SceneChanged(_) => self.load_scene(),
                WatchEvent::ConfigChanged(_) => self.reload_config(),
                WatchEvent::BindingsChanged(path) => {
                    self.mapper.set_bindings(&load_bindings(Some(&path)));
                }
            }
        }
    }

    /// Keys handled by the viewer itself rather than mapped to actions.
    fn handle_viewer_key(&mut self, code: KeyCode) -> bool {
        let command = match code {
            KeyCode::Escape => {
                self.capture.release();
                return true;
            }
            KeyCode::PageUp => DebugCommand::ShiftColliders(COLLIDER_NUDGE),
            KeyCode::PageDown => DebugCommand::ShiftColliders(-COLLIDER_NUDGE),
            KeyCode::F3 => DebugCommand::Snapshot,
            _ => return false,
        };
        if let Some(snapshot) = self.driver.apply_debug(command, &mut self.capture) {
            tracing::info!("Snapshot: {}", snapshot.to_json());
        }
        true
    }

    fn screen_width(&self) -> f32 {
        self.window
            .as_ref()
            .map(|w| w.inner_size().width as f32)
            .unwrap_or(0.0)
    }

    fn frame(&mut self) {
        let now = instant::Instant::now();
        let dt = match self.last_frame_time {
            Some(last) => now.duration_since(last).as_secs_f32(),
            None => 0.0,
        };
        self.last_frame_time = Some(now);

        self.process_reloads();
        self.driver.tick_and_submit(dt, &mut self.capture, &mut self.hud);
    }
}

impl ApplicationHandler for Viewer {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(self.settings.config.name.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                tracing::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };
        tracing::info!("Window created");

        self.capture.window = Some(Arc::clone(&window));
        self.hud.window = Some(Arc::clone(&window));
        self.window = Some(window);

        self.start_watcher();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested, exiting");
                event_loop.exit();
                return;
            }
            WindowEvent::RedrawRequested => {
                self.frame();
                return;
            }
            WindowEvent::KeyboardInput { event: key, .. } => {
                if let PhysicalKey::Code(code) = key.physical_key {
                    if key.state == ElementState::Pressed && !key.repeat && self.handle_viewer_key(code) {
                        return;
                    }
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                if self.driver.mode() == CameraMode::FirstPerson && !self.capture.is_engaged() {
                    self.capture.engage();
                }
            }
            _ => {}
        }

        let width = self.screen_width();
        self.mapper
            .handle_window_event(&event, width, &mut self.driver.input);
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: winit::event::DeviceEvent,
    ) {
        if let winit::event::DeviceEvent::MouseMotion { delta } = event {
            self.mapper
                .handle_mouse_motion(delta, self.capture.is_engaged(), &mut self.driver.input);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Scene path relative to the project, for log lines.
pub fn describe_scene(settings: &ViewerSettings) -> String {
    match &settings.scene_path {
        Some(path) => path
            .strip_prefix(&settings.project_root)
            .unwrap_or(path)
            .display()
            .to_string(),
        None => "(none)".to_string(),
    }
}
