use std::collections::HashMap;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use winit::event::{ElementState, TouchPhase, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use walkabout_core::{Action, InputState};

/// Logical actions mapped to key names via bindings.yaml.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputBindings {
    #[serde(default)]
    pub actions: HashMap<Action, Vec<String>>,
}

impl Default for InputBindings {
    fn default() -> Self {
        let mut actions = HashMap::new();
        let mut bind = |action: Action, keys: &[&str]| {
            actions.insert(action, keys.iter().map(|k| k.to_string()).collect());
        };
        bind(Action::Forward, &["W", "ArrowUp"]);
        bind(Action::Backward, &["S", "ArrowDown"]);
        bind(Action::Left, &["A", "ArrowLeft"]);
        bind(Action::Right, &["D", "ArrowRight"]);
        bind(Action::Run, &["ShiftLeft", "ShiftRight"]);
        bind(Action::Jump, &["Space"]);
        bind(Action::Crouch, &["C"]);
        bind(Action::SwitchMode, &["V"]);
        Self { actions }
    }
}

/// Load input bindings from a YAML file, with defaults as fallback.
pub fn load_bindings(path: Option<&Path>) -> InputBindings {
    if let Some(path) = path {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(bindings) => {
                    tracing::info!("Loaded input bindings from {:?}", path);
                    return bindings;
                }
                Err(e) => tracing::warn!("Failed to parse {:?}: {}", path, e),
            },
            Err(e) => tracing::warn!("Failed to read {:?}: {}", path, e),
        }
    }
    tracing::info!("Using default input bindings");
    InputBindings::default()
}

const KEY_NAMES: &[(&str, KeyCode)] = &[
    ("A", KeyCode::KeyA),
    ("B", KeyCode::KeyB),
    ("C", KeyCode::KeyC),
    ("D", KeyCode::KeyD),
    ("E", KeyCode::KeyE),
    ("F", KeyCode::KeyF),
    ("G", KeyCode::KeyG),
    ("H", KeyCode::KeyH),
    ("I", KeyCode::KeyI),
    ("J", KeyCode::KeyJ),
    ("K", KeyCode::KeyK),
    ("L", KeyCode::KeyL),
    ("M", KeyCode::KeyM),
    ("N", KeyCode::KeyN),
    ("O", KeyCode::KeyO),
    ("P", KeyCode::KeyP),
    ("Q", KeyCode::KeyQ),
    ("R", KeyCode::KeyR),
    ("S", KeyCode::KeyS),
    ("T", KeyCode::KeyT),
    ("U", KeyCode::KeyU),
    ("V", KeyCode::KeyV),
    ("W", KeyCode::KeyW),
    ("X", KeyCode::KeyX),
    ("Y", KeyCode::KeyY),
    ("Z", KeyCode::KeyZ),
    ("Space", KeyCode::Space),
    ("ShiftLeft", KeyCode::ShiftLeft),
    ("ShiftRight", KeyCode::ShiftRight),
    ("ControlLeft", KeyCode::ControlLeft),
    ("ControlRight", KeyCode::ControlRight),
    ("AltLeft", KeyCode::AltLeft),
    ("Tab", KeyCode::Tab),
    ("Enter", KeyCode::Enter),
    ("ArrowUp", KeyCode::ArrowUp),
    ("ArrowDown", KeyCode::ArrowDown),
    ("ArrowLeft", KeyCode::ArrowLeft),
    ("ArrowRight", KeyCode::ArrowRight),
];

/// Maps key name strings to winit KeyCode.
fn key_name_to_code(name: &str) -> Option<KeyCode> {
    KEY_NAMES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, code)| *code)
}

/// Physical key to action lookup built from [`InputBindings`].
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    keys: HashMap<KeyCode, Action>,
}

impl KeyMap {
    pub fn from_bindings(bindings: &InputBindings) -> Self {
        let mut keys = HashMap::new();
        for (action, names) in &bindings.actions {
            for name in names {
                match key_name_to_code(name) {
                    Some(code) => {
                        if let Some(previous) = keys.insert(code, *action) {
                            tracing::warn!("Key {} bound to both {:?} and {:?}", name, previous, action);
                        }
                    }
                    None => tracing::warn!("Unknown key name in bindings: {}", name),
                }
            }
        }
        Self { keys }
    }

    pub fn action(&self, code: KeyCode) -> Option<Action> {
        self.keys.get(&code).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TrackedTouch {
    id: u64,
    origin: Vec2,
    last: Vec2,
}

/// Splits touches by screen half: the left half drives a virtual joystick,
/// the right half drags the view. Each role tracks at most one touch.
#[derive(Debug, Clone)]
pub struct TouchRouter {
    joystick: Option<TrackedTouch>,
    look: Option<TrackedTouch>,
    /// Pixels of drag for full joystick deflection.
    pub joystick_radius: f32,
    /// Radians per pixel of look drag.
    pub look_sensitivity: f32,
}

impl TouchRouter {
    pub fn new(joystick_radius: f32, look_sensitivity: f32) -> Self {
        Self {
            joystick: None,
            look: None,
            joystick_radius: joystick_radius.max(1.0),
            look_sensitivity,
        }
    }

    pub fn joystick_active(&self) -> bool {
        self.joystick.is_some()
    }

    pub fn look_active(&self) -> bool {
        self.look.is_some()
    }

    pub fn handle(&mut self, id: u64, phase: TouchPhase, position: Vec2, screen_width: f32, input: &mut InputState) {
        match phase {
            TouchPhase::Started => {
                let touch = TrackedTouch {
                    id,
                    origin: position,
                    last: position,
                };
                if position.x < screen_width * 0.5 {
                    if self.joystick.is_none() {
                        self.joystick = Some(touch);
                    }
                } else if self.look.is_none() {
                    self.look = Some(touch);
                }
            }
            TouchPhase::Moved => {
                if let Some(stick) = self.joystick.as_mut().filter(|t| t.id == id) {
                    stick.last = position;
                    let offset = position - stick.origin;
                    // Screen y grows downward; dragging up walks forward.
                    input.set_joystick(Vec2::new(offset.x, -offset.y) / self.joystick_radius);
                } else if let Some(look) = self.look.as_mut().filter(|t| t.id == id) {
                    let delta = position - look.last;
                    look.last = position;
                    input.add_look(delta * self.look_sensitivity);
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                if self.joystick.is_some_and(|t| t.id == id) {
                    self.joystick = None;
                    input.set_joystick(Vec2::ZERO);
                } else if self.look.is_some_and(|t| t.id == id) {
                    self.look = None;
                }
            }
        }
    }

    /// Forget all touches, e.g. on focus loss.
    pub fn reset(&mut self) {
        self.joystick = None;
        self.look = None;
    }
}

/// Translates winit events into [`InputState`] writes.
pub struct InputMapper {
    keymap: KeyMap,
    pub touches: TouchRouter,
    pub mouse_sensitivity: f32,
}

impl InputMapper {
    pub fn new(bindings: &InputBindings, mouse_sensitivity: f32, touches: TouchRouter) -> Self {
        Self {
            keymap: KeyMap::from_bindings(bindings),
            touches,
            mouse_sensitivity,
        }
    }

    pub fn set_bindings(&mut self, bindings: &InputBindings) {
        self.keymap = KeyMap::from_bindings(bindings);
    }

    /// Apply one key transition. Auto-repeat presses are dropped so discrete
    /// actions fire once per physical press.
    pub fn handle_key(&self, code: KeyCode, pressed: bool, repeat: bool, input: &mut InputState) -> bool {
        let Some(action) = self.keymap.action(code) else {
            return false;
        };
        if pressed {
            if !repeat {
                input.press(action);
            }
        } else {
            input.release(action);
        }
        true
    }

    /// Raw mouse motion. Ignored unless the pointer is captured.
    pub fn handle_mouse_motion(&self, delta: (f64, f64), captured: bool, input: &mut InputState) {
        if captured {
            input.add_look(Vec2::new(delta.0 as f32, delta.1 as f32) * self.mouse_sensitivity);
        }
    }

    /// Process a winit WindowEvent. Returns `true` if it was consumed.
    pub fn handle_window_event(&mut self, event: &WindowEvent, screen_width: f32, input: &mut InputState) -> bool {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    return self.handle_key(code, event.state == ElementState::Pressed, event.repeat, input);
                }
                false
            }
            WindowEvent::Touch(touch) => {
                let position = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                self.touches.handle(touch.id, touch.phase, position, screen_width, input);
                true
            }
            WindowEvent::Focused(false) => {
                input.release_all();
                self.touches.reset();
                true
            }
            _ => false,
        }
    }
}
