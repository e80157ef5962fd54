//! Movement intent written by event handlers and sampled once per frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Logical actions. Platform adapters map keys, buttons and touches onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Forward,
    Backward,
    Left,
    Right,
    Run,
    Jump,
    Crouch,
    SwitchMode,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::Forward,
        Action::Backward,
        Action::Left,
        Action::Right,
        Action::Run,
        Action::Jump,
        Action::Crouch,
        Action::SwitchMode,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::Forward => "forward",
            Action::Backward => "backward",
            Action::Left => "left",
            Action::Right => "right",
            Action::Run => "run",
            Action::Jump => "jump",
            Action::Crouch => "crouch",
            Action::SwitchMode => "switch_mode",
        }
    }

    pub fn from_name(name: &str) -> Option<Action> {
        Action::ALL.into_iter().find(|a| a.name() == name)
    }
}

/// What the simulation sees for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    /// x = strafe (right positive), y = forward. Length never exceeds 1.
    pub movement: Vec2,
    /// True if any directional key or the joystick is engaged.
    pub directional: bool,
    pub run: bool,
    /// Yaw/pitch delta in radians accumulated since the last sample.
    pub look: Vec2,
    pub jump: bool,
    pub crouch_toggle: bool,
    pub switch_mode: bool,
}

/// Current input record. Held actions persist; discrete edges and look deltas
/// are drained by [`InputState::sample`].
#[derive(Debug, Clone, Default)]
pub struct InputState {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    run: bool,
    joystick: Vec2,
    look_delta: Vec2,
    jump_requested: bool,
    crouch_requested: bool,
    switch_requested: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key-down / button-press. Discrete actions queue an edge.
    pub fn press(&mut self, action: Action) {
        match action {
            Action::Forward => self.forward = true,
            Action::Backward => self.backward = true,
            Action::Left => self.left = true,
            Action::Right => self.right = true,
            Action::Run => self.run = true,
            Action::Jump => self.jump_requested = true,
            Action::Crouch => self.crouch_requested = true,
            Action::SwitchMode => self.switch_requested = true,
        }
    }

    /// Key-up / button-release. Discrete actions ignore releases.
    pub fn release(&mut self, action: Action) {
        match action {
            Action::Forward => self.forward = false,
            Action::Backward => self.backward = false,
            Action::Left => self.left = false,
            Action::Right => self.right = false,
            Action::Run => self.run = false,
            Action::Jump | Action::Crouch | Action::SwitchMode => {}
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        match action {
            Action::Forward => self.forward,
            Action::Backward => self.backward,
            Action::Left => self.left,
            Action::Right => self.right,
            Action::Run => self.run,
            Action::Jump | Action::Crouch | Action::SwitchMode => false,
        }
    }

    /// Virtual joystick vector, clamped to unit length.
    pub fn set_joystick(&mut self, v: Vec2) {
        self.joystick = v.clamp_length_max(1.0);
    }

    pub fn joystick(&self) -> Vec2 {
        self.joystick
    }

    /// Accumulate a look delta in radians (x = yaw, y = pitch).
    pub fn add_look(&mut self, delta: Vec2) {
        self.look_delta += delta;
    }

    /// Drop every held state, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.forward = false;
        self.backward = false;
        self.left = false;
        self.right = false;
        self.run = false;
        self.joystick = Vec2::ZERO;
    }

    /// Keyboard axis: opposite keys cancel, diagonals are normalized.
    pub fn key_axis(&self) -> Vec2 {
        let mut axis = Vec2::ZERO;
        if self.forward {
            axis.y += 1.0;
        }
        if self.backward {
            axis.y -= 1.0;
        }
        if self.left {
            axis.x -= 1.0;
        }
        if self.right {
            axis.x += 1.0;
        }
        axis.normalize_or_zero()
    }

    /// Combined keyboard and joystick intent, never longer than 1.
    pub fn movement(&self) -> Vec2 {
        (self.key_axis() + self.joystick).clamp_length_max(1.0)
    }

    /// Directional input counts as held even when opposite keys cancel out.
    pub fn has_directional_input(&self) -> bool {
        self.forward || self.backward || self.left || self.right || self.joystick != Vec2::ZERO
    }

    /// Snapshot for one frame, draining edges and the look delta.
    pub fn sample(&mut self) -> FrameInput {
        let frame = FrameInput {
            movement: self.movement(),
            directional: self.has_directional_input(),
            run: self.run,
            look: self.look_delta,
            jump: self.jump_requested,
            crouch_toggle: self.crouch_requested,
            switch_mode: self.switch_requested,
        };
        self.look_delta = Vec2::ZERO;
        self.jump_requested = false;
        self.crouch_requested = false;
        self.switch_requested = false;
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal_is_unit_length() {
        let mut input = InputState::new();
        input.press(Action::Forward);
        input.press(Action::Right);
        let axis = input.movement();
        assert!(axis.x > 0.0 && axis.y > 0.0);
        assert!((axis.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_opposites_cancel_but_still_directional() {
        let mut input = InputState::new();
        input.press(Action::Left);
        input.press(Action::Right);
        assert_eq!(input.movement(), Vec2::ZERO);
        assert!(input.has_directional_input());
    }

    #[test]
    fn test_sample_drains_edges() {
        let mut input = InputState::new();
        input.press(Action::Jump);
        input.press(Action::Run);
        input.add_look(Vec2::new(0.1, -0.2));

        let first = input.sample();
        assert!(first.jump);
        assert!(first.run);
        assert_eq!(first.look, Vec2::new(0.1, -0.2));

        let second = input.sample();
        assert!(!second.jump);
        assert!(second.run);
        assert_eq!(second.look, Vec2::ZERO);
    }

    #[test]
    fn test_joystick_clamped_and_combined() {
        let mut input = InputState::new();
        input.set_joystick(Vec2::new(0.0, 3.0));
        assert!((input.joystick().length() - 1.0).abs() < 1e-6);
        input.press(Action::Right);
        assert!(input.movement().length() <= 1.0 + 1e-6);
    }

    #[test]
    fn test_release_all() {
        let mut input = InputState::new();
        input.press(Action::Forward);
        input.press(Action::Run);
        input.set_joystick(Vec2::new(0.5, 0.0));
        input.release_all();
        assert!(!input.has_directional_input());
        assert!(!input.is_held(Action::Run));
    }

    #[test]
    fn test_action_names_round_trip() {
        for action in Action::ALL {
            assert_eq!(Action::from_name(action.name()), Some(action));
        }
        assert_eq!(Action::from_name("fly"), None);
    }
}
