//! Per-frame driver: samples input, dispatches to first-person locomotion or
//! the orbit controller, and hands the resulting pose to the renderer.

use glam::Vec3;
use serde::Serialize;

use crate::aabb::Aabb;
use crate::camera::CameraPose;
use crate::colliders::ColliderRegistry;
use crate::collision::VerticalContact;
use crate::config::LocomotionConfig;
use crate::debug::{DebugCommand, Snapshot};
use crate::events::{EventLog, LocomotionEvent, SlideKind};
use crate::input::{FrameInput, InputState};
use crate::locomotion::{CrouchOutcome, LocomotionState, MotionState, Phase, StepReport};
use crate::mode::{CameraMode, ModeSwitch, OrbitController, PointerCapture};

const EVENT_LOG_CAPACITY: usize = 256;

/// Flags a HUD can show.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HudState {
    pub mode: CameraMode,
    pub status: MotionState,
    pub can_jump: bool,
    pub crouching: bool,
    pub bunny_hop: f32,
}

/// Consumer of the committed camera pose each frame (the renderer).
pub trait PoseSink {
    fn submit(&mut self, pose: &CameraPose, hud: &HudState);
}

pub struct FrameDriver {
    config: LocomotionConfig,
    pub colliders: ColliderRegistry,
    pub input: InputState,
    pub locomotion: LocomotionState,
    pub camera: CameraPose,
    modes: ModeSwitch,
    orbit: Box<dyn OrbitController>,
    events: EventLog,
    spawn: Vec3,
    frame: u64,
}

impl FrameDriver {
    pub fn new(config: LocomotionConfig, orbit: Box<dyn OrbitController>, start_mode: CameraMode) -> Self {
        let config = config.sanitized();
        let spawn = config.spawn_position();
        let camera = match start_mode {
            CameraMode::FirstPerson => CameraPose::new(spawn, 0.0, 0.0),
            CameraMode::Orbit => CameraPose::default(),
        };
        let mut driver = Self {
            locomotion: LocomotionState::new(&config),
            config,
            colliders: ColliderRegistry::new(),
            input: InputState::new(),
            camera,
            modes: ModeSwitch::new(start_mode),
            orbit,
            events: EventLog::new(EVENT_LOG_CAPACITY),
            spawn,
            frame: 0,
        };
        if start_mode == CameraMode::Orbit {
            driver.orbit.activate(&mut driver.camera);
        }
        driver
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    /// Swap tuning constants without resetting locomotion state.
    pub fn set_config(&mut self, config: LocomotionConfig) {
        let config = config.sanitized();
        self.spawn = config.spawn_position();
        self.locomotion.rebase(&config);
        self.config = config;
    }

    pub fn spawn(&self) -> Vec3 {
        self.spawn
    }

    pub fn set_spawn(&mut self, spawn: Vec3) {
        self.spawn = spawn;
    }

    /// Put the player's feet at `feet`, keeping the current stance.
    pub fn place_feet(&mut self, feet: Vec3) {
        self.camera.position = feet + Vec3::Y * self.locomotion.camera_offset(&self.config);
    }

    pub fn mode(&self) -> CameraMode {
        self.modes.mode()
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Register boxes from the loader, each grown by the configured margin.
    pub fn load_colliders(&mut self, boxes: impl IntoIterator<Item = Aabb>) {
        let margin = self.config.collider_margin;
        for b in boxes {
            self.colliders.register_with_margin(b, margin);
        }
        tracing::info!("Collider registry holds {} boxes", self.colliders.len());
    }

    /// Clear the registry and load a fresh set of boxes.
    pub fn replace_colliders(&mut self, boxes: impl IntoIterator<Item = Aabb>) {
        self.colliders.clear();
        self.load_colliders(boxes);
    }

    pub fn hud(&self) -> HudState {
        HudState {
            mode: self.modes.mode(),
            status: self.locomotion.status(),
            can_jump: self.locomotion.can_jump,
            crouching: self.locomotion.crouching,
            bunny_hop: self.locomotion.bunny_hop,
        }
    }

    pub fn switch_mode(&mut self, target: CameraMode, capture: &mut dyn PointerCapture) {
        let changed = self.modes.activate(
            target,
            &mut self.camera,
            self.spawn,
            capture,
            self.orbit.as_mut(),
        );
        if changed {
            if target == CameraMode::FirstPerson {
                self.place_feet(self.spawn);
            }
            self.events
                .push(self.frame, LocomotionEvent::ModeChanged { mode: target });
        }
    }

    /// Run one frame and return the committed pose.
    pub fn tick(&mut self, dt: f32, capture: &mut dyn PointerCapture) -> CameraPose {
        let dt = if dt.is_finite() {
            dt.max(0.0).min(self.config.max_frame_dt)
        } else {
            0.0
        };
        self.frame += 1;

        let input = self.input.sample();
        if input.switch_mode {
            let target = self.modes.mode().other();
            self.switch_mode(target, capture);
        }

        match self.modes.mode() {
            CameraMode::FirstPerson => self.tick_first_person(&input, dt),
            CameraMode::Orbit => self.orbit.update(&mut self.camera, input.look, dt),
        }

        self.camera
    }

    /// [`tick`](Self::tick), then hand the pose to `sink`.
    pub fn tick_and_submit(
        &mut self,
        dt: f32,
        capture: &mut dyn PointerCapture,
        sink: &mut dyn PoseSink,
    ) {
        let pose = self.tick(dt, capture);
        sink.submit(&pose, &self.hud());
    }

    fn tick_first_person(&mut self, input: &FrameInput, dt: f32) {
        self.camera.apply_look(input.look, self.config.pitch_limit);

        if input.crouch_toggle {
            let outcome = self
                .locomotion
                .toggle_crouch(&mut self.camera, &self.colliders, &self.config);
            let event = match outcome {
                CrouchOutcome::Crouched => LocomotionEvent::Crouched,
                CrouchOutcome::Stood => LocomotionEvent::Stood,
                CrouchOutcome::StandRefused(hit) => LocomotionEvent::StandRefused { collider: hit.index },
            };
            self.events.push(self.frame, event);
        }

        if input.jump {
            let event = match self
                .locomotion
                .try_jump(&self.camera, input.run, &self.colliders, &self.config)
            {
                Ok(()) => LocomotionEvent::Jumped {
                    velocity: self.locomotion.vertical_velocity,
                    bunny_hop: self.locomotion.bunny_hop,
                },
                Err(reason) => LocomotionEvent::JumpRefused { reason },
            };
            self.events.push(self.frame, event);
        }

        let was_grounded = self.locomotion.phase == Phase::Grounded;
        let report = self
            .locomotion
            .step(&mut self.camera, input, &self.colliders, &self.config, dt);
        self.log_step(&report, was_grounded);
    }

    fn log_step(&mut self, report: &StepReport, was_grounded: bool) {
        if let Some(kind) = report.slide {
            if kind != SlideKind::Free {
                self.events.push(self.frame, LocomotionEvent::Slid { kind });
            }
        }

        let y = self.camera.position.y;
        match report.contact {
            VerticalContact::Floor(hit) if !was_grounded => {
                self.events.push(self.frame, LocomotionEvent::Landed { collider: hit.index, y });
            }
            VerticalContact::FallbackPlane if !was_grounded => {
                self.events.push(self.frame, LocomotionEvent::FallbackFloor { y });
            }
            VerticalContact::Ceiling(hit) => {
                self.events.push(self.frame, LocomotionEvent::HitCeiling { collider: hit.index, y });
            }
            _ => {}
        }

        if report.bunny_hop_reset {
            self.events.push(self.frame, LocomotionEvent::BunnyHopReset);
        }
    }

    /// Apply a debug command. `Snapshot` returns the current state.
    pub fn apply_debug(
        &mut self,
        command: DebugCommand,
        capture: &mut dyn PointerCapture,
    ) -> Option<Snapshot> {
        match command {
            DebugCommand::ShiftColliders(delta) => {
                self.colliders.shift_all_y(delta);
                self.events
                    .push(self.frame, LocomotionEvent::CollidersShifted { delta });
            }
            DebugCommand::ClearColliders => {
                self.colliders.clear();
                self.events.push(self.frame, LocomotionEvent::CollidersCleared);
            }
            DebugCommand::Teleport(position) => {
                self.place_feet(position);
                self.events.push(
                    self.frame,
                    LocomotionEvent::Teleported {
                        x: position.x,
                        y: position.y,
                        z: position.z,
                    },
                );
            }
            DebugCommand::SetMode(mode) => self.switch_mode(mode, capture),
            DebugCommand::Snapshot => return Some(self.snapshot()),
        }
        None
    }

    /// Current state with up to 16 recent events, newest first.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            frame: self.frame,
            pose: self.camera,
            hud: self.hud(),
            vertical_velocity: self.locomotion.vertical_velocity,
            collider_count: self.colliders.len(),
            recent_events: self.events.recent().rev().take(16).cloned().collect(),
        }
    }
}
