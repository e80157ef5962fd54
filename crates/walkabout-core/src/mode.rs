//! Selects which controller drives the camera.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::CameraPose;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    #[default]
    Orbit,
    FirstPerson,
}

impl CameraMode {
    pub fn other(self) -> Self {
        match self {
            CameraMode::Orbit => CameraMode::FirstPerson,
            CameraMode::FirstPerson => CameraMode::Orbit,
        }
    }
}

/// Pointer lock / look capture on the host platform.
pub trait PointerCapture {
    /// Try to capture the pointer. Returns whether capture is now active.
    fn engage(&mut self) -> bool;
    fn release(&mut self);
    fn is_engaged(&self) -> bool;
}

/// Capture that never engages, for headless runs and touch-only hosts.
#[derive(Debug, Default)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn engage(&mut self) -> bool {
        false
    }

    fn release(&mut self) {}

    fn is_engaged(&self) -> bool {
        false
    }
}

/// Orbit-style camera controller used outside first-person mode.
pub trait OrbitController {
    /// Called when orbit mode takes over the camera.
    fn activate(&mut self, pose: &mut CameraPose);
    fn update(&mut self, pose: &mut CameraPose, look: Vec2, dt: f32);
}

/// Binary switch between the orbit controller and first-person locomotion.
#[derive(Debug, Clone)]
pub struct ModeSwitch {
    mode: CameraMode,
    orbit_enabled: bool,
    first_person_enabled: bool,
}

impl ModeSwitch {
    pub fn new(mode: CameraMode) -> Self {
        Self {
            mode,
            orbit_enabled: mode == CameraMode::Orbit,
            first_person_enabled: mode == CameraMode::FirstPerson,
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn orbit_enabled(&self) -> bool {
        self.orbit_enabled
    }

    pub fn first_person_enabled(&self) -> bool {
        self.first_person_enabled
    }

    /// Make `target` the active mode. Returns `true` if the mode changed.
    ///
    /// Entering first-person teleports the camera to `spawn` and engages
    /// pointer capture; entering orbit releases capture and hands the pose
    /// to the orbit controller. Re-activating the current mode only
    /// reasserts the enabled flags.
    pub fn activate(
        &mut self,
        target: CameraMode,
        pose: &mut CameraPose,
        spawn: Vec3,
        capture: &mut dyn PointerCapture,
        orbit: &mut dyn OrbitController,
    ) -> bool {
        self.orbit_enabled = target == CameraMode::Orbit;
        self.first_person_enabled = target == CameraMode::FirstPerson;

        if target == self.mode {
            return false;
        }

        match target {
            CameraMode::FirstPerson => {
                pose.position = spawn;
                if !capture.engage() {
                    tracing::debug!("Pointer capture not available; look via touch or click to capture");
                }
            }
            CameraMode::Orbit => {
                capture.release();
                orbit.activate(pose);
            }
        }

        tracing::info!("Camera mode: {:?} -> {:?}", self.mode, target);
        self.mode = target;
        true
    }
}
