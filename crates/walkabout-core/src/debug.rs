//! Debug and test entry points into a running [`FrameDriver`](crate::frame::FrameDriver).

use glam::Vec3;
use serde::Serialize;

use crate::camera::CameraPose;
use crate::events::LoggedEvent;
use crate::frame::HudState;
use crate::mode::CameraMode;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebugCommand {
    /// Move every collider vertically.
    ShiftColliders(f32),
    ClearColliders,
    /// Place the camera without running collision.
    Teleport(Vec3),
    SetMode(CameraMode),
    Snapshot,
}

/// Point-in-time view of the driver for consoles and logs.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub frame: u64,
    pub pose: CameraPose,
    pub hud: HudState,
    pub vertical_velocity: f32,
    pub collider_count: usize,
    pub recent_events: Vec<LoggedEvent>,
}

impl Snapshot {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
