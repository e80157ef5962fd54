use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Camera pose driven by whichever controller is active.
///
/// `position` is the feet anchor of the first-person player box while
/// standing; crouching lowers it by the crouch offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    /// Rotation about world Y. Zero looks down -Z.
    pub yaw: f32,
    /// Rotation about the camera's local X. Positive looks up.
    pub pitch: f32,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

impl CameraPose {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch)
    }

    /// Unit look direction.
    pub fn look_direction(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    /// Look direction projected onto the ground plane and renormalized.
    pub fn flat_forward(&self) -> Vec3 {
        let d = self.look_direction();
        let flat = Vec3::new(d.x, 0.0, d.z).normalize_or_zero();
        if flat == Vec3::ZERO {
            // Looking straight up or down: fall back to yaw alone.
            Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
        } else {
            flat
        }
    }

    /// forward × world-up.
    pub fn flat_right(&self) -> Vec3 {
        self.flat_forward().cross(Vec3::Y)
    }

    /// Move along the flattened look direction.
    pub fn move_forward(&mut self, distance: f32) {
        self.position += self.flat_forward() * distance;
    }

    /// Strafe along the flattened right vector.
    pub fn move_right(&mut self, distance: f32) {
        self.position += self.flat_right() * distance;
    }

    /// Apply a yaw/pitch delta in radians, clamping pitch to `±pitch_limit`.
    pub fn apply_look(&mut self, delta: Vec2, pitch_limit: f32) {
        if delta == Vec2::ZERO {
            return;
        }
        let limit = pitch_limit.abs();
        self.yaw -= delta.x;
        self.pitch = (self.pitch - delta.y).max(-limit).min(limit);
    }

    /// Point the camera at `target` from its current position.
    pub fn look_at(&mut self, target: Vec3) {
        let dir = (target - self.position).normalize_or_zero();
        if dir == Vec3::ZERO {
            return;
        }
        self.yaw = (-dir.x).atan2(-dir.z);
        self.pitch = dir.y.clamp(-1.0, 1.0).asin();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.look_direction(), Vec3::Y)
    }
}
