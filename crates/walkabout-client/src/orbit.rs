//! Turntable camera for orbit mode. No collision.

use glam::{Vec2, Vec3};

use walkabout_core::{CameraPose, OrbitController};

/// Orbits a fixed target at a fixed distance. Look deltas turn the table.
#[derive(Debug, Clone)]
pub struct TurntableOrbit {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub pitch_range: (f32, f32),
    /// Idle spin in radians per second.
    pub spin: f32,
}

impl Default for TurntableOrbit {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 25.0,
            yaw: std::f32::consts::FRAC_PI_4,
            pitch: -0.35,
            pitch_range: (-1.4, 0.2),
            spin: 0.0,
        }
    }
}

impl TurntableOrbit {
    pub fn new(target: Vec3, distance: f32) -> Self {
        Self {
            target,
            distance,
            ..Default::default()
        }
    }

    fn write_pose(&self, pose: &mut CameraPose) {
        pose.yaw = self.yaw;
        pose.pitch = self.pitch;
        pose.position = self.target - pose.look_direction() * self.distance;
    }
}

impl OrbitController for TurntableOrbit {
    fn activate(&mut self, pose: &mut CameraPose) {
        self.write_pose(pose);
    }

    fn update(&mut self, pose: &mut CameraPose, look: Vec2, dt: f32) {
        self.yaw -= look.x - self.spin * dt;
        self.pitch = (self.pitch - look.y).clamp(self.pitch_range.0, self.pitch_range.1);
        self.write_pose(pose);
    }
}
