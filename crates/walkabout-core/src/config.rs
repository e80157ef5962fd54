//! Numeric tuning constants for first-person locomotion.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Every tuning constant the locomotion and collision code reads.
///
/// Missing YAML fields fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Vertical acceleration in units/s². Negative pulls down.
    pub gravity: f32,
    /// Upward velocity applied on jump.
    pub jump_strength: f32,
    /// Walking speed in units/s.
    pub base_speed: f32,
    /// Speed while the run action is held.
    pub run_speed: f32,
    /// Upper bound of the bunny-hop multiplier.
    pub max_bunny_hop: f32,
    /// Factor applied to the multiplier per running jump.
    pub bunny_hop_growth: f32,
    /// Camera drop while crouched. Also shrinks the player box.
    pub crouch_offset: f32,
    /// Base speed while crouched.
    pub crouch_speed: f32,
    /// Fallback floor plane.
    pub ground_height: f32,
    /// Margin added around scene boxes at registration.
    pub collider_margin: f32,
    /// Player box size (width, height, depth).
    pub capsule_size: [f32; 3],
    /// Height of the thin box used for head clearance.
    pub head_check_height: f32,
    /// Gap left between head and ceiling after a ceiling hit.
    pub ceiling_epsilon: f32,
    /// Sideways checks ignore this slice above the feet so standing on a box does not block walking.
    pub floor_skin: f32,
    /// Pitch clamp in radians.
    pub pitch_limit: f32,
    /// Where first-person mode places the camera.
    pub spawn_position: [f32; 3],
    /// Frame time is clamped to this many seconds.
    pub max_frame_dt: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            gravity: -20.0,
            jump_strength: 6.0,
            base_speed: 4.0,
            run_speed: 8.0,
            max_bunny_hop: 5.0,
            bunny_hop_growth: 1.1,
            crouch_offset: -0.7,
            crouch_speed: 1.0,
            ground_height: -18.5,
            collider_margin: 0.05,
            capsule_size: [0.8, 1.8, 0.8],
            head_check_height: 0.3,
            ceiling_epsilon: 0.01,
            floor_skin: 0.01,
            pitch_limit: std::f32::consts::FRAC_PI_2 - 0.01,
            spawn_position: [0.0, -17.0, 0.0],
            max_frame_dt: 0.1,
        }
    }
}

impl LocomotionConfig {
    pub fn capsule_size(&self) -> Vec3 {
        Vec3::from(self.capsule_size)
    }

    pub fn spawn_position(&self) -> Vec3 {
        Vec3::from(self.spawn_position)
    }

    /// Replace values the simulation cannot run with by their defaults.
    ///
    /// Non-finite numbers, a negative frame clamp, negative box extents and
    /// a negative pitch limit would otherwise poison every frame. Each
    /// replacement is logged. Odd but runnable values are only warned about.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        let repair = |name: &str, value: &mut f32, fallback: f32, valid: bool| {
            if !value.is_finite() || !valid {
                tracing::warn!("{} = {} is unusable; using {}", name, value, fallback);
                *value = fallback;
            }
        };
        repair("gravity", &mut self.gravity, defaults.gravity, true);
        repair("jump_strength", &mut self.jump_strength, defaults.jump_strength, true);
        repair("base_speed", &mut self.base_speed, defaults.base_speed, true);
        repair("run_speed", &mut self.run_speed, defaults.run_speed, true);
        repair("max_bunny_hop", &mut self.max_bunny_hop, defaults.max_bunny_hop, true);
        repair("bunny_hop_growth", &mut self.bunny_hop_growth, defaults.bunny_hop_growth, true);
        repair("crouch_offset", &mut self.crouch_offset, defaults.crouch_offset, true);
        repair("crouch_speed", &mut self.crouch_speed, defaults.crouch_speed, true);
        repair("ground_height", &mut self.ground_height, defaults.ground_height, true);
        repair("collider_margin", &mut self.collider_margin, defaults.collider_margin, true);
        let valid = self.head_check_height >= 0.0;
        repair("head_check_height", &mut self.head_check_height, defaults.head_check_height, valid);
        let valid = self.ceiling_epsilon >= 0.0;
        repair("ceiling_epsilon", &mut self.ceiling_epsilon, defaults.ceiling_epsilon, valid);
        let valid = self.floor_skin >= 0.0;
        repair("floor_skin", &mut self.floor_skin, defaults.floor_skin, valid);
        let valid = self.max_frame_dt >= 0.0;
        repair("max_frame_dt", &mut self.max_frame_dt, defaults.max_frame_dt, valid);
        let valid = self.pitch_limit >= 0.0 && self.pitch_limit <= std::f32::consts::FRAC_PI_2;
        repair("pitch_limit", &mut self.pitch_limit, defaults.pitch_limit, valid);
        for (i, extent) in self.capsule_size.iter_mut().enumerate() {
            let valid = *extent > 0.0;
            repair("capsule_size", extent, defaults.capsule_size[i], valid);
        }
        for (i, coord) in self.spawn_position.iter_mut().enumerate() {
            repair("spawn_position", coord, defaults.spawn_position[i], true);
        }

        self.warn_suspicious();
        self
    }

    /// Log values that make the simulation misbehave without breaking it.
    pub fn warn_suspicious(&self) {
        if self.gravity >= 0.0 {
            tracing::warn!("gravity is {} (non-negative): the player will never fall", self.gravity);
        }
        if self.max_bunny_hop < 1.0 {
            tracing::warn!("max_bunny_hop {} is below 1", self.max_bunny_hop);
        }
        if self.capsule_size[1] + self.crouch_offset <= 0.0 {
            tracing::warn!(
                "crouch_offset {} leaves no crouched height for capsule height {}",
                self.crouch_offset,
                self.capsule_size[1]
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = LocomotionConfig::default();
        assert_eq!(c.gravity, -20.0);
        assert_eq!(c.run_speed, 8.0);
        assert_eq!(c.capsule_size(), Vec3::new(0.8, 1.8, 0.8));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let c: LocomotionConfig = serde_yaml::from_str("gravity: -9.81\nrun_speed: 12\n").unwrap();
        assert!((c.gravity + 9.81).abs() < 1e-6);
        assert_eq!(c.run_speed, 12.0);
        assert_eq!(c.base_speed, 4.0);
        assert_eq!(c.ground_height, -18.5);
    }

    #[test]
    fn test_bad_yaml_is_error() {
        assert!(serde_yaml::from_str::<LocomotionConfig>("gravity: [1, 2").is_err());
    }

    #[test]
    fn test_sanitized_replaces_unusable_values() {
        let c: LocomotionConfig = serde_yaml::from_str(
            "max_frame_dt: -0.1\npitch_limit: -1.0\ncapsule_size: [0.8, -1.8, 0.8]\nfloor_skin: .nan\ngravity: -9.81\n",
        )
        .unwrap();
        let c = c.sanitized();
        let d = LocomotionConfig::default();
        assert_eq!(c.max_frame_dt, d.max_frame_dt);
        assert_eq!(c.pitch_limit, d.pitch_limit);
        assert_eq!(c.capsule_size, d.capsule_size);
        assert_eq!(c.floor_skin, d.floor_skin);
        assert!((c.gravity + 9.81).abs() < 1e-6);
    }

    #[test]
    fn test_sanitized_keeps_valid_config() {
        assert_eq!(LocomotionConfig::default().sanitized(), LocomotionConfig::default());
    }
}
