//! First-person walking: gravity, jumping, crouching, bunny-hop speed and
//! sliding collision against the registered boxes.
//!
//! The camera pose is owned elsewhere; this module mutates it while
//! first-person mode is active. Internally everything is computed at the
//! feet, which sit at the camera position while standing and one crouch
//! offset below it while crouched.

use glam::Vec3;
use serde::Serialize;

use crate::camera::CameraPose;
use crate::colliders::{ColliderHit, ColliderRegistry};
use crate::collision::{BodyShape, CollisionResolver, VerticalContact, VerticalParams};
use crate::config::LocomotionConfig;
use crate::events::{JumpRefusal, SlideKind};
use crate::input::FrameInput;

/// Whether the last vertical pass ended on something solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Grounded,
    Airborne,
}

/// Phase combined with stance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    Grounded,
    Airborne,
    CrouchedGrounded,
    CrouchedAirborne,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CrouchOutcome {
    Crouched,
    Stood,
    StandRefused(ColliderHit),
}

/// What one [`LocomotionState::step`] did, for event logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// `None` when there was no horizontal intent this frame.
    pub slide: Option<SlideKind>,
    pub contact: VerticalContact,
    pub bunny_hop_reset: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocomotionState {
    pub vertical_velocity: f32,
    /// Speed multiplier grown by running jumps. Always in `[1, max_bunny_hop]`.
    pub bunny_hop: f32,
    pub crouching: bool,
    pub can_jump: bool,
    pub phase: Phase,
    /// Active walking speed; swapped for the crouch speed while crouched.
    base_speed: f32,
    saved_base_speed: Option<f32>,
}

impl LocomotionState {
    pub fn new(config: &LocomotionConfig) -> Self {
        Self {
            vertical_velocity: 0.0,
            bunny_hop: 1.0,
            crouching: false,
            can_jump: true,
            phase: Phase::Airborne,
            base_speed: config.base_speed,
            saved_base_speed: None,
        }
    }

    pub fn status(&self) -> MotionState {
        match (self.crouching, self.phase) {
            (false, Phase::Grounded) => MotionState::Grounded,
            (false, Phase::Airborne) => MotionState::Airborne,
            (true, Phase::Grounded) => MotionState::CrouchedGrounded,
            (true, Phase::Airborne) => MotionState::CrouchedAirborne,
        }
    }

    pub fn base_speed(&self) -> f32 {
        self.base_speed
    }

    /// Horizontal speed for this frame.
    pub fn speed(&self, run: bool, config: &LocomotionConfig) -> f32 {
        let speed = if run { config.run_speed } else { self.base_speed };
        speed * self.bunny_hop
    }

    /// How far the camera sits above the feet (negative while crouched).
    pub fn camera_offset(&self, config: &LocomotionConfig) -> f32 {
        if self.crouching {
            config.crouch_offset
        } else {
            0.0
        }
    }

    pub fn feet(&self, pose: &CameraPose, config: &LocomotionConfig) -> Vec3 {
        pose.position - Vec3::new(0.0, self.camera_offset(config), 0.0)
    }

    fn shape(&self, config: &LocomotionConfig) -> BodyShape {
        BodyShape::for_stance(config, self.crouching)
    }

    /// Re-read speed constants after a config reload, keeping the crouch swap intact.
    pub fn rebase(&mut self, config: &LocomotionConfig) {
        if self.crouching {
            self.base_speed = config.crouch_speed;
            self.saved_base_speed = Some(config.base_speed);
        } else {
            self.base_speed = config.base_speed;
        }
        self.bunny_hop = self.bunny_hop.clamp(1.0, config.max_bunny_hop.max(1.0));
    }

    /// Start a jump if grounded, standing and the head has room.
    ///
    /// A running jump grows the bunny-hop multiplier up to its cap.
    pub fn try_jump(
        &mut self,
        pose: &CameraPose,
        run: bool,
        colliders: &ColliderRegistry,
        config: &LocomotionConfig,
    ) -> Result<(), JumpRefusal> {
        if !self.can_jump {
            return Err(JumpRefusal::NotGrounded);
        }
        if self.crouching {
            return Err(JumpRefusal::Crouching);
        }
        let resolver = CollisionResolver::new(colliders, self.shape(config));
        if let Some(hit) = resolver.head_blocked(self.feet(pose, config)) {
            return Err(JumpRefusal::HeadBlocked {
                collider: hit.index,
            });
        }

        self.vertical_velocity = config.jump_strength;
        self.can_jump = false;
        self.phase = Phase::Airborne;
        if run {
            self.bunny_hop = (self.bunny_hop * config.bunny_hop_growth).min(config.max_bunny_hop);
        }
        Ok(())
    }

    /// Toggle crouch. Standing up is refused while any part of the standing
    /// box above the floor skin overlaps a collider.
    pub fn toggle_crouch(
        &mut self,
        pose: &mut CameraPose,
        colliders: &ColliderRegistry,
        config: &LocomotionConfig,
    ) -> CrouchOutcome {
        if !self.crouching {
            self.crouching = true;
            pose.position.y += config.crouch_offset;
            self.saved_base_speed = Some(self.base_speed);
            self.base_speed = config.crouch_speed;
            return CrouchOutcome::Crouched;
        }

        let feet = self.feet(pose, config);
        let standing = CollisionResolver::new(colliders, BodyShape::standing(config));
        if let Some(hit) = standing.blocking(feet) {
            return CrouchOutcome::StandRefused(hit);
        }

        self.crouching = false;
        pose.position.y -= config.crouch_offset;
        self.base_speed = self.saved_base_speed.take().unwrap_or(config.base_speed);
        CrouchOutcome::Stood
    }

    /// Advance one frame: horizontal move with sliding, then gravity and
    /// floor/ceiling resolution.
    pub fn step(
        &mut self,
        pose: &mut CameraPose,
        input: &FrameInput,
        colliders: &ColliderRegistry,
        config: &LocomotionConfig,
        dt: f32,
    ) -> StepReport {
        let resolver = CollisionResolver::new(colliders, self.shape(config));
        let offset = self.camera_offset(config);
        let mut feet = self.feet(pose, config);

        let speed = self.speed(input.run, config);
        let displacement = pose.flat_forward() * input.movement.y * speed * dt
            + pose.flat_right() * input.movement.x * speed * dt;

        let slide = if displacement != Vec3::ZERO {
            let resolved = resolver.resolve_horizontal(feet, feet + displacement);
            feet = resolved.position;
            Some(resolved.kind)
        } else {
            None
        };

        let vertical = resolver.resolve_vertical(
            feet,
            self.vertical_velocity,
            dt,
            &VerticalParams::from_config(config),
        );
        feet.y = vertical.y;
        self.vertical_velocity = vertical.velocity;

        let mut bunny_hop_reset = false;
        if vertical.contact.is_grounded() {
            self.can_jump = true;
            self.phase = Phase::Grounded;
            if !input.directional {
                bunny_hop_reset = self.bunny_hop != 1.0;
                self.bunny_hop = 1.0;
            }
        } else {
            self.phase = Phase::Airborne;
        }

        pose.position = feet + Vec3::new(0.0, offset, 0.0);

        StepReport {
            slide,
            contact: vertical.contact,
            bunny_hop_reset,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::aabb::Aabb;

    const DT: f32 = 1.0 / 60.0;

    fn config() -> LocomotionConfig {
        LocomotionConfig::default()
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn moving(movement: Vec2, run: bool) -> FrameInput {
        FrameInput {
            movement,
            directional: movement != Vec2::ZERO,
            run,
            ..Default::default()
        }
    }

    fn plinth() -> ColliderRegistry {
        [Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 5.0, 10.0))]
            .into_iter()
            .collect()
    }

    fn settle(
        state: &mut LocomotionState,
        pose: &mut CameraPose,
        colliders: &ColliderRegistry,
        cfg: &LocomotionConfig,
    ) {
        for _ in 0..600 {
            state.step(pose, &idle(), colliders, cfg, DT);
            if state.phase == Phase::Grounded {
                return;
            }
        }
        panic!("never landed");
    }

    #[test]
    fn test_rest_on_collider_is_idempotent() {
        let cfg = config();
        let reg = plinth();
        let mut state = LocomotionState::new(&cfg);
        let mut pose = CameraPose::new(Vec3::new(5.0, 5.0, 5.0), 0.0, 0.0);

        for _ in 0..10 {
            let before = pose.position;
            let report = state.step(&mut pose, &idle(), &reg, &cfg, DT);
            assert_eq!(pose.position, before);
            assert!(state.can_jump);
            assert_eq!(state.vertical_velocity, 0.0);
            assert!(matches!(report.contact, VerticalContact::Floor(_)));
        }
    }

    #[test]
    fn test_rest_on_fallback_plane_is_idempotent() {
        let cfg = config();
        let reg = ColliderRegistry::new();
        let mut state = LocomotionState::new(&cfg);
        let mut pose = CameraPose::new(Vec3::new(0.0, cfg.ground_height, 0.0), 0.0, 0.0);
        state.step(&mut pose, &idle(), &reg, &cfg, DT);
        assert_eq!(pose.position.y, cfg.ground_height);
        assert!(state.can_jump);
        assert_eq!(state.phase, Phase::Grounded);
    }

    #[test]
    fn test_diagonal_not_faster_than_forward() {
        let cfg = config();
        let reg = ColliderRegistry::new();
        let start = Vec3::new(0.0, cfg.ground_height, 0.0);

        let mut s1 = LocomotionState::new(&cfg);
        let mut straight = CameraPose::new(start, 0.3, 0.0);
        s1.step(&mut straight, &moving(Vec2::new(0.0, 1.0), false), &reg, &cfg, DT);

        let mut input = crate::input::InputState::new();
        input.press(crate::input::Action::Forward);
        input.press(crate::input::Action::Right);
        let diagonal_input = input.sample();

        let mut s2 = LocomotionState::new(&cfg);
        let mut diagonal = CameraPose::new(start, 0.3, 0.0);
        s2.step(&mut diagonal, &diagonal_input, &reg, &cfg, DT);

        let d1 = (straight.position - start).length();
        let d2 = (diagonal.position - start).length();
        assert!((d1 - cfg.base_speed * DT).abs() < 1e-5);
        assert!((d1 - d2).abs() < 1e-5);
    }

    #[test]
    fn test_bunny_hop_capped_and_reset_on_idle_landing() {
        let cfg = config();
        let reg = ColliderRegistry::new();
        let mut state = LocomotionState::new(&cfg);
        let mut pose = CameraPose::new(Vec3::new(0.0, cfg.ground_height, 0.0), 0.0, 0.0);
        let running = moving(Vec2::new(0.0, 1.0), true);

        for _ in 0..40 {
            state.try_jump(&pose, true, &reg, &cfg).unwrap();
            assert!(state.bunny_hop <= cfg.max_bunny_hop);
            // Land while still holding a direction: multiplier is kept.
            for _ in 0..600 {
                state.step(&mut pose, &running, &reg, &cfg, DT);
                if state.can_jump {
                    break;
                }
            }
            assert!(state.can_jump);
        }
        assert_eq!(state.bunny_hop, cfg.max_bunny_hop);

        state.try_jump(&pose, true, &reg, &cfg).unwrap();
        settle(&mut state, &mut pose, &reg, &cfg);
        assert_eq!(state.bunny_hop, 1.0);
    }

    #[test]
    fn test_walking_jump_does_not_grow_multiplier() {
        let cfg = config();
        let reg = ColliderRegistry::new();
        let mut state = LocomotionState::new(&cfg);
        let pose = CameraPose::new(Vec3::new(0.0, cfg.ground_height, 0.0), 0.0, 0.0);
        state.try_jump(&pose, false, &reg, &cfg).unwrap();
        assert_eq!(state.bunny_hop, 1.0);
        assert_eq!(state.vertical_velocity, cfg.jump_strength);
        assert!(!state.can_jump);
        assert_eq!(
            state.try_jump(&pose, false, &reg, &cfg),
            Err(JumpRefusal::NotGrounded)
        );
    }

    #[test]
    fn test_jump_refused_when_head_blocked() {
        let cfg = config();
        // Slab overlapping the top of the standing box at feet y = 0.
        let reg: ColliderRegistry = [Aabb::new(Vec3::new(-1.0, 1.7, -1.0), Vec3::new(1.0, 2.5, 1.0))]
            .into_iter()
            .collect();
        let mut state = LocomotionState::new(&cfg);
        let pose = CameraPose::new(Vec3::ZERO, 0.0, 0.0);

        let result = state.try_jump(&pose, true, &reg, &cfg);
        assert_eq!(result, Err(JumpRefusal::HeadBlocked { collider: 0 }));
        assert_eq!(state.vertical_velocity, 0.0);
        assert!(state.can_jump);
        assert_eq!(state.bunny_hop, 1.0);
    }

    #[test]
    fn test_jump_refused_while_crouching() {
        let cfg = config();
        let reg = ColliderRegistry::new();
        let mut state = LocomotionState::new(&cfg);
        let mut pose = CameraPose::new(Vec3::new(0.0, cfg.ground_height, 0.0), 0.0, 0.0);
        state.toggle_crouch(&mut pose, &reg, &cfg);
        assert_eq!(state.try_jump(&pose, false, &reg, &cfg), Err(JumpRefusal::Crouching));
    }

    #[test]
    fn test_fallback_floor_from_height() {
        let cfg = config();
        let reg = ColliderRegistry::new();
        let mut state = LocomotionState::new(&cfg);
        state.can_jump = false;
        let mut pose = CameraPose::new(Vec3::new(0.0, cfg.ground_height + 12.0, 0.0), 0.0, 0.0);

        let mut landed_on = None;
        for tick in 0..600 {
            assert!(!state.can_jump);
            let report = state.step(&mut pose, &idle(), &reg, &cfg, DT);
            if pose.position.y <= cfg.ground_height {
                assert_eq!(report.contact, VerticalContact::FallbackPlane);
                assert!(state.can_jump);
                landed_on = Some(tick);
                break;
            }
            assert!(!state.can_jump);
        }
        assert!(landed_on.is_some());
        assert_eq!(pose.position.y, cfg.ground_height);
        assert_eq!(state.vertical_velocity, 0.0);
    }

    #[test]
    fn test_fallback_floor_while_crouching() {
        let cfg = config();
        let reg = ColliderRegistry::new();
        let mut state = LocomotionState::new(&cfg);
        let mut pose = CameraPose::new(Vec3::new(0.0, cfg.ground_height + 3.0, 0.0), 0.0, 0.0);
        state.toggle_crouch(&mut pose, &reg, &cfg);
        settle(&mut state, &mut pose, &reg, &cfg);
        assert!((pose.position.y - (cfg.ground_height + cfg.crouch_offset)).abs() < 1e-5);
        assert_eq!(state.status(), MotionState::CrouchedGrounded);
    }

    #[test]
    fn test_lands_on_box_when_dropped_above_it() {
        let cfg = config();
        let reg = plinth();
        let mut state = LocomotionState::new(&cfg);
        state.can_jump = false;
        let mut pose = CameraPose::new(Vec3::new(5.0, 10.0, 5.0), 0.0, 0.0);
        settle(&mut state, &mut pose, &reg, &cfg);
        assert_eq!(pose.position.y, 5.0);
        assert_eq!(state.vertical_velocity, 0.0);
        assert!(state.can_jump);
    }

    #[test]
    fn test_runs_off_start_and_lands_on_box() {
        // Dropped at (5, 10, -5), beside the box, running towards +Z.
        let cfg = config();
        let reg = plinth();
        let mut state = LocomotionState::new(&cfg);
        state.can_jump = false;
        let mut pose = CameraPose::new(Vec3::new(5.0, 10.0, -5.0), std::f32::consts::PI, 0.0);
        let run = moving(Vec2::new(0.0, 1.0), true);

        let mut landed = false;
        for _ in 0..120 {
            let report = state.step(&mut pose, &run, &reg, &cfg, DT);
            if let VerticalContact::Floor(hit) = report.contact {
                assert_eq!(hit.index, 0);
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert_eq!(pose.position.y, 5.0);
        assert_eq!(state.vertical_velocity, 0.0);
        assert!(state.can_jump);

        // Stop and stay put.
        let rest = pose.position;
        state.step(&mut pose, &idle(), &reg, &cfg, DT);
        assert_eq!(pose.position, rest);
    }

    #[test]
    fn test_crouch_lowers_camera_and_slows() {
        let cfg = config();
        let reg = ColliderRegistry::new();
        let mut state = LocomotionState::new(&cfg);
        let mut pose = CameraPose::new(Vec3::new(0.0, cfg.ground_height, 0.0), 0.0, 0.0);

        assert_eq!(state.toggle_crouch(&mut pose, &reg, &cfg), CrouchOutcome::Crouched);
        assert!((pose.position.y - (cfg.ground_height + cfg.crouch_offset)).abs() < 1e-5);
        assert_eq!(state.speed(false, &cfg), cfg.crouch_speed);

        assert_eq!(state.toggle_crouch(&mut pose, &reg, &cfg), CrouchOutcome::Stood);
        assert!((pose.position.y - cfg.ground_height).abs() < 1e-5);
        assert_eq!(state.speed(false, &cfg), cfg.base_speed);
    }

    #[test]
    fn test_stand_refused_under_low_ceiling() {
        let cfg = config();
        let reg: ColliderRegistry = [Aabb::new(Vec3::new(-2.0, 1.4, -2.0), Vec3::new(2.0, 3.0, 2.0))]
            .into_iter()
            .collect();
        let mut state = LocomotionState::new(&cfg);
        let mut pose = CameraPose::new(Vec3::new(0.0, 0.0, 5.0), 0.0, 0.0);
        state.toggle_crouch(&mut pose, &reg, &cfg);
        // Duck under the ceiling.
        pose.position.z = 0.0;
        let crouched_y = pose.position.y;

        match state.toggle_crouch(&mut pose, &reg, &cfg) {
            CrouchOutcome::StandRefused(hit) => assert_eq!(hit.index, 0),
            other => panic!("expected refusal, got {:?}", other),
        }
        assert!(state.crouching);
        assert_eq!(pose.position.y, crouched_y);
        assert_eq!(state.speed(false, &cfg), cfg.crouch_speed);
    }

    #[test]
    fn test_stand_refused_under_beam_below_head() {
        let cfg = config();
        let mut state = LocomotionState::new(&cfg);
        let mut pose = CameraPose::new(Vec3::new(0.0, cfg.ground_height, 0.0), 0.0, 0.0);
        state.toggle_crouch(&mut pose, &ColliderRegistry::new(), &cfg);

        // Chest-high beam: clear of the head band, inside the standing box.
        let ground = cfg.ground_height;
        let reg: ColliderRegistry = [Aabb::new(
            Vec3::new(-2.0, ground + 1.2, -2.0),
            Vec3::new(2.0, ground + 1.4, 2.0),
        )]
        .into_iter()
        .collect();
        match state.toggle_crouch(&mut pose, &reg, &cfg) {
            CrouchOutcome::StandRefused(hit) => assert_eq!(hit.index, 0),
            other => panic!("expected refusal, got {:?}", other),
        }
        assert!(state.crouching);
        assert!((pose.position.y - (ground + cfg.crouch_offset)).abs() < 1e-5);
    }

    #[test]
    fn test_status_variants() {
        let cfg = config();
        let mut state = LocomotionState::new(&cfg);
        assert_eq!(state.status(), MotionState::Airborne);
        state.phase = Phase::Grounded;
        assert_eq!(state.status(), MotionState::Grounded);
        state.crouching = true;
        assert_eq!(state.status(), MotionState::CrouchedGrounded);
        state.phase = Phase::Airborne;
        assert_eq!(state.status(), MotionState::CrouchedAirborne);
    }
}
