//! Headless replay runner for deterministic locomotion checks.
//!
//! Feeds a scripted input sequence through a [`FrameDriver`] at a fixed
//! timestep and reports where the player ended up. No window required.

use std::collections::BTreeMap;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use walkabout_core::{Action, CameraMode, CameraPose, FrameDriver, HudState, LocomotionConfig, NoCapture};

use crate::orbit::TurntableOrbit;
use crate::scene::{self, SceneError, SceneFile};

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayScript {
    #[serde(default = "default_dt")]
    pub dt: f32,
    #[serde(default = "default_start_mode")]
    pub start_mode: CameraMode,
    #[serde(default)]
    pub steps: Vec<ReplayStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayStep {
    #[serde(default = "default_frames")]
    pub frames: u32,
    /// Held for the whole step, released afterwards.
    #[serde(default)]
    pub hold: Vec<Action>,
    /// Pressed before the step's first frame and released after its last.
    #[serde(default)]
    pub press: Vec<Action>,
    /// Look delta added every frame, radians.
    pub look: Option<[f32; 2]>,
    /// Joystick vector held for the step.
    pub joystick: Option<[f32; 2]>,
}

fn default_dt() -> f32 {
    1.0 / 60.0
}

fn default_start_mode() -> CameraMode {
    CameraMode::FirstPerson
}

fn default_frames() -> u32 {
    1
}

#[derive(Debug)]
pub enum ReplayError {
    Io(std::io::Error),
    Parse(serde_yaml::Error),
    Scene(SceneError),
}

impl std::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplayError::Io(e) => write!(f, "IO error reading replay script: {}", e),
            ReplayError::Parse(e) => write!(f, "Failed to parse replay script: {}", e),
            ReplayError::Scene(e) => write!(f, "Failed to load scene: {}", e),
        }
    }
}

impl std::error::Error for ReplayError {}

impl From<SceneError> for ReplayError {
    fn from(e: SceneError) -> Self {
        ReplayError::Scene(e)
    }
}

pub fn parse_script(contents: &str) -> Result<ReplayScript, ReplayError> {
    serde_yaml::from_str(contents).map_err(ReplayError::Parse)
}

pub fn load_script(path: &Path) -> Result<ReplayScript, ReplayError> {
    let contents = std::fs::read_to_string(path).map_err(ReplayError::Io)?;
    parse_script(&contents)
}

/// Final state after a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub frames: u64,
    pub pose: CameraPose,
    pub hud: HudState,
    pub vertical_velocity: f32,
    pub collider_count: usize,
    /// Logged events by type, including ones evicted from the ring buffer's window.
    pub event_counts: BTreeMap<String, usize>,
}

/// Owns a driver and steps it at a fixed dt.
pub struct ReplayRunner {
    pub driver: FrameDriver,
    pub dt: f32,
    event_counts: BTreeMap<String, usize>,
    seen_events: u64,
}

impl ReplayRunner {
    pub fn new(config: LocomotionConfig, start_mode: CameraMode, dt: f32) -> Self {
        Self {
            driver: FrameDriver::new(config, Box::new(TurntableOrbit::default()), start_mode),
            dt,
            event_counts: BTreeMap::new(),
            seen_events: 0,
        }
    }

    /// Load colliders and spawn. A first-person run restarts at the scene's spawn.
    pub fn load_scene(&mut self, scene: &SceneFile) -> Result<(), ReplayError> {
        scene::apply_scene(&mut self.driver, scene)?;
        if self.driver.mode() == CameraMode::FirstPerson {
            self.driver.place_feet(self.driver.spawn());
        }
        Ok(())
    }

    pub fn run_step(&mut self, step: &ReplayStep) {
        let input = &mut self.driver.input;
        for action in &step.hold {
            input.press(*action);
        }
        for action in &step.press {
            input.press(*action);
        }
        if let Some(stick) = step.joystick {
            input.set_joystick(Vec2::from(stick));
        }

        for _ in 0..step.frames {
            if let Some(look) = step.look {
                self.driver.input.add_look(Vec2::from(look));
            }
            self.driver.tick(self.dt, &mut NoCapture);
            self.collect_events();
        }

        let input = &mut self.driver.input;
        for action in step.hold.iter().chain(&step.press) {
            input.release(*action);
        }
        if step.joystick.is_some() {
            input.set_joystick(Vec2::ZERO);
        }
    }

    fn collect_events(&mut self) {
        let log = self.driver.events();
        let fresh = (log.total() - self.seen_events) as usize;
        for logged in log.recent().rev().take(fresh) {
            *self.event_counts.entry(logged.event.kind().to_string()).or_insert(0) += 1;
        }
        self.seen_events = log.total();
    }

    pub fn report(&self) -> ReplayReport {
        let snapshot = self.driver.snapshot();
        ReplayReport {
            frames: snapshot.frame,
            pose: snapshot.pose,
            hud: snapshot.hud,
            vertical_velocity: snapshot.vertical_velocity,
            collider_count: snapshot.collider_count,
            event_counts: self.event_counts.clone(),
        }
    }
}

/// Run `script` against an optional scene and return the final report.
pub fn run(script: &ReplayScript, config: LocomotionConfig, scene: Option<&SceneFile>) -> Result<ReplayReport, ReplayError> {
    let mut runner = ReplayRunner::new(config, script.start_mode, script.dt);
    if let Some(scene) = scene {
        runner.load_scene(scene)?;
    }
    tracing::info!("Replaying {} steps at dt={}", script.steps.len(), script.dt);
    for step in &script.steps {
        runner.run_step(step);
    }
    Ok(runner.report())
}
