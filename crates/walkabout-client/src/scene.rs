use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use walkabout_core::{Aabb, FrameDriver};

#[derive(Debug)]
pub enum SceneError {
    Io(std::io::Error),
    Parse(serde_yaml::Error),
    /// A collider with a non-finite coordinate. Carries the collider's label.
    InvalidCollider(String),
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Parse(e) => write!(f, "YAML parse error: {}", e),
            Self::InvalidCollider(name) => write!(f, "Collider '{}' has a non-finite coordinate", name),
        }
    }
}

impl std::error::Error for SceneError {}

// --- Serde types for the scene YAML ---

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SceneFile {
    #[serde(default)]
    pub name: String,
    /// First-person spawn override.
    pub spawn: Option<[f32; 3]>,
    #[serde(default)]
    pub colliders: Vec<ColliderDef>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColliderDef {
    pub name: Option<String>,
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl ColliderDef {
    fn label(&self, index: usize) -> String {
        self.name.clone().unwrap_or_else(|| format!("#{}", index))
    }
}

impl SceneFile {
    /// World-space boxes in file order, before the registration margin.
    ///
    /// Inverted boxes are normalized with a warning; zero-volume boxes pass
    /// through unchanged.
    pub fn boxes(&self) -> Result<Vec<Aabb>, SceneError> {
        self.colliders
            .iter()
            .enumerate()
            .map(|(i, def)| {
                let bounds = Aabb::new(Vec3::from(def.min), Vec3::from(def.max));
                if !bounds.min.is_finite() || !bounds.max.is_finite() {
                    return Err(SceneError::InvalidCollider(def.label(i)));
                }
                if bounds.is_inverted() {
                    tracing::warn!("Collider {} has min > max; swapping corners", def.label(i));
                    return Ok(bounds.normalized());
                }
                Ok(bounds)
            })
            .collect()
    }

    pub fn spawn(&self) -> Option<Vec3> {
        self.spawn.map(Vec3::from)
    }
}

pub fn parse_scene(contents: &str) -> Result<SceneFile, SceneError> {
    serde_yaml::from_str(contents).map_err(SceneError::Parse)
}

pub fn load_scene(path: &Path) -> Result<SceneFile, SceneError> {
    let contents = std::fs::read_to_string(path).map_err(SceneError::Io)?;
    parse_scene(&contents)
}

/// Replace the driver's colliders and spawn with the scene's. A scene
/// without a spawn falls back to the configured one. On error the driver
/// is left untouched.
pub fn apply_scene(driver: &mut FrameDriver, scene: &SceneFile) -> Result<(), SceneError> {
    let boxes = scene.boxes()?;
    tracing::info!("Scene '{}': {} colliders", scene.name, boxes.len());
    driver.replace_colliders(boxes);
    let spawn = scene.spawn().unwrap_or_else(|| driver.config().spawn_position());
    driver.set_spawn(spawn);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use walkabout_core::{CameraMode, LocomotionConfig};

    use crate::orbit::TurntableOrbit;

    const SCENE: &str = r#"
name: courtyard
spawn: [1.0, -17.0, 2.0]
colliders:
  - name: plinth
    min: [0, 0, 0]
    max: [10, 5, 10]
  - min: [4, 1, 4]
    max: [2, 3, 6]
"#;

    #[test]
    fn test_parse_scene() {
        let scene = parse_scene(SCENE).unwrap();
        assert_eq!(scene.name, "courtyard");
        assert_eq!(scene.colliders.len(), 2);
        assert_eq!(scene.spawn(), Some(Vec3::new(1.0, -17.0, 2.0)));
    }

    #[test]
    fn test_inverted_collider_is_normalized() {
        let boxes = parse_scene(SCENE).unwrap().boxes().unwrap();
        assert_eq!(boxes[1].min, Vec3::new(2.0, 1.0, 4.0));
        assert_eq!(boxes[1].max, Vec3::new(4.0, 3.0, 6.0));
    }

    #[test]
    fn test_empty_scene_is_valid() {
        let scene = parse_scene("name: void\n").unwrap();
        assert!(scene.boxes().unwrap().is_empty());
        assert_eq!(scene.spawn(), None);
    }

    #[test]
    fn test_non_finite_collider_is_rejected() {
        let scene = SceneFile {
            name: "bad".into(),
            spawn: None,
            colliders: vec![ColliderDef {
                name: Some("nan".into()),
                min: [0.0, f32::NAN, 0.0],
                max: [1.0, 1.0, 1.0],
            }],
        };
        assert!(matches!(scene.boxes(), Err(SceneError::InvalidCollider(n)) if n == "nan"));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(parse_scene("colliders: 12"), Err(SceneError::Parse(_))));
    }

    #[test]
    fn test_apply_scene_adds_margin_and_spawn() {
        let mut driver = FrameDriver::new(
            LocomotionConfig::default(),
            Box::new(TurntableOrbit::default()),
            CameraMode::Orbit,
        );
        apply_scene(&mut driver, &parse_scene(SCENE).unwrap()).unwrap();
        assert_eq!(driver.colliders.len(), 2);
        let plinth = driver.colliders.get(0).copied().unwrap();
        assert!((plinth.max.y - 5.05).abs() < 1e-5);
        assert_eq!(driver.spawn(), Vec3::new(1.0, -17.0, 2.0));

        // Reloading replaces rather than appends.
        apply_scene(&mut driver, &parse_scene(SCENE).unwrap()).unwrap();
        assert_eq!(driver.colliders.len(), 2);
    }

    #[test]
    fn test_scene_without_spawn_restores_config_spawn() {
        let mut driver = FrameDriver::new(
            LocomotionConfig::default(),
            Box::new(TurntableOrbit::default()),
            CameraMode::Orbit,
        );
        apply_scene(&mut driver, &parse_scene(SCENE).unwrap()).unwrap();
        assert_eq!(driver.spawn(), Vec3::new(1.0, -17.0, 2.0));

        let bare = parse_scene("name: bare\ncolliders: []\n").unwrap();
        apply_scene(&mut driver, &bare).unwrap();
        assert_eq!(driver.spawn(), driver.config().spawn_position());
        assert!(driver.colliders.is_empty());
    }
}
