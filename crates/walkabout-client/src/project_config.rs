//! walkabout.yaml project configuration parsing.
//!
//! Reads a project's `walkabout.yaml` and merges it with command-line
//! overrides into the settings the viewer and replay runner start from.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use walkabout_core::{CameraMode, LocomotionConfig};

use crate::cli::CliArgs;

pub const CONFIG_FILE_NAME: &str = "walkabout.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct ViewerConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Scene file, relative to the project root.
    pub scene: Option<String>,
    /// Input bindings file, relative to the project root.
    pub bindings: Option<String>,
    #[serde(default)]
    pub start_mode: CameraMode,
    #[serde(default)]
    pub sensitivity: Sensitivity,
    /// Drag distance in pixels that maps to a full joystick deflection.
    #[serde(default = "default_joystick_radius")]
    pub joystick_radius: f32,
    #[serde(default)]
    pub locomotion: LocomotionConfig,
}

/// Look sensitivities in radians per pixel.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Sensitivity {
    #[serde(default = "default_mouse_sensitivity")]
    pub mouse: f32,
    #[serde(default = "default_touch_sensitivity")]
    pub touch: f32,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self {
            mouse: default_mouse_sensitivity(),
            touch: default_touch_sensitivity(),
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            scene: None,
            bindings: None,
            start_mode: CameraMode::default(),
            sensitivity: Sensitivity::default(),
            joystick_radius: default_joystick_radius(),
            locomotion: LocomotionConfig::default(),
        }
    }
}

fn default_name() -> String {
    "walkabout".to_string()
}

fn default_mouse_sensitivity() -> f32 {
    0.002
}

fn default_touch_sensitivity() -> f32 {
    0.005
}

fn default_joystick_radius() -> f32 {
    60.0
}

#[derive(Debug)]
pub enum ConfigError {
    NotFound,
    Io(std::io::Error),
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound => write!(f, "{} not found", CONFIG_FILE_NAME),
            ConfigError::Io(e) => write!(f, "IO error reading {}: {}", CONFIG_FILE_NAME, e),
            ConfigError::Parse(e) => write!(f, "Failed to parse {}: {}", CONFIG_FILE_NAME, e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Walk up from `start_dir` looking for `walkabout.yaml`.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = start_dir.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Load and parse a `walkabout.yaml` file.
pub fn load_config(path: &Path) -> Result<ViewerConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }
    let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<ViewerConfig, ConfigError> {
    // An empty file is a valid all-defaults project.
    if contents.trim().is_empty() {
        return Ok(ViewerConfig::default());
    }
    serde_yaml::from_str(contents).map_err(ConfigError::Parse)
}

/// Config plus the paths it resolves to.
#[derive(Debug, Clone)]
pub struct ViewerSettings {
    pub project_root: PathBuf,
    /// `None` when running on defaults without a project file.
    pub config_path: Option<PathBuf>,
    pub scene_path: Option<PathBuf>,
    pub bindings_path: Option<PathBuf>,
    pub config: ViewerConfig,
}

impl ViewerSettings {
    /// Settings rooted at `project_root` with no project file.
    pub fn defaults(project_root: &Path) -> Self {
        Self::from_config(ViewerConfig::default(), project_root, None)
    }

    pub fn from_config(config: ViewerConfig, project_root: &Path, config_path: Option<PathBuf>) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            scene_path: config.scene.as_ref().map(|s| project_root.join(s)),
            bindings_path: config.bindings.as_ref().map(|b| project_root.join(b)),
            config_path,
            config,
        }
    }

    /// Re-read the project file in place. Paths keep pointing at the files
    /// already being watched.
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        let path = self.config_path.as_ref().ok_or(ConfigError::NotFound)?;
        self.config = load_config(path)?;
        Ok(())
    }
}

/// Resolve settings for this run: an explicit `--config`, else a
/// `walkabout.yaml` found upward from `cwd`, else defaults. `--scene`
/// overrides the project's scene.
pub fn resolve(args: &CliArgs, cwd: &Path) -> Result<ViewerSettings, ConfigError> {
    let config_path = match &args.config {
        Some(explicit) => Some(cwd.join(explicit)),
        None => find_config(cwd),
    };

    let mut settings = match config_path {
        Some(path) => {
            let config = load_config(&path)?;
            let root = path.parent().map(Path::to_path_buf).unwrap_or_else(|| cwd.to_path_buf());
            tracing::info!("Loaded project: {} ({:?})", config.name, path);
            ViewerSettings::from_config(config, &root, Some(path))
        }
        None => {
            tracing::info!("No {} found; using defaults", CONFIG_FILE_NAME);
            ViewerSettings::defaults(cwd)
        }
    };

    // CLI scene override takes priority
    if let Some(scene) = &args.scene {
        settings.scene_path = Some(cwd.join(scene));
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
name: courtyard
scene: scenes/court.yaml
bindings: input/bindings.yaml
start_mode: first_person
sensitivity:
  mouse: 0.003
joystick_radius: 80
locomotion:
  gravity: -9.81
  run_speed: 10
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.name, "courtyard");
        assert_eq!(config.start_mode, CameraMode::FirstPerson);
        assert!((config.sensitivity.mouse - 0.003).abs() < 1e-6);
        assert!((config.sensitivity.touch - 0.005).abs() < 1e-6);
        assert!((config.joystick_radius - 80.0).abs() < 1e-6);
        assert!((config.locomotion.gravity + 9.81).abs() < 1e-6);
        assert!((config.locomotion.base_speed - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_config_is_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.start_mode, CameraMode::Orbit);
        assert_eq!(config.locomotion, LocomotionConfig::default());
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("start_mode: sideways").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = load_config(Path::new("/nonexistent/walkabout.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound));
    }

    #[test]
    fn test_find_config_walks_up() {
        let root = std::env::temp_dir().join(format!("walkabout-find-{}", std::process::id()));
        let nested = root.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join(CONFIG_FILE_NAME), "name: up\n").unwrap();

        assert_eq!(find_config(&nested), Some(root.join(CONFIG_FILE_NAME)));

        let args = CliArgs::parse_from(["walkabout", "--scene", "other.yaml"]);
        let settings = resolve(&args, &nested).unwrap();
        assert_eq!(settings.config.name, "up");
        assert_eq!(settings.project_root, root);
        assert_eq!(settings.scene_path, Some(nested.join("other.yaml")));

        std::fs::remove_dir_all(&root).unwrap();
    }
}
