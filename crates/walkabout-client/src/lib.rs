//! Platform side of walkabout: winit input mapping, project and scene files,
//! hot reload, the turntable orbit camera, headless replay and the viewer.

pub mod cli;
pub mod input;
pub mod orbit;
pub mod project_config;
pub mod replay;
pub mod scene;
pub mod viewer;
pub mod watcher;
