//! Walkabout core: collider boxes, input state, box collision and
//! first-person locomotion for a walkthrough viewer.
//!
//! Nothing here touches a window or the filesystem. Platform adapters feed
//! [`input::InputState`] and read the camera pose back from
//! [`frame::FrameDriver`].

pub mod aabb;
pub mod camera;
pub mod colliders;
pub mod collision;
pub mod config;
pub mod debug;
pub mod events;
pub mod frame;
pub mod input;
pub mod locomotion;
pub mod mode;

pub use aabb::Aabb;
pub use camera::CameraPose;
pub use colliders::{ColliderHit, ColliderRegistry};
pub use config::LocomotionConfig;
pub use debug::{DebugCommand, Snapshot};
pub use events::{EventLog, LocomotionEvent};
pub use frame::{FrameDriver, HudState, PoseSink};
pub use input::{Action, FrameInput, InputState};
pub use locomotion::{LocomotionState, MotionState};
pub use mode::{CameraMode, NoCapture, OrbitController, PointerCapture};
