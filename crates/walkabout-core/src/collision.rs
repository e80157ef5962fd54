//! Box-vs-box collision for the first-person player.
//!
//! All positions here are feet positions: the player box spans from `y` to
//! `y + height`, centered on x/z. Three checks exist:
//!
//! * sideways ([`CollisionResolver::is_blocked`]): the full body box, minus a
//!   thin floor skin so the surface being stood on does not count;
//! * vertical ([`CollisionResolver::vertical_blocked`]): for `Up` the body box
//!   itself, for `Down` a body-sized box centered on the feet;
//! * head clearance ([`CollisionResolver::head_blocked`]): a thin slab at the
//!   top of the body, used to gate jumping and standing up.

use glam::Vec3;

use crate::aabb::Aabb;
use crate::colliders::{ColliderHit, ColliderRegistry};
use crate::config::LocomotionConfig;
use crate::events::SlideKind;

/// Player box dimensions for the current stance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyShape {
    pub size: Vec3,
    pub head_check_height: f32,
    pub floor_skin: f32,
}

impl BodyShape {
    pub fn standing(config: &LocomotionConfig) -> Self {
        Self {
            size: config.capsule_size(),
            head_check_height: config.head_check_height,
            floor_skin: config.floor_skin,
        }
    }

    /// Standing box shortened by the crouch offset.
    pub fn crouched(config: &LocomotionConfig) -> Self {
        let mut shape = Self::standing(config);
        shape.size.y = (shape.size.y + config.crouch_offset).max(0.0);
        shape
    }

    pub fn for_stance(config: &LocomotionConfig, crouched: bool) -> Self {
        if crouched {
            Self::crouched(config)
        } else {
            Self::standing(config)
        }
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    /// Full body box standing at `feet`.
    pub fn body_box(&self, feet: Vec3) -> Aabb {
        Aabb::from_center_size(feet + Vec3::new(0.0, self.size.y * 0.5, 0.0), self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalDir {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalResolution {
    pub position: Vec3,
    pub kind: SlideKind,
}

/// What the vertical pass ran into, if anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerticalContact {
    None,
    Floor(ColliderHit),
    Ceiling(ColliderHit),
    /// Clamped to the ground-height plane.
    FallbackPlane,
}

impl VerticalContact {
    pub fn is_grounded(&self) -> bool {
        matches!(self, VerticalContact::Floor(_) | VerticalContact::FallbackPlane)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalResolution {
    pub y: f32,
    pub velocity: f32,
    pub contact: VerticalContact,
}

/// Constants the vertical pass needs beyond the body shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalParams {
    pub gravity: f32,
    /// Fallback floor for the feet.
    pub ground_height: f32,
    pub ceiling_epsilon: f32,
}

impl VerticalParams {
    pub fn from_config(config: &LocomotionConfig) -> Self {
        Self {
            gravity: config.gravity,
            ground_height: config.ground_height,
            ceiling_epsilon: config.ceiling_epsilon,
        }
    }
}

/// Read-only view over the registry for one body shape.
pub struct CollisionResolver<'a> {
    colliders: &'a ColliderRegistry,
    shape: BodyShape,
}

impl<'a> CollisionResolver<'a> {
    pub fn new(colliders: &'a ColliderRegistry, shape: BodyShape) -> Self {
        Self { colliders, shape }
    }

    pub fn shape(&self) -> &BodyShape {
        &self.shape
    }

    /// First collider overlapping the body at `feet`, ignoring the floor skin.
    pub fn blocking(&self, feet: Vec3) -> Option<ColliderHit> {
        let height = self.shape.size.y;
        let skin = self.shape.floor_skin.max(0.0).min(height);
        let mut test = self.shape.body_box(feet);
        test.min.y = feet.y + skin;
        test.max.y = feet.y + height;
        self.colliders.query_intersecting(&test)
    }

    pub fn is_blocked(&self, feet: Vec3) -> bool {
        self.blocking(feet).is_some()
    }

    pub fn vertical_blocked(&self, feet: Vec3, dir: VerticalDir) -> Option<ColliderHit> {
        let half = self.shape.size.y * 0.5;
        let center_y = match dir {
            VerticalDir::Up => feet.y + half,
            VerticalDir::Down => feet.y,
        };
        let test = Aabb::from_center_size(Vec3::new(feet.x, center_y, feet.z), self.shape.size);
        self.colliders.query_intersecting(&test)
    }

    /// Thin slab at the top of the body.
    pub fn head_blocked(&self, feet: Vec3) -> Option<ColliderHit> {
        let slab = self.shape.head_check_height;
        let center_y = feet.y + self.shape.size.y - slab * 0.5;
        let size = Vec3::new(self.shape.size.x, slab, self.shape.size.z);
        let test = Aabb::from_center_size(Vec3::new(feet.x, center_y, feet.z), size);
        self.colliders.query_intersecting(&test)
    }

    /// Try the full move, then X only, then Z only, else stay put.
    ///
    /// X is tried before Z, which decides the slide direction at corners.
    pub fn resolve_horizontal(&self, current: Vec3, desired: Vec3) -> HorizontalResolution {
        if !self.is_blocked(desired) {
            return HorizontalResolution {
                position: desired,
                kind: SlideKind::Free,
            };
        }

        let along_x = Vec3::new(desired.x, current.y, current.z);
        if !self.is_blocked(along_x) {
            return HorizontalResolution {
                position: along_x,
                kind: SlideKind::AlongX,
            };
        }

        let along_z = Vec3::new(current.x, current.y, desired.z);
        if !self.is_blocked(along_z) {
            return HorizontalResolution {
                position: along_z,
                kind: SlideKind::AlongZ,
            };
        }

        HorizontalResolution {
            position: current,
            kind: SlideKind::Blocked,
        }
    }

    /// Integrate gravity and settle against floors, ceilings and the fallback plane.
    ///
    /// Only a strictly positive velocity takes the upward branch; zero is
    /// treated as falling.
    pub fn resolve_vertical(
        &self,
        feet: Vec3,
        velocity: f32,
        dt: f32,
        params: &VerticalParams,
    ) -> VerticalResolution {
        let mut velocity = velocity + params.gravity * dt;
        let next_y = feet.y + velocity * dt;
        let candidate = Vec3::new(feet.x, next_y, feet.z);

        let mut y = next_y;
        let mut contact = VerticalContact::None;

        if velocity > 0.0 {
            if let Some(hit) = self.vertical_blocked(candidate, VerticalDir::Up) {
                velocity = 0.0;
                // Subtracting epsilon leaves the head just below min.y, outside the collider.
                y = hit.bounds.min.y - self.shape.size.y - params.ceiling_epsilon;
                contact = VerticalContact::Ceiling(hit);
            }
        } else if let Some(hit) = self.vertical_blocked(candidate, VerticalDir::Down) {
            velocity = 0.0;
            y = hit.bounds.max.y;
            contact = VerticalContact::Floor(hit);
        }

        if y <= params.ground_height {
            y = params.ground_height;
            velocity = 0.0;
            contact = VerticalContact::FallbackPlane;
        }

        VerticalResolution {
            y,
            velocity,
            contact,
        }
    }
}
