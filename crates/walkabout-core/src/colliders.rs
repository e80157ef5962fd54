//! Flat registry of solid scene geometry, one world-space box per collider.
//!
//! Queries are a linear scan in insertion order. When several boxes overlap
//! the query, the earliest registered one is reported, so results are stable
//! for a fixed registry and query.

use glam::Vec3;

use crate::aabb::Aabb;

/// A registered box together with its insertion index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderHit {
    pub index: usize,
    pub bounds: Aabb,
}

#[derive(Debug, Clone, Default)]
pub struct ColliderRegistry {
    boxes: Vec<Aabb>,
}

impl ColliderRegistry {
    pub fn new() -> Self {
        Self { boxes: Vec::new() }
    }

    /// Append a box. Degenerate boxes are accepted as-is.
    pub fn register(&mut self, bounds: Aabb) -> usize {
        self.boxes.push(bounds);
        self.boxes.len() - 1
    }

    /// Register a box derived from mesh bounds, grown by `margin` on every face.
    pub fn register_with_margin(&mut self, bounds: Aabb, margin: f32) -> usize {
        self.register(bounds.expanded(margin))
    }

    /// First registered box intersecting `test`, if any.
    pub fn query_intersecting(&self, test: &Aabb) -> Option<ColliderHit> {
        self.boxes
            .iter()
            .enumerate()
            .find(|(_, b)| b.intersects(test))
            .map(|(index, bounds)| ColliderHit {
                index,
                bounds: *bounds,
            })
    }

    /// Shift every box vertically. Used by debug tooling to line colliders up with the mesh.
    pub fn shift_all_y(&mut self, delta: f32) {
        let offset = Vec3::new(0.0, delta, 0.0);
        for b in &mut self.boxes {
            *b = b.translated(offset);
        }
        tracing::debug!("Shifted {} colliders by {:+.3} on Y", self.boxes.len(), delta);
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Aabb> {
        self.boxes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Aabb> {
        self.boxes.iter()
    }
}

impl Extend<Aabb> for ColliderRegistry {
    fn extend<T: IntoIterator<Item = Aabb>>(&mut self, iter: T) {
        self.boxes.extend(iter);
    }
}

impl FromIterator<Aabb> for ColliderRegistry {
    fn from_iter<T: IntoIterator<Item = Aabb>>(iter: T) -> Self {
        Self {
            boxes: iter.into_iter().collect(),
        }
    }
}
