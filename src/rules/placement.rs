use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box reported by the renderer for a draggable object or a drop zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Aabb { min, max }
    }

    /// Box of the given full `size` centred on `center`.
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Aabb {
            min: center - half,
            max: center + half,
        }
    }

    /// Grow the box by `amount` on every side.
    pub fn expanded(&self, amount: f32) -> Self {
        let delta = Vec3::splat(amount);
        Aabb {
            min: self.min - delta,
            max: self.max + delta,
        }
    }

    /// True if the boxes overlap. Touching faces count as overlap.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }

    /// True if `other` lies entirely inside this box.
    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Loose placement check: `dragged` overlaps `target` grown by `tolerance`.
pub fn overlaps_with_tolerance(dragged: &Aabb, target: &Aabb, tolerance: f32) -> bool {
    target.expanded(tolerance.max(0.0)).intersects(dragged)
}

/// Strict placement check: `dragged` sits fully inside `target` grown by `tolerance`.
pub fn contained_with_tolerance(dragged: &Aabb, target: &Aabb, tolerance: f32) -> bool {
    target.expanded(tolerance.max(0.0)).contains(dragged)
}
