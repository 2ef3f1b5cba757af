//! Axis-aligned static geometry.
//!
//! A tiny collision world made of boxes, for hosts that do not run a physics
//! engine and for tests. It answers [`CollisionQuery`] exactly, which keeps
//! simulations built on it reproducible bit for bit.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::collision::{CastHit, CollisionQuery};

/// A solid axis-aligned box on one or more layers.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    pub min: Vec2,
    pub max: Vec2,
    pub layers: u32,
}

impl Solid {
    pub fn new(min: Vec2, max: Vec2, layers: u32) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
            layers,
        }
    }

    pub fn from_center_size(center: Vec2, size: Vec2, layers: u32) -> Self {
        let half = size.abs() * 0.5;
        Self::new(center - half, center + half, layers)
    }

    /// Slab test of a ray against this box grown by `inflate` on each side.
    ///
    /// Returns the entry distance and the normal of the entry face. A ray
    /// starting inside reports distance zero and the reversed direction as
    /// its normal.
    fn ray_entry(&self, origin: Vec2, direction: Vec2, inflate: Vec2) -> Option<(f32, Vec2)> {
        let min = self.min - inflate;
        let max = self.max + inflate;

        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut normal = Vec2::ZERO;

        for axis in 0..2 {
            let o = origin[axis];
            let d = direction[axis];
            if d == 0.0 {
                if o < min[axis] || o > max[axis] {
                    return None;
                }
                continue;
            }

            let t1 = (min[axis] - o) / d;
            let t2 = (max[axis] - o) / d;
            let (near, far) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };

            if near > t_enter {
                t_enter = near;
                normal = Vec2::ZERO;
                normal[axis] = -d.signum();
            }
            t_exit = t_exit.min(far);
        }

        if t_exit < t_enter || t_exit < 0.0 {
            return None;
        }
        if t_enter <= 0.0 {
            return Some((0.0, -direction));
        }
        Some((t_enter, normal))
    }
}

/// A collection of [`Solid`] boxes.
#[derive(Resource, Reflect, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[reflect(Resource)]
pub struct StaticGeometry {
    solids: Vec<Solid>,
}

impl StaticGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, solid: Solid) -> &mut Self {
        self.solids.push(solid);
        self
    }

    pub fn with_solid(mut self, solid: Solid) -> Self {
        self.solids.push(solid);
        self
    }

    /// Add a box given its bottom-left and top-right corners.
    pub fn with_box(self, min: Vec2, max: Vec2, layers: u32) -> Self {
        self.with_solid(Solid::new(min, max, layers))
    }

    pub fn solids(&self) -> &[Solid] {
        &self.solids
    }

    pub fn clear(&mut self) {
        self.solids.clear();
    }

    fn closest(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        layer_mask: u32,
        inflate: Vec2,
    ) -> Option<CastHit> {
        self.solids
            .iter()
            .filter(|solid| solid.layers & layer_mask != 0)
            .filter_map(|solid| solid.ray_entry(origin, direction, inflate))
            .filter(|(distance, _)| *distance <= max_distance)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(distance, normal)| CastHit::new(distance, origin + direction * distance, normal))
    }
}

impl CollisionQuery for StaticGeometry {
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        layer_mask: u32,
    ) -> Option<CastHit> {
        if direction == Vec2::ZERO {
            return None;
        }
        self.closest(origin, direction, max_distance, layer_mask, Vec2::ZERO)
    }

    fn cast_box(
        &self,
        center: Vec2,
        size: Vec2,
        direction: Vec2,
        max_distance: f32,
        layer_mask: u32,
    ) -> Option<CastHit> {
        if direction == Vec2::ZERO {
            return None;
        }
        // Sweeping a box equals casting its centre against solids grown by
        // its half extents.
        self.closest(center, direction, max_distance, layer_mask, size.abs() * 0.5)
    }
}
