//! Collision queries.
//!
//! The controller never talks to a physics engine directly. Everything it
//! needs is a ray cast and a box cast against a layer mask, expressed by the
//! [`CollisionQuery`] trait.

use bevy::prelude::*;

/// Result of a ray or box cast.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CastHit {
    /// Distance travelled along the cast direction before the hit.
    pub distance: f32,
    /// World position of the hit.
    pub point: Vec2,
    /// Surface normal at the hit point.
    pub normal: Vec2,
    /// Entity that was hit, when the backend knows it.
    pub entity: Option<Entity>,
}

impl CastHit {
    pub fn new(distance: f32, point: Vec2, normal: Vec2) -> Self {
        Self {
            distance,
            point,
            normal,
            entity: None,
        }
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entity = Some(entity);
        self
    }
}

/// Read-only cast queries against static geometry.
///
/// `direction` is always a unit vector. Only colliders whose layer bits
/// intersect `layer_mask` are considered; a zero mask hits nothing. A cast
/// that starts inside a collider reports a hit at distance zero.
pub trait CollisionQuery {
    /// Cast a ray and return the closest hit within `max_distance`.
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        layer_mask: u32,
    ) -> Option<CastHit>;

    /// Sweep an axis-aligned box centred on `center` and return the closest hit.
    fn cast_box(
        &self,
        center: Vec2,
        size: Vec2,
        direction: Vec2,
        max_distance: f32,
        layer_mask: u32,
    ) -> Option<CastHit>;
}

impl<T: CollisionQuery + ?Sized> CollisionQuery for &T {
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        layer_mask: u32,
    ) -> Option<CastHit> {
        (**self).cast_ray(origin, direction, max_distance, layer_mask)
    }

    fn cast_box(
        &self,
        center: Vec2,
        size: Vec2,
        direction: Vec2,
        max_distance: f32,
        layer_mask: u32,
    ) -> Option<CastHit> {
        (**self).cast_box(center, size, direction, max_distance, layer_mask)
    }
}
