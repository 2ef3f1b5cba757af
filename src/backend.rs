//! Physics backend abstraction.
//!
//! The controller core only needs ray and box casts plus a way to read and
//! write an actor's body. This module defines the trait a physics backend
//! implements to provide those to the ECS systems, and ships a backend over
//! the headless [`StaticGeometry`] world.

use bevy::prelude::*;

use crate::collision::CollisionQuery;
use crate::detection::ActorBody;
use crate::geometry::StaticGeometry;

/// Full collider size of an actor, for backends that do not own collider
/// shapes.
///
/// The [`StaticGeometryBackend`] requires it. The Rapier backend falls back to
/// it when the entity has no cuboid collider.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct ActorExtents(pub Vec2);

impl Default for ActorExtents {
    fn default() -> Self {
        Self(Vec2::new(1.0, 2.0))
    }
}

/// Trait for physics backend implementations.
///
/// Implement this trait to run the controller on top of a physics engine.
/// All methods are static and operate on the [`World`] so the controller
/// systems can stay exclusive and deterministic.
pub trait PlatformerPhysicsBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Current collider of `entity`, or `None` if it cannot be simulated.
    fn body(world: &World, entity: Entity) -> Option<ActorBody>;

    /// Write the resolved collider centre back to the entity.
    fn commit_position(world: &mut World, entity: Entity, position: Vec2);

    /// Run `f` with a collision query scoped to `entity`, so the actor never
    /// hits its own collider.
    fn with_query<R>(
        world: &mut World,
        entity: Entity,
        f: impl FnOnce(&dyn CollisionQuery) -> R,
    ) -> R;

    /// Get the fixed timestep delta time.
    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.timestep().as_secs_f32())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 60.0)
    }
}

/// Backend over the [`StaticGeometry`] resource.
///
/// Bodies are `Transform` translation (collider centre) plus [`ActorExtents`].
/// Useful for headless simulation, tests and games whose levels are plain
/// boxes.
pub struct StaticGeometryBackend;

impl PlatformerPhysicsBackend for StaticGeometryBackend {
    fn plugin() -> impl Plugin {
        StaticGeometryBackendPlugin
    }

    fn body(world: &World, entity: Entity) -> Option<ActorBody> {
        let transform = world.get::<Transform>(entity)?;
        let extents = world.get::<ActorExtents>(entity)?;
        Some(ActorBody::new(transform.translation.xy(), extents.0))
    }

    fn commit_position(world: &mut World, entity: Entity, position: Vec2) {
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.translation.x = position.x;
            transform.translation.y = position.y;
        }
    }

    fn with_query<R>(
        world: &mut World,
        _entity: Entity,
        f: impl FnOnce(&dyn CollisionQuery) -> R,
    ) -> R {
        match world.get_resource::<StaticGeometry>() {
            Some(geometry) => f(geometry),
            None => f(&StaticGeometry::default()),
        }
    }
}

/// Plugin that makes sure a [`StaticGeometry`] resource exists.
pub struct StaticGeometryBackendPlugin;

impl Plugin for StaticGeometryBackendPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<StaticGeometry>();
        app.register_type::<ActorExtents>();
        app.init_resource::<StaticGeometry>();
    }
}
