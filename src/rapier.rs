//! Rapier2D physics backend implementation.
//!
//! This module answers the controller's ray and box casts from the Rapier
//! query pipeline. Actors are kinematic: the controller resolves collisions
//! itself and moves bodies by writing their `Transform`.
//! Enable with the `rapier2d` feature.

use bevy::ecs::system::SystemState;
use bevy::prelude::*;
use bevy_rapier2d::geometry::Group;
use bevy_rapier2d::parry::shape::Cuboid;
use bevy_rapier2d::prelude::*;

use crate::backend::{ActorExtents, PlatformerPhysicsBackend};
use crate::collision::{CastHit, CollisionQuery};
use crate::detection::ActorBody;
use crate::geometry::StaticGeometry;

/// Rapier2D physics backend for the platformer controller.
pub struct Rapier2dBackend;

impl PlatformerPhysicsBackend for Rapier2dBackend {
    fn plugin() -> impl Plugin {
        Rapier2dBackendPlugin
    }

    fn body(world: &World, entity: Entity) -> Option<ActorBody> {
        let position = world
            .get::<Transform>(entity)
            .map(|t| t.translation.xy())
            .or_else(|| {
                world
                    .get::<GlobalTransform>(entity)
                    .map(|t| t.translation().xy())
            })?;

        let size = world
            .get::<Collider>(entity)
            .and_then(collider_size)
            .or_else(|| world.get::<ActorExtents>(entity).map(|e| e.0))?;

        Some(ActorBody::new(position, size))
    }

    fn commit_position(world: &mut World, entity: Entity, position: Vec2) {
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.translation.x = position.x;
            transform.translation.y = position.y;
        }
    }

    fn with_query<R>(
        world: &mut World,
        entity: Entity,
        f: impl FnOnce(&dyn CollisionQuery) -> R,
    ) -> R {
        let mut state = SystemState::<ReadRapierContext>::new(world);
        let rapier_context = state.get(world);

        let Ok(context) = rapier_context.single() else {
            warn_once!("No Rapier context found; platformer actors will not collide");
            return f(&StaticGeometry::default());
        };

        f(&RapierQuery {
            context: &context,
            exclude: entity,
        })
    }
}

/// Plugin that registers Rapier-specific controller types.
pub struct Rapier2dBackendPlugin;

impl Plugin for Rapier2dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<ActorExtents>();
    }
}

/// Full size of a cuboid collider. Other shapes have no box extents.
pub fn collider_size(collider: &Collider) -> Option<Vec2> {
    collider.as_cuboid().map(|cuboid| cuboid.half_extents() * 2.0)
}

/// [`CollisionQuery`] over a Rapier context, ignoring one entity.
pub struct RapierQuery<'c, 'w> {
    context: &'c RapierContext<'w>,
    exclude: Entity,
}

impl<'c, 'w> RapierQuery<'c, 'w> {
    pub fn new(context: &'c RapierContext<'w>, exclude: Entity) -> Self {
        Self { context, exclude }
    }

    fn filter(&self, layer_mask: u32) -> QueryFilter<'static> {
        QueryFilter::default()
            .exclude_rigid_body(self.exclude)
            .exclude_collider(self.exclude)
            .exclude_sensors()
            .groups(CollisionGroups::new(
                Group::ALL,
                Group::from_bits_truncate(layer_mask),
            ))
    }
}

impl CollisionQuery for RapierQuery<'_, '_> {
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        layer_mask: u32,
    ) -> Option<CastHit> {
        if layer_mask == 0 {
            return None;
        }

        self.context
            .cast_ray(origin, direction, max_distance, true, self.filter(layer_mask))
            .map(|(hit_entity, toi)| {
                // A plain ray has no surface normal; approximate it.
                CastHit::new(toi, origin + direction * toi, -direction).with_entity(hit_entity)
            })
    }

    fn cast_box(
        &self,
        center: Vec2,
        size: Vec2,
        direction: Vec2,
        max_distance: f32,
        layer_mask: u32,
    ) -> Option<CastHit> {
        if layer_mask == 0 {
            return None;
        }

        let shape = Cuboid::new((size.abs() * 0.5).into());
        self.context
            .cast_shape(
                center,
                0.0,
                direction,
                &shape,
                ShapeCastOptions {
                    max_time_of_impact: max_distance,
                    stop_at_penetration: false,
                    ..default()
                },
                self.filter(layer_mask),
            )
            .map(|(hit_entity, hit)| {
                let normal = hit.details.map(|d| d.normal1).unwrap_or(-direction);
                let point = center + direction * hit.time_of_impact;
                CastHit::new(hit.time_of_impact, point, normal).with_entity(hit_entity)
            })
    }
}

/// Physics components for a kinematic platformer actor.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use platformer_controller::prelude::*;
/// use platformer_controller::rapier::Rapier2dActorBundle;
///
/// fn spawn_player(mut commands: Commands) {
///     let config = MovementConfig::validate_and_derive(MovementTunables::player(), 1.0 / 60.0)
///         .expect("valid tunables");
///     commands.spawn((
///         Transform::from_xyz(0.0, 4.0, 0.0),
///         PlatformerActorBundle::new(config),
///         Rapier2dActorBundle::default(),
///         Collider::cuboid(0.5, 1.0),
///     ));
/// }
/// ```
#[derive(Bundle)]
pub struct Rapier2dActorBundle {
    /// Should stay kinematic: the controller owns the position.
    pub rigid_body: RigidBody,
    pub locked_axes: LockedAxes,
    /// Rapier's own gravity never applies to the actor.
    pub gravity_scale: GravityScale,
}

impl Default for Rapier2dActorBundle {
    fn default() -> Self {
        Self {
            rigid_body: RigidBody::KinematicPositionBased,
            locked_axes: LockedAxes::ROTATION_LOCKED,
            gravity_scale: GravityScale(0.0),
        }
    }
}

impl Rapier2dActorBundle {
    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.rigid_body = body;
        self
    }
}
