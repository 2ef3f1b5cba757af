//! Controller systems.
//!
//! These systems drive [`ActorState::step`] from the fixed timestep and mirror
//! the results onto entities. They are generic over the physics backend so
//! the same controller runs on Rapier or on plain [`StaticGeometry`] boxes.
//!
//! [`StaticGeometry`]: crate::geometry::StaticGeometry

use bevy::prelude::*;

use crate::backend::PlatformerPhysicsBackend;
use crate::config::MovementConfig;
use crate::intent::MovementIntent;
use crate::movement::ActorState;
use crate::state::{Airborne, Dashing, Grounded, TouchingWall};
use crate::{FacingChanged, MovementModeChanged};

/// Advance every actor by one fixed step.
///
/// Exclusive so that each actor's step (casts, state update, position commit)
/// runs to completion before the next actor is touched.
pub fn step_controllers<B: PlatformerPhysicsBackend>(world: &mut World) {
    let host_dt = B::get_fixed_timestep(world);

    let actors: Vec<(Entity, MovementConfig, MovementIntent, ActorState)> = world
        .query::<(Entity, &MovementConfig, &MovementIntent, &ActorState)>()
        .iter(world)
        .map(|(e, config, intent, state)| (e, config.clone(), *intent, state.clone()))
        .collect();

    for (entity, config, mut intent, mut state) in actors {
        if (config.fixed_dt() - host_dt).abs() > 1e-6 {
            warn_once!(
                "Movement config derived for dt={} but the fixed timestep is {}; \
                 kinematics will not match the simulated step",
                config.fixed_dt(),
                host_dt
            );
        }

        let Some(mut body) = B::body(world, entity) else {
            continue;
        };

        let report = B::with_query(world, entity, |query| {
            state.step(&config, &mut intent, &mut body, query)
        });

        B::commit_position(world, entity, body.position);

        if let Some(mut live_state) = world.get_mut::<ActorState>(entity) {
            *live_state = state;
        }
        if let Some(mut live_intent) = world.get_mut::<MovementIntent>(entity) {
            live_intent.clear_edges();
        }

        if let Some(facing) = report.turned {
            world.send_event(FacingChanged { entity, facing });
        }
        if report.mode != report.previous_mode {
            world.send_event(MovementModeChanged {
                entity,
                from: report.previous_mode,
                to: report.mode,
            });
        }
    }
}

/// Sync state marker components from the actor state.
pub fn sync_state_markers(
    mut commands: Commands,
    q_actors: Query<(
        Entity,
        &ActorState,
        Has<Grounded>,
        Has<Airborne>,
        Option<&TouchingWall>,
        Has<Dashing>,
    )>,
) {
    for (entity, state, has_grounded, has_airborne, wall, has_dashing) in &q_actors {
        // Sync Grounded/Airborne
        let grounded = state.is_grounded();
        if grounded && !has_grounded {
            commands.entity(entity).insert(Grounded);
            commands.entity(entity).remove::<Airborne>();
        } else if !grounded && has_grounded {
            commands.entity(entity).remove::<Grounded>();
            commands.entity(entity).insert(Airborne);
        } else if !grounded && !has_airborne && !has_grounded {
            commands.entity(entity).insert(Airborne);
        }

        // Sync TouchingWall, keeping the side current
        let direction = state.contacts.wall_direction();
        match (direction, wall) {
            (0, Some(_)) => {
                commands.entity(entity).remove::<TouchingWall>();
            }
            (0, None) => {}
            (direction, Some(wall)) if wall.direction == direction => {}
            (direction, _) => {
                commands.entity(entity).insert(TouchingWall::new(direction));
            }
        }

        // Sync Dashing
        if state.dash.dashing && !has_dashing {
            commands.entity(entity).insert(Dashing);
        } else if !state.dash.dashing && has_dashing {
            commands.entity(entity).remove::<Dashing>();
        }
    }
}
