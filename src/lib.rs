//! # `platformer_controller`
//!
//! A deterministic, fixed-timestep 2D platformer movement controller with a
//! physics backend abstraction.
//!
//! This crate provides a kinematic character controller that:
//! - Walks and runs with separate ground, air and wall-jump acceleration
//! - Jumps with apex hang time, jump cutting, coyote time and jump buffering
//! - Supports air jumps, wall slides and wall jumps
//! - Dashes in eight directions, on the ground and in the air
//! - Slides off ceiling corners instead of losing the jump (head-bump slide)
//! - Resolves collisions itself with ray fans against a ground layer
//! - Abstracts the physics backend (static boxes and Rapier2D included)
//!
//! ## Architecture
//!
//! The core is plain data advanced by [`ActorState::step`](movement::ActorState::step):
//! 1. The host latches input into a [`MovementIntent`](intent::MovementIntent)
//! 2. Each fixed step runs an ordered pipeline of checks and integrations
//! 3. A [`CollisionProbe`](detection::CollisionProbe) clips the resulting
//!    displacement and records contacts for the next step
//!
//! The same step runs headless or inside Bevy through
//! [`PlatformerControllerPlugin`].
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use platformer_controller::prelude::*;
//!
//! let config = MovementConfig::validate_and_derive(MovementTunables::player(), 1.0 / 60.0)
//!     .expect("default tunables are valid");
//! let world = StaticGeometry::new().with_box(Vec2::new(-50.0, -1.0), Vec2::new(50.0, 0.0), 1);
//!
//! let mut state = ActorState::default();
//! let mut body = ActorBody::new(Vec2::new(0.0, 1.0), Vec2::new(1.0, 2.0));
//! let mut intent = MovementIntent::default();
//!
//! intent.set_move_axis(Vec2::X);
//! for _ in 0..30 {
//!     state.step(&config, &mut intent, &mut body, &world);
//! }
//! assert!(state.is_grounded());
//! assert!(body.position.x > 0.0);
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod collision;
pub mod config;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod intent;
pub mod movement;
pub mod preview;
pub mod state;
pub mod systems;
pub mod timers;

#[cfg(feature = "rapier2d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::{ActorExtents, PlatformerPhysicsBackend, StaticGeometryBackend};
    pub use crate::collision::{CastHit, CollisionQuery};
    pub use crate::config::{
        derive_kinematics, Kinematics, MovementConfig, MovementTunables, ProbeSettings,
    };
    pub use crate::detection::{ActorBody, CollisionProbe, CollisionState};
    pub use crate::error::ConfigError;
    pub use crate::geometry::{Solid, StaticGeometry};
    pub use crate::intent::MovementIntent;
    pub use crate::movement::{resolve_dash_direction, ActorState, StepReport};
    pub use crate::preview::{jump_arc, jump_arc_until_hit, JumpArcSettings};
    pub use crate::state::{Airborne, Dashing, Facing, Grounded, MovementMode, TouchingWall};
    pub use crate::{
        FacingChanged, MovementModeChanged, PlatformerActorBundle, PlatformerControllerPlugin,
        PlatformerControllerSet,
    };

    #[cfg(feature = "rapier2d")]
    pub use crate::rapier::Rapier2dBackend;
}

/// Sent when an actor turns around.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct FacingChanged {
    pub entity: Entity,
    pub facing: state::Facing,
}

/// Sent when an actor's primary movement mode changes during a step.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct MovementModeChanged {
    pub entity: Entity,
    pub from: state::MovementMode,
    pub to: state::MovementMode,
}

/// System sets of the controller, run in order in `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlatformerControllerSet {
    /// Step every actor and commit its position.
    Step,
    /// Mirror actor state onto marker components.
    Sync,
}

/// Components a controlled actor needs besides its body.
///
/// The body itself (position and collider) comes from the backend: a
/// `Transform` plus [`ActorExtents`](backend::ActorExtents) for the static
/// backend, a `Transform` plus cuboid `Collider` for Rapier.
#[derive(Bundle, Clone)]
pub struct PlatformerActorBundle {
    pub config: config::MovementConfig,
    pub state: movement::ActorState,
    pub intent: intent::MovementIntent,
}

impl PlatformerActorBundle {
    pub fn new(config: config::MovementConfig) -> Self {
        Self {
            config,
            state: movement::ActorState::default(),
            intent: intent::MovementIntent::default(),
        }
    }

    pub fn facing(mut self, facing: state::Facing) -> Self {
        self.state.facing = facing;
        self
    }
}

/// Main plugin for the platformer controller.
///
/// This plugin is generic over a physics backend `B` which provides collision
/// queries and body access.
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `StaticGeometryBackend`)
///
/// # Examples
///
/// ```rust
/// use bevy::prelude::*;
/// use platformer_controller::prelude::*;
///
/// let mut app = App::new();
/// app.add_plugins(MinimalPlugins)
///     .add_plugins(PlatformerControllerPlugin::<StaticGeometryBackend>::default());
/// ```
pub struct PlatformerControllerPlugin<B: backend::PlatformerPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::PlatformerPhysicsBackend> Default for PlatformerControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::PlatformerPhysicsBackend> Plugin for PlatformerControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<config::MovementConfig>();
        app.register_type::<config::MovementTunables>();
        app.register_type::<movement::ActorState>();
        app.register_type::<intent::MovementIntent>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::TouchingWall>();
        app.register_type::<state::Dashing>();

        app.add_event::<FacingChanged>();
        app.add_event::<MovementModeChanged>();

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        app.configure_sets(
            FixedUpdate,
            (PlatformerControllerSet::Step, PlatformerControllerSet::Sync).chain(),
        );
        app.add_systems(
            FixedUpdate,
            systems::step_controllers::<B>.in_set(PlatformerControllerSet::Step),
        );
        app.add_systems(
            FixedUpdate,
            systems::sync_state_markers.in_set(PlatformerControllerSet::Sync),
        );
    }
}
