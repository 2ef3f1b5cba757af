//! Facing, movement modes and state marker components.
//!
//! [`Facing`] and [`MovementMode`] are plain values reported by the
//! controller. The marker components mirror them onto entities so that
//! queries can filter on them; they are written after every step and never
//! read back by the simulation.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Horizontal facing of an actor.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// -1 for left, +1 for right.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    #[inline]
    pub fn is_right(self) -> bool {
        self == Facing::Right
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Primary movement mode, derived from the controller state after a step.
///
/// Several concerns can be active at once (for instance an air jump fired
/// during a dash). The mode reports the one with the highest precedence:
/// head-bump sliding, dashing, wall sliding, wall jumping, jumping, falling,
/// grounded.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementMode {
    #[default]
    Grounded,
    Jumping,
    WallSliding,
    WallJumping,
    Dashing,
    HeadBumpSliding,
    Falling,
}

impl MovementMode {
    pub fn is_airborne(self) -> bool {
        !matches!(self, MovementMode::Grounded)
    }
}

/// Marker component indicating the actor stood on ground after its last step.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use platformer_controller::prelude::*;
///
/// fn check_grounded(grounded: Option<&Grounded>) -> bool {
///     grounded.is_some()
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the actor is airborne.
///
/// Mutually exclusive with [`Grounded`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Marker component indicating the actor is touching a wall on either side.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct TouchingWall {
    /// -1 when the wall is on the left, +1 when on the right.
    pub direction: i8,
}

impl Default for TouchingWall {
    fn default() -> Self {
        Self { direction: 1 }
    }
}

impl TouchingWall {
    pub fn new(direction: i8) -> Self {
        Self { direction }
    }

    pub fn is_left(&self) -> bool {
        self.direction < 0
    }

    pub fn is_right(&self) -> bool {
        self.direction > 0
    }
}

/// Marker component present while a dash is in progress.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Dashing;
