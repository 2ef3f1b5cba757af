//! Movement intent.
//!
//! The host samples its input devices (or AI) as often as it likes and writes
//! the result into a [`MovementIntent`]. Levels (move axis, held buttons) are
//! overwritten on every write. Edges (pressed / released) are latched until
//! the next controller step consumes them, so a tap that starts and ends
//! between two fixed steps is never lost.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Input snapshot consumed by one controller step.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use platformer_controller::prelude::*;
///
/// let mut intent = MovementIntent::new();
/// intent.set_move_axis(Vec2::new(2.0, 0.0));
/// assert_eq!(intent.move_axis(), Vec2::X);
///
/// // Button held this frame: a press edge is latched.
/// intent.set_jump_held(true);
/// assert!(intent.jump_pressed());
///
/// // Still held next frame: no new edge, the old one stays latched.
/// intent.set_jump_held(true);
/// assert!(intent.jump_pressed());
///
/// // The controller clears edges once it has consumed them.
/// intent.clear_edges();
/// assert!(!intent.jump_pressed());
/// assert!(intent.jump_held());
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[reflect(Component)]
pub struct MovementIntent {
    /// Directional input, each axis in [-1, 1].
    move_axis: Vec2,
    /// Whether the run modifier is held.
    run_held: bool,
    /// Current level of the jump button.
    jump_held: bool,
    jump_pressed: bool,
    jump_released: bool,
    dash_pressed: bool,
}

impl MovementIntent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directional input. Each axis is clamped to [-1, 1]; NaN reads as 0.
    pub fn set_move_axis(&mut self, axis: Vec2) {
        let clamp = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) };
        self.move_axis = Vec2::new(clamp(axis.x), clamp(axis.y));
    }

    #[inline]
    pub fn move_axis(&self) -> Vec2 {
        self.move_axis
    }

    pub fn set_run_held(&mut self, held: bool) {
        self.run_held = held;
    }

    #[inline]
    pub fn run_held(&self) -> bool {
        self.run_held
    }

    /// Feed the current jump button level; press and release edges are
    /// derived from the previous level.
    pub fn set_jump_held(&mut self, held: bool) {
        if held && !self.jump_held {
            self.jump_pressed = true;
        } else if !held && self.jump_held {
            self.jump_released = true;
        }
        self.jump_held = held;
    }

    /// Latch a jump press edge directly.
    pub fn press_jump(&mut self) {
        self.jump_pressed = true;
        self.jump_held = true;
    }

    /// Latch a jump release edge directly.
    pub fn release_jump(&mut self) {
        self.jump_released = true;
        self.jump_held = false;
    }

    /// Latch a dash press edge.
    pub fn press_dash(&mut self) {
        self.dash_pressed = true;
    }

    #[inline]
    pub fn jump_held(&self) -> bool {
        self.jump_held
    }

    #[inline]
    pub fn jump_pressed(&self) -> bool {
        self.jump_pressed
    }

    #[inline]
    pub fn jump_released(&self) -> bool {
        self.jump_released
    }

    #[inline]
    pub fn dash_pressed(&self) -> bool {
        self.dash_pressed
    }

    /// Whether any one-shot edge is waiting for the next step.
    pub fn has_pending_edges(&self) -> bool {
        self.jump_pressed || self.jump_released || self.dash_pressed
    }

    /// Drop consumed edges. Levels are kept.
    pub fn clear_edges(&mut self) {
        self.jump_pressed = false;
        self.jump_released = false;
        self.dash_pressed = false;
    }

    /// Drop everything, levels included.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
