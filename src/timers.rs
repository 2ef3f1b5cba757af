//! Countdown timers advanced once per fixed step.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// A countdown. Active while the remaining time is strictly positive.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Countdown(f32);

impl Countdown {
    pub fn new(remaining: f32) -> Self {
        Self(remaining)
    }

    /// Restart at `duration`.
    #[inline]
    pub fn arm(&mut self, duration: f32) {
        self.0 = duration;
    }

    /// Force to zero, which reads as inactive.
    #[inline]
    pub fn clear(&mut self) {
        self.0 = 0.0;
    }

    #[inline]
    pub fn tick(&mut self, dt: f32) {
        self.0 -= dt;
    }

    #[inline]
    pub fn is_active(self) -> bool {
        self.0 > 0.0
    }

    /// Remaining time, negative once the countdown has run out.
    #[inline]
    pub fn remaining(self) -> f32 {
        self.0
    }
}

/// The controller's five countdowns.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimerSet {
    /// Armed by a jump press; a jump is granted while active.
    pub jump_buffer: Countdown,
    /// Held full while grounded, runs down once airborne.
    pub coyote: Countdown,
    /// Armed while touching a wall; a wall jump is granted while active.
    pub wall_jump_post_buffer: Countdown,
    /// Armed by a dash press; a dash is granted while active.
    pub dash_buffer: Countdown,
    /// Armed by a dash; runs down only while grounded. A ground dash needs it
    /// strictly negative.
    pub dash_ground_cooldown: Countdown,
}

impl TimerSet {
    /// Advance every timer by one step.
    pub fn advance(&mut self, dt: f32, grounded: bool, coyote_time: f32) {
        self.jump_buffer.tick(dt);

        if grounded {
            self.coyote.arm(coyote_time);
        } else {
            self.coyote.tick(dt);
        }

        self.wall_jump_post_buffer.tick(dt);

        if grounded {
            self.dash_ground_cooldown.tick(dt);
        }

        self.dash_buffer.tick(dt);
    }
}
