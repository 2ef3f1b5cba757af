//! Head-bump slide: nudging a rising actor sideways off a ceiling corner.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ActorState, StepContext};

/// Head-bump slide state.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadBumpState {
    pub sliding: bool,
    /// Slide direction latched on entry, -1 or +1.
    pub direction: i8,
    /// The slide interrupted a dash; the exit aims for the dash apex.
    pub from_dash: bool,
}

impl ActorState {
    pub(super) fn integrate_head_bump_slide(&mut self, ctx: &mut StepContext) {
        let contacts = self.contacts;
        let rising = self.jump.jumping || self.dash.dashing || self.wall_jump.wall_jumping;

        if !self.head_bump.sliding && rising && contacts.bumped_head() && contacts.can_head_bump_slide() {
            self.head_bump.sliding = true;
            self.head_bump.direction = contacts.head_bump_slide_direction;
            self.head_bump.from_dash = self.dash.dashing;
            if self.dash.dashing {
                self.dash.timer = 0.0;
            }
            debug!(
                "Head bump slide started: direction={}, from_dash={}",
                self.head_bump.direction, self.head_bump.from_dash
            );
        }

        if !self.head_bump.sliding {
            return;
        }

        self.velocity.y = 0.0;

        if contacts.bumped_head() && contacts.can_head_bump_slide() {
            self.velocity.x = f32::from(self.head_bump.direction) * ctx.tunables.head_bump_slide_speed;
            return;
        }

        self.head_bump.sliding = false;
        self.velocity.x = 0.0;

        let target_y = if self.head_bump.from_dash {
            self.dash.start_y + ctx.kinematics.dash_target_apex_height
        } else {
            let compensation = 2.0 - ctx.tunables.jump_height_compensation_factor;
            self.jump.start_y + ctx.tunables.jump_height * compensation
        };
        let remaining = target_y - ctx.position.y;
        if remaining > 0.0 {
            self.velocity.y = (2.0 * ctx.kinematics.gravity.abs() * remaining).sqrt();
        }

        self.head_bump.from_dash = false;
        ctx.just_finished_slide = true;
        debug!(
            "Head bump slide finished: remaining={:.3}, velocity_y={:.3}",
            remaining, self.velocity.y
        );
    }
}
