//! Horizontal locomotion, turning, landing, falling and the velocity clamp.

use bevy::prelude::*;

use super::{lerp, ActorState, StepContext, GROUND_ADHESION_SPEED, VERTICAL_SPEED_LIMIT};
use crate::state::Facing;

impl ActorState {
    pub(super) fn integrate_horizontal(&mut self, ctx: &mut StepContext) {
        if self.head_bump.sliding || self.dash.dashing {
            return;
        }

        let tunables = ctx.tunables;
        let input_x = ctx.input.move_axis().x;
        self.turn_check(input_x, ctx);

        let moving = input_x.abs() >= tunables.move_threshold;
        let target = if moving {
            let speed = if ctx.input.run_held() {
                tunables.max_run_speed
            } else {
                tunables.max_walk_speed
            };
            input_x.signum() * speed
        } else {
            0.0
        };

        let (acceleration, deceleration) = if self.wall_jump.use_move_stats {
            (
                tunables.wall_jump_move_acceleration,
                tunables.wall_jump_move_deceleration,
            )
        } else if self.contacts.is_grounded() {
            (tunables.ground_acceleration, tunables.ground_deceleration)
        } else {
            (tunables.air_acceleration, tunables.air_deceleration)
        };

        let rate = if moving { acceleration } else { deceleration };
        self.velocity.x = lerp(self.velocity.x, target, rate * ctx.dt);
    }

    /// Face the way the input points, if it points at all.
    pub(super) fn turn_check(&mut self, input_x: f32, ctx: &mut StepContext) {
        let turned = match self.facing {
            Facing::Right if input_x < 0.0 => Facing::Left,
            Facing::Left if input_x > 0.0 => Facing::Right,
            _ => return,
        };
        self.facing = turned;
        ctx.report.turned = Some(turned);
    }

    pub(super) fn land_check(&mut self, ctx: &mut StepContext) {
        if !self.contacts.is_grounded() {
            return;
        }

        let airborne = self.jump.jumping
            || self.jump.falling
            || self.wall_jump.falling
            || self.wall_jump.wall_jumping
            || self.wall_slide.slide_falling
            || self.wall_slide.sliding
            || self.dash.fast_fall.active
            || self.head_bump.sliding;

        if airborne && self.velocity.y <= 0.0 {
            self.head_bump.sliding = false;
            self.reset_jump_values();
            self.stop_wall_slide();
            self.reset_wall_jump_values();
            self.reset_dashes();
            self.reset_dash_values();
            self.jump.air_jumps_used = 0;

            ctx.report.landed = true;
            debug!("Landed at y={:.3}", ctx.position.y);
        }

        if self.velocity.y <= 0.0 {
            self.velocity.y = GROUND_ADHESION_SPEED;
        }
    }

    pub(super) fn integrate_fall(&mut self, ctx: &StepContext) {
        if self.contacts.is_grounded()
            || self.jump.jumping
            || self.wall_slide.sliding
            || self.wall_jump.wall_jumping
            || self.dash.dashing
            || self.dash.fast_fall.active
        {
            return;
        }

        self.jump.falling = true;
        self.velocity.y += ctx.kinematics.gravity * ctx.dt;
    }

    pub(super) fn clamp_velocity(&mut self, ctx: &StepContext) {
        let min = if self.dash.dashing {
            -VERTICAL_SPEED_LIMIT
        } else {
            -ctx.tunables.max_fall_speed
        };
        self.velocity.y = self.velocity.y.clamp(min, VERTICAL_SPEED_LIMIT);
    }
}
