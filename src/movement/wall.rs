//! Wall slide and wall jump.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::jump::{integrate_arc, ArcProfile};
use super::{lerp, ActorState, ApexHang, FastFall, StepContext};

/// Wall slide state.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WallSlideState {
    pub sliding: bool,
    /// Lost the wall while sliding and still airborne.
    pub slide_falling: bool,
}

/// Wall jump state. Mirrors [`JumpState`](super::JumpState) with its own cut
/// and apex bookkeeping.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WallJumpState {
    pub wall_jumping: bool,
    pub falling: bool,
    pub fast_fall: FastFall,
    pub apex: ApexHang,
    /// The wall jump acceleration pair overrides ground and air acceleration.
    pub use_move_stats: bool,
    /// Time since the wall jump started.
    pub time: f32,
    /// -1 for a wall on the left, +1 on the right, 0 before any contact.
    pub last_wall_direction: i8,
}

impl ActorState {
    pub(super) fn reset_wall_jump_values(&mut self) {
        self.wall_slide.slide_falling = false;
        self.wall_jump.use_move_stats = false;
        self.wall_jump.wall_jumping = false;
        self.wall_jump.fast_fall.active = false;
        self.wall_jump.fast_fall.time = 0.0;
        self.wall_jump.falling = false;
        self.wall_jump.apex.past_threshold = false;
        self.wall_jump.time = 0.0;
    }

    pub(super) fn stop_wall_slide(&mut self) {
        if self.wall_slide.sliding {
            self.wall_slide.sliding = false;
            debug!("Wall slide stopped");
        }
    }

    pub(super) fn wall_jump_check(&mut self, ctx: &mut StepContext) {
        let tunables = ctx.tunables;
        let touching_wall = self.contacts.is_touching_wall(self.facing);

        if touching_wall || self.wall_slide.sliding {
            // Still sliding on the step contact was lost: keep the old side.
            let direction = self.contacts.wall_direction();
            if direction != 0 {
                self.wall_jump.last_wall_direction = direction;
            }
            self.timers
                .wall_jump_post_buffer
                .arm(tunables.wall_jump_post_buffer_time);
        }

        if ctx.input.jump_released()
            && !self.wall_slide.sliding
            && !touching_wall
            && self.wall_jump.wall_jumping
            && self.velocity.y > 0.0
        {
            if self.wall_jump.apex.past_threshold {
                self.wall_jump.apex.past_threshold = false;
                self.wall_jump
                    .fast_fall
                    .cut_at_apex(tunables.time_for_upwards_cancel);
                self.velocity.y = 0.0;
            } else {
                self.wall_jump.fast_fall.cut_from(self.velocity.y);
            }
        }

        if ctx.input.jump_pressed() && self.timers.wall_jump_post_buffer.is_active() {
            self.initiate_wall_jump(ctx);
        }
    }

    fn initiate_wall_jump(&mut self, ctx: &mut StepContext) {
        if !self.wall_jump.wall_jumping {
            self.wall_jump.wall_jumping = true;
            self.wall_jump.use_move_stats = true;
        }

        self.stop_wall_slide();
        self.reset_jump_values();
        self.wall_jump.time = 0.0;

        let away = -f32::from(self.wall_jump.last_wall_direction);
        self.velocity.y = ctx.kinematics.initial_wall_jump_velocity;
        self.velocity.x = ctx.tunables.wall_jump_direction.x.abs() * away;

        self.jump.start_y = ctx.position.y;
        ctx.report.wall_jumped = true;
        debug!(
            "Wall jump: wall={}, velocity={:?}",
            self.wall_jump.last_wall_direction, self.velocity
        );
    }

    pub(super) fn wall_slide_check(&mut self, ctx: &mut StepContext) {
        let tunables = ctx.tunables;
        let touching_wall = self.contacts.is_touching_wall(self.facing);
        let grounded = self.contacts.is_grounded();

        if touching_wall && !grounded && !self.dash.dashing {
            if self.velocity.y < 0.0 && !self.wall_slide.sliding {
                self.reset_jump_values();
                self.reset_wall_jump_values();
                self.reset_dash_values();
                if tunables.reset_dash_on_wall_slide {
                    self.reset_dashes();
                }

                self.wall_slide.slide_falling = false;
                self.wall_slide.sliding = true;

                if tunables.reset_jumps_on_wall_slide {
                    self.jump.air_jumps_used = 0;
                }
                debug!("Wall slide started: wall={}", self.contacts.wall_direction());
            }
        } else if self.wall_slide.sliding && !touching_wall && !grounded && !self.wall_slide.slide_falling {
            self.wall_slide.slide_falling = true;
            self.stop_wall_slide();
        } else {
            self.stop_wall_slide();
        }
    }

    pub(super) fn integrate_wall_slide(&mut self, ctx: &StepContext) {
        if self.wall_slide.sliding {
            self.velocity.y = lerp(
                self.velocity.y,
                -ctx.tunables.wall_slide_speed,
                ctx.tunables.wall_slide_deceleration * ctx.dt,
            );
        }
    }

    pub(super) fn integrate_wall_jump(&mut self, ctx: &mut StepContext) {
        let tunables = ctx.tunables;
        let kinematics = ctx.kinematics;

        if self.wall_jump.wall_jumping {
            self.wall_jump.time += ctx.dt;
            if self.wall_jump.time >= tunables.time_until_jump_apex {
                self.wall_jump.use_move_stats = false;
            }

            let contacts = self.contacts;
            if contacts.bumped_head() && !self.head_bump.sliding && !contacts.can_head_bump_slide() {
                self.velocity.y = 0.0;
                self.wall_jump.fast_fall.active = true;
                self.wall_jump.use_move_stats = false;
            }

            if self.head_bump.sliding {
                self.velocity.y = 0.0;
                return;
            }

            if !ctx.just_finished_slide {
                let arc = ArcProfile {
                    initial_velocity: kinematics.initial_wall_jump_velocity,
                    gravity: kinematics.wall_jump_gravity,
                    descent_gravity: kinematics.wall_jump_gravity,
                };
                integrate_arc(
                    &mut self.velocity.y,
                    &mut self.wall_jump.apex,
                    &mut self.wall_jump.falling,
                    self.wall_jump.fast_fall.active,
                    arc,
                    tunables,
                    ctx.dt,
                );
            }
        }

        if self.wall_jump.fast_fall.active {
            self.wall_jump.fast_fall.apply(
                &mut self.velocity.y,
                kinematics.wall_jump_gravity * tunables.wall_jump_gravity_on_release_multiplier,
                tunables.time_for_upwards_cancel,
                ctx.dt,
            );
        }
    }
}
