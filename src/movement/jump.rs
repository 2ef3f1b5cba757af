//! Ground, coyote and air jumps, jump buffering and the jump cut.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{inverse_lerp, lerp, ActorState, StepContext};
use crate::config::MovementTunables;

/// Small downward speed that ends the apex hang.
const APEX_EXIT_SPEED: f32 = -0.01;

/// Jump cut bookkeeping.
///
/// Once active, upward speed fades linearly from `release_speed` to zero over
/// the cancel window, then release gravity takes over.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FastFall {
    pub active: bool,
    pub time: f32,
    pub release_speed: f32,
}

impl FastFall {
    /// Released inside the apex window: skip the fade entirely.
    pub(super) fn cut_at_apex(&mut self, cancel_time: f32) {
        self.active = true;
        self.time = cancel_time;
    }

    /// Released while rising: fade from the current speed.
    pub(super) fn cut_from(&mut self, speed: f32) {
        self.active = true;
        self.release_speed = speed;
    }

    pub(super) fn apply(&mut self, velocity_y: &mut f32, gravity: f32, cancel_time: f32, dt: f32) {
        if self.time >= cancel_time {
            *velocity_y += gravity * dt;
        } else {
            *velocity_y = lerp(self.release_speed, 0.0, self.time / cancel_time);
        }
        self.time += dt;
    }
}

/// Apex hang bookkeeping shared by jumps and wall jumps.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ApexHang {
    pub past_threshold: bool,
    pub time_past: f32,
}

/// Gravity profile of a jump arc.
#[derive(Debug, Clone, Copy)]
pub(super) struct ArcProfile {
    pub initial_velocity: f32,
    pub gravity: f32,
    pub descent_gravity: f32,
}

/// Ascent with apex hang, then descent. Leaves velocity alone while a jump
/// cut owns it.
pub(super) fn integrate_arc(
    velocity_y: &mut f32,
    apex: &mut ApexHang,
    falling: &mut bool,
    fast_falling: bool,
    arc: ArcProfile,
    tunables: &MovementTunables,
    dt: f32,
) {
    if *velocity_y >= 0.0 {
        let apex_point = inverse_lerp(arc.initial_velocity, 0.0, *velocity_y);

        if apex_point > tunables.apex_threshold {
            if !apex.past_threshold {
                apex.past_threshold = true;
                apex.time_past = 0.0;
            } else {
                apex.time_past += dt;
                *velocity_y = if apex.time_past < tunables.apex_hang_time {
                    0.0
                } else {
                    APEX_EXIT_SPEED
                };
            }
        } else if !fast_falling {
            *velocity_y += arc.gravity * dt;
            apex.past_threshold = false;
        }
    } else if !fast_falling {
        *velocity_y += arc.descent_gravity * dt;
    } else if *velocity_y < 0.0 {
        *falling = true;
    }
}

/// Jump state.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JumpState {
    pub jumping: bool,
    /// Airborne without an active jump, or past a cut jump's apex.
    pub falling: bool,
    pub fast_fall: FastFall,
    pub apex: ApexHang,
    pub air_jumps_used: u32,
    /// Jump was released while the press was still buffered.
    pub released_during_buffer: bool,
    /// Body height when the last jump or wall jump started.
    pub start_y: f32,
}

impl ActorState {
    pub(super) fn reset_jump_values(&mut self) {
        self.jump.jumping = false;
        self.jump.falling = false;
        self.jump.fast_fall.active = false;
        self.jump.fast_fall.time = 0.0;
        self.jump.apex.past_threshold = false;
    }

    /// Runs before the land check, so on the first grounded step after a jump
    /// `jumping` is still set and a press there is granted as an air jump,
    /// spending the budget. The ground jump branch only opens once the land
    /// check has cleared the jump.
    pub(super) fn jump_checks(&mut self, ctx: &mut StepContext) {
        let tunables = ctx.tunables;
        let contacts = self.contacts;
        let grounded = contacts.is_grounded();
        let touching_wall = contacts.is_touching_wall(self.facing);

        if ctx.input.jump_pressed() {
            // Wall interaction owns the press.
            if self.wall_slide.slide_falling && self.timers.wall_jump_post_buffer.remaining() >= 0.0 {
                return;
            }
            if self.wall_slide.sliding || (touching_wall && !grounded) {
                return;
            }

            self.timers.jump_buffer.arm(tunables.jump_buffer_time);
            self.jump.released_during_buffer = false;
        }

        if ctx.input.jump_released() {
            if self.timers.jump_buffer.is_active() {
                self.jump.released_during_buffer = true;
            }

            if self.jump.jumping && self.velocity.y > 0.0 {
                if self.jump.apex.past_threshold {
                    self.jump.apex.past_threshold = false;
                    self.jump.fast_fall.cut_at_apex(tunables.time_for_upwards_cancel);
                    self.velocity.y = 0.0;
                } else {
                    self.jump.fast_fall.cut_from(self.velocity.y);
                }
            }
        }

        if !self.timers.jump_buffer.is_active() {
            return;
        }

        let budget_left = self.jump.air_jumps_used < tunables.num_air_jumps_allowed;

        if !self.jump.jumping && (grounded || self.timers.coyote.is_active()) {
            self.initiate_jump(ctx, 0);
            if self.jump.released_during_buffer {
                self.jump.fast_fall.cut_from(self.velocity.y);
            }
            ctx.report.jumped = true;
            debug!(
                "Ground jump: grounded={}, coyote={:.3}, short_hop={}",
                grounded,
                self.timers.coyote.remaining(),
                self.jump.released_during_buffer
            );
        } else if (self.jump.jumping
            || self.wall_jump.wall_jumping
            || self.wall_slide.slide_falling
            || self.dash.air_dashing
            || self.dash.fast_fall.active)
            && !touching_wall
            && budget_left
        {
            self.jump.fast_fall.active = false;
            self.initiate_jump(ctx, 1);
            self.dash.fast_fall.active = false;
            ctx.report.air_jumped = true;
            debug!("Air jump: air_jumps_used={}", self.jump.air_jumps_used);
        } else if self.jump.falling && !self.wall_slide.slide_falling && budget_left {
            // Walked off a ledge after coyote time ran out.
            self.initiate_jump(ctx, 1);
            self.jump.fast_fall.active = false;
            ctx.report.air_jumped = true;
            debug!(
                "Air jump after coyote time: air_jumps_used={}",
                self.jump.air_jumps_used
            );
        }
    }

    fn initiate_jump(&mut self, ctx: &StepContext, air_jumps: u32) {
        self.jump.jumping = true;
        self.reset_wall_jump_values();

        self.timers.jump_buffer.clear();
        self.jump.air_jumps_used += air_jumps;
        self.velocity.y = ctx.kinematics.initial_jump_velocity;
        self.jump.start_y = ctx.position.y;
    }

    pub(super) fn integrate_jump(&mut self, ctx: &mut StepContext) {
        let tunables = ctx.tunables;
        let kinematics = ctx.kinematics;

        if self.jump.jumping {
            let contacts = self.contacts;
            if contacts.bumped_head() && !self.head_bump.sliding && !contacts.can_head_bump_slide() {
                self.velocity.y = 0.0;
                self.jump.fast_fall.active = true;
            }

            if self.head_bump.sliding {
                self.velocity.y = 0.0;
                return;
            }

            if !ctx.just_finished_slide {
                let arc = ArcProfile {
                    initial_velocity: kinematics.initial_jump_velocity,
                    gravity: kinematics.gravity,
                    descent_gravity: kinematics.gravity * tunables.gravity_on_release_multiplier,
                };
                integrate_arc(
                    &mut self.velocity.y,
                    &mut self.jump.apex,
                    &mut self.jump.falling,
                    self.jump.fast_fall.active,
                    arc,
                    tunables,
                    ctx.dt,
                );
            }
        }

        if self.jump.fast_fall.active {
            self.jump.fast_fall.apply(
                &mut self.velocity.y,
                kinematics.gravity * tunables.gravity_on_release_multiplier,
                tunables.time_for_upwards_cancel,
                ctx.dt,
            );
        }
    }
}
