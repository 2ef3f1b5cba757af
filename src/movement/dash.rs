//! Ground and air dashes, and the fast fall that follows an air dash.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{lerp, ActorState, FastFall, StepContext};
use crate::config::DASH_DIRECTIONS;

/// Ground cooldown value after a reset. Strictly negative, so a ground dash is
/// available again right away.
const COOLDOWN_ELAPSED: f32 = -0.01;

/// Downward speed that keeps a horizontal ground dash on the floor.
const GROUND_DASH_STICK_SPEED: f32 = -0.001;

/// Dash state.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DashState {
    pub dashing: bool,
    pub air_dashing: bool,
    /// Cut applied after a dash ends in the air. Outlives the dash itself.
    pub fast_fall: FastFall,
    /// Time since the dash started.
    pub timer: f32,
    /// Resolved compass direction.
    pub direction: Vec2,
    pub dashes_used: u32,
    /// Body height when the dash started.
    pub start_y: f32,
}

/// Snap a movement input to the dash compass.
///
/// Picks the nearest entry of [`DASH_DIRECTIONS`] by Euclidean distance, with
/// `diagonal_bias` subtracted from the distance to the four diagonals. An
/// exact match wins outright. Returns [`Vec2::ZERO`] when the input is
/// closest to neutral.
///
/// ```rust
/// use bevy::prelude::*;
/// use platformer_controller::prelude::*;
///
/// let direction = resolve_dash_direction(Vec2::new(1.0, 0.3), 0.4);
/// assert!(direction.x > 0.0 && direction.y > 0.0);
///
/// let direction = resolve_dash_direction(Vec2::new(1.0, 0.3), 0.0);
/// assert_eq!(direction, Vec2::X);
/// ```
pub fn resolve_dash_direction(input: Vec2, diagonal_bias: f32) -> Vec2 {
    let mut closest = Vec2::ZERO;
    let mut min_distance = input.distance(DASH_DIRECTIONS[0]);

    for candidate in DASH_DIRECTIONS {
        if input == candidate {
            return candidate;
        }

        let mut distance = input.distance(candidate);
        if candidate.x != 0.0 && candidate.y != 0.0 {
            distance -= diagonal_bias;
        }

        if distance < min_distance {
            min_distance = distance;
            closest = candidate;
        }
    }

    closest
}

impl ActorState {
    /// Clears the dash cut and the ground cooldown. Does not end a dash in
    /// progress.
    pub(super) fn reset_dash_values(&mut self) {
        self.dash.fast_fall = FastFall::default();
        self.timers.dash_ground_cooldown.arm(COOLDOWN_ELAPSED);
        self.dash.direction = Vec2::ZERO;
    }

    pub(super) fn reset_dashes(&mut self) {
        self.dash.dashes_used = 0;
    }

    pub(super) fn dash_check(&mut self, ctx: &mut StepContext) {
        if ctx.input.dash_pressed() {
            self.timers.dash_buffer.arm(ctx.tunables.dash_buffer_time);
        }

        if !self.timers.dash_buffer.is_active() {
            return;
        }

        let grounded = self.contacts.is_grounded();
        if grounded && self.timers.dash_ground_cooldown.remaining() < 0.0 && !self.dash.dashing {
            self.initiate_dash(ctx);
            self.timers.dash_buffer.clear();
        } else if !grounded && !self.dash.dashing && self.dash.dashes_used < ctx.tunables.num_dashes {
            self.dash.air_dashing = true;
            self.initiate_dash(ctx);
            self.timers.dash_buffer.clear();
        }
    }

    fn initiate_dash(&mut self, ctx: &mut StepContext) {
        self.dash.start_y = ctx.position.y;

        let input = ctx.input.move_axis();
        self.turn_check(input.x, ctx);

        let mut direction = resolve_dash_direction(input, ctx.tunables.dash_diagonal_bias);
        if direction == Vec2::ZERO {
            direction = Vec2::X * self.facing.sign();
        }

        // No dashing into the floor.
        if self.contacts.is_grounded() && direction.y < 0.0 && direction.x != 0.0 {
            direction = Vec2::new(direction.x.signum(), 0.0);
        }

        self.dash.direction = direction;
        self.dash.dashes_used += 1;
        self.dash.dashing = true;
        self.dash.timer = 0.0;
        self.timers
            .dash_ground_cooldown
            .arm(ctx.tunables.time_between_dashes_on_ground);

        self.reset_jump_values();
        self.reset_wall_jump_values();
        self.stop_wall_slide();

        ctx.report.dashed = true;
        debug!(
            "Dash: direction={:?}, air={}, dashes_used={}",
            direction, self.dash.air_dashing, self.dash.dashes_used
        );
    }

    pub(super) fn integrate_dash(&mut self, ctx: &mut StepContext) {
        if ctx.just_finished_slide {
            return;
        }

        let tunables = ctx.tunables;

        if self.dash.dashing {
            let contacts = self.contacts;
            if contacts.bumped_head() && !self.head_bump.sliding && !contacts.can_head_bump_slide() {
                self.velocity.y = 0.0;
                self.dash.dashing = false;
                self.dash.air_dashing = false;
                self.dash.timer = 0.0;
                debug!("Dash stopped by ceiling");
                return;
            }

            if self.head_bump.sliding {
                self.velocity.y = 0.0;
                return;
            }

            self.dash.timer += ctx.dt;
            if self.dash.timer >= tunables.dash_time {
                let grounded = contacts.is_grounded();
                if grounded {
                    self.reset_dashes();
                }

                self.dash.air_dashing = false;
                self.dash.dashing = false;

                if !self.jump.jumping && !self.wall_jump.wall_jumping {
                    self.dash.fast_fall.time = 0.0;
                    self.dash.fast_fall.release_speed = self.velocity.y;
                    if !grounded {
                        self.dash.fast_fall.active = true;
                    }
                }
                debug!("Dash ended: fast_fall={}", self.dash.fast_fall.active);
                return;
            }

            self.velocity.x = tunables.dash_speed * self.dash.direction.x;

            if self.dash.direction.y != 0.0 || self.dash.air_dashing {
                self.velocity.y = tunables.dash_speed * self.dash.direction.y;
            } else if !self.jump.jumping {
                self.velocity.y = GROUND_DASH_STICK_SPEED;
            }
        } else if self.dash.fast_fall.active {
            let gravity = ctx.kinematics.gravity * tunables.dash_gravity_on_release_multiplier;
            let cancel_time = tunables.dash_time_for_upwards_cancel;
            let cut = &mut self.dash.fast_fall;

            if self.velocity.y > 0.0 {
                if cut.time < cancel_time {
                    self.velocity.y = lerp(cut.release_speed, 0.0, cut.time / cancel_time);
                } else {
                    self.velocity.y += gravity * ctx.dt;
                }
                cut.time += ctx.dt;
            } else {
                self.velocity.y += gravity * ctx.dt;
            }
        }
    }
}
