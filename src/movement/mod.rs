//! The movement state machine.
//!
//! [`ActorState::step`] advances one actor by one fixed step. The step is a
//! fixed pipeline of checks followed by integrations, and the order matters:
//! later phases see the decisions earlier phases made in the same step.
//!
//! 1. advance timers
//! 2. jump checks (buffer, cut, ground / air jump)
//! 3. land check
//! 4. wall jump check
//! 5. wall slide check
//! 6. dash check
//! 7. horizontal locomotion
//! 8. head-bump slide
//! 9. jump
//! 10. wall slide
//! 11. wall jump
//! 12. dash
//! 13. fall
//! 14. velocity clamp
//! 15. move and collide
//! 16. clear input edges
//!
//! Every phase reads the contacts found by the move at the end of the
//! previous step. Per-concern state lives in its own struct; the concerns
//! may overlap (an air jump fired mid-dash leaves both jumping and dashing
//! set) and such overlaps are resolved purely by the phase order above.
//! [`ActorState::mode`] folds them into a single [`MovementMode`] for
//! observers.

mod dash;
mod head_bump;
mod jump;
mod locomotion;
mod wall;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::collision::CollisionQuery;
use crate::config::{Kinematics, MovementConfig, MovementTunables};
use crate::detection::{ActorBody, CollisionProbe, CollisionState};
use crate::intent::MovementIntent;
use crate::state::{Facing, MovementMode};
use crate::timers::TimerSet;

pub use dash::{resolve_dash_direction, DashState};
pub use head_bump::HeadBumpState;
pub use jump::{ApexHang, FastFall, JumpState};
pub use wall::{WallJumpState, WallSlideState};

/// Vertical speed a grounded actor is pinned to, so the ground rays keep
/// finding the floor.
pub const GROUND_ADHESION_SPEED: f32 = -2.0;

/// Upper bound on vertical speed, and the fall limit while dashing.
pub const VERTICAL_SPEED_LIMIT: f32 = 50.0;

/// Full simulation state of one actor.
///
/// Together with the [`ActorBody`] this is everything a step depends on
/// besides configuration, input and the collision world, so a serialized
/// copy resumes bit-identically.
#[derive(Component, Reflect, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[reflect(Component)]
pub struct ActorState {
    /// Shared velocity. Horizontal phases own `x`, vertical phases own `y`,
    /// a dash drives both.
    pub velocity: Vec2,
    pub facing: Facing,
    /// Contacts from the move that ended the previous step.
    pub contacts: CollisionState,
    pub timers: TimerSet,
    pub jump: JumpState,
    pub wall_slide: WallSlideState,
    pub wall_jump: WallJumpState,
    pub dash: DashState,
    pub head_bump: HeadBumpState,
}

/// What happened during one step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    /// Displacement applied after collision clipping.
    pub displacement: Vec2,
    /// Contacts found by this step's move.
    pub contacts: CollisionState,
    pub previous_mode: MovementMode,
    pub mode: MovementMode,
    /// New facing, if the actor turned.
    pub turned: Option<Facing>,
    /// A ground or coyote jump started.
    pub jumped: bool,
    pub air_jumped: bool,
    pub wall_jumped: bool,
    pub dashed: bool,
    pub landed: bool,
}

/// Read-only inputs of a step plus the scratch flags phases hand to each other.
struct StepContext<'a> {
    tunables: &'a MovementTunables,
    kinematics: &'a Kinematics,
    input: MovementIntent,
    /// Body position before this step's move.
    position: Vec2,
    dt: f32,
    /// A head-bump slide ended this step; jump and dash skip their integration.
    just_finished_slide: bool,
    report: StepReport,
}

impl ActorState {
    pub fn new(facing: Facing) -> Self {
        Self {
            facing,
            ..default()
        }
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.contacts.is_grounded()
    }

    /// Primary movement mode.
    pub fn mode(&self) -> MovementMode {
        if self.head_bump.sliding {
            MovementMode::HeadBumpSliding
        } else if self.dash.dashing {
            MovementMode::Dashing
        } else if self.wall_slide.sliding {
            MovementMode::WallSliding
        } else if self.wall_jump.wall_jumping {
            MovementMode::WallJumping
        } else if self.jump.jumping {
            MovementMode::Jumping
        } else if self.contacts.is_grounded() {
            MovementMode::Grounded
        } else {
            MovementMode::Falling
        }
    }

    /// Advance by one fixed step of `config.fixed_dt()` seconds.
    ///
    /// Consumes the latched edges of `intent` and moves `body` through
    /// `query`. Never fails: every transition is a total function of state
    /// and input.
    pub fn step<Q: CollisionQuery + ?Sized>(
        &mut self,
        config: &MovementConfig,
        intent: &mut MovementIntent,
        body: &mut ActorBody,
        query: &Q,
    ) -> StepReport {
        let previous_mode = self.mode();
        let mut ctx = StepContext {
            tunables: config.tunables(),
            kinematics: config.kinematics(),
            input: *intent,
            position: body.position,
            dt: config.fixed_dt(),
            just_finished_slide: false,
            report: StepReport {
                previous_mode,
                ..default()
            },
        };

        self.timers.advance(
            ctx.dt,
            self.contacts.is_grounded(),
            ctx.tunables.jump_coyote_time,
        );

        self.jump_checks(&mut ctx);
        self.land_check(&mut ctx);
        self.wall_jump_check(&mut ctx);
        self.wall_slide_check(&mut ctx);
        self.dash_check(&mut ctx);

        self.integrate_horizontal(&mut ctx);
        self.integrate_head_bump_slide(&mut ctx);
        self.integrate_jump(&mut ctx);
        self.integrate_wall_slide(&ctx);
        self.integrate_wall_jump(&mut ctx);
        self.integrate_dash(&mut ctx);
        self.integrate_fall(&ctx);
        self.clamp_velocity(&ctx);

        let probe = CollisionProbe::new(ctx.tunables, query);
        let result = probe.move_body(body, self.velocity * ctx.dt);
        self.contacts = result.contacts;

        intent.clear_edges();

        let mut report = ctx.report;
        report.displacement = result.displacement;
        report.contacts = result.contacts;
        report.mode = self.mode();
        if report.mode != previous_mode {
            debug!("Movement mode: {:?} -> {:?}", previous_mode, report.mode);
        }
        report
    }
}

/// Linear interpolation with `t` clamped to [0, 1].
#[inline]
fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t.clamp(0.0, 1.0)
}

/// Where `value` sits between `from` and `to`, clamped to [0, 1].
#[inline]
fn inverse_lerp(from: f32, to: f32, value: f32) -> f32 {
    if from == to {
        0.0
    } else {
        ((value - from) / (to - from)).clamp(0.0, 1.0)
    }
}
