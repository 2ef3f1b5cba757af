//! Movement configuration.
//!
//! Designers edit a flat [`MovementTunables`] record. The controller only ever
//! sees a [`MovementConfig`], which pairs validated tunables with the
//! [`Kinematics`] derived from them. A config is immutable once built; editing
//! goes through [`MovementConfig::retune`], which re-derives everything as a
//! unit or leaves the old value untouched.

use std::f32::consts::FRAC_1_SQRT_2;
use std::path::Path;

use bevy::prelude::*;
use ron::extensions::Extensions;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, RayAxis};

/// Skin padding used by the collision probe when none is configured.
pub const DEFAULT_SKIN_PADDING: f32 = 0.015;

/// Dash compass: neutral first, then counter-clockwise from right.
pub const DASH_DIRECTIONS: [Vec2; 9] = [
    Vec2::ZERO,
    Vec2::new(1.0, 0.0),
    Vec2::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    Vec2::new(0.0, 1.0),
    Vec2::new(-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    Vec2::new(-1.0, 0.0),
    Vec2::new(-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
    Vec2::new(0.0, -1.0),
    Vec2::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
];

/// Ray fan and layer settings for the collision probe.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// Rays cast sideways, spread over the collider height. At least 2.
    pub horizontal_rays: u32,
    /// Rays cast up or down, spread over the collider width. At least 2.
    pub vertical_rays: u32,
    /// Inward margin applied to the collider before casting.
    pub skin_padding: f32,
    /// Layer mask the probe collides with. Zero means nothing is solid.
    pub ground_layer: u32,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            horizontal_rays: 4,
            vertical_rays: 4,
            skin_padding: DEFAULT_SKIN_PADDING,
            ground_layer: 1,
        }
    }
}

/// Designer-facing movement parameters.
///
/// Speeds are in world units per second, durations in seconds. Nothing in here
/// is read by the controller until it has gone through
/// [`MovementConfig::validate_and_derive`].
#[derive(Reflect, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTunables {
    // === Walk / Run ===
    /// Minimum horizontal input magnitude that counts as moving.
    pub move_threshold: f32,
    pub max_walk_speed: f32,
    pub max_run_speed: f32,
    pub ground_acceleration: f32,
    pub ground_deceleration: f32,
    pub air_acceleration: f32,
    pub air_deceleration: f32,
    /// Acceleration used right after a wall jump, until the wall jump reaches
    /// its apex time.
    pub wall_jump_move_acceleration: f32,
    pub wall_jump_move_deceleration: f32,

    // === Head Bump Slide ===
    pub use_head_bump_slide: bool,
    pub head_bump_slide_speed: f32,
    /// Width of the ceiling box cast as a fraction of the collider width.
    pub head_bump_box_width: f32,
    pub head_bump_box_height: f32,

    // === Jump ===
    pub jump_height: f32,
    /// Scales the jump height before deriving gravity, to make up for the
    /// height lost to discrete integration.
    pub jump_height_compensation_factor: f32,
    pub time_until_jump_apex: f32,
    /// Gravity multiplier while descending or after a jump cut.
    pub gravity_on_release_multiplier: f32,
    pub max_fall_speed: f32,
    pub num_air_jumps_allowed: u32,
    pub reset_jumps_on_wall_slide: bool,

    // === Jump Cut ===
    /// Time over which upward speed fades to zero after releasing jump.
    pub time_for_upwards_cancel: f32,

    // === Apex ===
    /// Fraction of the ascent (0..1) after which the apex hang starts.
    pub apex_threshold: f32,
    pub apex_hang_time: f32,

    // === Buffers ===
    pub jump_buffer_time: f32,
    pub jump_coyote_time: f32,

    // === Wall Slide ===
    pub wall_slide_speed: f32,
    pub wall_slide_deceleration: f32,

    // === Wall Jump ===
    /// Horizontal launch speed (x, sign ignored) and target height (y).
    pub wall_jump_direction: Vec2,
    pub wall_jump_post_buffer_time: f32,
    pub wall_jump_gravity_on_release_multiplier: f32,

    // === Dash ===
    pub dash_time: f32,
    pub dash_speed: f32,
    pub time_between_dashes_on_ground: f32,
    pub reset_dash_on_wall_slide: bool,
    pub num_dashes: u32,
    /// Subtracted from the distance to diagonal compass entries.
    pub dash_diagonal_bias: f32,
    pub dash_buffer_time: f32,
    pub dash_gravity_on_release_multiplier: f32,
    pub dash_time_for_upwards_cancel: f32,

    // === Collision Probe ===
    pub probe: ProbeSettings,
}

impl Default for MovementTunables {
    fn default() -> Self {
        Self {
            // Walk / run
            move_threshold: 0.25,
            max_walk_speed: 12.5,
            max_run_speed: 20.0,
            ground_acceleration: 5.0,
            ground_deceleration: 20.0,
            air_acceleration: 5.0,
            air_deceleration: 5.0,
            wall_jump_move_acceleration: 5.0,
            wall_jump_move_deceleration: 5.0,

            // Head bump slide
            use_head_bump_slide: true,
            head_bump_slide_speed: 13.0,
            head_bump_box_width: 0.3,
            head_bump_box_height: 0.1,

            // Jump
            jump_height: 6.5,
            jump_height_compensation_factor: 1.054,
            time_until_jump_apex: 0.35,
            gravity_on_release_multiplier: 2.0,
            max_fall_speed: 26.0,
            num_air_jumps_allowed: 1,
            reset_jumps_on_wall_slide: true,
            time_for_upwards_cancel: 0.027,
            apex_threshold: 0.97,
            apex_hang_time: 0.075,
            jump_buffer_time: 0.125,
            jump_coyote_time: 0.1,

            // Wall slide
            wall_slide_speed: 5.0,
            wall_slide_deceleration: 50.0,

            // Wall jump
            wall_jump_direction: Vec2::new(-20.0, 6.5),
            wall_jump_post_buffer_time: 0.125,
            wall_jump_gravity_on_release_multiplier: 1.0,

            // Dash
            dash_time: 0.11,
            dash_speed: 40.0,
            time_between_dashes_on_ground: 0.225,
            reset_dash_on_wall_slide: true,
            num_dashes: 2,
            dash_diagonal_bias: 0.4,
            dash_buffer_time: 0.125,
            dash_gravity_on_release_multiplier: 1.0,
            dash_time_for_upwards_cancel: 0.027,

            probe: ProbeSettings::default(),
        }
    }
}

impl MovementTunables {
    /// Full moveset: air jumps, dashes, wall interaction and head-bump sliding.
    pub fn player() -> Self {
        Self::default()
    }

    /// Ground jumps only. No air jumps, no dashes, no head-bump sliding.
    pub fn simple() -> Self {
        Self {
            num_air_jumps_allowed: 0,
            num_dashes: 0,
            use_head_bump_slide: false,
            ..default()
        }
    }

    /// Parse tunables from a RON document. Missing fields keep their defaults.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let tunables = ron::Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(source)?;
        Ok(tunables)
    }

    /// Read and parse a RON tunables file.
    pub fn from_ron_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_ron_str(&source)
    }

    /// Check every value the controller relies on being in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.time_until_jump_apex > 0.0) {
            return Err(ConfigError::NonPositiveTimeToApex(self.time_until_jump_apex));
        }
        if !(self.max_fall_speed > 0.0) {
            return Err(ConfigError::NonPositiveMaxFallSpeed(self.max_fall_speed));
        }
        if self.probe.horizontal_rays < 2 {
            return Err(ConfigError::TooFewRays {
                axis: RayAxis::Horizontal,
                count: self.probe.horizontal_rays,
            });
        }
        if self.probe.vertical_rays < 2 {
            return Err(ConfigError::TooFewRays {
                axis: RayAxis::Vertical,
                count: self.probe.vertical_rays,
            });
        }

        let non_negative = [
            ("skin_padding", self.probe.skin_padding),
            ("time_for_upwards_cancel", self.time_for_upwards_cancel),
            ("apex_hang_time", self.apex_hang_time),
            ("jump_buffer_time", self.jump_buffer_time),
            ("jump_coyote_time", self.jump_coyote_time),
            ("wall_jump_post_buffer_time", self.wall_jump_post_buffer_time),
            ("dash_time", self.dash_time),
            ("time_between_dashes_on_ground", self.time_between_dashes_on_ground),
            ("dash_buffer_time", self.dash_buffer_time),
            ("dash_time_for_upwards_cancel", self.dash_time_for_upwards_cancel),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { field, value });
            }
        }
        Ok(())
    }

    pub fn with_jump(mut self, height: f32, time_until_apex: f32) -> Self {
        self.jump_height = height;
        self.time_until_jump_apex = time_until_apex;
        self
    }

    pub fn with_walk_speed(mut self, walk: f32, run: f32) -> Self {
        self.max_walk_speed = walk;
        self.max_run_speed = run;
        self
    }

    pub fn with_air_jumps(mut self, count: u32) -> Self {
        self.num_air_jumps_allowed = count;
        self
    }

    pub fn with_dashes(mut self, count: u32) -> Self {
        self.num_dashes = count;
        self
    }

    pub fn with_dash_bias(mut self, bias: f32) -> Self {
        self.dash_diagonal_bias = bias;
        self
    }

    pub fn with_coyote_time(mut self, time: f32) -> Self {
        self.jump_coyote_time = time;
        self
    }

    pub fn with_jump_buffer_time(mut self, time: f32) -> Self {
        self.jump_buffer_time = time;
        self
    }

    pub fn with_head_bump_slide(mut self, enabled: bool) -> Self {
        self.use_head_bump_slide = enabled;
        self
    }

    pub fn with_probe(mut self, probe: ProbeSettings) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_ground_layer(mut self, layer: u32) -> Self {
        self.probe.ground_layer = layer;
        self
    }
}

/// Constants derived from [`MovementTunables`] by [`derive_kinematics`].
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    /// Signed (negative) jump gravity.
    pub gravity: f32,
    pub initial_jump_velocity: f32,
    pub adjusted_jump_height: f32,
    pub wall_jump_gravity: f32,
    pub initial_wall_jump_velocity: f32,
    pub adjusted_wall_jump_height: f32,
    /// Height a dash travels when fired straight up, including its cancel fade.
    pub dash_target_apex_height: f32,
}

/// Solve projectile motion for the jump and wall jump, and quantize the dash
/// to the fixed timestep.
///
/// Pure: the same tunables and timestep always give bit-identical results.
pub fn derive_kinematics(
    tunables: &MovementTunables,
    fixed_dt: f32,
) -> Result<Kinematics, ConfigError> {
    let t_apex = tunables.time_until_jump_apex;
    if !(t_apex > 0.0) {
        return Err(ConfigError::NonPositiveTimeToApex(t_apex));
    }
    if !(fixed_dt > 0.0 && fixed_dt.is_finite()) {
        return Err(ConfigError::NonPositiveTimestep(fixed_dt));
    }

    let adjusted_jump_height = tunables.jump_height * tunables.jump_height_compensation_factor;
    let gravity = -(2.0 * adjusted_jump_height) / (t_apex * t_apex);
    let initial_jump_velocity = gravity.abs() * t_apex;

    let adjusted_wall_jump_height =
        tunables.wall_jump_direction.y * tunables.jump_height_compensation_factor;
    let wall_jump_gravity = -(2.0 * adjusted_wall_jump_height) / (t_apex * t_apex);
    let initial_wall_jump_velocity = wall_jump_gravity.abs() * t_apex;

    // Dash phases only ever last a whole number of steps.
    let dash_time_rounded = (tunables.dash_time / fixed_dt).ceil() * fixed_dt;
    let dash_cancel_rounded = (tunables.dash_time_for_upwards_cancel / fixed_dt).ceil() * fixed_dt;
    let dash_target_apex_height = tunables.dash_speed * dash_time_rounded
        + 0.5 * tunables.dash_speed * dash_cancel_rounded;

    Ok(Kinematics {
        gravity,
        initial_jump_velocity,
        adjusted_jump_height,
        wall_jump_gravity,
        initial_wall_jump_velocity,
        adjusted_wall_jump_height,
        dash_target_apex_height,
    })
}

/// Validated tunables plus their derived kinematics.
///
/// Attach one to every controlled actor. It can only be built through
/// [`MovementConfig::validate_and_derive`], so a controller never observes
/// tunables whose derived constants are stale.
#[derive(Component, Reflect, Debug, Clone, PartialEq)]
#[reflect(Component)]
pub struct MovementConfig {
    tunables: MovementTunables,
    kinematics: Kinematics,
    fixed_dt: f32,
}

impl MovementConfig {
    /// Validate `tunables` and derive kinematics for steps of `fixed_dt` seconds.
    pub fn validate_and_derive(
        tunables: MovementTunables,
        fixed_dt: f32,
    ) -> Result<Self, ConfigError> {
        tunables.validate()?;
        let kinematics = derive_kinematics(&tunables, fixed_dt)?;

        if tunables.probe.ground_layer == 0 {
            warn!("Movement config has no ground layer; every probe will pass through");
        }

        Ok(Self {
            tunables,
            kinematics,
            fixed_dt,
        })
    }

    /// Parse, validate and derive in one go.
    pub fn from_ron_str(source: &str, fixed_dt: f32) -> Result<Self, ConfigError> {
        Self::validate_and_derive(MovementTunables::from_ron_str(source)?, fixed_dt)
    }

    /// Replace the tunables, keeping the timestep.
    ///
    /// On error `self` is left exactly as it was.
    pub fn retune(&mut self, tunables: MovementTunables) -> Result<(), ConfigError> {
        *self = Self::validate_and_derive(tunables, self.fixed_dt)?;
        Ok(())
    }

    #[inline]
    pub fn tunables(&self) -> &MovementTunables {
        &self.tunables
    }

    #[inline]
    pub fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    /// Step length the kinematics were derived for.
    #[inline]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }
}
