//! Closed-form jump arc preview.
//!
//! Samples the ideal trajectory of a held ground jump: ascent under jump
//! gravity, the apex hang with horizontal drift only, then descent. Meant for
//! editor overlays and level design checks. Nothing here touches simulation
//! state.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::collision::CollisionQuery;
use crate::config::{MovementConfig, MovementTunables};

/// How to sample a jump arc.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JumpArcSettings {
    /// Constant horizontal speed during the jump.
    pub horizontal_speed: f32,
    /// Drift to the right instead of the left.
    pub draw_right: bool,
    /// Samples per ascent plus descent. Clamped to 5..=100.
    pub arc_resolution: u32,
    /// Number of samples to produce. Clamped to 0..=100.
    pub visualization_steps: u32,
    /// Cut the arc at the first ground hit.
    pub stop_on_collision: bool,
}

impl Default for JumpArcSettings {
    fn default() -> Self {
        Self {
            horizontal_speed: 0.0,
            draw_right: true,
            arc_resolution: 20,
            visualization_steps: 90,
            stop_on_collision: true,
        }
    }
}

impl JumpArcSettings {
    /// Arc of a jump taken at full walk speed.
    pub fn walk(tunables: &MovementTunables) -> Self {
        Self {
            horizontal_speed: tunables.max_walk_speed,
            ..default()
        }
    }

    /// Arc of a jump taken at full run speed.
    pub fn run(tunables: &MovementTunables) -> Self {
        Self {
            horizontal_speed: tunables.max_run_speed,
            ..default()
        }
    }

    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.arc_resolution = resolution;
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.visualization_steps = steps;
        self
    }

    pub fn drawn_left(mut self) -> Self {
        self.draw_right = false;
        self
    }

    fn signed_speed(&self) -> f32 {
        if self.draw_right {
            self.horizontal_speed
        } else {
            -self.horizontal_speed
        }
    }
}

/// Displacement from the take-off point after `time` seconds.
fn arc_displacement(config: &MovementConfig, speed: f32, time: f32) -> Vec2 {
    let t_apex = config.tunables().time_until_jump_apex;
    let hang = config.tunables().apex_hang_time;
    let gravity = config.kinematics().gravity;
    let v0 = config.kinematics().initial_jump_velocity;

    let rise = |t: f32| Vec2::new(speed * t, v0 * t + 0.5 * gravity * t * t);

    if time < t_apex {
        rise(time)
    } else if time < t_apex + hang {
        rise(t_apex) + Vec2::new(speed * (time - t_apex), 0.0)
    } else {
        let fall = time - (t_apex + hang);
        rise(t_apex)
            + Vec2::new(speed * hang, 0.0)
            + Vec2::new(speed * fall, 0.5 * gravity * fall * fall)
    }
}

/// Sample the jump arc starting from the actor's feet at `start`.
///
/// The first sample is `start` itself.
///
/// ```rust
/// use bevy::prelude::*;
/// use platformer_controller::prelude::*;
///
/// let config = MovementConfig::validate_and_derive(MovementTunables::default(), 1.0 / 60.0)
///     .unwrap();
/// let settings = JumpArcSettings::walk(config.tunables());
/// let arc = jump_arc(&config, Vec2::ZERO, &settings);
///
/// assert_eq!(arc.len(), 90);
/// assert_eq!(arc[0], Vec2::ZERO);
/// assert!(arc.iter().any(|p| p.y > 6.0));
/// ```
pub fn jump_arc(config: &MovementConfig, start: Vec2, settings: &JumpArcSettings) -> Vec<Vec2> {
    let resolution = settings.arc_resolution.clamp(5, 100);
    let steps = settings.visualization_steps.min(100);
    let time_step = 2.0 * config.tunables().time_until_jump_apex / resolution as f32;
    let speed = settings.signed_speed();

    (0..steps)
        .map(|i| start + arc_displacement(config, speed, i as f32 * time_step))
        .collect()
}

/// Like [`jump_arc`], but ends at the first ground hit between consecutive
/// samples when `settings.stop_on_collision` is set. The hit point is the last
/// sample.
pub fn jump_arc_until_hit<Q: CollisionQuery + ?Sized>(
    config: &MovementConfig,
    start: Vec2,
    settings: &JumpArcSettings,
    query: &Q,
) -> Vec<Vec2> {
    let samples = jump_arc(config, start, settings);
    if !settings.stop_on_collision {
        return samples;
    }

    let layers = config.tunables().probe.ground_layer;
    let mut arc = Vec::with_capacity(samples.len());
    let mut previous = start;

    for point in samples {
        let segment = point - previous;
        let length = segment.length();
        if length > f32::EPSILON {
            if let Some(hit) = query.cast_ray(previous, segment / length, length, layers) {
                arc.push(hit.point);
                return arc;
            }
        }
        arc.push(point);
        previous = point;
    }

    arc
}
