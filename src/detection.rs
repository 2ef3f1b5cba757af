//! Collision probe.
//!
//! Moves an axis-aligned body by a requested displacement, clipping the
//! displacement against the ground layer with fans of parallel rays cast from
//! the padded corners of the body. The contacts found on the way form the
//! [`CollisionState`] the controller reads on its next step.
//!
//! Rays start `skin_padding` inside the collider so a body resting flush
//! against a surface never starts a ray inside it.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::collision::CollisionQuery;
use crate::config::{MovementTunables, ProbeSettings};
use crate::state::Facing;

/// Contacts found by the last move.
///
/// Rebuilt from scratch by every call to [`CollisionProbe::move_body`];
/// nothing is carried over from earlier moves.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionState {
    pub above: bool,
    pub below: bool,
    pub left: bool,
    pub right: bool,
    /// Side the body can be nudged towards to clear a ceiling corner:
    /// -1, +1, or 0 when there is nothing to slide off.
    pub head_bump_slide_direction: i8,
    /// The ceiling box cast found a ceiling straight above.
    pub hit_ceiling_center: bool,
    /// Both outermost upward rays hit.
    pub hit_both_corners: bool,
}

impl CollisionState {
    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.below
    }

    #[inline]
    pub fn bumped_head(&self) -> bool {
        self.above
    }

    /// Whether the wall on the `facing` side is touched.
    #[inline]
    pub fn is_touching_wall(&self, facing: Facing) -> bool {
        match facing {
            Facing::Right => self.right,
            Facing::Left => self.left,
        }
    }

    /// -1 for a left wall, +1 for a right wall, 0 for none. Left wins ties.
    pub fn wall_direction(&self) -> i8 {
        if self.left {
            -1
        } else if self.right {
            1
        } else {
            0
        }
    }

    /// The ceiling hit is a single corner the body can slide off.
    pub fn can_head_bump_slide(&self) -> bool {
        self.head_bump_slide_direction != 0 && !self.hit_ceiling_center && !self.hit_both_corners
    }
}

/// Axis-aligned collider of an actor.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActorBody {
    /// Centre of the collider in world space.
    pub position: Vec2,
    /// Full width and height of the collider.
    pub size: Vec2,
}

impl ActorBody {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.position - self.size * 0.5
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Bottom centre, where jump arcs start.
    pub fn feet(&self) -> Vec2 {
        Vec2::new(self.position.x, self.min().y)
    }
}

/// Corners of the collider shrunk by the skin padding on every side.
#[derive(Debug, Clone, Copy)]
struct RayCorners {
    bottom_left: Vec2,
    bottom_right: Vec2,
    top_left: Vec2,
}

impl RayCorners {
    fn new(body: &ActorBody, padding: f32) -> Self {
        let min = body.min() + Vec2::splat(padding);
        let max = body.max() - Vec2::splat(padding);
        Self {
            bottom_left: min,
            bottom_right: Vec2::new(max.x, min.y),
            top_left: Vec2::new(min.x, max.y),
        }
    }
}

/// Extra reach of the upward fan when the body is not moving vertically, so
/// a body pinned under a ceiling (head-bump slide, apex hang) keeps its
/// contact.
const RESTING_CONTACT_TOLERANCE: f32 = 1e-4;

/// Sign that treats zero as positive, so a body at rest still probes one
/// skin width to its right and above.
#[inline]
fn cast_sign(value: f32) -> f32 {
    if value < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Result of [`CollisionProbe::move_body`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeResult {
    pub contacts: CollisionState,
    /// Displacement actually applied after clipping.
    pub displacement: Vec2,
}

/// Ray fan collision probe over a [`CollisionQuery`].
pub struct CollisionProbe<'a, Q: CollisionQuery + ?Sized> {
    settings: ProbeSettings,
    head_bump: Option<HeadBumpBox>,
    query: &'a Q,
}

#[derive(Debug, Clone, Copy)]
struct HeadBumpBox {
    width_fraction: f32,
    height: f32,
}

impl<'a, Q: CollisionQuery + ?Sized> CollisionProbe<'a, Q> {
    pub fn new(tunables: &MovementTunables, query: &'a Q) -> Self {
        let head_bump = tunables.use_head_bump_slide.then_some(HeadBumpBox {
            width_fraction: tunables.head_bump_box_width,
            height: tunables.head_bump_box_height,
        });
        Self {
            settings: tunables.probe,
            head_bump,
            query,
        }
    }

    /// Move `body` by `displacement`, clipped against the ground layer.
    pub fn move_body(&self, body: &mut ActorBody, displacement: Vec2) -> ProbeResult {
        let mut contacts = CollisionState::default();
        let mut delta = displacement;
        let corners = RayCorners::new(body, self.settings.skin_padding);

        self.check_ceiling_box(body, delta, &mut contacts);
        self.resolve_horizontal(body, &corners, &mut delta, &mut contacts);
        self.resolve_vertical(body, &corners, &mut delta, &mut contacts);

        body.position += delta;
        trace!(
            "Probe: delta={:?} below={} above={} left={} right={} slide={}",
            delta,
            contacts.below,
            contacts.above,
            contacts.left,
            contacts.right,
            contacts.head_bump_slide_direction
        );

        ProbeResult {
            contacts,
            displacement: delta,
        }
    }

    /// Box cast ahead of upward travel, centred above the body, to tell a flat
    /// ceiling from a corner.
    fn check_ceiling_box(&self, body: &ActorBody, delta: Vec2, contacts: &mut CollisionState) {
        if delta.y < 0.0 {
            return;
        }
        let Some(head_bump) = self.head_bump else {
            return;
        };

        let distance = delta.y.abs() + self.settings.skin_padding;
        let size = Vec2::new(body.size.x * head_bump.width_fraction, head_bump.height);
        let center = Vec2::new(body.position.x + delta.x, body.max().y);

        if self
            .query
            .cast_box(center, size, Vec2::Y, distance, self.settings.ground_layer)
            .is_some()
        {
            contacts.hit_ceiling_center = true;
        }
    }

    fn resolve_horizontal(
        &self,
        body: &ActorBody,
        corners: &RayCorners,
        delta: &mut Vec2,
        contacts: &mut CollisionState,
    ) {
        let padding = self.settings.skin_padding;
        let rays = self.settings.horizontal_rays.max(2);
        let spacing = (body.size.y - 2.0 * padding) / (rays - 1) as f32;

        let direction = cast_sign(delta.x);
        let mut length = delta.x.abs() + padding;
        let start = if direction < 0.0 {
            corners.bottom_left
        } else {
            corners.bottom_right
        };

        for i in 0..rays {
            let origin = start + Vec2::Y * (spacing * i as f32);
            let Some(hit) = self.query.cast_ray(
                origin,
                Vec2::X * direction,
                length,
                self.settings.ground_layer,
            ) else {
                continue;
            };

            delta.x = (hit.distance - padding) * direction;
            length = hit.distance;
            if direction < 0.0 {
                contacts.left = true;
            } else {
                contacts.right = true;
            }
        }
    }

    /// Uses the already clipped horizontal displacement as a per-ray offset so
    /// diagonal motion cannot clip through corners.
    fn resolve_vertical(
        &self,
        body: &ActorBody,
        corners: &RayCorners,
        delta: &mut Vec2,
        contacts: &mut CollisionState,
    ) {
        let padding = self.settings.skin_padding;
        let rays = self.settings.vertical_rays.max(2);
        let spacing = (body.size.x - 2.0 * padding) / (rays - 1) as f32;

        let direction = cast_sign(delta.y);
        let mut length = delta.y.abs() + padding;
        if delta.y == 0.0 {
            // A flush ceiling sits a rounding error past the skin.
            length += RESTING_CONTACT_TOLERANCE;
        }
        let start = if direction < 0.0 {
            corners.bottom_left
        } else {
            corners.top_left
        };

        let mut hit_left_corner = false;
        let mut hit_right_corner = false;

        for i in 0..rays {
            let origin = start + Vec2::X * (spacing * i as f32 + delta.x);
            let Some(hit) = self.query.cast_ray(
                origin,
                Vec2::Y * direction,
                length,
                self.settings.ground_layer,
            ) else {
                continue;
            };

            delta.y = (hit.distance - padding) * direction;
            length = hit.distance;

            if direction < 0.0 {
                contacts.below = true;
                continue;
            }

            contacts.above = true;
            let slide_direction = if i == 0 {
                hit_left_corner = true;
                1
            } else if i == rays - 1 {
                hit_right_corner = true;
                -1
            } else {
                0
            };

            if self.head_bump.is_some() && slide_direction != 0 {
                // Probe sideways just under the contact: if the way is open
                // the body can slide off this corner.
                let probe_origin = hit.point + Vec2::NEG_Y * (2.0 * padding);
                let blocked = self
                    .query
                    .cast_ray(
                        probe_origin,
                        Vec2::X * f32::from(slide_direction),
                        2.0 * padding,
                        self.settings.ground_layer,
                    )
                    .is_some();
                if !blocked {
                    contacts.head_bump_slide_direction = slide_direction;
                }
            }
        }

        contacts.hit_both_corners = hit_left_corner && hit_right_corner;
    }
}
