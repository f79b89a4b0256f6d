//! Circle overlap tests and separation
//!
//! Every body in the arena is a circle, so all contact work reduces to
//! centre distance versus summed radii.

use glam::Vec2;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the circles overlap
    pub hit: bool,
    /// Unit axis pointing from the second circle toward the first
    pub normal: Vec2,
    /// Overlap depth (summed radii minus centre distance)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check overlap between circle `a` and circle `b`.
///
/// Touching circles (distance == summed radii) do not overlap. Coincident
/// centres get an arbitrary +X axis so they can still be pushed apart.
pub fn circle_collision(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> CollisionResult {
    let delta = a_pos - b_pos;
    let min_dist = a_radius + b_radius;
    let dist_sq = delta.length_squared();
    if dist_sq >= min_dist * min_dist {
        return CollisionResult::miss();
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > f32::EPSILON {
        delta / dist
    } else {
        Vec2::X
    };
    CollisionResult {
        hit: true,
        normal,
        penetration: min_dist - dist,
    }
}

/// Cheap overlap-only test
#[inline]
pub fn circles_overlap(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> bool {
    let r = a_radius + b_radius;
    a_pos.distance_squared(b_pos) < r * r
}

/// Scale `vel` down to at most `max_speed`. A zero vector is returned unchanged.
pub fn limit_speed(vel: Vec2, max_speed: f32) -> Vec2 {
    let speed = vel.length();
    if speed > max_speed && speed > 0.0 {
        vel / speed * max_speed
    } else {
        vel
    }
}
