//! Narrow-phase collision detection and response for circle pairs
//!
//! Given two circles, decide whether they are closer than their padded
//! combined radius, and if so how far and in which direction to push them.

use glam::Vec2;

/// Result of a circle/circle contact check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleContact {
    /// Whether the circles are within reach of each other
    pub hit: bool,
    /// Unit vector from the first circle's center toward the second's
    pub normal: Vec2,
    /// How far apart the centers must move to reach separation
    pub penetration: f32,
}

impl CircleContact {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check contact between circle `a` and circle `b`
///
/// `padding` scales the combined radius (1.0 = touching, >1.0 leaves a gap).
/// Coincident centers separate along +X so the result never carries NaN
/// from a zero-length normal.
pub fn circle_contact(
    pos_a: Vec2,
    radius_a: f32,
    pos_b: Vec2,
    radius_b: f32,
    padding: f32,
) -> CircleContact {
    let reach = (radius_a + radius_b) * padding;
    let delta = pos_b - pos_a;
    let distance_squared = delta.length_squared();

    // Written as a negation so NaN distances count as a miss
    if !(distance_squared < reach * reach) {
        return CircleContact::miss();
    }

    let distance = distance_squared.sqrt();
    let normal = delta.try_normalize().unwrap_or(Vec2::X);

    CircleContact {
        hit: true,
        normal,
        penetration: reach - distance,
    }
}

/// Split a correction between two circles
///
/// Returns the fraction of the penetration each circle absorbs. The larger
/// circle moves less; a fixed circle absorbs nothing and its partner takes the
/// whole correction. Both fixed yields `(0, 0)`.
pub fn correction_shares(radius_a: f32, fixed_a: bool, radius_b: f32, fixed_b: bool) -> (f32, f32) {
    match (fixed_a, fixed_b) {
        (true, true) => (0.0, 0.0),
        (true, false) => (0.0, 1.0),
        (false, true) => (1.0, 0.0),
        (false, false) => {
            let total = radius_a + radius_b;
            if total > 0.0 {
                (radius_b / total, radius_a / total)
            } else {
                (0.5, 0.5)
            }
        }
    }
}
