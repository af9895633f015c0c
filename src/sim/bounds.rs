//! Logical simulation rectangle and boundary rules

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::circle::BoundsRule;
use crate::consts::{DEFAULT_BOUNDS_HEIGHT, DEFAULT_BOUNDS_WIDTH};

/// Axis-aligned rectangle with a top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(0.0, 0.0, DEFAULT_BOUNDS_WIDTH, DEFAULT_BOUNDS_HEIGHT)
    }
}

/// What a boundary rule did to a circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryOutcome {
    /// Position left as is
    Unchanged,
    /// Circle should move here
    Moved(Vec2),
    /// Circle is entirely outside and should be removed
    Expired,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// True if no part of the circle is inside the rectangle
    pub fn is_entirely_outside(&self, position: Vec2, radius: f32) -> bool {
        position.x - radius > self.right()
            || position.x + radius < self.left()
            || position.y - radius > self.bottom()
            || position.y + radius < self.top()
    }

    /// Evaluate `rule` for a circle at `position`
    pub fn apply(&self, position: Vec2, radius: f32, rule: BoundsRule) -> BoundaryOutcome {
        match rule {
            BoundsRule::Ignore => BoundaryOutcome::Unchanged,
            BoundsRule::Destroy => {
                if self.is_entirely_outside(position, radius) {
                    BoundaryOutcome::Expired
                } else {
                    BoundaryOutcome::Unchanged
                }
            }
            BoundsRule::Wrap => self.wrap(position, radius),
            BoundsRule::Constrain => self.constrain(position, radius),
        }
    }

    /// Once a circle is a full diameter past an edge, bring it back in at the opposite edge
    fn wrap(&self, position: Vec2, radius: f32) -> BoundaryOutcome {
        let diameter = radius * 2.0;
        let mut p = position;

        if p.x - diameter > self.right() {
            p.x = self.left() + radius;
        } else if p.x + diameter < self.left() {
            p.x = self.right() - radius;
        }

        if p.y - diameter > self.bottom() {
            p.y = self.top() + radius;
        } else if p.y + diameter < self.top() {
            p.y = self.bottom() - radius;
        }

        if p == position {
            BoundaryOutcome::Unchanged
        } else {
            BoundaryOutcome::Moved(p)
        }
    }

    fn constrain(&self, position: Vec2, radius: f32) -> BoundaryOutcome {
        let mut p = position;

        if p.x + radius > self.right() {
            p.x = self.right() - radius;
        } else if p.x - radius < self.left() {
            p.x = self.left() + radius;
        }

        if p.y + radius > self.bottom() {
            p.y = self.bottom() - radius;
        } else if p.y - radius < self.top() {
            p.y = self.top() + radius;
        }

        if p == position {
            BoundaryOutcome::Unchanged
        } else {
            BoundaryOutcome::Moved(p)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_edges() {
        let b = Bounds::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(b.left(), 10.0);
        assert_eq!(b.right(), 110.0);
        assert_eq!(b.top(), 20.0);
        assert_eq!(b.bottom(), 70.0);
        assert_eq!(b.center(), Vec2::new(60.0, 45.0));
        assert!(b.contains(Vec2::new(50.0, 50.0)));
        assert!(!b.contains(Vec2::new(5.0, 50.0)));
    }

    #[test]
    fn test_ignore_never_moves() {
        let b = Bounds::new(0.0, 0.0, 100.0, 100.0);
        let far = Vec2::new(-5000.0, 5000.0);
        assert_eq!(b.apply(far, 5.0, BoundsRule::Ignore), BoundaryOutcome::Unchanged);
    }

    #[test]
    fn test_constrain_clamps_inside() {
        let b = Bounds::new(0.0, 0.0, 100.0, 100.0);
        let result = b.apply(Vec2::new(98.0, -3.0), 5.0, BoundsRule::Constrain);
        assert_eq!(result, BoundaryOutcome::Moved(Vec2::new(95.0, 5.0)));

        let inside = b.apply(Vec2::new(50.0, 50.0), 5.0, BoundsRule::Constrain);
        assert_eq!(inside, BoundaryOutcome::Unchanged);
    }

    #[test]
    fn test_wrap_to_opposite_side() {
        let b = Bounds::new(0.0, 0.0, 100.0, 100.0);
        // Past the right edge by more than a diameter
        let result = b.apply(Vec2::new(111.0, 50.0), 5.0, BoundsRule::Wrap);
        assert_eq!(result, BoundaryOutcome::Moved(Vec2::new(5.0, 50.0)));

        // Past the top edge
        let result = b.apply(Vec2::new(50.0, -11.0), 5.0, BoundsRule::Wrap);
        assert_eq!(result, BoundaryOutcome::Moved(Vec2::new(50.0, 95.0)));

        // Only partly out: stays put
        let result = b.apply(Vec2::new(103.0, 50.0), 5.0, BoundsRule::Wrap);
        assert_eq!(result, BoundaryOutcome::Unchanged);
    }

    #[test]
    fn test_destroy_when_entirely_outside() {
        let b = Bounds::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(
            b.apply(Vec2::new(-6.0, 50.0), 5.0, BoundsRule::Destroy),
            BoundaryOutcome::Expired
        );
        assert_eq!(
            b.apply(Vec2::new(-4.0, 50.0), 5.0, BoundsRule::Destroy),
            BoundaryOutcome::Unchanged
        );
    }
}
