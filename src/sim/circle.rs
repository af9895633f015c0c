//! Packed circle entity
//!
//! A movable circle with a radius, a target it drifts toward, collision
//! filtering bits and an opaque delegate (the host's visual object).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// What happens when a circle leaves the manager's bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BoundsRule {
    /// Reappear on the opposite side
    Wrap,
    /// Clamp inside the bounds
    Constrain,
    /// Remove from the manager once entirely outside
    Destroy,
    /// Leave it alone
    #[default]
    Ignore,
}

impl BoundsRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundsRule::Wrap => "wrap",
            BoundsRule::Constrain => "constrain",
            BoundsRule::Destroy => "destroy",
            BoundsRule::Ignore => "ignore",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "wrap" => Some(BoundsRule::Wrap),
            "constrain" | "clamp" => Some(BoundsRule::Constrain),
            "destroy" => Some(BoundsRule::Destroy),
            "ignore" | "none" => Some(BoundsRule::Ignore),
            _ => None,
        }
    }
}

/// A target point that can be shared by many circles
///
/// The host keeps a clone and moves it (e.g. on pointer move); every circle
/// holding a clone sees the new position on the next targeting pass.
#[derive(Debug, Clone, Default)]
pub struct SharedTarget(Rc<Cell<Vec2>>);

impl SharedTarget {
    pub fn new(point: Vec2) -> Self {
        Self(Rc::new(Cell::new(point)))
    }

    #[inline]
    pub fn get(&self) -> Vec2 {
        self.0.get()
    }

    pub fn set(&self, point: Vec2) {
        self.0.set(point);
    }

    /// True if both handles point at the same target
    pub fn ptr_eq(&self, other: &SharedTarget) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Read access to a delegate's on-screen position
///
/// Only needed by [`PackedCircleManager::force_circles_to_match_delegate_positions`];
/// everything else treats the delegate as opaque.
///
/// [`PackedCircleManager::force_circles_to_match_delegate_positions`]: super::PackedCircleManager::force_circles_to_match_delegate_positions
pub trait CircleDelegate {
    fn position(&self) -> Vec2;
}

impl CircleDelegate for Vec2 {
    fn position(&self) -> Vec2 {
        *self
    }
}

impl<T: CircleDelegate> CircleDelegate for Rc<RefCell<T>> {
    fn position(&self) -> Vec2 {
        self.borrow().position()
    }
}

/// Bulk overrides applied by [`PackedCircle::initialize`]
///
/// Only `Some` fields are applied. Deserializable so circles can be described
/// in JSON; `target` and `delegate` are runtime-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleOverrides<D = ()> {
    pub id: Option<u32>,
    pub radius: Option<f32>,
    pub position: Option<Vec2>,
    pub offset: Option<Vec2>,
    pub target_position: Option<Vec2>,
    #[serde(skip)]
    pub target: Option<SharedTarget>,
    pub target_chase_speed: Option<f32>,
    pub is_fixed: Option<bool>,
    pub bounds_rule: Option<BoundsRule>,
    pub collision_group: Option<u32>,
    pub collision_mask: Option<u32>,
    #[serde(skip)]
    pub delegate: Option<D>,
}

impl<D> Default for CircleOverrides<D> {
    fn default() -> Self {
        Self {
            id: None,
            radius: None,
            position: None,
            offset: None,
            target_position: None,
            target: None,
            target_chase_speed: None,
            is_fixed: None,
            bounds_rule: None,
            collision_group: None,
            collision_mask: None,
            delegate: None,
        }
    }
}

/// Serializable view of a circle (for hosts and debugging output)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleSnapshot {
    pub id: u32,
    pub position: Vec2,
    pub radius: f32,
    pub is_fixed: bool,
}

/// A circle managed by a [`super::PackedCircleManager`]
#[derive(Debug, Clone)]
pub struct PackedCircle<D> {
    pub(crate) id: u32,
    pub(crate) position: Vec2,
    /// Net displacement from the last collision call
    pub(crate) offset: Vec2,
    pub(crate) radius: f32,
    /// Always `radius * radius`
    pub(crate) radius_squared: f32,
    pub(crate) target: Option<SharedTarget>,
    pub(crate) target_chase_speed: f32,
    pub(crate) is_fixed: bool,
    pub(crate) bounds_rule: BoundsRule,
    pub(crate) collision_group: u32,
    pub(crate) collision_mask: u32,
    pub(crate) delegate: Option<D>,
    pub(crate) released: bool,
}

impl<D> PackedCircle<D> {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            position: Vec2::ZERO,
            offset: Vec2::ZERO,
            radius: 0.0,
            radius_squared: 0.0,
            target: Some(SharedTarget::new(Vec2::ZERO)),
            target_chase_speed: DEFAULT_CHASE_SPEED,
            is_fixed: false,
            bounds_rule: BoundsRule::Ignore,
            collision_group: DEFAULT_COLLISION_GROUP,
            collision_mask: DEFAULT_COLLISION_MASK,
            delegate: None,
            released: false,
        }
    }

    /// Apply every `Some` field of `overrides` and clear the released flag
    pub fn initialize(&mut self, overrides: CircleOverrides<D>) -> &mut Self {
        if let Some(id) = overrides.id {
            self.id = id;
        }
        if let Some(radius) = overrides.radius {
            self.set_radius(radius);
        }
        if let Some(position) = overrides.position {
            self.set_position(position);
        }
        if let Some(offset) = overrides.offset {
            self.set_offset(offset);
        }
        // A shared handle wins over a plain point
        if let Some(target) = overrides.target {
            self.set_target(target);
        } else if let Some(point) = overrides.target_position {
            self.set_target_position(point);
        } else if self.target.is_none() {
            self.set_target_position(Vec2::ZERO);
        }
        if let Some(speed) = overrides.target_chase_speed {
            self.set_target_chase_speed(speed);
        }
        if let Some(fixed) = overrides.is_fixed {
            self.set_is_fixed(fixed);
        }
        if let Some(rule) = overrides.bounds_rule {
            self.set_bounds_rule(rule);
        }
        if let Some(group) = overrides.collision_group {
            self.set_collision_group(group);
        }
        if let Some(mask) = overrides.collision_mask {
            self.set_collision_mask(mask);
        }
        if let Some(delegate) = overrides.delegate {
            self.set_delegate(delegate);
        }
        self.released = false;
        self
    }

    /// Drop the delegate and target, reset position/offset and mark released
    ///
    /// A released circle is skipped by every manager pass until re-initialized.
    pub fn dealloc(&mut self) {
        self.position = Vec2::ZERO;
        self.offset = Vec2::ZERO;
        self.delegate = None;
        self.target = None;
        self.released = true;
    }

    // === Accessors ===

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn radius_squared(&self) -> f32 {
        self.radius_squared
    }

    pub fn target(&self) -> Option<&SharedTarget> {
        self.target.as_ref()
    }

    pub fn target_position(&self) -> Option<Vec2> {
        self.target.as_ref().map(SharedTarget::get)
    }

    pub fn target_chase_speed(&self) -> f32 {
        self.target_chase_speed
    }

    pub fn is_fixed(&self) -> bool {
        self.is_fixed
    }

    pub fn bounds_rule(&self) -> BoundsRule {
        self.bounds_rule
    }

    pub fn collision_group(&self) -> u32 {
        self.collision_group
    }

    pub fn collision_mask(&self) -> u32 {
        self.collision_mask
    }

    pub fn delegate(&self) -> Option<&D> {
        self.delegate.as_ref()
    }

    pub fn delegate_mut(&mut self) -> Option<&mut D> {
        self.delegate.as_mut()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    // === Mutators (chainable) ===

    /// Set the radius and refresh the cached square
    pub fn set_radius(&mut self, radius: f32) -> &mut Self {
        self.radius = radius;
        self.radius_squared = radius * radius;
        self
    }

    pub fn set_position(&mut self, position: Vec2) -> &mut Self {
        self.position = position;
        self
    }

    pub fn set_offset(&mut self, offset: Vec2) -> &mut Self {
        self.offset = offset;
        self
    }

    /// Give this circle its own private target at `point`
    pub fn set_target_position(&mut self, point: Vec2) -> &mut Self {
        self.target = Some(SharedTarget::new(point));
        self
    }

    /// Chase a target shared with other circles
    pub fn set_target(&mut self, target: SharedTarget) -> &mut Self {
        self.target = Some(target);
        self
    }

    pub fn set_target_chase_speed(&mut self, speed: f32) -> &mut Self {
        self.target_chase_speed = speed;
        self
    }

    pub fn set_is_fixed(&mut self, fixed: bool) -> &mut Self {
        self.is_fixed = fixed;
        self
    }

    pub fn set_bounds_rule(&mut self, rule: BoundsRule) -> &mut Self {
        self.bounds_rule = rule;
        self
    }

    pub fn set_collision_group(&mut self, group: u32) -> &mut Self {
        self.collision_group = group;
        self
    }

    pub fn set_collision_mask(&mut self, mask: u32) -> &mut Self {
        self.collision_mask = mask;
        self
    }

    pub fn set_delegate(&mut self, delegate: D) -> &mut Self {
        self.delegate = Some(delegate);
        self
    }

    // === Queries ===

    /// Point-in-circle test (boundary points are outside)
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.position.distance_squared(point) < self.radius_squared
    }

    /// True if the two circles overlap (`distance < r_a + r_b`)
    pub fn intersects(&self, other: &PackedCircle<D>) -> bool {
        let reach = self.radius + other.radius;
        self.position.distance_squared(other.position) < reach * reach
    }

    /// True if either circle contains the other's center
    ///
    /// Looser than [`Self::intersects`]: it only compares against one radius at a time.
    pub fn contains_center_of(&self, other: &PackedCircle<D>) -> bool {
        let distance_squared = self.position.distance_squared(other.position);
        distance_squared < self.radius_squared || distance_squared < other.radius_squared
    }

    /// Symmetric group/mask filter
    pub fn accepts_collision_with(&self, other: &PackedCircle<D>) -> bool {
        (self.collision_group & other.collision_mask) != 0
            && (other.collision_group & self.collision_mask) != 0
    }

    /// Squared distance to the target (infinite when there is none)
    pub fn distance_squared_to_target(&self) -> f32 {
        self.target_position()
            .map(|t| self.position.distance_squared(t))
            .unwrap_or(f32::INFINITY)
    }

    pub fn snapshot(&self) -> CircleSnapshot {
        CircleSnapshot {
            id: self.id,
            position: self.position,
            radius: self.radius,
            is_fixed: self.is_fixed,
        }
    }
}
