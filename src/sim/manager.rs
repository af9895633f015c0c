//! Packed circle manager
//!
//! Owns a set of circles and advances them with two relaxation procedures:
//! - targeting: every movable circle covers a fraction of the way to its target
//! - separation: overlapping pairs are pushed apart along the line between centers
//!
//! Both run a configurable number of passes per call. Iterating gives chains of
//! three or more overlapping circles a chance to settle, since a single pairwise
//! pass only resolves one contact at a time. Motion is per call, not per second,
//! so the result depends on how often the host ticks.

use glam::Vec2;

use super::bounds::{BoundaryOutcome, Bounds};
use super::broadphase::{AllPairs, BroadPhase, Proxy};
use super::circle::{CircleDelegate, PackedCircle};
use super::collision::{circle_contact, correction_shares};
use crate::consts::*;
use crate::settings::ManagerSettings;

/// Collection of circles plus the passes that move them
#[derive(Debug)]
pub struct PackedCircleManager<D> {
    /// Insertion ordered; earlier circles win adjustments first within a pass
    circles: Vec<PackedCircle<D>>,
    bounds: Bounds,
    collision_passes: u32,
    targeting_passes: u32,
    collision_padding: f32,
    broad_phase: Box<dyn BroadPhase>,
    // Scratch buffers reused across passes
    proxies: Vec<Proxy>,
    pairs: Vec<(usize, usize)>,
}

impl<D> Default for PackedCircleManager<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> PackedCircleManager<D> {
    pub fn new() -> Self {
        Self {
            circles: Vec::new(),
            bounds: Bounds::default(),
            collision_passes: DEFAULT_COLLISION_PASSES,
            targeting_passes: DEFAULT_TARGETING_PASSES,
            collision_padding: DEFAULT_COLLISION_PADDING,
            broad_phase: Box::new(AllPairs),
            proxies: Vec::new(),
            pairs: Vec::new(),
        }
    }

    pub fn from_settings(settings: &ManagerSettings) -> Self {
        let mut manager = Self::new();
        manager
            .set_bounds(
                settings.bounds.x,
                settings.bounds.y,
                settings.bounds.width,
                settings.bounds.height,
            )
            .set_number_of_collision_passes(settings.collision_passes)
            .set_number_of_targeting_passes(settings.targeting_passes)
            .set_collision_padding(settings.collision_padding)
            .set_broad_phase(settings.broad_phase.build());
        manager
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Logical simulation rectangle (`x, y` is the top-left corner)
    pub fn set_bounds(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        self.bounds = Bounds::new(x, y, width, height);
        self
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Passes per `handle_collisions` call (0 disables separation)
    pub fn set_number_of_collision_passes(&mut self, passes: u32) -> &mut Self {
        self.collision_passes = passes;
        self
    }

    pub fn number_of_collision_passes(&self) -> u32 {
        self.collision_passes
    }

    /// Passes per `push_all_circles_toward_target` call (0 disables targeting)
    pub fn set_number_of_targeting_passes(&mut self, passes: u32) -> &mut Self {
        self.targeting_passes = passes;
        self
    }

    pub fn number_of_targeting_passes(&self) -> u32 {
        self.targeting_passes
    }

    /// Separation reach multiplier (1.0 = circles just touch)
    pub fn set_collision_padding(&mut self, padding: f32) -> &mut Self {
        self.collision_padding = padding;
        self
    }

    pub fn collision_padding(&self) -> f32 {
        self.collision_padding
    }

    pub fn set_broad_phase(&mut self, broad_phase: Box<dyn BroadPhase>) -> &mut Self {
        self.broad_phase = broad_phase;
        self
    }

    // =========================================================================
    // Collection
    // =========================================================================

    /// Append a circle (ids are not checked for duplicates)
    pub fn add_circle(&mut self, circle: PackedCircle<D>) {
        log::debug!(
            "Adding circle {} (r={}) at {:?}",
            circle.id,
            circle.radius,
            circle.position
        );
        self.circles.push(circle);
    }

    /// Remove the first circle with `id`, preserving the order of the rest
    pub fn remove_circle(&mut self, id: u32) -> Option<PackedCircle<D>> {
        let index = self.circles.iter().position(|c| c.id == id)?;
        log::debug!("Removing circle {}", id);
        Some(self.circles.remove(index))
    }

    pub fn circle(&self, id: u32) -> Option<&PackedCircle<D>> {
        self.circles.iter().find(|c| c.id == id)
    }

    pub fn circle_mut(&mut self, id: u32) -> Option<&mut PackedCircle<D>> {
        self.circles.iter_mut().find(|c| c.id == id)
    }

    /// Closest circle whose squared distance to `point` is under `radius² + buffer`
    pub fn circle_at(&self, point: Vec2, buffer: f32) -> Option<&PackedCircle<D>> {
        let mut closest = None;
        let mut closest_distance = f32::MAX;

        for circle in self.circles.iter().filter(|c| !c.released) {
            let distance_squared = circle.position.distance_squared(point);
            if distance_squared < closest_distance
                && distance_squared < circle.radius_squared + buffer
            {
                closest_distance = distance_squared;
                closest = Some(circle);
            }
        }

        closest
    }

    /// Ordered read access for projecting positions back onto delegates
    pub fn all_circles(&self) -> &[PackedCircle<D>] {
        &self.circles
    }

    /// Per-circle mutation; the collection itself cannot change through this
    pub fn all_circles_mut(&mut self) -> &mut [PackedCircle<D>] {
        &mut self.circles
    }

    pub fn len(&self) -> usize {
        self.circles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }

    pub fn clear(&mut self) {
        self.circles.clear();
    }

    /// Drop circles that were deallocated, returning how many went
    pub fn remove_released(&mut self) -> usize {
        let before = self.circles.len();
        self.circles.retain(|c| !c.released);
        let removed = before - self.circles.len();
        if removed > 0 {
            log::debug!("Removed {} released circles", removed);
        }
        removed
    }

    /// Stable sort so circles closest to their targets come first
    pub fn sort_on_distance_to_target(&mut self) {
        self.circles.sort_by(|a, b| {
            a.distance_squared_to_target()
                .total_cmp(&b.distance_squared_to_target())
        });
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Whether a pair takes part in separation at all
    pub fn circles_can_collide(a: &PackedCircle<D>, b: &PackedCircle<D>) -> bool {
        if a.released || b.released {
            return false;
        }
        if a.is_fixed && b.is_fixed {
            return false;
        }
        a.accepts_collision_with(b)
    }

    /// Targeting phase: `position += (target - position) * chase_speed`, per pass
    pub fn push_all_circles_toward_target(&mut self) {
        for _ in 0..self.targeting_passes {
            for circle in self.circles.iter_mut() {
                if circle.is_fixed || circle.released {
                    continue;
                }
                let Some(target) = circle.target_position() else {
                    continue;
                };
                circle.position += (target - circle.position) * circle.target_chase_speed;
            }
        }
    }

    /// Separation phase
    ///
    /// Each pass visits candidate pairs in ascending `(i, j)` order and applies
    /// corrections immediately, so later pairs see earlier pushes. Candidates
    /// come from positions at the start of the pass; with a culling broad phase
    /// a contact created mid-pass is resolved by the next pass instead. Pairs
    /// that are not `i < j < len` are skipped. Every circle's `offset` ends up
    /// holding the net displacement from this call.
    pub fn handle_collisions(&mut self) {
        for circle in self.circles.iter_mut() {
            circle.offset = Vec2::ZERO;
        }

        let padding = self.collision_padding;
        for pass in 0..self.collision_passes {
            self.proxies.clear();
            self.proxies.extend(self.circles.iter().map(|c| Proxy {
                position: c.position,
                reach: c.radius * padding,
            }));
            self.pairs.clear();
            self.broad_phase.collect_pairs(&self.proxies, &mut self.pairs);

            let mut contacts = 0usize;
            for &(i, j) in &self.pairs {
                let Some((a, b)) = pair_mut(&mut self.circles, i, j) else {
                    log::trace!("Skipping malformed candidate pair ({}, {})", i, j);
                    continue;
                };
                if !Self::circles_can_collide(a, b) {
                    continue;
                }

                let contact = circle_contact(a.position, a.radius, b.position, b.radius, padding);
                if !contact.hit {
                    continue;
                }
                contacts += 1;

                let (share_a, share_b) = correction_shares(a.radius, a.is_fixed, b.radius, b.is_fixed);
                let push = contact.normal * contact.penetration;
                let push_a = push * share_a;
                let push_b = push * share_b;

                a.position -= push_a;
                a.offset -= push_a;
                b.position += push_b;
                b.offset += push_b;
            }

            log::trace!("Collision pass {}: {} contacts", pass, contacts);
            if contacts == 0 {
                // Nothing moved, later passes would see the same state
                break;
            }
        }
    }

    /// Apply each circle's bounds rule, returning circles destroyed by it
    ///
    /// Fixed and released circles are left alone.
    pub fn handle_boundaries(&mut self) -> Vec<PackedCircle<D>> {
        let bounds = self.bounds;
        let mut expired = Vec::new();

        let mut index = 0;
        while index < self.circles.len() {
            let circle = &mut self.circles[index];
            if circle.is_fixed || circle.released {
                index += 1;
                continue;
            }

            match bounds.apply(circle.position, circle.radius, circle.bounds_rule) {
                BoundaryOutcome::Unchanged => index += 1,
                BoundaryOutcome::Moved(position) => {
                    circle.position = position;
                    index += 1;
                }
                BoundaryOutcome::Expired => {
                    let circle = self.circles.remove(index);
                    log::debug!("Circle {} left bounds and was destroyed", circle.id);
                    expired.push(circle);
                }
            }
        }

        expired
    }

    /// One host frame: targeting, separation, then bounds
    pub fn tick(&mut self) -> Vec<PackedCircle<D>> {
        self.push_all_circles_toward_target();
        self.handle_collisions();
        self.handle_boundaries()
    }

    /// Sum of `r_a + r_b - distance` over collision-eligible overlapping pairs
    pub fn total_overlap(&self) -> f32 {
        let mut total = 0.0;
        for (i, a) in self.circles.iter().enumerate() {
            for b in &self.circles[i + 1..] {
                if !Self::circles_can_collide(a, b) {
                    continue;
                }
                let overlap = a.radius + b.radius - a.position.distance(b.position);
                if overlap > 0.0 {
                    total += overlap;
                }
            }
        }
        total
    }
}

impl<D: PartialEq> PackedCircleManager<D> {
    pub fn circle_for_delegate(&self, delegate: &D) -> Option<&PackedCircle<D>> {
        self.circles
            .iter()
            .find(|c| c.delegate.as_ref() == Some(delegate))
    }

    pub fn remove_circle_for_delegate(&mut self, delegate: &D) -> Option<PackedCircle<D>> {
        let index = self
            .circles
            .iter()
            .position(|c| c.delegate.as_ref() == Some(delegate))?;
        log::debug!("Removing circle {} by delegate", self.circles[index].id);
        Some(self.circles.remove(index))
    }
}

impl<D: CircleDelegate> PackedCircleManager<D> {
    /// Seed every circle's position from its delegate
    ///
    /// Call once at setup so circles start where their visuals are instead of
    /// jumping from the origin on the first frame.
    pub fn force_circles_to_match_delegate_positions(&mut self) {
        for circle in self.circles.iter_mut() {
            if let Some(delegate) = circle.delegate.as_ref() {
                circle.position = delegate.position();
            }
        }
    }
}

/// Two distinct mutable elements, or `None` unless `i < j < len`
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> Option<(&mut T, &mut T)> {
    if i >= j || j >= items.len() {
        return None;
    }
    let (head, tail) = items.split_at_mut(j);
    Some((&mut head[i], &mut tail[0]))
}
