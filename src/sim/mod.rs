//! Deterministic simulation module
//!
//! All packing logic lives here. This module must be pure and deterministic:
//! - Tick based (no delta time)
//! - No randomness
//! - Stable iteration order (insertion order, pairs visited as ascending `(i, j)`)
//! - No rendering or platform dependencies

pub mod bounds;
pub mod broadphase;
pub mod circle;
pub mod collision;
pub mod manager;

pub use bounds::{BoundaryOutcome, Bounds};
pub use broadphase::{AllPairs, BroadPhase, BroadPhaseKind, Proxy, SpatialHash};
pub use circle::{
    BoundsRule, CircleDelegate, CircleOverrides, CircleSnapshot, PackedCircle, SharedTarget,
};
pub use collision::{CircleContact, circle_contact, correction_shares};
pub use manager::PackedCircleManager;
