//! Packed Circles - iterative circle packing around moving targets
//!
//! Core modules:
//! - `sim`: Deterministic simulation (circles, separation passes, targeting, bounds)
//! - `settings`: Data-driven manager configuration (JSON)
//!
//! The host owns the frame loop. Each frame it calls
//! [`PackedCircleManager::push_all_circles_toward_target`] and then
//! [`PackedCircleManager::handle_collisions`], and afterwards copies every
//! circle's position back onto its own visual object.

pub mod settings;
pub mod sim;

pub use settings::{ManagerSettings, SettingsError};
pub use sim::{
    AllPairs, BoundaryOutcome, Bounds, BoundsRule, BroadPhase, BroadPhaseKind, CircleDelegate,
    CircleOverrides, CircleSnapshot, PackedCircle, PackedCircleManager, SharedTarget, SpatialHash,
};

/// Simulation defaults
pub mod consts {
    /// Fraction of the remaining distance to target covered per targeting pass
    pub const DEFAULT_CHASE_SPEED: f32 = 0.02;

    /// Collision passes per `handle_collisions` call
    pub const DEFAULT_COLLISION_PASSES: u32 = 1;
    /// Targeting passes per `push_all_circles_toward_target` call
    pub const DEFAULT_TARGETING_PASSES: u32 = 1;

    /// Separation reach multiplier: circles settle with a ~8% gap
    pub const DEFAULT_COLLISION_PADDING: f32 = 1.08;

    /// Default collision group (bit 0)
    pub const DEFAULT_COLLISION_GROUP: u32 = 1;
    /// Default collision mask (collide with everything)
    pub const DEFAULT_COLLISION_MASK: u32 = u32::MAX;

    /// Default logical bounds
    pub const DEFAULT_BOUNDS_WIDTH: f32 = 800.0;
    pub const DEFAULT_BOUNDS_HEIGHT: f32 = 600.0;
}
