//! Enemy pursuit AI on a navigation grid
//!
//! This crate provides:
//! - A walkability grid sampled from an obstacle world (rapier3d)
//! - Bounded A* pathfinding with partial-path fallback
//! - An enemy state machine with perception, path following and attacks
//! - A headless simulation driver with an `hecs` agent registry

pub mod ai;
pub mod core;
pub mod ecs;
pub mod physics;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        AttackSpec, DamageOutcome, Enemy, EnemyConfig, EnemyState, Grid, GridConfig,
        MeleeConfig, NavContext, Path, Pathfinder, PathfinderConfig, PerceptionConfig,
        RangedConfig,
    };
    pub use crate::core::{ArenaConfig, ConfigError, GameEvent, SimError, Simulation};
    pub use crate::ecs::{Name, Position, PotentialTarget, World};
    pub use crate::physics::{LayerMask, ObstacleDesc, ObstacleWorld};
    pub use glam::Vec2;
    pub use hecs::Entity;
}
