//! AI and navigation module
//!
//! Grid navigation, A* pathfinding, perception, steering, attacks and the
//! enemy state machine that ties them together.

mod attack;
mod enemy;
mod grid;
mod movement;
mod navigator;
mod pathfinding;
mod perception;
mod steering;

pub use attack::{
    Attack, AttackConfig, AttackSpec, AttackStrike, AttackTarget, MeleeAttack, MeleeConfig,
    RangedAttack, RangedConfig,
};
pub use enemy::{
    DamageOutcome, DamageSource, DeathCallback, Enemy, EnemyConfig, EnemyContext, EnemyState,
    StateChange, TargetTrack,
};
pub use grid::{Grid, GridConfig, GridNode};
pub use movement::{KinematicMover, MovementActuator, MoverConfig};
pub use navigator::{FollowerConfig, NavContext, PathFollower};
pub use pathfinding::{
    DIAGONAL_COST, Path, Pathfinder, PathfinderConfig, STRAIGHT_COST, SearchOutcome, SearchStats,
    octile_distance, simplify_path,
};
pub use perception::{PerceptionConfig, Sighting, TargetLookup, can_perceive, select_target};
pub use steering::{Flee, Seek, SteeringBehavior, SteeringOutput};
