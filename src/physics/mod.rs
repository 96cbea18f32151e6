//! Physics queries module
//!
//! World-query contracts used by navigation and perception, with an
//! obstacle world built on top of rapier3d

mod query;
mod world;

pub use query::{LayerMask, LineOfSight, ObstacleQuery, OpenField};
pub use world::{ObstacleDesc, ObstacleHandle, ObstacleShape, ObstacleWorld, PROBE_HEIGHT};
