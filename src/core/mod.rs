//! Core simulation module
//!
//! Contains the simulation driver, arena configuration, events and timers

mod config;
mod debug;
mod events;
mod simulation;
pub(crate) mod time;

pub use config::{ArenaConfig, ConfigError, EnemySpawn, RunConfig, TargetSpawn};
pub use debug::{PathStats, SimStats, TickStats};
pub use events::{EventQueue, GameEvent};
pub use simulation::{ArenaHandles, HealthSample, SimError, Simulation};
pub use time::{Countdown, Timer};
