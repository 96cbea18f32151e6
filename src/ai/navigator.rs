//! Shared navigation context and per-agent path following

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::{Grid, GridConfig};
use super::pathfinding::{Path, Pathfinder, PathfinderConfig, SearchStats};
use crate::core::time::Timer;
use crate::physics::ObstacleQuery;

/// One grid and one pathfinder, shared read-only by every agent during a tick
#[derive(Debug, Clone)]
pub struct NavContext {
    pub grid: Grid,
    pub pathfinder: Pathfinder,
}

impl NavContext {
    /// Build the grid against `obstacles`
    #[must_use]
    pub fn build(
        grid: GridConfig,
        pathfinder: PathfinderConfig,
        obstacles: &dyn ObstacleQuery,
    ) -> Self {
        Self {
            grid: Grid::build(grid, obstacles),
            pathfinder: Pathfinder::new(pathfinder),
        }
    }

    /// Find a path on the shared grid
    pub fn find_path(&self, start: Vec2, goal: Vec2) -> (Option<Path>, SearchStats) {
        self.pathfinder
            .find_path_with_stats(&self.grid, start, goal)
    }

    /// Re-sample the grid; call between ticks
    pub fn refresh(&mut self, obstacles: &dyn ObstacleQuery) {
        self.grid.refresh(obstacles);
    }
}

/// Path following settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowerConfig {
    /// Distance at which a waypoint counts as reached
    pub waypoint_threshold: f32,
    /// Seconds between path recomputations
    pub path_update_interval: f32,
}

impl Default for FollowerConfig {
    fn default() -> Self {
        Self {
            waypoint_threshold: 0.3,
            path_update_interval: 0.5,
        }
    }
}

/// Holds an agent's current path and decides when to recompute it
#[derive(Debug, Clone)]
pub struct PathFollower {
    waypoint_threshold: f32,
    refresh: Timer,
    path: Option<Path>,
    waypoint_index: usize,
    last_stats: SearchStats,
}

impl PathFollower {
    /// Create a follower with no path
    #[must_use]
    pub fn new(config: &FollowerConfig) -> Self {
        Self {
            waypoint_threshold: config.waypoint_threshold,
            refresh: Timer::new(config.path_update_interval),
            path: None,
            waypoint_index: 0,
            last_stats: SearchStats::default(),
        }
    }

    /// Distance at which a waypoint counts as reached
    #[must_use]
    pub fn waypoint_threshold(&self) -> f32 {
        self.waypoint_threshold
    }

    /// Advance the refresh timer; `true` when a recompute is due
    pub fn should_update(&mut self, dt: f32) -> bool {
        self.refresh.tick(dt)
    }

    /// Recompute on the next check
    pub fn force_update(&mut self) {
        self.refresh.force();
    }

    /// Request a new path; the current one is kept if nothing usable comes back
    pub fn request(&mut self, nav: &NavContext, from: Vec2, to: Vec2) -> bool {
        let (path, stats) = nav.find_path(from, to);
        self.last_stats = stats;
        match path {
            Some(path) if !path.is_empty() => {
                self.path = Some(path);
                self.waypoint_index = 0;
                true
            }
            _ => false,
        }
    }

    /// Drop the current path
    pub fn clear(&mut self) {
        self.path = None;
        self.waypoint_index = 0;
    }

    /// Current path, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    /// Check if there is a non-empty path
    #[must_use]
    pub fn has_path(&self) -> bool {
        self.path.as_ref().is_some_and(|p| !p.is_empty())
    }

    /// Check if every waypoint has been visited (or there is no path)
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.path
            .as_ref()
            .is_none_or(|p| self.waypoint_index >= p.waypoints.len())
    }

    /// Waypoint currently being approached
    #[must_use]
    pub fn current_waypoint(&self) -> Option<Vec2> {
        self.path
            .as_ref()
            .and_then(|p| p.waypoints.get(self.waypoint_index).copied())
    }

    /// Unit direction toward the current waypoint, zero if none
    #[must_use]
    pub fn direction_to_current(&self, position: Vec2) -> Vec2 {
        self.current_waypoint()
            .map_or(Vec2::ZERO, |w| (w - position).normalize_or_zero())
    }

    /// Distance to the current waypoint, `f32::MAX` if none
    #[must_use]
    pub fn distance_to_current(&self, position: Vec2) -> f32 {
        self.current_waypoint()
            .map_or(f32::MAX, |w| w.distance(position))
    }

    /// Move on to the next waypoint; `false` once past the end
    pub fn advance(&mut self) -> bool {
        self.waypoint_index += 1;
        self.path
            .as_ref()
            .is_some_and(|p| self.waypoint_index < p.waypoints.len())
    }

    /// Final waypoint of the current path
    #[must_use]
    pub fn destination(&self) -> Option<Vec2> {
        self.path.as_ref().and_then(Path::destination)
    }

    /// Stats of the most recent request
    #[must_use]
    pub fn last_stats(&self) -> SearchStats {
        self.last_stats
    }
}
