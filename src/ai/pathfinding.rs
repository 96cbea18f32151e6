//! A* pathfinding on the navigation grid
//!
//! 8-connected search with integer costs (10 straight, 14 diagonal), snapping
//! of blocked endpoints to the nearest walkable node, an expansion cap with a
//! best-effort partial result, and turn-point path simplification.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use glam::Vec2;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::grid::{Grid, GridNode};

/// Cost of an orthogonal step
pub const STRAIGHT_COST: u32 = 10;
/// Cost of a diagonal step (√2 scaled by 10)
pub const DIAGONAL_COST: u32 = 14;

/// Octile distance between two nodes using the step costs
#[must_use]
pub fn octile_distance(a: &GridNode, b: &GridNode) -> u32 {
    let dx = a.x.abs_diff(b.x) as u32;
    let dy = a.y.abs_diff(b.y) as u32;
    if dx > dy {
        DIAGONAL_COST * dy + STRAIGHT_COST * (dx - dy)
    } else {
        DIAGONAL_COST * dx + STRAIGHT_COST * (dy - dx)
    }
}

/// Search limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfinderConfig {
    /// Maximum node expansions per search
    pub max_iterations: usize,
    /// Maximum nodes visited while snapping a blocked endpoint
    pub snap_limit: usize,
}

impl Default for PathfinderConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            snap_limit: 100,
        }
    }
}

/// A computed route
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Simplified waypoints in world coordinates, start cell excluded
    pub waypoints: Vec<Vec2>,
    /// Step cost of the full cell route
    pub cost: u32,
    /// World length of the full cell route, measured from the start cell
    pub length: f32,
    /// Whether this route ends short of the goal
    pub partial: bool,
}

impl Path {
    /// Check if there is nowhere to go (start and goal share a cell)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Final waypoint
    #[must_use]
    pub fn destination(&self) -> Option<Vec2> {
        self.waypoints.last().copied()
    }
}

/// How a search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchOutcome {
    /// Goal reached
    Found,
    /// Fell back to the closest explored node
    Partial,
    /// Nothing usable
    #[default]
    NoPath,
}

/// Bookkeeping for one search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes expanded by A*
    pub expansions: usize,
    /// Result kind
    pub outcome: SearchOutcome,
}

/// Per-search scratch record for a visited node
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    g_cost: u32, // Cost from start
    h_cost: u32, // Heuristic to goal
    parent: Option<usize>,
    closed: bool,
}

impl SearchNode {
    fn f_cost(&self) -> u32 {
        self.g_cost + self.h_cost
    }
}

/// Open set entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    f_cost: u32,
    h_cost: u32,
    index: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap: lowest F, then lowest H, then lowest index
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.h_cost.cmp(&self.h_cost))
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Grid path search
#[derive(Debug, Clone, Default)]
pub struct Pathfinder {
    config: PathfinderConfig,
}

impl Pathfinder {
    /// Create a pathfinder with the given limits
    #[must_use]
    pub fn new(config: PathfinderConfig) -> Self {
        Self { config }
    }

    /// Search limits
    #[must_use]
    pub fn config(&self) -> &PathfinderConfig {
        &self.config
    }

    /// Find a path between two world points
    #[must_use]
    pub fn find_path(&self, grid: &Grid, start: Vec2, goal: Vec2) -> Option<Path> {
        self.find_path_with_stats(grid, start, goal).0
    }

    /// Find a path and report how the search went
    pub fn find_path_with_stats(
        &self,
        grid: &Grid,
        start: Vec2,
        goal: Vec2,
    ) -> (Option<Path>, SearchStats) {
        let mut stats = SearchStats::default();

        let Some(start_node) = self.resolve(grid, start) else {
            return (None, stats);
        };
        let Some(goal_node) = self.resolve(grid, goal) else {
            return (None, stats);
        };

        let start_index = grid.index_of(start_node.x, start_node.y);
        let goal_index = grid.index_of(goal_node.x, goal_node.y);

        let mut open_set = BinaryHeap::new();
        let mut scratch: FxHashMap<usize, SearchNode> = FxHashMap::default();
        let mut closed_order: Vec<usize> = Vec::new();

        let start_h = octile_distance(start_node, goal_node);
        scratch.insert(
            start_index,
            SearchNode {
                g_cost: 0,
                h_cost: start_h,
                parent: None,
                closed: false,
            },
        );
        open_set.push(OpenEntry {
            f_cost: start_h,
            h_cost: start_h,
            index: start_index,
        });

        while let Some(entry) = open_set.pop() {
            let Some(record) = scratch.get_mut(&entry.index) else {
                continue;
            };
            // Skip entries superseded by a cheaper push
            if record.closed || record.f_cost() != entry.f_cost {
                continue;
            }
            if stats.expansions >= self.config.max_iterations {
                break;
            }
            stats.expansions += 1;
            record.closed = true;
            let current_g = record.g_cost;
            closed_order.push(entry.index);

            if entry.index == goal_index {
                stats.outcome = SearchOutcome::Found;
                let path = retrace(grid, &scratch, start_index, goal_index, false);
                return (Some(path), stats);
            }

            let current = grid.node(entry.index);
            for neighbor in grid.neighbors(current) {
                if !neighbor.walkable {
                    continue;
                }
                let neighbor_index = grid.index_of(neighbor.x, neighbor.y);
                let tentative_g = current_g + octile_distance(current, neighbor);

                let improves = match scratch.get(&neighbor_index) {
                    Some(existing) => !existing.closed && tentative_g < existing.g_cost,
                    None => true,
                };
                if !improves {
                    continue;
                }

                let h_cost = octile_distance(neighbor, goal_node);
                scratch.insert(
                    neighbor_index,
                    SearchNode {
                        g_cost: tentative_g,
                        h_cost,
                        parent: Some(entry.index),
                        closed: false,
                    },
                );
                open_set.push(OpenEntry {
                    f_cost: tentative_g + h_cost,
                    h_cost,
                    index: neighbor_index,
                });
            }
        }

        // Goal not reached: settle for the explored node closest to it
        let closest = closed_order
            .iter()
            .copied()
            .min_by_key(|index| scratch[index].h_cost);

        match closest {
            Some(index) if index != start_index => {
                log::debug!(
                    "Partial path after {} expansions ({} nodes short)",
                    stats.expansions,
                    scratch[&index].h_cost / STRAIGHT_COST
                );
                stats.outcome = SearchOutcome::Partial;
                let path = retrace(grid, &scratch, start_index, index, true);
                (Some(path), stats)
            }
            _ => (None, stats),
        }
    }

    /// Map a world point to a walkable node, snapping if needed
    fn resolve<'g>(&self, grid: &'g Grid, point: Vec2) -> Option<&'g GridNode> {
        let node = grid.world_to_node(point);
        if node.walkable {
            return Some(node);
        }
        let snapped = self.nearest_walkable(grid, node);
        match snapped {
            Some(found) => log::trace!(
                "Snapped ({}, {}) to walkable ({}, {})",
                node.x,
                node.y,
                found.x,
                found.y
            ),
            None => log::trace!("No walkable node near ({}, {})", node.x, node.y),
        }
        snapped
    }

    /// Breadth-first search outward for the nearest walkable node
    fn nearest_walkable<'g>(&self, grid: &'g Grid, origin: &GridNode) -> Option<&'g GridNode> {
        let origin_index = grid.index_of(origin.x, origin.y);
        let mut visited = FxHashSet::default();
        let mut queue = VecDeque::new();
        visited.insert(origin_index);
        queue.push_back(origin_index);

        let mut visits = 0;
        while let Some(index) = queue.pop_front() {
            if visits >= self.config.snap_limit {
                break;
            }
            visits += 1;

            let node = grid.node(index);
            if node.walkable {
                return Some(node);
            }
            for neighbor in grid.neighbors(node) {
                let neighbor_index = grid.index_of(neighbor.x, neighbor.y);
                if visited.insert(neighbor_index) {
                    queue.push_back(neighbor_index);
                }
            }
        }

        None
    }
}

/// Walk parents from `end` back to `start` and build the simplified path
fn retrace(
    grid: &Grid,
    scratch: &FxHashMap<usize, SearchNode>,
    start: usize,
    end: usize,
    partial: bool,
) -> Path {
    let mut cells = Vec::new();
    let mut current = end;
    while current != start {
        cells.push(grid.node(current).position);
        match scratch[&current].parent {
            Some(parent) => current = parent,
            None => break,
        }
    }
    cells.reverse();

    let mut route = Vec::with_capacity(cells.len() + 1);
    route.push(grid.node(start).position);
    route.extend_from_slice(&cells);

    Path {
        waypoints: simplify_path(&cells),
        cost: scratch[&end].g_cost,
        length: calculate_path_length(&route),
        partial,
    }
}

/// Collapse runs with the same heading, keeping the first point, every
/// turn point, and the final point
#[must_use]
pub fn simplify_path(points: &[Vec2]) -> Vec<Vec2> {
    const DIRECTION_EPSILON: f32 = 1e-4;

    if points.len() < 2 {
        return points.to_vec();
    }

    let mut simplified = Vec::new();
    let mut direction_old = Vec2::ZERO;
    for pair in points.windows(2) {
        let direction_new = (pair[1] - pair[0]).normalize_or_zero();
        if !direction_new.abs_diff_eq(direction_old, DIRECTION_EPSILON) {
            simplified.push(pair[0]);
        }
        direction_old = direction_new;
    }
    if let Some(&last) = points.last() {
        simplified.push(last);
    }
    simplified
}

/// Calculate total path length
fn calculate_path_length(waypoints: &[Vec2]) -> f32 {
    let mut length = 0.0;
    for i in 1..waypoints.len() {
        length += waypoints[i].distance(waypoints[i - 1]);
    }
    length
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::grid::GridConfig;

    fn open_grid(width: usize, height: usize) -> Grid {
        let (w, h) = (width as f32, height as f32);
        Grid::new(
            GridConfig::default()
                .with_world_size(w, h)
                .with_center(Vec2::new(w * 0.5, h * 0.5)),
        )
    }

    fn cell(x: usize, y: usize) -> Vec2 {
        Vec2::new(x as f32 + 0.5, y as f32 + 0.5)
    }

    #[test]
    fn test_octile_distance() {
        let grid = open_grid(10, 10);
        let a = grid.node_at(0, 0).unwrap();
        let b = grid.node_at(4, 2).unwrap();
        assert_eq!(octile_distance(a, b), 2 * 14 + 2 * 10);
        assert_eq!(octile_distance(b, a), octile_distance(a, b));
        assert_eq!(octile_distance(a, a), 0);
    }

    #[test]
    fn test_diagonal_corner_to_corner() {
        let grid = open_grid(5, 5);
        let path = Pathfinder::default()
            .find_path(&grid, cell(0, 0), cell(4, 4))
            .unwrap();

        assert_eq!(path.cost, 4 * 14);
        assert!(!path.partial);
        // One straight diagonal run collapses to its ends
        assert_eq!(path.waypoints, vec![cell(1, 1), cell(4, 4)]);
    }

    #[test]
    fn test_optimal_cost_on_clear_grid() {
        let grid = open_grid(6, 6);
        let pathfinder = Pathfinder::default();

        for start in grid.iter() {
            for goal in grid.iter() {
                let path = pathfinder
                    .find_path(&grid, start.position, goal.position)
                    .unwrap();
                assert_eq!(
                    path.cost,
                    octile_distance(start, goal),
                    "({}, {}) -> ({}, {})",
                    start.x,
                    start.y,
                    goal.x,
                    goal.y
                );
            }
        }
    }

    #[test]
    fn test_mixed_route_cost() {
        let grid = open_grid(10, 10);
        let path = Pathfinder::default()
            .find_path(&grid, cell(0, 0), cell(4, 2))
            .unwrap();

        assert_eq!(path.cost, 48);
        assert_eq!(path.destination(), Some(cell(4, 2)));
    }

    #[test]
    fn test_direct_path() {
        let grid = open_grid(10, 10);
        let path = Pathfinder::default()
            .find_path(&grid, cell(0, 0), cell(3, 0))
            .unwrap();

        assert_eq!(path.cost, 30);
        assert_eq!(path.waypoints, vec![cell(1, 0), cell(3, 0)]);
        assert!((path.length - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_path_around_wall() {
        let mut grid = open_grid(10, 10);
        for y in 2..8 {
            grid.set_walkable(5, y, false);
        }

        let path = Pathfinder::default()
            .find_path(&grid, cell(2, 5), cell(8, 5))
            .unwrap();

        assert!(!path.partial);
        assert!(path.cost > 60);
        assert!(path.waypoints.len() > 2);
        assert_eq!(path.destination(), Some(cell(8, 5)));
        for waypoint in &path.waypoints {
            assert!(grid.is_walkable_at(*waypoint));
        }
    }

    #[test]
    fn test_same_cell_is_empty() {
        let grid = open_grid(4, 4);
        let path = Pathfinder::default()
            .find_path(&grid, Vec2::new(1.2, 1.3), Vec2::new(1.7, 1.6))
            .unwrap();

        assert!(path.is_empty());
        assert_eq!(path.cost, 0);
    }

    #[test]
    fn test_blocked_goal_snaps() {
        let mut grid = open_grid(10, 10);
        grid.set_walkable(7, 7, false);

        let path = Pathfinder::default()
            .find_path(&grid, cell(0, 0), cell(7, 7))
            .unwrap();

        let end = path.destination().unwrap();
        assert_ne!(end, cell(7, 7));
        assert!(grid.is_walkable_at(end));
        assert!(end.distance(cell(7, 7)) < 1.5);
    }

    #[test]
    fn test_blocked_start_snaps() {
        let mut grid = open_grid(10, 10);
        grid.set_walkable(1, 1, false);

        let path = Pathfinder::default().find_path(&grid, cell(1, 1), cell(8, 1));
        assert!(path.is_some());
    }

    #[test]
    fn test_enclosed_goal_no_path() {
        let mut grid = open_grid(30, 30);
        for y in 5..=25 {
            for x in 5..=25 {
                grid.set_walkable(x, y, false);
            }
        }

        let (path, stats) =
            Pathfinder::default().find_path_with_stats(&grid, cell(1, 1), cell(15, 15));
        assert!(path.is_none());
        assert_eq!(stats.outcome, SearchOutcome::NoPath);
        assert_eq!(stats.expansions, 0);
    }

    #[test]
    fn test_iteration_cap_returns_partial() {
        let grid = open_grid(20, 1);
        let pathfinder = Pathfinder::new(PathfinderConfig {
            max_iterations: 5,
            ..Default::default()
        });

        let (path, stats) = pathfinder.find_path_with_stats(&grid, cell(0, 0), cell(19, 0));
        let path = path.unwrap();

        assert_eq!(stats.expansions, 5);
        assert_eq!(stats.outcome, SearchOutcome::Partial);
        assert!(path.partial);
        assert_eq!(path.waypoints, vec![cell(1, 0), cell(4, 0)]);
    }

    #[test]
    fn test_unreachable_region_returns_partial() {
        let mut grid = open_grid(10, 10);
        // Full-height wall: the right side is reachable by nobody on the left
        for y in 0..10 {
            grid.set_walkable(5, y, false);
        }

        let path = Pathfinder::default()
            .find_path(&grid, cell(1, 5), cell(8, 5))
            .unwrap();

        assert!(path.partial);
        assert_eq!(path.destination(), Some(cell(4, 5)));
    }

    #[test]
    fn test_boxed_in_start_no_path() {
        let mut grid = open_grid(10, 10);
        for (x, y) in [(0, 1), (1, 1), (1, 0)] {
            grid.set_walkable(x, y, false);
        }

        let path = Pathfinder::default().find_path(&grid, cell(0, 0), cell(8, 8));
        assert!(path.is_none());
    }

    #[test]
    fn test_simplify_idempotent() {
        let raw = vec![
            cell(1, 0),
            cell(2, 0),
            cell(3, 1),
            cell(4, 2),
            cell(4, 3),
            cell(4, 4),
            cell(5, 4),
        ];
        let once = simplify_path(&raw);
        assert_eq!(
            once,
            vec![cell(1, 0), cell(2, 0), cell(4, 2), cell(4, 4), cell(5, 4)]
        );

        let twice = simplify_path(&once);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_simplify_short_paths() {
        assert!(simplify_path(&[]).is_empty());
        assert_eq!(simplify_path(&[cell(2, 2)]), vec![cell(2, 2)]);
        assert_eq!(
            simplify_path(&[cell(0, 0), cell(1, 0)]),
            vec![cell(0, 0), cell(1, 0)]
        );
    }

    #[test]
    fn test_searches_are_independent() {
        let mut grid = open_grid(10, 10);
        for y in 0..9 {
            grid.set_walkable(4, y, false);
        }
        let pathfinder = Pathfinder::default();

        let first = pathfinder.find_path(&grid, cell(0, 0), cell(9, 0)).unwrap();
        // A different search in between must not leak parents into a repeat
        let _ = pathfinder.find_path(&grid, cell(9, 9), cell(0, 9));
        let again = pathfinder.find_path(&grid, cell(0, 0), cell(9, 0)).unwrap();

        assert_eq!(first, again);
    }
}
