//! Navigation grid
//!
//! Discretizes a rectangular world area into square cells, each tagged
//! walkable or blocked by sampling an [`ObstacleQuery`].

use glam::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::physics::{LayerMask, ObstacleQuery};

/// Grid layout and sampling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// World-space center the grid is anchored at
    pub center: Vec2,
    /// World-space extent covered by the grid
    pub world_size: Vec2,
    /// Half the cell size
    pub node_radius: f32,
    /// Obstacle classifications; each one independently vetoes a cell
    pub obstacle_layers: Vec<LayerMask>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            world_size: Vec2::new(50.0, 50.0),
            node_radius: 0.5,
            obstacle_layers: vec![LayerMask::layer(0)],
        }
    }
}

impl GridConfig {
    /// Set the anchor center
    pub fn with_center(mut self, center: Vec2) -> Self {
        self.center = center;
        self
    }

    /// Set the covered world extent
    pub fn with_world_size(mut self, width: f32, height: f32) -> Self {
        self.world_size = Vec2::new(width, height);
        self
    }

    /// Set the node radius (half the cell size)
    pub fn with_node_radius(mut self, radius: f32) -> Self {
        self.node_radius = radius;
        self
    }

    /// Set the vetoing obstacle classifications
    pub fn with_obstacle_layers(mut self, layers: Vec<LayerMask>) -> Self {
        self.obstacle_layers = layers;
        self
    }

    /// Size of one cell in world units
    #[must_use]
    pub fn node_diameter(&self) -> f32 {
        self.node_radius * 2.0
    }
}

/// One cell of the navigation grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridNode {
    /// World-space center of the cell
    pub position: Vec2,
    /// Column
    pub x: usize,
    /// Row
    pub y: usize,
    /// Whether agents can stand here
    pub walkable: bool,
}

/// A 2D navigation grid
#[derive(Debug, Clone)]
pub struct Grid {
    config: GridConfig,
    /// Width in cells
    size_x: usize,
    /// Height in cells
    size_y: usize,
    /// Row-major nodes
    nodes: Vec<GridNode>,
}

impl Grid {
    /// Create a grid with every cell walkable
    #[must_use]
    pub fn new(config: GridConfig) -> Self {
        let diameter = config.node_diameter().max(f32::EPSILON);
        let size_x = ((config.world_size.x / diameter).ceil() as usize).max(1);
        let size_y = ((config.world_size.y / diameter).ceil() as usize).max(1);

        let bottom_left = config.center - config.world_size * 0.5;
        let mut nodes = Vec::with_capacity(size_x * size_y);
        for y in 0..size_y {
            for x in 0..size_x {
                let position = bottom_left
                    + Vec2::new(
                        x as f32 * diameter + config.node_radius,
                        y as f32 * diameter + config.node_radius,
                    );
                nodes.push(GridNode {
                    position,
                    x,
                    y,
                    walkable: true,
                });
            }
        }

        Self {
            config,
            size_x,
            size_y,
            nodes,
        }
    }

    /// Create a grid and sample every cell against `query`
    #[must_use]
    pub fn build(config: GridConfig, query: &dyn ObstacleQuery) -> Self {
        let mut grid = Self::new(config);
        grid.refresh(query);
        log::info!(
            "Built {}x{} navigation grid ({} walkable)",
            grid.size_x,
            grid.size_y,
            grid.walkable_count()
        );
        grid
    }

    /// Re-sample every cell in place, for obstacles that moved or vanished
    pub fn refresh(&mut self, query: &dyn ObstacleQuery) {
        let radius = self.config.node_radius;
        let layers = &self.config.obstacle_layers;
        for node in &mut self.nodes {
            node.walkable = layers
                .iter()
                .all(|&layer| !query.is_occupied(node.position, radius, layer));
        }
    }

    /// Grid configuration
    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Width in cells
    #[must_use]
    pub fn size_x(&self) -> usize {
        self.size_x
    }

    /// Height in cells
    #[must_use]
    pub fn size_y(&self) -> usize {
        self.size_y
    }

    /// Total number of nodes
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.nodes.len()
    }

    /// Number of walkable nodes
    #[must_use]
    pub fn walkable_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.walkable).count()
    }

    /// Flat index of a cell
    #[inline]
    #[must_use]
    pub fn index_of(&self, x: usize, y: usize) -> usize {
        y * self.size_x + x
    }

    /// Node by flat index
    #[inline]
    #[must_use]
    pub fn node(&self, index: usize) -> &GridNode {
        &self.nodes[index]
    }

    /// Bounds-checked lookup
    #[must_use]
    pub fn node_at(&self, x: i64, y: i64) -> Option<&GridNode> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.size_x || y >= self.size_y {
            return None;
        }
        Some(&self.nodes[self.index_of(x, y)])
    }

    /// Override a cell's walkability
    pub fn set_walkable(&mut self, x: usize, y: usize, walkable: bool) {
        if x < self.size_x && y < self.size_y {
            let index = self.index_of(x, y);
            self.nodes[index].walkable = walkable;
        }
    }

    /// Check if a cell is walkable (out of range is never walkable)
    #[must_use]
    pub fn is_walkable(&self, x: usize, y: usize) -> bool {
        x < self.size_x && y < self.size_y && self.nodes[self.index_of(x, y)].walkable
    }

    /// Map a world point to its node; points outside clamp to the edge
    #[must_use]
    pub fn world_to_node(&self, point: Vec2) -> &GridNode {
        let size = self.config.world_size;
        let local = point - self.config.center + size * 0.5;
        let percent_x = if size.x > 0.0 {
            (local.x / size.x).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let percent_y = if size.y > 0.0 {
            (local.y / size.y).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let x = ((self.size_x - 1) as f32 * percent_x).round() as usize;
        let y = ((self.size_y - 1) as f32 * percent_y).round() as usize;
        &self.nodes[self.index_of(x.min(self.size_x - 1), y.min(self.size_y - 1))]
    }

    /// Check whether the node under a world point is walkable
    #[must_use]
    pub fn is_walkable_at(&self, point: Vec2) -> bool {
        self.world_to_node(point).walkable
    }

    /// Up to 8 neighbors; diagonals that would cut a blocked corner are skipped
    #[must_use]
    pub fn neighbors(&self, node: &GridNode) -> SmallVec<[&GridNode; 8]> {
        let mut result = SmallVec::new();
        let (nx, ny) = (node.x as i64, node.y as i64);

        for dy in -1..=1_i64 {
            for dx in -1..=1_i64 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let Some(neighbor) = self.node_at(nx + dx, ny + dy) else {
                    continue;
                };

                if dx != 0 && dy != 0 {
                    let side_x = self.node_at(nx + dx, ny).is_some_and(|n| n.walkable);
                    let side_y = self.node_at(nx, ny + dy).is_some_and(|n| n.walkable);
                    if !side_x || !side_y {
                        continue;
                    }
                }

                result.push(neighbor);
            }
        }

        result
    }

    /// Iterate all nodes in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &GridNode> {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::OpenField;

    fn unit_config(width: f32, height: f32) -> GridConfig {
        GridConfig::default()
            .with_world_size(width, height)
            .with_center(Vec2::new(width * 0.5, height * 0.5))
    }

    /// Blocks the unit cells listed in `cells` on layer 0, and everything
    /// with x >= `pit_column` on layer 1.
    struct Painted {
        cells: Vec<(usize, usize)>,
        pit_column: f32,
    }

    impl ObstacleQuery for Painted {
        fn is_occupied(&self, point: Vec2, _radius: f32, layers: LayerMask) -> bool {
            let cell = (point.x.floor() as usize, point.y.floor() as usize);
            (layers.intersects(LayerMask::layer(0)) && self.cells.contains(&cell))
                || (layers.intersects(LayerMask::layer(1)) && point.x >= self.pit_column)
        }
    }

    #[test]
    fn test_grid_dimensions_round_up() {
        let grid = Grid::new(unit_config(10.5, 4.0));
        assert_eq!(grid.size_x(), 11);
        assert_eq!(grid.size_y(), 4);
        assert_eq!(grid.max_size(), 44);
    }

    #[test]
    fn test_node_centers() {
        let grid = Grid::new(unit_config(10.0, 10.0));
        let node = grid.node_at(3, 7).unwrap();
        assert_eq!(node.position, Vec2::new(3.5, 7.5));
        assert_eq!((node.x, node.y), (3, 7));
        assert!(grid.node_at(10, 0).is_none());
        assert!(grid.node_at(-1, 0).is_none());
    }

    #[test]
    fn test_world_to_node_bijection() {
        let painted = Painted {
            cells: vec![(2, 2), (4, 7)],
            pit_column: 100.0,
        };
        let grid = Grid::build(unit_config(10.0, 10.0), &painted);
        let rebuilt = Grid::build(unit_config(10.0, 10.0), &painted);

        for node in grid.iter() {
            let mapped = grid.world_to_node(node.position);
            assert_eq!((mapped.x, mapped.y), (node.x, node.y));

            let again = rebuilt.world_to_node(node.position);
            assert_eq!(again, mapped);
        }
    }

    #[test]
    fn test_world_to_node_clamps() {
        let grid = Grid::new(unit_config(10.0, 10.0));

        let far = grid.world_to_node(Vec2::new(-100.0, 500.0));
        assert_eq!((far.x, far.y), (0, 9));

        let corner = grid.world_to_node(Vec2::new(1e6, -1e6));
        assert_eq!((corner.x, corner.y), (9, 0));
    }

    #[test]
    fn test_build_and_refresh() {
        let mut painted = Painted {
            cells: vec![(1, 1)],
            pit_column: 100.0,
        };
        let mut grid = Grid::build(unit_config(5.0, 5.0), &painted);
        assert!(!grid.is_walkable(1, 1));
        assert_eq!(grid.walkable_count(), 24);

        painted.cells = vec![(3, 3)];
        grid.refresh(&painted);
        assert!(grid.is_walkable(1, 1));
        assert!(!grid.is_walkable(3, 3));
        assert!(!grid.is_walkable_at(Vec2::new(3.4, 3.6)));
    }

    #[test]
    fn test_every_classification_vetoes() {
        let painted = Painted {
            cells: vec![(0, 0)],
            pit_column: 4.0,
        };
        let config = unit_config(5.0, 5.0)
            .with_obstacle_layers(vec![LayerMask::layer(0), LayerMask::layer(1)]);
        let grid = Grid::build(config, &painted);

        assert!(!grid.is_walkable(0, 0));
        assert!(!grid.is_walkable(4, 2));
        assert!(grid.is_walkable(2, 2));

        // Only walls configured: the pit column stays walkable
        let walls_only = Grid::build(unit_config(5.0, 5.0), &painted);
        assert!(walls_only.is_walkable(4, 2));
    }

    #[test]
    fn test_neighbors_open() {
        let grid = Grid::build(unit_config(3.0, 3.0), &OpenField);
        let center = grid.node_at(1, 1).unwrap();
        assert_eq!(grid.neighbors(center).len(), 8);

        let corner = grid.node_at(0, 0).unwrap();
        assert_eq!(grid.neighbors(corner).len(), 3);
    }

    #[test]
    fn test_no_corner_cutting() {
        let mut grid = Grid::new(unit_config(3.0, 3.0));
        // Orthogonals of the (2, 2) diagonal
        grid.set_walkable(2, 1, false);
        grid.set_walkable(1, 2, false);

        let center = grid.node_at(1, 1).unwrap();
        let neighbors = grid.neighbors(center);
        let coords: Vec<_> = neighbors.iter().map(|n| (n.x, n.y)).collect();

        assert!(!coords.contains(&(2, 2)));
        // Diagonals that only touch one blocked side are also cut
        assert!(!coords.contains(&(2, 0)));
        assert!(!coords.contains(&(0, 2)));
        assert!(coords.contains(&(0, 0)));
        // Blocked orthogonals are still reported; the search filters them
        assert!(coords.contains(&(2, 1)));
        assert_eq!(neighbors.len(), 5);
    }
}
