//! Obstacle world backed by rapier3d
//!
//! Static obstacles live as parentless colliders standing on the ground
//! plane. The 2D navigation plane maps `Vec2(x, y)` onto world `(x, z)`;
//! every query is evaluated at [`PROBE_HEIGHT`].

use glam::Vec2;
use rapier3d::parry::shape::Ball;
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use super::query::{LayerMask, LineOfSight, ObstacleQuery};

/// Height above the ground at which occupancy and sight are probed
pub const PROBE_HEIGHT: f32 = 0.5;

/// Handle to an obstacle collider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObstacleHandle(pub rapier3d::geometry::ColliderHandle);

/// Footprint of an obstacle on the ground plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleShape {
    /// Axis-aligned box
    Box { center: Vec2, half_extents: Vec2 },
    /// Round pillar
    Pillar { center: Vec2, radius: f32 },
}

/// A serializable obstacle description
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleDesc {
    pub shape: ObstacleShape,
    /// Classifications this obstacle belongs to
    pub layers: LayerMask,
    /// Height of the obstacle (walls taller than the probe block sight)
    #[serde(default = "default_height")]
    pub height: f32,
}

fn default_height() -> f32 {
    2.0
}

impl ObstacleDesc {
    /// A box obstacle with default height
    #[must_use]
    pub fn wall(center: Vec2, half_extents: Vec2, layers: LayerMask) -> Self {
        Self {
            shape: ObstacleShape::Box {
                center,
                half_extents,
            },
            layers,
            height: default_height(),
        }
    }

    /// A pillar obstacle with default height
    #[must_use]
    pub fn pillar(center: Vec2, radius: f32, layers: LayerMask) -> Self {
        Self {
            shape: ObstacleShape::Pillar { center, radius },
            layers,
            height: default_height(),
        }
    }
}

fn groups_for(layers: LayerMask) -> InteractionGroups {
    InteractionGroups::new(Group::from_bits_truncate(layers.0), Group::ALL)
}

fn filter_for(layers: LayerMask) -> QueryFilter<'static> {
    QueryFilter::default().groups(InteractionGroups::new(
        Group::ALL,
        Group::from_bits_truncate(layers.0),
    ))
}

/// Static obstacle set answering occupancy and line-of-sight queries
pub struct ObstacleWorld {
    /// Rigid body set (empty, required by the query API)
    rigid_body_set: RigidBodySet,
    /// Collider set
    collider_set: ColliderSet,
    /// Island manager, needed for collider removal
    island_manager: IslandManager,
    /// Query pipeline for overlap tests and raycasting
    query_pipeline: QueryPipeline,
}

impl ObstacleWorld {
    /// Create an empty obstacle world
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            island_manager: IslandManager::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Build a world from a list of descriptions
    pub fn from_descs<'a>(descs: impl IntoIterator<Item = &'a ObstacleDesc>) -> Self {
        let mut world = Self::new();
        for desc in descs {
            world.add(desc);
        }
        world
    }

    /// Insert an obstacle
    pub fn add(&mut self, desc: &ObstacleDesc) -> ObstacleHandle {
        let half_height = desc.height * 0.5;
        let builder = match desc.shape {
            ObstacleShape::Box {
                center,
                half_extents,
            } => ColliderBuilder::cuboid(half_extents.x, half_height, half_extents.y)
                .translation(vector![center.x, half_height, center.y]),
            ObstacleShape::Pillar { center, radius } => {
                ColliderBuilder::cylinder(half_height, radius)
                    .translation(vector![center.x, half_height, center.y])
            }
        };
        let collider = builder.collision_groups(groups_for(desc.layers)).build();
        let handle = ObstacleHandle(self.collider_set.insert(collider));
        self.query_pipeline.update(&self.collider_set);
        handle
    }

    /// Remove an obstacle (an opened door, a destroyed crate)
    pub fn remove(&mut self, handle: ObstacleHandle) -> bool {
        let removed = self
            .collider_set
            .remove(
                handle.0,
                &mut self.island_manager,
                &mut self.rigid_body_set,
                false,
            )
            .is_some();
        if removed {
            self.query_pipeline.update(&self.collider_set);
        }
        removed
    }

    /// Number of obstacles
    pub fn len(&self) -> usize {
        self.collider_set.len()
    }

    /// Check if there are no obstacles
    pub fn is_empty(&self) -> bool {
        self.collider_set.is_empty()
    }
}

impl Default for ObstacleWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl ObstacleQuery for ObstacleWorld {
    fn is_occupied(&self, point: Vec2, radius: f32, layers: LayerMask) -> bool {
        if layers.is_empty() {
            return false;
        }
        let shape = Ball::new(radius);
        let shape_pos = Isometry::translation(point.x, PROBE_HEIGHT, point.y);

        self.query_pipeline
            .intersection_with_shape(
                &self.rigid_body_set,
                &self.collider_set,
                &shape_pos,
                &shape,
                filter_for(layers),
            )
            .is_some()
    }
}

impl LineOfSight for ObstacleWorld {
    fn is_clear(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        layers: LayerMask,
    ) -> bool {
        let direction = direction.normalize_or_zero();
        if layers.is_empty() || direction == Vec2::ZERO || max_distance <= 0.0 {
            return true;
        }
        let ray = Ray::new(
            point![origin.x, PROBE_HEIGHT, origin.y],
            vector![direction.x, 0.0, direction.y],
        );

        self.query_pipeline
            .cast_ray(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter_for(layers),
            )
            .is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLS: LayerMask = LayerMask::layer(0);
    const PITS: LayerMask = LayerMask::layer(1);

    fn world_with_wall() -> ObstacleWorld {
        let mut world = ObstacleWorld::new();
        world.add(&ObstacleDesc::wall(
            Vec2::new(5.0, 5.0),
            Vec2::new(1.0, 1.0),
            WALLS,
        ));
        world
    }

    #[test]
    fn test_occupancy_respects_layers() {
        let world = world_with_wall();

        assert!(world.is_occupied(Vec2::new(5.0, 5.0), 0.5, WALLS));
        assert!(!world.is_occupied(Vec2::new(5.0, 5.0), 0.5, PITS));
        assert!(!world.is_occupied(Vec2::new(0.0, 0.0), 0.5, WALLS));
        assert!(world.is_occupied(Vec2::new(5.0, 5.0), 0.5, WALLS.with(PITS)));
    }

    #[test]
    fn test_line_of_sight_blocked_by_wall() {
        let world = world_with_wall();

        // Ray along the row of the wall
        assert!(!world.is_clear(Vec2::new(0.0, 5.0), Vec2::X, 10.0, WALLS));
        // Stops short of the wall
        assert!(world.is_clear(Vec2::new(0.0, 5.0), Vec2::X, 2.0, WALLS));
        // Other layer does not occlude
        assert!(world.is_clear(Vec2::new(0.0, 5.0), Vec2::X, 10.0, PITS));
        // Parallel row clears
        assert!(world.can_see(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), WALLS));
    }

    #[test]
    fn test_remove_obstacle() {
        let mut world = ObstacleWorld::new();
        let door = world.add(&ObstacleDesc::pillar(Vec2::new(2.0, 2.0), 0.5, WALLS));
        assert_eq!(world.len(), 1);
        assert!(world.is_occupied(Vec2::new(2.0, 2.0), 0.25, WALLS));

        assert!(world.remove(door));
        assert!(world.is_empty());
        assert!(!world.is_occupied(Vec2::new(2.0, 2.0), 0.25, WALLS));
    }
}
