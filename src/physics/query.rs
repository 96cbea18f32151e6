//! Collaborator contracts for world queries
//!
//! The navigation core never talks to a physics engine directly. It asks two
//! narrow questions, "is this region occupied?" and "is this segment clear?",
//! through the traits below.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Bitmask of obstacle classifications.
///
/// Each bit is one classification (walls, pits, doors...). Queries pass the
/// mask of classifications they care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Matches nothing
    pub const NONE: Self = Self(0);
    /// Matches every classification
    pub const ALL: Self = Self(u32::MAX);

    /// Mask with a single layer bit set
    #[must_use]
    pub const fn layer(index: u32) -> Self {
        Self(1 << index)
    }

    /// Union of two masks
    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check whether the two masks share any layer
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Check if no layer is set
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Obstacle occupancy query.
///
/// Used once per cell per classification while building or refreshing a grid.
pub trait ObstacleQuery {
    /// Returns `true` if any obstacle on `layers` overlaps the disc at `point`.
    fn is_occupied(&self, point: Vec2, radius: f32, layers: LayerMask) -> bool;
}

/// Straight-line occlusion query.
pub trait LineOfSight {
    /// Returns `true` if nothing on `layers` blocks the segment starting at
    /// `origin` along `direction` for `max_distance` units.
    fn is_clear(&self, origin: Vec2, direction: Vec2, max_distance: f32, layers: LayerMask)
    -> bool;

    /// Convenience wrapper testing the segment between two points
    fn can_see(&self, from: Vec2, to: Vec2, layers: LayerMask) -> bool {
        let offset = to - from;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return true;
        }
        self.is_clear(from, offset / distance, distance, layers)
    }
}

/// An empty world: nothing is ever occupied or occluded.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenField;

impl ObstacleQuery for OpenField {
    fn is_occupied(&self, _point: Vec2, _radius: f32, _layers: LayerMask) -> bool {
        false
    }
}

impl LineOfSight for OpenField {
    fn is_clear(
        &self,
        _origin: Vec2,
        _direction: Vec2,
        _max_distance: f32,
        _layers: LayerMask,
    ) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_mask_ops() {
        let walls = LayerMask::layer(0);
        let pits = LayerMask::layer(3);
        let both = walls.with(pits);

        assert_eq!(both.0, 0b1001);
        assert!(both.intersects(walls));
        assert!(!walls.intersects(pits));
        assert!(LayerMask::NONE.is_empty());
        assert!(LayerMask::ALL.intersects(pits));
    }

    #[test]
    fn test_can_see_zero_length() {
        struct Blocked;
        impl LineOfSight for Blocked {
            fn is_clear(&self, _: Vec2, _: Vec2, _: f32, _: LayerMask) -> bool {
                false
            }
        }

        // Degenerate segment never queries the backend
        assert!(Blocked.can_see(Vec2::ONE, Vec2::ONE, LayerMask::ALL));
        assert!(!Blocked.can_see(Vec2::ZERO, Vec2::ONE, LayerMask::ALL));
    }
}
