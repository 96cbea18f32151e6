//! Target perception
//!
//! Picks the nearest potential target an agent can currently see. Line of
//! sight is always required; the detection range is waived when the agent is
//! configured to be always aware or was recently damaged.

use glam::Vec2;
use hecs::Entity;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::physics::{LayerMask, LineOfSight};

/// Perception settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Maximum distance at which targets are noticed
    pub detection_range: f32,
    /// Ignore the detection range entirely
    pub always_aware: bool,
    /// Seconds between perception polls
    pub poll_interval: f32,
    /// Classifications that block sight
    pub occluders: LayerMask,
    /// Seconds after taking damage during which range gating is waived
    pub damage_memory: f32,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            detection_range: 5.0,
            always_aware: false,
            poll_interval: 0.2,
            occluders: LayerMask::layer(0),
            damage_memory: 3.0,
        }
    }
}

/// Resolves target handles to live positions
pub trait TargetLookup {
    /// Current position, or `None` if the entity no longer exists
    fn position_of(&self, entity: Entity) -> Option<Vec2>;
}

impl TargetLookup for FxHashMap<Entity, Vec2> {
    fn position_of(&self, entity: Entity) -> Option<Vec2> {
        self.get(&entity).copied()
    }
}

/// A target picked by perception
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    pub entity: Entity,
    pub position: Vec2,
    pub distance: f32,
}

/// Check whether a single target position is perceivable right now
#[must_use]
pub fn can_perceive(
    origin: Vec2,
    position: Vec2,
    config: &PerceptionConfig,
    range_waived: bool,
    sight: &dyn LineOfSight,
) -> bool {
    let in_range = config.always_aware
        || range_waived
        || origin.distance(position) <= config.detection_range;
    in_range && sight.can_see(origin, position, config.occluders)
}

/// Select the nearest visible candidate.
///
/// `range_waived` lifts the detection range (recent damage); the config's
/// `always_aware` flag does the same. Equal distances keep the earlier
/// candidate.
pub fn select_target(
    origin: Vec2,
    candidates: impl IntoIterator<Item = (Entity, Vec2)>,
    config: &PerceptionConfig,
    range_waived: bool,
    sight: &dyn LineOfSight,
) -> Option<Sighting> {
    let mut best: Option<Sighting> = None;

    for (entity, position) in candidates {
        let distance = origin.distance(position);
        if best.is_some_and(|b| distance >= b.distance) {
            continue;
        }
        if !can_perceive(origin, position, config, range_waived, sight) {
            continue;
        }
        best = Some(Sighting {
            entity,
            position,
            distance,
        });
    }

    best
}
