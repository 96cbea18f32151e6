//! Event Queue for simulation output
//!
//! The simulation never calls into presentation or gameplay code directly.
//! It pushes [`GameEvent`]s during a tick; consumers read them after the
//! next [`EventQueue::swap`].
//!
//! # Example
//!
//! ```ignore
//! sim.tick(dt);
//! sim.events_mut().swap();
//! for event in sim.events().iter() {
//!     if let GameEvent::EnemyDied { entity } = event {
//!         play_death_effect(*entity);
//!     }
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec2;
use hecs::Entity;

use crate::ai::EnemyState;

// ============================================================================
// Event Types
// ============================================================================

/// Things that happened during a simulation tick.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GameEvent {
    // -------------------------------------------------------------------------
    // Combat Events
    // -------------------------------------------------------------------------
    /// An enemy took damage.
    EnemyDamaged {
        entity: Entity,
        amount: f32,
        /// Entity that caused the damage, if any
        source: Option<Entity>,
    },

    /// An enemy's health reached zero; it has been removed.
    EnemyDied { entity: Entity },

    /// A melee swing landed on a target.
    TargetHit {
        target: Entity,
        attacker: Entity,
        damage: f32,
    },

    /// A ranged attacker launched a projectile. Flight is up to the consumer.
    ProjectileFired {
        attacker: Entity,
        target: Entity,
        origin: Vec2,
        direction: Vec2,
        speed: f32,
        damage: f32,
    },

    // -------------------------------------------------------------------------
    // Behavior Events
    // -------------------------------------------------------------------------
    /// An enemy changed behavior state.
    StateChanged {
        entity: Entity,
        from: EnemyState,
        to: EnemyState,
    },

    /// A path search for an enemy found nothing usable.
    PathUnavailable { entity: Entity },

    /// An entity was removed from the simulation.
    Despawned { entity: Entity },
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered event queue.
///
/// Events pushed during tick N are readable after the swap that follows it.
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this tick
    pending: VecDeque<GameEvent>,
    /// Events from the previous tick, ready for processing
    processing: VecDeque<GameEvent>,
}

impl EventQueue {
    const DEFAULT_CAPACITY: usize = 64;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new event queue with specified initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            processing: VecDeque::with_capacity(capacity),
        }
    }

    /// Push an event; visible after the next `swap()`.
    #[inline]
    pub fn push(&mut self, event: GameEvent) {
        self.pending.push_back(event);
    }

    /// Swap the pending and processing queues.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over events from the previous tick.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.processing.iter()
    }

    /// Drain all events from the previous tick.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.processing.drain(..)
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    /// Number of events ready for processing.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Number of events waiting for the next swap.
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Clear both buffers.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
