//! Common ECS components

use glam::Vec2;
use hecs::Entity;

use crate::core::Countdown;
use crate::physics::LayerMask;

/// Position on the navigation plane
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position(pub Vec2);

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }
}

/// Marks an entity enemies may pick as a target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PotentialTarget;

/// Name component for debugging
#[derive(Debug, Clone)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// A projectile in flight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub attacker: Entity,
    /// World units per second
    pub velocity: Vec2,
    pub damage: f32,
    pub radius: f32,
    pub lifetime: Countdown,
    pub blocked_by: LayerMask,
}
