//! Steering behaviors for agent movement
//!
//! Produce desired directions on the ground plane for the movement actuator.

use glam::Vec2;

/// Output from a steering behavior
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringOutput {
    /// Desired linear direction scaled by urgency
    pub linear: Vec2,
}

impl SteeringOutput {
    /// Zero steering
    pub const ZERO: Self = Self { linear: Vec2::ZERO };

    /// Unit direction of the output, zero if none
    #[must_use]
    pub fn direction(self) -> Vec2 {
        self.linear.normalize_or_zero()
    }

    /// Check if the behavior asks for no movement
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.linear == Vec2::ZERO
    }
}

/// Trait for steering behaviors
pub trait SteeringBehavior {
    /// Calculate steering for an agent at `position`
    fn calculate(&self, position: Vec2) -> SteeringOutput;
}

/// Seek behavior - move towards target
#[derive(Debug, Clone)]
pub struct Seek {
    /// Target position
    pub target: Vec2,
}

impl Seek {
    /// Create a new seek behavior
    #[must_use]
    pub fn new(target: Vec2) -> Self {
        Self { target }
    }
}

impl SteeringBehavior for Seek {
    fn calculate(&self, position: Vec2) -> SteeringOutput {
        SteeringOutput {
            linear: (self.target - position).normalize_or_zero(),
        }
    }
}

/// Flee behavior - move away from a threat while it is inside `panic_radius`
#[derive(Debug, Clone)]
pub struct Flee {
    /// Position to flee from
    pub threat: Vec2,
    /// Beyond this distance the behavior is idle
    pub panic_radius: f32,
}

impl Flee {
    /// Create a new flee behavior
    #[must_use]
    pub fn new(threat: Vec2, panic_radius: f32) -> Self {
        Self {
            threat,
            panic_radius,
        }
    }
}

impl SteeringBehavior for Flee {
    fn calculate(&self, position: Vec2) -> SteeringOutput {
        let away = position - self.threat;
        if away.length() >= self.panic_radius {
            return SteeringOutput::ZERO;
        }
        SteeringOutput {
            linear: away.normalize_or_zero(),
        }
    }
}
