//! Movement actuator boundary
//!
//! The state machine only expresses intent (a direction to move in, a
//! direction to face, stop). [`KinematicMover`] turns that intent into motion
//! on the ground plane.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// The only way an agent's logic affects its position and orientation
pub trait MovementActuator {
    /// Drive in `direction` at full speed; zero is ignored
    fn move_in_direction(&mut self, direction: Vec2);

    /// Turn to face `direction`; zero is ignored
    fn rotate_towards(&mut self, direction: Vec2);

    /// Cancel driven movement
    fn stop(&mut self);

    /// Apply an external shove (hit reactions)
    fn apply_knockback(&mut self, _impulse: Vec2) {}
}

/// Speeds for [`KinematicMover`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoverConfig {
    /// World units per second
    pub move_speed: f32,
    /// Turn blend rate per second
    pub rotation_speed: f32,
    /// Knockback velocity decay per second
    pub knockback_damping: f32,
}

impl Default for MoverConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            rotation_speed: 10.0,
            knockback_damping: 8.0,
        }
    }
}

/// Velocity-driven mover with smoothed turning and decaying knockback
#[derive(Debug, Clone)]
pub struct KinematicMover {
    config: MoverConfig,
    velocity: Vec2,
    knockback: Vec2,
    facing: Vec2,
    desired_facing: Vec2,
    moving: bool,
}

impl KinematicMover {
    /// Create a stationary mover facing +Y
    #[must_use]
    pub fn new(config: MoverConfig) -> Self {
        Self {
            config,
            velocity: Vec2::ZERO,
            knockback: Vec2::ZERO,
            facing: Vec2::Y,
            desired_facing: Vec2::Y,
            moving: false,
        }
    }

    /// Current facing (unit length)
    #[must_use]
    pub fn facing(&self) -> Vec2 {
        self.facing
    }

    /// Check if the mover is being driven
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Advance `position` by one step and blend the facing
    pub fn integrate(&mut self, position: &mut Vec2, dt: f32) {
        *position += (self.velocity + self.knockback) * dt;

        let decay = (1.0 - self.config.knockback_damping * dt).max(0.0);
        self.knockback *= decay;
        if self.knockback.length_squared() < 1e-6 {
            self.knockback = Vec2::ZERO;
        }

        let t = (self.config.rotation_speed * dt).clamp(0.0, 1.0);
        let blended = self.facing.lerp(self.desired_facing, t);
        self.facing = if blended.length_squared() > 1e-8 {
            blended.normalize()
        } else {
            self.desired_facing
        };
    }
}

impl Default for KinematicMover {
    fn default() -> Self {
        Self::new(MoverConfig::default())
    }
}

impl MovementActuator for KinematicMover {
    fn move_in_direction(&mut self, direction: Vec2) {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return;
        }
        self.velocity = direction * self.config.move_speed;
        self.moving = true;
    }

    fn rotate_towards(&mut self, direction: Vec2) {
        let direction = direction.normalize_or_zero();
        if direction != Vec2::ZERO {
            self.desired_facing = direction;
        }
    }

    fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
        self.moving = false;
    }

    fn apply_knockback(&mut self, impulse: Vec2) {
        self.knockback += impulse;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_and_stop() {
        let mut mover = KinematicMover::default();
        let mut position = Vec2::ZERO;

        mover.move_in_direction(Vec2::new(3.0, 0.0));
        assert!(mover.is_moving());
        mover.integrate(&mut position, 0.5);
        assert!((position - Vec2::new(2.5, 0.0)).length() < 1e-5);

        mover.stop();
        mover.integrate(&mut position, 0.5);
        assert!((position - Vec2::new(2.5, 0.0)).length() < 1e-5);
        assert!(!mover.is_moving());
    }

    #[test]
    fn test_zero_direction_ignored() {
        let mut mover = KinematicMover::default();
        mover.move_in_direction(Vec2::ZERO);
        assert!(!mover.is_moving());
        mover.rotate_towards(Vec2::ZERO);

        let mut position = Vec2::ZERO;
        mover.integrate(&mut position, 1.0);
        assert_eq!(mover.facing(), Vec2::Y);
    }

    #[test]
    fn test_rotation_converges() {
        let mut mover = KinematicMover::default();
        let mut position = Vec2::ZERO;
        mover.rotate_towards(Vec2::X);

        // rotation_speed * dt >= 1 snaps straight to the target
        mover.integrate(&mut position, 0.1);
        assert!((mover.facing() - Vec2::X).length() < 1e-5);
    }

    #[test]
    fn test_knockback_decays() {
        let mut mover = KinematicMover::default();
        let mut position = Vec2::ZERO;
        mover.apply_knockback(Vec2::new(4.0, 0.0));

        mover.integrate(&mut position, 0.05);
        assert!(position.x > 0.0);
        let first = position.x;

        for _ in 0..20 {
            mover.integrate(&mut position, 0.05);
        }
        let settled = position.x;
        mover.integrate(&mut position, 0.05);
        assert!(settled > first);
        assert!((position.x - settled).abs() < 1e-3);
    }
}
