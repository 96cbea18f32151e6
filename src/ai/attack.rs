//! Attack capabilities
//!
//! The enemy state machine sees an attack only through the [`Attack`] trait:
//! it reads range and readiness flags and issues start/cancel. Timing
//! (cooldown, swing duration, the moment damage lands) is advanced by the
//! driver through [`Attack::update`], which reports an [`AttackStrike`] for
//! the driver to resolve against the world.

use std::fmt;

use glam::Vec2;
use hecs::Entity;
use serde::{Deserialize, Serialize};

use crate::physics::LayerMask;

/// What an attack is aimed at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackTarget {
    pub entity: Entity,
    pub position: Vec2,
}

/// The moment an attack takes effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackStrike {
    /// Damage everything inside a circle in front of the attacker
    Melee {
        center: Vec2,
        radius: f32,
        damage: f32,
    },
    /// Launch a projectile toward the target
    Projectile {
        origin: Vec2,
        direction: Vec2,
        speed: f32,
        damage: f32,
        target: Entity,
        /// Collision radius of the projectile
        radius: f32,
        /// Seconds before the projectile expires unspent
        lifetime: f32,
        /// Obstacle classifications that stop it
        blocked_by: LayerMask,
    },
}

/// Attack capability injected into an enemy
pub trait Attack: fmt::Debug + Send + Sync {
    /// Reach of the attack
    fn range(&self) -> f32;

    /// Off cooldown and not mid-swing
    fn can_attack(&self) -> bool;

    /// Mid-swing
    fn is_attacking(&self) -> bool;

    /// Whether the attacker backs away from targets that get too close
    fn maintain_distance(&self) -> bool {
        false
    }

    /// Begin a swing; returns `false` if not ready
    fn start_attack(&mut self, target: AttackTarget) -> bool;

    /// Abort the current swing without starting the cooldown
    fn cancel_attack(&mut self);

    /// Advance timers; returns a strike on the tick damage lands
    fn update(&mut self, dt: f32, origin: Vec2, facing: Vec2) -> Option<AttackStrike>;
}

/// Timing shared by every attack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    pub range: f32,
    /// Seconds between the end of one swing and the next
    pub cooldown: f32,
    /// Length of a swing
    pub duration: f32,
    /// Delay from swing start to the strike; never lands if >= duration
    pub strike_delay: f32,
    pub damage: f32,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            range: 2.0,
            cooldown: 1.0,
            duration: 0.5,
            strike_delay: 0.2,
            damage: 10.0,
        }
    }
}

/// Swing state machine shared by melee and ranged attacks
#[derive(Debug, Clone, Default)]
struct SwingTimer {
    cooldown_timer: f32,
    attack_timer: f32,
    strike_timer: f32,
    attacking: bool,
    struck: bool,
    target: Option<AttackTarget>,
}

impl SwingTimer {
    fn can_attack(&self) -> bool {
        self.cooldown_timer <= 0.0 && !self.attacking
    }

    fn start(&mut self, config: &AttackConfig, target: AttackTarget) -> bool {
        if !self.can_attack() {
            return false;
        }
        self.target = Some(target);
        self.attacking = true;
        self.struck = false;
        self.attack_timer = config.duration;
        self.strike_timer = config.strike_delay;
        true
    }

    fn cancel(&mut self) {
        self.attacking = false;
        self.attack_timer = 0.0;
        self.target = None;
    }

    /// Advance; returns the target on the tick the strike lands
    fn update(&mut self, config: &AttackConfig, dt: f32) -> Option<AttackTarget> {
        if self.cooldown_timer > 0.0 {
            self.cooldown_timer -= dt;
        }
        if !self.attacking {
            return None;
        }

        self.attack_timer -= dt;
        if self.attack_timer <= 0.0 {
            // Swing over before the strike could land
            self.attacking = false;
            self.cooldown_timer = config.cooldown;
            self.target = None;
            return None;
        }

        if self.struck {
            return None;
        }
        self.strike_timer -= dt;
        if self.strike_timer <= 0.0 {
            self.struck = true;
            return self.target;
        }
        None
    }
}

/// Close-range swing hitting a circle in front of the attacker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeleeConfig {
    pub attack: AttackConfig,
    pub hitbox_radius: f32,
    /// Distance of the hitbox center in front of the attacker
    pub hitbox_offset: f32,
}

impl Default for MeleeConfig {
    fn default() -> Self {
        Self {
            attack: AttackConfig::default(),
            hitbox_radius: 1.0,
            hitbox_offset: 1.0,
        }
    }
}

/// Melee attack
#[derive(Debug, Clone)]
pub struct MeleeAttack {
    config: MeleeConfig,
    swing: SwingTimer,
}

impl MeleeAttack {
    #[must_use]
    pub fn new(config: MeleeConfig) -> Self {
        Self {
            config,
            swing: SwingTimer::default(),
        }
    }
}

impl Attack for MeleeAttack {
    fn range(&self) -> f32 {
        self.config.attack.range
    }

    fn can_attack(&self) -> bool {
        self.swing.can_attack()
    }

    fn is_attacking(&self) -> bool {
        self.swing.attacking
    }

    fn start_attack(&mut self, target: AttackTarget) -> bool {
        self.swing.start(&self.config.attack, target)
    }

    fn cancel_attack(&mut self) {
        self.swing.cancel();
    }

    fn update(&mut self, dt: f32, origin: Vec2, facing: Vec2) -> Option<AttackStrike> {
        self.swing.update(&self.config.attack, dt)?;
        Some(AttackStrike::Melee {
            center: origin + facing.normalize_or_zero() * self.config.hitbox_offset,
            radius: self.config.hitbox_radius,
            damage: self.config.attack.damage,
        })
    }
}

/// Projectile attack settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangedConfig {
    pub attack: AttackConfig,
    pub projectile_speed: f32,
    pub projectile_radius: f32,
    pub projectile_lifetime: f32,
    pub projectile_blockers: LayerMask,
}

impl Default for RangedConfig {
    fn default() -> Self {
        Self {
            attack: AttackConfig {
                range: 8.0,
                strike_delay: 0.3,
                ..AttackConfig::default()
            },
            projectile_speed: 15.0,
            projectile_radius: 0.25,
            projectile_lifetime: 5.0,
            projectile_blockers: LayerMask::layer(0),
        }
    }
}

/// Ranged attack; always keeps its distance
#[derive(Debug, Clone)]
pub struct RangedAttack {
    config: RangedConfig,
    swing: SwingTimer,
}

impl RangedAttack {
    #[must_use]
    pub fn new(config: RangedConfig) -> Self {
        Self {
            config,
            swing: SwingTimer::default(),
        }
    }
}

impl Attack for RangedAttack {
    fn range(&self) -> f32 {
        self.config.attack.range
    }

    fn can_attack(&self) -> bool {
        self.swing.can_attack()
    }

    fn is_attacking(&self) -> bool {
        self.swing.attacking
    }

    fn maintain_distance(&self) -> bool {
        true
    }

    fn start_attack(&mut self, target: AttackTarget) -> bool {
        self.swing.start(&self.config.attack, target)
    }

    fn cancel_attack(&mut self) {
        self.swing.cancel();
    }

    fn update(&mut self, dt: f32, origin: Vec2, facing: Vec2) -> Option<AttackStrike> {
        let target = self.swing.update(&self.config.attack, dt)?;
        let aim = (target.position - origin).normalize_or_zero();
        Some(AttackStrike::Projectile {
            origin,
            direction: if aim == Vec2::ZERO { facing } else { aim },
            speed: self.config.projectile_speed,
            damage: self.config.attack.damage,
            target: target.entity,
            radius: self.config.projectile_radius,
            lifetime: self.config.projectile_lifetime,
            blocked_by: self.config.projectile_blockers,
        })
    }
}

/// Serializable choice of attack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttackSpec {
    Melee(MeleeConfig),
    Ranged(RangedConfig),
}

impl Default for AttackSpec {
    fn default() -> Self {
        Self::Melee(MeleeConfig::default())
    }
}

impl AttackSpec {
    /// Instantiate the attack
    #[must_use]
    pub fn build(&self) -> Box<dyn Attack> {
        match self {
            Self::Melee(config) => Box::new(MeleeAttack::new(config.clone())),
            Self::Ranged(config) => Box::new(RangedAttack::new(config.clone())),
        }
    }
}
