//! Enemy state machine
//!
//! Each enemy owns its perception timer, path follower and attack capability.
//! The driver hands it an [`EnemyContext`] once per tick; everything the
//! enemy does to the world goes through the context's movement actuator.
//!
//! # States
//!
//! - `Idle` stands still until perception finds a target
//! - `Chasing` follows a path toward the target's live position
//! - `SearchingLastKnown` walks to where the target was last seen
//! - `Attacking` holds position while the attack runs
//! - `Stunned` suspends movement and path refresh until the stun expires

use std::fmt;

use glam::Vec2;
use hecs::Entity;
use serde::{Deserialize, Serialize};

use super::attack::{Attack, AttackSpec, AttackStrike, AttackTarget};
use super::movement::{MovementActuator, MoverConfig};
use super::navigator::{FollowerConfig, NavContext, PathFollower};
use super::pathfinding::SearchStats;
use super::perception::{PerceptionConfig, TargetLookup, can_perceive, select_target};
use super::steering::{Flee, Seek, SteeringBehavior};
use crate::core::time::{Countdown, Timer};
use crate::physics::LineOfSight;

// ============================================================================
// State
// ============================================================================

/// Behavior state of an enemy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    #[default]
    Idle,
    Chasing,
    SearchingLastKnown,
    Attacking,
    Stunned,
}

impl EnemyState {
    /// State name for logging
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Chasing => "Chasing",
            Self::SearchingLastKnown => "SearchingLastKnown",
            Self::Attacking => "Attacking",
            Self::Stunned => "Stunned",
        }
    }
}

impl fmt::Display for EnemyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A recorded state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub from: EnemyState,
    pub to: EnemyState,
}

// ============================================================================
// Configuration
// ============================================================================

/// Everything needed to build an enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub max_health: f32,
    pub perception: PerceptionConfig,
    pub follower: FollowerConfig,
    pub movement: MoverConfig,
    pub attack: AttackSpec,
    /// Attackers that keep their distance back off inside `range * retreat_fraction`
    pub retreat_fraction: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            perception: PerceptionConfig::default(),
            follower: FollowerConfig::default(),
            movement: MoverConfig::default(),
            attack: AttackSpec::default(),
            retreat_fraction: 0.5,
        }
    }
}

impl EnemyConfig {
    /// Set the maximum health
    #[must_use]
    pub fn with_max_health(mut self, max_health: f32) -> Self {
        self.max_health = max_health;
        self
    }

    /// Set the perception settings
    #[must_use]
    pub fn with_perception(mut self, perception: PerceptionConfig) -> Self {
        self.perception = perception;
        self
    }

    /// Set the attack
    #[must_use]
    pub fn with_attack(mut self, attack: AttackSpec) -> Self {
        self.attack = attack;
        self
    }
}

// ============================================================================
// Targets and damage
// ============================================================================

/// The target an enemy is currently tracking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetTrack {
    pub entity: Entity,
    /// Last position actually perceived; frozen while out of sight
    pub last_known: Vec2,
    pub visible: bool,
}

/// Who dealt damage, and from where
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageSource {
    pub entity: Entity,
    pub position: Vec2,
}

/// Result of [`Enemy::take_damage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Already dead
    Ignored,
    Survived,
    Died,
}

/// Callback fired once when the enemy dies
pub type DeathCallback = Box<dyn FnMut() + Send + Sync>;

/// Per-tick view of the world handed to [`Enemy::tick`]
pub struct EnemyContext<'a> {
    pub dt: f32,
    pub position: Vec2,
    pub nav: &'a NavContext,
    pub sight: &'a dyn LineOfSight,
    pub targets: &'a dyn TargetLookup,
    pub mover: &'a mut dyn MovementActuator,
}

// ============================================================================
// Enemy
// ============================================================================

/// A pursuing enemy agent
pub struct Enemy {
    name: String,
    config: EnemyConfig,
    state: EnemyState,
    attack: Box<dyn Attack>,
    follower: PathFollower,
    perception: Timer,
    roster: Vec<Entity>,
    target: Option<TargetTrack>,
    health: f32,
    stun: Countdown,
    damage_memory: Countdown,
    enabled: bool,
    transitions: Vec<StateChange>,
    last_search: Option<SearchStats>,
    on_death: Option<DeathCallback>,
}

impl Enemy {
    /// Create an idle enemy at full health; the first tick polls perception
    #[must_use]
    pub fn new(name: impl Into<String>, config: EnemyConfig) -> Self {
        Self {
            name: name.into(),
            attack: config.attack.build(),
            follower: PathFollower::new(&config.follower),
            perception: Timer::ready(config.perception.poll_interval),
            health: config.max_health,
            config,
            state: EnemyState::Idle,
            roster: Vec::new(),
            target: None,
            stun: Countdown::default(),
            damage_memory: Countdown::default(),
            enabled: true,
            transitions: Vec::new(),
            last_search: None,
            on_death: None,
        }
    }

    /// Replace the attack capability
    #[must_use]
    pub fn with_attack(mut self, attack: Box<dyn Attack>) -> Self {
        self.attack = attack;
        self
    }

    /// Register the death notification
    #[must_use]
    pub fn with_on_death(mut self, callback: DeathCallback) -> Self {
        self.on_death = Some(callback);
        self
    }

    /// Wire up dependencies; without navigation the enemy disables itself
    pub fn initialize(&mut self, nav: Option<&NavContext>, roster: Vec<Entity>) -> bool {
        self.roster = roster;
        if nav.is_none() {
            log::error!("{}: no navigation context, enemy disabled", self.name);
            self.enabled = false;
        }
        self.enabled
    }

    /// Replace the potential target roster
    pub fn set_roster(&mut self, roster: Vec<Entity>) {
        self.roster = roster;
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn config(&self) -> &EnemyConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> EnemyState {
        self.state
    }

    #[must_use]
    pub fn roster(&self) -> &[Entity] {
        &self.roster
    }

    /// Tracked target, visible or not
    #[must_use]
    pub fn target(&self) -> Option<&TargetTrack> {
        self.target.as_ref()
    }

    /// Check if a target is currently visible
    #[must_use]
    pub fn has_target(&self) -> bool {
        self.target.is_some_and(|t| t.visible)
    }

    #[must_use]
    pub fn follower(&self) -> &PathFollower {
        &self.follower
    }

    #[must_use]
    pub fn attack(&self) -> &dyn Attack {
        self.attack.as_ref()
    }

    #[must_use]
    pub fn health(&self) -> f32 {
        self.health
    }

    #[must_use]
    pub fn max_health(&self) -> f32 {
        self.config.max_health
    }

    /// Health in `[0, 1]` for health bars
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.config.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.config.max_health).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Distance from `position` to the tracked target's last known position
    #[must_use]
    pub fn distance_to_target(&self, position: Vec2) -> Option<f32> {
        self.target.map(|t| position.distance(t.last_known))
    }

    /// Transitions since the last drain, oldest first
    pub fn drain_transitions(&mut self) -> std::vec::Drain<'_, StateChange> {
        self.transitions.drain(..)
    }

    /// Stats of the path search made this tick, if any
    pub fn take_last_search(&mut self) -> Option<SearchStats> {
        self.last_search.take()
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// Run one step of the state machine
    pub fn tick(&mut self, ctx: &mut EnemyContext<'_>) {
        if !self.enabled || self.is_dead() {
            return;
        }

        self.damage_memory.tick(ctx.dt);
        if self.perception.tick(ctx.dt) {
            self.update_perception(ctx);
        }
        self.track_target(ctx);

        if self.state == EnemyState::Stunned {
            self.stun.tick(ctx.dt);
            if self.stun.is_running() {
                return;
            }
            self.end_stun();
        }

        if self.follower.should_update(ctx.dt) {
            self.update_path(ctx);
        }
        self.execute_state(ctx);
    }

    /// Advance the attack's timers; returns a strike when damage lands
    pub fn update_attack(&mut self, dt: f32, origin: Vec2, facing: Vec2) -> Option<AttackStrike> {
        if !self.enabled || self.is_dead() {
            return None;
        }
        self.attack.update(dt, origin, facing)
    }

    fn update_perception(&mut self, ctx: &EnemyContext<'_>) {
        let current = self.target.map(|t| t.entity);
        let extra = current.filter(|e| !self.roster.contains(e));
        let candidates = self
            .roster
            .iter()
            .copied()
            .chain(extra)
            .filter_map(|e| ctx.targets.position_of(e).map(|p| (e, p)));

        let seen = select_target(
            ctx.position,
            candidates,
            &self.config.perception,
            self.damage_memory.is_running(),
            ctx.sight,
        );

        match seen {
            Some(sighting) => {
                let switched = current != Some(sighting.entity);
                self.target = Some(TargetTrack {
                    entity: sighting.entity,
                    last_known: sighting.position,
                    visible: true,
                });
                match self.state {
                    EnemyState::Idle | EnemyState::SearchingLastKnown => {
                        self.set_state(EnemyState::Chasing);
                        self.follower.force_update();
                    }
                    EnemyState::Chasing if switched => self.follower.force_update(),
                    _ => {}
                }
            }
            None => {
                let Some(track) = self.target.as_mut() else {
                    return;
                };
                track.visible = false;
                if self.state == EnemyState::Chasing {
                    self.set_state(EnemyState::SearchingLastKnown);
                    self.follower.force_update();
                }
            }
        }
    }

    /// Follow a visible target while it stays perceivable; forget vanished
    /// roster members.
    ///
    /// Between polls the last known position only moves while the target is
    /// still in range and in sight. Entities outside the lookup that are not
    /// on the roster (a damage source that is not a potential target) keep
    /// their last known position.
    fn track_target(&mut self, ctx: &EnemyContext<'_>) {
        let Some(track) = self.target else {
            return;
        };
        match ctx.targets.position_of(track.entity) {
            Some(position) if track.visible => {
                let perceived = can_perceive(
                    ctx.position,
                    position,
                    &self.config.perception,
                    self.damage_memory.is_running(),
                    ctx.sight,
                );
                if let Some(t) = self.target.as_mut().filter(|_| perceived) {
                    t.last_known = position;
                }
            }
            Some(_) => {}
            None if self.roster.contains(&track.entity) => self.forget(track.entity),
            None => {}
        }
    }

    fn update_path(&mut self, ctx: &EnemyContext<'_>) {
        let Some(track) = self.target else {
            return;
        };
        match self.state {
            EnemyState::Chasing if track.visible => self.request_path(ctx, track.last_known),
            EnemyState::SearchingLastKnown => {
                if ctx.position.distance(track.last_known) < self.follower.waypoint_threshold() {
                    self.give_up_search();
                } else {
                    self.request_path(ctx, track.last_known);
                }
            }
            _ => {}
        }
    }

    fn request_path(&mut self, ctx: &EnemyContext<'_>, goal: Vec2) {
        if !self.follower.request(ctx.nav, ctx.position, goal) {
            log::trace!("{}: no new path to {goal}", self.name);
        }
        self.last_search = Some(self.follower.last_stats());
    }

    fn execute_state(&mut self, ctx: &mut EnemyContext<'_>) {
        match self.state {
            EnemyState::Idle | EnemyState::Stunned => ctx.mover.stop(),
            EnemyState::Chasing => self.chase(ctx),
            EnemyState::SearchingLastKnown => self.search(ctx),
            EnemyState::Attacking => self.hold_attack(ctx),
        }
    }

    fn chase(&mut self, ctx: &mut EnemyContext<'_>) {
        let Some(track) = self.target.filter(|t| t.visible) else {
            if !self.follow_path(ctx) {
                ctx.mover.stop();
            }
            return;
        };

        let distance = ctx.position.distance(track.last_known);
        if distance <= self.attack.range() {
            if self.attack.can_attack() && self.begin_attack(track, ctx) {
                return;
            }
            if self.attack.maintain_distance() {
                self.keep_distance(ctx, track.last_known);
                return;
            }
        }

        if !self.follow_path(ctx) {
            // Same cell or no route: line of sight is established, so close in directly
            let direction = Seek::new(track.last_known)
                .calculate(ctx.position)
                .direction();
            if direction == Vec2::ZERO {
                ctx.mover.stop();
            } else {
                ctx.mover.move_in_direction(direction);
                ctx.mover.rotate_towards(direction);
            }
        }
    }

    fn search(&mut self, ctx: &mut EnemyContext<'_>) {
        let Some(track) = self.target else {
            self.set_state(EnemyState::Idle);
            ctx.mover.stop();
            return;
        };

        let remaining = ctx.position.distance(track.last_known);
        if remaining < self.follower.waypoint_threshold() {
            self.give_up_search();
            ctx.mover.stop();
            return;
        }

        if self.follow_path(ctx) {
            return;
        }
        if remaining < ctx.nav.grid.config().node_diameter() {
            let direction = Seek::new(track.last_known)
                .calculate(ctx.position)
                .direction();
            ctx.mover.move_in_direction(direction);
            ctx.mover.rotate_towards(direction);
        } else {
            self.give_up_search();
            ctx.mover.stop();
        }
    }

    fn hold_attack(&mut self, ctx: &mut EnemyContext<'_>) {
        ctx.mover.stop();
        let track = self.target.filter(|t| t.visible);
        if let Some(t) = track {
            ctx.mover.rotate_towards(t.last_known - ctx.position);
        }
        if self.attack.is_attacking() {
            return;
        }

        let Some(track) = track else {
            self.exit_attack_state();
            return;
        };
        let distance = ctx.position.distance(track.last_known);
        let range = self.attack.range();
        let crowded =
            self.attack.maintain_distance() && distance < range * self.config.retreat_fraction;
        if distance > range || crowded {
            self.exit_attack_state();
            return;
        }

        if self.attack.can_attack() {
            self.attack.start_attack(AttackTarget {
                entity: track.entity,
                position: track.last_known,
            });
        }
    }

    fn begin_attack(&mut self, track: TargetTrack, ctx: &mut EnemyContext<'_>) -> bool {
        let started = self.attack.start_attack(AttackTarget {
            entity: track.entity,
            position: track.last_known,
        });
        if started {
            self.enter_attack_state(ctx.mover);
            ctx.mover.rotate_towards(track.last_known - ctx.position);
        }
        started
    }

    /// Back off from a target inside the retreat distance, otherwise hold
    fn keep_distance(&mut self, ctx: &mut EnemyContext<'_>, threat: Vec2) {
        ctx.mover.rotate_towards(threat - ctx.position);

        let retreat = self.attack.range() * self.config.retreat_fraction;
        let away = Flee::new(threat, retreat).calculate(ctx.position).direction();
        let step = ctx.nav.grid.config().node_diameter();
        if away != Vec2::ZERO && ctx.nav.grid.is_walkable_at(ctx.position + away * step) {
            ctx.mover.move_in_direction(away);
        } else {
            ctx.mover.stop();
        }
    }

    /// Steer along the current path; `false` once there is nothing to follow
    fn follow_path(&mut self, ctx: &mut EnemyContext<'_>) -> bool {
        if self.follower.distance_to_current(ctx.position) <= self.follower.waypoint_threshold() {
            self.follower.advance();
        }
        let Some(waypoint) = self.follower.current_waypoint() else {
            self.follower.clear();
            return false;
        };

        let direction = Seek::new(waypoint).calculate(ctx.position).direction();
        ctx.mover.move_in_direction(direction);
        ctx.mover.rotate_towards(direction);
        true
    }

    fn give_up_search(&mut self) {
        log::debug!("{}: last known position reached, target lost", self.name);
        self.target = None;
        self.follower.clear();
        self.set_state(EnemyState::Idle);
    }

    fn end_stun(&mut self) {
        match self.target {
            Some(track) if track.visible => {
                self.set_state(EnemyState::Chasing);
                self.follower.force_update();
            }
            Some(_) => {
                self.set_state(EnemyState::SearchingLastKnown);
                self.follower.force_update();
            }
            None => self.set_state(EnemyState::Idle),
        }
    }

    fn set_state(&mut self, next: EnemyState) {
        if next == self.state {
            return;
        }
        let previous = self.state;
        if previous == EnemyState::Attacking && self.attack.is_attacking() {
            self.attack.cancel_attack();
        }
        self.state = next;
        log::debug!("{}: {} -> {}", self.name, previous, next);
        self.transitions.push(StateChange {
            from: previous,
            to: next,
        });
    }

    // ------------------------------------------------------------------------
    // External commands
    // ------------------------------------------------------------------------

    /// Interrupt everything for `duration` seconds
    pub fn stun(&mut self, duration: f32, mover: &mut dyn MovementActuator) {
        if !self.enabled || self.is_dead() {
            return;
        }
        if self.attack.is_attacking() {
            self.attack.cancel_attack();
        }
        self.follower.clear();
        mover.stop();
        self.stun = Countdown::new(duration);
        self.set_state(EnemyState::Stunned);
    }

    /// Apply damage; a source becomes the target regardless of range
    pub fn take_damage(&mut self, amount: f32, source: Option<DamageSource>) -> DamageOutcome {
        if self.is_dead() {
            return DamageOutcome::Ignored;
        }
        self.health = (self.health - amount.max(0.0)).max(0.0);
        log::debug!(
            "{}: took {amount} damage ({}/{})",
            self.name,
            self.health,
            self.config.max_health
        );

        if self.is_dead() {
            self.die();
            return DamageOutcome::Died;
        }

        if let Some(source) = source {
            self.target = Some(TargetTrack {
                entity: source.entity,
                last_known: source.position,
                visible: true,
            });
            self.damage_memory = Countdown::new(self.config.perception.damage_memory);
            if matches!(
                self.state,
                EnemyState::Idle | EnemyState::SearchingLastKnown
            ) {
                self.set_state(EnemyState::Chasing);
            }
        }
        self.follower.force_update();
        DamageOutcome::Survived
    }

    fn die(&mut self) {
        log::info!("{} died", self.name);
        if self.attack.is_attacking() {
            self.attack.cancel_attack();
        }
        self.follower.clear();
        self.target = None;
        if let Some(mut callback) = self.on_death.take() {
            callback();
        }
    }

    /// Chase a specific target
    pub fn set_target(&mut self, entity: Entity, position: Vec2) {
        self.target = Some(TargetTrack {
            entity,
            last_known: position,
            visible: true,
        });
        if matches!(
            self.state,
            EnemyState::Idle | EnemyState::SearchingLastKnown
        ) {
            self.set_state(EnemyState::Chasing);
        }
        self.follower.force_update();
    }

    /// Drop the path, stop and go idle
    pub fn stop_movement(&mut self, mover: &mut dyn MovementActuator) {
        self.follower.clear();
        mover.stop();
        if self.state != EnemyState::Stunned {
            self.set_state(EnemyState::Idle);
        }
    }

    /// Pick the chase back up if a target is visible
    pub fn resume_movement(&mut self) {
        if !self.has_target() {
            return;
        }
        if self.state == EnemyState::Idle {
            self.set_state(EnemyState::Chasing);
        }
        self.follower.force_update();
    }

    /// Stand still and commit to attacking
    pub fn enter_attack_state(&mut self, mover: &mut dyn MovementActuator) {
        if self.state == EnemyState::Stunned {
            return;
        }
        mover.stop();
        self.set_state(EnemyState::Attacking);
    }

    /// Leave the attack state toward whatever the target situation calls for
    pub fn exit_attack_state(&mut self) {
        if self.state != EnemyState::Attacking {
            return;
        }
        match self.target {
            Some(track) if track.visible => {
                self.set_state(EnemyState::Chasing);
                self.follower.force_update();
            }
            Some(_) => {
                self.set_state(EnemyState::SearchingLastKnown);
                self.follower.force_update();
            }
            None => self.set_state(EnemyState::Idle),
        }
    }

    /// Drop every reference to a despawned entity
    pub fn forget(&mut self, entity: Entity) {
        self.roster.retain(|e| *e != entity);
        if self.target.is_none_or(|t| t.entity != entity) {
            return;
        }
        log::debug!("{}: target {entity:?} no longer exists", self.name);
        self.target = None;
        self.follower.clear();
        if self.state != EnemyState::Stunned {
            self.set_state(EnemyState::Idle);
        }
    }
}

impl fmt::Debug for Enemy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enemy")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("health", &self.health)
            .field("target", &self.target)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}
