//! Simulation driver
//!
//! Owns the obstacle world, the shared navigation context and the agent
//! registry, and advances every enemy one synchronous step per [`tick`].
//! Results leave the simulation as [`GameEvent`]s.
//!
//! [`tick`]: Simulation::tick

use std::time::Instant;

use glam::Vec2;
use hecs::Entity;
use rustc_hash::FxHashMap;

use super::config::ArenaConfig;
use super::debug::SimStats;
use super::events::{EventQueue, GameEvent};
use super::time::Countdown;
use crate::ai::{
    AttackStrike, DamageOutcome, DamageSource, Enemy, EnemyConfig, EnemyContext, EnemyState,
    KinematicMover, MovementActuator, NavContext, SearchOutcome,
};
use crate::ecs::{Name, Position, PotentialTarget, Projectile, World};
use crate::physics::{LineOfSight, ObstacleDesc, ObstacleHandle, ObstacleWorld};

/// Errors returned by simulation commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    /// The handle is stale or was never issued
    NoSuchEntity(Entity),
    /// The entity exists but is not an enemy
    NotAnEnemy(Entity),
    /// The entity exists but is not a potential target
    NotATarget(Entity),
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::NoSuchEntity(e) => write!(f, "no such entity: {e:?}"),
            SimError::NotAnEnemy(e) => write!(f, "entity {e:?} is not an enemy"),
            SimError::NotATarget(e) => write!(f, "entity {e:?} is not a potential target"),
        }
    }
}

impl std::error::Error for SimError {}

fn component_error(
    entity: Entity,
    error: hecs::ComponentError,
    missing: fn(Entity) -> SimError,
) -> SimError {
    match error {
        hecs::ComponentError::NoSuchEntity => SimError::NoSuchEntity(entity),
        hecs::ComponentError::MissingComponent(_) => missing(entity),
    }
}

/// Health bar data for presentation, sampled after a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthSample {
    pub entity: Entity,
    pub position: Vec2,
    /// Health in `[0, 1]`
    pub fraction: f32,
}

/// Entities spawned from an arena, in configuration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArenaHandles {
    pub targets: Vec<Entity>,
    pub enemies: Vec<Entity>,
}

/// Headless enemy pursuit simulation
pub struct Simulation {
    world: World,
    obstacles: ObstacleWorld,
    nav: Option<NavContext>,
    events: EventQueue,
    stats: SimStats,
    time: f32,
}

impl Simulation {
    /// Create a simulation; enemies spawned without `nav` stay disabled
    pub fn new(obstacles: ObstacleWorld, nav: Option<NavContext>) -> Self {
        Self {
            world: World::new(),
            obstacles,
            nav,
            events: EventQueue::new(),
            stats: SimStats::new(),
            time: 0.0,
        }
    }

    /// Build obstacles and the grid, then spawn targets followed by enemies
    pub fn from_arena(arena: &ArenaConfig) -> (Self, ArenaHandles) {
        let obstacles = ObstacleWorld::from_descs(&arena.obstacles);
        let nav = NavContext::build(arena.grid.clone(), arena.pathfinder.clone(), &obstacles);
        let mut sim = Self::new(obstacles, Some(nav));

        let targets = arena
            .targets
            .iter()
            .map(|t| sim.spawn_target(t.name.as_deref(), t.position))
            .collect();
        let enemies = arena
            .enemies
            .iter()
            .map(|e| sim.spawn_enemy(&e.name, e.position, &e.config))
            .collect();

        log::info!(
            "Arena '{}': {} obstacles, {} targets, {} enemies",
            arena.name,
            arena.obstacles.len(),
            arena.targets.len(),
            arena.enemies.len()
        );
        (sim, ArenaHandles { targets, enemies })
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn nav(&self) -> Option<&NavContext> {
        self.nav.as_ref()
    }

    pub fn obstacles(&self) -> &ObstacleWorld {
        &self.obstacles
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Simulated seconds so far
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Position of any entity
    pub fn position(&self, entity: Entity) -> Option<Vec2> {
        self.world.position(entity)
    }

    /// Current state of an enemy
    pub fn enemy_state(&self, entity: Entity) -> Option<EnemyState> {
        self.world.get::<Enemy>(entity).ok().map(|e| e.state())
    }

    /// Run `f` against an enemy
    pub fn with_enemy<R>(&self, entity: Entity, f: impl FnOnce(&Enemy) -> R) -> Result<R, SimError> {
        let enemy = self
            .world
            .get::<Enemy>(entity)
            .map_err(|e| component_error(entity, e, SimError::NotAnEnemy))?;
        Ok(f(&*enemy))
    }

    // ------------------------------------------------------------------------
    // Spawning
    // ------------------------------------------------------------------------

    /// Add a potential target
    pub fn spawn_target(&mut self, name: Option<&str>, position: Vec2) -> Entity {
        let entity = match name {
            Some(name) => self
                .world
                .spawn((Position(position), PotentialTarget, Name::new(name))),
            None => self.world.spawn((Position(position), PotentialTarget)),
        };
        log::debug!("Spawned target {entity:?} at {position}");
        entity
    }

    /// Add an enemy; its roster is the set of targets alive right now
    pub fn spawn_enemy(&mut self, name: &str, position: Vec2, config: &EnemyConfig) -> Entity {
        let mut enemy = Enemy::new(name, config.clone());
        enemy.initialize(self.nav.as_ref(), self.world.target_roster());
        let mover = KinematicMover::new(config.movement.clone());

        let entity = self
            .world
            .spawn((Position(position), Name::new(name), enemy, mover));
        log::debug!("Spawned enemy '{name}' {entity:?} at {position}");
        entity
    }

    /// Give every enemy the current target set
    pub fn refresh_rosters(&mut self) {
        let roster = self.world.target_roster();
        for (_, enemy) in self.world.query_mut::<&mut Enemy>() {
            enemy.set_roster(roster.clone());
        }
    }

    /// Remove an entity and drop every enemy's reference to it
    pub fn despawn(&mut self, entity: Entity) -> Result<(), SimError> {
        self.world
            .despawn(entity)
            .map_err(|_| SimError::NoSuchEntity(entity))?;
        for (_, enemy) in self.world.query_mut::<&mut Enemy>() {
            enemy.forget(entity);
        }
        self.events.push(GameEvent::Despawned { entity });
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Teleport a target
    pub fn move_target(&mut self, entity: Entity, position: Vec2) -> Result<(), SimError> {
        self.world
            .get::<PotentialTarget>(entity)
            .map_err(|e| component_error(entity, e, SimError::NotATarget))?;
        if let Ok(mut current) = self.world.get_mut::<Position>(entity) {
            current.0 = position;
        }
        Ok(())
    }

    /// Damage an enemy; a dead enemy is removed immediately
    pub fn apply_damage(
        &mut self,
        entity: Entity,
        amount: f32,
        source: Option<Entity>,
    ) -> Result<DamageOutcome, SimError> {
        let damage_source = source.and_then(|s| {
            self.world.position(s).map(|position| DamageSource {
                entity: s,
                position,
            })
        });

        let outcome = {
            let mut enemy = self
                .world
                .get_mut::<Enemy>(entity)
                .map_err(|e| component_error(entity, e, SimError::NotAnEnemy))?;
            enemy.take_damage(amount, damage_source)
        };

        if outcome != DamageOutcome::Ignored {
            self.events.push(GameEvent::EnemyDamaged {
                entity,
                amount,
                source,
            });
        }
        if outcome == DamageOutcome::Died {
            self.stats.deaths += 1;
            self.events.push(GameEvent::EnemyDied { entity });
            self.despawn(entity)?;
        }
        Ok(outcome)
    }

    /// Shove an enemy and stun it for `stun_duration` seconds
    pub fn apply_knockback(
        &mut self,
        entity: Entity,
        impulse: Vec2,
        stun_duration: f32,
    ) -> Result<(), SimError> {
        if !self.world.contains(entity) {
            return Err(SimError::NoSuchEntity(entity));
        }
        let Ok((enemy, mover)) = self
            .world
            .inner
            .query_one_mut::<(&mut Enemy, &mut KinematicMover)>(entity)
        else {
            return Err(SimError::NotAnEnemy(entity));
        };

        mover.apply_knockback(impulse);
        if stun_duration > 0.0 {
            enemy.stun(stun_duration, mover);
        }
        Ok(())
    }

    /// Add an obstacle; call [`Simulation::refresh_grid`] afterwards
    pub fn add_obstacle(&mut self, desc: &ObstacleDesc) -> ObstacleHandle {
        self.obstacles.add(desc)
    }

    /// Remove an obstacle; call [`Simulation::refresh_grid`] afterwards
    pub fn remove_obstacle(&mut self, handle: ObstacleHandle) -> bool {
        self.obstacles.remove(handle)
    }

    /// Re-sample walkability after obstacles changed
    pub fn refresh_grid(&mut self) {
        if let Some(nav) = self.nav.as_mut() {
            nav.refresh(&self.obstacles);
            log::debug!(
                "Grid refreshed: {}/{} walkable",
                nav.grid.walkable_count(),
                nav.grid.max_size()
            );
        }
    }

    // ------------------------------------------------------------------------
    // Stepping
    // ------------------------------------------------------------------------

    /// Advance every enemy by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        let started = Instant::now();
        let targets = self.world.target_positions();
        let mut strikes = Vec::new();

        for (entity, (enemy, mover, position)) in
            self.world
                .query_mut::<(&mut Enemy, &mut KinematicMover, &mut Position)>()
        {
            if let Some(nav) = self.nav.as_ref() {
                let mut ctx = EnemyContext {
                    dt,
                    position: position.0,
                    nav,
                    sight: &self.obstacles,
                    targets: &targets,
                    mover: &mut *mover,
                };
                enemy.tick(&mut ctx);
            }

            if let Some(strike) = enemy.update_attack(dt, position.0, mover.facing()) {
                strikes.push((entity, strike));
            }
            mover.integrate(&mut position.0, dt);

            for change in enemy.drain_transitions() {
                self.events.push(GameEvent::StateChanged {
                    entity,
                    from: change.from,
                    to: change.to,
                });
            }
            if let Some(search) = enemy.take_last_search() {
                self.stats.paths.record(search);
                if search.outcome == SearchOutcome::NoPath {
                    self.events.push(GameEvent::PathUnavailable { entity });
                }
            }
        }

        for (attacker, strike) in strikes {
            self.resolve_strike(attacker, strike, &targets);
        }
        self.step_projectiles(dt, &targets);

        self.time += dt;
        self.stats.ticks.record_tick(started.elapsed());
    }

    fn resolve_strike(
        &mut self,
        attacker: Entity,
        strike: AttackStrike,
        targets: &FxHashMap<Entity, Vec2>,
    ) {
        match strike {
            AttackStrike::Melee {
                center,
                radius,
                damage,
            } => {
                for (&target, &position) in targets {
                    if position.distance(center) <= radius {
                        self.events.push(GameEvent::TargetHit {
                            target,
                            attacker,
                            damage,
                        });
                    }
                }
            }
            AttackStrike::Projectile {
                origin,
                direction,
                speed,
                damage,
                target,
                radius,
                lifetime,
                blocked_by,
            } => {
                self.world.spawn((
                    Position(origin),
                    Projectile {
                        attacker,
                        velocity: direction * speed,
                        damage,
                        radius,
                        lifetime: Countdown::new(lifetime),
                        blocked_by,
                    },
                ));
                self.events.push(GameEvent::ProjectileFired {
                    attacker,
                    target,
                    origin,
                    direction,
                    speed,
                    damage,
                });
            }
        }
    }

    /// Move projectiles; the first target swept this step takes the hit
    fn step_projectiles(&mut self, dt: f32, targets: &FxHashMap<Entity, Vec2>) {
        let mut spent = Vec::new();

        for (entity, (projectile, position)) in
            self.world.query_mut::<(&mut Projectile, &mut Position)>()
        {
            let start = position.0;
            let end = start + projectile.velocity * dt;

            let hit = targets
                .iter()
                .filter(|&(&target, &at)| {
                    target != projectile.attacker
                        && distance_to_segment(at, start, end) <= projectile.radius
                        && self.obstacles.can_see(start, at, projectile.blocked_by)
                })
                .min_by(|a, b| {
                    start
                        .distance_squared(*a.1)
                        .total_cmp(&start.distance_squared(*b.1))
                })
                .map(|(&target, _)| target);

            if let Some(target) = hit {
                self.events.push(GameEvent::TargetHit {
                    target,
                    attacker: projectile.attacker,
                    damage: projectile.damage,
                });
                spent.push(entity);
            } else if !self.obstacles.can_see(start, end, projectile.blocked_by) {
                log::trace!("Projectile {entity:?} stopped by an obstacle");
                spent.push(entity);
            } else {
                position.0 = end;
                if projectile.lifetime.tick(dt) {
                    spent.push(entity);
                }
            }
        }

        for entity in spent {
            if self.world.despawn(entity).is_err() {
                log::warn!("Projectile {entity:?} already despawned");
            }
        }
    }

    /// Health fractions for health bars; read after [`Simulation::tick`]
    pub fn late_update(&self) -> Vec<HealthSample> {
        self.world
            .query::<(&Enemy, &Position)>()
            .iter()
            .map(|(entity, (enemy, position))| HealthSample {
                entity,
                position: position.0,
                fraction: enemy.health_fraction(),
            })
            .collect()
    }
}

fn distance_to_segment(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let length_squared = ab.length_squared();
    if length_squared <= f32::EPSILON {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / length_squared).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AttackSpec, GridConfig, PathfinderConfig, RangedConfig};
    use crate::physics::{LayerMask, OpenField};

    fn open_sim() -> Simulation {
        let nav = NavContext::build(
            GridConfig::default().with_world_size(30.0, 30.0),
            PathfinderConfig::default(),
            &OpenField,
        );
        Simulation::new(ObstacleWorld::new(), Some(nav))
    }

    fn drain(sim: &mut Simulation) -> Vec<GameEvent> {
        sim.events_mut().swap();
        sim.events_mut().drain().collect()
    }

    #[test]
    fn test_enemy_closes_in() {
        let mut sim = open_sim();
        let target = sim.spawn_target(Some("player"), Vec2::new(4.5, 0.5));
        let enemy = sim.spawn_enemy("grunt", Vec2::new(0.5, 0.5), &EnemyConfig::default());

        sim.tick(0.05);
        assert_eq!(sim.enemy_state(enemy), Some(EnemyState::Chasing));

        for _ in 0..10 {
            sim.tick(0.05);
        }
        let distance = sim.position(enemy).unwrap().distance(sim.position(target).unwrap());
        assert!(distance < 4.0);
        assert!(sim.stats().paths.requests >= 1);

        let events = drain(&mut sim);
        assert!(events.contains(&GameEvent::StateChanged {
            entity: enemy,
            from: EnemyState::Idle,
            to: EnemyState::Chasing,
        }));
    }

    #[test]
    fn test_missing_navigation_disables_enemy() {
        let mut sim = Simulation::new(ObstacleWorld::new(), None);
        sim.spawn_target(None, Vec2::new(1.0, 0.0));
        let enemy = sim.spawn_enemy("lost", Vec2::ZERO, &EnemyConfig::default());

        for _ in 0..10 {
            sim.tick(0.05);
        }
        assert_eq!(sim.enemy_state(enemy), Some(EnemyState::Idle));
        assert_eq!(sim.position(enemy), Some(Vec2::ZERO));
        assert!(!sim.with_enemy(enemy, Enemy::is_enabled).unwrap());
    }

    #[test]
    fn test_wall_blocks_sight() {
        let mut obstacles = ObstacleWorld::new();
        obstacles.add(&ObstacleDesc::wall(
            Vec2::ZERO,
            Vec2::new(6.0, 0.5),
            LayerMask::layer(0),
        ));
        let nav = NavContext::build(
            GridConfig::default().with_world_size(30.0, 30.0),
            PathfinderConfig::default(),
            &obstacles,
        );
        let mut sim = Simulation::new(obstacles, Some(nav));
        sim.spawn_target(None, Vec2::new(0.5, 2.5));
        let enemy = sim.spawn_enemy("blind", Vec2::new(0.5, -2.5), &EnemyConfig::default());

        for _ in 0..10 {
            sim.tick(0.05);
        }
        assert_eq!(sim.enemy_state(enemy), Some(EnemyState::Idle));
    }

    #[test]
    fn test_damage_kills_and_despawns() {
        let mut sim = open_sim();
        let player = sim.spawn_target(None, Vec2::new(12.0, 0.0));
        let enemy = sim.spawn_enemy(
            "grunt",
            Vec2::ZERO,
            &EnemyConfig::default().with_max_health(50.0),
        );

        let outcome = sim.apply_damage(enemy, 20.0, Some(player)).unwrap();
        assert_eq!(outcome, DamageOutcome::Survived);
        assert_eq!(sim.enemy_state(enemy), Some(EnemyState::Chasing));
        assert_eq!(sim.late_update()[0].fraction, 0.6);

        let outcome = sim.apply_damage(enemy, 40.0, Some(player)).unwrap();
        assert_eq!(outcome, DamageOutcome::Died);
        assert!(!sim.world().contains(enemy));
        assert_eq!(sim.stats().deaths, 1);
        assert!(sim.late_update().is_empty());

        let events = drain(&mut sim);
        assert!(events.contains(&GameEvent::EnemyDied { entity: enemy }));
        assert_eq!(
            sim.apply_damage(enemy, 1.0, None),
            Err(SimError::NoSuchEntity(enemy))
        );
    }

    #[test]
    fn test_despawned_target_is_forgotten() {
        let mut sim = open_sim();
        let target = sim.spawn_target(None, Vec2::new(3.5, 0.5));
        let enemy = sim.spawn_enemy("grunt", Vec2::new(0.5, 0.5), &EnemyConfig::default());
        sim.tick(0.05);
        assert_eq!(sim.enemy_state(enemy), Some(EnemyState::Chasing));

        sim.despawn(target).unwrap();
        assert_eq!(sim.enemy_state(enemy), Some(EnemyState::Idle));
        assert!(sim.with_enemy(enemy, |e| e.roster().is_empty()).unwrap());
        assert_eq!(sim.despawn(target), Err(SimError::NoSuchEntity(target)));
        assert_eq!(
            sim.move_target(target, Vec2::ZERO),
            Err(SimError::NoSuchEntity(target))
        );
    }

    #[test]
    fn test_knockback_stuns() {
        let mut sim = open_sim();
        let enemy = sim.spawn_enemy("grunt", Vec2::ZERO, &EnemyConfig::default());

        sim.apply_knockback(enemy, Vec2::new(3.0, 0.0), 1.0).unwrap();
        assert_eq!(sim.enemy_state(enemy), Some(EnemyState::Stunned));

        sim.tick(0.05);
        assert!(sim.position(enemy).unwrap().x > 0.0);

        for _ in 0..25 {
            sim.tick(0.05);
        }
        assert_eq!(sim.enemy_state(enemy), Some(EnemyState::Idle));
    }

    #[test]
    fn test_command_errors() {
        let mut sim = open_sim();
        let target = sim.spawn_target(None, Vec2::ZERO);
        let enemy = sim.spawn_enemy("grunt", Vec2::ONE, &EnemyConfig::default());

        assert_eq!(
            sim.apply_damage(target, 5.0, None),
            Err(SimError::NotAnEnemy(target))
        );
        assert_eq!(
            sim.apply_knockback(target, Vec2::X, 0.5),
            Err(SimError::NotAnEnemy(target))
        );
        assert_eq!(
            sim.move_target(enemy, Vec2::ZERO),
            Err(SimError::NotATarget(enemy))
        );

        sim.move_target(target, Vec2::new(2.0, 2.0)).unwrap();
        assert_eq!(sim.position(target), Some(Vec2::new(2.0, 2.0)));
    }

    #[test]
    fn test_melee_strike_hits_target() {
        let mut sim = open_sim();
        let target = sim.spawn_target(None, Vec2::new(1.5, 0.5));
        let enemy = sim.spawn_enemy("brute", Vec2::new(0.5, 0.5), &EnemyConfig::default());

        let mut hit = false;
        for _ in 0..10 {
            sim.tick(0.05);
            sim.events_mut().swap();
            hit |= sim.events().iter().any(|e| {
                *e == GameEvent::TargetHit {
                    target,
                    attacker: enemy,
                    damage: 10.0,
                }
            });
        }
        assert!(hit);
    }

    fn projectile_count(sim: &Simulation) -> usize {
        sim.world().query::<&Projectile>().iter().count()
    }

    fn shot(target: Entity, lifetime: f32) -> AttackStrike {
        AttackStrike::Projectile {
            origin: Vec2::new(0.5, 0.5),
            direction: Vec2::X,
            speed: 15.0,
            damage: 10.0,
            target,
            radius: 0.25,
            lifetime,
            blocked_by: LayerMask::layer(0),
        }
    }

    #[test]
    fn test_projectile_hits_target() {
        let mut sim = open_sim();
        let target = sim.spawn_target(None, Vec2::new(5.0, 0.5));
        let archer = sim.spawn_enemy(
            "archer",
            Vec2::new(0.5, 0.5),
            &EnemyConfig::default().with_attack(AttackSpec::Ranged(RangedConfig::default())),
        );

        for _ in 0..20 {
            sim.tick(0.05);
        }
        let events = drain(&mut sim);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::ProjectileFired { attacker, .. } if *attacker == archer
        )));
        assert!(events.contains(&GameEvent::TargetHit {
            target,
            attacker: archer,
            damage: 10.0,
        }));
        assert_eq!(projectile_count(&sim), 0);
    }

    #[test]
    fn test_projectile_stopped_by_wall() {
        let mut obstacles = ObstacleWorld::new();
        obstacles.add(&ObstacleDesc::wall(
            Vec2::new(3.0, 0.5),
            Vec2::new(0.5, 3.0),
            LayerMask::layer(0),
        ));
        let nav = NavContext::build(
            GridConfig::default().with_world_size(30.0, 30.0),
            PathfinderConfig::default(),
            &obstacles,
        );
        let mut sim = Simulation::new(obstacles, Some(nav));
        let target = sim.spawn_target(None, Vec2::new(6.0, 0.5));
        let attacker = hecs::World::new().spawn(());

        let targets = sim.world().target_positions();
        sim.resolve_strike(attacker, shot(target, 5.0), &targets);
        assert_eq!(projectile_count(&sim), 1);

        for _ in 0..20 {
            sim.tick(0.05);
        }
        assert_eq!(projectile_count(&sim), 0);
        let events = drain(&mut sim);
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, GameEvent::TargetHit { .. }))
        );
    }

    #[test]
    fn test_projectile_expires() {
        let mut sim = open_sim();
        let target = hecs::World::new().spawn(());
        let attacker = hecs::World::new().spawn(());

        sim.resolve_strike(attacker, shot(target, 0.2), &FxHashMap::default());
        sim.tick(0.05);
        sim.tick(0.05);
        assert_eq!(projectile_count(&sim), 1);

        for _ in 0..4 {
            sim.tick(0.05);
        }
        assert_eq!(projectile_count(&sim), 0);
    }

    #[test]
    fn test_from_arena() {
        use crate::core::{EnemySpawn, TargetSpawn};

        let mut arena = ArenaConfig::new("test");
        arena.grid = GridConfig::default().with_world_size(20.0, 20.0);
        arena.obstacles.push(ObstacleDesc::pillar(
            Vec2::new(5.0, 5.0),
            1.0,
            LayerMask::layer(0),
        ));
        arena.targets.push(TargetSpawn {
            name: Some("player".into()),
            position: Vec2::new(2.5, 0.5),
            velocity: Vec2::ZERO,
        });
        arena.enemies.push(EnemySpawn {
            name: "grunt".into(),
            position: Vec2::new(-2.5, 0.5),
            config: EnemyConfig::default(),
        });

        let (sim, handles) = Simulation::from_arena(&arena);
        assert_eq!(handles.targets.len(), 1);
        assert_eq!(handles.enemies.len(), 1);
        assert_eq!(sim.position(handles.targets[0]), Some(Vec2::new(2.5, 0.5)));
        assert_eq!(sim.obstacles().len(), 1);

        let grid = &sim.nav().unwrap().grid;
        assert!(!grid.is_walkable_at(Vec2::new(5.0, 5.0)));
        assert!(grid.walkable_count() < grid.max_size());
        assert!(
            sim.with_enemy(handles.enemies[0], |e| e.roster() == handles.targets.as_slice())
                .unwrap()
        );
    }

    #[test]
    fn test_new_targets_need_roster_refresh() {
        let mut sim = open_sim();
        let enemy = sim.spawn_enemy("grunt", Vec2::new(0.5, 0.5), &EnemyConfig::default());
        sim.spawn_target(None, Vec2::new(4.5, 0.5));

        for _ in 0..5 {
            sim.tick(0.05);
        }
        assert_eq!(sim.enemy_state(enemy), Some(EnemyState::Idle));

        sim.refresh_rosters();
        for _ in 0..5 {
            sim.tick(0.05);
        }
        assert_eq!(sim.enemy_state(enemy), Some(EnemyState::Chasing));
    }
}
