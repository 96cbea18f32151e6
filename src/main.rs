//! Headless arena playback
//!
//! Loads an arena (RON or JSON), runs it at a fixed timestep and logs what
//! the enemies do. Set `RUST_LOG=debug` to see every state change.

use std::error::Error;

use pursuit::prelude::*;

const DEFAULT_ARENA: &str = "demos/arena.ron";

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ARENA.to_string());
    let arena = ArenaConfig::load(&path)?;
    log::info!("Loaded arena '{}' from {path}", arena.name);

    let (mut sim, handles) = Simulation::from_arena(&arena);
    let drifting: Vec<(Entity, Vec2)> = handles
        .targets
        .iter()
        .copied()
        .zip(arena.targets.iter().map(|t| t.velocity))
        .filter(|(_, velocity)| *velocity != Vec2::ZERO)
        .collect();

    let dt = arena.run.timestep;
    let report_every = (1.0 / dt).round().max(1.0) as u32;

    for step in 1..=arena.run.steps() {
        for &(target, velocity) in &drifting {
            if let Some(position) = sim.position(target) {
                sim.move_target(target, position + velocity * dt)?;
            }
        }

        sim.tick(dt);
        sim.events_mut().swap();
        for event in sim.events_mut().drain() {
            match event {
                GameEvent::TargetHit {
                    target,
                    attacker,
                    damage,
                } => log::info!("{attacker:?} hit {target:?} for {damage}"),
                GameEvent::ProjectileFired {
                    attacker, target, ..
                } => log::info!("{attacker:?} fired at {target:?}"),
                GameEvent::PathUnavailable { entity } => {
                    log::warn!("{entity:?} has no path to its goal");
                }
                other => log::debug!("{other:?}"),
            }
        }

        if step % report_every == 0 {
            for sample in sim.late_update() {
                let state = sim.enemy_state(sample.entity).unwrap_or_default();
                log::info!(
                    "t={:.1}s {:?} {} at {} ({:.0}% health)",
                    sim.time(),
                    sample.entity,
                    state,
                    sample.position,
                    sample.fraction * 100.0
                );
            }
        }
    }

    log::info!("{}", sim.stats().format_stats());
    Ok(())
}
