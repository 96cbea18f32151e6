//! World wrapper around hecs

use glam::Vec2;
use hecs::Entity;
use rustc_hash::FxHashMap;

use super::components::{Position, PotentialTarget};

/// Agent registry containing all entities and components
pub struct World {
    /// The underlying hecs world
    pub inner: hecs::World,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
        }
    }

    /// Spawn an entity with the given components
    pub fn spawn(&mut self, components: impl hecs::DynamicBundle) -> Entity {
        self.inner.spawn(components)
    }

    /// Despawn an entity
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        self.inner.despawn(entity)
    }

    /// Get a reference to a component
    pub fn get<T: hecs::Component>(
        &self,
        entity: Entity,
    ) -> Result<hecs::Ref<'_, T>, hecs::ComponentError> {
        self.inner.get::<&T>(entity)
    }

    /// Get a mutable reference to a component
    pub fn get_mut<T: hecs::Component>(
        &mut self,
        entity: Entity,
    ) -> Result<hecs::RefMut<'_, T>, hecs::ComponentError> {
        self.inner.get::<&mut T>(entity)
    }

    /// Check if an entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Get the number of entities
    pub fn len(&self) -> u32 {
        self.inner.len()
    }

    /// Check if the world is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Query for entities with specific components
    pub fn query<Q: hecs::Query>(&self) -> hecs::QueryBorrow<'_, Q> {
        self.inner.query::<Q>()
    }

    /// Query for entities with specific components (mutable)
    pub fn query_mut<Q: hecs::Query>(&mut self) -> hecs::QueryMut<'_, Q> {
        self.inner.query_mut::<Q>()
    }

    /// Position of an entity, if it has one
    pub fn position(&self, entity: Entity) -> Option<Vec2> {
        self.get::<Position>(entity).ok().map(|p| p.0)
    }

    /// Every potential target currently alive
    pub fn target_roster(&self) -> Vec<Entity> {
        self.inner
            .query::<&PotentialTarget>()
            .iter()
            .map(|(entity, _)| entity)
            .collect()
    }

    /// Snapshot of every potential target's position
    pub fn target_positions(&self) -> FxHashMap<Entity, Vec2> {
        self.inner
            .query::<(&Position, &PotentialTarget)>()
            .iter()
            .map(|(entity, (position, _))| (entity, position.0))
            .collect()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Name;

    #[test]
    fn test_target_snapshot() {
        let mut world = World::new();
        let player = world.spawn((Position::new(1.0, 2.0), PotentialTarget, Name::new("player")));
        let bystander = world.spawn((Position::new(5.0, 5.0),));

        assert_eq!(world.target_roster(), vec![player]);
        let positions = world.target_positions();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[&player], Vec2::new(1.0, 2.0));
        assert_eq!(world.position(bystander), Some(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn test_despawn_invalidates() {
        let mut world = World::new();
        let entity = world.spawn((Position::default(), PotentialTarget));
        world.despawn(entity).unwrap();

        assert!(!world.contains(entity));
        assert!(world.position(entity).is_none());
        assert!(world.target_roster().is_empty());
        assert!(world.despawn(entity).is_err());
    }
}
