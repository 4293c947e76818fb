//! EntityStore - hecs world with stable IDs and typed component access

use bimap::BiMap;
use cinder_core::{CinderError, Component, EntityId, Result};

/// The entity-component store the script bindings operate on
///
/// Wraps hecs::World with:
/// - Stable EntityId mapping (ids are never reused within a store)
/// - At most one component per type per entity
/// - Lookup errors that name the component type
pub struct EntityStore {
    /// The underlying hecs world
    world: hecs::World,
    /// Bidirectional mapping: EntityId <-> hecs::Entity
    id_map: BiMap<EntityId, hecs::Entity>,
    /// Last id handed out
    last_id: EntityId,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            world: hecs::World::new(),
            id_map: BiMap::new(),
            last_id: EntityId::NULL,
        }
    }

    /// Allocate a new entity with no components
    pub fn create_entity(&mut self) -> EntityId {
        let id = self.last_id.next();
        self.last_id = id;

        let hecs_entity = self.world.spawn(());
        self.id_map.insert(id, hecs_entity);
        log::trace!("created entity {}", id);
        id
    }

    /// Destroy an entity and every component attached to it
    pub fn destroy_entity(&mut self, id: EntityId) -> Result<()> {
        let hecs_entity = self.entity(id)?;

        self.world
            .despawn(hecs_entity)
            .map_err(|_| CinderError::EntityNotFound(id.to_string()))?;
        self.id_map.remove_by_left(&id);
        log::trace!("destroyed entity {}", id);
        Ok(())
    }

    fn entity(&self, id: EntityId) -> Result<hecs::Entity> {
        self.id_map
            .get_by_left(&id)
            .copied()
            .ok_or_else(|| CinderError::EntityNotFound(id.to_string()))
    }

    fn component_not_found<T: Component>(id: EntityId) -> CinderError {
        CinderError::ComponentNotFound {
            component: T::type_name().to_string(),
            entity: id.to_string(),
        }
    }

    /// Check if an entity exists
    pub fn contains(&self, id: EntityId) -> bool {
        self.id_map.contains_left(&id)
    }

    /// Get number of entities
    pub fn entity_count(&self) -> usize {
        self.id_map.len()
    }

    /// Iterate over live entity ids, in no particular order
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.id_map.left_values().copied()
    }

    /// Remove every entity. Ids keep counting from where they were.
    pub fn clear(&mut self) {
        self.world.clear();
        self.id_map.clear();
    }

    /// Whether the entity carries a `T`
    pub fn has_component<T: Component>(&self, id: EntityId) -> bool {
        self.entity(id)
            .ok()
            .and_then(|e| self.world.satisfies::<&T>(e).ok())
            .unwrap_or(false)
    }

    /// Borrow the entity's `T`; absent is an error
    pub fn get_component<T: Component>(&self, id: EntityId) -> Result<hecs::Ref<'_, T>> {
        let entity = self.entity(id)?;
        self.world
            .get::<&T>(entity)
            .map_err(|_| Self::component_not_found::<T>(id))
    }

    /// Mutably borrow the entity's `T`; absent is an error
    pub fn get_component_mut<T: Component>(&self, id: EntityId) -> Result<hecs::RefMut<'_, T>> {
        let entity = self.entity(id)?;
        self.world
            .get::<&mut T>(entity)
            .map_err(|_| Self::component_not_found::<T>(id))
    }

    /// Borrow the entity's `T` if it has one
    pub fn try_get_component<T: Component>(&self, id: EntityId) -> Result<Option<hecs::Ref<'_, T>>> {
        let entity = self.entity(id)?;
        Ok(self.world.get::<&T>(entity).ok())
    }

    /// Attach `T`'s default unless the entity already has a `T`, then borrow it
    pub fn add_component_with_default<T: Component>(
        &mut self,
        id: EntityId,
    ) -> Result<hecs::RefMut<'_, T>> {
        let entity = self.entity(id)?;
        if !self.world.satisfies::<&T>(entity).unwrap_or(false) {
            self.world
                .insert_one(entity, T::default())
                .map_err(|_| CinderError::EntityNotFound(id.to_string()))?;
            log::trace!("attached default {} to entity {}", T::type_name(), id);
        }
        self.get_component_mut::<T>(id)
    }

    /// Attach or replace the entity's `T`
    pub fn insert_component<T: Component>(&mut self, id: EntityId, component: T) -> Result<()> {
        let entity = self.entity(id)?;
        self.world
            .insert_one(entity, component)
            .map_err(|_| CinderError::EntityNotFound(id.to_string()))
    }

    /// Detach and return the entity's `T`
    pub fn remove_component<T: Component>(&mut self, id: EntityId) -> Result<T> {
        let entity = self.entity(id)?;
        self.world
            .remove_one::<T>(entity)
            .map_err(|_| Self::component_not_found::<T>(id))
    }
}
