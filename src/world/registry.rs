//! Object Registry
//!
//! Owns every entity, grouped in buckets by type key. Bucket order is the
//! layer (z) order: configured types first, then types in the order they
//! were first seen. Within a bucket, insertion order is kept.
//!
//! Lookups that miss return `None` or an empty result; nothing here fails.

use std::collections::BTreeMap;
use tracing::debug;

use crate::world::collision::TypeCollisionMethod;
use crate::world::entity::{Entity, EntityHandle, EntityId};

/// Type-keyed entity storage.
#[derive(Debug, Default)]
pub struct Registry {
    buckets: BTreeMap<String, Vec<Entity>>,
    layers: Vec<String>,
    type_methods: BTreeMap<String, TypeCollisionMethod>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with a fixed layer order for the given types.
    pub fn with_layers<S: AsRef<str>>(types: &[S]) -> Self {
        let mut registry = Self::new();
        for kind in types {
            registry.ensure_bucket(kind.as_ref());
        }
        registry
    }

    fn ensure_bucket(&mut self, kind: &str) -> &mut Vec<Entity> {
        if !self.buckets.contains_key(kind) {
            self.layers.push(kind.to_string());
        }
        self.buckets.entry(kind.to_string()).or_default()
    }

    /// Add an entity to the end of its type bucket.
    pub fn insert(&mut self, entity: Entity) -> EntityHandle {
        let handle = entity.handle();
        debug!(kind = %handle.kind, name = entity.name(), id = %handle.id, "entity added");
        self.ensure_bucket(&handle.kind).push(entity);
        handle
    }

    /// Remove one entity. Returns it if it was present.
    pub fn remove(&mut self, handle: &EntityHandle) -> Option<Entity> {
        let bucket = self.buckets.get_mut(&handle.kind)?;
        let index = bucket.iter().position(|e| e.id() == handle.id)?;
        let entity = bucket.remove(index);
        debug!(kind = %handle.kind, id = %handle.id, "entity removed");
        Some(entity)
    }

    /// Remove every entity of a type. The layer slot is kept.
    /// Returns how many were removed.
    pub fn remove_type(&mut self, kind: &str) -> usize {
        let Some(bucket) = self.buckets.get_mut(kind) else {
            return 0;
        };
        let count = bucket.len();
        bucket.clear();
        debug!(kind, count, "type cleared");
        count
    }

    /// Entity by handle.
    pub fn get(&self, handle: &EntityHandle) -> Option<&Entity> {
        self.buckets
            .get(&handle.kind)?
            .iter()
            .find(|e| e.id() == handle.id)
    }

    /// Mutable entity by handle.
    pub fn get_mut(&mut self, handle: &EntityHandle) -> Option<&mut Entity> {
        self.buckets
            .get_mut(&handle.kind)?
            .iter_mut()
            .find(|e| e.id() == handle.id)
    }

    /// Entity by id alone, searching every bucket.
    pub fn find_id(&self, id: EntityId) -> Option<&Entity> {
        self.iter().find(|e| e.id() == id)
    }

    /// All entities of a type with the given name.
    pub fn by_name(&self, kind: &str, name: &str) -> Vec<&Entity> {
        self.of_type(kind)
            .iter()
            .filter(|e| e.name() == name)
            .collect()
    }

    /// All entities of a type, in insertion order.
    pub fn of_type(&self, kind: &str) -> &[Entity] {
        self.buckets.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Type keys in layer order.
    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    /// Every entity in layer order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.layers
            .iter()
            .filter_map(|kind| self.buckets.get(kind))
            .flat_map(|bucket| bucket.iter())
    }

    /// Handles of every entity in layer order.
    pub fn handles(&self) -> Vec<EntityHandle> {
        self.iter().map(Entity::handle).collect()
    }

    /// Total number of entities.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// No entities at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set the collision visibility rule of a type.
    pub fn set_type_collision(&mut self, kind: impl Into<String>, method: TypeCollisionMethod) {
        self.type_methods.insert(kind.into(), method);
    }

    /// Collision visibility rule of a type (`Any` unless set).
    pub fn type_collision(&self, kind: &str) -> TypeCollisionMethod {
        self.type_methods.get(kind).copied().unwrap_or_default()
    }
}
