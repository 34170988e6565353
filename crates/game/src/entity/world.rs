use std::collections::HashMap;

use crate::net::RosterEntry;

use super::{Entity, EntityId, EntityKind};

/// The live entity set, keyed by stable string handles. Entities never hold
/// references back into the session; the session looks them up here.
#[derive(Debug, Default)]
pub struct World {
    entities: HashMap<EntityId, Entity>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: Entity) {
        self.entities.insert(entity.id.clone(), entity);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn live_enemy_count(&self) -> usize {
        self.entities
            .values()
            .filter(|e| e.kind == EntityKind::Enemy && !e.marked_for_removal)
            .count()
    }

    /// Drop every tombstoned entity. Removal is local garbage collection;
    /// nothing here is broadcast.
    pub fn purge_removed(&mut self) {
        self.entities.retain(|_, e| !e.marked_for_removal);
    }

    /// The roster is a projection of player entities, host first, then by id.
    pub fn roster(&self) -> Vec<RosterEntry> {
        let mut players: Vec<&Entity> = self
            .entities
            .values()
            .filter(|e| e.kind == EntityKind::Player)
            .collect();
        players.sort_by(|a, b| b.is_host.cmp(&a.is_host).then_with(|| a.id.cmp(&b.id)));
        players
            .into_iter()
            .map(|p| RosterEntry {
                id: p.id.clone(),
                is_host: p.is_host,
            })
            .collect()
    }
}
