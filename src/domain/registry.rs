/// Entity registry: every entity placed in the level, indexed two ways.
///
///   - `by_kind`: kind → ids, in registration order
///   - `by_pos`: committed position → ids (multimap)
///
/// Entities live in an arena and keep their `EntityId` for the whole level,
/// even after `unregister` (a fallen container still has state to draw).
/// Only registered entities are visible through the indexes.
///
/// All position changes go through `commit_move()` so the position index
/// always reflects committed cells, never interpolated ones.

use std::collections::HashMap;

use super::entity::{Entity, EntityId, Position};
use super::kind::EntityKind;

#[derive(Default)]
pub struct Registry {
    arena: Vec<Entity>,
    registered: Vec<bool>,
    by_kind: HashMap<EntityKind, Vec<EntityId>>,
    by_pos: HashMap<Position, Vec<EntityId>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Store an entity in the arena and register it.
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.arena.len());
        self.arena.push(entity);
        self.registered.push(false);
        self.register(id);
        id
    }

    /// Add to the indexes. Idempotent; returns false if already registered
    /// or the id is unknown.
    pub fn register(&mut self, id: EntityId) -> bool {
        let (kind, pos) = match self.arena.get(id.0) {
            Some(e) => (e.kind(), e.pos),
            None => return false,
        };
        if self.registered[id.0] { return false; }
        self.registered[id.0] = true;
        self.by_kind.entry(kind).or_default().push(id);
        self.by_pos.entry(pos).or_default().push(id);
        true
    }

    /// Remove from the indexes. No-op (false) if absent.
    pub fn unregister(&mut self, id: EntityId) -> bool {
        if !self.is_registered(id) { return false; }
        self.registered[id.0] = false;
        let e = &self.arena[id.0];
        if let Some(ids) = self.by_kind.get_mut(&e.kind()) {
            ids.retain(|&i| i != id);
        }
        remove_from(&mut self.by_pos, e.pos, id);
        true
    }

    /// Drop everything. Ids handed out before are invalid afterwards.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.registered.clear();
        self.by_kind.clear();
        self.by_pos.clear();
    }

    pub fn is_registered(&self, id: EntityId) -> bool {
        self.registered.get(id.0).copied().unwrap_or(false)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.arena.get(id.0)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.arena.get_mut(id.0)
    }

    /// Registered entities whose committed position is `pos`.
    pub fn entities_at(&self, pos: Position) -> &[EntityId] {
        self.by_pos.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First registered entity of `kind` at `pos`.
    pub fn entity_of_type_at(&self, pos: Position, kind: EntityKind) -> Option<EntityId> {
        self.entities_at(pos)
            .iter()
            .copied()
            .find(|&id| self.arena[id.0].kind() == kind)
    }

    pub fn entities_of_type(&self, kind: EntityKind) -> &[EntityId] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Move an entity's committed cell, keeping the position index in sync.
    pub fn commit_move(&mut self, id: EntityId, to: Position) {
        let Some(e) = self.arena.get_mut(id.0) else { return };
        let from = e.pos;
        if from == to { return; }
        e.pos = to;
        if self.registered[id.0] {
            remove_from(&mut self.by_pos, from, id);
            self.by_pos.entry(to).or_default().push(id);
        }
    }

    /// Registered entities in registration order of their kind, kinds in
    /// `EntityKind::ALL` order. Used for drawing in layers.
    pub fn iter_registered(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        EntityKind::ALL
            .into_iter()
            .flat_map(move |k| self.entities_of_type(k).iter())
            .map(move |&id| (id, &self.arena[id.0]))
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities_of_type(kind).len()
    }
}

fn remove_from(map: &mut HashMap<Position, Vec<EntityId>>, pos: Position, id: EntityId) {
    if let Some(ids) = map.get_mut(&pos) {
        ids.retain(|&i| i != id);
        if ids.is_empty() { map.remove(&pos); }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Body;

    fn p(x: usize, y: usize) -> Position { Position::new(x, y) }

    #[test]
    fn lookups_by_position_and_kind() {
        let mut r = Registry::new();
        let hole = r.spawn(Entity::new(p(2, 1), Body::Hole));
        let goal = r.spawn(Entity::goal(p(2, 1), crate::domain::entity::GoalKind::Container));
        let wall = r.spawn(Entity::new(p(0, 0), Body::Wall));

        assert_eq!(r.entities_at(p(2, 1)), &[hole, goal]);
        assert_eq!(r.entity_of_type_at(p(2, 1), EntityKind::Goal), Some(goal));
        assert_eq!(r.entity_of_type_at(p(2, 1), EntityKind::Wall), None);
        assert_eq!(r.entities_of_type(EntityKind::Wall), &[wall]);
        assert!(r.entities_at(p(5, 5)).is_empty());
    }

    #[test]
    fn register_is_idempotent() {
        let mut r = Registry::new();
        let w = r.spawn(Entity::new(p(1, 1), Body::Wall));
        assert!(!r.register(w));
        assert_eq!(r.entities_of_type(EntityKind::Wall).len(), 1);
        assert_eq!(r.entities_at(p(1, 1)).len(), 1);
    }

    #[test]
    fn unregister_hides_but_keeps_state() {
        let mut r = Registry::new();
        let c = r.spawn(Entity::container(p(3, 0), 2));
        assert!(r.unregister(c));
        assert!(!r.unregister(c));
        assert!(r.entities_at(p(3, 0)).is_empty());
        assert!(r.entities_of_type(EntityKind::Container).is_empty());
        assert!(r.get(c).is_some());
        assert!(r.register(c));
        assert_eq!(r.entities_at(p(3, 0)), &[c]);
    }

    #[test]
    fn commit_move_updates_position_index() {
        let mut r = Registry::new();
        let pl = r.spawn(Entity::player(p(0, 0)));
        r.commit_move(pl, p(1, 0));
        assert!(r.entities_at(p(0, 0)).is_empty());
        assert_eq!(r.entity_of_type_at(p(1, 0), EntityKind::Player), Some(pl));
        assert_eq!(r.get(pl).map(|e| e.pos), Some(p(1, 0)));
    }

    #[test]
    fn clear_empties_everything() {
        let mut r = Registry::new();
        r.spawn(Entity::player(p(0, 0)));
        r.spawn(Entity::new(p(1, 0), Body::Hole));
        r.clear();
        assert_eq!(r.count(EntityKind::Player), 0);
        assert!(r.entities_at(p(1, 0)).is_empty());
        assert_eq!(r.iter_registered().count(), 0);
    }
}
