//! Generational entity arena holding the imprint components.
//!
//! Each live entity owns one [`EntityRecord`]. Despawning drops the record,
//! so an echo's private timeline, health and damage queue go with it.

use imprint_core::{EntityId, SimTime};
use imprint_log::{DamageSchool, Timeline};
use imprint_replay::{Echo, EchoHealth};
use serde::{Deserialize, Serialize};

/// Open recording window on an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Recorder {
    pub start_time: SimTime,
    pub duration: f32,
    pub recursion_depth: u8,
}

impl Recorder {
    /// Whether the window has closed at `now`
    #[must_use]
    pub fn is_expired(&self, now: SimTime) -> bool {
        now.elapsed_since(self.start_time) >= f64::from(self.duration)
    }
}

/// Blocks new recordings on an entity until `expire_time`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Suppression {
    pub expire_time: SimTime,
}

impl Suppression {
    /// Whether the suppression still blocks recordings at `now`
    #[must_use]
    pub fn is_active(&self, now: SimTime) -> bool {
        now < self.expire_time
    }
}

/// Raw, unmitigated damage waiting in an entity's queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRequest {
    pub amount: i32,
    pub school: DamageSchool,
    pub source: EntityId,
}

/// Components carried by one entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityRecord {
    pub recorder: Option<Recorder>,
    pub timeline: Option<Timeline>,
    pub echo: Option<Echo>,
    pub echo_health: Option<EchoHealth>,
    pub suppression: Option<Suppression>,
    /// Pending damage requests, consumed by the damage pipeline or the echo interceptor
    pub damage_requests: Vec<DamageRequest>,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    record: Option<EntityRecord>,
}

/// Entity world
#[derive(Debug, Clone, Default)]
pub struct World {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl World {
    /// Create an empty world
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new entity with no components
    pub fn spawn(&mut self) -> EntityId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.record = Some(EntityRecord::default());
            return EntityId::from_parts(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            record: Some(EntityRecord::default()),
        });
        EntityId::from_parts(index, 0)
    }

    /// Destroy an entity and every component it owns
    ///
    /// Returns false if the entity was already gone.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        let Some(slot) = self.slot_mut(id) else {
            return false;
        };
        slot.record = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        self.live -= 1;
        true
    }

    fn slot_mut(&mut self, id: EntityId) -> Option<&mut Slot> {
        if id.is_null() {
            return None;
        }
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation() && slot.record.is_some())
    }

    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntityRecord> {
        if id.is_null() {
            return None;
        }
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.record.as_ref()
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord> {
        self.slot_mut(id)?.record.as_mut()
    }

    /// Number of live entities
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live entities, in slot order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &EntityRecord)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.record
                .as_ref()
                .map(|record| (EntityId::from_parts(index as u32, slot.generation), record))
        })
    }

    /// Live entities, mutably, in slot order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut EntityRecord)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.record
                .as_mut()
                .map(|record| (EntityId::from_parts(index as u32, generation), record))
        })
    }

    #[must_use]
    pub fn recorder(&self, id: EntityId) -> Option<&Recorder> {
        self.get(id)?.recorder.as_ref()
    }

    #[must_use]
    pub fn timeline(&self, id: EntityId) -> Option<&Timeline> {
        self.get(id)?.timeline.as_ref()
    }

    #[must_use]
    pub fn echo(&self, id: EntityId) -> Option<&Echo> {
        self.get(id)?.echo.as_ref()
    }

    #[must_use]
    pub fn echo_health(&self, id: EntityId) -> Option<&EchoHealth> {
        self.get(id)?.echo_health.as_ref()
    }

    #[must_use]
    pub fn suppression(&self, id: EntityId) -> Option<&Suppression> {
        self.get(id)?.suppression.as_ref()
    }

    /// Echo entities currently alive in the world
    pub fn echoes(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.iter().filter(|(_, r)| r.echo.is_some()).map(|(id, _)| id)
    }

    /// Queue damage against `target`. No-op on a missing entity.
    pub fn enqueue_damage(&mut self, target: EntityId, request: DamageRequest) -> bool {
        match self.get_mut(target) {
            Some(record) => {
                record.damage_requests.push(request);
                true
            }
            None => false,
        }
    }

    /// Take every queued damage request for `id`, leaving the queue empty
    pub fn take_damage_requests(&mut self, id: EntityId) -> Vec<DamageRequest> {
        self.get_mut(id)
            .map(|record| std::mem::take(&mut record.damage_requests))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(amount: i32) -> DamageRequest {
        DamageRequest {
            amount,
            school: DamageSchool::Physical,
            source: EntityId::NULL,
        }
    }

    #[test]
    fn test_world_new() {
        let world = World::new();
        assert!(world.is_empty());
        assert_eq!(world.len(), 0);
    }

    #[test]
    fn test_spawn_and_despawn() {
        let mut world = World::new();
        let a = world.spawn();
        let b = world.spawn();
        assert_ne!(a, b);
        assert_eq!(world.len(), 2);

        assert!(world.despawn(a));
        assert!(!world.exists(a));
        assert!(world.exists(b));
        assert_eq!(world.len(), 1);
        assert!(!world.despawn(a));
    }

    #[test]
    fn test_stale_handle_does_not_alias_recycled_slot() {
        let mut world = World::new();
        let old = world.spawn();
        world.despawn(old);

        let new = world.spawn();
        assert_eq!(new.index(), old.index());
        assert_ne!(new.generation(), old.generation());
        assert!(world.exists(new));
        assert!(!world.exists(old));
        assert!(world.get_mut(old).is_none());
    }

    #[test]
    fn test_null_never_resolves() {
        let mut world = World::new();
        world.spawn();
        assert!(!world.exists(EntityId::NULL));
        assert!(!world.enqueue_damage(EntityId::NULL, hit(5)));
    }

    #[test]
    fn test_despawn_drops_components() {
        let mut world = World::new();
        let id = world.spawn();
        world.get_mut(id).unwrap().timeline = Some(Timeline::new());
        world.despawn(id);

        let reused = world.spawn();
        assert!(world.timeline(reused).is_none());
    }

    #[test]
    fn test_damage_queue() {
        let mut world = World::new();
        let id = world.spawn();
        assert!(world.enqueue_damage(id, hit(5)));
        assert!(world.enqueue_damage(id, hit(7)));

        let taken = world.take_damage_requests(id);
        assert_eq!(taken.len(), 2);
        assert!(world.take_damage_requests(id).is_empty());
    }

    #[test]
    fn test_iter_skips_dead() {
        let mut world = World::new();
        let a = world.spawn();
        let b = world.spawn();
        world.despawn(a);

        let ids: Vec<EntityId> = world.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![b]);
    }

    #[test]
    fn test_recorder_expiry() {
        let recorder = Recorder {
            start_time: SimTime::from_secs(1.0),
            duration: 2.0,
            recursion_depth: 0,
        };
        assert!(!recorder.is_expired(SimTime::from_secs(2.5)));
        assert!(recorder.is_expired(SimTime::from_secs(3.0)));
    }

    #[test]
    fn test_suppression_active() {
        let suppression = Suppression {
            expire_time: SimTime::from_secs(4.0),
        };
        assert!(suppression.is_active(SimTime::from_secs(3.9)));
        assert!(!suppression.is_active(SimTime::from_secs(4.0)));
    }
}
