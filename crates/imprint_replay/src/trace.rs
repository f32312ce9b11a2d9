//! Recording sink that keeps every pipeline call in order.

use crate::dispatch::{Anchor, EffectIntent, EffectSink, OverTimeEffect, SummonRequest};
use imprint_core::{EffectId, EntityId};
use imprint_log::{DamageSchool, TimelineEventKind};

/// An [`EffectSink`] that records calls instead of applying them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchTrace {
    calls: Vec<EffectIntent>,
    decline_summons: bool,
    decline_scripts: bool,
}

impl DispatchTrace {
    /// Create an empty trace that accepts every summon and script
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report summons as declined
    #[must_use]
    pub fn declining_summons(mut self) -> Self {
        self.decline_summons = true;
        self
    }

    /// Report scripted features as unhandled
    #[must_use]
    pub fn declining_scripts(mut self) -> Self {
        self.decline_scripts = true;
        self
    }

    #[must_use]
    pub fn calls(&self) -> &[EffectIntent] {
        &self.calls
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Take the recorded calls, leaving the trace empty
    pub fn drain(&mut self) -> Vec<EffectIntent> {
        std::mem::take(&mut self.calls)
    }

    /// Calls of one kind
    pub fn of_kind(&self, kind: TimelineEventKind) -> impl Iterator<Item = &EffectIntent> {
        self.calls.iter().filter(move |c| c.kind() == kind)
    }

    /// Sum of damage enqueued against `target`
    #[must_use]
    pub fn damage_to(&self, target: EntityId) -> i64 {
        self.calls
            .iter()
            .filter_map(|c| match c {
                EffectIntent::Damage { target: t, amount, .. } if *t == target => Some(i64::from(*amount)),
                _ => None,
            })
            .sum()
    }

    /// Sum of healing enqueued for `target`
    #[must_use]
    pub fn healing_to(&self, target: EntityId) -> i64 {
        self.calls
            .iter()
            .filter_map(|c| match c {
                EffectIntent::Heal { target: t, amount } if *t == target => Some(i64::from(*amount)),
                _ => None,
            })
            .sum()
    }
}

impl EffectSink for DispatchTrace {
    fn enqueue_damage(&mut self, target: EntityId, amount: i32, school: DamageSchool, source: EntityId) {
        self.calls.push(EffectIntent::Damage {
            target,
            amount,
            school,
            source,
        });
    }

    fn enqueue_heal(&mut self, target: EntityId, amount: i32) {
        self.calls.push(EffectIntent::Heal { target, amount });
    }

    fn apply_buff(&mut self, target: EntityId, id: &EffectId, duration: f32, stacks: u32) {
        self.calls.push(EffectIntent::ApplyBuff {
            target,
            id: id.clone(),
            duration,
            stacks,
        });
    }

    fn enqueue_debuff(&mut self, target: EntityId, id: &EffectId, duration: f32, stacks: u32, source: EntityId) {
        self.calls.push(EffectIntent::ApplyDebuff {
            target,
            id: id.clone(),
            duration,
            stacks,
            source,
        });
    }

    fn enqueue_dot(&mut self, target: EntityId, effect: &OverTimeEffect) {
        self.calls.push(EffectIntent::Dot {
            target,
            effect: effect.clone(),
        });
    }

    fn enqueue_hot(&mut self, target: EntityId, effect: &OverTimeEffect) {
        self.calls.push(EffectIntent::Hot {
            target,
            effect: effect.clone(),
        });
    }

    fn try_summon(&mut self, caster: EntityId, target: EntityId, summon: &SummonRequest) -> bool {
        self.calls.push(EffectIntent::SummonPet {
            caster,
            target,
            summon: summon.clone(),
        });
        !self.decline_summons
    }

    fn try_invoke(&mut self, caster: EntityId, target: EntityId, feature_id: &EffectId, anchor: Anchor) -> bool {
        self.calls.push(EffectIntent::Script {
            caster,
            target,
            feature_id: feature_id.clone(),
            anchor,
        });
        !self.decline_scripts
    }
}
