//! Routing of timeline events into the effect pipelines.
//!
//! The pipelines themselves (damage mitigation, heals, buffs, debuffs,
//! over-time effects, pet summons, scripted features) live outside this
//! crate. Replay only produces [`EffectIntent`]s and hands them to an
//! [`EffectSink`].

use crate::state::PlaybackModifiers;
use imprint_core::{EffectId, EntityId};
use imprint_log::{DamageSchool, Position, TimelineEvent, TimelineEventKind, TimelineEventState};
use serde::{Deserialize, Serialize};

/// Where a placed effect lands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Anchor {
    /// Snap to the target's current position
    Target,
    /// Use the position captured at record time
    Recorded(Position),
}

/// Payload shared by damage-over-time and heal-over-time requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverTimeEffect {
    pub id: EffectId,
    pub per_tick: i32,
    pub interval: f32,
    pub duration: f32,
    pub source: EntityId,
    /// Category override (empty = the effect definition's own)
    pub category: EffectId,
    pub category_level: i32,
    /// Stackable count override (0 = definition default)
    pub stackable_count: u32,
}

/// Pet summon request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummonRequest {
    pub pet_id: EffectId,
    pub count: i32,
    pub spawn_radius: f32,
    pub anchor: Anchor,
}

/// A fully scaled request for one of the effect pipelines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectIntent {
    Damage {
        target: EntityId,
        amount: i32,
        school: DamageSchool,
        source: EntityId,
    },
    Heal {
        target: EntityId,
        amount: i32,
    },
    ApplyBuff {
        target: EntityId,
        id: EffectId,
        duration: f32,
        stacks: u32,
    },
    ApplyDebuff {
        target: EntityId,
        id: EffectId,
        duration: f32,
        stacks: u32,
        source: EntityId,
    },
    Dot {
        target: EntityId,
        effect: OverTimeEffect,
    },
    Hot {
        target: EntityId,
        effect: OverTimeEffect,
    },
    SummonPet {
        caster: EntityId,
        target: EntityId,
        summon: SummonRequest,
    },
    Script {
        caster: EntityId,
        target: EntityId,
        feature_id: EffectId,
        anchor: Anchor,
    },
}

impl EffectIntent {
    /// Entity the intent is aimed at
    #[must_use]
    pub fn target(&self) -> EntityId {
        match self {
            Self::Damage { target, .. }
            | Self::Heal { target, .. }
            | Self::ApplyBuff { target, .. }
            | Self::ApplyDebuff { target, .. }
            | Self::Dot { target, .. }
            | Self::Hot { target, .. }
            | Self::SummonPet { target, .. }
            | Self::Script { target, .. } => *target,
        }
    }

    /// Timeline kind this intent fires as
    #[must_use]
    pub fn kind(&self) -> TimelineEventKind {
        match self {
            Self::Damage { .. } => TimelineEventKind::Damage,
            Self::Heal { .. } => TimelineEventKind::Heal,
            Self::ApplyBuff { .. } => TimelineEventKind::ApplyBuff,
            Self::ApplyDebuff { .. } => TimelineEventKind::ApplyDebuff,
            Self::Dot { .. } => TimelineEventKind::Dot,
            Self::Hot { .. } => TimelineEventKind::Hot,
            Self::SummonPet { .. } => TimelineEventKind::SummonPet,
            Self::Script { .. } => TimelineEventKind::Script,
        }
    }
}

/// The effect pipelines replay feeds into
///
/// Implementations must tolerate targets and casters that no longer exist.
pub trait EffectSink {
    fn enqueue_damage(&mut self, target: EntityId, amount: i32, school: DamageSchool, source: EntityId);

    fn enqueue_heal(&mut self, target: EntityId, amount: i32);

    fn apply_buff(&mut self, target: EntityId, id: &EffectId, duration: f32, stacks: u32);

    fn enqueue_debuff(&mut self, target: EntityId, id: &EffectId, duration: f32, stacks: u32, source: EntityId);

    fn enqueue_dot(&mut self, target: EntityId, effect: &OverTimeEffect);

    fn enqueue_hot(&mut self, target: EntityId, effect: &OverTimeEffect);

    /// Returns whether the summon went through
    fn try_summon(&mut self, caster: EntityId, target: EntityId, summon: &SummonRequest) -> bool;

    /// Returns whether a scripted feature handled the key
    fn try_invoke(&mut self, caster: EntityId, target: EntityId, feature_id: &EffectId, anchor: Anchor) -> bool;

    /// Route an intent to the matching pipeline call
    ///
    /// Returns false only when a summon or script was declined.
    fn apply(&mut self, intent: &EffectIntent) -> bool {
        match intent {
            EffectIntent::Damage {
                target,
                amount,
                school,
                source,
            } => self.enqueue_damage(*target, *amount, *school, *source),
            EffectIntent::Heal { target, amount } => self.enqueue_heal(*target, *amount),
            EffectIntent::ApplyBuff {
                target,
                id,
                duration,
                stacks,
            } => self.apply_buff(*target, id, *duration, *stacks),
            EffectIntent::ApplyDebuff {
                target,
                id,
                duration,
                stacks,
                source,
            } => self.enqueue_debuff(*target, id, *duration, *stacks, *source),
            EffectIntent::Dot { target, effect } => self.enqueue_dot(*target, effect),
            EffectIntent::Hot { target, effect } => self.enqueue_hot(*target, effect),
            EffectIntent::SummonPet {
                caster,
                target,
                summon,
            } => return self.try_summon(*caster, *target, summon),
            EffectIntent::Script {
                caster,
                target,
                feature_id,
                anchor,
            } => return self.try_invoke(*caster, *target, feature_id, *anchor),
        }
        true
    }
}

/// Opposite-polarity copy of `event`, reset to pending
#[must_use]
pub fn invert(event: &TimelineEvent) -> TimelineEvent {
    let mut inverted = event.clone();
    inverted.kind = event.kind.inverted();
    inverted.state = TimelineEventState::Pending;
    inverted
}

fn scale(amount: i32, multiplier: f32) -> i32 {
    // Truncates toward zero; `as` saturates on overflow.
    (amount as f32 * multiplier) as i32
}

fn positive_or_one(value: f32) -> f32 {
    if value > 0.0 { value } else { 1.0 }
}

/// Build the pipeline request for `event` under `modifiers`
#[must_use]
pub fn intent_for(event: &TimelineEvent, modifiers: &PlaybackModifiers) -> EffectIntent {
    let anchor = if modifiers.auto_aim || event.auto_aim {
        Anchor::Target
    } else {
        Anchor::Recorded(event.position)
    };

    match event.kind {
        TimelineEventKind::Damage => EffectIntent::Damage {
            target: event.target,
            amount: scale(event.amount, modifiers.damage_multiplier),
            school: event.school,
            source: event.caster,
        },
        TimelineEventKind::Heal => EffectIntent::Heal {
            target: event.target,
            amount: scale(event.amount, modifiers.heal_multiplier),
        },
        TimelineEventKind::ApplyBuff => EffectIntent::ApplyBuff {
            target: event.target,
            id: event.effect_id.clone(),
            duration: event.duration,
            stacks: 1,
        },
        TimelineEventKind::ApplyDebuff => EffectIntent::ApplyDebuff {
            target: event.target,
            id: event.effect_id.clone(),
            duration: event.duration,
            stacks: 1,
            source: event.caster,
        },
        TimelineEventKind::Dot => EffectIntent::Dot {
            target: event.target,
            effect: over_time(event),
        },
        TimelineEventKind::Hot => EffectIntent::Hot {
            target: event.target,
            effect: over_time(event),
        },
        TimelineEventKind::SummonPet => EffectIntent::SummonPet {
            caster: event.caster,
            target: event.target,
            summon: SummonRequest {
                pet_id: event.effect_id.clone(),
                count: event.amount,
                spawn_radius: event.radius * positive_or_one(modifiers.hitbox_scale),
                anchor,
            },
        },
        TimelineEventKind::Script => EffectIntent::Script {
            caster: event.caster,
            target: event.target,
            feature_id: event.effect_id.clone(),
            anchor,
        },
    }
}

fn over_time(event: &TimelineEvent) -> OverTimeEffect {
    OverTimeEffect {
        id: event.effect_id.clone(),
        per_tick: event.amount,
        interval: event.tick_interval,
        duration: event.duration,
        source: event.caster,
        category: EffectId::empty(),
        category_level: 0,
        stackable_count: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::DispatchTrace;

    fn ids() -> (EntityId, EntityId) {
        (EntityId::from_parts(0, 0), EntityId::from_parts(1, 0))
    }

    #[test]
    fn test_invert_swaps_kind_and_resets_state() {
        let (caster, target) = ids();
        let mut event = TimelineEvent::damage(1.0, caster, target, 30, DamageSchool::Fire);
        event.mark_processed();

        let inverted = invert(&event);
        assert_eq!(inverted.kind, TimelineEventKind::Heal);
        assert_eq!(inverted.state, TimelineEventState::Pending);
        assert_eq!(inverted.amount, 30);
        assert_eq!(event.kind, TimelineEventKind::Damage); // Original unchanged
    }

    #[test]
    fn test_invert_all_kinds() {
        let (caster, target) = ids();
        for kind in TimelineEventKind::ALL {
            let event = TimelineEvent::new(0.0, kind, caster, target);
            assert_eq!(invert(&event).kind, kind.inverted());
        }
    }

    #[test]
    fn test_damage_scaled_by_multiplier() {
        let (caster, target) = ids();
        let event = TimelineEvent::damage(0.0, caster, target, 25, DamageSchool::Arcane);
        let modifiers = PlaybackModifiers {
            damage_multiplier: 1.5,
            ..Default::default()
        };

        let intent = intent_for(&event, &modifiers);
        assert_eq!(
            intent,
            EffectIntent::Damage {
                target,
                amount: 37,
                school: DamageSchool::Arcane,
                source: caster,
            }
        );
    }

    #[test]
    fn test_heal_uses_heal_multiplier_only() {
        let (caster, target) = ids();
        let event = TimelineEvent::heal(0.0, caster, target, 10);
        let modifiers = PlaybackModifiers {
            damage_multiplier: 5.0,
            heal_multiplier: 0.5,
            ..Default::default()
        };
        assert_eq!(intent_for(&event, &modifiers), EffectIntent::Heal { target, amount: 5 });
    }

    #[test]
    fn test_over_time_ignores_multipliers() {
        let (caster, target) = ids();
        let event = TimelineEvent::hot(0.0, caster, target, "renew", 6, 2.0, 10.0);
        let modifiers = PlaybackModifiers {
            heal_multiplier: 3.0,
            ..Default::default()
        };
        match intent_for(&event, &modifiers) {
            EffectIntent::Hot { target: t, effect } => {
                assert_eq!(t, target);
                assert_eq!(effect.per_tick, 6);
                assert_eq!(effect.interval, 2.0);
                assert_eq!(effect.duration, 10.0);
                assert_eq!(effect.source, caster);
            }
            other => panic!("unexpected intent {:?}", other),
        }
    }

    #[test]
    fn test_summon_radius_scaled_by_hitbox() {
        let (caster, target) = ids();
        let event = TimelineEvent::summon_pet(0.0, caster, target, "wolf", 2, 3.0);
        let modifiers = PlaybackModifiers {
            hitbox_scale: 2.0,
            ..Default::default()
        };
        match intent_for(&event, &modifiers) {
            EffectIntent::SummonPet { summon, .. } => {
                assert_eq!(summon.pet_id.as_str(), "wolf");
                assert_eq!(summon.count, 2);
                assert_eq!(summon.spawn_radius, 6.0);
            }
            other => panic!("unexpected intent {:?}", other),
        }
    }

    #[test]
    fn test_summon_radius_ignores_event_hitbox() {
        let (caster, target) = ids();
        let event = TimelineEvent::summon_pet(0.0, caster, target, "wolf", 1, 3.0).with_hitbox_scale(2.0);
        match intent_for(&event, &PlaybackModifiers::default()) {
            EffectIntent::SummonPet { summon, .. } => assert_eq!(summon.spawn_radius, 3.0),
            other => panic!("unexpected intent {:?}", other),
        }

        let modifiers = PlaybackModifiers {
            hitbox_scale: 1.5,
            ..Default::default()
        };
        match intent_for(&event, &modifiers) {
            EffectIntent::SummonPet { summon, .. } => assert_eq!(summon.spawn_radius, 4.5),
            other => panic!("unexpected intent {:?}", other),
        }
    }

    #[test]
    fn test_non_positive_hitbox_treated_as_one() {
        let (caster, target) = ids();
        let event = TimelineEvent::summon_pet(0.0, caster, target, "wolf", 1, 3.0);
        let modifiers = PlaybackModifiers {
            hitbox_scale: 0.0,
            ..Default::default()
        };
        match intent_for(&event, &modifiers) {
            EffectIntent::SummonPet { summon, .. } => assert_eq!(summon.spawn_radius, 3.0),
            other => panic!("unexpected intent {:?}", other),
        }
    }

    #[test]
    fn test_auto_aim_from_echo_or_event() {
        let (caster, target) = ids();
        let position = Position::new(4.0, 0.0, -2.0);
        let event = TimelineEvent::script(0.0, caster, target, "rewind").with_position(position);

        let recorded = intent_for(&event, &PlaybackModifiers::default());
        assert!(matches!(recorded, EffectIntent::Script { anchor: Anchor::Recorded(p), .. } if p == position));

        let echo_aim = PlaybackModifiers {
            auto_aim: true,
            ..Default::default()
        };
        assert!(matches!(intent_for(&event, &echo_aim), EffectIntent::Script { anchor: Anchor::Target, .. }));

        let event_aim = event.clone().with_auto_aim(true);
        assert!(matches!(
            intent_for(&event_aim, &PlaybackModifiers::default()),
            EffectIntent::Script { anchor: Anchor::Target, .. }
        ));
    }

    #[test]
    fn test_buff_and_debuff_single_stack() {
        let (caster, target) = ids();
        let buff = intent_for(&TimelineEvent::buff(0.0, caster, target, "haste", 4.0), &PlaybackModifiers::default());
        assert!(matches!(buff, EffectIntent::ApplyBuff { stacks: 1, .. }));

        let debuff = intent_for(&TimelineEvent::debuff(0.0, caster, target, "slow", 4.0), &PlaybackModifiers::default());
        assert!(matches!(debuff, EffectIntent::ApplyDebuff { stacks: 1, source, .. } if source == caster));
    }

    #[test]
    fn test_sink_apply_routes() {
        let (caster, target) = ids();
        let mut sink = DispatchTrace::new();
        let intent = intent_for(&TimelineEvent::heal(0.0, caster, target, 9), &PlaybackModifiers::default());
        assert!(sink.apply(&intent));
        assert_eq!(sink.calls(), &[intent]);
    }

    #[test]
    fn test_sink_apply_reports_declined_summon() {
        let (caster, target) = ids();
        let mut sink = DispatchTrace::new().declining_summons();
        let intent = intent_for(
            &TimelineEvent::summon_pet(0.0, caster, target, "wolf", 1, 1.0),
            &PlaybackModifiers::default(),
        );
        assert!(!sink.apply(&intent));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_intent_target_and_kind() {
        let (caster, target) = ids();
        for kind in TimelineEventKind::ALL {
            let intent = intent_for(&TimelineEvent::new(0.0, kind, caster, target), &PlaybackModifiers::default());
            assert_eq!(intent.target(), target);
            assert_eq!(intent.kind(), kind);
        }
    }
}
