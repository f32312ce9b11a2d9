//! Event types for the timeline log.
//!
//! A timeline event is a recorded effect intent, not an outcome: it describes
//! what was aimed at whom, and the replay pass fires it again later.

use crate::encoding::CanonicalEncode;
use imprint_core::{EffectId, EntityId};
use serde::{Deserialize, Serialize};

/// Timeline event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimelineEventKind {
    Damage,
    Heal,
    ApplyBuff,
    ApplyDebuff,
    Dot,
    Hot,
    SummonPet,
    Script,
}

impl TimelineEventKind {
    /// All kinds, in declaration order
    pub const ALL: [Self; 8] = [
        Self::Damage,
        Self::Heal,
        Self::ApplyBuff,
        Self::ApplyDebuff,
        Self::Dot,
        Self::Hot,
        Self::SummonPet,
        Self::Script,
    ];

    /// Opposite-polarity kind. Summons and scripts have no opposite.
    #[must_use]
    pub const fn inverted(self) -> Self {
        match self {
            Self::Damage => Self::Heal,
            Self::Heal => Self::Damage,
            Self::ApplyBuff => Self::ApplyDebuff,
            Self::ApplyDebuff => Self::ApplyBuff,
            Self::Dot => Self::Hot,
            Self::Hot => Self::Dot,
            Self::SummonPet => Self::SummonPet,
            Self::Script => Self::Script,
        }
    }

    pub const fn is_harmful(self) -> bool {
        matches!(self, Self::Damage | Self::ApplyDebuff | Self::Dot)
    }

    pub const fn is_beneficial(self) -> bool {
        matches!(self, Self::Heal | Self::ApplyBuff | Self::Hot)
    }
}

/// Replay state of a single event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimelineEventState {
    #[default]
    Pending,
    Processed,
}

/// Damage school, as tagged on damage packets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DamageSchool {
    #[default]
    Physical,
    Fire,
    Frost,
    Nature,
    Shadow,
    Holy,
    Arcane,
    Lightning,
}

/// World-space position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// A recorded timeline event
///
/// `time` is the offset in seconds from the start of the recording. The
/// payload fields are read according to `kind`; unused fields stay at their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub time: f32,
    pub kind: TimelineEventKind,
    pub state: TimelineEventState,
    pub caster: EntityId,
    pub target: EntityId,
    pub effect_id: EffectId,
    pub amount: i32,
    pub radius: f32,
    pub tick_interval: f32,
    pub duration: f32,
    pub school: DamageSchool,
    pub position: Position,
    pub hitbox_scale: f32,
    pub auto_aim: bool,
}

impl TimelineEvent {
    /// Create a pending event with an empty payload
    pub fn new(time: f32, kind: TimelineEventKind, caster: EntityId, target: EntityId) -> Self {
        Self {
            time,
            kind,
            state: TimelineEventState::Pending,
            caster,
            target,
            effect_id: EffectId::empty(),
            amount: 0,
            radius: 0.0,
            tick_interval: 0.0,
            duration: 0.0,
            school: DamageSchool::Physical,
            position: Position::default(),
            hitbox_scale: 1.0,
            auto_aim: false,
        }
    }

    pub fn damage(time: f32, caster: EntityId, target: EntityId, amount: i32, school: DamageSchool) -> Self {
        let mut event = Self::new(time, TimelineEventKind::Damage, caster, target);
        event.amount = amount;
        event.school = school;
        event
    }

    pub fn heal(time: f32, caster: EntityId, target: EntityId, amount: i32) -> Self {
        let mut event = Self::new(time, TimelineEventKind::Heal, caster, target);
        event.amount = amount;
        event
    }

    pub fn buff(time: f32, caster: EntityId, target: EntityId, id: impl Into<EffectId>, duration: f32) -> Self {
        let mut event = Self::new(time, TimelineEventKind::ApplyBuff, caster, target);
        event.effect_id = id.into();
        event.duration = duration;
        event
    }

    pub fn debuff(time: f32, caster: EntityId, target: EntityId, id: impl Into<EffectId>, duration: f32) -> Self {
        let mut event = Self::new(time, TimelineEventKind::ApplyDebuff, caster, target);
        event.effect_id = id.into();
        event.duration = duration;
        event
    }

    /// Damage over time: `per_tick` damage every `interval` seconds for `duration`
    pub fn dot(
        time: f32,
        caster: EntityId,
        target: EntityId,
        id: impl Into<EffectId>,
        per_tick: i32,
        interval: f32,
        duration: f32,
    ) -> Self {
        let mut event = Self::new(time, TimelineEventKind::Dot, caster, target);
        event.effect_id = id.into();
        event.amount = per_tick;
        event.tick_interval = interval;
        event.duration = duration;
        event
    }

    /// Heal over time: `per_tick` healing every `interval` seconds for `duration`
    pub fn hot(
        time: f32,
        caster: EntityId,
        target: EntityId,
        id: impl Into<EffectId>,
        per_tick: i32,
        interval: f32,
        duration: f32,
    ) -> Self {
        let mut event = Self::new(time, TimelineEventKind::Hot, caster, target);
        event.effect_id = id.into();
        event.amount = per_tick;
        event.tick_interval = interval;
        event.duration = duration;
        event
    }

    pub fn summon_pet(
        time: f32,
        caster: EntityId,
        target: EntityId,
        pet_id: impl Into<EffectId>,
        count: i32,
        radius: f32,
    ) -> Self {
        let mut event = Self::new(time, TimelineEventKind::SummonPet, caster, target);
        event.effect_id = pet_id.into();
        event.amount = count;
        event.radius = radius;
        event
    }

    pub fn script(time: f32, caster: EntityId, target: EntityId, feature_id: impl Into<EffectId>) -> Self {
        let mut event = Self::new(time, TimelineEventKind::Script, caster, target);
        event.effect_id = feature_id.into();
        event
    }

    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn with_hitbox_scale(mut self, scale: f32) -> Self {
        self.hitbox_scale = scale;
        self
    }

    /// Snap to the target's current position on replay instead of the recorded one
    #[must_use]
    pub fn with_auto_aim(mut self, auto_aim: bool) -> Self {
        self.auto_aim = auto_aim;
        self
    }

    pub fn is_pending(&self) -> bool {
        self.state == TimelineEventState::Pending
    }

    /// Mark processed. Processed is terminal.
    pub fn mark_processed(&mut self) {
        self.state = TimelineEventState::Processed;
    }
}

impl CanonicalEncode for TimelineEvent {}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (EntityId, EntityId) {
        (EntityId::from_parts(0, 0), EntityId::from_parts(1, 0))
    }

    #[test]
    fn test_inversion_pairs() {
        use TimelineEventKind::*;
        assert_eq!(Damage.inverted(), Heal);
        assert_eq!(Heal.inverted(), Damage);
        assert_eq!(ApplyBuff.inverted(), ApplyDebuff);
        assert_eq!(ApplyDebuff.inverted(), ApplyBuff);
        assert_eq!(Dot.inverted(), Hot);
        assert_eq!(Hot.inverted(), Dot);
        assert_eq!(SummonPet.inverted(), SummonPet);
        assert_eq!(Script.inverted(), Script);
    }

    #[test]
    fn test_inversion_is_involution() {
        for kind in TimelineEventKind::ALL {
            assert_eq!(kind.inverted().inverted(), kind);
        }
    }

    #[test]
    fn test_polarity_flips_under_inversion() {
        for kind in TimelineEventKind::ALL {
            assert_eq!(kind.is_harmful(), kind.inverted().is_beneficial());
        }
        assert!(!TimelineEventKind::SummonPet.is_harmful());
        assert!(!TimelineEventKind::Script.is_beneficial());
    }

    #[test]
    fn test_event_creation() {
        let (caster, target) = ids();
        let event = TimelineEvent::damage(1.5, caster, target, 40, DamageSchool::Frost);
        assert_eq!(event.kind, TimelineEventKind::Damage);
        assert_eq!(event.amount, 40);
        assert_eq!(event.school, DamageSchool::Frost);
        assert!(event.is_pending());
        assert_eq!(event.hitbox_scale, 1.0);
        assert!(!event.auto_aim);
    }

    #[test]
    fn test_dot_payload() {
        let (caster, target) = ids();
        let event = TimelineEvent::dot(0.0, caster, target, "ignite", 7, 1.0, 6.0);
        assert_eq!(event.effect_id.as_str(), "ignite");
        assert_eq!(event.amount, 7);
        assert_eq!(event.tick_interval, 1.0);
        assert_eq!(event.duration, 6.0);
    }

    #[test]
    fn test_summon_payload() {
        let (caster, target) = ids();
        let event = TimelineEvent::summon_pet(3.0, caster, target, "wolf", 2, 4.0)
            .with_position(Position::new(1.0, 0.0, 2.0))
            .with_auto_aim(true);
        assert_eq!(event.amount, 2);
        assert_eq!(event.radius, 4.0);
        assert_eq!(event.position, Position::new(1.0, 0.0, 2.0));
        assert!(event.auto_aim);
    }

    #[test]
    fn test_mark_processed() {
        let (caster, target) = ids();
        let mut event = TimelineEvent::heal(0.0, caster, target, 5);
        event.mark_processed();
        assert_eq!(event.state, TimelineEventState::Processed);
        assert!(!event.is_pending());
    }

    #[test]
    fn test_event_encode() {
        let (caster, target) = ids();
        let event = TimelineEvent::script(0.5, caster, target, "chrono_burst");
        let encoded = event.encode().unwrap();
        assert!(!encoded.is_empty());
    }
}
