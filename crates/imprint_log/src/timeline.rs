//! Append-only timeline of recorded events.

use crate::encoding::CanonicalEncode;
use crate::event::TimelineEvent;
use serde::{Deserialize, Serialize};

/// A time-ordered, append-only event log
///
/// Callers are expected to push events with non-decreasing `time`. This is
/// not enforced: replay walks the log by index and never rewinds, so an
/// out-of-order event simply fires when the cursor reaches it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    events: Vec<TimelineEvent>,
}

impl Timeline {
    /// Create an empty timeline
    #[must_use]
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Create from existing events, in order
    #[must_use]
    pub fn from_events(events: Vec<TimelineEvent>) -> Self {
        Self { events }
    }

    /// Append an event
    pub fn push(&mut self, event: TimelineEvent) {
        self.events.push(event);
    }

    /// Remove every event
    pub fn clear(&mut self) {
        self.events.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TimelineEvent> {
        self.events.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut TimelineEvent> {
        self.events.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimelineEvent> {
        self.events.iter()
    }

    #[must_use]
    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    /// Pending events at or after `cursor`, with their indices
    pub fn pending_from(&self, cursor: usize) -> impl Iterator<Item = (usize, &TimelineEvent)> {
        self.events
            .iter()
            .enumerate()
            .skip(cursor)
            .filter(|(_, event)| event.is_pending())
    }

    /// Number of pending events in the whole log
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_pending()).count()
    }

    /// Whether event times are non-decreasing. Diagnostic only.
    #[must_use]
    pub fn is_time_ordered(&self) -> bool {
        self.events.windows(2).all(|w| w[0].time <= w[1].time)
    }

    /// Offset of the last event, or zero when empty
    #[must_use]
    pub fn span(&self) -> f32 {
        self.events.last().map_or(0.0, |e| e.time)
    }

    /// Independent copy of every event, in order and with their current state
    #[must_use]
    pub fn deep_clone(&self) -> Self {
        Self {
            events: self.events.clone(),
        }
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a TimelineEvent;
    type IntoIter = std::slice::Iter<'a, TimelineEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl CanonicalEncode for Timeline {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{DamageSchool, TimelineEventState};
    use imprint_core::EntityId;

    fn sample() -> Timeline {
        let caster = EntityId::from_parts(0, 0);
        let target = EntityId::from_parts(1, 0);
        Timeline::from_events(vec![
            TimelineEvent::damage(1.0, caster, target, 10, DamageSchool::Physical),
            TimelineEvent::heal(2.0, caster, target, 4),
            TimelineEvent::debuff(3.0, caster, target, "slow", 5.0),
        ])
    }

    #[test]
    fn test_timeline_new() {
        let timeline = Timeline::new();
        assert!(timeline.is_empty());
        assert_eq!(timeline.span(), 0.0);
        assert!(timeline.is_time_ordered());
    }

    #[test]
    fn test_timeline_push_and_clear() {
        let mut timeline = sample();
        assert_eq!(timeline.len(), 3);
        assert_eq!(timeline.span(), 3.0);
        timeline.clear();
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_pending_from() {
        let mut timeline = sample();
        timeline.get_mut(1).unwrap().mark_processed();

        let pending: Vec<usize> = timeline.pending_from(0).map(|(i, _)| i).collect();
        assert_eq!(pending, vec![0, 2]);

        let pending: Vec<usize> = timeline.pending_from(1).map(|(i, _)| i).collect();
        assert_eq!(pending, vec![2]);
        assert_eq!(timeline.pending_count(), 2);
    }

    #[test]
    fn test_out_of_order_is_tolerated() {
        let caster = EntityId::from_parts(0, 0);
        let mut timeline = sample();
        timeline.push(TimelineEvent::heal(0.5, caster, caster, 1));
        assert_eq!(timeline.len(), 4);
        assert!(!timeline.is_time_ordered());
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let original = sample();
        let mut copy = original.deep_clone();
        assert_eq!(original, copy);

        copy.get_mut(0).unwrap().mark_processed();
        assert_eq!(copy.get(0).unwrap().state, TimelineEventState::Processed);
        assert_eq!(original.get(0).unwrap().state, TimelineEventState::Pending);
    }

    #[test]
    fn test_deep_clone_keeps_state() {
        let mut original = sample();
        original.get_mut(2).unwrap().mark_processed();
        let copy = original.deep_clone();
        assert_eq!(copy.get(2).unwrap().state, TimelineEventState::Processed);
    }
}
