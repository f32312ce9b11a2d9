//! Calls other systems make into the imprint engine.
//!
//! All of them are fail-soft: a missing entity or a refused request is a
//! `false`/`None` return and a debug log line, never an error.

use crate::world::{Recorder, Suppression, World};
use imprint_core::{EntityId, ImprintConfig, SimTime};
use imprint_log::{Timeline, TimelineEvent};
use imprint_replay::{Echo, EchoHealth, PlaybackModifiers};

/// Open a recording window on `target`
///
/// Overwrites any open window and empties the target's timeline. Refused
/// while an unexpired suppression is present or when `recursion_depth`
/// exceeds the configured cap.
pub fn start_recording(
    world: &mut World,
    config: &ImprintConfig,
    now: SimTime,
    target: EntityId,
    duration: f32,
    recursion_depth: u8,
) -> bool {
    let Some(record) = world.get_mut(target) else {
        tracing::debug!(entity = %target, "recording refused: no such entity");
        return false;
    };
    if record.suppression.is_some_and(|s| s.is_active(now)) {
        tracing::debug!(entity = %target, %now, "recording refused: suppressed");
        return false;
    }
    if !config.allows_depth(recursion_depth) {
        tracing::debug!(entity = %target, depth = recursion_depth, "recording refused: recursion cap");
        return false;
    }

    record.recorder = Some(Recorder {
        start_time: now,
        duration,
        recursion_depth,
    });
    match record.timeline.as_mut() {
        Some(timeline) => timeline.clear(),
        None => record.timeline = Some(Timeline::new()),
    }
    tracing::debug!(entity = %target, %now, duration, depth = recursion_depth, "recording started");
    true
}

/// Append `event` to the timeline of `target`, creating the timeline if missing
///
/// Event times are taken as given. Returns false if the entity is gone.
pub fn append_event(world: &mut World, target: EntityId, event: TimelineEvent) -> bool {
    let Some(record) = world.get_mut(target) else {
        return false;
    };
    let timeline = record.timeline.get_or_insert_with(Timeline::new);
    tracing::trace!(entity = %target, kind = ?event.kind, time = event.time, "event appended");
    timeline.push(event);
    true
}

/// Spawn an echo that replays a private copy of `source`'s timeline
///
/// Returns `None` when the source is gone, has no timeline, or the recursion
/// cap refuses the depth.
pub fn spawn_echo(
    world: &mut World,
    config: &ImprintConfig,
    now: SimTime,
    source: EntityId,
    replay_duration: f32,
    recursion_depth: u8,
) -> Option<EntityId> {
    if !config.allows_depth(recursion_depth) {
        tracing::debug!(entity = %source, depth = recursion_depth, "echo refused: recursion cap");
        return None;
    }
    let Some(timeline) = world.timeline(source).map(Timeline::deep_clone) else {
        tracing::debug!(entity = %source, "echo refused: source has no timeline");
        return None;
    };

    let echo = world.spawn();
    let record = world.get_mut(echo)?;
    let events = timeline.len();
    record.timeline = Some(timeline);
    record.echo = Some(Echo::new(now, replay_duration, recursion_depth));
    record.echo_health = Some(EchoHealth::new(config.echo_default_health));

    if let Some(seconds) = config.suppression_after_echo {
        set_suppression(world, source, now.after(f64::from(seconds)));
    }

    tracing::debug!(
        source = %source,
        echo = %echo,
        events,
        replay_duration,
        depth = recursion_depth,
        "echo spawned"
    );
    Some(echo)
}

/// Block new recordings on `target` until `expire_time`
pub fn set_suppression(world: &mut World, target: EntityId, expire_time: SimTime) -> bool {
    let Some(record) = world.get_mut(target) else {
        return false;
    };
    record.suppression = Some(Suppression { expire_time });
    tracing::debug!(entity = %target, until = %expire_time, "recording suppressed");
    true
}

/// Give an echo a new kill threshold, at full health
pub fn set_echo_health(world: &mut World, echo: EntityId, max: f32) -> bool {
    match world.get_mut(echo) {
        Some(record) if record.echo.is_some() => {
            record.echo_health = Some(EchoHealth::new(max));
            true
        }
        _ => false,
    }
}

/// Replace an echo's playback modifiers
pub fn configure_echo(world: &mut World, echo: EntityId, modifiers: PlaybackModifiers) -> bool {
    match world.get_mut(echo).and_then(|record| record.echo.as_mut()) {
        Some(state) => {
            state.modifiers = modifiers;
            true
        }
        None => false,
    }
}
