//! Per-tick passes over the world.
//!
//! Each pass walks its own component set once. Within a tick the echo damage
//! interceptor must run before [`replay_echoes`], which reads the health it
//! writes; [`crate::Scheduler`] enforces that order.

use crate::world::{EntityRecord, World};
use imprint_core::{EntityId, SimTime};
use imprint_replay::{EchoLifecycle, EffectIntent, ReplayEngine, StepOutcome};

/// Close every recording window whose duration has elapsed
///
/// Only the recorder goes; the timeline stays so echoes can still be cloned
/// from it. Returns the number of windows closed.
pub fn expire_recorders(world: &mut World, now: SimTime) -> usize {
    let mut closed = 0;
    for (id, record) in world.iter_mut() {
        if record.recorder.is_some_and(|r| r.is_expired(now)) {
            record.recorder = None;
            closed += 1;
            tracing::debug!(entity = %id, %now, "recording window closed");
        }
    }
    closed
}

/// Convert damage queued against echoes into echo-health loss
///
/// Raw amounts, no mitigation. The queue is always emptied so nothing falls
/// through to the ordinary damage pipeline. Depleted echoes are left for the
/// replay pass to invert and destroy. Returns the echoes depleted this call.
pub fn intercept_echo_damage(world: &mut World) -> Vec<EntityId> {
    let mut depleted = Vec::new();
    for (id, record) in world.iter_mut() {
        let EntityRecord {
            echo_health: Some(health),
            damage_requests,
            ..
        } = record
        else {
            continue;
        };
        if damage_requests.is_empty() {
            continue;
        }

        let was_depleted = health.is_depleted();
        for request in damage_requests.iter() {
            if health.apply_damage(request.amount as f32) {
                break;
            }
        }
        tracing::trace!(
            entity = %id,
            requests = damage_requests.len(),
            current = health.current,
            "intercepted echo damage"
        );
        damage_requests.clear();

        if health.is_depleted() && !was_depleted {
            tracing::debug!(entity = %id, "echo health depleted");
            depleted.push(id);
        }
    }
    depleted
}

/// Output of one replay pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayPass {
    /// Intents fired this tick, tagged with the echo that fired them
    pub intents: Vec<(EntityId, EffectIntent)>,
    /// Echoes destroyed this tick and why
    pub destroyed: Vec<(EntityId, EchoLifecycle)>,
}

/// Step every echo, then destroy the ones that reached a terminal state
pub fn replay_echoes(world: &mut World, engine: &ReplayEngine, now: SimTime) -> ReplayPass {
    let mut pass = ReplayPass::default();

    for (id, record) in world.iter_mut() {
        let EntityRecord {
            echo: Some(echo),
            timeline: Some(timeline),
            echo_health,
            ..
        } = record
        else {
            continue;
        };

        match engine.step(echo, timeline, now, echo_health.as_ref()) {
            StepOutcome::Continue(intents) => {
                pass.intents.extend(intents.into_iter().map(|intent| (id, intent)));
            }
            StepOutcome::Terminate { lifecycle, backfire } => {
                pass.intents.extend(backfire.into_iter().map(|intent| (id, intent)));
                pass.destroyed.push((id, lifecycle));
            }
        }
    }

    for (id, lifecycle) in &pass.destroyed {
        world.despawn(*id);
        tracing::debug!(entity = %id, %lifecycle, "echo destroyed");
    }

    pass
}

/// Lift suppressions that have run out. Returns the number lifted.
pub fn expire_suppressions(world: &mut World, now: SimTime) -> usize {
    let mut lifted = 0;
    for (id, record) in world.iter_mut() {
        if record.suppression.is_some_and(|s| !s.is_active(now)) {
            record.suppression = None;
            lifted += 1;
            tracing::debug!(entity = %id, %now, "recording suppression lifted");
        }
    }
    lifted
}
