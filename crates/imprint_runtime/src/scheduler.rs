//! Ordered tick pipeline.
//!
//! One [`Scheduler::tick`] runs, in order:
//! - Recorder expiry
//! - Echo damage interception
//! - Timeline replay
//! - Suppression expiry
//!
//! and then flushes the intents replay produced. Interception must precede
//! replay within the tick: death detection reads the health it writes.

use crate::systems::{expire_recorders, expire_suppressions, intercept_echo_damage, replay_echoes};
use crate::utility;
use crate::world::{DamageRequest, World};
use imprint_core::{Clock, EntityId, ImprintConfig, SimTime};
use imprint_log::TimelineEvent;
use imprint_replay::{EchoLifecycle, EffectIntent, EffectSink, PlaybackModifiers, ReplayConfig, ReplayEngine};
use serde::{Deserialize, Serialize};

/// Summary of one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick counter after this tick
    pub tick: u64,
    /// Simulation time the passes ran at
    pub now: SimTime,
    /// Recording windows closed
    pub recorders_closed: usize,
    /// Echoes whose health ran out this tick
    pub echoes_depleted: usize,
    /// Intents handed to the sink
    pub dispatched: usize,
    /// Damage intents routed into a live echo's damage queue instead of the sink
    pub redirected: usize,
    /// Summons or scripts the sink declined
    pub declined: usize,
    /// Echoes destroyed, with their terminal state
    pub destroyed: Vec<(EntityId, EchoLifecycle)>,
    /// Suppressions lifted
    pub suppressions_lifted: usize,
}

/// Owns the world and drives it one fixed step at a time
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    world: World,
    clock: Clock,
    config: ImprintConfig,
    engine: ReplayEngine,
}

impl Scheduler {
    /// Create a scheduler over an empty world at time zero
    #[must_use]
    pub fn new(config: ImprintConfig) -> Self {
        Self {
            world: World::new(),
            clock: Clock::new(),
            config,
            engine: ReplayEngine::new(),
        }
    }

    #[must_use]
    pub fn with_replay_config(mut self, config: ReplayConfig) -> Self {
        self.engine = self.engine.with_config(config);
        self
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[must_use]
    pub fn config(&self) -> &ImprintConfig {
        &self.config
    }

    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    #[must_use]
    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    /// Spawn a plain entity
    pub fn spawn(&mut self) -> EntityId {
        self.world.spawn()
    }

    pub fn start_recording(&mut self, target: EntityId, duration: f32, recursion_depth: u8) -> bool {
        let now = self.clock.now();
        utility::start_recording(&mut self.world, &self.config, now, target, duration, recursion_depth)
    }

    pub fn append_event(&mut self, target: EntityId, event: TimelineEvent) -> bool {
        utility::append_event(&mut self.world, target, event)
    }

    pub fn spawn_echo(&mut self, source: EntityId, replay_duration: f32, recursion_depth: u8) -> Option<EntityId> {
        let now = self.clock.now();
        utility::spawn_echo(&mut self.world, &self.config, now, source, replay_duration, recursion_depth)
    }

    /// Suppress recordings on `target` for `seconds` from now
    pub fn suppress(&mut self, target: EntityId, seconds: f64) -> bool {
        let until = self.clock.now().after(seconds);
        utility::set_suppression(&mut self.world, target, until)
    }

    pub fn set_echo_health(&mut self, echo: EntityId, max: f32) -> bool {
        utility::set_echo_health(&mut self.world, echo, max)
    }

    pub fn configure_echo(&mut self, echo: EntityId, modifiers: PlaybackModifiers) -> bool {
        utility::configure_echo(&mut self.world, echo, modifiers)
    }

    /// Queue damage against any entity, as the outer damage pipeline would
    pub fn enqueue_damage(&mut self, target: EntityId, request: DamageRequest) -> bool {
        self.world.enqueue_damage(target, request)
    }

    /// Advance the clock by `dt` and run every pass once
    pub fn tick(&mut self, dt: f64, sink: &mut impl EffectSink) -> TickReport {
        self.clock.advance(dt);
        let now = self.clock.now();

        let recorders_closed = expire_recorders(&mut self.world, now);
        let depleted = intercept_echo_damage(&mut self.world);
        let pass = replay_echoes(&mut self.world, &self.engine, now);
        let suppressions_lifted = expire_suppressions(&mut self.world, now);

        let mut report = TickReport {
            tick: self.clock.tick(),
            now,
            recorders_closed,
            echoes_depleted: depleted.len(),
            destroyed: pass.destroyed,
            suppressions_lifted,
            ..TickReport::default()
        };

        for (_, intent) in pass.intents {
            if self.route_to_echo(&intent) {
                report.redirected += 1;
                continue;
            }
            if !sink.apply(&intent) {
                tracing::debug!(kind = ?intent.kind(), target = %intent.target(), "intent declined");
                report.declined += 1;
            }
            report.dispatched += 1;
        }

        tracing::trace!(
            tick = report.tick,
            %now,
            dispatched = report.dispatched,
            redirected = report.redirected,
            destroyed = report.destroyed.len(),
            "tick complete"
        );
        report
    }

    /// Divert damage aimed at a live echo into its own queue
    fn route_to_echo(&mut self, intent: &EffectIntent) -> bool {
        let &EffectIntent::Damage {
            target,
            amount,
            school,
            source,
        } = intent
        else {
            return false;
        };
        match self.world.get_mut(target) {
            Some(record) if record.echo_health.is_some() => {
                record.damage_requests.push(DamageRequest { amount, school, source });
                true
            }
            _ => false,
        }
    }
}
