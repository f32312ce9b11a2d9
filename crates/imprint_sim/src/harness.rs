//! Fixed-timestep harness that plays a scenario through the scheduler.
//!
//! Runs are deterministic: the same scenario always yields the same record.

use crate::record::{DispatchCall, SimRecord};
use crate::scenario::{Command, Scenario, ScenarioError, TimedCommand};
use imprint_core::EntityId;
use imprint_replay::DispatchTrace;
use imprint_runtime::{DamageRequest, Scheduler, TickReport};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Slack when comparing command times against the clock
const TIME_EPSILON: f64 = 1e-9;

/// Outcome of a scenario run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimResult {
    pub ticks_executed: u64,
    pub final_time: f64,
    pub commands_applied: usize,
    /// Commands the engine refused (suppressed recording, missing timeline, dead echo)
    pub commands_refused: usize,
    /// Commands scheduled past the end of the run
    pub commands_skipped: usize,
    pub echoes_spawned: usize,
    pub echoes_destroyed: usize,
    pub live_entities: usize,
    /// Damage left in ordinary entities' queues for the generic pipeline
    pub unhandled_damage: i64,
    pub record: SimRecord,
}

/// Scenario harness
#[derive(Debug)]
pub struct SimHarness {
    scheduler: Scheduler,
    names: IndexMap<String, EntityId>,
    commands: Vec<TimedCommand>,
    next_command: usize,
    total_ticks: u64,
    result: SimResult,
}

impl SimHarness {
    /// Validate `scenario` and spawn its actors
    ///
    /// # Errors
    ///
    /// Returns error if the scenario does not validate
    pub fn new(scenario: &Scenario) -> Result<Self, ScenarioError> {
        scenario.validate()?;

        let mut scheduler = Scheduler::new(scenario.config.clone()).with_replay_config(scenario.replay.clone());
        let names = scenario
            .actors
            .iter()
            .map(|actor| (actor.clone(), scheduler.spawn()))
            .collect();
        let commands = scenario
            .ordered_commands()
            .into_iter()
            .map(|(_, timed)| timed.clone())
            .collect();

        Ok(Self {
            scheduler,
            names,
            commands,
            next_command: 0,
            total_ticks: scenario.tick_count(),
            result: SimResult {
                record: SimRecord::new(scenario.name.clone(), scenario.dt),
                ..SimResult::default()
            },
        })
    }

    /// Run `scenario` to completion
    ///
    /// # Errors
    ///
    /// Returns error if the scenario does not validate
    pub fn run(scenario: &Scenario) -> Result<SimResult, ScenarioError> {
        let mut harness = Self::new(scenario)?;
        while !harness.is_finished() {
            harness.step(scenario.dt);
        }
        Ok(harness.finish())
    }

    /// Entity a scenario name currently refers to
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<EntityId> {
        self.names.get(name).copied()
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn record(&self) -> &SimRecord {
        &self.result.record
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.result.ticks_executed >= self.total_ticks
    }

    /// Apply the commands that are due, then run one tick of `dt`
    pub fn step(&mut self, dt: f64) -> TickReport {
        self.apply_due_commands();

        let mut trace = DispatchTrace::new();
        let report = self.scheduler.tick(dt, &mut trace);
        let time = report.now.as_secs();

        for intent in trace.drain() {
            let call = DispatchCall {
                kind: intent.kind(),
                target: self.label(intent.target()),
                intent,
            };
            self.result.record.push(report.tick, time, call);
        }
        for (echo, lifecycle) in &report.destroyed {
            let label = self.label(*echo);
            self.result.record.push_exit(report.tick, time, label, *lifecycle);
        }
        self.result.echoes_destroyed += report.destroyed.len();
        self.drain_generic_damage();

        self.result.ticks_executed += 1;
        self.result.final_time = time;
        report
    }

    /// Close out the run
    #[must_use]
    pub fn finish(mut self) -> SimResult {
        self.result.commands_skipped = self.commands.len() - self.next_command;
        self.result.live_entities = self.scheduler.world().len();
        self.result.record.ticks = self.result.ticks_executed;
        tracing::debug!(
            ticks = self.result.ticks_executed,
            calls = self.result.record.call_count(),
            skipped = self.result.commands_skipped,
            "scenario finished"
        );
        self.result
    }

    fn apply_due_commands(&mut self) {
        let now = self.scheduler.now().as_secs();
        while let Some(timed) = self.commands.get(self.next_command) {
            if timed.at > now + TIME_EPSILON {
                break;
            }
            let command = timed.command.clone();
            self.next_command += 1;

            if self.apply(&command) {
                self.result.commands_applied += 1;
            } else {
                tracing::debug!(op = command.op(), at = now, "command refused");
                self.result.commands_refused += 1;
            }
        }
    }

    fn apply(&mut self, command: &Command) -> bool {
        match command {
            Command::StartRecording { actor, duration, depth } => {
                let Some(id) = self.entity(actor) else { return false };
                self.scheduler.start_recording(id, *duration, *depth)
            }
            Command::Append { actor, event } => {
                let (Some(id), Some(caster), Some(target)) =
                    (self.entity(actor), self.entity(&event.caster), self.entity(&event.target))
                else {
                    return false;
                };
                self.scheduler.append_event(id, event.to_event(caster, target))
            }
            Command::SpawnEcho {
                source,
                name,
                duration,
                depth,
                health,
                modifiers,
            } => {
                let Some(id) = self.entity(source) else { return false };
                let Some(echo) = self.scheduler.spawn_echo(id, *duration, *depth) else {
                    return false;
                };
                if let Some(max) = health {
                    self.scheduler.set_echo_health(echo, *max);
                }
                if let Some(modifiers) = modifiers {
                    self.scheduler.configure_echo(echo, *modifiers);
                }
                if let Some(name) = name {
                    self.names.insert(name.clone(), echo);
                }
                self.result.echoes_spawned += 1;
                true
            }
            Command::Damage {
                target,
                amount,
                school,
                source,
            } => {
                let Some(id) = self.entity(target) else { return false };
                let source = source
                    .as_deref()
                    .and_then(|name| self.entity(name))
                    .unwrap_or(EntityId::NULL);
                self.scheduler.enqueue_damage(
                    id,
                    DamageRequest {
                        amount: *amount,
                        school: *school,
                        source,
                    },
                )
            }
            Command::Suppress { actor, seconds } => {
                let Some(id) = self.entity(actor) else { return false };
                self.scheduler.suppress(id, *seconds)
            }
        }
    }

    /// Stand-in for the generic damage pipeline: empty the queues of entities
    /// the echo interceptor does not own
    fn drain_generic_damage(&mut self) {
        let ids: Vec<EntityId> = self.names.values().copied().collect();
        for id in ids {
            if self.scheduler.world().echo_health(id).is_some() {
                continue;
            }
            let world = self.scheduler.world_mut();
            let taken: i64 = world.take_damage_requests(id).iter().map(|r| i64::from(r.amount)).sum();
            self.result.unhandled_damage += taken;
        }
    }

    /// Scenario name for `id`, or the handle itself
    fn label(&self, id: EntityId) -> String {
        self.names
            .iter()
            .find(|(_, entity)| **entity == id)
            .map_or_else(|| id.to_string(), |(name, _)| name.clone())
    }
}
