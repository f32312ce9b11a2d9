//! JSON scenario files driving the harness.
//!
//! A scenario names its actors up front and refers to them (and to any
//! echoes it spawns) by name; entity handles never appear in the file.

use imprint_core::{CoreError, EffectId, EntityId, ImprintConfig};
use imprint_log::{DamageSchool, Position, TimelineEvent, TimelineEventKind};
use imprint_replay::{PlaybackModifiers, ReplayConfig};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Scenario loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Config(#[from] CoreError),

    #[error("time step must be positive and finite, got {dt}")]
    InvalidStep { dt: f64 },

    #[error("duration must be non-negative and finite, got {duration}")]
    InvalidDuration { duration: f64 },

    #[error("name '{name}' is declared more than once")]
    DuplicateName { name: String },

    #[error("command {index} ({op}): unknown name '{name}'")]
    UnknownName { index: usize, op: &'static str, name: String },

    #[error("command {index} ({op}): {reason}")]
    InvalidCommand {
        index: usize,
        op: &'static str,
        reason: String,
    },
}

/// Timeline event as written in a scenario, with names in place of handles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSpec {
    pub time: f32,
    pub kind: TimelineEventKind,
    pub caster: String,
    pub target: String,
    #[serde(default)]
    pub effect_id: String,
    #[serde(default)]
    pub amount: i32,
    #[serde(default)]
    pub radius: f32,
    #[serde(default)]
    pub tick_interval: f32,
    #[serde(default)]
    pub duration: f32,
    #[serde(default)]
    pub school: DamageSchool,
    #[serde(default)]
    pub position: Position,
    #[serde(default = "unit_scale")]
    pub hitbox_scale: f32,
    #[serde(default)]
    pub auto_aim: bool,
}

fn unit_scale() -> f32 {
    1.0
}

impl EventSpec {
    /// Build the timeline event with names resolved to `caster` and `target`
    #[must_use]
    pub fn to_event(&self, caster: EntityId, target: EntityId) -> TimelineEvent {
        let mut event = TimelineEvent::new(self.time, self.kind, caster, target)
            .with_position(self.position)
            .with_hitbox_scale(self.hitbox_scale)
            .with_auto_aim(self.auto_aim);
        event.effect_id = EffectId::new(&self.effect_id);
        event.amount = self.amount;
        event.radius = self.radius;
        event.tick_interval = self.tick_interval;
        event.duration = self.duration;
        event.school = self.school;
        event
    }
}

/// One scenario command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    StartRecording {
        actor: String,
        duration: f32,
        #[serde(default)]
        depth: u8,
    },
    Append {
        actor: String,
        event: EventSpec,
    },
    SpawnEcho {
        source: String,
        /// Name later commands use to refer to the echo
        #[serde(default)]
        name: Option<String>,
        duration: f32,
        #[serde(default)]
        depth: u8,
        #[serde(default)]
        health: Option<f32>,
        #[serde(default)]
        modifiers: Option<PlaybackModifiers>,
    },
    /// Raw damage routed at an entity through its damage-request queue
    Damage {
        target: String,
        amount: i32,
        #[serde(default)]
        school: DamageSchool,
        #[serde(default)]
        source: Option<String>,
    },
    Suppress {
        actor: String,
        seconds: f64,
    },
}

impl Command {
    /// Operation name as written in the scenario file
    #[must_use]
    pub const fn op(&self) -> &'static str {
        match self {
            Self::StartRecording { .. } => "start_recording",
            Self::Append { .. } => "append",
            Self::SpawnEcho { .. } => "spawn_echo",
            Self::Damage { .. } => "damage",
            Self::Suppress { .. } => "suppress",
        }
    }

    /// Names this command refers to
    fn references(&self) -> Vec<&str> {
        match self {
            Self::StartRecording { actor, .. } | Self::Suppress { actor, .. } => vec![actor.as_str()],
            Self::Append { actor, event } => vec![actor.as_str(), event.caster.as_str(), event.target.as_str()],
            Self::SpawnEcho { source, .. } => vec![source.as_str()],
            Self::Damage { target, source, .. } => {
                let mut names = vec![target.as_str()];
                names.extend(source.as_deref());
                names
            }
        }
    }
}

/// A command and the simulation time it applies at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedCommand {
    pub at: f64,
    #[serde(flatten)]
    pub command: Command,
}

/// A complete scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub config: ImprintConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
    /// Fixed time step in seconds
    pub dt: f64,
    /// Simulated seconds to run
    pub duration: f64,
    pub actors: Vec<String>,
    #[serde(default)]
    pub commands: Vec<TimedCommand>,
}

impl Scenario {
    /// Parse and validate a scenario
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or the scenario is inconsistent
    pub fn from_json_str(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load and validate a scenario file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or validated
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let scenario = Self::from_json_str(&json)?;
        tracing::debug!(
            path = %path.display(),
            name = %scenario.name,
            commands = scenario.commands.len(),
            "loaded scenario"
        );
        Ok(scenario)
    }

    /// Serialize to pretty JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json_pretty(&self) -> Result<String, ScenarioError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the step, duration, names and every command
    ///
    /// Names resolve in application order: an echo name is usable only by
    /// commands applied after the `spawn_echo` that declares it.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found
    pub fn validate(&self) -> Result<(), ScenarioError> {
        self.config.validate()?;
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ScenarioError::InvalidStep { dt: self.dt });
        }
        if !(self.duration.is_finite() && self.duration >= 0.0) {
            return Err(ScenarioError::InvalidDuration {
                duration: self.duration,
            });
        }

        let mut names: IndexSet<&str> = IndexSet::new();
        for actor in &self.actors {
            if !names.insert(actor) {
                return Err(ScenarioError::DuplicateName { name: actor.clone() });
            }
        }

        for (index, timed) in self.ordered_commands() {
            let op = timed.command.op();
            if !(timed.at.is_finite() && timed.at >= 0.0) {
                return Err(ScenarioError::InvalidCommand {
                    index,
                    op,
                    reason: format!("'at' must be non-negative and finite, got {}", timed.at),
                });
            }
            if let Some(name) = timed.command.references().into_iter().find(|n| !names.contains(n)) {
                return Err(ScenarioError::UnknownName {
                    index,
                    op,
                    name: name.to_string(),
                });
            }
            if let Command::SpawnEcho { name: Some(name), .. } = &timed.command {
                if !names.insert(name) {
                    return Err(ScenarioError::DuplicateName { name: name.clone() });
                }
            }
        }
        Ok(())
    }

    /// Commands in application order, with their index in the file
    ///
    /// Stable: commands sharing an `at` keep file order.
    #[must_use]
    pub fn ordered_commands(&self) -> Vec<(usize, &TimedCommand)> {
        let mut ordered: Vec<(usize, &TimedCommand)> = self.commands.iter().enumerate().collect();
        ordered.sort_by(|(_, a), (_, b)| a.at.total_cmp(&b.at));
        ordered
    }

    /// Number of fixed steps needed to cover `duration`
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        if self.dt.is_nan() || self.dt <= 0.0 || self.duration <= 0.0 {
            return 0;
        }
        // Tolerance keeps 1.0 / 0.1 from rounding up to an extra tick
        (self.duration / self.dt - 1e-9).ceil().max(0.0) as u64
    }
}
