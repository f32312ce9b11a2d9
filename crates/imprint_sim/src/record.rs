//! Recording of scenario runs for comparison and inspection.

use imprint_log::TimelineEventKind;
use imprint_replay::{EchoLifecycle, EffectIntent};
use serde::{Deserialize, Serialize};

/// One pipeline call made during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchCall {
    pub kind: TimelineEventKind,
    /// Scenario name of the target, or its handle if it has none
    pub target: String,
    pub intent: EffectIntent,
}

/// A call and when it happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub tick: u64,
    pub time: f64,
    pub call: DispatchCall,
}

/// An echo leaving the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoExit {
    pub tick: u64,
    pub time: f64,
    pub echo: String,
    pub lifecycle: EchoLifecycle,
}

/// Record of a scenario run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimRecord {
    /// Scenario name
    pub scenario: String,
    /// Fixed step the run used
    pub dt: f64,
    /// Ticks executed
    pub ticks: u64,
    /// Pipeline calls in dispatch order
    pub entries: Vec<RecordEntry>,
    /// Echo exits in order
    pub exits: Vec<EchoExit>,
}

impl SimRecord {
    #[must_use]
    pub fn new(scenario: impl Into<String>, dt: f64) -> Self {
        Self {
            scenario: scenario.into(),
            dt,
            ..Self::default()
        }
    }

    pub fn push(&mut self, tick: u64, time: f64, call: DispatchCall) {
        self.entries.push(RecordEntry { tick, time, call });
    }

    pub fn push_exit(&mut self, tick: u64, time: f64, echo: impl Into<String>, lifecycle: EchoLifecycle) {
        self.exits.push(EchoExit {
            tick,
            time,
            echo: echo.into(),
            lifecycle,
        });
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.entries.len()
    }

    /// Calls made during `tick`
    pub fn calls_at_tick(&self, tick: u64) -> impl Iterator<Item = &DispatchCall> {
        self.entries.iter().filter(move |e| e.tick == tick).map(|e| &e.call)
    }

    /// Calls aimed at the named target, with their tick
    pub fn calls_to<'a>(&'a self, target: &'a str) -> impl Iterator<Item = (u64, &'a DispatchCall)> {
        self.entries
            .iter()
            .filter(move |e| e.call.target == target)
            .map(|e| (e.tick, &e.call))
    }

    /// Number of calls of each kind, in first-seen order
    #[must_use]
    pub fn kind_counts(&self) -> Vec<(TimelineEventKind, usize)> {
        let mut counts: Vec<(TimelineEventKind, usize)> = Vec::new();
        for entry in &self.entries {
            match counts.iter_mut().find(|(kind, _)| *kind == entry.call.kind) {
                Some((_, count)) => *count += 1,
                None => counts.push((entry.call.kind, 1)),
            }
        }
        counts
    }

    /// Serialize to JSON
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Serialize to indented JSON
    #[must_use]
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialize from JSON
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Comparison of two runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunComparison {
    pub identical: bool,
    pub deltas: Vec<RunDelta>,
}

/// First-order difference between two runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDelta {
    pub index: usize,
    pub expected: String,
    pub actual: String,
}

impl RunComparison {
    /// Compare two records call by call
    #[must_use]
    pub fn compare(expected: &SimRecord, actual: &SimRecord) -> Self {
        let mut deltas = Vec::new();
        if expected.entries.len() != actual.entries.len() {
            deltas.push(RunDelta {
                index: 0,
                expected: format!("{} calls", expected.entries.len()),
                actual: format!("{} calls", actual.entries.len()),
            });
        }
        for (index, (a, b)) in expected.entries.iter().zip(&actual.entries).enumerate() {
            if a != b {
                deltas.push(RunDelta {
                    index,
                    expected: format!("{a:?}"),
                    actual: format!("{b:?}"),
                });
            }
        }
        if expected.exits != actual.exits {
            deltas.push(RunDelta {
                index: 0,
                expected: format!("{:?}", expected.exits),
                actual: format!("{:?}", actual.exits),
            });
        }

        Self {
            identical: deltas.is_empty(),
            deltas,
        }
    }

    #[must_use]
    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }

    /// Human-readable report
    #[must_use]
    pub fn report(&self) -> String {
        if self.identical {
            return "Runs are identical".to_string();
        }
        let mut report = format!("Found {} deltas:\n", self.deltas.len());
        for delta in &self.deltas {
            report.push_str(&format!(
                "  #{}: expected {}, got {}\n",
                delta.index, delta.expected, delta.actual
            ));
        }
        report
    }
}
