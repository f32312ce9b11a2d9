//! Temporal Imprint Simulation
//!
//! Deterministic, fixed-timestep playback of JSON scenarios through the
//! imprint scheduler, with a record of every pipeline call made.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod harness;
pub mod record;
pub mod scenario;

pub use harness::{SimHarness, SimResult};
pub use record::{DispatchCall, EchoExit, RecordEntry, RunComparison, RunDelta, SimRecord};
pub use scenario::{Command, EventSpec, Scenario, ScenarioError, TimedCommand};
