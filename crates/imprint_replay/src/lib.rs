//! Temporal Imprint Replay Engine
//!
//! Re-fires recorded timelines on an echo's own clock, and inverts whatever
//! is left unplayed when the echo is killed early.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dispatch;
pub mod engine;
pub mod state;
pub mod trace;

pub use dispatch::{Anchor, EffectIntent, EffectSink, OverTimeEffect, SummonRequest, intent_for, invert};
pub use engine::{ReplayConfig, ReplayEngine, StepOutcome};
pub use state::{Echo, EchoHealth, EchoLifecycle, PlaybackModifiers};
pub use trace::DispatchTrace;
