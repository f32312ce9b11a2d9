//! Replay engine for stepping echoes through their timelines.

use crate::dispatch::{EffectIntent, intent_for, invert};
use crate::state::{Echo, EchoHealth, EchoLifecycle, PlaybackModifiers};
use imprint_core::SimTime;
use imprint_log::Timeline;
use serde::{Deserialize, Serialize};

/// Replay engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Maximum events fired by one echo in one step (0 = unlimited)
    pub max_dispatch_per_step: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            max_dispatch_per_step: 0,
        }
    }
}

/// Result of stepping one echo
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Echo is still alive; these intents came due this step
    Continue(Vec<EffectIntent>),
    /// Echo reached a terminal state and must be destroyed
    Terminate {
        lifecycle: EchoLifecycle,
        /// Inverted remainder, empty unless the echo died
        backfire: Vec<EffectIntent>,
    },
}

impl StepOutcome {
    /// Intents produced by this step, whichever branch it took
    #[must_use]
    pub fn intents(&self) -> &[EffectIntent] {
        match self {
            Self::Continue(intents) => intents,
            Self::Terminate { backfire, .. } => backfire,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminate { .. })
    }
}

/// Replay engine
#[derive(Debug, Clone, Default)]
pub struct ReplayEngine {
    config: ReplayConfig,
}

impl ReplayEngine {
    /// Create a new replay engine
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ReplayConfig::default(),
        }
    }

    /// Create with custom config
    #[must_use]
    pub fn with_config(mut self, config: ReplayConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// Step one echo to `now`
    ///
    /// A terminal outcome leaves `echo` and `timeline` as they were; the
    /// caller destroys the entity.
    pub fn step(
        &self,
        echo: &mut Echo,
        timeline: &mut Timeline,
        now: SimTime,
        health: Option<&EchoHealth>,
    ) -> StepOutcome {
        let lifecycle = EchoLifecycle::evaluate(echo, now, health);
        if lifecycle.is_terminal() {
            let backfire = if lifecycle.backfires() {
                Self::backfire(echo, timeline)
            } else {
                Vec::new()
            };
            tracing::debug!(
                %lifecycle,
                cursor = echo.cursor.pos(),
                backfired = backfire.len(),
                "echo reached terminal state"
            );
            return StepOutcome::Terminate { lifecycle, backfire };
        }

        StepOutcome::Continue(self.advance(echo, timeline, echo.elapsed(now)))
    }

    /// Fire every pending event due at `elapsed`, moving the cursor past each
    ///
    /// Stops at the first pending event not yet due. Processed events are
    /// skipped without firing.
    pub fn advance(&self, echo: &mut Echo, timeline: &mut Timeline, elapsed: f64) -> Vec<EffectIntent> {
        let mut intents = Vec::new();
        let limit = self.config.max_dispatch_per_step;

        while let Some(event) = timeline.get_mut(echo.cursor.pos()) {
            if !event.is_pending() {
                echo.cursor.advance();
                continue;
            }
            if f64::from(event.time) > elapsed {
                break;
            }
            if limit > 0 && intents.len() >= limit {
                break;
            }

            let intent = intent_for(event, &echo.modifiers);
            tracing::trace!(
                index = echo.cursor.pos(),
                kind = ?event.kind,
                offset = event.time,
                "replaying timeline event"
            );
            event.mark_processed();
            intents.push(intent);
            echo.cursor.advance();
        }

        intents
    }

    /// Inverted intents for every pending event from the cursor onward
    ///
    /// Fired with default modifiers, not the echo's own.
    #[must_use]
    pub fn backfire(echo: &Echo, timeline: &Timeline) -> Vec<EffectIntent> {
        let modifiers = PlaybackModifiers::default();
        timeline
            .pending_from(echo.cursor.pos())
            .map(|(_, event)| intent_for(&invert(event), &modifiers))
            .collect()
    }
}
