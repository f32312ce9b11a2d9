//! Echo state: playback record, echo health, and the lifecycle state machine.

use imprint_core::SimTime;
use imprint_log::ReplayCursor;
use serde::{Deserialize, Serialize};

/// Multipliers and placement flags applied to every replayed payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackModifiers {
    pub damage_multiplier: f32,
    pub heal_multiplier: f32,
    pub hitbox_scale: f32,
    pub auto_aim: bool,
}

impl Default for PlaybackModifiers {
    fn default() -> Self {
        Self {
            damage_multiplier: 1.0,
            heal_multiplier: 1.0,
            hitbox_scale: 1.0,
            auto_aim: false,
        }
    }
}

/// Replay record attached to an echo entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    /// Origin of the echo's own clock
    pub start_time: SimTime,
    /// Seconds of playback before natural expiry
    pub replay_duration: f32,
    /// Next timeline index to consider
    pub cursor: ReplayCursor,
    pub recursion_depth: u8,
    pub modifiers: PlaybackModifiers,
}

impl Echo {
    /// Create an echo starting at `start_time` with default modifiers
    #[must_use]
    pub fn new(start_time: SimTime, replay_duration: f32, recursion_depth: u8) -> Self {
        Self {
            start_time,
            replay_duration,
            cursor: ReplayCursor::new(),
            recursion_depth,
            modifiers: PlaybackModifiers::default(),
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: PlaybackModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Seconds of the echo's clock elapsed at `now`
    #[must_use]
    pub fn elapsed(&self, now: SimTime) -> f64 {
        now.elapsed_since(self.start_time)
    }

    #[must_use]
    pub fn is_expired(&self, now: SimTime) -> bool {
        self.elapsed(now) >= f64::from(self.replay_duration)
    }
}

/// Kill threshold of an echo
///
/// Separate from ordinary health: only damage routed at the echo lowers it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EchoHealth {
    pub current: f32,
    pub max: f32,
}

impl EchoHealth {
    #[must_use]
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Subtract raw `amount`, clamping at zero. Negative amounts count as zero.
    /// Returns whether health is depleted.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        self.current -= amount.max(0.0);
        if self.current <= 0.0 {
            self.current = 0.0;
        }
        self.is_depleted()
    }

    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }
}

/// Lifecycle of an echo
///
/// `Expired` and `Dead` are terminal; both destroy the echo, only `Dead`
/// backfires the unplayed remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EchoLifecycle {
    Alive,
    Expired,
    Dead,
}

impl EchoLifecycle {
    /// Classify an echo at `now`. Death takes precedence over expiry.
    #[must_use]
    pub fn evaluate(echo: &Echo, now: SimTime, health: Option<&EchoHealth>) -> Self {
        if health.is_some_and(EchoHealth::is_depleted) {
            Self::Dead
        } else if echo.is_expired(now) {
            Self::Expired
        } else {
            Self::Alive
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Alive)
    }

    /// Whether the unplayed remainder fires inverted
    #[must_use]
    pub const fn backfires(self) -> bool {
        matches!(self, Self::Dead)
    }
}

impl std::fmt::Display for EchoLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alive => write!(f, "alive"),
            Self::Expired => write!(f, "expired"),
            Self::Dead => write!(f, "dead"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_new_defaults() {
        let echo = Echo::new(SimTime::from_secs(5.0), 10.0, 1);
        assert_eq!(echo.cursor.pos(), 0);
        assert_eq!(echo.recursion_depth, 1);
        assert_eq!(echo.modifiers, PlaybackModifiers::default());
        assert_eq!(echo.modifiers.damage_multiplier, 1.0);
        assert_eq!(echo.modifiers.hitbox_scale, 1.0);
        assert!(!echo.modifiers.auto_aim);
    }

    #[test]
    fn test_echo_elapsed_and_expiry() {
        let echo = Echo::new(SimTime::from_secs(5.0), 10.0, 0);
        assert_eq!(echo.elapsed(SimTime::from_secs(8.0)), 3.0);
        assert!(!echo.is_expired(SimTime::from_secs(14.9)));
        assert!(echo.is_expired(SimTime::from_secs(15.0)));
    }

    #[test]
    fn test_echo_health_damage_clamps() {
        let mut health = EchoHealth::new(50.0);
        assert!(!health.apply_damage(20.0));
        assert_eq!(health.current, 30.0);
        assert!(health.apply_damage(45.0));
        assert_eq!(health.current, 0.0);
        assert_eq!(health.max, 50.0);
    }

    #[test]
    fn test_lifecycle_alive() {
        let echo = Echo::new(SimTime::zero(), 10.0, 0);
        let health = EchoHealth::new(1.0);
        let state = EchoLifecycle::evaluate(&echo, SimTime::from_secs(3.0), Some(&health));
        assert_eq!(state, EchoLifecycle::Alive);
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_lifecycle_expired_without_health() {
        let echo = Echo::new(SimTime::zero(), 10.0, 0);
        let state = EchoLifecycle::evaluate(&echo, SimTime::from_secs(10.0), None);
        assert_eq!(state, EchoLifecycle::Expired);
        assert!(state.is_terminal());
        assert!(!state.backfires());
    }

    #[test]
    fn test_lifecycle_dead_beats_expired() {
        let echo = Echo::new(SimTime::zero(), 10.0, 0);
        let mut health = EchoHealth::new(5.0);
        health.apply_damage(5.0);
        let state = EchoLifecycle::evaluate(&echo, SimTime::from_secs(20.0), Some(&health));
        assert_eq!(state, EchoLifecycle::Dead);
        assert!(state.backfires());
    }
}
