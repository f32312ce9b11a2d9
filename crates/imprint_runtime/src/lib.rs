//! Temporal Imprint Runtime
//!
//! The entity world the imprint components live in, the per-tick passes over
//! it, and the scheduler that runs those passes in their required order.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod scheduler;
pub mod systems;
pub mod utility;
pub mod world;

pub use scheduler::{Scheduler, TickReport};
pub use systems::{ReplayPass, expire_recorders, expire_suppressions, intercept_echo_damage, replay_echoes};
pub use utility::{append_event, configure_echo, set_echo_health, set_suppression, spawn_echo, start_recording};
pub use world::{DamageRequest, EntityRecord, Recorder, Suppression, World};
