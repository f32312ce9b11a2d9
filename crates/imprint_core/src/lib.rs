//! Temporal Imprint Core Types
//!
//! This crate contains pure types and logic with no simulation behaviour.
//! All types are serializable with stable, cross-platform encoding.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod id;
pub mod time;

// Re-exports
pub use config::ImprintConfig;
pub use error::{CoreError, CoreResult};
pub use id::{EffectId, EntityId};
pub use time::{Clock, SimTime};
