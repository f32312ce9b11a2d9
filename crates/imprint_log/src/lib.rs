//! Temporal Imprint Timeline Log
//!
//! Time-ordered, append-only combat event logs captured during a recording
//! window, plus the forward-only cursor that replays walk them with.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cursor;
pub mod encoding;
pub mod event;
pub mod timeline;

pub use cursor::ReplayCursor;
pub use encoding::{CanonicalDecode, CanonicalEncode, DecodeError, EncodeError};
pub use event::{DamageSchool, Position, TimelineEvent, TimelineEventKind, TimelineEventState};
pub use timeline::Timeline;
