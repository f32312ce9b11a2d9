//! Canonical encoding for persisting and shipping timelines.
//!
//! Uses postcard for byte-stable encoding.

use serde::{Deserialize, Serialize};

/// Trait for canonical serialization
pub trait CanonicalEncode: Serialize {
    /// Encode to canonical bytes
    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        postcard::to_allocvec(self).map_err(|e| EncodeError::Serialize(e.to_string()))
    }

    /// Encode into a slice, returning the number of bytes written
    fn encode_to_slice(&self, slice: &mut [u8]) -> Result<usize, EncodeError> {
        let written = postcard::to_slice(self, slice).map_err(|_| EncodeError::BufferTooSmall)?;
        Ok(written.len())
    }
}

// Types opt in explicitly; there is no blanket impl.

/// Trait for canonical deserialization
pub trait CanonicalDecode<'de>: Deserialize<'de> {
    /// Decode from canonical bytes
    fn decode(data: &'de [u8]) -> Result<Self, DecodeError>
    where
        Self: Sized,
    {
        postcard::from_bytes(data).map_err(|_| DecodeError::InvalidEncoding)
    }
}

impl<'de, T: Deserialize<'de>> CanonicalDecode<'de> for T {}

/// Encoding errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// Buffer too small for encoded data
    #[error("Buffer too small for encoded data")]
    BufferTooSmall,

    /// Value could not be serialized
    #[error("Serialization failed: {0}")]
    Serialize(String),
}

/// Decoding errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Invalid encoding
    #[error("Invalid canonical encoding")]
    InvalidEncoding,
}

impl From<EncodeError> for imprint_core::CoreError {
    fn from(_: EncodeError) -> Self {
        Self::InvalidEncoding
    }
}

impl From<DecodeError> for imprint_core::CoreError {
    fn from(_: DecodeError) -> Self {
        Self::InvalidEncoding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{DamageSchool, TimelineEvent};
    use crate::timeline::Timeline;
    use imprint_core::EntityId;
    use proptest::prelude::*;

    fn sample_timeline() -> Timeline {
        let caster = EntityId::from_parts(0, 1);
        let target = EntityId::from_parts(2, 3);
        let mut timeline = Timeline::new();
        timeline.push(TimelineEvent::damage(0.5, caster, target, 12, DamageSchool::Shadow));
        timeline.push(TimelineEvent::buff(1.0, caster, target, "haste", 8.0));
        timeline.push(TimelineEvent::summon_pet(2.0, caster, target, "imp", 3, 2.5));
        timeline
    }

    #[test]
    fn test_timeline_decodes_unchanged() {
        let timeline = sample_timeline();
        let encoded = timeline.encode().unwrap();
        let decoded = Timeline::decode(&encoded).unwrap();
        assert_eq!(timeline, decoded);
    }

    #[test]
    fn test_encode_to_slice() {
        let timeline = sample_timeline();
        let expected = timeline.encode().unwrap();

        let mut buf = [0u8; 1024];
        let written = timeline.encode_to_slice(&mut buf).unwrap();
        assert_eq!(&buf[..written], expected.as_slice());
    }

    #[test]
    fn test_encode_to_small_slice() {
        let timeline = sample_timeline();
        let mut buf = [0u8; 4];
        assert_eq!(timeline.encode_to_slice(&mut buf), Err(EncodeError::BufferTooSmall));
    }

    #[test]
    fn test_decode_garbage() {
        let result = Timeline::decode(&[0xff, 0xff, 0xff]);
        assert_eq!(result.unwrap_err(), DecodeError::InvalidEncoding);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(DecodeError::InvalidEncoding.to_string(), "Invalid canonical encoding");
    }

    proptest::proptest! {
        #[test]
        fn prop_encode_deterministic(
            times in proptest::collection::vec(0.0f32..60.0, 0..16),
            amount in -1000i32..1000
        ) {
            let caster = EntityId::from_parts(1, 0);
            let target = EntityId::from_parts(2, 0);
            let mut timeline = Timeline::new();
            for t in times {
                timeline.push(TimelineEvent::heal(t, caster, target, amount));
            }
            let enc1 = timeline.encode().unwrap();
            let enc2 = timeline.deep_clone().encode().unwrap();
            prop_assert_eq!(enc1, enc2);
        }
    }
}
