//! Identifiers for imprint entities and effects.
//!
//! Entity handles are generational: a slot index plus the generation the slot
//! had when the handle was issued. A recycled slot bumps its generation, so a
//! handle held past its entity's destruction never resolves to a newcomer.

use serde::{Deserialize, Serialize};

/// Generational entity handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    /// The null handle. Never issued by a world and never resolves.
    pub const NULL: Self = Self {
        index: u32::MAX,
        generation: 0,
    };

    /// Create from raw parts
    #[must_use]
    pub const fn from_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Whether this is the null handle
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            write!(f, "ent_null")
        } else {
            write!(f, "ent_{}v{}", self.index, self.generation)
        }
    }
}

/// Bounded effect identifier (spell, buff, debuff, pet or script feature id)
///
/// Holds at most [`EffectId::MAX_LEN`] bytes of UTF-8. Longer input is cut at
/// the last char boundary that fits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct EffectId(String);

impl EffectId {
    /// Maximum length in bytes
    pub const MAX_LEN: usize = 64;

    /// Create a new effect id, truncating to [`Self::MAX_LEN`] bytes
    #[must_use]
    pub fn new(id: &str) -> Self {
        if id.len() <= Self::MAX_LEN {
            return Self(id.to_string());
        }
        let mut end = Self::MAX_LEN;
        while !id.is_char_boundary(end) {
            end -= 1;
        }
        Self(id[..end].to_string())
    }

    /// Empty id
    #[must_use]
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Get as str
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for EffectId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EffectId {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<EffectId> for String {
    fn from(value: EffectId) -> Self {
        value.0
    }
}

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
