//! Forward-only cursor for walking a timeline during replay.

use serde::{Deserialize, Serialize};

/// Index of the next timeline event a replay will look at
///
/// Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ReplayCursor {
    position: usize,
}

impl ReplayCursor {
    #[must_use]
    pub fn new() -> Self {
        Self { position: 0 }
    }

    #[must_use]
    pub fn at(position: usize) -> Self {
        Self { position }
    }

    /// Step past the current event
    pub fn advance(&mut self) {
        self.position = self.position.saturating_add(1);
    }

    #[must_use]
    pub const fn pos(&self) -> usize {
        self.position
    }

    /// Whether the cursor has walked past the last of `len` events
    #[must_use]
    pub const fn is_exhausted(&self, len: usize) -> bool {
        self.position >= len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_new() {
        let cursor = ReplayCursor::new();
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn test_cursor_at() {
        let cursor = ReplayCursor::at(42);
        assert_eq!(cursor.pos(), 42);
    }

    #[test]
    fn test_cursor_advance() {
        let mut cursor = ReplayCursor::new();
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.pos(), 2);
    }

    #[test]
    fn test_cursor_saturates() {
        let mut cursor = ReplayCursor::at(usize::MAX);
        cursor.advance();
        assert_eq!(cursor.pos(), usize::MAX);
    }

    #[test]
    fn test_cursor_exhausted() {
        let cursor = ReplayCursor::at(3);
        assert!(cursor.is_exhausted(3));
        assert!(!cursor.is_exhausted(4));
        assert!(ReplayCursor::new().is_exhausted(0));
    }
}
