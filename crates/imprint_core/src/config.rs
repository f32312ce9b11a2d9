//! Engine configuration.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Imprint engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImprintConfig {
    /// Highest recursion depth a recording or echo may carry (None = uncapped)
    pub max_recursion_depth: Option<u8>,
    /// Echo health assigned on spawn, before callers override it
    pub echo_default_health: f32,
    /// Suppression armed on the source when an echo is spawned (None = never)
    pub suppression_after_echo: Option<f32>,
}

impl Default for ImprintConfig {
    fn default() -> Self {
        Self {
            max_recursion_depth: None,
            echo_default_health: 1.0,
            suppression_after_echo: None,
        }
    }
}

impl ImprintConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap recursion depth
    #[must_use]
    pub fn with_max_recursion_depth(mut self, depth: u8) -> Self {
        self.max_recursion_depth = Some(depth);
        self
    }

    /// Set default echo health
    #[must_use]
    pub fn with_echo_default_health(mut self, health: f32) -> Self {
        self.echo_default_health = health;
        self
    }

    /// Arm a suppression on the source for `seconds` whenever an echo spawns
    #[must_use]
    pub fn with_suppression_after_echo(mut self, seconds: f32) -> Self {
        self.suppression_after_echo = Some(seconds);
        self
    }

    /// Whether `depth` is within the configured cap
    #[must_use]
    pub fn allows_depth(&self, depth: u8) -> bool {
        self.max_recursion_depth.is_none_or(|cap| depth <= cap)
    }

    /// Check field invariants
    ///
    /// # Errors
    ///
    /// Returns error if a field is out of range
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.echo_default_health.is_finite() && self.echo_default_health > 0.0) {
            return Err(CoreError::Validation {
                field: "echo_default_health".to_string(),
                reason: "must be a positive finite number".to_string(),
            });
        }
        if let Some(seconds) = self.suppression_after_echo {
            if !(seconds.is_finite() && seconds >= 0.0) {
                return Err(CoreError::Validation {
                    field: "suppression_after_echo".to_string(),
                    reason: "must be a non-negative finite number".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Parse and validate from JSON
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or a field is out of range
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| CoreError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), ?config, "loaded imprint config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = ImprintConfig::default();
        assert_eq!(config.max_recursion_depth, None);
        assert_eq!(config.echo_default_health, 1.0);
        assert_eq!(config.suppression_after_echo, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_uncapped_allows_any_depth() {
        let config = ImprintConfig::default();
        assert!(config.allows_depth(0));
        assert!(config.allows_depth(u8::MAX));
    }

    #[test]
    fn test_capped_depth() {
        let config = ImprintConfig::new().with_max_recursion_depth(2);
        assert!(config.allows_depth(2));
        assert!(!config.allows_depth(3));
    }

    #[test]
    fn test_from_json_partial() {
        let config = ImprintConfig::from_json_str(r#"{"max_recursion_depth": 1}"#).unwrap();
        assert_eq!(config.max_recursion_depth, Some(1));
        assert_eq!(config.echo_default_health, 1.0);
    }

    #[test]
    fn test_from_json_rejects_bad_health() {
        let err = ImprintConfig::from_json_str(r#"{"echo_default_health": 0.0}"#).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"suppression_after_echo": 5.0}}"#).unwrap();
        let config = ImprintConfig::load(file.path()).unwrap();
        assert_eq!(config.suppression_after_echo, Some(5.0));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ImprintConfig::load("/nonexistent/imprint.json").unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }
}
