//! Core error types for the imprint engine.
//!
//! Simulation calls never return these; they fail soft. Errors only surface
//! from configuration loading and encoding.

use std::fmt;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid encoding
    InvalidEncoding,

    /// Parse error
    ParseError { message: String },

    /// Validation error
    Validation { field: String, reason: String },

    /// Not found
    NotFound { kind: String, id: String },

    /// I/O failure while reading or writing a file
    Io { path: String, message: String },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEncoding => write!(f, "Invalid encoding"),
            Self::ParseError { message } => write!(f, "Parse error: {}", message),
            Self::Validation { field, reason } => {
                write!(f, "Validation failed for {}: {}", field, reason)
            }
            Self::NotFound { kind, id } => write!(f, "{} not found: {}", kind, id),
            Self::Io { path, message } => write!(f, "I/O error on {}: {}", path, message),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError {
            message: err.to_string(),
        }
    }
}

impl From<postcard::Error> for CoreError {
    fn from(_: postcard::Error) -> Self {
        Self::InvalidEncoding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidEncoding;
        assert_eq!(format!("{}", err), "Invalid encoding");

        let err = CoreError::NotFound {
            kind: "Actor".to_string(),
            id: "caster".to_string(),
        };
        assert_eq!(format!("{}", err), "Actor not found: caster");
    }

    #[test]
    fn test_validation_error() {
        let err = CoreError::Validation {
            field: "echo_default_health".to_string(),
            reason: "must be positive".to_string(),
        };
        let s = format!("{}", err);
        assert!(s.contains("echo_default_health"));
        assert!(s.contains("must be positive"));
    }

    #[test]
    fn test_from_json_error() {
        let err: CoreError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(err, CoreError::ParseError { .. }));
    }

    #[test]
    fn test_error_equality() {
        let err1 = CoreError::InvalidEncoding;
        let err2 = CoreError::InvalidEncoding;
        assert_eq!(err1, err2);

        let err3 = CoreError::ParseError {
            message: "eof".to_string(),
        };
        assert_ne!(err1, err3);
    }
}
