//! # Error Types
//!
//! Structured error types for n185_core. Validation failures carry the
//! offending field and value so callers (form layers, the CLI, scripts) can
//! point at exactly what to fix.
//!
//! ## Example
//!
//! ```rust
//! use n185_core::errors::{FlowError, FlowResult};
//!
//! fn validate_static(static_psi: f64) -> FlowResult<()> {
//!     if static_psi <= 0.0 {
//!         return Err(FlowError::invalid_input(
//!             "static_pressure",
//!             static_psi.to_string(),
//!             "Static must be greater than 0",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_static(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for n185_core operations
pub type FlowResult<T> = Result<T, FlowError>;

/// Structured error type for hydraulic and chart operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum FlowError {
    /// An input value is invalid (non-numeric, non-positive, static <= residual, ...)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A curve referenced by id does not exist in the collection
    #[error("Curve not found: {id}")]
    CurveNotFound { id: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl FlowError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        FlowError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a CurveNotFound error
    pub fn curve_not_found(id: impl Into<String>) -> Self {
        FlowError::CurveNotFound { id: id.into() }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        FlowError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        FlowError::SerializationError {
            reason: reason.into(),
        }
    }

    /// True for errors caused by the input itself; retrying with the same
    /// input will fail the same way.
    pub fn is_validation(&self) -> bool {
        matches!(self, FlowError::InvalidInput { .. })
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FlowError::FileError { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            FlowError::InvalidInput { .. } => "INVALID_INPUT",
            FlowError::CurveNotFound { .. } => "CURVE_NOT_FOUND",
            FlowError::FileError { .. } => "FILE_ERROR",
            FlowError::SerializationError { .. } => "SERIALIZATION_ERROR",
            FlowError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = FlowError::invalid_input("test_flow", "-5", "Test Flow must be greater than 0");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: FlowError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(FlowError::curve_not_found("H-1").error_code(), "CURVE_NOT_FOUND");
        assert_eq!(FlowError::serialization("bad").error_code(), "SERIALIZATION_ERROR");
        assert!(FlowError::invalid_input("a", "b", "c").is_validation());
        assert!(!FlowError::invalid_input("a", "b", "c").is_recoverable());
    }

    #[test]
    fn test_display_names_field() {
        let error = FlowError::invalid_input("static_pressure", "0", "Static must be greater than 0");
        assert_eq!(
            error.to_string(),
            "Invalid input for 'static_pressure': 0 - Static must be greater than 0"
        );
    }
}
