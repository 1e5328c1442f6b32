//! Error types for stunt.
//!
//! Errors carry the name that failed to resolve so a test failure points
//! straight at the offending stand-in or function.
//!
//! A requested name that merely breaks the naming convention is not an
//! error: synthesis returns `None` for it and the type simply does not exist.

use thiserror::Error;

/// The main error type for stunt operations.
#[derive(Error, Debug)]
pub enum StuntError {
    // =========================================================================
    // Resolution Errors (E001-E099)
    // =========================================================================
    /// A stand-in type could not be resolved or synthesized.
    #[error("E001: Stand-in type '{name}' not found")]
    ClassNotFound {
        /// The requested type name.
        name: String,
    },

    /// Neither a replacement nor a global fallback exists for a function.
    #[error("E002: Function '{name}' not found (no replacement and no global '{short_name}')")]
    FunctionNotFound {
        /// The fully qualified function name.
        name: String,
        /// The short name used for the global fallback lookup.
        short_name: String,
    },

    // =========================================================================
    // Configuration Errors (E100-E199)
    // =========================================================================
    /// Invalid configuration value.
    #[error("E101: Invalid config field '{field}': {cause}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        cause: String,
    },

    /// Configuration could not be parsed.
    #[error("E102: Failed to parse config: {0}")]
    ConfigParse(String),

    // =========================================================================
    // Recording Errors (E200-E299)
    // =========================================================================
    /// Recorded history could not be (de)serialized.
    #[error("E201: Serialization error: {0}")]
    Serialization(String),
}

impl StuntError {
    /// Get the error code (e.g., "E001").
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ClassNotFound { .. } => "E001",
            Self::FunctionNotFound { .. } => "E002",
            Self::InvalidConfig { .. } => "E101",
            Self::ConfigParse(_) => "E102",
            Self::Serialization(_) => "E201",
        }
    }

    /// Check if this error means a name could not be resolved.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ClassNotFound { .. } | Self::FunctionNotFound { .. }
        )
    }

    /// Check if this is a configuration error.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. } | Self::ConfigParse(_))
    }
}

/// Result type alias for stunt operations.
pub type Result<T> = std::result::Result<T, StuntError>;
