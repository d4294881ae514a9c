//! Error types.
//!
//! Only configuration loading is fallible; the per-cycle pipeline never
//! returns errors and never performs I/O.

use std::fmt;

/// Errors that can occur while loading a tracker configuration.
///
/// Callers treat these as non-fatal and fall back to the built-in defaults.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// The configuration file could not be read.
    Io {
        /// Path that failed to load.
        path: String,
        /// Underlying I/O error message.
        message: String,
    },

    /// The configuration file could not be parsed.
    Parse {
        /// Path that failed to parse.
        path: String,
        /// Underlying parse error message.
        message: String,
    },

    /// A loaded value is outside its valid range.
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// Description of the constraint violation.
        message: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, message } => {
                write!(f, "failed to read config {}: {}", path, message)
            }
            ConfigError::Parse { path, message } => {
                write!(f, "failed to parse config {}: {}", path, message)
            }
            ConfigError::InvalidValue { field, message } => {
                write!(f, "invalid config value for {}: {}", field, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
