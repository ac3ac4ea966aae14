//! Error types for core calendar operations.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// An invalid date range was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// The start of the range lies after its end.
    #[error("invalid range: {from} is after {to}")]
    InvalidRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

/// Errors raised by recurrence strategy lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecurrenceError {
    /// No strategy is registered under the requested label.
    #[error("unknown recurrence type: {label}")]
    UnknownRecurrenceType { label: String },
}

impl RecurrenceError {
    /// Creates an unknown recurrence type error.
    pub fn unknown(label: impl Into<String>) -> Self {
        Self::UnknownRecurrenceType {
            label: label.into(),
        }
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
