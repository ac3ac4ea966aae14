//! Tracing setup for calendarful.
//!
//! The library crates only emit events through `tracing`; installing a
//! subscriber is left to the embedding application, which can do so from
//! the `[logging]` section of its [`CalendarConfig`](crate::CalendarConfig):
//!
//! ```ignore
//! use calendarful_core::{CalendarConfig, init_tracing};
//!
//! let config = CalendarConfig::load("calendar.toml")?;
//! init_tracing(&config.logging)?;
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to set global subscriber
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// Failed to parse env filter directive
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Output format for log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Multi-line human-readable output
    Pretty,
    /// Single-line output (default)
    #[default]
    Compact,
    /// One JSON object per line
    Json,
}

/// The `[logging]` configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Level used for the `calendarful` targets when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// Include file and line of the call site.
    pub include_location: bool,
    /// Include the module path.
    pub include_target: bool,
    /// Explicit filter directive; takes precedence over `level` and `RUST_LOG`.
    pub filter: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            include_location: false,
            include_target: true,
            filter: None,
        }
    }
}

impl LoggingSettings {
    /// Builds the filter these settings describe.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit directive, or the directive derived
    /// from `level`, cannot be parsed.
    pub fn env_filter(&self) -> Result<EnvFilter, TracingError> {
        if let Some(ref directive) = self.filter {
            return Ok(EnvFilter::try_new(directive)?);
        }
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => Ok(EnvFilter::try_new(format!("calendarful={}", self.level))?),
        }
    }
}

/// Install a global subscriber configured from `settings`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already set or the filter
/// directive is invalid.
pub fn init_tracing(settings: &LoggingSettings) -> Result<(), TracingError> {
    let filter = settings.env_filter()?;
    let layer = fmt::layer()
        .with_file(settings.include_location)
        .with_line_number(settings.include_location)
        .with_target(settings.include_target);

    let layer = match settings.format {
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer.json().boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
