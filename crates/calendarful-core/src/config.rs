//! Calendar configuration.
//!
//! Settings live in a single TOML document:
//!
//! ```toml
//! name = "team"
//! recurrence_types = ["daily", "weekly"]
//!
//! [extra_filters]
//! category = "work"
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```
//!
//! Every section is optional.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::filter::ExtraFilters;
use crate::tracing::LoggingSettings;

/// Configuration for calendars built by a factory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Name given to calendars created without an explicit one.
    pub name: String,

    /// Filters merged beneath the extra filters of every populate call.
    pub extra_filters: ExtraFilters,

    /// Labels of the recurrence strategies to enable; all when unset.
    pub recurrence_types: Option<Vec<String>>,

    /// Logging settings.
    pub logging: LoggingSettings,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            extra_filters: ExtraFilters::new(),
            recurrence_types: None,
            logging: LoggingSettings::default(),
        }
    }
}

impl CalendarConfig {
    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is not valid.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), name = %config.name, "Loaded calendar config");
        Ok(config)
    }
}
