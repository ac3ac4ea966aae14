//! Calendar construction from shared settings.

use std::path::Path;
use std::sync::Arc;

use calendarful_core::{CalendarConfig, ExtraFilters, RecurrenceRegistry};
use tracing::debug;

use crate::calendar::Calendar;
use crate::error::CalendarResult;

/// Builds calendars that share one set of recurrence strategies.
///
/// Every calendar created by a factory expands templates with the same
/// registry and sends the same base filters to its source.
#[derive(Debug, Clone)]
pub struct CalendarFactory {
    strategies: Arc<RecurrenceRegistry>,
    default_name: String,
    base_filters: ExtraFilters,
}

impl CalendarFactory {
    /// Creates a factory over `strategies`.
    pub fn new(strategies: RecurrenceRegistry) -> Self {
        Self::shared(Arc::new(strategies))
    }

    /// Creates a factory over an already shared registry.
    pub fn shared(strategies: Arc<RecurrenceRegistry>) -> Self {
        Self {
            strategies,
            default_name: CalendarConfig::default().name,
            base_filters: ExtraFilters::new(),
        }
    }

    /// Creates a factory from loaded configuration.
    ///
    /// When the configuration lists `recurrence_types`, only those strategies
    /// are kept from `strategies`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::UnknownRecurrenceType`](crate::CalendarError::UnknownRecurrenceType)
    /// if a listed type is not registered.
    pub fn from_config(
        strategies: &RecurrenceRegistry,
        config: &CalendarConfig,
    ) -> CalendarResult<Self> {
        let strategies = match &config.recurrence_types {
            Some(labels) => strategies.restrict(labels)?,
            None => strategies.clone(),
        };
        debug!(
            name = %config.name,
            strategies = ?strategies.labels().collect::<Vec<_>>(),
            filters = config.extra_filters.len(),
            "Configured calendar factory"
        );

        Ok(Self {
            strategies: Arc::new(strategies),
            default_name: config.name.clone(),
            base_filters: config.extra_filters.clone(),
        })
    }

    /// Loads configuration from a TOML file and builds a factory from it.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::Config`](crate::CalendarError::Config) if the
    /// file cannot be read or parsed, or any error of [`from_config`](Self::from_config).
    pub fn load(strategies: &RecurrenceRegistry, path: impl AsRef<Path>) -> CalendarResult<Self> {
        let config = CalendarConfig::load(path)?;
        Self::from_config(strategies, &config)
    }

    /// Builder method to set the base filters of created calendars.
    pub fn with_base_filters(mut self, filters: ExtraFilters) -> Self {
        self.base_filters = filters;
        self
    }

    pub fn strategies(&self) -> &Arc<RecurrenceRegistry> {
        &self.strategies
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// Creates an unpopulated calendar named `name`.
    pub fn create(&self, name: impl Into<String>) -> Calendar {
        Calendar::new(name)
            .with_strategies(Arc::clone(&self.strategies))
            .with_base_filters(self.base_filters.clone())
    }

    /// Creates an unpopulated calendar with the configured name.
    pub fn create_default(&self) -> Calendar {
        self.create(self.default_name.clone())
    }
}
