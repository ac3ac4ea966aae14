//! Core types: events, date ranges, filters, recurrence strategies, configuration

pub mod config;
pub mod error;
pub mod event;
pub mod filter;
pub mod recurrence;
pub mod time;
pub mod tracing;

pub use config::CalendarConfig;
pub use error::{ConfigError, RangeError, RecurrenceError};
pub use event::{CompositeKey, Event, EventId, EventRole};
pub use filter::{ExtraFilters, FilterValue, Filters};
pub use recurrence::{IntervalRecurrence, RecurrenceRegistry, RecurrenceStrategy};
pub use time::DateRange;
pub use tracing::{LogFormat, LoggingSettings, TracingError, init_tracing};
