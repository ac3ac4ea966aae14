//! Calendar resolution: recurrence expansion, overrides, range filtering, pagination.
//!
//! This crate turns the events of an [`EventSource`] into the ordered list of
//! occurrences visible in a date range:
//! - Recurring templates are expanded by the [`RecurrenceStrategy`] registered
//!   for their label
//! - Overrides replace the generated occurrence they point at
//! - Results are ordered by start, then id, and can be limited and paged
//!
//! # Example
//!
//! ```rust,no_run
//! use calendarful::{
//!     CalendarFactory, Event, ExtraFilters, IntervalRecurrence, MemorySource, RecurrenceRegistry,
//! };
//! use chrono::{DateTime, Duration, Utc};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let factory = CalendarFactory::new(RecurrenceRegistry::new().with(IntervalRecurrence::weekly()));
//!
//!     let start: DateTime<Utc> = "2025-01-06T09:00:00Z".parse()?;
//!     let source = MemorySource::with_events(
//!         "team",
//!         vec![Event::template(1, start, start + Duration::minutes(15), "weekly")],
//!     );
//!
//!     let mut calendar = factory.create("team");
//!     calendar.populate(&source, start, start + Duration::weeks(4), Some(10), ExtraFilters::new())?;
//!     for event in calendar.iterate()? {
//!         println!("{} {}", event.start(), event.id());
//!     }
//!     Ok(())
//! }
//! ```

pub mod calendar;
pub mod error;
pub mod factory;


pub use calendar::{Calendar, Events};
pub use error::{CalendarError, CalendarResult};
pub use factory::CalendarFactory;

pub use calendarful_core::{
    CalendarConfig, CompositeKey, DateRange, Event, EventId, EventRole, ExtraFilters,
    FilterValue, Filters, IntervalRecurrence, LogFormat, LoggingSettings, RecurrenceRegistry,
    RecurrenceStrategy, init_tracing,
};
pub use calendarful_sources::{ErrorSource, EventSource, MemorySource, SourceError, SourceResult};
