//! EventSource trait definition.
//!
//! This module defines the [`EventSource`] trait, the single seam through
//! which a calendar obtains candidate events. Sources are responsible for:
//! - Reading events from wherever they are stored
//! - Applying any storage-level filtering they can do cheaply
//! - Reporting failures as [`SourceError`]
//!
//! Calendars make no assumption about ordering or range-correctness of what
//! a source returns.

use std::fmt;

use calendarful_core::{Event, Filters};

use crate::error::{SourceError, SourceResult};

/// Supplies candidate events for a query.
///
/// # Implementation Notes
///
/// - `get` is called exactly once per calendar populate
/// - `filters` always carries the range and limit; extra filters are the
///   caller's and arrive unmodified
/// - Recurring templates that may produce occurrences in the range should
///   be returned even when their own dates fall outside it, and so should
///   overrides whose `occurrence_date` lies in the range
/// - A source should not truncate to `filters.limit`; templates have not
///   been expanded yet, so the limit applies to the resolved result
///
/// Closures of the shape `Fn(&Filters) -> SourceResult<Vec<Event>>` are
/// sources too:
///
/// ```ignore
/// let source = |_: &Filters| Ok(vec![event.clone()]);
/// calendar.populate(&source, from, to, None, ExtraFilters::new())?;
/// ```
pub trait EventSource {
    /// Returns the name of this source, used in logs and errors.
    fn name(&self) -> &str {
        "anonymous"
    }

    /// Returns candidate events for `filters`.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` when the backing store cannot be queried.
    fn get(&self, filters: &Filters) -> SourceResult<Vec<Event>>;
}

impl<F> EventSource for F
where
    F: Fn(&Filters) -> SourceResult<Vec<Event>>,
{
    fn get(&self, filters: &Filters) -> SourceResult<Vec<Event>> {
        self(filters)
    }
}

type ErrorFactory = Box<dyn Fn() -> SourceError + Send + Sync>;

/// A source that always fails.
///
/// Useful as a placeholder when the real source could not be set up, and
/// for exercising error propagation.
pub struct ErrorSource {
    name: String,
    make_error: ErrorFactory,
}

impl ErrorSource {
    /// Creates a source that fails with the code and message of `error`.
    ///
    /// Only the code and message are replayed on each call; use
    /// [`with_factory`](Self::with_factory) to keep a cause chain.
    pub fn new(name: impl Into<String>, error: SourceError) -> Self {
        let code = error.code();
        let message = error.message().to_string();
        Self::with_factory(name, move || SourceError::new(code, message.clone()))
    }

    /// Creates a source that fails with whatever `make_error` builds.
    pub fn with_factory<F>(name: impl Into<String>, make_error: F) -> Self
    where
        F: Fn() -> SourceError + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            make_error: Box::new(make_error),
        }
    }
}

impl fmt::Debug for ErrorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorSource")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl EventSource for ErrorSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, _filters: &Filters) -> SourceResult<Vec<Event>> {
        Err((self.make_error)().with_source_name(&self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceErrorCode;
    use calendarful_core::DateRange;
    use chrono::{TimeZone, Utc};

    fn filters() -> Filters {
        let range = DateRange::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap(),
        )
        .unwrap();
        Filters::new(range, None)
    }

    #[test]
    fn closure_is_a_source() {
        let event = Event::new(
            1,
            Utc.with_ymd_and_hms(2025, 1, 5, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 5, 10, 0, 0).unwrap(),
        );
        let expected = event.clone();
        let source = move |_: &Filters| -> SourceResult<Vec<Event>> { Ok(vec![event.clone()]) };

        assert_eq!(source.name(), "anonymous");
        assert_eq!(source.get(&filters()).unwrap(), vec![expected]);
    }

    #[test]
    fn closure_sees_filters() {
        let source = |filters: &Filters| -> SourceResult<Vec<Event>> {
            if filters.get("calendar").is_none() {
                return Err(SourceError::invalid_filter("calendar filter is required"));
            }
            Ok(Vec::new())
        };

        let err = source.get(&filters()).unwrap_err();
        assert_eq!(err.code(), SourceErrorCode::InvalidFilter);
        assert!(source.get(&filters().with_extra("calendar", "team")).is_ok());
    }

    #[test]
    fn error_source_returns_error() {
        let source = ErrorSource::new("events-db", SourceError::connectivity("unreachable"));

        assert_eq!(source.name(), "events-db");
        let err = source.get(&filters()).unwrap_err();
        assert_eq!(err.code(), SourceErrorCode::Connectivity);
        assert_eq!(err.source_name(), Some("events-db"));
        assert_eq!(err.message(), "unreachable");
    }

    #[test]
    fn factory_error_keeps_cause() {
        use std::error::Error;

        let source = ErrorSource::with_factory("events-db", || {
            SourceError::connectivity("lost connection")
                .with_cause(std::io::Error::other("socket closed"))
        });

        let err = source.get(&filters()).unwrap_err();
        assert_eq!(err.source_name(), Some("events-db"));
        assert_eq!(err.source().map(ToString::to_string), Some("socket closed".to_string()));
        assert!(format!("{source:?}").contains("events-db"));
    }
}
