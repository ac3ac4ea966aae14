//! Calendar error types.

use calendarful_core::{ConfigError, EventId, RangeError, RecurrenceError};
use calendarful_sources::SourceError;
use thiserror::Error;

/// Result type for calendar operations.
pub type CalendarResult<T> = Result<T, CalendarError>;

/// Errors that can occur while resolving a calendar.
#[derive(Debug, Error)]
pub enum CalendarError {
    /// The calendar was read before any successful populate.
    #[error("calendar has not been populated")]
    NotPopulated,

    /// The requested range starts after it ends.
    #[error(transparent)]
    InvalidRange(#[from] RangeError),

    /// No recurrence strategy is registered for a label.
    #[error(transparent)]
    UnknownRecurrenceType(#[from] RecurrenceError),

    /// An event ends before it starts.
    #[error("event {id} ends before it starts")]
    InvalidEvent { id: EventId },

    /// The event source failed.
    #[error("event source failed: {0}")]
    Source(#[from] SourceError),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CalendarError {
    /// Creates an invalid event error.
    pub fn invalid_event(id: EventId) -> Self {
        Self::InvalidEvent { id }
    }

    /// Returns true if the failure came from the event source and may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Source(err) if err.is_retryable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_populated_display() {
        assert_eq!(
            CalendarError::NotPopulated.to_string(),
            "calendar has not been populated"
        );
    }

    #[test]
    fn recurrence_error_is_transparent() {
        let err = CalendarError::from(RecurrenceError::unknown("monthly"));
        assert_eq!(err.to_string(), "unknown recurrence type: monthly");
    }

    #[test]
    fn source_errors_keep_retryability() {
        let err = CalendarError::from(SourceError::connectivity("timeout"));
        assert!(err.is_retryable());
        assert!(err.to_string().contains("connectivity: timeout"));

        let err = CalendarError::from(SourceError::query("bad column"));
        assert!(!err.is_retryable());
        assert!(!CalendarError::NotPopulated.is_retryable());
    }

    #[test]
    fn invalid_event_display() {
        let err = CalendarError::invalid_event(EventId::from(7));
        assert_eq!(err.to_string(), "event 7 ends before it starts");
    }
}
