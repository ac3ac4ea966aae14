//! In-memory event source.

use calendarful_core::{Event, EventId, Filters};
use tracing::debug;

use crate::error::SourceResult;
use crate::source::EventSource;

/// An [`EventSource`] backed by a vector of events.
///
/// `get` keeps an event when all of the following hold:
/// - its `[start, end]` intersects the range, or it is a template whose
///   `recurrence_until` is unset or not before the range start, or it is an
///   override whose `occurrence_date` lies in the range
/// - every extra filter matches the event attribute of the same key
///
/// The limit is not applied here.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    name: String,
    events: Vec<Event>,
}

impl MemorySource {
    /// Creates an empty source with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: Vec::new(),
        }
    }

    /// Creates a source holding `events`.
    pub fn with_events(name: impl Into<String>, events: Vec<Event>) -> Self {
        Self {
            name: name.into(),
            events,
        }
    }

    /// Adds an event.
    pub fn insert(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Removes every event with the given id, returning how many were removed.
    pub fn remove(&mut self, id: &EventId) -> usize {
        let before = self.events.len();
        self.events.retain(|e| e.id() != id);
        before - self.events.len()
    }

    /// Returns all stored events.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn in_window(event: &Event, filters: &Filters) -> bool {
        if event.overlaps(&filters.range) {
            return true;
        }
        if event
            .occurrence_date()
            .is_some_and(|date| filters.range.contains(date))
        {
            return true;
        }
        event.is_template()
            && event
                .recurrence_until()
                .is_none_or(|until| until >= filters.from())
    }

    fn matches_extra(event: &Event, filters: &Filters) -> bool {
        filters.extra.iter().all(|(key, expected)| {
            event
                .attribute(key)
                .is_some_and(|actual| expected.matches(actual))
        })
    }
}

impl Extend<Event> for MemorySource {
    fn extend<T: IntoIterator<Item = Event>>(&mut self, iter: T) {
        self.events.extend(iter);
    }
}

impl EventSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, filters: &Filters) -> SourceResult<Vec<Event>> {
        let events: Vec<Event> = self
            .events
            .iter()
            .filter(|e| Self::in_window(e, filters) && Self::matches_extra(e, filters))
            .cloned()
            .collect();

        debug!(
            source = %self.name,
            stored = self.events.len(),
            returned = events.len(),
            "Served events from memory"
        );
        Ok(events)
    }
}
