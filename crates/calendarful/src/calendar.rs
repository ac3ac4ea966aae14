//! The calendar and its resolution pipeline.
//!
//! A [`Calendar`] turns the candidate events of an [`EventSource`] into the
//! ordered list of occurrences visible in a closed date range:
//!
//! 1. Fetch candidates from the source
//! 2. Expand recurring templates with every registered strategy
//! 3. Drop the templates themselves
//! 4. Deduplicate by composite key, letting overrides replace occurrences
//! 5. Keep events overlapping the range
//! 6. Order by `(start, id)` and truncate to the limit
//!
//! The result is stored until the next populate.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;

use calendarful_core::{
    CompositeKey, DateRange, Event, ExtraFilters, Filters, RecurrenceRegistry, RecurrenceStrategy,
};
use calendarful_sources::EventSource;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, trace};

use crate::error::{CalendarError, CalendarResult};

/// Orders events by start, then id.
fn chronological(a: &Event, b: &Event) -> Ordering {
    a.start().cmp(&b.start()).then_with(|| a.id().cmp(b.id()))
}

/// The stored outcome of one populate call.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Resolution {
    range: DateRange,
    events: Vec<Event>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum CalendarState {
    #[default]
    Unpopulated,
    Populated(Resolution),
}

/// A named calendar resolved against an event source.
///
/// A calendar starts out unpopulated; reading it fails with
/// [`CalendarError::NotPopulated`] until [`populate`](Self::populate)
/// succeeds. Each populate replaces the stored result entirely, and a
/// failed populate leaves the previous result in place.
#[derive(Debug, Clone)]
pub struct Calendar {
    name: String,
    strategies: Arc<RecurrenceRegistry>,
    base_filters: ExtraFilters,
    state: CalendarState,
}

impl Calendar {
    /// Creates an unpopulated calendar with no recurrence strategies.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strategies: Arc::new(RecurrenceRegistry::new()),
            base_filters: ExtraFilters::new(),
            state: CalendarState::Unpopulated,
        }
    }

    /// Builder method to set the recurrence strategies used for expansion.
    pub fn with_strategies(mut self, strategies: Arc<RecurrenceRegistry>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Builder method to set filters sent with every populate.
    ///
    /// Extra filters passed to `populate` take precedence on equal keys.
    pub fn with_base_filters(mut self, filters: ExtraFilters) -> Self {
        self.base_filters = filters;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strategies(&self) -> &RecurrenceRegistry {
        &self.strategies
    }

    /// Looks up a registered strategy by label.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::UnknownRecurrenceType`] if no strategy is
    /// registered under `label`.
    pub fn strategy(&self, label: &str) -> CalendarResult<Arc<dyn RecurrenceStrategy>> {
        Ok(self.strategies.resolve(label)?)
    }

    /// Returns true once a populate has succeeded.
    pub fn is_populated(&self) -> bool {
        matches!(self.state, CalendarState::Populated(_))
    }

    /// Returns the range of the last successful populate.
    pub fn range(&self) -> Option<DateRange> {
        match &self.state {
            CalendarState::Populated(resolution) => Some(resolution.range),
            CalendarState::Unpopulated => None,
        }
    }

    /// Resolves the events visible in `[from, to]` and stores them.
    ///
    /// The source is queried once with the range, `limit`, the base filters
    /// and `extra_filters`. At most `limit` events are kept, starting from
    /// the earliest.
    ///
    /// # Errors
    ///
    /// - [`CalendarError::InvalidRange`] if `from` is after `to`; the source
    ///   is not queried
    /// - [`CalendarError::Source`] if the source fails
    /// - [`CalendarError::InvalidEvent`] if a candidate or generated event
    ///   ends before it starts
    ///
    /// On error the previously stored result is kept.
    pub fn populate<S>(
        &mut self,
        source: &S,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: Option<usize>,
        extra_filters: ExtraFilters,
    ) -> CalendarResult<&mut Self>
    where
        S: EventSource + ?Sized,
    {
        let range = DateRange::new(from, to)?;

        let mut extra = self.base_filters.clone();
        extra.extend(extra_filters);
        let filters = Filters::new(range, limit).with_extras(extra);

        let candidates = source.get(&filters)?;
        debug!(
            calendar = %self.name,
            source = source.name(),
            candidates = candidates.len(),
            "Fetched candidate events"
        );

        let events = resolve(&self.strategies, candidates, &range, limit)?;
        debug!(
            calendar = %self.name,
            resolved = events.len(),
            "Resolved calendar"
        );

        self.state = CalendarState::Populated(Resolution { range, events });
        Ok(self)
    }

    /// Returns an iterator over the stored events.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::NotPopulated`] before the first successful populate.
    pub fn iterate(&self) -> CalendarResult<Events<'_>> {
        Ok(Events {
            inner: self.stored()?.iter(),
        })
    }

    /// Returns the stored events as a slice.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::NotPopulated`] before the first successful populate.
    pub fn events(&self) -> CalendarResult<&[Event]> {
        self.stored()
    }

    /// Consumes the calendar, returning the stored events.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::NotPopulated`] before the first successful populate.
    pub fn into_events(self) -> CalendarResult<Vec<Event>> {
        match self.state {
            CalendarState::Populated(resolution) => Ok(resolution.events),
            CalendarState::Unpopulated => Err(CalendarError::NotPopulated),
        }
    }

    /// Returns the number of stored events.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::NotPopulated`] before the first successful populate.
    pub fn count(&self) -> CalendarResult<usize> {
        Ok(self.stored()?.len())
    }

    /// Re-orders the stored events by start, then id.
    ///
    /// Does nothing on an unpopulated calendar.
    pub fn sort(&mut self) -> &mut Self {
        if let CalendarState::Populated(resolution) = &mut self.state {
            resolution.events.sort_by(chronological);
        }
        self
    }

    /// Keeps at most `limit` stored events, skipping the first `offset`.
    ///
    /// Does nothing on an unpopulated calendar.
    pub fn paginate(&mut self, limit: usize, offset: usize) -> &mut Self {
        if let CalendarState::Populated(resolution) = &mut self.state {
            let events = std::mem::take(&mut resolution.events);
            resolution.events = events.into_iter().skip(offset).take(limit).collect();
            trace!(
                calendar = %self.name,
                limit,
                offset,
                kept = resolution.events.len(),
                "Paginated calendar"
            );
        }
        self
    }

    /// Groups the stored events under the UTC date they start on.
    ///
    /// Days are in ascending order; within a day events are ordered by start,
    /// then id.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::NotPopulated`] before the first successful populate.
    pub fn by_day(&self) -> CalendarResult<BTreeMap<NaiveDate, Vec<&Event>>> {
        let mut days: BTreeMap<NaiveDate, Vec<&Event>> = BTreeMap::new();
        for event in self.stored()? {
            days.entry(event.start().date_naive())
                .or_default()
                .push(event);
        }
        for events in days.values_mut() {
            events.sort_by(|a, b| chronological(a, b));
        }
        Ok(days)
    }

    fn stored(&self) -> CalendarResult<&[Event]> {
        match &self.state {
            CalendarState::Populated(resolution) => Ok(&resolution.events),
            CalendarState::Unpopulated => Err(CalendarError::NotPopulated),
        }
    }
}

/// Iterator over the events of a populated [`Calendar`].
#[derive(Debug, Clone)]
pub struct Events<'a> {
    inner: std::slice::Iter<'a, Event>,
}

impl<'a> Iterator for Events<'a> {
    type Item = &'a Event;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Events<'_> {}

/// Runs the resolution pipeline over `candidates`.
fn resolve(
    strategies: &RecurrenceRegistry,
    candidates: Vec<Event>,
    range: &DateRange,
    limit: Option<usize>,
) -> CalendarResult<Vec<Event>> {
    ensure_well_formed(&candidates)?;

    // Each override can displace at most one generated occurrence.
    let overrides = candidates.iter().filter(|e| e.is_override()).count();
    let expansion_limit = limit.map(|limit| limit.saturating_add(overrides));
    let generated = expand(strategies, &candidates, range, expansion_limit);
    ensure_well_formed(&generated)?;

    // Templates are expansion input only, whatever their own dates are.
    let mut working: Vec<Event> = candidates
        .into_iter()
        .filter(|e| !e.is_template())
        .chain(generated)
        .collect();

    working.sort_by(chronological);
    let deduplicated = deduplicate(working);

    let mut visible: Vec<Event> = deduplicated
        .into_values()
        .filter(|e| e.overlaps(range))
        .collect();
    visible.sort_by(chronological);

    if let Some(limit) = limit {
        visible.truncate(limit);
    }
    Ok(visible)
}

fn ensure_well_formed(events: &[Event]) -> CalendarResult<()> {
    match events.iter().find(|e| !e.is_well_formed()) {
        Some(event) => Err(CalendarError::invalid_event(event.id().clone())),
        None => Ok(()),
    }
}

/// Collects the occurrences every registered strategy produces.
fn expand(
    strategies: &RecurrenceRegistry,
    candidates: &[Event],
    range: &DateRange,
    limit: Option<usize>,
) -> Vec<Event> {
    for template in candidates.iter().filter(|e| e.is_template()) {
        if let Some(label) = template.recurrence_type() {
            if !strategies.all().contains_key(label) {
                debug!(
                    template = %template.id(),
                    label,
                    "No strategy registered for template, skipping expansion"
                );
            }
        }
    }

    let mut generated = Vec::new();
    for (label, strategy) in strategies.all() {
        let occurrences = strategy.expand(candidates, range, limit);
        trace!(label = %label, produced = occurrences.len(), "Expanded recurrences");
        generated.extend(occurrences);
    }
    generated
}

/// Keeps one event per composite key.
///
/// `sorted` must be in `(start, id)` order. On a collision an override
/// replaces anything that is not an override; otherwise the later event
/// replaces the earlier one.
fn deduplicate(sorted: Vec<Event>) -> BTreeMap<CompositeKey, Event> {
    let mut by_key: BTreeMap<CompositeKey, Event> = BTreeMap::new();
    for event in sorted {
        match by_key.entry(event.composite_key()) {
            Entry::Vacant(slot) => {
                slot.insert(event);
            }
            Entry::Occupied(mut slot) => {
                if slot.get().is_override() && !event.is_override() {
                    trace!(key = %slot.key(), "Kept override over occurrence");
                    continue;
                }
                trace!(
                    key = %slot.key(),
                    replaced = %slot.get().id(),
                    by = %event.id(),
                    "Replaced event sharing composite key"
                );
                slot.insert(event);
            }
        }
    }
    by_key
}
