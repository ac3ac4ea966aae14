//! Recurrence strategies and their registry.
//!
//! A [`RecurrenceStrategy`] turns recurring templates into concrete
//! occurrences. Strategies are looked up by the label stored in a template's
//! `recurrence_type`; the [`RecurrenceRegistry`] holds pre-built instances so
//! that nothing is constructed from a label string at runtime.
//!
//! # Example
//!
//! ```ignore
//! use calendarful_core::{IntervalRecurrence, RecurrenceRegistry};
//!
//! let mut registry = RecurrenceRegistry::new();
//! registry.register(IntervalRecurrence::daily());
//! registry.register(IntervalRecurrence::weekly());
//!
//! let weekly = registry.resolve("weekly")?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, trace};

use crate::error::RecurrenceError;
use crate::event::Event;
use crate::time::DateRange;

/// Expands recurring templates into occurrences.
///
/// # Implementation Notes
///
/// - `expand` receives the whole candidate set and must only act on
///   templates whose `recurrence_type` equals [`label`](Self::label)
/// - The input must not be mutated; occurrences are returned as new events
/// - `recurrence_until`, when set, bounds generation
/// - Implementations must be safe to share between calendars, so any
///   internal state has to be immutable during `expand`
pub trait RecurrenceStrategy: Send + Sync {
    /// The label templates use to select this strategy.
    fn label(&self) -> &str;

    /// The most occurrences this strategy will ever produce for one template.
    fn limit(&self) -> usize;

    /// Produces occurrences for every matching template in `events`.
    ///
    /// `limit`, when set, is the caller's page size; a strategy may stop
    /// early once it has produced that many occurrences per template.
    fn expand(&self, events: &[Event], range: &DateRange, limit: Option<usize>) -> Vec<Event>;
}

/// A lookup table of recurrence strategies keyed by label.
#[derive(Clone, Default)]
pub struct RecurrenceRegistry {
    strategies: BTreeMap<String, Arc<dyn RecurrenceStrategy>>,
}

impl std::fmt::Debug for RecurrenceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecurrenceRegistry")
            .field("labels", &self.strategies.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl RecurrenceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a strategy under its own label.
    ///
    /// A strategy already registered under the same label is replaced.
    pub fn register<S>(&mut self, strategy: S) -> &mut Self
    where
        S: RecurrenceStrategy + 'static,
    {
        self.register_shared(Arc::new(strategy))
    }

    /// Registers an already shared strategy.
    pub fn register_shared(&mut self, strategy: Arc<dyn RecurrenceStrategy>) -> &mut Self {
        let label = strategy.label().to_string();
        if self.strategies.insert(label.clone(), strategy).is_some() {
            debug!(label = %label, "Replaced recurrence strategy");
        } else {
            debug!(label = %label, "Registered recurrence strategy");
        }
        self
    }

    /// Builder method to register a strategy.
    pub fn with<S>(mut self, strategy: S) -> Self
    where
        S: RecurrenceStrategy + 'static,
    {
        self.register(strategy);
        self
    }

    /// Returns every registered strategy keyed by label.
    pub fn all(&self) -> &BTreeMap<String, Arc<dyn RecurrenceStrategy>> {
        &self.strategies
    }

    /// Looks up the strategy registered under `label`.
    ///
    /// # Errors
    ///
    /// Returns [`RecurrenceError::UnknownRecurrenceType`] when no strategy is
    /// registered under `label`.
    pub fn resolve(&self, label: &str) -> Result<Arc<dyn RecurrenceStrategy>, RecurrenceError> {
        self.strategies
            .get(label)
            .cloned()
            .ok_or_else(|| RecurrenceError::unknown(label))
    }

    /// Builds a registry holding only the strategies named in `labels`.
    ///
    /// # Errors
    ///
    /// Returns [`RecurrenceError::UnknownRecurrenceType`] for the first label
    /// that is not registered here.
    pub fn restrict<I, L>(&self, labels: I) -> Result<Self, RecurrenceError>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let mut restricted = Self::new();
        for label in labels {
            restricted.register_shared(self.resolve(label.as_ref())?);
        }
        Ok(restricted)
    }

    /// Returns the registered labels in order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.strategies.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

/// A strategy that repeats a template at a fixed step.
///
/// Occurrences start at the template's start and repeat every `step` until
/// the earliest of `recurrence_until`, the end of the query range, the
/// caller's limit, or this strategy's own cap. Only occurrences that overlap
/// the query range are produced and counted.
#[derive(Debug, Clone)]
pub struct IntervalRecurrence {
    label: String,
    step: Duration,
    cap: usize,
}

impl IntervalRecurrence {
    /// Default cap on occurrences per template.
    pub const DEFAULT_CAP: usize = 1000;

    /// Creates a strategy with the given label and step.
    ///
    /// Returns `None` if `step` is not positive or is not a whole number of
    /// milliseconds.
    pub fn new(label: impl Into<String>, step: Duration) -> Option<Self> {
        let whole_millis = step.subsec_nanos() % 1_000_000 == 0;
        (step >= Duration::milliseconds(1) && whole_millis).then(|| Self {
            label: label.into(),
            step,
            cap: Self::DEFAULT_CAP,
        })
    }

    /// A strategy labelled `daily` with a one-day step.
    pub fn daily() -> Self {
        Self {
            label: "daily".to_string(),
            step: Duration::days(1),
            cap: Self::DEFAULT_CAP,
        }
    }

    /// A strategy labelled `weekly` with a seven-day step.
    pub fn weekly() -> Self {
        Self {
            label: "weekly".to_string(),
            step: Duration::weeks(1),
            cap: Self::DEFAULT_CAP,
        }
    }

    /// Builder method to set the per-template cap.
    #[must_use]
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Offset of the `index`-th occurrence from the template start.
    fn offset(&self, index: i64) -> Option<Duration> {
        self.step
            .num_milliseconds()
            .checked_mul(index)
            .and_then(Duration::try_milliseconds)
    }

    /// Index of the first step whose occurrence can still reach `from`.
    fn first_relevant_index(&self, template: &Event, from: DateTime<Utc>) -> i64 {
        let Some(earliest) = from.checked_sub_signed(template.duration()) else {
            return 0;
        };
        let gap = (earliest - template.start()).num_milliseconds();
        if gap <= 0 {
            return 0;
        }
        gap / self.step.num_milliseconds()
    }

    fn expand_one(&self, template: &Event, range: &DateRange, per_template: usize) -> Vec<Event> {
        let last_start = template
            .recurrence_until()
            .map_or(range.to(), |until| until.min(range.to()));

        let mut occurrences = Vec::new();
        let mut index = self.first_relevant_index(template, range.from());
        while occurrences.len() < per_template {
            let Some(start) = self
                .offset(index)
                .and_then(|offset| template.start().checked_add_signed(offset))
            else {
                break;
            };
            if start > last_start {
                break;
            }
            let Some(occurrence) = template.occurrence_at(start) else {
                break;
            };
            if occurrence.overlaps(range) {
                occurrences.push(occurrence);
            }
            index += 1;
        }

        trace!(
            label = %self.label,
            template = %template.id(),
            produced = occurrences.len(),
            "Expanded template"
        );
        occurrences
    }
}

impl RecurrenceStrategy for IntervalRecurrence {
    fn label(&self) -> &str {
        &self.label
    }

    fn limit(&self) -> usize {
        self.cap
    }

    fn expand(&self, events: &[Event], range: &DateRange, limit: Option<usize>) -> Vec<Event> {
        let per_template = limit.map_or(self.cap, |l| l.min(self.cap));
        events
            .iter()
            .filter(|e| e.recurrence_type() == Some(self.label.as_str()))
            .flat_map(|template| self.expand_one(template, range, per_template))
            .collect()
    }
}
