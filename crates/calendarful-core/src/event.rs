//! Event types for calendar resolution.
//!
//! This module provides the single event record used throughout the
//! workspace:
//! - [`Event`]: a singular event, a recurring template, a generated
//!   occurrence, or an override of one occurrence
//! - [`EventId`]: an opaque, ordered event identifier
//! - [`CompositeKey`]: the `(occurrence instant, owner id)` pair that
//!   deduplicates generated occurrences against their overrides
//! - [`EventRole`]: the role derived from which attributes are present

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::FilterValue;
use crate::time::DateRange;

/// An opaque event identifier.
///
/// Identifiers order numerically when numeric and lexically when textual;
/// every numeric id sorts before every textual one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for EventId {
    fn from(value: u64) -> Self {
        Self::Numeric(value)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for EventId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// The deduplication key of an event within one resolution.
///
/// A generated occurrence and the override that replaces it share the same
/// key, which is what lets the override take its place.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompositeKey {
    /// `occurrence_date` when present, otherwise `start`.
    pub instant: DateTime<Utc>,
    /// `parent_id` when present, otherwise `id`.
    pub owner: EventId,
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.owner, self.instant.to_rfc3339())
    }
}

/// The role an event plays, inferred from which attributes are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventRole {
    /// A standalone event with fixed dates.
    Singular,
    /// A recurring template; expansion input only.
    Template,
    /// An occurrence materialized from a template.
    Occurrence,
    /// A standalone event replacing one occurrence of a template.
    Override,
}

/// A calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    id: EventId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recurrence_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recurrence_until: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<EventId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    occurrence_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, FilterValue>,
}

impl Event {
    /// Creates a singular event.
    pub fn new(id: impl Into<EventId>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: None,
            start,
            end,
            recurrence_type: None,
            recurrence_until: None,
            parent_id: None,
            occurrence_date: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Creates a recurring template expanded by the strategy labelled `recurrence_type`.
    pub fn template(
        id: impl Into<EventId>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        recurrence_type: impl Into<String>,
    ) -> Self {
        Self::new(id, start, end).with_recurrence_type(recurrence_type)
    }

    /// Creates an override of the occurrence of `parent_id` originally at `occurrence_date`.
    pub fn override_of(
        id: impl Into<EventId>,
        parent_id: impl Into<EventId>,
        occurrence_date: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        let mut event = Self::new(id, start, end);
        event.parent_id = Some(parent_id.into());
        event.occurrence_date = Some(occurrence_date);
        event
    }

    /// Materializes the occurrence of this event starting at `start`.
    ///
    /// The occurrence keeps this event's id, name and attributes, keeps the
    /// same duration, and records `start` as its occurrence date. Recurrence
    /// fields are cleared.
    ///
    /// Returns `None` if the occurrence would end past the latest
    /// representable instant.
    pub fn occurrence_at(&self, start: DateTime<Utc>) -> Option<Self> {
        let end = start.checked_add_signed(self.duration())?;
        Some(Self {
            id: self.id.clone(),
            name: self.name.clone(),
            start,
            end,
            recurrence_type: None,
            recurrence_until: None,
            parent_id: None,
            occurrence_date: Some(start),
            attributes: self.attributes.clone(),
        })
    }

    pub fn id(&self) -> &EventId {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns `end - start`.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn recurrence_type(&self) -> Option<&str> {
        self.recurrence_type.as_deref()
    }

    pub fn recurrence_until(&self) -> Option<DateTime<Utc>> {
        self.recurrence_until
    }

    pub fn parent_id(&self) -> Option<&EventId> {
        self.parent_id.as_ref()
    }

    pub fn occurrence_date(&self) -> Option<DateTime<Utc>> {
        self.occurrence_date
    }

    pub fn attributes(&self) -> &BTreeMap<String, FilterValue> {
        &self.attributes
    }

    /// Looks up a single attribute.
    pub fn attribute(&self, key: &str) -> Option<&FilterValue> {
        self.attributes.get(key)
    }

    /// Sets the start instant.
    pub fn set_start(&mut self, start: DateTime<Utc>) {
        self.start = start;
    }

    /// Sets the end instant.
    pub fn set_end(&mut self, end: DateTime<Utc>) {
        self.end = end;
    }

    /// Sets or clears the recurrence type.
    pub fn set_recurrence_type(&mut self, recurrence_type: Option<String>) {
        self.recurrence_type = recurrence_type;
    }

    /// Builder method to set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder method to set the recurrence type.
    pub fn with_recurrence_type(mut self, recurrence_type: impl Into<String>) -> Self {
        self.recurrence_type = Some(recurrence_type.into());
        self
    }

    /// Builder method to bound recurrence.
    pub fn with_recurrence_until(mut self, until: DateTime<Utc>) -> Self {
        self.recurrence_until = Some(until);
        self
    }

    /// Builder method to add an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Returns the role inferred from which attributes are present.
    ///
    /// `recurrence_type` wins over `parent_id`, which wins over
    /// `occurrence_date`.
    pub fn role(&self) -> EventRole {
        if self.recurrence_type.is_some() {
            EventRole::Template
        } else if self.parent_id.is_some() {
            EventRole::Override
        } else if self.occurrence_date.is_some() {
            EventRole::Occurrence
        } else {
            EventRole::Singular
        }
    }

    /// Returns true if this event is a recurring template.
    pub fn is_template(&self) -> bool {
        self.recurrence_type.is_some()
    }

    /// Returns true if this event overrides an occurrence of another event.
    pub fn is_override(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Returns the deduplication key of this event.
    pub fn composite_key(&self) -> CompositeKey {
        CompositeKey {
            instant: self.occurrence_date.unwrap_or(self.start),
            owner: self.parent_id.clone().unwrap_or_else(|| self.id.clone()),
        }
    }

    /// Returns true if `end` is not before `start`.
    pub fn is_well_formed(&self) -> bool {
        self.end >= self.start
    }

    /// Checks whether this event's `[start, end]` interval intersects `range`.
    pub fn overlaps(&self, range: &DateRange) -> bool {
        range.intersects(self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    mod event_id {
        use super::*;

        #[test]
        fn numeric_ordering() {
            assert!(EventId::from(2) < EventId::from(10));
            assert!(EventId::from(10) < EventId::from("a"));
            assert!(EventId::from("a") < EventId::from("b"));
        }

        #[test]
        fn display() {
            assert_eq!(EventId::from(42).to_string(), "42");
            assert_eq!(EventId::from("evt-1").to_string(), "evt-1");
        }

        #[test]
        fn untagged_serde() {
            assert_eq!(serde_json::to_string(&EventId::from(7)).unwrap(), "7");
            let parsed: EventId = serde_json::from_str("\"evt-7\"").unwrap();
            assert_eq!(parsed, EventId::from("evt-7"));
        }
    }

    mod event {
        use super::*;

        #[test]
        fn singular_event() {
            let event = Event::new(1, utc(2025, 1, 5, 9), utc(2025, 1, 5, 10)).with_name("Standup");
            assert_eq!(event.id(), &EventId::from(1));
            assert_eq!(event.name(), Some("Standup"));
            assert_eq!(event.duration(), Duration::hours(1));
            assert_eq!(event.role(), EventRole::Singular);
            assert!(!event.is_template());
            assert!(!event.is_override());
            assert!(event.is_well_formed());
        }

        #[test]
        fn template_role() {
            let event = Event::template(2, utc(2025, 1, 1, 9), utc(2025, 1, 1, 10), "weekly")
                .with_recurrence_until(utc(2025, 1, 31, 0));
            assert_eq!(event.role(), EventRole::Template);
            assert_eq!(event.recurrence_type(), Some("weekly"));
            assert_eq!(event.recurrence_until(), Some(utc(2025, 1, 31, 0)));
        }

        #[test]
        fn override_role() {
            let event = Event::override_of(
                3,
                2,
                utc(2025, 1, 15, 9),
                utc(2025, 1, 16, 9),
                utc(2025, 1, 16, 10),
            );
            assert_eq!(event.role(), EventRole::Override);
            assert_eq!(event.parent_id(), Some(&EventId::from(2)));
            assert_eq!(event.occurrence_date(), Some(utc(2025, 1, 15, 9)));
        }

        #[test]
        fn occurrence_keeps_identity_and_duration() {
            let template = Event::template(2, utc(2025, 1, 1, 9), utc(2025, 1, 1, 10), "weekly")
                .with_name("Review")
                .with_attribute("category", "work");
            let occurrence = template.occurrence_at(utc(2025, 1, 15, 9)).unwrap();

            assert_eq!(occurrence.id(), template.id());
            assert_eq!(occurrence.name(), Some("Review"));
            assert_eq!(occurrence.start(), utc(2025, 1, 15, 9));
            assert_eq!(occurrence.end(), utc(2025, 1, 15, 10));
            assert_eq!(occurrence.role(), EventRole::Occurrence);
            assert!(occurrence.recurrence_type().is_none());
            assert_eq!(occurrence.attribute("category"), Some(&FilterValue::from("work")));
        }

        #[test]
        fn occurrence_ending_past_max_is_none() {
            let template = Event::template(2, utc(2025, 1, 1, 9), utc(2025, 1, 1, 10), "daily");
            let start = DateTime::<Utc>::MAX_UTC - Duration::minutes(30);

            assert!(template.occurrence_at(start).is_none());
            assert!(template.occurrence_at(start - Duration::hours(1)).is_some());
        }

        #[test]
        fn occurrence_and_override_share_key() {
            let template = Event::template(2, utc(2025, 1, 1, 9), utc(2025, 1, 1, 10), "weekly");
            let occurrence = template.occurrence_at(utc(2025, 1, 15, 9)).unwrap();
            let moved = Event::override_of(
                3,
                2,
                utc(2025, 1, 15, 9),
                utc(2025, 1, 16, 9),
                utc(2025, 1, 16, 10),
            );

            assert_eq!(occurrence.composite_key(), moved.composite_key());
            assert_eq!(
                moved.composite_key(),
                CompositeKey {
                    instant: utc(2025, 1, 15, 9),
                    owner: EventId::from(2),
                }
            );
        }

        #[test]
        fn singular_key_uses_start_and_id() {
            let event = Event::new("a", utc(2025, 1, 5, 9), utc(2025, 1, 5, 10));
            let key = event.composite_key();
            assert_eq!(key.instant, utc(2025, 1, 5, 9));
            assert_eq!(key.owner, EventId::from("a"));
            assert_eq!(key.to_string(), "a@2025-01-05T09:00:00+00:00");
        }

        #[test]
        fn mutators() {
            let mut event = Event::new(1, utc(2025, 1, 5, 9), utc(2025, 1, 5, 10));
            event.set_start(utc(2025, 1, 6, 9));
            event.set_end(utc(2025, 1, 6, 11));
            event.set_recurrence_type(Some("daily".to_string()));

            assert_eq!(event.duration(), Duration::hours(2));
            assert_eq!(event.role(), EventRole::Template);

            event.set_recurrence_type(None);
            assert_eq!(event.role(), EventRole::Singular);
        }

        #[test]
        fn malformed_when_end_before_start() {
            let event = Event::new(1, utc(2025, 1, 5, 10), utc(2025, 1, 5, 9));
            assert!(!event.is_well_formed());
        }

        #[test]
        fn overlaps_range() {
            let range = DateRange::new(utc(2025, 1, 10, 0), utc(2025, 1, 20, 0)).unwrap();
            assert!(Event::new(1, utc(2025, 1, 15, 9), utc(2025, 1, 15, 10)).overlaps(&range));
            assert!(Event::new(2, utc(2025, 1, 9, 0), utc(2025, 1, 10, 0)).overlaps(&range));
            assert!(!Event::new(3, utc(2025, 1, 22, 9), utc(2025, 1, 22, 10)).overlaps(&range));
        }

        #[test]
        fn serde_roundtrip() {
            let event = Event::override_of(
                3,
                2,
                utc(2025, 1, 15, 9),
                utc(2025, 1, 16, 9),
                utc(2025, 1, 16, 10),
            )
            .with_name("Moved review")
            .with_attribute("category", "work");

            let json = serde_json::to_string(&event).unwrap();
            assert!(!json.contains("recurrence_type"));
            let parsed: Event = serde_json::from_str(&json).unwrap();
            assert_eq!(event, parsed);
        }
    }
}
