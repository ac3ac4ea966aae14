//! Query filters handed to event sources.
//!
//! A [`Filters`] value always carries the query range and optional limit;
//! anything else a caller wants a source to see travels in the string-keyed
//! `extra` map untouched.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::DateRange;

/// A value attached to an extra filter or an event attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Integer(i64),
    Text(String),
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Returns the string value if this is a `Text` variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Checks whether `actual` satisfies this filter value.
    ///
    /// A `List` filter matches when any of its members matches; every other
    /// variant requires equality.
    pub fn matches(&self, actual: &FilterValue) -> bool {
        match self {
            Self::List(options) => options.iter().any(|o| o.matches(actual)),
            other => other == actual,
        }
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Extra filters keyed by name.
pub type ExtraFilters = BTreeMap<String, FilterValue>;

/// The full filter set passed to an event source for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    /// The range being resolved.
    pub range: DateRange,
    /// Maximum number of events the caller wants back, if any.
    pub limit: Option<usize>,
    /// Caller-supplied filters, passed through unmodified.
    #[serde(default)]
    pub extra: ExtraFilters,
}

impl Filters {
    /// Creates filters for a range with no extras.
    pub fn new(range: DateRange, limit: Option<usize>) -> Self {
        Self {
            range,
            limit,
            extra: ExtraFilters::new(),
        }
    }

    /// Builder method to add one extra filter.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Builder method to replace all extra filters.
    pub fn with_extras(mut self, extra: ExtraFilters) -> Self {
        self.extra = extra;
        self
    }

    /// Returns the inclusive start of the query range.
    pub fn from(&self) -> DateTime<Utc> {
        self.range.from()
    }

    /// Returns the inclusive end of the query range.
    pub fn to(&self) -> DateTime<Utc> {
        self.range.to()
    }

    /// Looks up an extra filter by key.
    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.extra.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn range() -> DateRange {
        DateRange::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    mod filter_value {
        use super::*;

        #[test]
        fn scalar_matching() {
            assert!(FilterValue::from("work").matches(&FilterValue::from("work")));
            assert!(!FilterValue::from("work").matches(&FilterValue::from("home")));
            assert!(!FilterValue::from(1i64).matches(&FilterValue::from("1")));
        }

        #[test]
        fn list_matches_any_member() {
            let filter = FilterValue::from(vec!["work", "team"]);
            assert!(filter.matches(&FilterValue::from("team")));
            assert!(!filter.matches(&FilterValue::from("home")));
        }

        #[test]
        fn untagged_serde() {
            let value: FilterValue = serde_json::from_str("\"work\"").unwrap();
            assert_eq!(value, FilterValue::Text("work".to_string()));
            let value: FilterValue = serde_json::from_str("42").unwrap();
            assert_eq!(value, FilterValue::Integer(42));
            let value: FilterValue = serde_json::from_str("[true, 3]").unwrap();
            assert_eq!(
                value,
                FilterValue::List(vec![FilterValue::Bool(true), FilterValue::Integer(3)])
            );
        }
    }

    mod filters {
        use super::*;

        #[test]
        fn builder_pattern() {
            let filters = Filters::new(range(), Some(10))
                .with_extra("category", "work")
                .with_extra("published", true);

            assert_eq!(filters.limit, Some(10));
            assert_eq!(filters.from(), range().from());
            assert_eq!(filters.to(), range().to());
            assert_eq!(filters.get("category").and_then(FilterValue::as_str), Some("work"));
            assert_eq!(filters.get("published"), Some(&FilterValue::Bool(true)));
            assert!(filters.get("missing").is_none());
        }

        #[test]
        fn with_extras_replaces() {
            let mut extra = ExtraFilters::new();
            extra.insert("owner".to_string(), FilterValue::from("ada"));
            let filters = Filters::new(range(), None)
                .with_extra("category", "work")
                .with_extras(extra);

            assert_eq!(filters.extra.len(), 1);
            assert!(filters.get("category").is_none());
        }
    }
}
