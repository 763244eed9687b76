//! Log store trait — the storage interface the engine writes to and reads from
//!
//! Backends (in-memory, document databases, SQL, etc.) implement `LogStore`
//! to provide persistence plus filtered, sorted, windowed retrieval. The
//! engine never interprets storage beyond this contract.

use crate::error::Result;
use crate::types::{Category, LogEvent, Priority, Severity};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub mod memory;

/// Core trait for log storage backends
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Persist an event, returning the assigned id and creation time
    ///
    /// The event passed in carries no `id`; backends must not mutate it.
    async fn persist(&self, event: &LogEvent) -> Result<(String, DateTime<Utc>)>;

    /// Fetch matching events in `sort` order, skipping `skip` and
    /// returning at most `limit`
    async fn find(
        &self,
        filter: &LogFilter,
        sort: &SortSpec,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<LogEvent>>;

    /// Count matching events
    async fn count(&self, filter: &LogFilter) -> Result<u64>;

    /// Look up a single event
    async fn find_by_id(&self, id: &str) -> Result<Option<LogEvent>>;

    /// Delete a single event, returning whether it existed
    async fn delete_by_id(&self, id: &str) -> Result<bool>;

    /// Backend name (e.g., "memory", "mongo")
    fn name(&self) -> &str;
}

/// Conjunctive filter over stored events
///
/// Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,

    /// Case-insensitive substring of `source`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    /// Only events created at or after this instant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_after: Option<DateTime<Utc>>,

    /// Only events that are critical (`severity == critical || priority == 1`)
    #[serde(default)]
    pub critical_only: bool,
}

impl LogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn created_after(mut self, at: DateTime<Utc>) -> Self {
        self.created_after = Some(at);
        self
    }

    pub fn critical_only(mut self) -> Self {
        self.critical_only = true;
        self
    }

    /// Evaluate the filter against one event
    ///
    /// Reference semantics for backends that filter in process.
    pub fn matches(&self, event: &LogEvent) -> bool {
        if self.severity.is_some_and(|s| s != event.severity) {
            return false;
        }
        if self.category.is_some_and(|c| c != event.category) {
            return false;
        }
        if self.priority.is_some_and(|p| p != event.priority) {
            return false;
        }
        if let Some(ref needle) = self.source {
            if !event
                .source
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        if let Some(after) = self.created_after {
            match event.created_at {
                Some(at) if at >= after => {}
                _ => return false,
            }
        }
        if self.critical_only && !event.is_critical() {
            return false;
        }
        true
    }
}

/// Field to sort results by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    CreatedAt,
    Priority,
    Severity,
    Source,
    Category,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Sort order for query results; defaults to newest first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    #[serde(default)]
    pub field: SortField,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn asc(field: SortField) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: SortField) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// Compare two events under this sort order
    pub fn compare(&self, a: &LogEvent, b: &LogEvent) -> Ordering {
        let ord = match self.field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Priority => a.priority.cmp(&b.priority),
            SortField::Severity => a.severity.as_str().cmp(b.severity.as_str()),
            SortField::Source => a.source.cmp(&b.source),
            SortField::Category => a.category.as_str().cmp(b.category.as_str()),
        };
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(message: &str, source: &str, severity: Severity) -> LogEvent {
        let mut event = LogEvent::new(message, source, severity);
        event.id = Some(format!("log-{}", message));
        event.created_at = Some(Utc::now());
        event
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let event = stored("a", "node-1", Severity::Info);
        assert!(LogFilter::new().matches(&event));
    }

    #[test]
    fn test_source_substring_case_insensitive() {
        let event = stored("a", "Gateway-North", Severity::Info);
        assert!(LogFilter::new().source("gateway").matches(&event));
        assert!(LogFilter::new().source("NORTH").matches(&event));
        assert!(!LogFilter::new().source("south").matches(&event));
    }

    #[test]
    fn test_filter_is_conjunction() {
        let event = stored("a", "node-1", Severity::Error).with_category(Category::Database);
        let both = LogFilter::new()
            .severity(Severity::Error)
            .category(Category::Database);
        assert!(both.matches(&event));

        let mismatch = LogFilter::new()
            .severity(Severity::Error)
            .category(Category::Network);
        assert!(!mismatch.matches(&event));
    }

    #[test]
    fn test_critical_only() {
        let crit = stored("a", "n", Severity::Critical);
        let overridden = stored("b", "n", Severity::Info).with_priority(Priority::HIGHEST);
        let plain = stored("c", "n", Severity::Error);

        let filter = LogFilter::new().critical_only();
        assert!(filter.matches(&crit));
        assert!(filter.matches(&overridden));
        assert!(!filter.matches(&plain));
    }

    #[test]
    fn test_created_after_excludes_unpersisted() {
        let event = LogEvent::new("a", "n", Severity::Info);
        let filter = LogFilter::new().created_after(Utc::now() - chrono::Duration::hours(1));
        assert!(!filter.matches(&event));
    }

    #[test]
    fn test_sort_compare() {
        let a = stored("a", "alpha", Severity::Critical);
        let b = stored("b", "beta", Severity::Info);

        assert_eq!(SortSpec::asc(SortField::Priority).compare(&a, &b), Ordering::Less);
        assert_eq!(SortSpec::desc(SortField::Priority).compare(&a, &b), Ordering::Greater);
        assert_eq!(SortSpec::asc(SortField::Source).compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_sort_spec_default_newest_first() {
        let spec = SortSpec::default();
        assert_eq!(spec.field, SortField::CreatedAt);
        assert_eq!(spec.direction, SortDirection::Desc);
    }

    #[test]
    fn test_filter_deserialize() {
        let filter: LogFilter =
            serde_json::from_str(r#"{"severity":"critical","source":"node","priority":1}"#)
                .unwrap();
        assert_eq!(filter.severity, Some(Severity::Critical));
        assert_eq!(filter.priority, Some(Priority::HIGHEST));
        assert!(!filter.critical_only);
    }
}
