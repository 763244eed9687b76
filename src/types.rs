//! Core log event types for the a3s-log engine
//!
//! All types use camelCase JSON serialization for wire compatibility.

use crate::classify::classify;
use crate::error::{LogError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Open metadata map attached to an event
pub type Metadata = HashMap<String, serde_json::Value>;

/// Producer-declared severity of a log event
///
/// Unrecognized severity text is normalized to `Unknown` rather than
/// rejected, and classifies at the lowest urgency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
    Critical,
    #[serde(other)]
    Unknown,
}

impl Severity {
    /// Every severity, most urgent first
    pub const ALL: [Severity; 5] = [
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Info,
        Severity::Unknown,
    ];

    /// Canonical lowercase label
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
            Self::Unknown => "unknown",
        }
    }

    /// Parse severity text, normalizing anything unrecognized to `Unknown`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Self::Info,
            "warning" => Self::Warning,
            "error" => Self::Error,
            "critical" => Self::Critical,
            _ => Self::Unknown,
        }
    }
}

impl From<&str> for Severity {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Functional area a log event belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    System,
    Security,
    Network,
    #[default]
    Application,
    Database,
    Iot,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::System,
        Category::Security,
        Category::Network,
        Category::Application,
        Category::Database,
        Category::Iot,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Security => "security",
            Self::Network => "network",
            Self::Application => "application",
            Self::Database => "database",
            Self::Iot => "iot",
        }
    }
}

impl FromStr for Category {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(Self::System),
            "security" => Ok(Self::Security),
            "network" => Ok(Self::Network),
            "application" => Ok(Self::Application),
            "database" => Ok(Self::Database),
            "iot" => Ok(Self::Iot),
            other => Err(LogError::Validation(format!("unknown category '{}'", other))),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency rank, 1 (most urgent) through 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const HIGHEST: Priority = Priority(1);
    pub const LOWEST: Priority = Priority(5);

    /// Create a priority, rejecting values outside 1..=5
    pub fn new(value: u8) -> Result<Self> {
        if (Self::HIGHEST.0..=Self::LOWEST.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(LogError::Validation(format!(
                "priority must be between 1 and 5, got {}",
                value
            )))
        }
    }

    /// Build from a value already known to be in range
    pub(crate) const fn from_static(value: u8) -> Self {
        Self(value)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Priority {
    type Error = LogError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> u8 {
        p.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An event as submitted by a producer, before validation
///
/// `message` and `source` are optional here so that a missing field can be
/// reported as a validation error instead of a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLogEvent {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub source: Option<String>,

    /// Free-form severity text; normalized during ingestion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,

    /// Explicit priority override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_address: Option<String>,
}

impl RawLogEvent {
    /// Start a raw event with the two required fields
    pub fn new(message: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            source: Some(source.into()),
            ..Default::default()
        }
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = Some(severity.into());
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin_address = Some(origin.into());
        self
    }
}

/// A validated, classified log event
///
/// Immutable after ingestion except for the storage-assigned `id` and
/// `created_at`, which are absent until the event is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    /// Storage-assigned identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub message: String,

    #[serde(default)]
    pub severity: Severity,

    pub priority: Priority,

    /// Whether the producer set `priority` explicitly
    ///
    /// An explicit override is never rebalanced against `severity`.
    #[serde(default)]
    pub priority_explicit: bool,

    pub source: String,

    #[serde(default)]
    pub category: Category,

    #[serde(default)]
    pub metadata: Metadata,

    /// Network address or device identifier of the producer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_address: Option<String>,

    /// Set by the storage backend on persist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl LogEvent {
    /// Create an unpersisted event whose priority is derived from severity
    pub fn new(message: impl Into<String>, source: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: None,
            message: message.into(),
            severity,
            priority: classify(severity),
            priority_explicit: false,
            source: source.into(),
            category: Category::default(),
            metadata: HashMap::new(),
            origin_address: None,
            created_at: None,
        }
    }

    /// Override the derived priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self.priority_explicit = true;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Critical events are surfaced as alerts in addition to normal delivery
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical || self.priority == Priority::HIGHEST
    }

    /// Whether storage has assigned an identity
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Compact view for listings and alert toasts
    pub fn summary(&self) -> LogSummary {
        LogSummary {
            id: self.id.clone(),
            message: self.message.clone(),
            severity: self.severity,
            priority: self.priority,
            source: self.source.clone(),
            created_at: self.created_at,
        }
    }
}

/// Abbreviated log event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSummary {
    pub id: Option<String>,
    pub message: String,
    pub severity: Severity,
    pub priority: Priority,
    pub source: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parse_normalizes_unknown() {
        assert_eq!(Severity::parse("critical"), Severity::Critical);
        assert_eq!(Severity::parse(" Warning "), Severity::Warning);
        assert_eq!(Severity::parse("weird"), Severity::Unknown);
        assert_eq!(Severity::parse(""), Severity::Unknown);
    }

    #[test]
    fn test_severity_deserialize_garbage() {
        let sev: Severity = serde_json::from_str("\"panic\"").unwrap();
        assert_eq!(sev, Severity::Unknown);
        let sev: Severity = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(sev, Severity::Error);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("iot".parse::<Category>().unwrap(), Category::Iot);
        assert_eq!("Database".parse::<Category>().unwrap(), Category::Database);
        assert!("kernel".parse::<Category>().unwrap_err().is_validation());
        assert_eq!(Category::default(), Category::Application);
    }

    #[test]
    fn test_priority_range() {
        assert_eq!(Priority::new(1).unwrap(), Priority::HIGHEST);
        assert_eq!(Priority::new(5).unwrap(), Priority::LOWEST);
        assert!(Priority::new(0).is_err());
        assert!(Priority::new(6).is_err());
        assert!(serde_json::from_str::<Priority>("9").is_err());
    }

    #[test]
    fn test_log_event_derives_priority() {
        let event = LogEvent::new("disk full", "node-3", Severity::Critical);
        assert_eq!(event.priority.get(), 1);
        assert!(!event.priority_explicit);
        assert!(event.is_critical());
        assert!(!event.is_persisted());
    }

    #[test]
    fn test_explicit_priority_makes_critical() {
        let event = LogEvent::new("door opened", "lock-1", Severity::Info)
            .with_priority(Priority::HIGHEST);
        assert!(event.priority_explicit);
        assert_eq!(event.severity, Severity::Info);
        assert!(event.is_critical());
    }

    #[test]
    fn test_log_event_wire_format() {
        let event = LogEvent::new("temp high", "sensor-9", Severity::Warning)
            .with_category(Category::Iot)
            .with_metadata("celsius", serde_json::json!(81.5));

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"severity\":\"warning\""));
        assert!(json.contains("\"category\":\"iot\""));
        assert!(json.contains("\"priority\":3"));
        assert!(json.contains("\"priorityExplicit\":false"));
        assert!(!json.contains("\"id\""));
        assert!(!json.contains("createdAt"));
    }

    #[test]
    fn test_raw_event_from_producer_json() {
        let json = r#"{
            "message": "link down",
            "source": "gw-2",
            "severity": "error",
            "originAddress": "10.0.0.4",
            "metadata": {"port": 3}
        }"#;

        let raw: RawLogEvent = serde_json::from_str(json).unwrap();
        assert_eq!(raw.message.as_deref(), Some("link down"));
        assert_eq!(raw.origin_address.as_deref(), Some("10.0.0.4"));
        assert!(raw.priority.is_none());
        assert_eq!(raw.metadata.unwrap()["port"], 3);
    }

    #[test]
    fn test_summary() {
        let event = LogEvent::new("boot", "node-1", Severity::Info);
        let summary = event.summary();
        assert_eq!(summary.message, "boot");
        assert_eq!(summary.priority.get(), 4);
        assert!(summary.id.is_none());
    }
}
