//! Engine configuration

use crate::error::{LogError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning for the ingestion pipeline, fanout broker, and query façade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Per-subscriber queue depth (each of the event and alert queues)
    ///
    /// A subscriber whose queue fills up is considered unresponsive and
    /// is dropped.
    pub subscriber_queue_capacity: usize,

    /// Upper bound on a single subscriber callback, in milliseconds
    pub delivery_timeout_ms: u64,

    /// Trailing window for the "recent" statistic, in seconds
    pub stats_window_secs: u64,

    /// Page size used when a query does not specify one
    pub default_page_size: usize,

    /// Largest page size a query may request
    pub max_page_size: usize,

    /// Preallocated capacity of the pending heap
    pub initial_heap_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            subscriber_queue_capacity: 256,
            delivery_timeout_ms: 2_000,
            stats_window_secs: 24 * 60 * 60,
            default_page_size: 50,
            max_page_size: 1_000,
            initial_heap_capacity: 1_024,
        }
    }
}

impl EngineConfig {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| LogError::Config(format!("Invalid engine config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the engine unusable
    pub fn validate(&self) -> Result<()> {
        if self.subscriber_queue_capacity == 0 {
            return Err(LogError::Config(
                "subscriberQueueCapacity must be greater than 0".to_string(),
            ));
        }
        if self.delivery_timeout_ms == 0 {
            return Err(LogError::Config(
                "deliveryTimeoutMs must be greater than 0".to_string(),
            ));
        }
        if self.default_page_size == 0 || self.max_page_size == 0 {
            return Err(LogError::Config("page sizes must be greater than 0".to_string()));
        }
        if self.default_page_size > self.max_page_size {
            return Err(LogError::Config(format!(
                "defaultPageSize ({}) exceeds maxPageSize ({})",
                self.default_page_size, self.max_page_size
            )));
        }
        Ok(())
    }

    pub fn with_subscriber_queue_capacity(mut self, capacity: usize) -> Self {
        self.subscriber_queue_capacity = capacity;
        self
    }

    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_stats_window(mut self, window: Duration) -> Self {
        self.stats_window_secs = window.as_secs();
        self
    }

    pub fn with_page_sizes(mut self, default_size: usize, max_size: usize) -> Self {
        self.default_page_size = default_size;
        self.max_page_size = max_size;
        self
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }

    pub fn stats_window(&self) -> Duration {
        Duration::from_secs(self.stats_window_secs)
    }
}

/// Configuration for the in-memory log store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoryStoreConfig {
    /// Maximum retained events; oldest are evicted first. 0 = unbounded.
    pub max_events: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_page_size, 50);
        assert_eq!(config.stats_window(), Duration::from_secs(86_400));
        assert_eq!(config.delivery_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json(r#"{"subscriberQueueCapacity": 8}"#).unwrap();
        assert_eq!(config.subscriber_queue_capacity, 8);
        assert_eq!(config.max_page_size, 1_000);
    }

    #[test]
    fn test_from_json_rejects_zero_capacity() {
        let err = EngineConfig::from_json(r#"{"subscriberQueueCapacity": 0}"#).unwrap_err();
        assert!(matches!(err, LogError::Config(_)));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            EngineConfig::from_json("not json"),
            Err(LogError::Config(_))
        ));
    }

    #[test]
    fn test_page_size_ordering() {
        let config = EngineConfig::default().with_page_sizes(100, 10);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::default()
            .with_delivery_timeout(Duration::from_millis(50))
            .with_stats_window(Duration::from_secs(60));
        assert_eq!(config.delivery_timeout_ms, 50);
        assert_eq!(config.stats_window_secs, 60);
    }
}
