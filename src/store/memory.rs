//! In-memory log store for testing and single-process use

use super::{LogFilter, LogStore, SortSpec};
use crate::config::MemoryStoreConfig;
use crate::error::Result;
use crate::types::LogEvent;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// Log store backed by a `Vec` in insertion order
///
/// Lost on drop. With `max_events > 0` the oldest events are evicted once
/// the limit is exceeded.
pub struct MemoryLogStore {
    events: RwLock<Vec<LogEvent>>,
    config: MemoryStoreConfig,
}

impl Default for MemoryLogStore {
    fn default() -> Self {
        Self::new(MemoryStoreConfig::default())
    }
}

impl MemoryLogStore {
    pub fn new(config: MemoryStoreConfig) -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            config,
        }
    }

    /// Number of stored events
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }

    /// Load previously persisted events, keeping their ids and timestamps
    ///
    /// Events missing an id or `created_at` get fresh ones. The eviction
    /// limit applies as for `persist`.
    pub async fn restore(&self, restored: impl IntoIterator<Item = LogEvent>) -> usize {
        let mut events = self.events.write().await;
        let before = events.len();
        for mut event in restored {
            if event.id.is_none() {
                event.id = Some(format!("log-{}", uuid::Uuid::new_v4()));
            }
            if event.created_at.is_none() {
                event.created_at = Some(Utc::now());
            }
            events.push(event);
        }
        let added = events.len() - before;
        self.evict_overflow(&mut events);
        added
    }

    fn evict_overflow(&self, events: &mut Vec<LogEvent>) {
        if self.config.max_events > 0 && events.len() > self.config.max_events {
            let drain_count = events.len() - self.config.max_events;
            events.drain(..drain_count);
        }
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn persist(&self, event: &LogEvent) -> Result<(String, DateTime<Utc>)> {
        let id = format!("log-{}", uuid::Uuid::new_v4());
        let created_at = Utc::now();

        let mut stored = event.clone();
        stored.id = Some(id.clone());
        stored.created_at = Some(created_at);

        let mut events = self.events.write().await;
        events.push(stored);
        self.evict_overflow(&mut events);

        Ok((id, created_at))
    }

    async fn find(
        &self,
        filter: &LogFilter,
        sort: &SortSpec,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<LogEvent>> {
        let events = self.events.read().await;
        let mut matched: Vec<&LogEvent> = events.iter().filter(|e| filter.matches(e)).collect();
        matched.sort_by(|a, b| sort.compare(a, b));

        Ok(matched
            .into_iter()
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &LogFilter) -> Result<u64> {
        let events = self.events.read().await;
        Ok(events.iter().filter(|e| filter.matches(e)).count() as u64)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<LogEvent>> {
        let events = self.events.read().await;
        Ok(events.iter().find(|e| e.id.as_deref() == Some(id)).cloned())
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let mut events = self.events.write().await;
        let before = events.len();
        events.retain(|e| e.id.as_deref() != Some(id));
        Ok(events.len() < before)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
