//! Ingestion pipeline — validate, classify, persist, queue, fan out
//!
//! Each call to [`Ingestor::ingest`] runs one event end-to-end:
//!
//! 1. reject a missing/empty `message` or `source`
//! 2. apply defaults (`severity=info`, `category=application`, empty metadata)
//! 3. derive `priority` from `severity` unless the producer set it
//! 4. persist through the [`LogStore`]; a failure aborts with no side effects
//! 5. insert into the pending priority heap
//! 6. publish to the [`FanoutBroker`], plus an alert when critical
//!
//! Publishing only enqueues, so `ingest` never waits on subscribers.
//! `ingest` may be called concurrently; the pending heap sits behind a
//! single mutex.

use crate::broker::FanoutBroker;
use crate::classify::classify;
use crate::config::EngineConfig;
use crate::error::{LogError, Result};
use crate::heap::PriorityHeap;
use crate::metrics::EngineMetrics;
use crate::store::LogStore;
use crate::types::{Category, LogEvent, Priority, RawLogEvent, Severity};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The ingestion engine
pub struct Ingestor {
    store: Arc<dyn LogStore>,
    broker: Arc<FanoutBroker>,
    pending: Mutex<PriorityHeap<Arc<LogEvent>>>,
    metrics: Arc<EngineMetrics>,
}

impl Ingestor {
    /// Wire an ingestor to a store and a broker
    ///
    /// Shares the broker's metrics so one snapshot covers the whole engine.
    pub fn new(store: Arc<dyn LogStore>, broker: Arc<FanoutBroker>, config: &EngineConfig) -> Self {
        let metrics = broker.metrics().clone();
        Self {
            store,
            broker,
            pending: Mutex::new(PriorityHeap::with_capacity(config.initial_heap_capacity)),
            metrics,
        }
    }

    /// Validate a raw event and apply defaults and classification
    ///
    /// Pure: no storage, heap, or broker side effects.
    pub fn prepare(raw: RawLogEvent) -> Result<LogEvent> {
        let message = non_empty(raw.message)
            .ok_or_else(|| LogError::Validation("message is required".to_string()))?;
        let source = non_empty(raw.source)
            .ok_or_else(|| LogError::Validation("source is required".to_string()))?;

        let severity = raw
            .severity
            .as_deref()
            .map(Severity::parse)
            .unwrap_or_default();

        let category = match raw.category.as_deref() {
            Some(text) => text.parse::<Category>()?,
            None => Category::default(),
        };

        let (priority, priority_explicit) = match raw.priority {
            Some(value) => (Priority::new(value)?, true),
            None => (classify(severity), false),
        };

        Ok(LogEvent {
            id: None,
            message,
            severity,
            priority,
            priority_explicit,
            source,
            category,
            metadata: raw.metadata.unwrap_or_default(),
            origin_address: non_empty(raw.origin_address),
            created_at: None,
        })
    }

    /// Ingest one event
    ///
    /// Returns the persisted event, or `Validation`/`Persistence` errors.
    /// Delivery problems never surface here.
    pub async fn ingest(&self, raw: RawLogEvent) -> Result<Arc<LogEvent>> {
        let mut event = match Self::prepare(raw) {
            Ok(event) => event,
            Err(e) => {
                self.metrics.record_validation_error();
                tracing::debug!(error = %e, "Rejected log event");
                return Err(e);
            }
        };

        let (id, created_at) = match self.store.persist(&event).await {
            Ok(assigned) => assigned,
            Err(e) => {
                self.metrics.record_persistence_error();
                tracing::warn!(
                    store = self.store.name(),
                    source = %event.source,
                    error = %e,
                    "Failed to persist log event"
                );
                return Err(match e {
                    LogError::Persistence(_) => e,
                    other => LogError::Persistence(other.to_string()),
                });
            }
        };
        event.id = Some(id);
        event.created_at = Some(created_at);
        let event = Arc::new(event);

        self.lock_pending().insert(event.priority, event.clone());

        self.broker.publish(event.clone());
        if event.is_critical() {
            self.broker.publish_alert(event.clone());
        }

        self.metrics.record_ingested();
        tracing::debug!(
            event_id = ?event.id,
            severity = %event.severity,
            priority = %event.priority,
            source = %event.source,
            "Log event ingested"
        );

        Ok(event)
    }

    /// Ingest events one after another
    ///
    /// A failed event does not stop the rest of the batch.
    pub async fn ingest_batch(&self, batch: Vec<RawLogEvent>) -> Vec<Result<Arc<LogEvent>>> {
        let mut results = Vec::with_capacity(batch.len());
        for raw in batch {
            results.push(self.ingest(raw).await);
        }
        results
    }

    /// Remove and return the most urgent pending event
    pub fn next_pending(&self) -> Option<Arc<LogEvent>> {
        let next = self.lock_pending().extract_min();
        if next.is_some() {
            self.metrics.record_extracted(1);
        }
        next
    }

    /// The most urgent pending event, left in place
    pub fn peek_pending(&self) -> Option<Arc<LogEvent>> {
        self.lock_pending().peek().cloned()
    }

    /// Remove up to `limit` pending events in priority order
    pub fn drain_pending(&self, limit: usize) -> Vec<Arc<LogEvent>> {
        let drained = self.lock_pending().drain_sorted(limit);
        self.metrics.record_extracted(drained.len() as u64);
        drained
    }

    pub fn pending_len(&self) -> usize {
        self.lock_pending().len()
    }

    pub fn broker(&self) -> &Arc<FanoutBroker> {
        &self.broker
    }

    pub fn store(&self) -> &Arc<dyn LogStore> {
        &self.store
    }

    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    fn lock_pending(&self) -> MutexGuard<'_, PriorityHeap<Arc<LogEvent>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
