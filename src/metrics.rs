//! Engine counters
//!
//! Lock-free atomic counters updated by the pipeline and broker.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Running counters for one engine instance
#[derive(Debug, Default)]
pub struct EngineMetrics {
    ingested: AtomicU64,
    validation_errors: AtomicU64,
    persistence_errors: AtomicU64,
    events_published: AtomicU64,
    alerts_published: AtomicU64,
    delivery_failures: AtomicU64,
    subscribers_dropped: AtomicU64,
    pending_extracted: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub ingested: u64,
    pub validation_errors: u64,
    pub persistence_errors: u64,
    pub events_published: u64,
    pub alerts_published: u64,
    pub delivery_failures: u64,
    pub subscribers_dropped: u64,
    pub pending_extracted: u64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_ingested(&self) {
        self.ingested.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_validation_error(&self) {
        self.validation_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_persistence_error(&self) {
        self.persistence_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_event_published(&self) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_alert_published(&self) {
        self.alerts_published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivery_failure(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_subscriber_dropped(&self) {
        self.subscribers_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_extracted(&self, n: u64) {
        self.pending_extracted.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ingested: self.ingested.load(Ordering::Relaxed),
            validation_errors: self.validation_errors.load(Ordering::Relaxed),
            persistence_errors: self.persistence_errors.load(Ordering::Relaxed),
            events_published: self.events_published.load(Ordering::Relaxed),
            alerts_published: self.alerts_published.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
            subscribers_dropped: self.subscribers_dropped.load(Ordering::Relaxed),
            pending_extracted: self.pending_extracted.load(Ordering::Relaxed),
        }
    }

    /// Zero every counter
    pub fn reset(&self) {
        for counter in [
            &self.ingested,
            &self.validation_errors,
            &self.persistence_errors,
            &self.events_published,
            &self.alerts_published,
            &self.delivery_failures,
            &self.subscribers_dropped,
            &self.pending_extracted,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
