//! Fanout broker — push delivery to a dynamic set of live subscribers
//!
//! Every subscriber gets a dedicated delivery task fed by two bounded
//! queues, one for ordinary events and one for critical alerts. Publishing
//! only enqueues (`try_send`), so producers are never held up by a slow
//! subscriber. The delivery task drains alerts first and bounds each
//! callback with a timeout; a subscriber that errors, times out, or lets
//! its queue fill up is unsubscribed.
//!
//! Within one queue, events reach a subscriber in publish order. Nothing is
//! guaranteed about ordering across different subscribers.

use crate::config::EngineConfig;
use crate::error::{LogError, Result};
use crate::metrics::EngineMetrics;
use crate::types::LogEvent;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::oneshot;
use tokio_stream::wrappers::ReceiverStream;

/// A live observer of ingested events
///
/// Returning `Err` from either callback counts as a delivery failure and
/// removes the subscriber from the broker.
#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Receive an ordinary event
    async fn on_event(&self, event: Arc<LogEvent>) -> Result<()>;

    /// Receive a critical alert
    async fn on_critical_alert(&self, event: Arc<LogEvent>) -> Result<()>;
}

/// Identifies one registration with the broker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    /// Unique connection identifier
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeliveryKind {
    Event,
    Alert,
}

impl DeliveryKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Alert => "alert",
        }
    }
}

/// Dropping a registration cancels its delivery task
struct Registration {
    events: mpsc::Sender<Arc<LogEvent>>,
    alerts: mpsc::Sender<Arc<LogEvent>>,
    _cancel: oneshot::Sender<()>,
}

type Registry = RwLock<HashMap<SubscriptionHandle, Registration>>;

/// Distributes events to every registered subscriber
///
/// Constructed explicitly and shared by `Arc`; there is no process-wide
/// instance. `subscribe` spawns onto the current tokio runtime.
pub struct FanoutBroker {
    registry: Arc<Registry>,
    next_id: AtomicU64,
    queue_capacity: usize,
    delivery_timeout: Duration,
    metrics: Arc<EngineMetrics>,
}

impl FanoutBroker {
    /// Create a broker with its own metrics
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_metrics(config, Arc::new(EngineMetrics::new()))
    }

    /// Create a broker reporting into shared metrics
    pub fn with_metrics(config: &EngineConfig, metrics: Arc<EngineMetrics>) -> Self {
        Self {
            registry: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicU64::new(1),
            queue_capacity: config.subscriber_queue_capacity.max(1),
            delivery_timeout: config.delivery_timeout(),
            metrics,
        }
    }

    /// Register a subscriber and start its delivery task
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber>) -> SubscriptionHandle {
        let handle = SubscriptionHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (event_tx, event_rx) = mpsc::channel(self.queue_capacity);
        let (alert_tx, alert_rx) = mpsc::channel(self.queue_capacity);
        let (cancel_tx, cancel_rx) = oneshot::channel();

        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                handle,
                Registration {
                    events: event_tx,
                    alerts: alert_tx,
                    _cancel: cancel_tx,
                },
            );

        let worker = DeliveryWorker {
            handle,
            subscriber,
            events: event_rx,
            alerts: alert_rx,
            cancelled: cancel_rx,
            timeout: self.delivery_timeout,
            registry: Arc::downgrade(&self.registry),
            metrics: self.metrics.clone(),
        };
        tokio::spawn(worker.run());

        tracing::info!(subscriber = %handle, "Subscriber registered");
        handle
    }

    /// Remove a subscriber; a no-op if it is already gone
    ///
    /// Events still queued for it are discarded. A callback already in
    /// flight runs to completion, after which no further callbacks are made.
    /// Returns whether a registration was actually removed.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let removed = self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle)
            .is_some();

        if removed {
            tracing::info!(subscriber = %handle, "Subscriber removed");
        }
        removed
    }

    /// Deliver to every subscriber's event callback
    ///
    /// Returns the number of subscribers the event was queued for.
    pub fn publish(&self, event: Arc<LogEvent>) -> usize {
        let delivered = self.fan_out(DeliveryKind::Event, event);
        self.metrics.record_event_published();
        delivered
    }

    /// Deliver to every subscriber's critical-alert callback
    ///
    /// Independent of `publish`: an alert is not also an ordinary event.
    pub fn publish_alert(&self, event: Arc<LogEvent>) -> usize {
        tracing::warn!(
            event_id = ?event.id,
            source = %event.source,
            message = %event.message,
            "Critical alert dispatched"
        );
        let delivered = self.fan_out(DeliveryKind::Alert, event);
        self.metrics.record_alert_published();
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_subscribed(&self, handle: SubscriptionHandle) -> bool {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&handle)
    }

    /// Drop every registration; delivery tasks stop without draining
    pub fn shutdown(&self) {
        let mut registry = self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let count = registry.len();
        registry.clear();
        tracing::info!(subscribers = count, "Fanout broker shut down");
    }

    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    fn fan_out(&self, kind: DeliveryKind, event: Arc<LogEvent>) -> usize {
        // Snapshot under the read lock, then send without holding it
        let targets: Vec<(SubscriptionHandle, mpsc::Sender<Arc<LogEvent>>)> = {
            let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
            registry
                .iter()
                .map(|(handle, reg)| {
                    let tx = match kind {
                        DeliveryKind::Event => reg.events.clone(),
                        DeliveryKind::Alert => reg.alerts.clone(),
                    };
                    (*handle, tx)
                })
                .collect()
        };

        let mut delivered = 0;
        for (handle, tx) in targets {
            let reason = match tx.try_send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    continue;
                }
                Err(TrySendError::Full(_)) => "queue full",
                Err(TrySendError::Closed(_)) => "queue closed",
            };
            let err = LogError::Delivery {
                subscriber: handle.to_string(),
                reason: format!("{} {}", kind.as_str(), reason),
            };
            drop_subscriber(&self.registry, &self.metrics, handle, &err);
        }
        delivered
    }
}

fn drop_subscriber(
    registry: &Registry,
    metrics: &EngineMetrics,
    handle: SubscriptionHandle,
    err: &LogError,
) {
    metrics.record_delivery_failure();
    let removed = registry
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&handle)
        .is_some();

    if removed {
        metrics.record_subscriber_dropped();
        tracing::warn!(subscriber = %handle, error = %err, "Subscriber dropped");
    }
}

struct DeliveryWorker {
    handle: SubscriptionHandle,
    subscriber: Arc<dyn Subscriber>,
    events: mpsc::Receiver<Arc<LogEvent>>,
    alerts: mpsc::Receiver<Arc<LogEvent>>,
    cancelled: oneshot::Receiver<()>,
    timeout: Duration,
    registry: Weak<Registry>,
    metrics: Arc<EngineMetrics>,
}

impl DeliveryWorker {
    async fn run(mut self) {
        loop {
            let (kind, event) = tokio::select! {
                biased;
                _ = &mut self.cancelled => break,
                Some(event) = self.alerts.recv() => (DeliveryKind::Alert, event),
                Some(event) = self.events.recv() => (DeliveryKind::Event, event),
                else => break,
            };

            let delivery = match kind {
                DeliveryKind::Event => self.subscriber.on_event(event),
                DeliveryKind::Alert => self.subscriber.on_critical_alert(event),
            };

            let reason = match tokio::time::timeout(self.timeout, delivery).await {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(_) => format!("timed out after {:?}", self.timeout),
            };

            let err = LogError::Delivery {
                subscriber: self.handle.to_string(),
                reason: format!("{}: {}", kind.as_str(), reason),
            };
            if let Some(registry) = self.registry.upgrade() {
                drop_subscriber(&registry, &self.metrics, self.handle, &err);
            }
            break;
        }

        tracing::debug!(subscriber = %self.handle, "Delivery task finished");
    }
}

/// Subscriber that forwards into a pair of channels
///
/// The receiving halves are handed out as a [`ChannelFeed`], ready to be
/// turned into streams for SSE or WebSocket handlers. Dropping the feed
/// makes the next delivery fail, which unsubscribes this subscriber.
pub struct ChannelSubscriber {
    events: mpsc::Sender<Arc<LogEvent>>,
    alerts: mpsc::Sender<Arc<LogEvent>>,
}

/// Receiving side of a [`ChannelSubscriber`]
pub struct ChannelFeed {
    pub events: mpsc::Receiver<Arc<LogEvent>>,
    pub alerts: mpsc::Receiver<Arc<LogEvent>>,
}

impl ChannelFeed {
    /// Convert both receivers into streams
    pub fn into_streams(
        self,
    ) -> (
        ReceiverStream<Arc<LogEvent>>,
        ReceiverStream<Arc<LogEvent>>,
    ) {
        (
            ReceiverStream::new(self.events),
            ReceiverStream::new(self.alerts),
        )
    }
}

impl ChannelSubscriber {
    pub fn new(capacity: usize) -> (Self, ChannelFeed) {
        let (event_tx, event_rx) = mpsc::channel(capacity.max(1));
        let (alert_tx, alert_rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                events: event_tx,
                alerts: alert_tx,
            },
            ChannelFeed {
                events: event_rx,
                alerts: alert_rx,
            },
        )
    }
}

#[async_trait]
impl Subscriber for ChannelSubscriber {
    async fn on_event(&self, event: Arc<LogEvent>) -> Result<()> {
        self.events.send(event).await.map_err(|_| LogError::Delivery {
            subscriber: "channel".to_string(),
            reason: "event receiver dropped".to_string(),
        })
    }

    async fn on_critical_alert(&self, event: Arc<LogEvent>) -> Result<()> {
        self.alerts.send(event).await.map_err(|_| LogError::Delivery {
            subscriber: "channel".to_string(),
            reason: "alert receiver dropped".to_string(),
        })
    }
}
