//! # a3s-log
//!
//! Priority-ordered log ingestion and live fanout for the A3S ecosystem.
//!
//! ## Overview
//!
//! `a3s-log` accepts structured log events from many unreliable producers
//! (IoT devices, services, gateways), classifies them by urgency, persists
//! them through a pluggable store, keeps the pending ones in a priority
//! heap, and pushes every event to live subscribers. Critical events are
//! additionally delivered on a separate alert channel.
//!
//! ## Quick Start
//!
//! ```rust
//! use a3s_log::{ChannelSubscriber, EngineConfig, FanoutBroker, Ingestor, MemoryLogStore, RawLogEvent};
//! use std::sync::Arc;
//!
//! # async fn example() -> a3s_log::Result<()> {
//! let config = EngineConfig::default();
//! let broker = Arc::new(FanoutBroker::new(&config));
//! let ingestor = Ingestor::new(Arc::new(MemoryLogStore::default()), broker.clone(), &config);
//!
//! let (subscriber, mut feed) = ChannelSubscriber::new(64);
//! broker.subscribe(Arc::new(subscriber));
//!
//! let event = ingestor
//!     .ingest(RawLogEvent::new("disk full", "node-3").with_severity("critical"))
//!     .await?;
//! assert_eq!(event.priority.get(), 1);
//!
//! let alert = feed.alerts.recv().await;
//! assert!(alert.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **Ingestor** — validate → classify → persist → queue → fan out
//! - **PriorityHeap** — array-backed min-heap of pending events
//! - **FanoutBroker** — per-subscriber delivery tasks, alerts first
//! - **LogStore** trait — storage backends (in-memory provided)
//! - **QueryFacade** — filtered, sorted, paginated retrieval and stats

pub mod broker;
pub mod classify;
pub mod config;
pub mod error;
pub mod heap;
pub mod metrics;
pub mod pipeline;
pub mod query;
pub mod store;
pub mod types;

// Re-export core types
pub use broker::{ChannelFeed, ChannelSubscriber, FanoutBroker, Subscriber, SubscriptionHandle};
pub use classify::classify;
pub use config::{EngineConfig, MemoryStoreConfig};
pub use error::{LogError, Result};
pub use heap::PriorityHeap;
pub use metrics::{EngineMetrics, MetricsSnapshot};
pub use pipeline::Ingestor;
pub use query::{GroupCount, LogPage, LogStats, PageRequest, QueryFacade};
pub use store::{LogFilter, LogStore, SortDirection, SortField, SortSpec};
pub use types::{Category, LogEvent, LogSummary, Metadata, Priority, RawLogEvent, Severity};

// Re-export backends for convenience
pub use store::memory::MemoryLogStore;
