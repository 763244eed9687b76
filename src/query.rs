//! Query façade — paginated retrieval and admin statistics over a `LogStore`
//!
//! Read and delete operations only; nothing here touches the pending heap
//! or the fanout broker.

use crate::config::EngineConfig;
use crate::error::{LogError, Result};
use crate::store::{LogFilter, LogStore, SortSpec};
use crate::types::{Category, LogEvent, Severity};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Page selection, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default = "default_page")]
    pub page: usize,

    /// Falls back to the configured default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
}

fn default_page() -> usize {
    1
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: None,
        }
    }
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page,
            page_size: Some(page_size),
        }
    }
}

/// One page of query results plus pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPage {
    pub events: Vec<LogEvent>,
    /// Total matching events across all pages
    pub total: u64,
    pub page: usize,
    pub page_size: usize,
    pub pages: u64,
}

/// Count for one group key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCount {
    pub key: String,
    pub count: u64,
}

/// Aggregate statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    pub total: u64,
    /// Events inside the trailing stats window
    pub recent: u64,
    pub critical: u64,
    /// Non-empty groups, largest first
    pub by_severity: Vec<GroupCount>,
    pub by_category: Vec<GroupCount>,
}

/// Translates filter/sort/page requests into store calls
pub struct QueryFacade {
    store: Arc<dyn LogStore>,
    config: EngineConfig,
}

impl QueryFacade {
    pub fn new(store: Arc<dyn LogStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Fetch one page of matching events
    pub async fn query(
        &self,
        filter: &LogFilter,
        sort: &SortSpec,
        page: PageRequest,
    ) -> Result<LogPage> {
        if page.page < 1 {
            return Err(LogError::Validation("page must be at least 1".to_string()));
        }
        let page_size = match page.page_size {
            Some(0) => {
                return Err(LogError::Validation(
                    "pageSize must be at least 1".to_string(),
                ))
            }
            Some(size) => size.min(self.config.max_page_size),
            None => self.config.default_page_size,
        }
        .max(1);

        let skip = (page.page - 1).saturating_mul(page_size);
        let events = self.store.find(filter, sort, skip, page_size).await?;
        let total = self.store.count(filter).await?;

        Ok(LogPage {
            events,
            total,
            page: page.page,
            page_size,
            pages: total.div_ceil(page_size as u64),
        })
    }

    /// Fetch one event by id
    pub async fn get(&self, id: &str) -> Result<LogEvent> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| LogError::NotFound(id.to_string()))
    }

    /// Delete one event by id
    pub async fn delete(&self, id: &str) -> Result<()> {
        if self.store.delete_by_id(id).await? {
            tracing::info!(event_id = %id, "Log event deleted");
            Ok(())
        } else {
            Err(LogError::NotFound(id.to_string()))
        }
    }

    /// Totals, trailing-window count, critical count, and group counts
    pub async fn stats(&self) -> Result<LogStats> {
        let window = chrono::Duration::from_std(self.config.stats_window())
            .map_err(|e| LogError::Config(format!("Invalid stats window: {}", e)))?;
        let since = Utc::now().checked_sub_signed(window).ok_or_else(|| {
            LogError::Config(format!(
                "Stats window of {}s reaches past the earliest representable time",
                self.config.stats_window_secs
            ))
        })?;

        let total = self.store.count(&LogFilter::new()).await?;
        let recent = self
            .store
            .count(&LogFilter::new().created_after(since))
            .await?;
        let critical = self.store.count(&LogFilter::new().critical_only()).await?;

        let mut by_severity = Vec::new();
        for severity in Severity::ALL {
            let count = self.store.count(&LogFilter::new().severity(severity)).await?;
            if count > 0 {
                by_severity.push(GroupCount {
                    key: severity.as_str().to_string(),
                    count,
                });
            }
        }

        let mut by_category = Vec::new();
        for category in Category::ALL {
            let count = self.store.count(&LogFilter::new().category(category)).await?;
            if count > 0 {
                by_category.push(GroupCount {
                    key: category.as_str().to_string(),
                    count,
                });
            }
        }

        by_severity.sort_by(|a, b| b.count.cmp(&a.count));
        by_category.sort_by(|a, b| b.count.cmp(&a.count));

        Ok(LogStats {
            total,
            recent,
            critical,
            by_severity,
            by_category,
        })
    }
}
