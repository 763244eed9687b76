//! Error types for a3s-log

use thiserror::Error;

/// Errors that can occur in the log engine
#[derive(Debug, Error)]
pub enum LogError {
    /// A raw event was rejected (missing or malformed field)
    ///
    /// Caller's fault. Never retried.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The storage backend failed to persist or read events
    ///
    /// Ingestion aborts for the affected event; callers may retry.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Log event not found
    #[error("Log event not found: {0}")]
    NotFound(String),

    /// A subscriber could not be reached
    ///
    /// Contained inside the fanout broker; never returned from ingest.
    #[error("Delivery to subscriber '{subscriber}' failed: {reason}")]
    Delivery {
        subscriber: String,
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LogError {
    /// True for caller-side validation failures
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// True for storage failures
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    /// Whether resubmitting the whole event may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

/// Result type alias for log engine operations
pub type Result<T> = std::result::Result<T, LogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LogError::Delivery {
            subscriber: "sub-7".to_string(),
            reason: "queue full".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Delivery to subscriber 'sub-7' failed: queue full"
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(LogError::Persistence("down".into()).is_retryable());
        assert!(!LogError::Config("bad".into()).is_retryable());
        assert!(!LogError::NotFound("log-1".into()).is_retryable());
        assert!(!LogError::Delivery {
            subscriber: "sub-1".into(),
            reason: "timed out".into(),
        }
        .is_retryable());
        assert!(!LogError::Validation("empty".into()).is_retryable());
        assert!(LogError::Validation("empty".into()).is_validation());
        assert!(LogError::Persistence("down".into()).is_persistence());
    }
}
