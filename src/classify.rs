//! Severity → priority classification

use crate::types::{Priority, Severity};

/// Map a severity to its default priority
///
/// `critical → 1`, `error → 2`, `warning → 3`, `info → 4`, anything else `5`.
/// Only applied when the producer did not set a priority explicitly.
pub fn classify(severity: Severity) -> Priority {
    match severity {
        Severity::Critical => Priority::from_static(1),
        Severity::Error => Priority::from_static(2),
        Severity::Warning => Priority::from_static(3),
        Severity::Info => Priority::from_static(4),
        Severity::Unknown => Priority::LOWEST,
    }
}
