use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Clock;

pub(crate) const LOG_CLEARED: &str = "Log cleared";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
}

/// Append-only, insertion-ordered record of user-visible occurrences.
///
/// When a capacity is set the oldest entry is evicted on overflow; entries
/// themselves are never modified once appended.
#[derive(Debug, Clone)]
pub struct EventLog {
    clock: Clock,
    entries: VecDeque<LogEntry>,
    capacity: Option<usize>,
}

impl EventLog {
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            entries: VecDeque::new(),
            capacity: None,
        }
    }

    pub fn bounded(clock: Clock, capacity: usize) -> Self {
        Self {
            clock,
            entries: VecDeque::with_capacity(capacity),
            capacity: Some(capacity.max(1)),
        }
    }

    pub fn append(&mut self, message: impl Into<String>, severity: Severity) -> &LogEntry {
        if let Some(capacity) = self.capacity {
            while self.entries.len() >= capacity {
                self.entries.pop_front();
            }
        }
        self.entries.push_back(LogEntry {
            timestamp: self.clock.now(),
            severity,
            message: message.into(),
        });
        // Just pushed, so the deque is non-empty.
        &self.entries[self.entries.len() - 1]
    }

    /// Empties the log and records that it was cleared.
    pub fn clear(&mut self) -> &LogEntry {
        self.entries.clear();
        self.append(LOG_CLEARED, Severity::Info)
    }

    /// Entries in insertion order. The iterator is cheap to clone, so a
    /// consumer can walk it more than once.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> + Clone + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
