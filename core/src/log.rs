use std::collections::{VecDeque, vec_deque::Iter};

use serde::Serialize;

use crate::StreamMessage;

pub const DEFAULT_LOG_CAPACITY: usize = 500;

/// A stream message together with its arrival position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// Arrival counter, starting at 1. Unrelated to the backend `seq`.
    pub arrival: u64,
    pub message: StreamMessage,
}

/// Bounded, arrival-ordered event history. The oldest entry is evicted first.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    arrivals: u64,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl EventLog {
    /// A zero capacity is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            arrivals: 0,
        }
    }

    pub fn push(&mut self, message: StreamMessage) -> &LogEntry {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }

        self.arrivals += 1;
        self.entries.push_back(LogEntry {
            arrival: self.arrivals,
            message,
        });

        &self.entries[self.entries.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest to newest.
    pub fn iter(&self) -> Iter<'_, LogEntry> {
        self.entries.iter()
    }
}
