//! Bounded log of notable device state changes.

use std::collections::VecDeque;

use crate::error::MonitorError;

/// Number of events kept when no capacity is configured.
pub const DEFAULT_EVENT_CAPACITY: usize = 10;

/// Largest accepted capacity.
pub const MAX_EVENT_CAPACITY: usize = 10_000;

/// Ordered, capacity-bounded record of event messages.
///
/// When the log is full the oldest message is evicted before the new one is
/// appended, so the log always holds the most recent `capacity` messages.
#[derive(Debug, Clone)]
pub struct EventLog {
    messages: VecDeque<String>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self {
            messages: VecDeque::with_capacity(DEFAULT_EVENT_CAPACITY),
            capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl EventLog {
    /// Create an empty log holding at most `capacity` messages.
    ///
    /// `capacity` must be within `1..=MAX_EVENT_CAPACITY`.
    pub fn new(capacity: usize) -> Result<Self, MonitorError> {
        if capacity == 0 || capacity > MAX_EVENT_CAPACITY {
            return Err(MonitorError::InvalidCapacity(capacity));
        }
        Ok(Self {
            messages: VecDeque::with_capacity(capacity.min(DEFAULT_EVENT_CAPACITY)),
            capacity,
        })
    }

    /// Append a message, evicting the oldest one if the log is full.
    pub fn append(&mut self, message: impl Into<String>) {
        if self.messages.len() == self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(message.into());
    }

    /// Remove every message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Copy the current messages out in insertion order.
    pub fn snapshot(&self) -> EventSnapshot {
        EventSnapshot {
            messages: self.messages.iter().cloned().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Point-in-time copy of an [`EventLog`].
///
/// Iterating does not consume the snapshot, and later changes to the log are
/// not reflected in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSnapshot {
    messages: Vec<String>,
}

impl EventSnapshot {
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.messages
    }
}

impl<'a> IntoIterator for &'a EventSnapshot {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
