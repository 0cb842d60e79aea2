//! Bitmask watcher for error-flag readings such as head tracking status.

use std::collections::BTreeMap;

use crate::error::MonitorError;

/// Emits one event per newly raised flag bit, and a recovery event when the
/// mask returns to its all-clear value.
#[derive(Debug, Clone)]
pub struct FlagWatcher {
    /// Keyed by bit index so events come out low bit first.
    messages: BTreeMap<u32, String>,
    all_clear: u32,
    recovery_message: String,
    previous: u32,
}

impl FlagWatcher {
    /// Create a watcher whose mask starts at `all_clear`.
    pub fn new(all_clear: u32, recovery_message: impl Into<String>) -> Result<Self, MonitorError> {
        let recovery_message = recovery_message.into();
        if recovery_message.is_empty() {
            return Err(MonitorError::MissingMessage("flag recovery event"));
        }
        Ok(Self {
            messages: BTreeMap::new(),
            all_clear,
            recovery_message,
            previous: all_clear,
        })
    }

    /// Register the message for every bit set in `flag`.
    pub fn on_flag(mut self, flag: u32, message: impl Into<String>) -> Result<Self, MonitorError> {
        let message = message.into();
        if message.is_empty() {
            return Err(MonitorError::MissingMessage("flag raised event"));
        }
        let mut bits = flag;
        while bits != 0 {
            let index = bits.trailing_zeros();
            self.messages.insert(index, message.clone());
            bits &= bits - 1;
        }
        Ok(self)
    }

    /// Feed one mask reading and collect the resulting events.
    pub fn update(&mut self, mask: u32) -> Vec<String> {
        let newly_set = mask & !self.previous;
        let mut events: Vec<String> = self
            .messages
            .iter()
            .filter(|(index, _)| newly_set & (1 << **index) != 0)
            .map(|(_, message)| message.clone())
            .collect();

        if mask == self.all_clear && self.previous != self.all_clear {
            events.push(self.recovery_message.clone());
        }

        self.previous = mask;
        events
    }

    pub fn current(&self) -> u32 {
        self.previous
    }
}
