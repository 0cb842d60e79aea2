//! Edge-triggered watchers that turn reading streams into events.
//!
//! Each watcher is fed one reading per poll tick and only reports when the
//! watched condition changes, never on every reading while it holds.

use std::collections::BTreeMap;

use crate::error::MonitorError;

/// How a reading is compared against a threshold.
///
/// The threshold value itself counts as "in warning" for the non-strict
/// variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Warn when `value <= threshold`.
    AtOrBelow,
    /// Warn when `value >= threshold`.
    AtOrAbove,
    /// Warn when `value < threshold`.
    Below,
    /// Warn when `value > threshold`.
    Above,
}

impl Comparison {
    pub fn holds<T: PartialOrd>(self, value: T, threshold: T) -> bool {
        match self {
            Comparison::AtOrBelow => value <= threshold,
            Comparison::AtOrAbove => value >= threshold,
            Comparison::Below => value < threshold,
            Comparison::Above => value > threshold,
        }
    }
}

/// Watches a scalar reading against a fixed threshold.
#[derive(Debug, Clone)]
pub struct ThresholdWatcher<T> {
    comparison: Comparison,
    threshold: T,
    enter_message: String,
    clear_message: Option<String>,
    in_warning: bool,
}

impl<T: PartialOrd + Copy> ThresholdWatcher<T> {
    /// Create a watcher that emits `enter_message` when the comparison starts
    /// holding.
    pub fn new(
        comparison: Comparison,
        threshold: T,
        enter_message: impl Into<String>,
    ) -> Result<Self, MonitorError> {
        let enter_message = enter_message.into();
        if enter_message.is_empty() {
            return Err(MonitorError::MissingMessage("threshold enter event"));
        }
        Ok(Self {
            comparison,
            threshold,
            enter_message,
            clear_message: None,
            in_warning: false,
        })
    }

    /// Also emit `message` when the reading returns within bounds.
    pub fn with_clear_message(
        mut self,
        message: impl Into<String>,
    ) -> Result<Self, MonitorError> {
        let message = message.into();
        if message.is_empty() {
            return Err(MonitorError::MissingMessage("threshold clear event"));
        }
        self.clear_message = Some(message);
        Ok(self)
    }

    /// Feed one reading. Returns the event message for a state transition.
    pub fn update(&mut self, value: T) -> Option<String> {
        let holds = self.comparison.holds(value, self.threshold);
        match (holds, self.in_warning) {
            (true, false) => {
                self.in_warning = true;
                Some(self.enter_message.clone())
            }
            (false, true) => {
                self.in_warning = false;
                self.clear_message.clone()
            }
            _ => None,
        }
    }

    pub fn in_warning(&self) -> bool {
        self.in_warning
    }

    pub fn threshold(&self) -> T {
        self.threshold
    }
}

/// Watches a boolean probe and reports both directions of change.
///
/// The first reading only seeds the watcher.
#[derive(Debug, Clone)]
pub struct ToggleWatcher {
    on_message: String,
    off_message: String,
    current: Option<bool>,
}

impl ToggleWatcher {
    pub fn new(
        on_message: impl Into<String>,
        off_message: impl Into<String>,
    ) -> Result<Self, MonitorError> {
        let on_message = on_message.into();
        let off_message = off_message.into();
        if on_message.is_empty() {
            return Err(MonitorError::MissingMessage("toggle on event"));
        }
        if off_message.is_empty() {
            return Err(MonitorError::MissingMessage("toggle off event"));
        }
        Ok(Self {
            on_message,
            off_message,
            current: None,
        })
    }

    pub fn update(&mut self, value: bool) -> Option<String> {
        let previous = self.current.replace(value)?;
        if previous == value {
            return None;
        }
        if value {
            Some(self.on_message.clone())
        } else {
            Some(self.off_message.clone())
        }
    }

    pub fn current(&self) -> Option<bool> {
        self.current
    }
}

/// Watches an enumerated level and reports entry into registered levels.
#[derive(Debug, Clone, Default)]
pub struct LevelWatcher {
    messages: BTreeMap<i32, String>,
    current: Option<i32>,
}

impl LevelWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the message emitted when the level changes to `level`.
    pub fn on_level(mut self, level: i32, message: impl Into<String>) -> Result<Self, MonitorError> {
        let message = message.into();
        if message.is_empty() {
            return Err(MonitorError::MissingMessage("level event"));
        }
        self.messages.insert(level, message);
        Ok(self)
    }

    pub fn update(&mut self, level: i32) -> Option<String> {
        if self.current.replace(level) == Some(level) {
            return None;
        }
        self.messages.get(&level).cloned()
    }

    pub fn current(&self) -> Option<i32> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn battery_watcher() -> ThresholdWatcher<u8> {
        ThresholdWatcher::new(Comparison::AtOrBelow, 5, "battery low")
            .unwrap()
            .with_clear_message("battery ok")
            .unwrap()
    }

    #[test]
    fn test_empty_messages_rejected() {
        assert!(ThresholdWatcher::new(Comparison::Above, 1.0, "").is_err());
        let watcher = ThresholdWatcher::new(Comparison::Above, 1.0, "hot").unwrap();
        assert_eq!(
            watcher.with_clear_message("").unwrap_err(),
            MonitorError::MissingMessage("threshold clear event")
        );
    }

    #[test]
    fn test_enter_is_edge_triggered() {
        let mut watcher = battery_watcher();
        assert_eq!(watcher.update(50), None);
        assert_eq!(watcher.update(5), Some("battery low".to_string()));
        assert_eq!(watcher.update(4), None);
        assert_eq!(watcher.update(1), None);
        assert!(watcher.in_warning());
        assert_eq!(watcher.update(6), Some("battery ok".to_string()));
        assert_eq!(watcher.update(7), None);
    }

    #[test]
    fn test_no_clear_message_still_leaves_warning() {
        let mut watcher = ThresholdWatcher::new(Comparison::AtOrAbove, 40.0, "hot").unwrap();
        assert_eq!(watcher.update(40.0), Some("hot".to_string()));
        assert_eq!(watcher.update(39.9), None);
        assert!(!watcher.in_warning());
        assert_eq!(watcher.update(41.0), Some("hot".to_string()));
    }

    #[test]
    fn test_oscillation_at_boundary() {
        let mut watcher = battery_watcher();
        let readings = [5, 6, 5, 6, 5, 5, 6];
        let events: Vec<String> = readings.iter().filter_map(|&r| watcher.update(r)).collect();
        assert_eq!(
            events,
            vec![
                "battery low",
                "battery ok",
                "battery low",
                "battery ok",
                "battery low",
                "battery ok"
            ]
        );
    }

    #[test]
    fn test_enters_bounded_by_crossings() {
        let mut watcher = battery_watcher();
        let readings: Vec<u8> = vec![100, 3, 2, 90, 90, 1, 80, 5, 5, 5, 6, 0];
        let mut enters = 0;
        let mut crossings = 0;
        let mut last_enter = false;
        let mut below = false;

        for r in readings {
            let now_below = r <= 5;
            if now_below && !below {
                crossings += 1;
            }
            below = now_below;

            match watcher.update(r).as_deref() {
                Some("battery low") => {
                    assert!(!last_enter, "two enters without a clear");
                    last_enter = true;
                    enters += 1;
                }
                Some("battery ok") => last_enter = false,
                _ => {}
            }
        }
        assert!(enters <= crossings);
        assert_eq!(enters, 4);
    }

    #[test]
    fn test_strict_comparisons() {
        assert!(!Comparison::Below.holds(5, 5));
        assert!(!Comparison::Above.holds(5, 5));
        assert!(Comparison::AtOrBelow.holds(5, 5));
        assert!(Comparison::AtOrAbove.holds(5, 5));
    }

    #[test]
    fn test_toggle_first_reading_is_silent() {
        let mut watcher =
            ToggleWatcher::new("Network Connected.", "Network Disconnected.").unwrap();
        assert_eq!(watcher.update(true), None);
        assert_eq!(watcher.update(true), None);
        assert_eq!(watcher.update(false), Some("Network Disconnected.".to_string()));
        assert_eq!(watcher.update(true), Some("Network Connected.".to_string()));
        assert_eq!(watcher.current(), Some(true));
    }

    #[test]
    fn test_level_watcher_only_registered_levels() {
        let mut watcher = LevelWatcher::new()
            .on_level(10, "low")
            .and_then(|watcher| watcher.on_level(15, "critical"))
            .unwrap();
        assert_eq!(watcher.update(0), None);
        assert_eq!(watcher.update(10), Some("low".to_string()));
        assert_eq!(watcher.update(10), None);
        assert_eq!(watcher.update(15), Some("critical".to_string()));
        assert_eq!(watcher.update(5), None);
        assert_eq!(watcher.update(10), Some("low".to_string()));
    }

    #[test]
    fn test_toggle_and_level_reject_empty_messages() {
        assert_eq!(
            ToggleWatcher::new("", "off").unwrap_err(),
            MonitorError::MissingMessage("toggle on event")
        );
        assert_eq!(
            ToggleWatcher::new("on", "").unwrap_err(),
            MonitorError::MissingMessage("toggle off event")
        );
        assert_eq!(
            LevelWatcher::new().on_level(10, "").unwrap_err(),
            MonitorError::MissingMessage("level event")
        );
    }
}
