//! Device health monitor.
//!
//! [`DeviceMonitor`] is the per-session aggregate: it owns the event log,
//! one watcher per probe, the camera frame trackers and the reading history.
//! The host calls [`DeviceMonitor::apply_snapshot`] once per poll tick and
//! [`DeviceMonitor::handle_notification`] for every device callback.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::device::{
    ConnectionState, DeviceNotification, HeadTrackingFlag, PowerManagerError, PowerState,
};
use super::event_log::{EventLog, EventSnapshot, DEFAULT_EVENT_CAPACITY};
use super::flags::FlagWatcher;
use super::frames::FrameTrackers;
use super::history::History;
use super::watcher::{Comparison, LevelWatcher, ThresholdWatcher, ToggleWatcher};
use crate::error::MonitorError;
use crate::source::DeviceSnapshot;

/// Android trim level for "running low".
pub const TRIM_MEMORY_RUNNING_LOW: i32 = 10;
/// Android trim level for "running critical".
pub const TRIM_MEMORY_RUNNING_CRITICAL: i32 = 15;

/// Thresholds and sizing for a monitor session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Number of events kept in the event log.
    pub event_capacity: usize,
    /// Battery percentage at or below which a battery is critical.
    pub battery_critical: u8,
    /// Free disk ratio at or below which storage is critical.
    pub disk_critical_ratio: f64,
    /// Master volume at or above which a hearing warning is raised.
    pub volume_warning: f32,
    /// Battery temperature (Celsius) at or above which a warning is raised.
    pub temperature_warning: f32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            event_capacity: DEFAULT_EVENT_CAPACITY,
            battery_critical: 5,
            disk_critical_ratio: 0.1,
            volume_warning: 75.0,
            temperature_warning: 40.0,
        }
    }
}

impl MonitorConfig {
    fn validate(&self) -> Result<(), MonitorError> {
        if self.battery_critical > 100 {
            return Err(MonitorError::InvalidThreshold {
                field: "battery_critical",
                value: f64::from(self.battery_critical),
            });
        }
        if !(0.0..=1.0).contains(&self.disk_critical_ratio) {
            return Err(MonitorError::InvalidThreshold {
                field: "disk_critical_ratio",
                value: self.disk_critical_ratio,
            });
        }
        if !(0.0..=100.0).contains(&self.volume_warning) {
            return Err(MonitorError::InvalidThreshold {
                field: "volume_warning",
                value: f64::from(self.volume_warning),
            });
        }
        if !self.temperature_warning.is_finite() {
            return Err(MonitorError::InvalidThreshold {
                field: "temperature_warning",
                value: f64::from(self.temperature_warning),
            });
        }
        Ok(())
    }
}

/// Latest value of every probe, for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Readings {
    pub network_connected: Option<bool>,
    pub internet_available: Option<bool>,
    pub compute_battery_level: Option<u8>,
    pub compute_battery_temperature: Option<f32>,
    pub controller_battery_level: Option<u8>,
    pub disk_free_ratio: Option<f64>,
    pub master_volume: Option<f32>,
    pub head_tracking_error: u32,
    pub memory_trim_level: Option<i32>,
}

/// Which threshold watchers are currently in their warning state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Alerts {
    pub compute_battery_low: bool,
    pub controller_battery_low: bool,
    pub disk_low: bool,
    pub volume_high: bool,
    pub temperature_high: bool,
    pub head_tracking_lost: bool,
}

impl Alerts {
    pub fn any(&self) -> bool {
        self.compute_battery_low
            || self.controller_battery_low
            || self.disk_low
            || self.volume_high
            || self.temperature_high
            || self.head_tracking_lost
    }
}

/// Per-session monitor state.
#[derive(Debug, Clone)]
pub struct DeviceMonitor {
    config: MonitorConfig,
    log: EventLog,
    network: ToggleWatcher,
    internet: ToggleWatcher,
    compute_battery: ThresholdWatcher<u8>,
    controller_battery: ThresholdWatcher<u8>,
    disk: ThresholdWatcher<f64>,
    volume: ThresholdWatcher<f32>,
    temperature: ThresholdWatcher<f32>,
    head_tracking: FlagWatcher,
    memory: LevelWatcher,
    frames: FrameTrackers,
    history: History,
    readings: Readings,
    controller_power: PowerState,
    controller_connection: ConnectionState,
    notifications_suppressed: bool,
}

impl DeviceMonitor {
    /// Build a monitor, rejecting invalid configuration.
    pub fn new(config: MonitorConfig) -> Result<Self, MonitorError> {
        config.validate()?;

        let log = EventLog::new(config.event_capacity)?;

        let compute_battery = ThresholdWatcher::new(
            Comparison::AtOrBelow,
            config.battery_critical,
            format!(
                "Compute Pack Battery Critically Low (at or below {}%).",
                config.battery_critical
            ),
        )?;
        let controller_battery = ThresholdWatcher::new(
            Comparison::AtOrBelow,
            config.battery_critical,
            format!(
                "Controller Battery Critically Low (at or below {}%).",
                config.battery_critical
            ),
        )?;
        let disk = ThresholdWatcher::new(
            Comparison::AtOrBelow,
            config.disk_critical_ratio,
            format!(
                "Available space is critically low (at or below {:.0}%).",
                config.disk_critical_ratio * 100.0
            ),
        )?;
        let volume = ThresholdWatcher::new(
            Comparison::AtOrAbove,
            config.volume_warning,
            "High volume warning: consider lowering volume.",
        )?;
        let temperature = ThresholdWatcher::new(
            Comparison::AtOrAbove,
            config.temperature_warning,
            format!(
                "Compute Pack Temperature Warning: at or above {} degrees Celsius.",
                config.temperature_warning
            ),
        )?;

        let head_tracking = HeadTrackingFlag::ALL.iter().try_fold(
            FlagWatcher::new(HeadTrackingFlag::NONE, "Head tracking restored.")?,
            |watcher, flag| watcher.on_flag(flag.bit(), flag.lost_message()),
        )?;

        let memory = LevelWatcher::new()
            .on_level(TRIM_MEMORY_RUNNING_LOW, "Memory warning: memory running low.")?
            .on_level(
                TRIM_MEMORY_RUNNING_CRITICAL,
                "Memory warning: memory running critically low.",
            )?;

        Ok(Self {
            config,
            log,
            network: ToggleWatcher::new("Network Connected.", "Network Disconnected.")?,
            internet: ToggleWatcher::new("Internet Connected.", "Internet Disconnected.")?,
            compute_battery,
            controller_battery,
            disk,
            volume,
            temperature,
            head_tracking,
            memory,
            frames: FrameTrackers::new(),
            history: History::new(),
            readings: Readings::default(),
            controller_power: PowerState::default(),
            controller_connection: ConnectionState::default(),
            notifications_suppressed: false,
        })
    }

    /// Apply one tick of readings. Returns the number of events appended.
    pub fn apply_snapshot(&mut self, snapshot: &DeviceSnapshot) -> usize {
        let mut events: Vec<String> = Vec::new();

        if let Some(connected) = snapshot.network_connected {
            self.readings.network_connected = Some(connected);
            events.extend(self.network.update(connected));
        }
        if let Some(available) = snapshot.internet_available {
            self.readings.internet_available = Some(available);
            events.extend(self.internet.update(available));
        }

        if let Some(level) = snapshot.compute_battery_level {
            self.readings.compute_battery_level = Some(level);
            events.extend(self.compute_battery.update(level));
        }

        // Controller readings only count while one is present
        self.readings.controller_battery_level = snapshot.controller_battery_level;
        if let Some(level) = snapshot.controller_battery_level {
            events.extend(self.controller_battery.update(level));
        }

        if let Some(ratio) = snapshot.disk.and_then(|d| d.free_ratio()) {
            self.readings.disk_free_ratio = Some(ratio);
            events.extend(self.disk.update(ratio));
        }

        if let Some(volume) = snapshot.master_volume {
            self.readings.master_volume = Some(volume);
            events.extend(self.volume.update(volume));
        }

        if let Some(celsius) = snapshot.compute_battery_temperature {
            self.readings.compute_battery_temperature = Some(celsius);
            events.extend(self.temperature.update(celsius));
        }

        if let Some(mask) = snapshot.head_tracking_error {
            self.readings.head_tracking_error = mask;
            events.extend(self.head_tracking.update(mask));
        }

        if let Some(level) = snapshot.memory_trim_level {
            self.readings.memory_trim_level = Some(level);
            events.extend(self.memory.update(level));
        }

        if !snapshot.frames.is_empty() {
            self.frames.observe_batch(&snapshot.frames);
        }

        self.history.record(
            snapshot.compute_battery_level,
            snapshot.compute_battery_temperature,
        );

        let appended = events.len();
        for event in events {
            self.append(event);
        }

        appended
            + snapshot
                .notifications
                .iter()
                .filter(|n| self.handle_notification(**n))
                .count()
    }

    /// Apply one device callback. Returns true if an event was appended.
    pub fn handle_notification(&mut self, notification: DeviceNotification) -> bool {
        let message = match notification {
            DeviceNotification::ControllerError(PowerManagerError::InvalidSku) => {
                "Incompatible charger: cannot use this controller SKU with this compute pack SKU."
            }
            DeviceNotification::ControllerError(PowerManagerError::Unknown(code)) => {
                error!(code, "unknown power manager error");
                return false;
            }
            DeviceNotification::ControllerPowerState(state) => match state {
                PowerState::Normal => {
                    self.controller_power = state;
                    "Controller entered normal power state."
                }
                PowerState::DisabledWhileCharging => {
                    self.controller_power = state;
                    "Controller cannot be used while connected to charging for this SKU."
                }
                PowerState::Standby => {
                    self.controller_power = state;
                    "Controller entered standby power state."
                }
                PowerState::None | PowerState::Sleep => {
                    "Invalid power state detected for controller."
                }
            },
            DeviceNotification::ControllerConnection(state) => {
                self.controller_connection = state;
                match state {
                    ConnectionState::Connected => "Controller has been connected.",
                    ConnectionState::Disconnected => "Controller has been disconnected.",
                }
            }
            DeviceNotification::LowMemory => {
                "Memory Warning: low memory lifecycle event occurred."
            }
        };
        self.append(message);
        true
    }

    fn append(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(event = %message, "device event");
        self.log.append(message);
    }

    /// Empty the event log.
    pub fn clear_events(&mut self) {
        self.log.clear();
    }

    pub fn events(&self) -> EventSnapshot {
        self.log.snapshot()
    }

    /// Record whether system notifications are suppressed for this session.
    pub fn set_notifications_suppressed(&mut self, suppressed: bool) {
        self.notifications_suppressed = suppressed;
    }

    pub fn notifications_suppressed(&self) -> bool {
        self.notifications_suppressed
    }

    /// True while any threshold watcher or flag is in a warning state.
    pub fn has_warnings(&self) -> bool {
        self.alerts().any()
    }

    pub fn alerts(&self) -> Alerts {
        Alerts {
            compute_battery_low: self.compute_battery.in_warning(),
            // A disconnected controller has no battery to warn about
            controller_battery_low: self.controller_battery.in_warning()
                && self.readings.controller_battery_level.is_some(),
            disk_low: self.disk.in_warning(),
            volume_high: self.volume.in_warning(),
            temperature_high: self.temperature.in_warning(),
            head_tracking_lost: self.head_tracking.current() != HeadTrackingFlag::NONE,
        }
    }

    /// True while the free disk ratio is at or below its critical threshold.
    pub fn disk_critical(&self) -> bool {
        self.disk.in_warning()
    }

    pub fn readings(&self) -> &Readings {
        &self.readings
    }

    pub fn controller_power(&self) -> PowerState {
        self.controller_power
    }

    pub fn controller_connection(&self) -> ConnectionState {
        self.controller_connection
    }

    pub fn frames(&self) -> &FrameTrackers {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut FrameTrackers {
        &mut self.frames
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }
}
