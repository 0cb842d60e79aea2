//! Monitoring core: event log, watchers, frame trackers.
//!
//! Everything in this module is synchronous and does no I/O. The host loop
//! feeds readings in and reads events and counters back out.
//!
//! ## Submodules
//!
//! - [`event_log`]: bounded FIFO log of event messages
//! - [`watcher`]: edge-triggered threshold, toggle and level watchers
//! - [`flags`]: bitmask watcher for error flags
//! - [`frames`]: dropped/duplicate frame detection per camera stream
//! - [`device`]: closed sets of device states
//! - [`history`]: reading history for sparklines
//! - [`monitor`]: the per-session [`DeviceMonitor`] tying it all together
//!
//! ## Data Flow
//!
//! ```text
//! DeviceSnapshot ──▶ DeviceMonitor::apply_snapshot()
//!                        ├──▶ watchers ──▶ EventLog::append()
//!                        ├──▶ FrameTrackers::observe_batch()
//!                        └──▶ History::record()
//!
//! DeviceNotification ──▶ DeviceMonitor::handle_notification() ──▶ EventLog
//! ```

pub mod device;
pub mod event_log;
pub mod flags;
pub mod frames;
pub mod history;
pub mod monitor;
pub mod watcher;

pub use device::{
    CameraId, ConnectionState, DeviceNotification, FrameMode, HeadTrackingFlag,
    PowerManagerError, PowerState,
};
pub use event_log::{EventLog, EventSnapshot};
pub use flags::FlagWatcher;
pub use frames::{FrameOutcome, FrameSequenceTracker, FrameTrackers, StreamKey};
pub use history::History;
pub use monitor::{Alerts, DeviceMonitor, MonitorConfig, Readings};
pub use watcher::{Comparison, LevelWatcher, ThresholdWatcher, ToggleWatcher};
