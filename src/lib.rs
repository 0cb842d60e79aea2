// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # device-doctor
//!
//! A diagnostic TUI and library for watching the health of a wearable
//! compute device.
//!
//! Probe readings (connectivity, batteries, storage, volume, head tracking,
//! memory pressure, world camera frame numbers) arrive as snapshots from a
//! data source. Edge-triggered watchers turn transitions across configured
//! thresholds into human-readable events kept in a bounded log, and frame
//! trackers count dropped and duplicate camera frames per stream.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(monitor) │    │(rendering)   │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │              ▲                                      │
//! │       ▼              │                                      │
//! │  ┌─────────┐    ┌─────────┐                                 │
//! │  │ source  │    │ notify  │◀── device callbacks             │
//! │  │ (input) │    │  (hub)  │                                 │
//! │  └─────────┘    └─────────┘                                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation, and user interaction logic
//! - **[`source`]**: Data source abstraction ([`DataSource`] trait) with implementations
//!   for file polling, TCP streams, and channel-based input
//! - **[`data`]**: The monitoring core: [`EventLog`], threshold and flag watchers,
//!   [`FrameSequenceTracker`] and the per-session [`DeviceMonitor`]
//! - **[`notify`]**: Routes asynchronous device callbacks to the session that
//!   registered for them
//! - **[`ui`]**: Terminal rendering using ratatui
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch a JSON snapshot file rewritten by a probe process
//! device-doctor --file device.json
//!
//! # Read newline-delimited snapshots from a TCP endpoint
//! device-doctor --connect localhost:9090
//! ```
//!
//! ### As a library
//!
//! ```
//! use device_doctor::{DeviceMonitor, DeviceSnapshot, MonitorConfig};
//!
//! let mut monitor = DeviceMonitor::new(MonitorConfig::default()).unwrap();
//! monitor.apply_snapshot(&DeviceSnapshot {
//!     compute_battery_level: Some(4),
//!     ..Default::default()
//! });
//!
//! let events = monitor.events();
//! assert_eq!(events.len(), 1);
//! ```
//!
//! ### Driving the TUI state from a channel
//!
//! ```
//! use device_doctor::{App, ChannelSource, DeviceMonitor, MonitorConfig, NotificationHub};
//!
//! let (tx, source) = ChannelSource::create("probe thread");
//! let monitor = DeviceMonitor::new(MonitorConfig::default()).unwrap();
//! let mut app = App::new(Box::new(source), monitor);
//!
//! // Native callbacks carry the session id as their context value
//! let hub = NotificationHub::new();
//! let session = app.attach_hub(hub.clone());
//! assert_eq!(app.session(), Some(session));
//! ```
//!
//! ### Bridging from a byte stream
//!
//! ```no_run
//! use device_doctor::StreamSource;
//! use tokio::sync::mpsc;
//!
//! # tokio_test::block_on(async {
//! let (tx, rx) = mpsc::channel::<Vec<u8>>(16);
//! let source = StreamSource::from_bytes_channel(rx, "probe");
//! # });
//! ```

pub mod app;
pub mod data;
pub mod error;
pub mod events;
pub mod notify;
pub mod settings;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use data::{
    CameraId, DeviceMonitor, DeviceNotification, EventLog, EventSnapshot, FlagWatcher,
    FrameMode, FrameOutcome, FrameSequenceTracker, FrameTrackers, MonitorConfig,
    ThresholdWatcher,
};
pub use error::MonitorError;
pub use notify::{NotificationHub, SessionId};
pub use source::{
    CameraFrame, ChannelSource, DataSource, DeviceSnapshot, DiskUsage, FileSource, StreamSource,
};
