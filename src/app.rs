//! Application state and navigation logic.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::data::{CameraId, DeviceMonitor, DeviceNotification, FrameMode};
use crate::notify::{NotificationHub, SessionId};
use crate::source::DataSource;
use crate::ui::Theme;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Current probe readings and controller state.
    Status,
    /// The event stream.
    Events,
    /// Per camera stream frame bookkeeping.
    Cameras,
}

impl View {
    pub fn next(self) -> Self {
        match self {
            View::Status => View::Events,
            View::Events => View::Cameras,
            View::Cameras => View::Status,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            View::Status => View::Cameras,
            View::Events => View::Status,
            View::Cameras => View::Events,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Status => "Status",
            View::Events => "Events",
            View::Cameras => "Cameras",
        }
    }
}

/// A row of the camera settings list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraToggle {
    Camera(CameraId),
    Mode(FrameMode),
}

impl CameraToggle {
    pub const ALL: [CameraToggle; 5] = [
        CameraToggle::Camera(CameraId::Left),
        CameraToggle::Camera(CameraId::Center),
        CameraToggle::Camera(CameraId::Right),
        CameraToggle::Mode(FrameMode::LowExposure),
        CameraToggle::Mode(FrameMode::NormalExposure),
    ];

    pub fn label(&self) -> String {
        match self {
            CameraToggle::Camera(camera) => camera.label().to_string(),
            CameraToggle::Mode(mode) => format!("{} Mode", mode.label()),
        }
    }
}

/// This app's registration with a notification hub.
struct HubSession {
    hub: NotificationHub,
    id: SessionId,
    receiver: mpsc::UnboundedReceiver<DeviceNotification>,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    source: Box<dyn DataSource>,
    pub monitor: DeviceMonitor,
    notifications: Option<HubSession>,
    pub load_error: Option<String>,
    pub last_update: Option<Instant>,

    /// Selected row in the camera settings list.
    pub selected_toggle: usize,

    pub theme: Theme,

    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(source: Box<dyn DataSource>, monitor: DeviceMonitor) -> Self {
        Self {
            running: true,
            current_view: View::Status,
            show_help: false,
            source,
            monitor,
            notifications: None,
            load_error: None,
            last_update: None,
            selected_toggle: 0,
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    /// Register a session with `hub` and receive the callbacks routed to it.
    ///
    /// Notifications carried by source snapshots are dispatched through the
    /// same session from then on.
    pub fn attach_hub(&mut self, hub: NotificationHub) -> SessionId {
        self.detach_hub();
        let (id, receiver) = hub.register();
        self.notifications = Some(HubSession { hub, id, receiver });
        id
    }

    /// Unregister from the hub, applying anything still queued first.
    pub fn detach_hub(&mut self) {
        self.drain_notifications();
        if let Some(session) = self.notifications.take() {
            session.hub.unregister(session.id);
        }
    }

    pub fn session(&self) -> Option<SessionId> {
        self.notifications.as_ref().map(|session| session.id)
    }

    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// The status message, if set less than three seconds ago.
    pub fn get_status_message(&self) -> Option<&str> {
        let (msg, time) = self.status_message.as_ref()?;
        (time.elapsed() < Duration::from_secs(3)).then_some(msg.as_str())
    }

    /// Poll the source and the notification channel once.
    ///
    /// Returns true if a new snapshot was applied. Source failures land in
    /// `load_error`.
    pub fn reload_data(&mut self) -> bool {
        self.drain_notifications();

        let mut snapshot = self.source.poll();
        if let Some(err) = self.source.error() {
            // Frame numbering restarts once the source comes back
            if self.load_error.is_none() {
                warn!(error = err, "data source unavailable, resetting frame trackers");
                self.monitor.frames_mut().reset_all();
            }
            self.load_error = Some(err.to_string());
        }

        let Some(snapshot) = snapshot.as_mut() else {
            return false;
        };

        if let Some(session) = self.notifications.as_ref() {
            // Callbacks from the source go through the hub like any other
            for notification in std::mem::take(&mut snapshot.notifications) {
                if let Err(e) = session.hub.dispatch(session.id, notification) {
                    warn!(error = %e, "notification dispatch failed, applying directly");
                    self.monitor.handle_notification(notification);
                }
            }
            self.drain_notifications();
        }

        self.monitor.apply_snapshot(snapshot);
        self.load_error = None;
        self.last_update = Some(Instant::now());
        true
    }

    /// Apply every pending device callback. Returns how many were applied.
    pub fn drain_notifications(&mut self) -> usize {
        let Some(session) = self.notifications.as_mut() else {
            return 0;
        };
        let mut pending = Vec::new();
        while let Ok(notification) = session.receiver.try_recv() {
            pending.push(notification);
        }
        let count = pending.len();
        for notification in pending {
            self.monitor.handle_notification(notification);
        }
        count
    }

    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    pub fn select_next(&mut self) {
        if self.current_view == View::Cameras {
            self.selected_toggle = (self.selected_toggle + 1).min(CameraToggle::ALL.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        if self.current_view == View::Cameras {
            self.selected_toggle = self.selected_toggle.saturating_sub(1);
        }
    }

    /// Flip the selected camera or mode on the Cameras view.
    pub fn toggle_selected(&mut self) {
        if self.current_view != View::Cameras {
            return;
        }
        let Some(toggle) = CameraToggle::ALL.get(self.selected_toggle).copied() else {
            return;
        };
        let enabled = !self.toggle_enabled(toggle);
        let frames = self.monitor.frames_mut();
        match toggle {
            CameraToggle::Camera(camera) => frames.set_camera_enabled(camera, enabled),
            CameraToggle::Mode(mode) => frames.set_mode_enabled(mode, enabled),
        }
        info!(toggle = %toggle.label(), enabled, "camera settings updated");
    }

    pub fn toggle_enabled(&self, toggle: CameraToggle) -> bool {
        match toggle {
            CameraToggle::Camera(camera) => self.monitor.frames().camera_enabled(camera),
            CameraToggle::Mode(mode) => self.monitor.frames().mode_enabled(mode),
        }
    }

    /// Empty the event stream.
    pub fn clear_events(&mut self) {
        self.monitor.clear_events();
        self.set_status_message("Event stream cleared".to_string());
    }

    /// Flip the suppress-system-notifications flag.
    pub fn toggle_suppression(&mut self) {
        let suppressed = !self.monitor.notifications_suppressed();
        self.monitor.set_notifications_suppressed(suppressed);
        info!(suppressed, "system notification suppression changed");
        let verb = if suppressed { "suppressed" } else { "unsuppressed" };
        self.set_status_message(format!("System notifications {}", verb));
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current monitor state to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        export_monitor(&self.monitor, path)
    }
}

/// Build the export document for `monitor`.
pub fn export_document(monitor: &DeviceMonitor) -> serde_json::Value {
    let streams: Vec<serde_json::Value> = monitor
        .frames()
        .iter()
        .map(|((camera, mode), tracker)| {
            serde_json::json!({
                "camera": camera.label(),
                "mode": mode.label(),
                "enabled": monitor.frames().is_enabled((*camera, *mode)),
                "last_frame_number": tracker.last_frame_number(),
                "dropped_frames": tracker.dropped_count(),
            })
        })
        .collect();

    serde_json::json!({
        "status": {
            "readings": monitor.readings(),
            "controller_power_state": monitor.controller_power(),
            "controller_connection_state": monitor.controller_connection(),
            "notifications_suppressed": monitor.notifications_suppressed(),
            "alerts": monitor.alerts(),
        },
        "events": monitor.events().as_slice(),
        "cameras": {
            "total_dropped_frames": monitor.frames().total_dropped(),
            "duplicate_frames": monitor.frames().duplicate_count(),
            "invalid_frames": monitor.frames().invalid_count(),
            "streams": streams,
        },
    })
}

/// Write the export document for `monitor` to `path`.
pub fn export_monitor(monitor: &DeviceMonitor, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&export_document(monitor))?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MonitorConfig, PowerState};
    use crate::notify::NotificationHub;
    use crate::source::{CameraFrame, ChannelSource, DeviceSnapshot};

    fn app_with_channel() -> (tokio::sync::watch::Sender<DeviceSnapshot>, App) {
        let (tx, source) = ChannelSource::create("test");
        let monitor = DeviceMonitor::new(MonitorConfig::default()).unwrap();
        let mut app = App::new(Box::new(source), monitor);
        app.theme = Theme::dark();
        (tx, app)
    }

    #[test]
    fn test_view_cycle() {
        assert_eq!(View::Status.next(), View::Events);
        assert_eq!(View::Cameras.next(), View::Status);
        assert_eq!(View::Status.prev(), View::Cameras);
        assert_eq!(View::Events.label(), "Events");
    }

    #[test]
    fn test_reload_applies_snapshot() {
        let (tx, mut app) = app_with_channel();
        assert!(app.reload_data());
        assert!(!app.reload_data());

        tx.send(DeviceSnapshot {
            compute_battery_level: Some(3),
            ..Default::default()
        })
        .unwrap();
        assert!(app.reload_data());
        assert_eq!(app.monitor.events().len(), 1);
        assert!(app.last_update.is_some());
    }

    #[test]
    fn test_notifications_drained_on_reload() {
        let (_tx, mut app) = app_with_channel();
        let hub = NotificationHub::new();
        let id = app.attach_hub(hub.clone());
        assert_eq!(app.session(), Some(id));
        assert_eq!(hub.sessions(), 1);

        hub.dispatch(id, DeviceNotification::ControllerPowerState(PowerState::Standby))
            .unwrap();
        app.reload_data();

        assert_eq!(app.monitor.controller_power(), PowerState::Standby);
        assert_eq!(app.drain_notifications(), 0);

        app.detach_hub();
        assert_eq!(app.session(), None);
        assert_eq!(hub.sessions(), 0);
        assert!(hub.dispatch(id, DeviceNotification::LowMemory).is_err());
    }

    #[test]
    fn test_source_notifications_routed_through_hub() {
        let (tx, mut app) = app_with_channel();
        let hub = NotificationHub::new();
        let id = app.attach_hub(hub.clone());

        tx.send(DeviceSnapshot {
            notifications: vec![
                DeviceNotification::LowMemory,
                DeviceNotification::ControllerPowerState(PowerState::Standby),
            ],
            ..Default::default()
        })
        .unwrap();
        assert!(app.reload_data());

        assert_eq!(app.monitor.controller_power(), PowerState::Standby);
        assert_eq!(
            app.monitor.events().as_slice().first().map(String::as_str),
            Some("Memory Warning: low memory lifecycle event occurred.")
        );
        // Routed once, not applied again from the snapshot
        assert_eq!(app.monitor.events().len(), 2);
        assert_eq!(app.drain_notifications(), 0);

        // Callbacks dispatched between polls reach the same log
        hub.dispatch(id, DeviceNotification::LowMemory).unwrap();
        assert_eq!(app.drain_notifications(), 1);
        assert_eq!(app.monitor.events().len(), 3);
    }

    #[test]
    fn test_toggle_selected_camera() {
        let (tx, mut app) = app_with_channel();
        app.set_view(View::Cameras);
        app.select_next();
        assert_eq!(CameraToggle::ALL[app.selected_toggle], CameraToggle::Camera(CameraId::Center));

        app.toggle_selected();
        assert!(!app.toggle_enabled(CameraToggle::Camera(CameraId::Center)));

        tx.send(DeviceSnapshot {
            frames: vec![CameraFrame {
                camera: CameraId::Center,
                mode: FrameMode::LowExposure,
                frame_number: 1,
            }],
            ..Default::default()
        })
        .unwrap();
        app.reload_data();
        let tracker = app.monitor.frames().tracker(CameraId::Center, FrameMode::LowExposure);
        assert_eq!(tracker.unwrap().last_frame_number(), None);
    }

    #[tokio::test]
    async fn test_source_error_resets_frame_trackers() {
        let (tx, rx) = mpsc::channel::<Vec<u8>>(4);
        let source = crate::source::StreamSource::from_bytes_channel(rx, "test");
        let monitor = DeviceMonitor::new(MonitorConfig::default()).unwrap();
        let mut app = App::new(Box::new(source), monitor);
        let last = |app: &App| {
            app.monitor
                .frames()
                .tracker(CameraId::Left, FrameMode::LowExposure)
                .unwrap()
                .last_frame_number()
        };

        let frame = r#"{"frames":[{"camera":"left","mode":"low_exposure","frame_number":7}]}"#;
        tx.send(frame.as_bytes().to_vec()).await.unwrap();
        for _ in 0..100 {
            if app.reload_data() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(last(&app), Some(7));

        tx.send(b"not json".to_vec()).await.unwrap();
        for _ in 0..100 {
            app.reload_data();
            if app.load_error.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(app.load_error.is_some());
        assert_eq!(last(&app), None);
    }

    #[test]
    fn test_selection_is_clamped() {
        let (_tx, mut app) = app_with_channel();
        app.set_view(View::Cameras);
        for _ in 0..10 {
            app.select_next();
        }
        assert_eq!(app.selected_toggle, CameraToggle::ALL.len() - 1);
        for _ in 0..10 {
            app.select_prev();
        }
        assert_eq!(app.selected_toggle, 0);
    }

    #[test]
    fn test_clear_and_suppress() {
        let (_tx, mut app) = app_with_channel();
        app.monitor.handle_notification(DeviceNotification::LowMemory);
        app.clear_events();
        assert!(app.monitor.events().is_empty());

        app.toggle_suppression();
        assert!(app.monitor.notifications_suppressed());
        assert_eq!(app.get_status_message(), Some("System notifications suppressed"));
    }

    #[test]
    fn test_export_state() {
        let (_tx, mut app) = app_with_channel();
        app.monitor.handle_notification(DeviceNotification::LowMemory);

        let file = tempfile::NamedTempFile::new().unwrap();
        app.export_state(file.path()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["events"].as_array().unwrap().len(), 1);
        assert_eq!(value["cameras"]["streams"].as_array().unwrap().len(), 6);
        assert_eq!(value["status"]["controller_power_state"], "normal");
    }
}
