use device_doctor::{
    CameraFrame, CameraId, DataSource, DeviceMonitor, DeviceNotification, DeviceSnapshot,
    DiskUsage, FrameMode, MonitorConfig, NotificationHub, StreamSource,
};

fn frame(camera: CameraId, mode: FrameMode, frame_number: i64) -> CameraFrame {
    CameraFrame {
        camera,
        mode,
        frame_number,
    }
}

#[test]
fn battery_drain_session_produces_expected_events() {
    let mut monitor = DeviceMonitor::new(MonitorConfig::default()).unwrap();

    let ticks = [
        DeviceSnapshot {
            network_connected: Some(true),
            compute_battery_level: Some(12),
            ..Default::default()
        },
        DeviceSnapshot {
            compute_battery_level: Some(5),
            ..Default::default()
        },
        DeviceSnapshot {
            compute_battery_level: Some(4),
            network_connected: Some(false),
            ..Default::default()
        },
        DeviceSnapshot {
            compute_battery_level: Some(6),
            ..Default::default()
        },
        DeviceSnapshot {
            compute_battery_level: Some(5),
            ..Default::default()
        },
    ];
    for tick in &ticks {
        monitor.apply_snapshot(tick);
    }

    let events: Vec<String> = monitor.events().iter().cloned().collect();
    assert_eq!(
        events,
        vec![
            "Compute Pack Battery Critically Low (at or below 5%).",
            "Network Disconnected.",
            "Compute Pack Battery Critically Low (at or below 5%).",
        ]
    );
}

#[test]
fn event_log_keeps_only_newest_entries() {
    let config = MonitorConfig {
        event_capacity: 3,
        ..Default::default()
    };
    let mut monitor = DeviceMonitor::new(config).unwrap();

    for i in 0..5 {
        monitor.apply_snapshot(&DeviceSnapshot {
            master_volume: Some(if i % 2 == 0 { 90.0 } else { 10.0 }),
            ..Default::default()
        });
        monitor.handle_notification(DeviceNotification::LowMemory);
    }

    let events = monitor.events();
    assert_eq!(events.len(), 3);
    assert_eq!(
        events.as_slice().last().map(String::as_str),
        Some("Memory Warning: low memory lifecycle event occurred.")
    );
}

#[test]
fn camera_streams_count_drops_across_batches() {
    let mut monitor = DeviceMonitor::new(MonitorConfig::default()).unwrap();

    let batches = [
        vec![
            frame(CameraId::Left, FrameMode::NormalExposure, 1),
            frame(CameraId::Right, FrameMode::NormalExposure, 1),
        ],
        vec![
            frame(CameraId::Left, FrameMode::NormalExposure, 2),
            frame(CameraId::Right, FrameMode::NormalExposure, 4),
        ],
        vec![
            frame(CameraId::Left, FrameMode::NormalExposure, 2),
            frame(CameraId::Right, FrameMode::NormalExposure, 5),
        ],
    ];
    for frames in batches {
        monitor.apply_snapshot(&DeviceSnapshot {
            frames,
            ..Default::default()
        });
    }

    let trackers = monitor.frames();
    assert_eq!(trackers.dropped(CameraId::Left, FrameMode::NormalExposure), 0);
    assert_eq!(trackers.dropped(CameraId::Right, FrameMode::NormalExposure), 2);
    assert_eq!(trackers.duplicate_count(), 1);
    assert_eq!(trackers.total_dropped(), 2);
}

#[test]
fn disk_and_head_tracking_recover() {
    let mut monitor = DeviceMonitor::new(MonitorConfig::default()).unwrap();
    let disk = |available| DiskUsage {
        available_bytes: available,
        total_bytes: 100,
        ..Default::default()
    };

    monitor.apply_snapshot(&DeviceSnapshot {
        disk: Some(disk(50)),
        head_tracking_error: Some(0),
        ..Default::default()
    });
    monitor.apply_snapshot(&DeviceSnapshot {
        disk: Some(disk(8)),
        head_tracking_error: Some(0b0100),
        ..Default::default()
    });
    assert!(monitor.disk_critical());
    assert!(monitor.has_warnings());

    monitor.apply_snapshot(&DeviceSnapshot {
        disk: Some(disk(40)),
        head_tracking_error: Some(0),
        ..Default::default()
    });
    assert!(!monitor.disk_critical());
    assert!(!monitor.has_warnings());

    let events = monitor.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events.as_slice()[2], "Head tracking restored.");
}

#[test]
fn callbacks_from_other_threads_reach_their_session() {
    let hub = NotificationHub::new();
    let (session, mut receiver) = hub.register();
    let mut monitor = DeviceMonitor::new(MonitorConfig::default()).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let hub = hub.clone();
            let context = session.as_raw();
            std::thread::spawn(move || {
                hub.dispatch(
                    device_doctor::SessionId::from_raw(context),
                    DeviceNotification::LowMemory,
                )
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    while let Ok(notification) = receiver.try_recv() {
        monitor.handle_notification(notification);
    }
    assert_eq!(monitor.events().len(), 4);
}

#[tokio::test]
async fn ndjson_stream_feeds_monitor() {
    let input = concat!(
        r#"{"compute_battery_level":50}"#,
        "\n",
        r#"{"compute_battery_level":3}"#,
        "\n",
    );
    let mut source = StreamSource::spawn(std::io::Cursor::new(input.as_bytes().to_vec()), "test");
    let mut monitor = DeviceMonitor::new(MonitorConfig::default()).unwrap();

    let mut applied = 0;
    for _ in 0..100 {
        if let Some(snapshot) = source.poll() {
            monitor.apply_snapshot(&snapshot);
            applied += 1;
            if applied == 2 {
                break;
            }
        } else {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    assert_eq!(applied, 2);
    assert_eq!(monitor.events().len(), 1);
    assert_eq!(monitor.readings().compute_battery_level, Some(3));
}
