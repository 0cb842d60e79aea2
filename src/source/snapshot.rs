//! Shared types for device snapshots.
//!
//! A snapshot is one poll tick worth of probe readings. Every field is
//! optional so producers can publish only the probes they have; missing
//! readings leave the corresponding watchers untouched.

use serde::{Deserialize, Serialize};

use crate::data::device::{CameraId, DeviceNotification, FrameMode};

/// One tick of device readings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_connected: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub internet_available: Option<bool>,

    /// Compute pack battery level, 0-100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute_battery_level: Option<u8>,

    /// Compute pack battery temperature in degrees Celsius.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute_battery_temperature: Option<f32>,

    /// Controller battery level, 0-100. Absent while no controller is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_battery_level: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<DiskUsage>,

    /// Master volume, 0-100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_volume: Option<f32>,

    /// Head tracking error flag bitmask.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_tracking_error: Option<u32>,

    /// Last memory trim level reported to the host process.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_trim_level: Option<i32>,

    /// World camera frames acquired since the previous tick.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<CameraFrame>,

    /// Device callbacks captured by the producer since the previous tick.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notifications: Vec<DeviceNotification>,
}

/// Storage capacity of internal and external volumes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskUsage {
    pub available_bytes: u64,
    pub total_bytes: u64,
    pub external_available_bytes: u64,
    pub external_total_bytes: u64,
}

impl DiskUsage {
    /// Free space ratio across both volumes, or None when nothing is mounted.
    pub fn free_ratio(&self) -> Option<f64> {
        let total = self.total_bytes.saturating_add(self.external_total_bytes);
        if total == 0 {
            return None;
        }
        let available = self.available_bytes.saturating_add(self.external_available_bytes);
        Some(available as f64 / total as f64)
    }
}

/// Frame number reported for one world camera stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraFrame {
    pub camera: CameraId,
    pub mode: FrameMode,
    pub frame_number: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::device::PowerState;

    #[test]
    fn test_deserialize_snapshot() {
        let json = r#"{
            "network_connected": true,
            "compute_battery_level": 42,
            "compute_battery_temperature": 36.5,
            "disk": { "available_bytes": 10, "total_bytes": 100 },
            "head_tracking_error": 4,
            "frames": [
                { "camera": "left", "mode": "normal_exposure", "frame_number": 17 }
            ],
            "notifications": [
                { "kind": "controller_power_state", "value": "normal" }
            ]
        }"#;

        let snapshot: DeviceSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.network_connected, Some(true));
        assert_eq!(snapshot.internet_available, None);
        assert_eq!(snapshot.compute_battery_level, Some(42));
        assert_eq!(snapshot.controller_battery_level, None);
        assert_eq!(snapshot.head_tracking_error, Some(4));
        assert_eq!(snapshot.frames.len(), 1);
        assert_eq!(snapshot.frames[0].camera, CameraId::Left);
        assert_eq!(snapshot.frames[0].mode, FrameMode::NormalExposure);
        assert_eq!(
            snapshot.notifications,
            vec![DeviceNotification::ControllerPowerState(PowerState::Normal)]
        );

        let ratio = snapshot.disk.unwrap().free_ratio().unwrap();
        assert!((ratio - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_empty_object_is_empty_snapshot() {
        let snapshot: DeviceSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot, DeviceSnapshot::default());
        assert_eq!(serde_json::to_string(&snapshot).unwrap(), "{}");
    }

    #[test]
    fn test_free_ratio_includes_external_volume() {
        let disk = DiskUsage {
            available_bytes: 10,
            total_bytes: 100,
            external_available_bytes: 90,
            external_total_bytes: 100,
        };
        assert_eq!(disk.free_ratio(), Some(0.5));
        assert_eq!(DiskUsage::default().free_ratio(), None);
    }
}
