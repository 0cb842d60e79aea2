//! Closed sets of device states reported by the headset runtime.

use std::fmt;

use serde::{Deserialize, Serialize};

/// World camera position on the headset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraId {
    Left,
    Center,
    Right,
}

impl CameraId {
    pub const ALL: [CameraId; 3] = [CameraId::Left, CameraId::Center, CameraId::Right];

    pub fn label(&self) -> &'static str {
        match self {
            CameraId::Left => "Left Camera",
            CameraId::Center => "Center Camera",
            CameraId::Right => "Right Camera",
        }
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Exposure mode a world camera frame was captured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameMode {
    Unknown,
    LowExposure,
    NormalExposure,
}

impl FrameMode {
    /// Modes that carry trackable frame streams.
    pub const TRACKED: [FrameMode; 2] = [FrameMode::LowExposure, FrameMode::NormalExposure];

    pub fn label(&self) -> &'static str {
        match self {
            FrameMode::Unknown => "Unknown",
            FrameMode::LowExposure => "Low Exposure",
            FrameMode::NormalExposure => "Normal Exposure",
        }
    }
}

impl fmt::Display for FrameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Controller power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    None,
    #[default]
    Normal,
    DisabledWhileCharging,
    Standby,
    Sleep,
}

impl PowerState {
    pub fn description(&self) -> &'static str {
        match self {
            PowerState::Normal => "Normal power state.",
            PowerState::DisabledWhileCharging => "Component disabled while charging.",
            PowerState::Standby => "Standby power state.",
            PowerState::Sleep => "Sleep power state.",
            PowerState::None => "Invalid power state.",
        }
    }
}

/// Controller connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Connected,
    Disconnected,
}

impl ConnectionState {
    pub fn description(&self) -> &'static str {
        match self {
            ConnectionState::Connected => "Connected.",
            ConnectionState::Disconnected => "Disconnected.",
        }
    }
}

/// Errors the power manager reports for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerManagerError {
    /// Controller SKU cannot be used with this compute pack SKU.
    InvalidSku,
    Unknown(u32),
}

/// Head tracking error flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadTrackingFlag {
    Unknown,
    NotEnoughFeatures,
    LowLight,
    ExcessiveMotion,
}

impl HeadTrackingFlag {
    pub const ALL: [HeadTrackingFlag; 4] = [
        HeadTrackingFlag::Unknown,
        HeadTrackingFlag::NotEnoughFeatures,
        HeadTrackingFlag::LowLight,
        HeadTrackingFlag::ExcessiveMotion,
    ];

    /// Mask value meaning tracking is healthy.
    pub const NONE: u32 = 0;

    pub fn bit(&self) -> u32 {
        match self {
            HeadTrackingFlag::Unknown => 1 << 0,
            HeadTrackingFlag::NotEnoughFeatures => 1 << 1,
            HeadTrackingFlag::LowLight => 1 << 2,
            HeadTrackingFlag::ExcessiveMotion => 1 << 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HeadTrackingFlag::Unknown => "Unknown",
            HeadTrackingFlag::NotEnoughFeatures => "NotEnoughFeatures",
            HeadTrackingFlag::LowLight => "LowLight",
            HeadTrackingFlag::ExcessiveMotion => "ExcessiveMotion",
        }
    }

    /// Event message for the flag being raised.
    pub fn lost_message(&self) -> &'static str {
        match self {
            HeadTrackingFlag::Unknown => "Head tracking lost due to unknown error.",
            HeadTrackingFlag::NotEnoughFeatures => {
                "Head tracking lost because there are not enough features."
            }
            HeadTrackingFlag::LowLight => "Head tracking lost due to low light conditions.",
            HeadTrackingFlag::ExcessiveMotion => "Head tracking lost because of excessive motion.",
        }
    }

    /// Human-readable list of the flags set in `mask`.
    pub fn describe(mask: u32) -> String {
        if mask == Self::NONE {
            return "None".to_string();
        }
        let names: Vec<&str> = Self::ALL
            .iter()
            .filter(|flag| mask & flag.bit() != 0)
            .map(|flag| flag.name())
            .collect();
        if names.is_empty() {
            format!("0x{:x}", mask)
        } else {
            names.join(", ")
        }
    }
}

/// Asynchronous device callback delivered to a monitor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DeviceNotification {
    ControllerError(PowerManagerError),
    ControllerPowerState(PowerState),
    ControllerConnection(ConnectionState),
    /// The host process received a low memory lifecycle event.
    LowMemory,
}
