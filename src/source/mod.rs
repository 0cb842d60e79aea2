//! Data source abstraction for receiving device snapshots.
//!
//! The device runtime is an external collaborator: something outside this
//! crate probes battery, storage, tracking and camera state and publishes a
//! [`DeviceSnapshot`] per tick. Sources deliver those snapshots from a file,
//! a network stream or an in-process channel.

mod channel;
mod file;
mod snapshot;
mod stream;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use snapshot::{CameraFrame, DeviceSnapshot, DiskUsage};
pub use stream::StreamSource;

use std::fmt::Debug;

/// Trait for receiving device snapshots from various sources.
///
/// # Example
///
/// ```
/// use device_doctor::{DataSource, FileSource};
///
/// let mut source = FileSource::new("device.json");
/// if let Some(snapshot) = source.poll() {
///     println!("Got {} camera frames", snapshot.frames.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the next snapshot without blocking.
    fn poll(&mut self) -> Option<DeviceSnapshot>;

    /// Human-readable description, shown in the status bar.
    fn description(&self) -> &str;

    /// The error from the most recent poll, if any.
    fn error(&self) -> Option<&str>;
}
