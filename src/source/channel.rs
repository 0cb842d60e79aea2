//! Channel-based data source.
//!
//! Receives device snapshots pushed by an in-process producer, for example a
//! probe thread wrapping the native device APIs.

use tokio::sync::watch;

use super::{DataSource, DeviceSnapshot};

/// A data source that receives the latest snapshot via a watch channel.
///
/// Only the most recent snapshot is kept; a producer that publishes faster
/// than the UI polls will have intermediate snapshots skipped.
///
/// # Example
///
/// ```
/// use device_doctor::{ChannelSource, DeviceSnapshot};
///
/// let (tx, source) = ChannelSource::create("probe thread");
/// tx.send(DeviceSnapshot::default()).unwrap();
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<DeviceSnapshot>,
    description: String,
    initial_returned: bool,
}

impl ChannelSource {
    pub fn new(receiver: watch::Receiver<DeviceSnapshot>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            initial_returned: false,
        }
    }

    /// Create a (sender, source) pair.
    pub fn create(source_description: &str) -> (watch::Sender<DeviceSnapshot>, Self) {
        let (tx, rx) = watch::channel(DeviceSnapshot::default());
        (tx, Self::new(rx, source_description))
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<DeviceSnapshot> {
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        if self.receiver.has_changed().unwrap_or(false) {
            Some(self.receiver.borrow_and_update().clone())
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_source_poll() {
        let (tx, mut source) = ChannelSource::create("test");

        // Initial value is delivered once
        let snapshot = source.poll().unwrap();
        assert_eq!(snapshot, DeviceSnapshot::default());
        assert!(source.poll().is_none());

        tx.send(DeviceSnapshot {
            master_volume: Some(80.0),
            ..Default::default()
        })
        .unwrap();

        let snapshot = source.poll().unwrap();
        assert_eq!(snapshot.master_volume, Some(80.0));
        assert_eq!(source.description(), "channel: test");
    }
}
