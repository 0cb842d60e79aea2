//! Stream-based data source.
//!
//! Receives device snapshots as newline-delimited JSON from an async byte
//! stream, such as a TCP connection to an on-device probe.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{DataSource, DeviceSnapshot};

/// A data source fed by a background reader task.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use device_doctor::StreamSource;
///
/// # tokio_test::block_on(async {
/// let data = b"{}\n";
/// let stream = Cursor::new(data.to_vec());
/// let source = StreamSource::spawn(stream, "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::Receiver<DeviceSnapshot>,
    description: String,
    /// Written by the reader task.
    shared_error: Arc<Mutex<Option<String>>>,
    /// Copy of `shared_error` taken on each poll.
    last_error: Option<String>,
}

impl StreamSource {
    /// Spawn a task reading one JSON snapshot per line from `reader`.
    ///
    /// Lines that fail to parse are reported through [`DataSource::error`]
    /// and skipped.
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(16);
        let shared_error = Arc::new(Mutex::new(None));
        let error_handle = shared_error.clone();

        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        debug!("snapshot stream reached end of input");
                        *error_handle.lock() = Some("Connection closed".to_string());
                        break;
                    }
                    Ok(_) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<DeviceSnapshot>(trimmed) {
                            Ok(snapshot) => {
                                *error_handle.lock() = None;
                                if tx.send(snapshot).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!(error = %e, "discarding malformed snapshot line");
                                *error_handle.lock() = Some(format!("Parse error: {}", e));
                            }
                        }
                    }
                    Err(e) => {
                        *error_handle.lock() = Some(format!("Read error: {}", e));
                        break;
                    }
                }
            }
        });

        Self {
            receiver: rx,
            description: format!("stream: {}", description),
            shared_error,
            last_error: None,
        }
    }

    /// Create a source from a channel of raw JSON payloads.
    ///
    /// Useful when another transport already frames the messages.
    pub fn from_bytes_channel(mut rx: mpsc::Receiver<Vec<u8>>, description: &str) -> Self {
        let (tx, snapshot_rx) = mpsc::channel(16);
        let shared_error = Arc::new(Mutex::new(None));
        let error_handle = shared_error.clone();

        tokio::spawn(async move {
            while let Some(bytes) = rx.recv().await {
                match serde_json::from_slice::<DeviceSnapshot>(&bytes) {
                    Ok(snapshot) => {
                        *error_handle.lock() = None;
                        if tx.send(snapshot).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        *error_handle.lock() = Some(format!("Parse error: {}", e));
                    }
                }
            }
        });

        Self {
            receiver: snapshot_rx,
            description: format!("stream: {}", description),
            shared_error,
            last_error: None,
        }
    }
}

impl DataSource for StreamSource {
    fn poll(&mut self) -> Option<DeviceSnapshot> {
        let result = match self.receiver.try_recv() {
            Ok(snapshot) => Some(snapshot),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                let mut shared = self.shared_error.lock();
                if shared.is_none() {
                    *shared = Some("Stream disconnected".to_string());
                }
                None
            }
        };
        self.last_error = self.shared_error.lock().clone();
        result
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
