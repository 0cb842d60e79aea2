//! Routing of asynchronous device callbacks to monitor sessions.
//!
//! Native device runtimes deliver callbacks on their own threads with an
//! opaque context value. [`NotificationHub`] hands out a [`SessionId`] to use
//! as that context, and forwards every callback to the channel of the
//! session it names. The session drains its receiver on its own polling
//! thread.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::data::device::DeviceNotification;
use crate::error::MonitorError;

/// Opaque handle identifying one registered monitor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    /// Raw value to pass through a native callback context.
    pub fn as_raw(&self) -> u64 {
        self.0
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

#[derive(Debug, Default)]
struct HubInner {
    next_id: AtomicU64,
    sessions: RwLock<HashMap<SessionId, mpsc::UnboundedSender<DeviceNotification>>>,
}

/// Table of registered sessions. Cloning shares the same table.
#[derive(Debug, Clone, Default)]
pub struct NotificationHub {
    inner: Arc<HubInner>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session and return its id and notification receiver.
    pub fn register(&self) -> (SessionId, mpsc::UnboundedReceiver<DeviceNotification>) {
        let id = SessionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.sessions.write().insert(id, tx);
        debug!(session = %id, "registered monitor session");
        (id, rx)
    }

    /// Deliver a notification to the session named by `id`.
    ///
    /// Fails if the session was never registered, was unregistered, or has
    /// dropped its receiver.
    pub fn dispatch(
        &self,
        id: SessionId,
        notification: DeviceNotification,
    ) -> Result<(), MonitorError> {
        let sessions = self.inner.sessions.read();
        let Some(sender) = sessions.get(&id) else {
            warn!(session = %id, ?notification, "notification for unknown session");
            return Err(MonitorError::UnknownSession(id));
        };
        sender
            .send(notification)
            .map_err(|_| MonitorError::UnknownSession(id))
    }

    /// Remove a session; later dispatches to it fail.
    pub fn unregister(&self, id: SessionId) -> bool {
        self.inner.sessions.write().remove(&id).is_some()
    }

    /// Number of registered sessions.
    pub fn sessions(&self) -> usize {
        self.inner.sessions.read().len()
    }
}
